//! Cancellable delayed transitions
//!
//! Every delayed step of the result flow is a task keyed to the session
//! that scheduled it. Restart cancels the whole set, and a task whose
//! session is no longer current is discarded rather than fired.

use serde::{Deserialize, Serialize};

/// What a delayed task does when it comes due
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskKind {
    /// Balloon starts sinking after the land command
    BeginDescent,
    /// Landed session moves to the success screen
    ShowSuccess,
    /// Popped session moves to the failure screen
    ShowFailure,
}

/// A scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeferredTask {
    pub session: u64,
    pub due_ms: f64,
    pub kind: TaskKind,
}

/// Pending tasks, fired in due order
#[derive(Debug, Clone, Default)]
pub struct DeferredTasks {
    tasks: Vec<DeferredTask>,
}

impl DeferredTasks {
    pub fn new() -> Self {
        Self { tasks: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn pending(&self) -> &[DeferredTask] {
        &self.tasks
    }

    /// Schedule `kind` for `session` at `due_ms`
    pub fn schedule(&mut self, session: u64, due_ms: f64, kind: TaskKind) {
        log::debug!("Session {}: {:?} scheduled at {:.0}", session, kind, due_ms);
        self.tasks.push(DeferredTask {
            session,
            due_ms,
            kind,
        });
        // Stable sort keeps scheduling order for equal due times
        self.tasks.sort_by(|a, b| {
            a.due_ms
                .partial_cmp(&b.due_ms)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    }

    /// Remove and return every task due at `now_ms` for the current session
    ///
    /// Tasks from any other session are dropped without firing.
    pub fn take_due(&mut self, current_session: u64, now_ms: f64) -> Vec<TaskKind> {
        let mut due = Vec::new();
        self.tasks.retain(|task| {
            if task.session != current_session {
                log::warn!(
                    "Dropping stale {:?} from session {} (current {})",
                    task.kind,
                    task.session,
                    current_session
                );
                return false;
            }
            if task.due_ms <= now_ms {
                due.push(task.kind);
                return false;
            }
            true
        });
        due
    }

    /// Cancel everything (restart)
    pub fn cancel_all(&mut self) {
        if !self.tasks.is_empty() {
            log::debug!("Cancelling {} pending task(s)", self.tasks.len());
        }
        self.tasks.clear();
    }
}

//! Delayed transitions.
//!
//! Each pending transition is a tokio task that sleeps for its delay and then
//! runs its callback. The caller gets a [`TransitionHandle`] back right away
//! and never waits on the timer.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::task::AbortHandle;
use uuid::Uuid;

use crate::domain::task::TaskId;

/// Which edge a pending timer will drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    /// in-progress -> completed, paying the agent
    Complete,
    /// completed -> available
    Reset,
}

impl std::fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransitionKind::Complete => write!(f, "complete"),
            TransitionKind::Reset => write!(f, "reset"),
        }
    }
}

/// Handle to a scheduled transition
///
/// Cancelling only stops the timer. The task and agent stay exactly as they
/// were when the timer was aborted.
#[derive(Debug, Clone)]
pub struct TransitionHandle {
    id: Uuid,
    task_id: TaskId,
    kind: TransitionKind,
    due_at: DateTime<Utc>,
    abort: AbortHandle,
}

impl TransitionHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn task_id(&self) -> TaskId {
        self.task_id
    }

    pub fn kind(&self) -> TransitionKind {
        self.kind
    }

    /// Wall-clock time the timer was set to fire
    pub fn due_at(&self) -> DateTime<Utc> {
        self.due_at
    }

    /// True once the callback has run or the timer was cancelled
    pub fn is_finished(&self) -> bool {
        self.abort.is_finished()
    }

    /// Stops the timer if it has not fired yet
    pub fn cancel(&self) {
        self.abort.abort();
    }
}

/// Spawns fire-and-forget timers on the current tokio runtime
#[derive(Debug, Clone, Copy, Default)]
pub struct TransitionScheduler;

impl TransitionScheduler {
    pub fn new() -> Self {
        Self
    }

    /// Runs `callback` once `delay` has elapsed
    ///
    /// `callback` receives the id of the handle it belongs to, so it can
    /// recognise its own bookkeeping entry when it fires.
    pub fn schedule<F, Fut>(
        &self,
        task_id: TaskId,
        kind: TransitionKind,
        delay: Duration,
        callback: F,
    ) -> TransitionHandle
    where
        F: FnOnce(Uuid) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let id = Uuid::new_v4();
        let due_at = chrono::Duration::from_std(delay)
            .ok()
            .and_then(|delay| Utc::now().checked_add_signed(delay))
            .unwrap_or_else(Utc::now);

        tracing::debug!(%task_id, %kind, handle = %id, ?delay, "Scheduling transition");

        let join = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            callback(id).await;
        });

        TransitionHandle {
            id,
            task_id,
            kind,
            due_at,
            abort: join.abort_handle(),
        }
    }
}

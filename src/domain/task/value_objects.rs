use serde::{Deserialize, Serialize};
use std::fmt;

/// Integer identifier of a task, assigned at creation and never changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(u32);

impl TaskId {
    pub fn new(id: u32) -> Self {
        TaskId(id)
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl From<u32> for TaskId {
    fn from(id: u32) -> Self {
        TaskId(id)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Represents where a task is in its execution cycle
///
/// # Status Transitions
/// ```text
/// Available -> InProgress -> Completed -> Available
///     ^            |
///     └------------┘  (cancellation)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    /// Task can be picked up by an idle agent
    Available,
    /// An agent is working on the task
    InProgress,
    /// Reward has been paid, waiting to become available again
    Completed,
}

impl TaskStatus {
    /// Checks if a transition from current status to next status is valid
    ///
    /// # Valid Transitions
    /// - Available -> InProgress
    /// - InProgress -> Completed
    /// - Completed -> Available
    /// - InProgress -> Available (cancelled before completion)
    ///
    /// # Example
    /// ```
    /// use agent_earnings::domain::task::value_objects::TaskStatus;
    ///
    /// assert!(TaskStatus::Available.can_transition_to(TaskStatus::InProgress));
    /// assert!(!TaskStatus::Available.can_transition_to(TaskStatus::Completed));
    /// ```
    pub fn can_transition_to(&self, next: TaskStatus) -> bool {
        use TaskStatus::*;
        matches!(
            (self, next),
            (Available, InProgress)
                | (InProgress, Completed)
                | (Completed, Available)
                | (InProgress, Available)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Available => "available",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

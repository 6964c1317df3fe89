use super::value_objects::{TaskId, TaskStatus};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A unit of simulated work with a fixed reward and duration
///
/// # Invariants
/// - Title cannot be empty
/// - Reward is never negative
/// - Exactly one status at any time; only the status ever changes
///
/// # Example
/// ```
/// use agent_earnings::domain::task::{Task, TaskId, TaskStatus};
/// use rust_decimal::Decimal;
///
/// let task = Task::new(
///     TaskId::new(1),
///     "Data Classification",
///     "Classify 1000 data points into categories",
///     Decimal::new(2500, 2),
///     5,
/// ).expect("valid task");
///
/// assert_eq!(task.status(), TaskStatus::Available);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    title: String,
    description: String,
    reward: Decimal,
    duration: u64,
    status: TaskStatus,
}

impl Task {
    /// Creates a new, available task
    ///
    /// # Arguments
    /// * `id` - Unique task identifier
    /// * `title` - Display title (cannot be empty)
    /// * `description` - Display description
    /// * `reward` - Amount paid on completion (must not be negative)
    /// * `duration` - Simulated execution time in seconds
    pub fn new(
        id: TaskId,
        title: impl Into<String>,
        description: impl Into<String>,
        reward: Decimal,
        duration: u64,
    ) -> Result<Self, String> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err("Task title cannot be empty".to_string());
        }

        if reward < Decimal::ZERO {
            return Err(format!("Task reward cannot be negative: {}", reward));
        }

        Ok(Self {
            id,
            title,
            description: description.into(),
            reward,
            duration,
            status: TaskStatus::Available,
        })
    }

    /// Moves the task to `next`, rejecting edges outside the execution cycle
    pub fn transition(self, next: TaskStatus) -> Result<Self, String> {
        if !self.status.can_transition_to(next) {
            return Err(format!(
                "Cannot move task {} from {} to {}",
                self.id, self.status, next
            ));
        }

        Ok(self.with_status(next))
    }

    /// Overwrites the status without consulting the transition table
    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    // ===== Getters =====

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn reward(&self) -> Decimal {
        self.reward
    }

    /// Simulated execution time in seconds
    pub fn duration(&self) -> u64 {
        self.duration
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn is_available(&self) -> bool {
        self.status == TaskStatus::Available
    }
}

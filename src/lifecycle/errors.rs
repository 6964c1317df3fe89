use thiserror::Error;

use crate::domain::agent::AgentId;
use crate::domain::task::{TaskId, TaskStatus};

/// Errors that can occur while driving the task lifecycle
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LifecycleError {
    #[error("Agent not found: {0}")]
    AgentNotFound(AgentId),

    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),

    #[error("Agent {0} is already working on a task")]
    AgentBusy(AgentId),

    #[error("Task {task_id} is not available (status: {status})")]
    TaskUnavailable { task_id: TaskId, status: TaskStatus },

    #[error("Agent {agent_id} is not working on task {task_id}")]
    NotAssigned { task_id: TaskId, agent_id: AgentId },

    #[error("Invalid state transition for task {task_id} from {from} to {to}")]
    InvalidStateTransition {
        task_id: TaskId,
        from: TaskStatus,
        to: TaskStatus,
    },

    #[error("No agent selected")]
    NoAgentSelected,

    #[error("Invalid roster data: {0}")]
    InvalidData(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl LifecycleError {
    /// True for lookups of ids that do not exist
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            LifecycleError::AgentNotFound(_) | LifecycleError::TaskNotFound(_)
        )
    }

    /// True when the request clashes with the current state of an entity
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            LifecycleError::AgentBusy(_)
                | LifecycleError::TaskUnavailable { .. }
                | LifecycleError::NotAssigned { .. }
                | LifecycleError::InvalidStateTransition { .. }
        )
    }
}

pub type LifecycleResult<T> = Result<T, LifecycleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_kinds() {
        let agent = LifecycleError::AgentNotFound(AgentId::new("agent-404").unwrap());
        let task = LifecycleError::TaskNotFound(TaskId::new(404));

        assert!(agent.is_not_found());
        assert!(task.is_not_found());
        assert!(!agent.is_conflict());
    }

    #[test]
    fn conflict_kinds() {
        let busy = LifecycleError::AgentBusy(AgentId::new("agent-001").unwrap());
        let unavailable = LifecycleError::TaskUnavailable {
            task_id: TaskId::new(1),
            status: TaskStatus::Completed,
        };

        let stranger = LifecycleError::NotAssigned {
            task_id: TaskId::new(1),
            agent_id: AgentId::new("agent-002").unwrap(),
        };

        assert!(busy.is_conflict());
        assert!(unavailable.is_conflict());
        assert!(stranger.is_conflict());
        assert!(!stranger.is_not_found());
        assert!(!LifecycleError::NoAgentSelected.is_conflict());
    }

    #[test]
    fn error_messages() {
        let err = LifecycleError::TaskUnavailable {
            task_id: TaskId::new(2),
            status: TaskStatus::InProgress,
        };
        assert_eq!(err.to_string(), "Task 2 is not available (status: in-progress)");

        let err = LifecycleError::AgentBusy(AgentId::new("agent-003").unwrap());
        assert_eq!(err.to_string(), "Agent agent-003 is already working on a task");

        let err = LifecycleError::NotAssigned {
            task_id: TaskId::new(4),
            agent_id: AgentId::new("agent-001").unwrap(),
        };
        assert_eq!(err.to_string(), "Agent agent-001 is not working on task 4");
    }
}

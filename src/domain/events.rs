use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::agent::AgentId;
use super::task::TaskId;

/// Transitions published by the lifecycle engine
///
/// Subscribers use them to know when to re-read the roster; each one carries
/// enough detail to be logged on its own.
///
/// # Example
/// ```
/// use agent_earnings::domain::events::LifecycleEvent;
/// use agent_earnings::domain::task::TaskId;
/// use chrono::Utc;
///
/// let event = LifecycleEvent::TaskReset {
///     task_id: TaskId::new(1),
///     occurred_at: Utc::now(),
/// };
/// assert_eq!(event.task_id(), TaskId::new(1));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LifecycleEvent {
    /// An agent picked up an available task
    TaskStarted {
        agent_id: AgentId,
        task_id: TaskId,
        occurred_at: DateTime<Utc>,
    },
    /// The task's timer fired and the agent was paid
    TaskCompleted {
        agent_id: AgentId,
        task_id: TaskId,
        reward: Decimal,
        /// Agent level after the payout
        level: u32,
        occurred_at: DateTime<Utc>,
    },
    /// A completed task became available again
    TaskReset {
        task_id: TaskId,
        occurred_at: DateTime<Utc>,
    },
    /// A pending timer was aborted before it fired
    TaskCancelled {
        task_id: TaskId,
        agent_id: Option<AgentId>,
        occurred_at: DateTime<Utc>,
    },
}

impl LifecycleEvent {
    pub fn task_id(&self) -> TaskId {
        match self {
            LifecycleEvent::TaskStarted { task_id, .. } => *task_id,
            LifecycleEvent::TaskCompleted { task_id, .. } => *task_id,
            LifecycleEvent::TaskReset { task_id, .. } => *task_id,
            LifecycleEvent::TaskCancelled { task_id, .. } => *task_id,
        }
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            LifecycleEvent::TaskStarted { occurred_at, .. }
            | LifecycleEvent::TaskCompleted { occurred_at, .. }
            | LifecycleEvent::TaskReset { occurred_at, .. }
            | LifecycleEvent::TaskCancelled { occurred_at, .. } => *occurred_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_completed_event() {
        let event = LifecycleEvent::TaskCompleted {
            agent_id: AgentId::new("agent-001").unwrap(),
            task_id: TaskId::new(1),
            reward: Decimal::new(2500, 2),
            level: 5,
            occurred_at: Utc::now(),
        };

        assert_eq!(event.task_id(), TaskId::new(1));
    }

    #[test]
    fn task_cancelled_event_without_agent() {
        let event = LifecycleEvent::TaskCancelled {
            task_id: TaskId::new(4),
            agent_id: None,
            occurred_at: Utc::now(),
        };

        assert_eq!(event.task_id(), TaskId::new(4));
    }

    #[test]
    fn event_serializes_with_type_tag() {
        let at = Utc::now();
        let event = LifecycleEvent::TaskStarted {
            agent_id: AgentId::new("agent-002").unwrap(),
            task_id: TaskId::new(3),
            occurred_at: at,
        };

        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], "task_started");
        assert_eq!(json["agent_id"], "agent-002");
        assert_eq!(json["task_id"], 3);
        assert_eq!(event.occurred_at(), at);
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;

/// String identifier of an agent, e.g. `agent-001`
///
/// # Invariants
/// - Cannot be empty or whitespace
/// - Is immutable after construction
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(String);

impl AgentId {
    /// Creates a new AgentId
    ///
    /// # Example
    /// ```
    /// use agent_earnings::domain::agent::AgentId;
    ///
    /// let id = AgentId::new("agent-001").expect("valid id");
    /// assert_eq!(id.as_str(), "agent-001");
    /// assert!(AgentId::new("").is_err());
    /// ```
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Agent id cannot be empty".to_string());
        }
        Ok(AgentId(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Number of completions needed per level
pub const TASKS_PER_LEVEL: u32 = 10;

/// Level reached after `tasks_completed` completions
///
/// Levels start at 1 and go up by one every ten completed tasks.
///
/// ```
/// use agent_earnings::domain::agent::level_for;
///
/// assert_eq!(level_for(0), 1);
/// assert_eq!(level_for(10), 2);
/// assert_eq!(level_for(43), 5);
/// ```
pub fn level_for(tasks_completed: u32) -> u32 {
    tasks_completed / TASKS_PER_LEVEL + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_agent_id() {
        assert!(AgentId::new("agent-001").is_ok());
    }

    #[test]
    fn blank_agent_id_is_rejected() {
        assert!(AgentId::new("").is_err());
        assert!(AgentId::new("   ").is_err());
    }

    #[test]
    fn agent_id_display() {
        let id = AgentId::new("agent-003").unwrap();
        assert_eq!(format!("{}", id), "agent-003");
    }

    #[test]
    fn level_boundaries() {
        assert_eq!(level_for(0), 1);
        assert_eq!(level_for(9), 1);
        assert_eq!(level_for(10), 2);
        assert_eq!(level_for(19), 2);
        assert_eq!(level_for(20), 3);
    }

    #[test]
    fn level_after_one_more_completion_matches_formula() {
        // floor((n + 1) / 10) + 1 for the completed count n before the increment
        for n in 0..200u32 {
            assert_eq!(level_for(n + 1), (n + 1) / 10 + 1);
        }
    }
}

use super::value_objects::{level_for, AgentId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A simulated worker that accumulates earnings and levels by completing tasks
///
/// # Invariants
/// - Name cannot be empty
/// - `total_earned` is never negative and never decreases
/// - `tasks_completed` never decreases
/// - Level is always derived from `tasks_completed`, never stored
///
/// # Example
/// ```
/// use agent_earnings::domain::agent::{Agent, AgentId};
/// use rust_decimal::Decimal;
///
/// let agent = Agent::new(AgentId::new("agent-001").unwrap(), "DataMiner Alpha")
///     .expect("valid agent");
///
/// assert_eq!(agent.level(), 1);
/// assert_eq!(agent.total_earned(), Decimal::ZERO);
/// assert!(!agent.is_active());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    id: AgentId,
    name: String,
    total_earned: Decimal,
    tasks_completed: u32,
    is_active: bool,
}

impl Agent {
    /// Creates an idle agent with no history
    pub fn new(id: AgentId, name: impl Into<String>) -> Result<Self, String> {
        Self::with_history(id, name, 0, Decimal::ZERO)
    }

    /// Creates an idle agent that has already completed some work
    ///
    /// # Returns
    /// * `Err(String)` - If the name is empty or earnings are negative
    pub fn with_history(
        id: AgentId,
        name: impl Into<String>,
        tasks_completed: u32,
        total_earned: Decimal,
    ) -> Result<Self, String> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err("Agent name cannot be empty".to_string());
        }

        if total_earned < Decimal::ZERO {
            return Err(format!("Total earned cannot be negative: {}", total_earned));
        }

        Ok(Self {
            id,
            name,
            total_earned,
            tasks_completed,
            is_active: false,
        })
    }

    /// Marks the agent as working on a task
    pub fn activate(mut self) -> Self {
        self.is_active = true;
        self
    }

    /// Marks the agent as idle without paying anything
    pub fn deactivate(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// Pays out a finished task: idle again, one more completion, reward added
    pub fn credit(mut self, reward: Decimal) -> Self {
        self.is_active = false;
        self.tasks_completed = self.tasks_completed.saturating_add(1);
        // Negative rewards cannot be constructed; clamp anyway so earnings never drop
        self.total_earned += reward.max(Decimal::ZERO);
        self
    }

    // ===== Getters =====

    pub fn id(&self) -> &AgentId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> u32 {
        level_for(self.tasks_completed)
    }

    pub fn total_earned(&self) -> Decimal {
        self.total_earned
    }

    pub fn tasks_completed(&self) -> u32 {
        self.tasks_completed
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }
}

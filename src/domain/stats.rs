use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::agent::Agent;

/// Aggregate figures shown on the dashboard
///
/// Always recomputed from the agents it is given; nothing is cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Stats {
    pub total_earnings: Decimal,
    pub total_tasks_completed: u64,
    pub active_agent_count: usize,
}

impl Stats {
    /// Sums earnings and completions and counts working agents
    ///
    /// ```
    /// use agent_earnings::domain::stats::Stats;
    ///
    /// let stats = Stats::from_agents(&[]);
    /// assert_eq!(stats, Stats::default());
    /// ```
    pub fn from_agents(agents: &[Agent]) -> Self {
        agents.iter().fold(Stats::default(), |mut stats, agent| {
            stats.total_earnings += agent.total_earned();
            stats.total_tasks_completed += u64::from(agent.tasks_completed());
            if agent.is_active() {
                stats.active_agent_count += 1;
            }
            stats
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::agent::AgentId;

    fn agent(id: &str, tasks: u32, earned: Decimal) -> Agent {
        Agent::with_history(AgentId::new(id).unwrap(), id, tasks, earned).unwrap()
    }

    #[test]
    fn empty_collection_is_all_zero() {
        let stats = Stats::from_agents(&[]);

        assert_eq!(stats.total_earnings, Decimal::ZERO);
        assert_eq!(stats.total_tasks_completed, 0);
        assert_eq!(stats.active_agent_count, 0);
    }

    #[test]
    fn sums_earnings_and_tasks() {
        let agents = vec![
            agent("a", 42, Decimal::new(125050, 2)),
            agent("b", 28, Decimal::new(78025, 2)),
            agent("c", 65, Decimal::new(210075, 2)),
        ];

        let stats = Stats::from_agents(&agents);

        assert_eq!(stats.total_earnings, Decimal::new(413150, 2));
        assert_eq!(stats.total_tasks_completed, 135);
        assert_eq!(stats.active_agent_count, 0);
    }

    #[test]
    fn counts_active_agents() {
        let agents = vec![
            agent("a", 0, Decimal::ZERO).activate(),
            agent("b", 0, Decimal::ZERO),
            agent("c", 0, Decimal::ZERO).activate(),
        ];

        assert_eq!(Stats::from_agents(&agents).active_agent_count, 2);
    }
}

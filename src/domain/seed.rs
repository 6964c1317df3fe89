// Fixed data every session starts with

use rust_decimal::Decimal;

use super::agent::{Agent, AgentId};
use super::roster::Roster;
use super::task::{Task, TaskId};

/// Three seasoned agents, all idle
pub fn agents() -> Result<Vec<Agent>, String> {
    Ok(vec![
        Agent::with_history(
            AgentId::new("agent-001")?,
            "DataMiner Alpha",
            42,
            Decimal::new(125050, 2),
        )?,
        Agent::with_history(
            AgentId::new("agent-002")?,
            "CodeBot Beta",
            28,
            Decimal::new(78025, 2),
        )?,
        Agent::with_history(
            AgentId::new("agent-003")?,
            "TaskRunner Gamma",
            65,
            Decimal::new(210075, 2),
        )?,
    ])
}

/// Six tasks, all available
pub fn tasks() -> Result<Vec<Task>, String> {
    Ok(vec![
        Task::new(
            TaskId::new(1),
            "Data Classification",
            "Classify 1000 data points into categories",
            Decimal::new(2500, 2),
            5,
        )?,
        Task::new(
            TaskId::new(2),
            "Code Review",
            "Review and optimize code for performance",
            Decimal::new(5000, 2),
            10,
        )?,
        Task::new(
            TaskId::new(3),
            "Content Moderation",
            "Moderate user-generated content for compliance",
            Decimal::new(1500, 2),
            3,
        )?,
        Task::new(
            TaskId::new(4),
            "API Testing",
            "Test API endpoints and generate report",
            Decimal::new(3500, 2),
            7,
        )?,
        Task::new(
            TaskId::new(5),
            "Database Optimization",
            "Analyze and optimize database queries",
            Decimal::new(7500, 2),
            15,
        )?,
        Task::new(
            TaskId::new(6),
            "Image Processing",
            "Process and tag 500 images",
            Decimal::new(3000, 2),
            8,
        )?,
    ])
}

pub fn roster() -> Result<Roster, String> {
    Roster::new(agents()?, tasks()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::task::TaskStatus;

    #[test]
    fn seeded_levels_match_completed_counts() {
        let levels: Vec<u32> = agents().unwrap().iter().map(Agent::level).collect();

        assert_eq!(levels, vec![5, 3, 7]);
    }

    #[test]
    fn seeded_tasks_are_available_and_ordered() {
        let tasks = tasks().unwrap();

        assert_eq!(tasks.len(), 6);
        assert!(tasks.iter().all(|t| t.status() == TaskStatus::Available));
        let ids: Vec<u32> = tasks.iter().map(|t| t.id().value()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn seeded_roster_has_no_assignments() {
        let roster = roster().unwrap();

        assert!(roster.tasks().iter().all(|t| roster.assignee(t.id()).is_none()));
        assert_eq!(roster.stats().total_tasks_completed, 135);
    }
}

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use super::agent::{Agent, AgentId};
use super::stats::Stats;
use super::task::{Task, TaskId};

/// Immutable snapshot of every agent, every task, and who is working on what
///
/// Collections are shared behind `Arc`, so cloning a roster is cheap. Updates
/// never touch a snapshot in place: `replace_agent`, `replace_task`, `assign`
/// and `unassign` return a new roster and leave the original untouched, which
/// lets a reader keep rendering the old state while a mutation is in flight.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    agents: Arc<Vec<Agent>>,
    tasks: Arc<Vec<Task>>,
    assignments: Arc<BTreeMap<TaskId, AgentId>>,
}

impl Roster {
    /// Builds a roster with no task in progress
    ///
    /// # Returns
    /// * `Err(String)` - If two agents or two tasks share an id
    pub fn new(agents: Vec<Agent>, tasks: Vec<Task>) -> Result<Self, String> {
        let mut agent_ids = HashSet::new();
        for agent in &agents {
            if !agent_ids.insert(agent.id()) {
                return Err(format!("Duplicate agent id: {}", agent.id()));
            }
        }

        let mut task_ids = HashSet::new();
        for task in &tasks {
            if !task_ids.insert(task.id()) {
                return Err(format!("Duplicate task id: {}", task.id()));
            }
        }

        Ok(Self {
            agents: Arc::new(agents),
            tasks: Arc::new(tasks),
            assignments: Arc::new(BTreeMap::new()),
        })
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn agent(&self, id: &AgentId) -> Option<&Agent> {
        self.agents.iter().find(|agent| agent.id() == id)
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id() == id)
    }

    /// Agent currently working on `task`, if any
    pub fn assignee(&self, task: TaskId) -> Option<&AgentId> {
        self.assignments.get(&task)
    }

    pub fn stats(&self) -> Stats {
        Stats::from_agents(&self.agents)
    }

    /// Returns a roster where the agent with the same id is swapped for `agent`
    ///
    /// Unknown ids leave the agent list as it was.
    pub fn replace_agent(&self, agent: Agent) -> Self {
        let agents = self
            .agents
            .iter()
            .map(|existing| {
                if existing.id() == agent.id() {
                    agent.clone()
                } else {
                    existing.clone()
                }
            })
            .collect();

        Self {
            agents: Arc::new(agents),
            ..self.clone()
        }
    }

    /// Returns a roster where the task with the same id is swapped for `task`
    ///
    /// Unknown ids leave the task list as it was.
    pub fn replace_task(&self, task: Task) -> Self {
        let tasks = self
            .tasks
            .iter()
            .map(|existing| {
                if existing.id() == task.id() {
                    task.clone()
                } else {
                    existing.clone()
                }
            })
            .collect();

        Self {
            tasks: Arc::new(tasks),
            ..self.clone()
        }
    }

    pub fn assign(&self, task: TaskId, agent: AgentId) -> Self {
        let mut assignments = (*self.assignments).clone();
        assignments.insert(task, agent);

        Self {
            assignments: Arc::new(assignments),
            ..self.clone()
        }
    }

    pub fn unassign(&self, task: TaskId) -> Self {
        if !self.assignments.contains_key(&task) {
            return self.clone();
        }

        let mut assignments = (*self.assignments).clone();
        assignments.remove(&task);

        Self {
            assignments: Arc::new(assignments),
            ..self.clone()
        }
    }
}

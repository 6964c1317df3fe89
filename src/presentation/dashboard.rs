use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::agent::{Agent, AgentId};
use crate::domain::roster::Roster;
use crate::domain::task::{Task, TaskId, TaskStatus};
use crate::lifecycle::{LifecycleEngine, LifecycleResult};

/// Aggregate cards at the top of the dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsCard {
    pub total_earnings: String,
    pub tasks_completed: u64,
    pub active_agents: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentCard {
    pub id: AgentId,
    pub name: String,
    pub level: u32,
    pub earned: String,
    pub tasks_completed: u32,
    pub status: &'static str,
    pub selected: bool,
}

impl AgentCard {
    fn new(agent: &Agent, selected: Option<&AgentId>) -> Self {
        Self {
            id: agent.id().clone(),
            name: agent.name().to_string(),
            level: agent.level(),
            earned: money(agent.total_earned()),
            tasks_completed: agent.tasks_completed(),
            status: if agent.is_active() { "Working..." } else { "Idle" },
            selected: selected == Some(agent.id()),
        }
    }
}

/// What the footer of a task card offers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TaskAction {
    /// Start button, disabled while the selected agent is working
    Start { enabled: bool },
    InProgress,
    Completed,
    SelectAgentFirst,
}

impl TaskAction {
    pub fn label(&self) -> &'static str {
        match self {
            TaskAction::Start { enabled: true } => "Start Task",
            TaskAction::Start { enabled: false } => "Start Task (agent busy)",
            TaskAction::InProgress => "In Progress...",
            TaskAction::Completed => "Completed!",
            TaskAction::SelectAgentFirst => "Select an agent first",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskCard {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub reward: String,
    pub duration: String,
    pub status: TaskStatus,
    pub action: TaskAction,
}

impl TaskCard {
    fn new(task: &Task, selected_agent: Option<&Agent>) -> Self {
        let action = match (task.status(), selected_agent) {
            (TaskStatus::InProgress, _) => TaskAction::InProgress,
            (TaskStatus::Completed, _) => TaskAction::Completed,
            (TaskStatus::Available, None) => TaskAction::SelectAgentFirst,
            (TaskStatus::Available, Some(agent)) => TaskAction::Start {
                enabled: !agent.is_active(),
            },
        };

        Self {
            id: task.id(),
            title: task.title().to_string(),
            description: task.description().to_string(),
            reward: money(task.reward()),
            duration: format!("{}s", task.duration()),
            status: task.status(),
            action,
        }
    }
}

/// Everything the dashboard shows, computed from one roster snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub stats: StatsCard,
    pub agents: Vec<AgentCard>,
    pub tasks: Vec<TaskCard>,
    pub selected_agent: Option<AgentId>,
}

impl DashboardView {
    pub fn build(roster: &Roster, selected: Option<&AgentId>) -> Self {
        let stats = roster.stats();
        // A selection that points at no agent behaves like no selection
        let selected_agent = selected.and_then(|id| roster.agent(id));

        Self {
            stats: StatsCard {
                total_earnings: money(stats.total_earnings),
                tasks_completed: stats.total_tasks_completed,
                active_agents: stats.active_agent_count,
            },
            agents: roster
                .agents()
                .iter()
                .map(|agent| AgentCard::new(agent, selected))
                .collect(),
            tasks: roster
                .tasks()
                .iter()
                .map(|task| TaskCard::new(task, selected_agent))
                .collect(),
            selected_agent: selected_agent.map(|agent| agent.id().clone()),
        }
    }

    /// Builds the view from the engine's current snapshot and selection
    pub async fn capture(engine: &LifecycleEngine) -> LifecycleResult<Self> {
        let roster = engine.snapshot().await?;
        let selected = engine.selected_agent().await;
        Ok(Self::build(&roster, selected.as_ref()))
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn render_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for DashboardView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Agent Earnings Platform")?;
        writeln!(
            f,
            "Total Earnings: {} | Tasks Completed: {} | Active Agents: {}",
            self.stats.total_earnings, self.stats.tasks_completed, self.stats.active_agents
        )?;

        writeln!(f, "\nYour Agents")?;
        for agent in &self.agents {
            writeln!(
                f,
                "  [{}] {} ({})  Lvl {}  Earned: {}  Tasks: {}  Status: {}",
                if agent.selected { 'x' } else { ' ' },
                agent.name,
                agent.id,
                agent.level,
                agent.earned,
                agent.tasks_completed,
                agent.status
            )?;
        }

        writeln!(f, "\nAvailable Tasks")?;
        for task in &self.tasks {
            writeln!(
                f,
                "  #{} {}  Reward: {}  Duration: {}  [{}]",
                task.id,
                task.title,
                task.reward,
                task.duration,
                task.action.label()
            )?;
        }

        Ok(())
    }
}

/// Dollar amount with exactly two decimals, e.g. `$1250.50`
pub fn money(amount: Decimal) -> String {
    format!("${:.2}", amount.round_dp(2))
}

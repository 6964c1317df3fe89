//! Dashboard integration tests
//!
//! These tests verify that the dashboard view tracks the engine as a user
//! selects an agent and runs a task through its cycle.

use std::time::Duration;

use agent_earnings::domain::agent::AgentId;
use agent_earnings::domain::task::TaskId;
use agent_earnings::lifecycle::{EngineConfig, LifecycleEngine};
use agent_earnings::presentation::{DashboardView, TaskAction};
use tokio::time::sleep;

#[tokio::test(start_paused = true)]
async fn test_dashboard_follows_task_cycle() {
    let engine = LifecycleEngine::init(EngineConfig::default()).unwrap();
    let dataminer = AgentId::new("agent-001").unwrap();

    engine.select_agent(&dataminer).await.unwrap();
    let view = DashboardView::capture(&engine).await.unwrap();
    assert_eq!(view.selected_agent, Some(dataminer.clone()));
    assert_eq!(view.tasks[0].action, TaskAction::Start { enabled: true });

    engine.start_selected(TaskId::new(1)).await.unwrap();
    let view = DashboardView::capture(&engine).await.unwrap();
    assert_eq!(view.stats.active_agents, 1);
    assert_eq!(view.agents[0].status, "Working...");
    assert_eq!(view.tasks[0].action, TaskAction::InProgress);
    assert_eq!(view.tasks[1].action, TaskAction::Start { enabled: false });

    sleep(Duration::from_millis(5_100)).await;
    let view = DashboardView::capture(&engine).await.unwrap();
    assert_eq!(view.stats.total_earnings, "$4156.50");
    assert_eq!(view.stats.tasks_completed, 136);
    assert_eq!(view.agents[0].earned, "$1275.50");
    assert_eq!(view.agents[0].level, 5);
    assert_eq!(view.tasks[0].action, TaskAction::Completed);
    assert!(view.render_text().contains("[Completed!]"));

    sleep(Duration::from_secs(3)).await;
    let view = DashboardView::capture(&engine).await.unwrap();
    assert_eq!(view.tasks[0].action, TaskAction::Start { enabled: true });
    assert_eq!(view.stats.active_agents, 0);
}

#[tokio::test]
async fn test_dashboard_json_snapshot() {
    let engine = LifecycleEngine::init(EngineConfig::default()).unwrap();

    let json = DashboardView::capture(&engine).await.unwrap().to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["stats"]["total_earnings"], "$4131.50");
    assert_eq!(value["agents"].as_array().unwrap().len(), 3);
    assert_eq!(value["tasks"][4]["reward"], "$75.00");
    assert_eq!(value["tasks"][4]["duration"], "15s");
    assert!(value["selected_agent"].is_null());
}

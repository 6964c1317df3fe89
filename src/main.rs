use std::error::Error;

use agent_earnings::config::{Config, OutputFormat};
use agent_earnings::domain::agent::AgentId;
use agent_earnings::domain::events::LifecycleEvent;
use agent_earnings::domain::task::TaskId;
use agent_earnings::lifecycle::LifecycleEngine;
use agent_earnings::presentation::DashboardView;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::EnvFilter;

/// Agent/task pairs the demo clicks through, in order
const DEMO_RUNS: [(&str, u32); 3] = [("agent-001", 1), ("agent-002", 3), ("agent-003", 5)];

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;
    tracing::info!(
        guard = %config.engine.guard,
        time_scale = config.engine.time_scale,
        reset_delay = ?config.engine.reset_delay,
        "Starting simulation"
    );

    let engine = LifecycleEngine::init(config.engine.clone())?;
    let mut events = engine.subscribe();
    render(&engine, config.output).await?;

    for (agent, task) in DEMO_RUNS {
        let agent = AgentId::new(agent)?;
        engine.select_agent(&agent).await?;
        engine.start_selected(TaskId::new(task)).await?;
        // Clicking the same card again deselects it
        engine.select_agent(&agent).await?;
    }
    render(&engine, config.output).await?;

    let mut outstanding = DEMO_RUNS.len();
    while outstanding > 0 {
        match events.recv().await {
            Ok(event) => {
                if matches!(event, LifecycleEvent::TaskReset { .. }) {
                    outstanding -= 1;
                }
                render(&engine, config.output).await?;
            }
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Dashboard fell behind on events");
            }
            Err(RecvError::Closed) => break,
        }
    }

    let stats = engine.stats().await?;
    tracing::info!(
        total_earnings = %stats.total_earnings,
        total_tasks_completed = stats.total_tasks_completed,
        "Simulation finished"
    );

    Ok(())
}

async fn render(engine: &LifecycleEngine, output: OutputFormat) -> Result<(), Box<dyn Error>> {
    let view = DashboardView::capture(engine).await?;
    match output {
        OutputFormat::Text => println!("{}", view.render_text()),
        OutputFormat::Json => println!("{}", view.to_json()?),
    }
    Ok(())
}

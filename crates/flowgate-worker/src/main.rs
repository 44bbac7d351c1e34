use anyhow::{Context, Result};
use flowgate_core::StateMap;
use flowgate_engine::run_supervised;
use flowgate_worker::{bootstrap, WorkerConfig};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before the filter reads RUST_LOG
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "flowgate_worker=debug,flowgate_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Ok(path) = dotenv {
        tracing::info!("Loaded .env from {:?}", path);
    }

    tracing::info!("flowgate-worker starting...");

    let config = WorkerConfig::from_env();
    tracing::info!(
        demo_events = config.demo_events,
        run_workflow = ?config.run_workflow,
        restart_delay_ms = config.restart_delay.as_millis() as u64,
        "Worker configured"
    );

    let platform = bootstrap::platform();
    tracing::info!(
        agents = platform.list_agents().len(),
        workflows = platform.list_workflows().len(),
        "Platform bootstrapped"
    );

    let cancel = CancellationToken::new();
    let supervisor = tokio::spawn(run_supervised(
        platform.orchestrator(),
        cancel.clone(),
        config.restart_delay,
    ));

    if let Some(workflow_id) = &config.run_workflow {
        let instance = platform
            .trigger_workflow(workflow_id, StateMap::new(), &cancel)
            .await
            .with_context(|| format!("Failed to run workflow '{workflow_id}'"))?;
        let json = serde_json::to_string_pretty(&instance)
            .context("Failed to serialize workflow instance")?;
        tracing::info!(
            instance_id = %instance.instance_id,
            status = %instance.status,
            "Workflow run finished\n{json}"
        );
    }

    if config.demo_events {
        for event in bootstrap::demo_events() {
            tracing::debug!(event_type = %event.event_type, "Publishing demo event");
            platform
                .publish_event(event)
                .await
                .context("Failed to publish demo event")?;
        }
    }

    tracing::info!("Worker ready, waiting for shutdown signal...");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    tracing::info!("Received shutdown signal");

    cancel.cancel();
    supervisor.await.context("Orchestrator supervisor panicked")?;

    let dashboard = platform.dashboard().await.context("Failed to build dashboard")?;
    tracing::info!(
        workflows = dashboard.summary.total_workflows_executed,
        cost_saved = %dashboard.summary.total_cost_saved,
        audit_entries = dashboard.total_audit_entries,
        "Worker shutdown complete"
    );
    Ok(())
}

//! FanPlay - Moment Analysis Service
//!
//! Turns a sports highlight (link or upload) into a persona-tailored guide:
//! identified event, foundational rules, narrative and grounding sources.

use std::sync::Arc;

use fanplay_controller::{MomentOrchestrator, OrchestratorConfig};
use fanplay_core::config::AppConfig;
use fanplay_gateway::{GatewayConfig, GatewayServer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;

    fanplay_governance::configure_tracing(config.telemetry.json_logs)?;

    tracing::info!("Starting FanPlay v{}", env!("CARGO_PKG_VERSION"));

    // =========================================================================
    // Engine
    // =========================================================================
    let engine = Arc::new(fanplay_model_gateway::create_client_from_config(&config.engine)?);
    tracing::info!(
        model = %config.engine.model,
        api_base = %config.engine.api_base,
        timeout_ms = config.engine.timeout_ms,
        "Gemini engine initialized"
    );

    // =========================================================================
    // Orchestrator
    // =========================================================================
    let orchestrator = Arc::new(MomentOrchestrator::new(engine).with_config(OrchestratorConfig {
        model: config.engine.model.clone(),
        enable_search: config.engine.enable_search,
    }));

    // =========================================================================
    // Gateway
    // =========================================================================
    let gateway_config = GatewayConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        enable_cors: config.server.enable_cors,
        enable_tracing: true,
        max_body_bytes: config.server.max_upload_bytes,
        session_idle_timeout: std::time::Duration::from_secs(config.server.session_idle_secs),
    };

    let mut server = GatewayServer::new(gateway_config, orchestrator);

    if config.telemetry.metrics_enabled {
        let handle = fanplay_governance::setup_metrics_recorder()?;
        server = server.with_metrics(handle);
        tracing::info!("Prometheus metrics exposed at /metrics");
    }

    tracing::info!(
        host = %config.server.host,
        port = config.server.port,
        search = config.engine.enable_search,
        "Gateway initialized"
    );

    server.run().await?;

    Ok(())
}

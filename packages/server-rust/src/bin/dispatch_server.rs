//! `dispatch-server` binary: dispatch over HTTP against the dry-run platform.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use discord_dispatch_core::ActionRegistry;
use discord_dispatch_server::telemetry::{init_tracing, install_metrics_exporter};
use discord_dispatch_server::{Dispatcher, DryRunPlatform, NetworkModule, ServerConfig};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse();
    init_tracing(config.log_format)?;

    if let Some(addr) = config.metrics_addr {
        install_metrics_exporter(addr)?;
        info!(%addr, "Prometheus metrics listener started");
    }

    let registry = ActionRegistry::builtin().context("builtin action registry is inconsistent")?;
    info!(
        categories = registry.category_names().len(),
        resources = registry.resource_names().len(),
        "action registry loaded"
    );

    let dispatcher = Arc::new(Dispatcher::new(
        Arc::new(registry),
        Arc::new(DryRunPlatform::new()),
    ));

    let mut module = NetworkModule::new(config.network(), dispatcher);
    let port = module.start().await?;
    info!(host = %config.host, port, "dispatch server listening");

    module.serve(shutdown_signal()).await
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "ctrl-c handler unavailable; running until killed");
        std::future::pending::<()>().await;
    }
}

use anyhow::Result;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::core::config::{self, RuntimeContext, ServeConfig, Variant};
use crate::core::executive::client::GatewayClient;
use crate::core::executive::controller::OperationController;
use crate::core::lifecycle::LifecycleManager;
use crate::core::process::{ProcessResolver, StaticProcessTable};
use crate::core::solution::SolutionCatalog;
use crate::core::terminal;
use crate::interfaces::web::{HmiServer, HmiServerConfig, IndexTemplate};

/// Everything the server needs, read before the first request is accepted.
/// Any failure here ends the process.
pub(crate) async fn build_server(config: &ServeConfig) -> Result<(HmiServer, String)> {
    let context = RuntimeContext::load(&config.runtime_context_path).await?;
    let base_url = config::base_url(&config.base_url_fmt, &context.name)?;
    let index = IndexTemplate::load(config.frontend_dir.join("index.html")).await?;

    let gateway = GatewayClient::new(&config.ingress_address, config.request_timeout)?;
    info!(
        "Connecting to executive through {} (timeout {:?})",
        config.ingress_address, config.request_timeout
    );

    let (resolver, catalog) = match config.variant {
        Variant::Static => {
            let table = StaticProcessTable::load(&config.processes_dir).await?;
            (ProcessResolver::Static(table), None)
        }
        Variant::Catalog => {
            let catalog: Arc<dyn SolutionCatalog> = Arc::new(gateway.clone());
            (ProcessResolver::Catalog(catalog.clone()), Some(catalog))
        }
    };

    let controller = OperationController::new(Arc::new(gateway), config.simulation_mode())
        .with_exclusive_start(config.exclusive_start);

    let address = format!("0.0.0.0:{}", context.http_port);
    let server = HmiServer::new(HmiServerConfig {
        controller,
        resolver,
        catalog,
        index,
        base_url: base_url.clone(),
        frontend_dir: config.frontend_dir.clone(),
        address,
    });
    Ok((server, base_url))
}

pub(crate) async fn run_server(config: ServeConfig) -> Result<()> {
    let (server, base_url) = build_server(&config).await?;
    let server = Arc::new(Mutex::new(server));

    let mut lifecycle = LifecycleManager::new();
    lifecycle.attach(server);
    lifecycle.start().await?;
    debug!("Lifecycle state: {:?}", lifecycle.state());

    terminal::print_startup_summary(&terminal::StartupSummary {
        variant: &format!("{:?}", config.variant),
        simulation: &format!("{:?}", config.simulation_mode()),
        ingress: &config.ingress_address,
        base_url: &base_url,
    });

    tokio::signal::ctrl_c().await?;
    lifecycle.shutdown().await
}

mod handlers;
pub(crate) mod response;
mod router;

pub use handlers::frontend::IndexTemplate;

use anyhow::Result;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::info;

use crate::core::executive::controller::OperationController;
use crate::core::lifecycle::LifecycleComponent;
use crate::core::process::ProcessResolver;
use crate::core::solution::SolutionCatalog;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) controller: Arc<OperationController>,
    pub(crate) resolver: Arc<ProcessResolver>,
    /// Present only in the catalog variant; enables the `/api/solution/*` routes.
    pub(crate) catalog: Option<Arc<dyn SolutionCatalog>>,
    pub(crate) index_html: Arc<str>,
    pub(crate) frontend_dir: PathBuf,
}

pub struct HmiServerConfig {
    pub controller: OperationController,
    pub resolver: ProcessResolver,
    pub catalog: Option<Arc<dyn SolutionCatalog>>,
    pub index: IndexTemplate,
    pub base_url: String,
    pub frontend_dir: PathBuf,
    pub address: String,
}

/// HTTP server for the HMI frontend and its executive API. Owns its route
/// table and every dependency the handlers reach.
pub struct HmiServer {
    state: AppState,
    address: String,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl HmiServer {
    pub fn new(config: HmiServerConfig) -> Self {
        let index_html: Arc<str> = config.index.render(&config.base_url).into();
        Self {
            state: AppState {
                controller: Arc::new(config.controller),
                resolver: Arc::new(config.resolver),
                catalog: config.catalog,
                index_html,
                frontend_dir: config.frontend_dir,
            },
            address: config.address,
            shutdown_tx: None,
            task: None,
        }
    }
}

#[async_trait]
impl LifecycleComponent for HmiServer {
    async fn on_init(&mut self) -> Result<()> {
        info!(
            "HMI server initializing (catalog routes: {})...",
            self.state.catalog.is_some()
        );
        Ok(())
    }

    async fn on_start(&mut self) -> Result<()> {
        let app = router::build_router(self.state.clone());
        let listener = tokio::net::TcpListener::bind(&self.address).await?;
        info!("Listening at {}", listener.local_addr()?);

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        self.shutdown_tx = Some(shutdown_tx);
        self.task = Some(tokio::spawn(async move {
            let served = axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await;
            if let Err(e) = served {
                tracing::error!("HMI server crashed: {}", e);
            }
        }));
        Ok(())
    }

    async fn on_shutdown(&mut self) -> Result<()> {
        info!("HMI server shutting down...");
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            task.await?;
        }
        Ok(())
    }
}

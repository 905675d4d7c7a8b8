use anyhow::Result;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

#[derive(Debug, PartialEq)]
pub enum LifecycleState {
    Init,
    Serving,
    Shutdown,
}

#[async_trait::async_trait]
pub trait LifecycleComponent {
    async fn on_init(&mut self) -> Result<()> {
        Ok(())
    }
    async fn on_start(&mut self) -> Result<()> {
        Ok(())
    }
    async fn on_shutdown(&mut self) -> Result<()> {
        Ok(())
    }
}

pub struct LifecycleManager {
    state: LifecycleState,
    components: Vec<Arc<Mutex<dyn LifecycleComponent + Send + Sync>>>,
}

impl Default for LifecycleManager {
    fn default() -> Self {
        Self::new()
    }
}

impl LifecycleManager {
    pub fn new() -> Self {
        Self {
            state: LifecycleState::Init,
            components: Vec::new(),
        }
    }

    pub fn state(&self) -> &LifecycleState {
        &self.state
    }

    pub fn attach(&mut self, component: Arc<Mutex<dyn LifecycleComponent + Send + Sync>>) {
        self.components.push(component);
    }

    pub async fn start(&mut self) -> Result<()> {
        info!("Lifecycle Phase: Init");
        self.state = LifecycleState::Init;
        for comp in &self.components {
            comp.lock().await.on_init().await?;
        }

        for comp in &self.components {
            comp.lock().await.on_start().await?;
        }

        info!("Lifecycle Phase: Serving");
        self.state = LifecycleState::Serving;
        Ok(())
    }

    pub async fn shutdown(&mut self) -> Result<()> {
        info!("Lifecycle Phase: Shutdown");
        self.state = LifecycleState::Shutdown;

        // Reverse order so the server stops before anything it depends on.
        for comp in self.components.iter().rev() {
            if let Err(e) = comp.lock().await.on_shutdown().await {
                warn!("Component shutdown error: {}", e);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Recorder {
        name: &'static str,
        log: Arc<std::sync::Mutex<Vec<String>>>,
        fail_shutdown: bool,
    }

    #[async_trait::async_trait]
    impl LifecycleComponent for Recorder {
        async fn on_init(&mut self) -> Result<()> {
            self.log.lock().unwrap().push(format!("{}:init", self.name));
            Ok(())
        }
        async fn on_start(&mut self) -> Result<()> {
            self.log.lock().unwrap().push(format!("{}:start", self.name));
            Ok(())
        }
        async fn on_shutdown(&mut self) -> Result<()> {
            self.log
                .lock()
                .unwrap()
                .push(format!("{}:shutdown", self.name));
            if self.fail_shutdown {
                anyhow::bail!("boom");
            }
            Ok(())
        }
    }

    fn recorder(
        name: &'static str,
        log: &Arc<std::sync::Mutex<Vec<String>>>,
        fail_shutdown: bool,
    ) -> Arc<Mutex<dyn LifecycleComponent + Send + Sync>> {
        Arc::new(Mutex::new(Recorder {
            name,
            log: log.clone(),
            fail_shutdown,
        }))
    }

    #[tokio::test]
    async fn runs_phases_in_order_and_shuts_down_in_reverse() {
        let log = Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut manager = LifecycleManager::new();
        manager.attach(recorder("a", &log, false));
        manager.attach(recorder("b", &log, false));

        manager.start().await.unwrap();
        assert_eq!(manager.state(), &LifecycleState::Serving);
        manager.shutdown().await.unwrap();
        assert_eq!(manager.state(), &LifecycleState::Shutdown);

        assert_eq!(
            *log.lock().unwrap(),
            vec![
                "a:init",
                "b:init",
                "a:start",
                "b:start",
                "b:shutdown",
                "a:shutdown"
            ]
        );
    }

    #[tokio::test]
    async fn shutdown_errors_do_not_stop_other_components() {
        let log = Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut manager = LifecycleManager::new();
        manager.attach(recorder("a", &log, false));
        manager.attach(recorder("b", &log, true));

        manager.start().await.unwrap();
        manager.shutdown().await.unwrap();
        assert!(log.lock().unwrap().contains(&"a:shutdown".to_string()));
    }
}

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::core::executive::SimulationMode;

/// Well-known location of the runtime context on deployed devices.
pub const DEFAULT_RUNTIME_CONTEXT_PATH: &str = "/etc/hmi/runtime_context.toml";
/// Works when the device is reached at the root path in a browser. Used for
/// the `<base>` tag of the index page so relative URLs resolve correctly.
pub const DEFAULT_BASE_URL_FMT: &str = "/ext/services/%s/";
pub const DEFAULT_INGRESS_ADDRESS: &str = "istio-ingressgateway.app-ingress.svc.cluster.local:80";
pub const DEFAULT_FRONTEND_DIR: &str = "frontend";
pub const DEFAULT_PROCESSES_DIR: &str = "processes";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Values handed to the service by the platform before startup.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct RuntimeContext {
    #[serde(alias = "httpPort")]
    pub http_port: u16,
    pub name: String,
}

impl RuntimeContext {
    /// Reads TOML, or JSON when the file name ends in `.json`.
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read runtime context {}", path.display()))?;
        let context: RuntimeContext = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)?
        } else {
            toml::from_str(&content)?
        };
        info!(
            "Loaded runtime context: name={}, http_port={}",
            context.name, context.http_port
        );
        Ok(context)
    }
}

/// Where processes come from. Each variant also implies a simulation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// Predefined processes read from files at startup, run in draft simulation.
    Static,
    /// Processes fetched by name from the solution service, run for real.
    Catalog,
}

impl Variant {
    pub fn default_simulation_mode(self) -> SimulationMode {
        match self {
            Variant::Static => SimulationMode::Draft,
            Variant::Catalog => SimulationMode::Reality,
        }
    }
}

impl std::str::FromStr for Variant {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "static" => Ok(Variant::Static),
            "catalog" => Ok(Variant::Catalog),
            other => bail!("unknown variant '{other}' (expected 'static' or 'catalog')"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServeConfig {
    pub runtime_context_path: PathBuf,
    pub base_url_fmt: String,
    pub ingress_address: String,
    pub variant: Variant,
    pub processes_dir: PathBuf,
    pub frontend_dir: PathBuf,
    pub simulation_mode: Option<SimulationMode>,
    pub request_timeout: Duration,
    pub exclusive_start: bool,
    pub log_level: tracing::Level,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            runtime_context_path: PathBuf::from(DEFAULT_RUNTIME_CONTEXT_PATH),
            base_url_fmt: DEFAULT_BASE_URL_FMT.to_string(),
            ingress_address: DEFAULT_INGRESS_ADDRESS.to_string(),
            variant: Variant::Static,
            processes_dir: PathBuf::from(DEFAULT_PROCESSES_DIR),
            frontend_dir: PathBuf::from(DEFAULT_FRONTEND_DIR),
            simulation_mode: None,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            exclusive_start: false,
            log_level: tracing::Level::INFO,
        }
    }
}

impl ServeConfig {
    pub fn simulation_mode(&self) -> SimulationMode {
        self.simulation_mode
            .unwrap_or_else(|| self.variant.default_simulation_mode())
    }
}

/// Substitutes the service name into a base URL format with exactly one `%s`.
pub fn base_url(format: &str, service_name: &str) -> Result<String> {
    if format.matches("%s").count() != 1 {
        bail!("base URL format '{format}' must contain exactly one %s");
    }
    if !format.ends_with('/') {
        bail!("base URL format '{format}' must end with a trailing slash");
    }
    Ok(format.replacen("%s", service_name, 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_substitutes_service_name() {
        assert_eq!(
            base_url(DEFAULT_BASE_URL_FMT, "hmi").unwrap(),
            "/ext/services/hmi/"
        );
    }

    #[test]
    fn base_url_requires_one_placeholder_and_trailing_slash() {
        assert!(base_url("/ext/services/", "hmi").is_err());
        assert!(base_url("/%s/%s/", "hmi").is_err());
        assert!(base_url("/ext/services/%s", "hmi").is_err());
    }

    #[test]
    fn variant_selects_simulation_mode() {
        assert_eq!(
            Variant::Static.default_simulation_mode(),
            SimulationMode::Draft
        );
        assert_eq!(
            Variant::Catalog.default_simulation_mode(),
            SimulationMode::Reality
        );
    }

    #[test]
    fn explicit_simulation_mode_overrides_variant() {
        let config = ServeConfig {
            variant: Variant::Catalog,
            simulation_mode: Some(SimulationMode::Draft),
            ..ServeConfig::default()
        };
        assert_eq!(config.simulation_mode(), SimulationMode::Draft);
    }

    #[test]
    fn variant_parses_flag_values() {
        assert_eq!("static".parse::<Variant>().unwrap(), Variant::Static);
        assert_eq!("catalog".parse::<Variant>().unwrap(), Variant::Catalog);
        assert!("both".parse::<Variant>().is_err());
    }

    #[tokio::test]
    async fn loads_toml_runtime_context() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runtime_context.toml");
        std::fs::write(&path, "http_port = 8080\nname = \"hmi\"\n").unwrap();

        let context = RuntimeContext::load(&path).await.unwrap();
        assert_eq!(
            context,
            RuntimeContext {
                http_port: 8080,
                name: "hmi".into()
            }
        );
    }

    #[tokio::test]
    async fn loads_json_runtime_context() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runtime_context.json");
        std::fs::write(&path, r#"{"httpPort": 9090, "name": "line-3-hmi"}"#).unwrap();

        let context = RuntimeContext::load(&path).await.unwrap();
        assert_eq!(context.http_port, 9090);
        assert_eq!(context.name, "line-3-hmi");
    }

    #[tokio::test]
    async fn missing_runtime_context_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(
            RuntimeContext::load(dir.path().join("absent.toml"))
                .await
                .is_err()
        );
    }
}

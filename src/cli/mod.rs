mod serve;

use anyhow::{Context, Result, bail};
use std::path::PathBuf;
use std::time::Duration;

use crate::core::config::ServeConfig;
use crate::core::terminal;

pub(crate) async fn run_main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        terminal::print_usage();
        return Ok(());
    }

    let config = parse_serve_flags(&args, 1, ServeConfig::default())?;
    crate::logging::init(config.log_level);
    serve::run_server(config).await
}

/// Applies `--flag value` pairs on top of `config`. Unknown arguments are skipped.
pub(crate) fn parse_serve_flags(
    args: &[String],
    start: usize,
    mut config: ServeConfig,
) -> Result<ServeConfig> {
    let mut i = start;
    while i < args.len() {
        let flag = args[i].as_str();
        if flag == "--exclusive-start" {
            config.exclusive_start = true;
            i += 1;
            continue;
        }

        let value = move || flag_value(args, i, flag);
        match flag {
            "--runtime-context-path" => config.runtime_context_path = PathBuf::from(value()?),
            "--base-url-fmt" => config.base_url_fmt = value()?.to_string(),
            "--ingress-address" => config.ingress_address = value()?.to_string(),
            "--variant" => config.variant = value()?.parse()?,
            "--processes-dir" => config.processes_dir = PathBuf::from(value()?),
            "--frontend-dir" => config.frontend_dir = PathBuf::from(value()?),
            "--simulation-mode" => config.simulation_mode = Some(value()?.parse()?),
            "--request-timeout-secs" => {
                let secs: u64 = value()?
                    .parse()
                    .with_context(|| format!("invalid value for {flag}"))?;
                if secs == 0 {
                    bail!("{flag} must be greater than zero");
                }
                config.request_timeout = Duration::from_secs(secs);
            }
            "--log-level" => {
                let raw = value()?;
                config.log_level = crate::logging::parse_level(raw)
                    .with_context(|| format!("unknown log level '{raw}'"))?;
            }
            _ => {
                i += 1;
                continue;
            }
        }
        i += 2;
    }
    Ok(config)
}

fn flag_value<'a>(args: &'a [String], i: usize, flag: &str) -> Result<&'a str> {
    args.get(i + 1)
        .map(String::as_str)
        .with_context(|| format!("flag {flag} requires a value"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Variant;
    use crate::core::executive::SimulationMode;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("executive-hmi")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn defaults_when_no_flags() {
        let config = parse_serve_flags(&args(&[]), 1, ServeConfig::default()).unwrap();
        assert_eq!(config.variant, Variant::Static);
        assert_eq!(config.simulation_mode(), SimulationMode::Draft);
        assert_eq!(config.base_url_fmt, "/ext/services/%s/");
        assert!(!config.exclusive_start);
    }

    #[test]
    fn parses_all_flags() {
        let config = parse_serve_flags(
            &args(&[
                "--runtime-context-path",
                "/tmp/rc.json",
                "--base-url-fmt",
                "/hmi/%s/",
                "--ingress-address",
                "localhost:17080",
                "--variant",
                "catalog",
                "--processes-dir",
                "/opt/processes",
                "--frontend-dir",
                "/opt/frontend",
                "--simulation-mode",
                "draft",
                "--request-timeout-secs",
                "5",
                "--exclusive-start",
                "--log-level",
                "debug",
            ]),
            1,
            ServeConfig::default(),
        )
        .unwrap();

        assert_eq!(config.runtime_context_path, PathBuf::from("/tmp/rc.json"));
        assert_eq!(config.base_url_fmt, "/hmi/%s/");
        assert_eq!(config.ingress_address, "localhost:17080");
        assert_eq!(config.variant, Variant::Catalog);
        assert_eq!(config.processes_dir, PathBuf::from("/opt/processes"));
        assert_eq!(config.frontend_dir, PathBuf::from("/opt/frontend"));
        assert_eq!(config.simulation_mode(), SimulationMode::Draft);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert!(config.exclusive_start);
        assert_eq!(config.log_level, tracing::Level::DEBUG);
    }

    #[test]
    fn unknown_flags_are_skipped() {
        let config = parse_serve_flags(
            &args(&["--verbose", "--variant", "catalog"]),
            1,
            ServeConfig::default(),
        )
        .unwrap();
        assert_eq!(config.variant, Variant::Catalog);
    }

    #[test]
    fn missing_value_is_an_error() {
        assert!(parse_serve_flags(&args(&["--variant"]), 1, ServeConfig::default()).is_err());
    }

    #[test]
    fn invalid_values_are_errors() {
        for bad in [
            &["--variant", "hybrid"][..],
            &["--simulation-mode", "physics"][..],
            &["--request-timeout-secs", "0"][..],
            &["--request-timeout-secs", "soon"][..],
            &["--log-level", "chatty"][..],
        ] {
            assert!(
                parse_serve_flags(&args(bad), 1, ServeConfig::default()).is_err(),
                "{bad:?}"
            );
        }
    }
}

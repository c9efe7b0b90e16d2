use anyhow::Result;
use clap::{value_parser, Arg, ArgAction, Command};
use config::{Config, File as ConfigFile};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use verity_registry::{Registry, RegistryConfig};
use verity_rpc::{start_server, AppState};

mod version;

use version::{git_commit_hash, VERITY_VERSION};

const DEFAULT_CONFIG_PATH: &str = "config/node.toml";

/// Node configuration, assembled from the config file, `VERITY_*`
/// environment variables, and command-line overrides, in that order.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct NodeConfig {
    node_id: String,
    rpc_host: String,
    rpc_port: u16,
    log_level: String,
    log_format: String,
    registry: RegistryConfig,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            node_id: "verity-node".to_string(),
            rpc_host: "127.0.0.1".to_string(),
            rpc_port: 8080,
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            registry: RegistryConfig::default(),
        }
    }
}

impl NodeConfig {
    fn load(config_path_override: Option<&str>) -> Result<Self> {
        let resolved_path = if let Some(path) = config_path_override {
            let path = PathBuf::from(path);
            if !path.exists() {
                anyhow::bail!(
                    "Configuration file {} not found (specified via --config)",
                    path.display()
                );
            }
            Some(path)
        } else {
            let path = PathBuf::from(DEFAULT_CONFIG_PATH);
            if path.exists() {
                Some(path)
            } else {
                None
            }
        };

        let mut builder = Config::builder();
        if let Some(path) = &resolved_path {
            builder = builder.add_source(ConfigFile::from(path.as_path()));
        }
        builder = builder.add_source(
            config::Environment::with_prefix("VERITY")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?.try_deserialize::<NodeConfig>()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.node_id.trim().is_empty() {
            anyhow::bail!("node_id must not be empty");
        }
        if self.rpc_port == 0 {
            anyhow::bail!("rpc_port must be greater than zero");
        }
        Ok(())
    }

    fn rpc_addr(&self) -> String {
        format!("{}:{}", self.rpc_host, self.rpc_port)
    }
}

fn apply_overrides(matches: &clap::ArgMatches, config: &mut NodeConfig) {
    if let Some(node_id) = matches.get_one::<String>("node-id") {
        config.node_id = node_id.clone();
    }
    if let Some(rpc_host) = matches.get_one::<String>("rpc-host") {
        config.rpc_host = rpc_host.clone();
    }
    if let Some(rpc_port) = matches.get_one::<u16>("rpc-port") {
        config.rpc_port = *rpc_port;
    }
    if let Some(log_level) = matches.get_one::<String>("log-level") {
        config.log_level = log_level.clone();
    }
    if let Some(log_format) = matches.get_one::<String>("log-format") {
        config.log_format = log_format.clone();
    }
}

fn init_logging(config: &NodeConfig) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    if config.log_format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("verity-node")
        .version(VERITY_VERSION)
        .about("Verity content-provenance registry node")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path"),
        )
        .arg(
            Arg::new("node-id")
                .long("node-id")
                .value_name("ID")
                .help("Override the node identifier"),
        )
        .arg(
            Arg::new("rpc-host")
                .long("rpc-host")
                .value_name("HOST")
                .help("Override RPC bind host"),
        )
        .arg(
            Arg::new("rpc-port")
                .long("rpc-port")
                .value_name("PORT")
                .value_parser(value_parser!(u16))
                .help("Override RPC port"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .value_parser(["trace", "debug", "info", "warn", "error"])
                .help("Override the log level"),
        )
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .value_name("FORMAT")
                .value_parser(["pretty", "json"])
                .help("Select log output format"),
        )
        .arg(
            Arg::new("check")
                .long("check")
                .action(ArgAction::SetTrue)
                .help("Validate the configuration, then exit"),
        )
        .get_matches();

    let config_path = matches.get_one::<String>("config").map(|s| s.as_str());
    let mut config = NodeConfig::load(config_path)?;
    apply_overrides(&matches, &mut config);
    config.validate()?;

    if matches.get_flag("check") {
        println!("Configuration OK");
        println!("  node_id: {}", config.node_id);
        println!("  rpc: {}", config.rpc_addr());
        println!(
            "  initial reputation score: {}",
            config.registry.reputation.initial_score
        );
        return Ok(());
    }

    init_logging(&config)?;

    info!("Starting Verity node: {}", config.node_id);
    info!("Version: {} ({})", VERITY_VERSION, git_commit_hash());
    if let Some(path) = config_path {
        info!("Config file: {}", path);
    } else if Path::new(DEFAULT_CONFIG_PATH).exists() {
        info!("Config file: {DEFAULT_CONFIG_PATH}");
    } else {
        info!("Config file: (built-in defaults)");
    }
    info!(
        "Reputation policy: initial={} upload_reward={} grant_reward={} deepfake_penalty={}",
        config.registry.reputation.initial_score,
        config.registry.reputation.genuine_upload_reward,
        config.registry.reputation.reuse_grant_reward,
        config.registry.reputation.deepfake_match_penalty
    );

    if config.rpc_host == "0.0.0.0" {
        warn!("RPC host binds to all interfaces; front the API with a reverse proxy or firewall");
    }

    let registry = Arc::new(Registry::new(config.registry.clone()));
    let app_state = AppState::new(registry, config.node_id.clone());

    let rpc_addr = config.rpc_addr();
    info!("Starting RPC server on {}", rpc_addr);
    let rpc_addr_clone = rpc_addr.clone();
    let rpc_handle = tokio::spawn(async move {
        if let Err(e) = start_server(app_state, &rpc_addr_clone).await {
            tracing::error!("RPC server error: {}", e);
        }
    });

    info!("Verity node is ready");
    info!("RPC API available at: http://{}", rpc_addr);

    tokio::signal::ctrl_c().await?;
    info!("Shutting down Verity node");
    rpc_handle.abort();
    info!("Verity node shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_validates() {
        let config = NodeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.rpc_addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_config_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(
            file,
            "node_id = \"verity-test\"\nrpc_port = 9999\n\n[registry.reputation]\ninitial_score = 50\n"
        )
        .unwrap();

        let config = NodeConfig::load(Some(file.path().to_str().unwrap())).unwrap();
        assert_eq!(config.node_id, "verity-test");
        assert_eq!(config.rpc_port, 9999);
        assert_eq!(config.registry.reputation.initial_score, 50);
        // Untouched keys keep their defaults.
        assert_eq!(config.rpc_host, "127.0.0.1");
        assert_eq!(config.registry.reputation.genuine_upload_reward, 5);
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        assert!(NodeConfig::load(Some("/nonexistent/node.toml")).is_err());
    }
}

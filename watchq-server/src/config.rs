//! Server configuration
//!
//! Each setting resolves in priority order: command line, then `WATCHQ_*`
//! environment variable (both through clap), then the TOML file, then the
//! compiled-in default.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use watchq_common::config::{RootFolderResolver, TomlConfig};
use watchq_common::{Error, Result};

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1";
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:3000";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Command-line arguments for watchq-server
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "watchq-server", version, about = "Watch queue backend")]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, env = "WATCHQ_PORT")]
    pub port: Option<u16>,

    /// Address to bind
    #[arg(long, env = "WATCHQ_BIND_ADDRESS")]
    pub bind_address: Option<String>,

    /// Folder holding watchq.db
    #[arg(short, long, env = "WATCHQ_ROOT_FOLDER")]
    pub root_folder: Option<PathBuf>,

    /// Path to watchq.toml
    #[arg(short, long, env = "WATCHQ_CONFIG")]
    pub config: Option<PathBuf>,

    /// YouTube Data API key
    #[arg(long, env = "YOUTUBE_API_KEY", hide_env_values = true)]
    pub youtube_api_key: Option<String>,

    /// Allowed CORS origin (repeatable, or comma-separated in the env var)
    #[arg(long = "allowed-origin", env = "WATCHQ_ALLOWED_ORIGINS", value_delimiter = ',')]
    pub allowed_origins: Vec<String>,

    /// Log level when RUST_LOG is unset
    #[arg(long, env = "WATCHQ_LOG_LEVEL")]
    pub log_level: Option<String>,
}

/// Fully resolved server settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub root_folder: PathBuf,
    pub port: u16,
    pub bind_address: String,
    pub youtube_api_key: Option<String>,
    pub allowed_origins: Vec<String>,
    pub log_level: String,
}

impl ServerConfig {
    pub fn resolve(args: &Args, toml: &TomlConfig) -> Self {
        let root_folder = RootFolderResolver::new()
            .with_cli_arg(args.root_folder.clone())
            .with_toml(toml)
            .resolve();

        let allowed_origins = if !args.allowed_origins.is_empty() {
            args.allowed_origins.clone()
        } else {
            toml.allowed_origins
                .clone()
                .unwrap_or_else(|| vec![DEFAULT_ALLOWED_ORIGIN.to_string()])
        };

        Self {
            root_folder,
            port: args.port.or(toml.port).unwrap_or(DEFAULT_PORT),
            bind_address: args
                .bind_address
                .clone()
                .or_else(|| toml.bind_address.clone())
                .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string()),
            youtube_api_key: args
                .youtube_api_key
                .clone()
                .or_else(|| toml.youtube_api_key.clone())
                .filter(|key| !key.trim().is_empty()),
            allowed_origins,
            log_level: args
                .log_level
                .clone()
                .or_else(|| toml.logging.level.clone())
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        }
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.bind_address, self.port)
            .parse()
            .map_err(|e| Error::Config(format!("Invalid bind address {}: {}", self.bind_address, e)))
    }

    /// Fallback `EnvFilter` directive when RUST_LOG is unset
    pub fn log_directive(&self) -> String {
        format!("watchq_server={0},watchq_common={0},tower_http={0}", self.log_level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> Args {
        Args {
            root_folder: Some(PathBuf::from("/tmp/watchq-test")),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults_apply_without_args_or_file() {
        let config = ServerConfig::resolve(&args(), &TomlConfig::default());
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.bind_address, DEFAULT_BIND_ADDRESS);
        assert_eq!(config.allowed_origins, vec![DEFAULT_ALLOWED_ORIGIN.to_string()]);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.youtube_api_key, None);
    }

    #[test]
    fn test_args_override_toml() {
        let toml = TomlConfig::parse(
            r#"
            port = 6000
            youtube_api_key = "from-file"
            allowed_origins = ["http://a.example"]
            "#,
        )
        .unwrap();

        let mut args = args();
        args.port = Some(7000);
        args.allowed_origins = vec!["http://b.example".into()];

        let config = ServerConfig::resolve(&args, &toml);
        assert_eq!(config.port, 7000);
        assert_eq!(config.youtube_api_key.as_deref(), Some("from-file"));
        assert_eq!(config.allowed_origins, vec!["http://b.example".to_string()]);
    }

    #[test]
    fn test_blank_api_key_counts_as_missing() {
        let mut args = args();
        args.youtube_api_key = Some("  ".into());
        assert_eq!(ServerConfig::resolve(&args, &TomlConfig::default()).youtube_api_key, None);
    }

    #[test]
    fn test_socket_addr() {
        let config = ServerConfig::resolve(&args(), &TomlConfig::default());
        assert_eq!(config.socket_addr().unwrap().to_string(), "127.0.0.1:5000");

        let mut bad = config.clone();
        bad.bind_address = "not an address".into();
        assert!(matches!(bad.socket_addr(), Err(Error::Config(_))));
    }
}

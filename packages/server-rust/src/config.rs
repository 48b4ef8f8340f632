//! Command-line and environment configuration.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::network::{NetworkConfig, TlsConfig};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Dispatch server settings. Every flag falls back to a `DISPATCH_*`
/// environment variable.
#[derive(Debug, Clone, Parser)]
#[command(name = "dispatch-server", version, about = "Chat-platform dispatch server")]
pub struct ServerConfig {
    /// Bind address.
    #[arg(long, env = "DISPATCH_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Listen port; 0 picks a free port.
    #[arg(long, env = "DISPATCH_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Allowed CORS origins, comma separated. `*` allows any.
    #[arg(
        long = "cors-origin",
        env = "DISPATCH_CORS_ORIGINS",
        value_delimiter = ',',
        default_value = "*"
    )]
    pub cors_origins: Vec<String>,

    /// Timeout in seconds for health and introspection requests.
    #[arg(long, env = "DISPATCH_REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,

    /// Seconds to wait for in-flight requests on shutdown.
    #[arg(long, env = "DISPATCH_DRAIN_TIMEOUT_SECS", default_value_t = 30)]
    pub drain_timeout_secs: u64,

    /// PEM certificate; enables TLS together with `--tls-key`.
    #[arg(long, env = "DISPATCH_TLS_CERT", requires = "tls_key")]
    pub tls_cert: Option<PathBuf>,

    /// PEM private key.
    #[arg(long, env = "DISPATCH_TLS_KEY", requires = "tls_cert")]
    pub tls_key: Option<PathBuf>,

    #[arg(long, env = "DISPATCH_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// Serve Prometheus metrics on this address.
    #[arg(long, env = "DISPATCH_METRICS_ADDR")]
    pub metrics_addr: Option<SocketAddr>,
}

impl ServerConfig {
    /// Transport settings derived from these flags.
    #[must_use]
    pub fn network(&self) -> NetworkConfig {
        let tls = match (&self.tls_cert, &self.tls_key) {
            (Some(cert_path), Some(key_path)) => Some(TlsConfig {
                cert_path: cert_path.clone(),
                key_path: key_path.clone(),
            }),
            _ => None,
        };
        NetworkConfig {
            host: self.host.clone(),
            port: self.port,
            tls,
            cors_origins: self.cors_origins.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            drain_timeout: Duration::from_secs(self.drain_timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_definition_is_valid() {
        ServerConfig::command().debug_assert();
    }

    #[test]
    fn defaults_map_onto_network_config() {
        let config = ServerConfig::try_parse_from(["dispatch-server"]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert!(config.metrics_addr.is_none());

        let network = config.network();
        assert_eq!(network.host, "0.0.0.0");
        assert_eq!(network.cors_origins, vec!["*"]);
        assert_eq!(network.request_timeout, Duration::from_secs(30));
        assert!(network.tls.is_none());
    }

    #[test]
    fn flags_override_defaults() {
        let config = ServerConfig::try_parse_from([
            "dispatch-server",
            "--port",
            "9000",
            "--cors-origin",
            "http://a.test,http://b.test",
            "--request-timeout-secs",
            "5",
            "--log-format",
            "json",
            "--metrics-addr",
            "127.0.0.1:9100",
        ])
        .unwrap();

        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.metrics_addr, Some("127.0.0.1:9100".parse().unwrap()));
        let network = config.network();
        assert_eq!(network.port, 9000);
        assert_eq!(network.cors_origins, vec!["http://a.test", "http://b.test"]);
        assert_eq!(network.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn tls_needs_both_cert_and_key() {
        assert!(ServerConfig::try_parse_from(["dispatch-server", "--tls-cert", "c.pem"]).is_err());

        let config = ServerConfig::try_parse_from([
            "dispatch-server",
            "--tls-cert",
            "c.pem",
            "--tls-key",
            "k.pem",
        ])
        .unwrap();
        assert_eq!(
            config.network().tls,
            Some(TlsConfig {
                cert_path: PathBuf::from("c.pem"),
                key_path: PathBuf::from("k.pem"),
            })
        );
    }
}

// Configuration module entry point
// Loads the server configuration and holds the per-server runtime state

mod state;
mod types;

use std::net::{IpAddr, SocketAddr};

// Re-export public types
pub use state::AppState;
pub use types::{
    Config, HeaderRule, HttpConfig, LoggingConfig, PerformanceConfig, ServerConfig, DEFAULT_HOST,
    DEFAULT_PORT,
};

/// Default config file name (without extension), looked up in the working directory
pub const DEFAULT_CONFIG_NAME: &str = "coi-serve";

impl Config {
    /// Load configuration from `coi-serve.toml` (optional) and `COI_*` environment variables
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(DEFAULT_CONFIG_NAME)
    }

    /// Load configuration from specified file path (without extension)
    ///
    /// Missing keys fall back to the `Default` impls, so an absent file
    /// yields the stock `0.0.0.0:8000` server rooted at `.`.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("COI")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        let ip: IpAddr = self
            .server
            .host
            .parse()
            .map_err(|e| format!("Invalid host '{}': {e}", self.server.host))?;
        Ok(SocketAddr::new(ip, self.server.port))
    }
}

/// URL shown to the user for a bound address
///
/// Unspecified addresses (`0.0.0.0`, `::`) are shown as `localhost`.
pub fn display_url(addr: &SocketAddr) -> String {
    if addr.ip().is_unspecified() {
        format!("http://localhost:{}", addr.port())
    } else {
        format!("http://{addr}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_stock_server() {
        let cfg = Config::default();
        assert_eq!(cfg.server.port, 8000);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.server.root, std::path::PathBuf::from("."));
        assert!(cfg.logging.access_log);
        assert!(cfg.http.directory_listing);
        assert_eq!(cfg.http.index_files, vec!["index.html", "index.htm"]);
        assert!(cfg.headers.is_empty());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let cfg = Config::load_from("definitely-not-a-config-file").unwrap();
        assert_eq!(cfg.server.port, DEFAULT_PORT);
        assert_eq!(cfg.server.host, DEFAULT_HOST);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(
                r#"
                [server]
                port = 9123

                [[headers]]
                name = "Cache-Control"
                value = "no-store"
                "#,
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();
        let cfg: Config = settings.try_deserialize().unwrap();

        assert_eq!(cfg.server.port, 9123);
        assert_eq!(cfg.server.host, DEFAULT_HOST);
        assert_eq!(
            cfg.headers,
            vec![HeaderRule {
                name: "Cache-Control".to_string(),
                value: "no-store".to_string(),
            }]
        );
    }

    #[test]
    fn test_socket_addr() {
        let mut cfg = Config::default();
        assert_eq!(
            cfg.get_socket_addr().unwrap(),
            "0.0.0.0:8000".parse::<SocketAddr>().unwrap()
        );

        cfg.server.host = "::1".to_string();
        cfg.server.port = 0;
        assert_eq!(
            cfg.get_socket_addr().unwrap(),
            "[::1]:0".parse::<SocketAddr>().unwrap()
        );

        cfg.server.host = "not an ip".to_string();
        assert!(cfg.get_socket_addr().is_err());
    }

    #[test]
    fn test_display_url() {
        let any: SocketAddr = "0.0.0.0:8000".parse().unwrap();
        assert_eq!(display_url(&any), "http://localhost:8000");

        let local: SocketAddr = "127.0.0.1:9000".parse().unwrap();
        assert_eq!(display_url(&local), "http://127.0.0.1:9000");
    }
}

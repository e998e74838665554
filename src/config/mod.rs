// Configuration module entry point
// Loads layered configuration: defaults, then config file, then environment

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{
    Config, HttpConfig, LoggingConfig, PerformanceConfig, RoutesConfig, SanitizeConfig,
    ServerConfig,
};

impl Config {
    /// Load configuration from specified file path (without extension)
    ///
    /// The file is optional. Environment variables prefixed `POSTAL_` override
    /// it, with `__` between section and key (`POSTAL_SERVER__PORT=9000`).
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("POSTAL")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );
        Self::with_defaults(settings)?.build()?.try_deserialize()
    }

    /// Defaults only, no file or environment
    pub fn defaults() -> Result<Self, config::ConfigError> {
        Self::with_defaults(config::Config::builder())?
            .build()?
            .try_deserialize()
    }

    fn with_defaults(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
        builder
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.server_name", "postal-httpd")?
            .set_default("http.max_body_size", 1_048_576)? // 1MB
            .set_default("routes.parse_path", "/parse")?
            .set_default("routes.multi_parse_path", "/parse/multi")?
            .set_default("routes.health_enabled", true)?
            .set_default("routes.health_path", "/healthz")?
            .set_default("sanitize.max_length", 1024)
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }

    /// Body size limit as a `usize`, saturating on 32-bit targets
    pub fn max_body_size(&self) -> usize {
        usize::try_from(self.http.max_body_size).unwrap_or(usize::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = Config::defaults().unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.server.workers, None);
        assert_eq!(cfg.routes.parse_path, "/parse");
        assert_eq!(cfg.routes.multi_parse_path, "/parse/multi");
        assert_eq!(cfg.sanitize.max_length, 1024);
        assert_eq!(cfg.logging.access_log_format, "combined");
        assert_eq!(cfg.max_body_size(), 1_048_576);
        assert_eq!(cfg.get_socket_addr().unwrap(), "127.0.0.1:8080".parse().unwrap());
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let dir = std::env::temp_dir().join(format!("postal-httpd-cfg-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("postal.toml");
        std::fs::write(
            &path,
            "[server]\nport = 9191\nworkers = 2\n\n[routes]\nparse_path = \"/v1/parse\"\n",
        )
        .unwrap();

        let base = dir.join("postal");
        let cfg = Config::load_from(base.to_str().unwrap()).unwrap();
        assert_eq!(cfg.server.port, 9191);
        assert_eq!(cfg.server.workers, Some(2));
        assert_eq!(cfg.routes.parse_path, "/v1/parse");
        assert_eq!(cfg.routes.multi_parse_path, "/parse/multi");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_invalid_host() {
        let mut cfg = Config::defaults().unwrap();
        cfg.server.host = "not a host".to_string();
        assert!(cfg.get_socket_addr().is_err());
    }
}

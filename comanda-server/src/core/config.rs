/// Server configuration
///
/// Every field can be overridden through the environment:
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | DATABASE_PATH | comanda.db | SQLite database file |
/// | HTTP_PORT | 3000 | HTTP API port |
/// | ENVIRONMENT | development | development \| staging \| production |
/// | REQUEST_TIMEOUT_MS | 30000 | Per-request timeout |
/// | CACHE_SWEEP_INTERVAL_SECS | 300 | Expired cache entry sweep period |
/// | LOG_DIR | (unset) | When set, also log to daily rolling files |
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    pub http_port: u16,
    pub environment: String,
    pub request_timeout_ms: u64,
    pub cache_sweep_interval_secs: u64,
    pub log_dir: Option<String>,
}

impl Config {
    /// Load from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self {
            db_path: std::env::var("DATABASE_PATH").unwrap_or_else(|_| "comanda.db".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            request_timeout_ms: std::env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(30000),
            cache_sweep_interval_secs: std::env::var("CACHE_SWEEP_INTERVAL_SECS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(300),
            log_dir: std::env::var("LOG_DIR").ok(),
        }
    }

    /// Override the parts tests care about
    pub fn with_overrides(db_path: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.db_path = db_path.into();
        config.http_port = http_port;
        config
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

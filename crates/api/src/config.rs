/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `120`). A full sync walks
    /// every upstream page, so this is longer than a typical API timeout.
    pub request_timeout_secs: u64,
    /// Seconds between scheduled syncs of every place; `0` disables the job.
    pub sync_interval_secs: u64,
    /// Scheduled syncs skip the growth check and always fetch.
    pub sync_force: bool,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                 |
    /// |------------------------|-------------------------|
    /// | `HOST`                 | `0.0.0.0`               |
    /// | `PORT`                 | `3000`                  |
    /// | `CORS_ORIGINS`         | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS` | `120`                   |
    /// | `SYNC_INTERVAL_SECS`   | `0`                     |
    /// | `SYNC_FORCE`           | `false`                 |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "120".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let sync_interval_secs: u64 = std::env::var("SYNC_INTERVAL_SECS")
            .unwrap_or_else(|_| "0".into())
            .parse()
            .expect("SYNC_INTERVAL_SECS must be a valid u64");

        let sync_force: bool = std::env::var("SYNC_FORCE")
            .unwrap_or_else(|_| "false".into())
            .parse()
            .expect("SYNC_FORCE must be true or false");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            sync_interval_secs,
            sync_force,
        }
    }
}

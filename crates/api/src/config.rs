use std::path::PathBuf;

use autoupload_core::config::AppSettings;

/// Default location of the TOML config file.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Server configuration: the `[app]` table, overridable from the environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `[app] host`, else `127.0.0.1`).
    pub host: String,
    /// Bind port (default: `[app] port`, else `5000`).
    pub port: u16,
    /// HTTP request timeout in seconds (default: `30`).
    ///
    /// Only bounds the webhook handler itself; uploads run detached.
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    /// Build from the config file's `[app]` table with env overrides.
    ///
    /// | Env Var                | Default          |
    /// |------------------------|------------------|
    /// | `HOST`                 | `[app] host`     |
    /// | `PORT`                 | `[app] port`     |
    /// | `REQUEST_TIMEOUT_SECS` | `30`             |
    pub fn from_env(app: &AppSettings) -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| app.host.clone());

        let port: u16 = match std::env::var("PORT") {
            Ok(raw) => raw.parse().expect("PORT must be a valid u16"),
            Err(_) => app.port,
        };

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        Self {
            host,
            port,
            request_timeout_secs,
        }
    }
}

/// Path of the TOML config file, from `AUTOUPLOAD_CONFIG` or the default.
pub fn config_path_from_env() -> PathBuf {
    std::env::var_os("AUTOUPLOAD_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

use std::path::PathBuf;

/// Errors raised while building the room configuration at startup.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Config(String),
}

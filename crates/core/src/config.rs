//! Room configuration store.
//!
//! The config file carries one `[global]` table and any number of
//! `[room_<id>]` tables. Each room's effective settings are the global
//! table shallow-merged with the room table, room keys winning. The
//! resulting [`RoomConfigStore`] is built once at startup and only read
//! afterwards.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::CoreError;
use crate::types::RoomId;

const GLOBAL_TABLE: &str = "global";
const APP_TABLE: &str = "app";
const ROOM_PREFIX: &str = "room_";

/// Effective upload settings for one live room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomConfig {
    pub room_id: RoomId,
    /// Opaque credential for the upload API.
    pub token: String,
    /// Media-relation id; empty means the field is left out of the upload.
    pub mrid: String,
    /// Destination endpoint for the multipart upload.
    pub post_url: String,
}

/// Process settings from the `[app]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    /// Python-style level name (`DEBUG`, `INFO`, `WARNING`, ...).
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Skip TLS certificate verification towards the upload API.
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

fn default_log_level() -> String {
    "INFO".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            host: default_host(),
            port: default_port(),
            accept_invalid_certs: false,
        }
    }
}

impl AppSettings {
    /// Map the configured level name onto a `tracing` filter directive.
    ///
    /// Unknown names fall back to `info`.
    pub fn filter_level(&self) -> &'static str {
        match self.log_level.trim().to_ascii_uppercase().as_str() {
            "TRACE" => "trace",
            "DEBUG" => "debug",
            "WARN" | "WARNING" => "warn",
            "ERROR" | "CRITICAL" | "FATAL" => "error",
            _ => "info",
        }
    }
}

/// Read-only map from room id to its merged [`RoomConfig`].
#[derive(Debug, Clone, Default)]
pub struct RoomConfigStore {
    rooms: HashMap<RoomId, RoomConfig>,
}

impl RoomConfigStore {
    pub fn new(rooms: impl IntoIterator<Item = RoomConfig>) -> Self {
        Self {
            rooms: rooms.into_iter().map(|r| (r.room_id, r)).collect(),
        }
    }

    /// Build the store from a parsed config document.
    ///
    /// Every `room_<id>` table is merged over `[global]`. Fails when a room
    /// key has a non-numeric id, when a room value is not a table, or when a
    /// merged room lacks `token` or `post_url`.
    pub fn from_table(table: &toml::Table) -> Result<Self, CoreError> {
        let global = match table.get(GLOBAL_TABLE) {
            None => toml::Table::new(),
            Some(toml::Value::Table(t)) => t.clone(),
            Some(_) => {
                return Err(CoreError::Config(format!(
                    "`{GLOBAL_TABLE}` must be a table"
                )))
            }
        };

        let mut rooms = HashMap::new();
        for (key, value) in table {
            let Some(suffix) = key.strip_prefix(ROOM_PREFIX) else {
                continue;
            };
            let room_id: RoomId = suffix.parse().map_err(|_| {
                CoreError::Config(format!("`{key}` does not end in a numeric room id"))
            })?;
            let room_table = value
                .as_table()
                .ok_or_else(|| CoreError::Config(format!("`{key}` must be a table")))?;

            let mut merged = global.clone();
            for (k, v) in room_table {
                merged.insert(k.clone(), v.clone());
            }

            rooms.insert(room_id, room_from_merged(key, room_id, &merged)?);
        }

        Ok(Self { rooms })
    }

    pub fn lookup(&self, room_id: RoomId) -> Option<&RoomConfig> {
        self.rooms.get(&room_id)
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Configured room ids in ascending order.
    pub fn room_ids(&self) -> Vec<RoomId> {
        let mut ids: Vec<RoomId> = self.rooms.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

fn room_from_merged(
    key: &str,
    room_id: RoomId,
    merged: &toml::Table,
) -> Result<RoomConfig, CoreError> {
    let required = |field: &str| -> Result<String, CoreError> {
        match merged.get(field) {
            Some(toml::Value::String(s)) => Ok(s.clone()),
            Some(_) => Err(CoreError::Config(format!(
                "`{field}` for `{key}` must be a string"
            ))),
            None => Err(CoreError::Config(format!(
                "`{key}` has no `{field}` (set it in the room or in [{GLOBAL_TABLE}])"
            ))),
        }
    };

    let mrid = match merged.get("mrid") {
        None => String::new(),
        Some(toml::Value::String(s)) => s.clone(),
        Some(_) => {
            return Err(CoreError::Config(format!(
                "`mrid` for `{key}` must be a string"
            )))
        }
    };

    Ok(RoomConfig {
        room_id,
        token: required("token")?,
        mrid,
        post_url: required("post_url")?,
    })
}

/// Everything loaded from the config file.
#[derive(Debug, Clone)]
pub struct Settings {
    pub app: AppSettings,
    pub rooms: RoomConfigStore,
}

impl Settings {
    /// Read and parse the TOML config file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| CoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, CoreError> {
        let table: toml::Table = raw.parse()?;

        let app = match table.get(APP_TABLE) {
            None => AppSettings::default(),
            Some(value) => value.clone().try_into::<AppSettings>()?,
        };

        Ok(Self {
            app,
            rooms: RoomConfigStore::from_table(&table)?,
        })
    }
}

//! Configuration layer: typed settings with layered precedence (file → env → overrides).

use std::{num::NonZeroU32, path::Path, str::FromStr};

use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

use crate::domain::types::ResourceKind;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "loadscope";
const ENV_PREFIX: &str = "LOADSCOPE";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 8;

/// Fully-resolved settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub logging: LoggingSettings,
    pub database: DatabaseSettings,
    pub cache: CacheSettings,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub url: Option<String>,
    pub max_connections: NonZeroU32,
}

#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub enabled_kinds: Vec<ResourceKind>,
    pub diagnostics: bool,
}

/// Values supplied by the embedding service; they win over files and environment.
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub log_level: Option<String>,
    pub log_json: Option<bool>,
    pub database_url: Option<String>,
    pub database_max_connections: Option<u32>,
    pub cache_enabled_kinds: Option<Vec<String>>,
    pub cache_diagnostics: Option<bool>,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (files → environment → overrides).
///
/// Environment variables use the `LOADSCOPE` prefix with `__` between
/// sections, e.g. `LOADSCOPE__CACHE__ENABLED_KINDS=field,table`.
pub fn load(
    config_file: Option<&Path>,
    overrides: &SettingsOverrides,
) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = config_file {
        builder = builder.add_source(File::from(path).required(true));
    }

    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("cache.enabled_kinds"),
    );

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    raw.apply_overrides(overrides);

    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    logging: RawLoggingSettings,
    database: RawDatabaseSettings,
    cache: RawCacheSettings,
}

impl RawSettings {
    fn apply_overrides(&mut self, overrides: &SettingsOverrides) {
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(url) = overrides.database_url.as_ref() {
            self.database.url = Some(url.clone());
        }
        if let Some(max) = overrides.database_max_connections {
            self.database.max_connections = Some(max);
        }
        if let Some(kinds) = overrides.cache_enabled_kinds.as_ref() {
            self.cache.enabled_kinds = Some(kinds.clone());
        }
        if let Some(diagnostics) = overrides.cache_diagnostics {
            self.cache.diagnostics = Some(diagnostics);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            logging,
            database,
            cache,
        } = raw;

        Ok(Self {
            logging: build_logging_settings(logging)?,
            database: build_database_settings(database)?,
            cache: build_cache_settings(cache)?,
        })
    }
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_database_settings(database: RawDatabaseSettings) -> Result<DatabaseSettings, LoadError> {
    let url = database.url.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    });

    let max_connections = non_zero_u32(
        database
            .max_connections
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
            .into(),
        "database.max_connections",
    )?;

    Ok(DatabaseSettings {
        url,
        max_connections,
    })
}

fn build_cache_settings(cache: RawCacheSettings) -> Result<CacheSettings, LoadError> {
    let enabled_kinds = match cache.enabled_kinds {
        Some(names) => {
            let mut kinds = Vec::with_capacity(names.len());
            for name in names.iter().map(|name| name.trim()).filter(|name| !name.is_empty()) {
                let kind = ResourceKind::from_str(name)
                    .map_err(|err| LoadError::invalid("cache.enabled_kinds", err.to_string()))?;
                if !kinds.contains(&kind) {
                    kinds.push(kind);
                }
            }
            kinds
        }
        None => ResourceKind::ALL.to_vec(),
    };

    Ok(CacheSettings {
        enabled_kinds,
        diagnostics: cache.diagnostics.unwrap_or(false),
    })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawDatabaseSettings {
    url: Option<String>,
    max_connections: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCacheSettings {
    enabled_kinds: Option<Vec<String>>,
    diagnostics: Option<bool>,
}

fn non_zero_u32(value: u64, key: &'static str) -> Result<NonZeroU32, LoadError> {
    if value == 0 {
        return Err(LoadError::invalid(key, "must be greater than zero"));
    }
    let value_u32: u32 = value
        .try_into()
        .map_err(|_| LoadError::invalid(key, "value exceeds supported range for u32"))?;
    NonZeroU32::new(value_u32).ok_or_else(|| LoadError::invalid(key, "must be greater than zero"))
}

#[cfg(test)]
mod tests;

//! Cache configuration.
//!
//! Selects which resource kinds are cached for a unit of work, via the
//! `[cache]` section of `loadscope.toml`. Parsing and validation happen in
//! [`crate::config`]; this type only carries the result.

use crate::config::CacheSettings;
use crate::domain::types::ResourceKind;

/// Cache configuration resolved from [`CacheSettings`].
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Resource kinds cached by default in every unit of work.
    pub enabled_kinds: Vec<ResourceKind>,
    /// Log per-loader hit rates at `debug` after every call.
    pub diagnostics: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled_kinds: ResourceKind::ALL.to_vec(),
            diagnostics: false,
        }
    }
}

impl From<&CacheSettings> for CacheConfig {
    fn from(settings: &CacheSettings) -> Self {
        Self {
            enabled_kinds: settings.enabled_kinds.clone(),
            diagnostics: settings.diagnostics,
        }
    }
}

impl CacheConfig {
    /// Returns true if `kind` is cached by default.
    pub fn is_enabled(&self, kind: ResourceKind) -> bool {
        self.enabled_kinds.contains(&kind)
    }

    /// Configuration that caches nothing; every load goes to the store.
    pub fn disabled() -> Self {
        Self {
            enabled_kinds: Vec::new(),
            diagnostics: false,
        }
    }
}

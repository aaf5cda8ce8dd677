//! The active configuration and its live reload.
//!
//! Everything derived from the configuration file lives in an immutable
//! [`Generation`].  [`ActiveConfig`] holds the current one behind an `Arc`;
//! readers take their own `Arc` and keep using it for as long as they
//! like, and a reload swaps in a complete new generation.  A reader never
//! sees half of one generation and half of another.

use crate::config::{Config, ConfigError, Format};
use crate::icons::IconMatcher;
use crate::resolver::IconResolver;
use crate::traits::ConfigSource;
use log::info;
use std::sync::{Arc, RwLock};

/// One immutable snapshot of the configuration.
#[derive(Debug, Clone, Default)]
pub struct Generation {
    pub matcher: IconMatcher,
    pub format: Format,
}

impl Generation {
    pub fn from_config(config: &Config) -> Self {
        Self {
            matcher: IconMatcher::from_config(config),
            format: config.format.clone(),
        }
    }
}

/// Shared handle to the current [`Generation`].
#[derive(Debug, Default)]
pub struct ActiveConfig {
    current: RwLock<Arc<Generation>>,
}

impl ActiveConfig {
    pub fn new(generation: Generation) -> Self {
        Self {
            current: RwLock::new(Arc::new(generation)),
        }
    }

    /// The generation in effect right now.
    pub fn current(&self) -> Arc<Generation> {
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    /// Make `generation` the current one.
    pub fn replace(&self, generation: Generation) {
        let next = Arc::new(generation);
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        *guard = next;
    }
}

/// Errors from [`ConfigReloader::reload`].
#[derive(Debug, thiserror::Error)]
pub enum ReloadError {
    #[error("failed to reload configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Re-reads the configuration and swaps it in.
pub struct ConfigReloader<S: ConfigSource> {
    source: S,
    active: Arc<ActiveConfig>,
    resolver: Arc<IconResolver>,
}

impl<S: ConfigSource> ConfigReloader<S> {
    pub fn new(source: S, active: Arc<ActiveConfig>, resolver: Arc<IconResolver>) -> Self {
        Self {
            source,
            active,
            resolver,
        }
    }

    /// Load the configuration again and make it current.
    ///
    /// On success the name cache is cleared, since cached icons may no
    /// longer match the new rules; the process-name cache is kept.  On
    /// failure nothing changes.
    pub fn reload(&self) -> Result<(), ReloadError> {
        info!("reloading configuration");
        let config = self.source.load()?;
        let generation = Generation::from_config(&config);
        let patterns = generation.matcher.len();
        self.active.replace(generation);
        self.resolver.clear_name_cache();
        info!("configuration reloaded ({} pattern(s))", patterns);
        Ok(())
    }
}

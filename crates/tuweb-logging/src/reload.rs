// ABOUTME: Runtime log level reloading and configuration updates
// ABOUTME: Swaps the level filter without reinstalling the subscriber

use anyhow::{Context, Result};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, Registry, layer::Layered, reload};

use crate::config::LoggingConfig;
use crate::layers::{BoxedLayer, create_env_filter};

/// The subscriber stack the reloadable filter sits on
pub(crate) type OutputStack = Layered<Vec<BoxedLayer>, Registry>;

/// Handle for updating log configuration at runtime
#[derive(Clone)]
pub struct LoggingReloadHandle {
    filter_handle: reload::Handle<EnvFilter, OutputStack>,
    current_config: Arc<RwLock<LoggingConfig>>,
}

impl LoggingReloadHandle {
    pub(crate) fn new(
        filter_handle: reload::Handle<EnvFilter, OutputStack>,
        config: LoggingConfig,
    ) -> Self {
        Self {
            filter_handle,
            current_config: Arc::new(RwLock::new(config)),
        }
    }

    /// Update the global log level at runtime
    pub fn update_log_level(&self, level: tracing::Level) -> Result<()> {
        let mut config = self.current_config.write();
        config.level = level.into();
        self.apply(&config)?;

        tracing::info!(new_level = %level, "Log level updated at runtime");
        Ok(())
    }

    /// Update one module's log level at runtime
    pub fn update_module_level(&self, module: &str, level: tracing::Level) -> Result<()> {
        let mut config = self.current_config.write();
        config
            .module_levels
            .insert(module.to_string(), level.into());
        self.apply(&config)?;

        tracing::info!(module = %module, new_level = %level, "Module log level updated at runtime");
        Ok(())
    }

    /// Re-read levels from the environment, keeping output settings
    pub fn reload_from_env(&self) -> Result<()> {
        let mut config = self.current_config.write();
        let mut fresh =
            LoggingConfig::from_env().context("Failed to load configuration from environment")?;
        fresh.output = config.output.clone();
        fresh.file = config.file.clone();

        self.apply(&fresh)?;
        *config = fresh;

        tracing::info!(
            level = %config.level.0,
            module_count = config.module_levels.len(),
            "Logging configuration reloaded from environment"
        );
        Ok(())
    }

    /// Get current configuration (clone)
    pub fn current_config(&self) -> LoggingConfig {
        self.current_config.read().clone()
    }

    fn apply(&self, config: &LoggingConfig) -> Result<()> {
        let filter = create_env_filter(config).context("Failed to create new environment filter")?;
        self.filter_handle
            .reload(filter)
            .context("Failed to reload log filter")
    }
}

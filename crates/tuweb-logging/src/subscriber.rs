// ABOUTME: Tracing subscriber initialization and layer composition
// ABOUTME: Combines console, file, and JSON layers under one reloadable level filter

use anyhow::{Context, Result};
use std::sync::OnceLock;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, prelude::*, reload, util::SubscriberInitExt};

use crate::config::{LoggingConfig, OutputConfig};
use crate::layers::{
    BoxedLayer, create_console_layer, create_env_filter, create_file_layer, create_json_layer,
};
use crate::reload::LoggingReloadHandle;

/// Keeps the non-blocking file writer alive for the rest of the process
static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Build the output layers selected by `config`
fn output_layers(config: &LoggingConfig) -> Result<Vec<BoxedLayer>> {
    let mut layers = Vec::new();

    if let Some(console) = create_console_layer(&config.output) {
        layers.push(console);
    }

    if let Some(json) = create_json_layer(&config.output) {
        layers.push(json);
    }

    if config.output.file {
        let (file, guard) = create_file_layer(&config.file)?;
        layers.push(file);
        // A second initialisation attempt keeps the first guard
        let _ = FILE_GUARD.set(guard);
    }

    Ok(layers)
}

/// Initialize the global tracing subscriber with the given configuration.
pub fn init_subscriber(config: LoggingConfig) -> Result<()> {
    let env_filter = create_env_filter(&config).context("Failed to create environment filter")?;
    let layers = output_layers(&config)?;

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .try_init()
        .context("Failed to install global tracing subscriber")?;

    log_initialized(&config, false);
    Ok(())
}

/// Initialize the global tracing subscriber with hot-reload support.
///
/// Returns a LoggingReloadHandle that can be used to update log levels at runtime.
pub fn init_subscriber_with_reload(config: LoggingConfig) -> Result<LoggingReloadHandle> {
    let env_filter = create_env_filter(&config).context("Failed to create environment filter")?;
    let (filter_layer, filter_handle) = reload::Layer::new(env_filter);
    let layers = output_layers(&config)?;

    tracing_subscriber::registry()
        .with(layers)
        .with(filter_layer)
        .try_init()
        .context("Failed to install global tracing subscriber")?;

    log_initialized(&config, true);
    Ok(LoggingReloadHandle::new(filter_handle, config))
}

/// Run `f` with a temporary console subscriber configured from the environment.
///
/// For work that logs before the global subscriber can be built, such as
/// loading the configuration file it is built from.
pub fn with_bootstrap_subscriber<R>(f: impl FnOnce() -> R) -> R {
    let config = LoggingConfig::from_env().unwrap_or_default();
    let env_filter = create_env_filter(&config).unwrap_or_else(|_| EnvFilter::new("info"));
    let console = create_console_layer(&OutputConfig {
        console: true,
        file: false,
        json: false,
        pretty_console: false,
    });

    let subscriber = tracing_subscriber::registry().with(console).with(env_filter);
    tracing::subscriber::with_default(subscriber, f)
}

fn log_initialized(config: &LoggingConfig, reload_enabled: bool) {
    tracing::info!(
        log_level = %config.level.0,
        console_output = config.output.console,
        file_output = config.output.file,
        json_output = config.output.json,
        file_path = %config.file.path.display(),
        reload_enabled,
        "TuWebAI logging initialized"
    );
}

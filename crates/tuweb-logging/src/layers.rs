// ABOUTME: Layer constructors for the different logging output formats
// ABOUTME: Console and JSON go to stderr, file output is rolled daily

use anyhow::{Context, Result};
use std::fs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{self, Rotation};
use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    fmt::{self, format::FmtSpan},
};

use crate::config::{FileConfig, LoggingConfig, OutputConfig};

pub type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Create a console output layer writing to stderr.
///
/// Stdout is left alone so front ends can use it for their own output.
pub fn create_console_layer(config: &OutputConfig) -> Option<BoxedLayer> {
    if !config.console {
        return None;
    }

    let layer = if config.pretty_console {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE)
            .pretty()
            .boxed()
    } else {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .compact()
            .boxed()
    };

    Some(layer)
}

/// Create a daily-rolled file layer.
///
/// The returned guard flushes the background writer when dropped and must be
/// kept alive for as long as logging is wanted.
pub fn create_file_layer(config: &FileConfig) -> Result<(BoxedLayer, WorkerGuard)> {
    let directory = config
        .path
        .parent()
        .context("Log file path has no parent directory")?;

    fs::create_dir_all(directory).context(format!(
        "Failed to create log directory: {}",
        directory.display()
    ))?;

    let file_name = config
        .path
        .file_name()
        .and_then(|n| n.to_str())
        .context("Invalid log file path")?;

    let appender = rolling::Builder::new()
        .rotation(Rotation::DAILY)
        .filename_prefix(file_name)
        .max_log_files(config.max_files.max(1))
        .build(directory)
        .context("Failed to create rolling log file")?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .boxed();

    Ok((layer, guard))
}

/// Create a JSON output layer for structured logging.
pub fn create_json_layer(config: &OutputConfig) -> Option<BoxedLayer> {
    if !config.json {
        return None;
    }

    let layer = fmt::layer()
        .json()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE)
        .boxed();

    Some(layer)
}

/// Create the level filter from the logging configuration.
pub fn create_env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    let directives = config.directives();
    EnvFilter::try_new(&directives).context(format!("Invalid filter directives '{directives}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogLevel;
    use tempfile::tempdir;
    use tracing::Level;

    #[test]
    fn test_console_layer_respects_flag() {
        let enabled = OutputConfig {
            console: true,
            ..Default::default()
        };
        assert!(create_console_layer(&enabled).is_some());

        let disabled = OutputConfig {
            console: false,
            ..Default::default()
        };
        assert!(create_console_layer(&disabled).is_none());
    }

    #[test]
    fn test_json_layer_respects_flag() {
        let enabled = OutputConfig {
            json: true,
            ..Default::default()
        };
        assert!(create_json_layer(&enabled).is_some());
        assert!(create_json_layer(&OutputConfig::default()).is_none());
    }

    #[test]
    fn test_file_layer_creates_directory() {
        let temp_dir = tempdir().unwrap();
        let log_path = temp_dir.path().join("nested").join("editor.log");

        let config = FileConfig {
            path: log_path,
            max_files: 2,
        };

        let result = create_file_layer(&config);
        assert!(result.is_ok());
        assert!(temp_dir.path().join("nested").is_dir());
    }

    #[test]
    fn test_env_filter_from_config() {
        let mut config = LoggingConfig {
            level: LogLevel(Level::DEBUG),
            ..Default::default()
        };
        config
            .module_levels
            .insert("tuweb_session".to_string(), LogLevel(Level::TRACE));

        assert!(create_env_filter(&config).is_ok());
    }
}

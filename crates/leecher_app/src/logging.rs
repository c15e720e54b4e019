//! Process-wide logger setup for the host application.

use std::fs::File;
use std::io;
use std::path::PathBuf;

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};
use thiserror::Error;

/// Destination for log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogDestination {
    File,
    Terminal,
    Both,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub destination: LogDestination,
    pub level: LevelFilter,
    /// Truncated on startup.
    pub file: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            destination: LogDestination::File,
            level: LevelFilter::Info,
            file: PathBuf::from("./leecher.log"),
        }
    }
}

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("could not create log file {path:?}: {source}")]
    LogFile { path: PathBuf, source: io::Error },
    #[error("a global logger is already installed")]
    AlreadyInitialized,
}

/// Installs the global logger described by `config`.
///
/// With [`LogDestination::Both`] a log file that cannot be created only
/// drops the file output; with [`LogDestination::File`] it is an error.
pub fn initialize(config: &LoggingConfig) -> Result<(), LoggingError> {
    let format = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .build();

    let loggers: Vec<Box<dyn SharedLogger>> = match config.destination {
        LogDestination::File => vec![file_logger(config, format)?],
        LogDestination::Terminal => vec![terminal_logger(config.level, format)],
        LogDestination::Both => {
            let mut loggers = vec![terminal_logger(config.level, format.clone())];
            match file_logger(config, format) {
                Ok(logger) => loggers.push(logger),
                Err(err) => eprintln!("Warning: {err}"),
            }
            loggers
        }
    };

    CombinedLogger::init(loggers).map_err(|_| LoggingError::AlreadyInitialized)
}

fn terminal_logger(level: LevelFilter, format: Config) -> Box<dyn SharedLogger> {
    TermLogger::new(level, format, TerminalMode::Mixed, ColorChoice::Auto)
}

fn file_logger(config: &LoggingConfig, format: Config) -> Result<Box<dyn SharedLogger>, LoggingError> {
    let file = File::create(&config.file).map_err(|source| LoggingError::LogFile {
        path: config.file.clone(),
        source,
    })?;
    Ok(WriteLogger::new(config.level, format, file))
}

#![deny(missing_docs)]
//! Logging macros and test logger setup for the leecher workspace.
//!
//! The `leecher_*` macros log under the calling module's path. They go
//! through a re-export of `log`, so callers do not need their own `log`
//! dependency to use them.

use std::str::FromStr;

use log::LevelFilter;

#[doc(hidden)]
pub use log as __log;

/// Environment variable that overrides the test log level (`off`, `error`,
/// `warn`, `info`, `debug`, `trace`).
pub const LOG_LEVEL_ENV: &str = "LEECHER_LOG";

/// Dispatch shared by the level macros.
#[doc(hidden)]
#[macro_export]
macro_rules! __leecher_log {
    ($level:ident, $($arg:tt)+) => {
        $crate::__log::log!(
            target: module_path!(),
            $crate::__log::Level::$level,
            $($arg)+
        )
    };
}

/// Logs at trace level: per-field validation detail.
#[macro_export]
macro_rules! leecher_trace {
    ($($arg:tt)+) => { $crate::__leecher_log!(Trace, $($arg)+) };
}

/// Logs at debug level.
#[macro_export]
macro_rules! leecher_debug {
    ($($arg:tt)+) => { $crate::__leecher_log!(Debug, $($arg)+) };
}

/// Logs at info level: dispatched commands and applied settings.
#[macro_export]
macro_rules! leecher_info {
    ($($arg:tt)+) => { $crate::__leecher_log!(Info, $($arg)+) };
}

/// Logs at warn level: refused commands.
#[macro_export]
macro_rules! leecher_warn {
    ($($arg:tt)+) => { $crate::__leecher_log!(Warn, $($arg)+) };
}

/// Logs at error level: failed authorization.
#[macro_export]
macro_rules! leecher_error {
    ($($arg:tt)+) => { $crate::__leecher_log!(Error, $($arg)+) };
}

/// Level named by `value`, or the build default when it is absent or not a
/// level name.
///
/// The default is `Trace` in debug builds and `Info` otherwise.
pub fn level_from(value: Option<&str>) -> LevelFilter {
    value
        .and_then(|value| LevelFilter::from_str(value.trim()).ok())
        .unwrap_or(if cfg!(debug_assertions) {
            LevelFilter::Trace
        } else {
            LevelFilter::Info
        })
}

/// Installs a terminal logger at the level given by [`LOG_LEVEL_ENV`].
///
/// No-op when a global logger is already installed.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

    let level = level_from(std::env::var(LOG_LEVEL_ENV).ok().as_deref());
    let config = ConfigBuilder::new()
        .set_target_level(LevelFilter::Error)
        .set_location_level(LevelFilter::Off)
        .build();

    let _ = TermLogger::init(level, config, TerminalMode::Mixed, ColorChoice::Auto);
}

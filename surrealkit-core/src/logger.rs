//! Forwards `log` records to a logger supplied by the host application.

use std::sync::{Arc, OnceLock};

/// Receives log messages from `SurrealKit`.
///
/// Implemented on the host side and registered once with [`set_logger`].
///
/// ```rust
/// use surrealkit_core::logger::{LogLevel, Logger};
///
/// struct StdoutLogger;
///
/// impl Logger for StdoutLogger {
///     fn log(&self, level: LogLevel, message: String) {
///         println!("[{level:?}] {message}");
///     }
/// }
/// ```
///
/// ## Kotlin
///
/// ```kotlin
/// class SurrealLogger : Logger {
///     override fun log(level: LogLevel, message: String) {
///         val priority = when (level) {
///             LogLevel.TRACE -> android.util.Log.VERBOSE
///             LogLevel.DEBUG -> android.util.Log.DEBUG
///             LogLevel.INFO -> android.util.Log.INFO
///             LogLevel.WARN -> android.util.Log.WARN
///             LogLevel.ERROR -> android.util.Log.ERROR
///         }
///         android.util.Log.println(priority, "SurrealKit", message)
///     }
/// }
///
/// setLogger(SurrealLogger()) // once, at startup
/// ```
#[uniffi::export(with_foreign)]
pub trait Logger: Sync + Send {
    /// Logs `message` at `level`.
    fn log(&self, level: LogLevel, message: String);
}

/// Severity of a forwarded message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum LogLevel {
    /// Step-by-step detail, such as every handle released.
    Trace,
    /// Diagnostics for library developers.
    Debug,
    /// Lifecycle events, such as the native library being loaded.
    Info,
    /// Recoverable problems, such as a refused release.
    Warn,
    /// Failures, such as a native library that couldn't be loaded.
    Error,
}

impl From<log::Level> for LogLevel {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => Self::Error,
            log::Level::Warn => Self::Warn,
            log::Level::Info => Self::Info,
            log::Level::Debug => Self::Debug,
            log::Level::Trace => Self::Trace,
        }
    }
}

static LOGGER_INSTANCE: OnceLock<Arc<dyn Logger>> = OnceLock::new();

/// Bridges the `log` facade to [`LOGGER_INSTANCE`].
struct ForeignLogger;

impl ForeignLogger {
    /// Debug and trace output is only forwarded for `surrealkit` crates.
    fn accepts(level: log::Level, target: &str) -> bool {
        level <= log::Level::Info || target.starts_with("surrealkit")
    }
}

impl log::Log for ForeignLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        Self::accepts(metadata.level(), metadata.target())
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        match LOGGER_INSTANCE.get() {
            Some(logger) => logger.log(record.level().into(), record.args().to_string()),
            None => eprintln!("surrealkit logger not set: {}", record.args()),
        }
    }

    fn flush(&self) {}
}

/// Registers the host logger and routes all `SurrealKit` logging to it.
///
/// Only the first call takes effect.
#[uniffi::export]
pub fn set_logger(logger: Arc<dyn Logger>) {
    static LOGGER: ForeignLogger = ForeignLogger;

    if LOGGER_INSTANCE.set(logger).is_err() {
        eprintln!("surrealkit logger already set");
        return;
    }
    match log::set_logger(&LOGGER) {
        Ok(()) => log::set_max_level(log::LevelFilter::Trace),
        Err(err) => eprintln!("failed to install surrealkit logger: {err}"),
    }
}

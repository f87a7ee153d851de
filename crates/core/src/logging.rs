//! Diagnostics sink handed to extractors.
//!
//! Extractors never consult global state to decide whether to log; they
//! receive a [`Logger`] carrying its own enabled flag and level filter and
//! forward to the `log` facade. Logging never influences extraction output.

use log::{Level, LevelFilter};
use serde_json::Value;

const DEFAULT_TARGET: &str = "deckify";

/// Structured logger passed by reference into extraction.
#[derive(Debug, Clone)]
pub struct Logger {
    enabled: bool,
    level: LevelFilter,
    target: &'static str,
}

impl Default for Logger {
    fn default() -> Self {
        Self {
            enabled: true,
            level: LevelFilter::Trace,
            target: DEFAULT_TARGET,
        }
    }
}

impl Logger {
    /// Create an enabled logger that lets the `log` backend do the filtering.
    pub fn new() -> Self {
        Self::default()
    }

    /// A logger that drops every record.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Set the most verbose level this logger forwards.
    pub fn with_level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    /// Set the `log` target records are emitted under.
    pub fn with_target(mut self, target: &'static str) -> Self {
        self.target = target;
        self
    }

    /// Turn forwarding on or off.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether a record at `level` would be forwarded.
    pub fn enabled_for(&self, level: Level) -> bool {
        self.enabled && level <= self.level
    }

    pub fn debug(&self, message: &str, data: Option<Value>) {
        self.emit(Level::Debug, message, data);
    }

    pub fn info(&self, message: &str, data: Option<Value>) {
        self.emit(Level::Info, message, data);
    }

    pub fn warn(&self, message: &str, data: Option<Value>) {
        self.emit(Level::Warn, message, data);
    }

    pub fn error(&self, message: &str, data: Option<Value>) {
        self.emit(Level::Error, message, data);
    }

    fn emit(&self, level: Level, message: &str, data: Option<Value>) {
        if !self.enabled_for(level) {
            return;
        }
        match data {
            Some(data) => log::log!(target: self.target, level, "{} {}", message, data),
            None => log::log!(target: self.target, level, "{}", message),
        }
    }
}

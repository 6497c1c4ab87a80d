/// Logger configuration derived from command-line arguments
///
/// Holds the minimum level, per-tag debug/verbose switches and the optional
/// log file path. Stored in a process-wide RwLock so that filtering is a
/// cheap read on every log call.
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::HashSet;
use std::path::PathBuf;

use super::levels::LogLevel;
use super::tags::LogTag;
use crate::arguments;

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Messages above this level are suppressed
    pub min_level: LogLevel,

    /// Tags allowed to log (empty = all)
    pub enabled_tags: HashSet<String>,

    /// Tags with --debug-<key> enabled
    pub debug_tags: HashSet<String>,

    /// Tags with --verbose-<key> enabled
    pub verbose_tags: HashSet<String>,

    /// Optional log file (--log-file <path>)
    pub file_path: Option<PathBuf>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            enabled_tags: HashSet::new(),
            debug_tags: HashSet::new(),
            verbose_tags: HashSet::new(),
            file_path: None,
        }
    }
}

static LOGGER_CONFIG: Lazy<RwLock<LoggerConfig>> =
    Lazy::new(|| RwLock::new(LoggerConfig::default()));

/// Build the logger configuration from the current command-line arguments
pub fn init_from_args() {
    set_logger_config(config_from_args(&arguments::get_cmd_args()));
}

/// Parse a logger configuration out of an argument list
pub(crate) fn config_from_args(args: &[String]) -> LoggerConfig {
    let mut config = LoggerConfig::default();

    let has = |flag: &str| args.iter().any(|a| a == flag);

    if has("--quiet") {
        config.min_level = LogLevel::Warning;
    }
    if has("--verbose") {
        config.min_level = LogLevel::Verbose;
    }

    for arg in args {
        if let Some(key) = arg.strip_prefix("--debug-") {
            if let Some(tag) = LogTag::from_debug_key(key) {
                config.debug_tags.insert(tag.to_debug_key());
            }
        } else if let Some(key) = arg.strip_prefix("--verbose-") {
            if let Some(tag) = LogTag::from_debug_key(key) {
                config.verbose_tags.insert(tag.to_debug_key());
                config.debug_tags.insert(tag.to_debug_key());
            }
        }
    }

    if let Some(tags) = value_after(args, "--log-tags") {
        config.enabled_tags = tags
            .split(',')
            .filter_map(LogTag::from_debug_key)
            .map(|tag| tag.to_debug_key())
            .collect();
    }

    config.file_path = value_after(args, "--log-file").map(PathBuf::from);

    config
}

fn value_after(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

/// Get a copy of the current logger configuration
pub fn get_logger_config() -> LoggerConfig {
    LOGGER_CONFIG.read().clone()
}

/// Replace the logger configuration
pub fn set_logger_config(config: LoggerConfig) {
    *LOGGER_CONFIG.write() = config;
}

/// Modify the logger configuration in place
pub fn update_logger_config<F>(f: F)
where
    F: FnOnce(&mut LoggerConfig),
{
    f(&mut LOGGER_CONFIG.write());
}

pub(crate) fn is_debug_enabled_for_tag(tag: &LogTag) -> bool {
    let config = LOGGER_CONFIG.read();
    config.min_level == LogLevel::Verbose || config.debug_tags.contains(&tag.to_debug_key())
}

pub(crate) fn is_verbose_enabled_for_tag(tag: &LogTag) -> bool {
    LOGGER_CONFIG
        .read()
        .verbose_tags
        .contains(&tag.to_debug_key())
}

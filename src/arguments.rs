/// Centralized argument handling for orderdesk
///
/// Features:
/// - Centralized CMD_ARGS storage with thread-safe access
/// - Debug flag checking functions per module
/// - Help output
use once_cell::sync::Lazy;
use std::env;
use std::sync::Mutex;

use crate::config::CONFIG_FILE_PATH;
use crate::logger::{self, LogTag};

/// Global command-line arguments storage
/// Thread-safe singleton that stores arguments for access throughout the application
pub static CMD_ARGS: Lazy<Mutex<Vec<String>>> = Lazy::new(|| Mutex::new(env::args().collect()));

/// Gets a copy of the current command-line arguments
pub fn get_cmd_args() -> Vec<String> {
    match CMD_ARGS.lock() {
        Ok(args) => args.clone(),
        Err(_) => {
            // Fallback to env::args if mutex is poisoned
            env::args().collect()
        }
    }
}

/// Checks if a specific argument is present in the command line
pub fn has_arg(arg: &str) -> bool {
    get_cmd_args().iter().any(|a| a == arg)
}

/// Gets the value of a command-line argument that follows a flag
/// Returns None if the flag is not found or has no value
pub fn get_arg_value(flag: &str) -> Option<String> {
    let args = get_cmd_args();
    for (i, arg) in args.iter().enumerate() {
        if arg == flag && i + 1 < args.len() {
            return Some(args[i + 1].clone());
        }
    }
    None
}

// =============================================================================
// DEBUG FLAGS
// =============================================================================

/// Live update hub debug mode
pub fn is_debug_live_enabled() -> bool {
    has_arg("--debug-live")
}

/// Webserver debug mode
pub fn is_debug_webserver_enabled() -> bool {
    has_arg("--debug-webserver")
}

/// Orders module debug mode
pub fn is_debug_orders_enabled() -> bool {
    has_arg("--debug-orders")
}

/// Verbose mode (all tags)
pub fn is_verbose_enabled() -> bool {
    has_arg("--verbose")
}

/// Path of the TOML config file (--config <path>)
pub fn get_config_path() -> String {
    get_arg_value("--config").unwrap_or_else(|| CONFIG_FILE_PATH.to_string())
}

pub mod patterns {
    use super::has_arg;

    pub fn is_help_requested() -> bool {
        has_arg("--help") || has_arg("-h")
    }
}

/// Print help text
pub fn print_help() {
    println!("orderdesk - order management backend with live order updates");
    println!();
    println!("USAGE:");
    println!("    orderdesk [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    --config <path>       TOML config file (default: {})", CONFIG_FILE_PATH);
    println!("    --log-file <path>     Also write logs to this file");
    println!("    --log-tags <a,b>      Only show logs for these tags");
    println!("    --quiet               Only show warnings and errors");
    println!("    --verbose             Show everything");
    println!("    -h, --help            Print this help");
    println!();
    println!("DEBUG FLAGS:");
    for tag in LogTag::ALL {
        println!("    --debug-{}", tag.to_debug_key());
    }
    println!();
    println!("ENVIRONMENT:");
    println!("    ORDERDESK_HTTP_HOST, ORDERDESK_HTTP_PORT   HTTP API bind address");
    println!("    ORDERDESK_LIVE_HOST, ORDERDESK_LIVE_PORT   Live update endpoint bind address");
    println!("    ORDERDESK_DB_PATH                          SQLite database file");
}

/// Log which debug modes are active
pub fn print_debug_info() {
    let enabled: Vec<String> = LogTag::ALL
        .iter()
        .map(|tag| tag.to_debug_key())
        .filter(|key| has_arg(&format!("--debug-{}", key)))
        .collect();

    if !enabled.is_empty() {
        logger::info(
            LogTag::System,
            &format!("🐛 Debug modes enabled: {}", enabled.join(", ")),
        );
    }
    if is_verbose_enabled() {
        logger::info(LogTag::System, "🔍 Verbose logging enabled");
    }
}

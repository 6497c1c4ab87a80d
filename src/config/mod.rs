/// Configuration system
///
/// - `macros`: `config_struct!` for single-source struct definitions
/// - `schemas`: all configuration sections
/// - `utils`: loading and environment overrides
mod macros;
pub mod schemas;
pub mod utils;

pub use schemas::{Config, DatabaseConfig, LiveConfig, WebserverConfig};
pub use utils::{
    apply_env_overrides, load_config_from_path, read_config_file, ConfigError,
    CONFIG_FILE_PATH,
};

/// Configuration macros for zero-repetition config definitions
///
/// This module provides the `config_struct!` macro that allows defining
/// configuration structures with embedded defaults and optional environment
/// variable overrides in a single declaration.

/// Define a configuration struct with embedded defaults
///
/// For every field you give its name, type and default value, and optionally
/// the environment variable that overrides it. The macro generates:
/// - The struct with public fields
/// - The Default implementation
/// - Serde serialization/deserialization with defaults
/// - `apply_env`, which parses overriding variables via `FromStr`
///
/// # Example
/// ```ignore
/// orderdesk::config_struct! {
///     pub struct LiveConfig {
///         host: String = "127.0.0.1".to_string() => env "ORDERDESK_LIVE_HOST",
///         port: u16 = 3001 => env "ORDERDESK_LIVE_PORT",
///         heartbeat_secs: u64 = 30,
///     }
/// }
/// ```
#[macro_export]
macro_rules! config_struct {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field_name:ident: $field_type:ty = $default_value:expr $(=> env $env:literal)?
            ),*
            $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
        #[serde(default)]
        $vis struct $name {
            $(
                $(#[$field_meta])*
                pub $field_name: $field_type,
            )*
        }

        impl Default for $name {
            fn default() -> Self {
                Self {
                    $(
                        $field_name: $default_value,
                    )*
                }
            }
        }

        impl $name {
            /// Override fields from environment-style lookups
            ///
            /// `lookup` returns the raw value of a variable, if set.
            pub fn apply_env<F>(&mut self, lookup: &F) -> Result<(), $crate::config::ConfigError>
            where
                F: Fn(&str) -> Option<String>,
            {
                let _ = &lookup;
                $(
                    $(
                        if let Some(raw) = lookup($env) {
                            self.$field_name = raw.trim().parse::<$field_type>().map_err(|_| {
                                $crate::config::ConfigError::InvalidOverride {
                                    key: $env.to_string(),
                                    value: raw.clone(),
                                }
                            })?;
                        }
                    )?
                )*
                Ok(())
            }
        }
    };
}

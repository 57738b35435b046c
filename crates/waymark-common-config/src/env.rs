//! Environment variable handling.

use std::env;

/// Environment variable names.
pub mod vars {
    pub const WAYMARK_CONFIG_PATH: &str = "WAYMARK_CONFIG_PATH";
    pub const WAYMARK_LOG_LEVEL: &str = "WAYMARK_LOG_LEVEL";
    pub const WAYMARK_ENV: &str = "WAYMARK_ENV";
    pub const RUST_LOG: &str = "RUST_LOG";
}

/// Environment bootstrap.
pub struct Environment {
    _guard: (),
}

impl Environment {
    /// Load `.env`, `.env.local` and `.env.<WAYMARK_ENV>` if present.
    ///
    /// Later files override earlier ones. Missing files are ignored.
    pub fn init() -> Self {
        let _ = dotenvy::from_filename(".env");
        let _ = dotenvy::from_filename(".env.local");

        if let Ok(name) = env::var(vars::WAYMARK_ENV) {
            let _ = dotenvy::from_filename(format!(".env.{}", name));
        }

        Self { _guard: () }
    }

    /// Get an optional string variable.
    pub fn get(var: &str) -> Option<String> {
        env::var(var).ok()
    }

    /// Get a variable with a default value.
    pub fn get_or(var: &str, default: &str) -> String {
        env::var(var).unwrap_or_else(|_| default.to_string())
    }

    /// Path of the config file, if one was configured.
    pub fn config_path() -> Option<std::path::PathBuf> {
        Self::get(vars::WAYMARK_CONFIG_PATH).map(Into::into)
    }
}

//! The configuration source capability.

use crate::ConfigError;
use std::collections::HashMap;

/// Read access to named settings grouped into sections.
pub trait ConfigSource: Send + Sync {
    /// Look up a raw setting.
    fn get_string(&self, section: &str, key: &str) -> Option<String>;

    /// Look up an integer setting. Absent keys yield `Ok(None)`.
    fn get_int(&self, section: &str, key: &str) -> Result<Option<i64>, ConfigError> {
        match self.get_string(section, key) {
            Some(raw) => raw
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| ConfigError::invalid(section, key, format!("expected integer, got {raw:?}"))),
            None => Ok(None),
        }
    }

    /// Look up a setting that must be present.
    fn require_string(&self, section: &str, key: &str) -> Result<String, ConfigError> {
        self.get_string(section, key).ok_or_else(|| ConfigError::Missing {
            section: section.to_string(),
            key: key.to_string(),
        })
    }
}

impl<T: ConfigSource + ?Sized> ConfigSource for &T {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        (**self).get_string(section, key)
    }
}

/// In-memory configuration.
#[derive(Debug, Clone, Default)]
pub struct MemoryConfig {
    sections: HashMap<String, HashMap<String, String>>,
}

impl MemoryConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a setting.
    pub fn with(mut self, section: &str, key: &str, value: impl ToString) -> Self {
        self.set(section, key, value);
        self
    }

    /// Set a setting in place.
    pub fn set(&mut self, section: &str, key: &str, value: impl ToString) {
        self.sections
            .entry(section.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());
    }
}

impl ConfigSource for MemoryConfig {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.sections.get(section)?.get(key).cloned()
    }
}

//! YAML configuration files.

use crate::{ConfigError, ConfigSource};
use regex::Regex;
use serde_yaml::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

/// Prefix for environment overrides: `WAYMARK__<SECTION>__<KEY>`.
pub const ENV_OVERRIDE_PREFIX: &str = "WAYMARK";

/// Configuration parsed from a YAML document of sections.
///
/// ```yaml
/// UserEventRecorder:
///   MaxEventQueueSize: 500
///   ConnectionString: ${WAYMARK_DB:-events.db}
/// ```
#[derive(Debug, Clone, Default)]
pub struct YamlConfig {
    sections: HashMap<String, HashMap<String, String>>,
    env_overrides: bool,
}

impl YamlConfig {
    /// Load and parse a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse a YAML document.
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let expanded = expand_env_vars(contents)?;

        let raw: HashMap<String, HashMap<String, Value>> = if expanded.trim().is_empty() {
            HashMap::new()
        } else {
            serde_yaml::from_str(&expanded).map_err(|e| ConfigError::ParseError {
                line: e.location().map(|l| l.line()),
                message: e.to_string(),
            })?
        };

        let mut sections = HashMap::with_capacity(raw.len());
        for (section, entries) in raw {
            let mut values = HashMap::with_capacity(entries.len());
            for (key, value) in entries {
                let scalar = scalar_to_string(&value)
                    .ok_or_else(|| ConfigError::invalid(&section, &key, "expected a scalar value"))?;
                values.insert(key, scalar);
            }
            sections.insert(section, values);
        }

        Ok(Self {
            sections,
            env_overrides: true,
        })
    }

    /// Disable `WAYMARK__<SECTION>__<KEY>` environment overrides.
    pub fn without_env_overrides(mut self) -> Self {
        self.env_overrides = false;
        self
    }

    /// Names of the sections present in the document.
    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    fn override_var(section: &str, key: &str) -> String {
        format!(
            "{}__{}__{}",
            ENV_OVERRIDE_PREFIX,
            section.to_uppercase(),
            key.to_uppercase()
        )
    }
}

impl ConfigSource for YamlConfig {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        if self.env_overrides {
            if let Ok(value) = std::env::var(Self::override_var(section, key)) {
                return Some(value);
            }
        }
        self.sections.get(section)?.get(key).cloned()
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$\{([^}:]+)(?::-([^}]*))?\}").expect("env var pattern is valid")
    })
}

/// Expand environment variables in the form `${VAR}` or `${VAR:-default}`.
pub fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
    let mut result = content.to_string();

    for cap in env_var_pattern().captures_iter(content) {
        let full_match = &cap[0];
        let var_name = &cap[1];
        let default = cap.get(2).map(|m| m.as_str());

        let value = match std::env::var(var_name) {
            Ok(v) => v,
            Err(_) => match default {
                Some(d) => d.to_string(),
                None => {
                    return Err(ConfigError::EnvVarNotFound {
                        var: var_name.to_string(),
                    })
                }
            },
        };

        result = result.replace(full_match, &value);
    }

    Ok(result)
}

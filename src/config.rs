use std::{path::{Path, PathBuf}, time::Duration};

use serde::{Deserialize, Serialize};

use crate::MockError;

/// Every field has a default so a YAML file only needs the keys it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MockConfig {
    pub version: String,
    pub default_model: String,
    /// Delay before each streamed token, in milliseconds. Zero or negative disables pacing.
    pub token_delay_ms: i64,
    pub tool_call_delay_ms: i64,
    pub scenarios_dir: PathBuf,
    pub bind: String,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            version: "0.0.1-local".to_string(),
            default_model: "gpt-4o-mini".to_string(),
            token_delay_ms: 150,
            tool_call_delay_ms: 1000,
            scenarios_dir: PathBuf::from("scenarios"),
            bind: "0.0.0.0:11434".to_string(),
        }
    }
}

impl MockConfig {
    pub fn from_yaml_str(raw: &str) -> Result<Self, MockError> {
        Ok(serde_yaml::from_str(raw)?)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, MockError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| MockError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&raw)
    }

    /// Settings for tests: no pacing at all.
    pub fn immediate() -> Self {
        Self {
            token_delay_ms: 0,
            tool_call_delay_ms: 0,
            ..Self::default()
        }
    }

    pub fn with_scenarios_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scenarios_dir = dir.into();
        self
    }

    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    pub fn token_delay(&self) -> Duration {
        millis(self.token_delay_ms)
    }

    pub fn tool_call_delay(&self) -> Duration {
        millis(self.tool_call_delay_ms)
    }

    /// Returns the requested model unless it is blank.
    pub fn resolve_model(&self, requested: Option<&str>) -> String {
        match requested {
            Some(model) if !model.trim().is_empty() => model.to_string(),
            _ => self.default_model.clone(),
        }
    }
}

fn millis(value: i64) -> Duration {
    if value <= 0 {
        Duration::ZERO
    } else {
        Duration::from_millis(value as u64)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::MockConfig;

    #[test]
    fn yaml_overrides_only_named_fields() {
        let config = MockConfig::from_yaml_str("default_model: llama3\ntoken_delay_ms: 5\n")
            .expect("valid yaml");

        assert_eq!(config.default_model, "llama3");
        assert_eq!(config.token_delay(), Duration::from_millis(5));
        assert_eq!(config.tool_call_delay(), Duration::from_secs(1));
        assert_eq!(config.version, "0.0.1-local");
    }

    #[test]
    fn negative_delays_mean_no_delay() {
        let config = MockConfig {
            token_delay_ms: -20,
            tool_call_delay_ms: 0,
            ..MockConfig::default()
        };

        assert_eq!(config.token_delay(), Duration::ZERO);
        assert_eq!(config.tool_call_delay(), Duration::ZERO);
    }

    #[test]
    fn blank_model_falls_back_to_default() {
        let config = MockConfig::default().with_default_model("default-model");

        assert_eq!(config.resolve_model(Some("llama3")), "llama3");
        assert_eq!(config.resolve_model(Some("   ")), "default-model");
        assert_eq!(config.resolve_model(None), "default-model");
    }

    #[test]
    fn malformed_yaml_is_rejected() {
        assert!(MockConfig::from_yaml_str("token_delay_ms: [1, 2]").is_err());
    }
}

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::history::DEFAULT_HISTORY_CAPACITY;
use crate::submission::DEFAULT_MAX_PROMPT_CHARS;
use crate::surface::{CANVAS_HEIGHT, CANVAS_WIDTH};
use crate::tools::Tool;

/// Settings for one editing session.
///
/// Every field has a default, so a partial JSON document is enough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)] // missing fields fall back to their defaults
pub struct SessionConfig {
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Maximum number of undo snapshots kept
    pub history_capacity: usize,
    pub max_prompt_chars: usize,
    pub initial_tool: Tool,
    pub endpoint: EndpointConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            canvas_width: CANVAS_WIDTH,
            canvas_height: CANVAS_HEIGHT,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            max_prompt_chars: DEFAULT_MAX_PROMPT_CHARS,
            initial_tool: Tool::default(),
            endpoint: EndpointConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.canvas_width == 0 || self.canvas_height == 0 {
            return Err(ConfigError::Invalid(format!(
                "canvas must not be empty, got {}x{}",
                self.canvas_width, self.canvas_height
            )));
        }
        if self.history_capacity == 0 {
            return Err(ConfigError::Invalid(
                "history_capacity must be at least 1".to_owned(),
            ));
        }
        if self.max_prompt_chars == 0 {
            return Err(ConfigError::Invalid(
                "max_prompt_chars must be at least 1".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Where and how to reach the image-generation service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub url: String,
    /// Header carrying the static credential
    pub credential_header: String,
    #[serde(skip_serializing)]
    pub credential: Option<String>,
    pub timeout_secs: u64,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            credential_header: "Authorization".to_owned(),
            credential: None,
            timeout_secs: 120,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_gives_defaults() {
        let config = SessionConfig::from_json("{}").unwrap();
        assert_eq!(config, SessionConfig::default());
        assert_eq!(config.canvas_width, 1024);
        assert_eq!(config.max_prompt_chars, 500);
    }

    #[test]
    fn test_partial_json() {
        let config = SessionConfig::from_json(
            r#"{
                "history_capacity": 10,
                "initial_tool": "Eraser",
                "endpoint": { "url": "http://localhost:8000/generate", "credential": "k" }
            }"#,
        )
        .unwrap();
        assert_eq!(config.history_capacity, 10);
        assert_eq!(config.initial_tool, Tool::Eraser);
        assert_eq!(config.endpoint.url, "http://localhost:8000/generate");
        assert_eq!(config.endpoint.credential.as_deref(), Some("k"));
        assert_eq!(config.endpoint.timeout_secs, 120);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            SessionConfig::from_json(r#"{ "canvas_width": 0 }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            SessionConfig::from_json(r#"{ "history_capacity": 0 }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            SessionConfig::from_json("not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_credential_is_not_serialized() {
        let mut config = SessionConfig::default();
        config.endpoint.credential = Some("secret".to_owned());
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret"));
    }
}

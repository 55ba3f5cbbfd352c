use serde::{Deserialize, Serialize};

use super::Scenario;

/// One scripted thinking/response pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thinking: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
}

impl ChunkDefinition {
    pub fn thinking(text: impl Into<String>) -> Self {
        Self {
            thinking: Some(text.into()),
            response: None,
        }
    }

    pub fn response(text: impl Into<String>) -> Self {
        Self {
            thinking: None,
            response: Some(text.into()),
        }
    }

    pub fn thinking_text(&self) -> Option<&str> {
        non_empty(self.thinking.as_deref())
    }

    pub fn response_text(&self) -> Option<&str> {
        non_empty(self.response.as_deref())
    }
}

/// A scenario scripted as a flat list of chunks, used by the generate and
/// plain chat endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlatScenario {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub chunks: Vec<ChunkDefinition>,
}

impl FlatScenario {
    pub fn new(prompt: impl Into<String>, chunks: Vec<ChunkDefinition>) -> Self {
        Self {
            prompt: prompt.into(),
            chunks,
        }
    }
}

impl Scenario for FlatScenario {
    fn prompt(&self) -> &str {
        &self.prompt
    }
}

pub(crate) fn non_empty(text: Option<&str>) -> Option<&str> {
    text.filter(|text| !text.trim().is_empty())
}

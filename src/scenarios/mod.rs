//! Scenario catalogs: authored scripts keyed by their normalized prompt.
//!
//! Each catalog is loaded once at startup from a JSON document shaped like
//! `{ "scenarios": [ ... ] }` and is read-only afterwards, so a single
//! [`ScenarioIndex`] can be shared across any number of concurrent requests.

use std::{collections::HashMap, path::Path};

use serde::{de::DeserializeOwned, Deserialize};

use crate::{
    types::{ChatMessage, MessageRole},
    MockError,
};

pub mod chunks;
pub mod stages;

pub use chunks::{ChunkDefinition, FlatScenario};
pub use stages::{StageDefinition, StageResolution, StageScenario, StageTrigger, ToolCallDefinition};

pub const GENERATE_SCENARIOS_FILE: &str = "generate-scenarios.json";
pub const CHAT_DIALOGUE_SCENARIOS_FILE: &str = "chat-dialog-scenarios.json";
pub const CHAT_TOOL_SCENARIOS_FILE: &str = "chat-scenarios.json";

/// Anything that can be looked up by its authored prompt.
pub trait Scenario {
    fn prompt(&self) -> &str;
}

/// Trims and case-folds a prompt into its lookup key.
pub fn normalize_prompt(prompt: &str) -> String {
    prompt.trim().to_lowercase()
}

#[derive(Debug, Deserialize)]
struct ScenarioDocument<S> {
    scenarios: Option<Vec<S>>,
}

#[derive(Debug, Clone)]
pub struct ScenarioIndex<S> {
    definitions: Vec<S>,
    by_prompt: HashMap<String, usize>,
}

impl<S> Default for ScenarioIndex<S> {
    fn default() -> Self {
        Self {
            definitions: Vec::new(),
            by_prompt: HashMap::new(),
        }
    }
}

impl<S: Scenario + DeserializeOwned> ScenarioIndex<S> {
    /// Loads a catalog from disk.
    ///
    /// A missing file yields an empty catalog and a warning. A file that exists
    /// but does not parse is an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MockError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::warn!(path = %path.display(), "scenario file not found, catalog is empty");
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path).map_err(|source| MockError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let index = Self::parse(&raw).map_err(|source| MockError::ScenarioParse {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::info!(
            path = %path.display(),
            count = index.len(),
            "loaded scenario catalog"
        );
        Ok(index)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        Self::parse(raw)
    }

    fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        let document: ScenarioDocument<S> = serde_json::from_str(raw)?;
        Ok(Self::from_definitions(document.scenarios.unwrap_or_default()))
    }
}

impl<S: Scenario> ScenarioIndex<S> {
    pub fn from_definitions(definitions: Vec<S>) -> Self {
        let by_prompt = definitions
            .iter()
            .enumerate()
            .map(|(position, definition)| (normalize_prompt(definition.prompt()), position))
            .collect();

        Self {
            definitions,
            by_prompt,
        }
    }

    pub fn find_by_prompt(&self, prompt: &str) -> Option<&S> {
        if prompt.trim().is_empty() {
            return None;
        }
        self.by_prompt
            .get(&normalize_prompt(prompt))
            .map(|&position| &self.definitions[position])
    }

    /// Matches on the first user message that carries text.
    pub fn find_for_conversation(&self, messages: &[ChatMessage]) -> Option<&S> {
        messages
            .iter()
            .filter(|message| message.role == Some(MessageRole::User))
            .find_map(ChatMessage::text)
            .and_then(|text| self.find_by_prompt(text))
    }

    /// Authored prompts in load order, as written.
    pub fn supported_prompts(&self) -> Vec<&str> {
        self.definitions.iter().map(|definition| definition.prompt()).collect()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

//! Tool-calling scenarios and the resolver that picks the stage for a request.
//!
//! A conversation advances one stage per request. Nothing is remembered
//! between requests: the caller re-sends the whole history, and the resolver
//! looks only at the latest message to decide which stage answers it.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::{chunks::non_empty, Scenario};
use crate::types::{latest_with_role, ChatMessage, MessageRole};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StageTrigger {
    User,
    Tool,
    #[default]
    Unknown,
}

impl StageTrigger {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "user" => Self::User,
            "tool" => Self::Tool,
            _ => Self::Unknown,
        }
    }
}

impl<'de> Deserialize<'de> for StageTrigger {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw.as_deref().map_or(Self::Unknown, Self::parse))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallDefinition {
    pub name: String,
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageDefinition {
    #[serde(default)]
    pub trigger: StageTrigger,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thinking: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call: Option<ToolCallDefinition>,
}

impl StageDefinition {
    pub fn response_text(&self) -> Option<&str> {
        non_empty(self.response.as_deref())
    }

    fn handles_tool(&self, normalized_tool: &str) -> bool {
        self.trigger == StageTrigger::Tool
            && self
                .tool_name
                .as_deref()
                .map(normalize_tool_name)
                .is_some_and(|name| name == normalized_tool)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageScenario {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub stages: Vec<StageDefinition>,
}

impl Scenario for StageScenario {
    fn prompt(&self) -> &str {
        &self.prompt
    }
}

/// Outcome of matching a conversation against a scenario's stages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StageResolution<'a> {
    UserStage(&'a StageDefinition),
    ToolStage(&'a StageDefinition),
    NoMatch,
}

impl<'a> StageResolution<'a> {
    pub fn stage(&self) -> Option<&'a StageDefinition> {
        match *self {
            Self::UserStage(stage) | Self::ToolStage(stage) => Some(stage),
            Self::NoMatch => None,
        }
    }
}

impl StageScenario {
    pub fn stage_for_user_prompt(&self) -> Option<&StageDefinition> {
        self.stages
            .iter()
            .find(|stage| stage.trigger == StageTrigger::User)
    }

    pub fn stage_for_tool(&self, tool_name: &str) -> Option<&StageDefinition> {
        let normalized = normalize_tool_name(tool_name);
        if normalized.is_empty() {
            return None;
        }
        self.stages.iter().find(|stage| stage.handles_tool(&normalized))
    }

    /// Picks the stage answering the latest message that has a role.
    pub fn resolve(&self, messages: &[ChatMessage]) -> StageResolution<'_> {
        let Some(latest) = latest_with_role(messages) else {
            return StageResolution::NoMatch;
        };

        let stage = match latest.role {
            Some(MessageRole::Tool) => latest
                .tool_name
                .as_deref()
                .and_then(|name| self.stage_for_tool(name))
                .map(StageResolution::ToolStage),
            Some(MessageRole::User) => self.stage_for_user_prompt().map(StageResolution::UserStage),
            _ => None,
        };

        stage.unwrap_or(StageResolution::NoMatch)
    }
}

fn normalize_tool_name(name: &str) -> String {
    name.trim().to_lowercase()
}

use std::pin::Pin;

use futures_core::Stream;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::types::{ToolCall, ToolCallFunction};

pub type EventStream = Pin<Box<dyn Stream<Item = OutgoingEvent> + Send>>;

/// A single unit of scripted model output.
#[derive(Debug, Clone, PartialEq)]
pub enum OutgoingEvent {
    Thinking(String),
    Content(String),
    ToolCall(ToolCallEvent),
    /// Terminates every response; always emitted exactly once, last.
    Done,
}

impl OutgoingEvent {
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallEvent {
    pub id: String,
    pub name: String,
    pub arguments: Map<String, Value>,
}

impl ToolCallEvent {
    pub fn new(name: impl Into<String>, arguments: Map<String, Value>) -> Self {
        Self {
            id: format!("toolcall-{}", Uuid::new_v4()),
            name: name.into(),
            arguments,
        }
    }
}

impl From<ToolCallEvent> for ToolCall {
    fn from(event: ToolCallEvent) -> Self {
        ToolCall {
            id: Some(event.id),
            function: ToolCallFunction {
                name: event.name,
                arguments: event.arguments,
            },
        }
    }
}

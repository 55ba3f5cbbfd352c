//! Endpoint services: pick the script for a request and present it either as
//! a paced stream of frames or as one final frame.

use std::pin::Pin;

use chrono::{SecondsFormat, Utc};
use futures_core::Stream;

use crate::{
    events::OutgoingEvent,
    types::{ChatMessage, ChatResponse, GenerateResponse, MessageRole, ToolCall},
};

pub mod chat;
pub mod chat_tools;
pub mod generate;

pub use chat::ChatService;
pub use chat_tools::ChatToolsService;
pub use generate::GenerateService;

pub type ResponseStream<T> = Pin<Box<dyn Stream<Item = T> + Send>>;

pub(crate) fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn assistant_message() -> ChatMessage {
    ChatMessage {
        role: Some(MessageRole::Assistant),
        ..ChatMessage::default()
    }
}

pub(crate) fn chat_frame(model: &str, event: OutgoingEvent) -> ChatResponse {
    let message = match event {
        OutgoingEvent::Done => None,
        OutgoingEvent::Thinking(text) => Some(ChatMessage {
            thinking: Some(text),
            ..assistant_message()
        }),
        OutgoingEvent::Content(text) => Some(ChatMessage {
            content: Some(text),
            ..assistant_message()
        }),
        OutgoingEvent::ToolCall(call) => Some(ChatMessage {
            tool_calls: vec![ToolCall::from(call)],
            ..assistant_message()
        }),
    };

    ChatResponse {
        model: model.to_string(),
        created_at: timestamp(),
        done: message.is_none(),
        message,
    }
}

pub(crate) fn chat_final(model: &str, message: ChatMessage) -> ChatResponse {
    ChatResponse {
        model: model.to_string(),
        created_at: timestamp(),
        message: Some(message),
        done: true,
    }
}

pub(crate) fn chat_final_event(model: &str, event: Option<OutgoingEvent>) -> ChatResponse {
    let message = match event.map(|event| chat_frame(model, event).message) {
        Some(Some(message)) => message,
        _ => assistant_message(),
    };
    chat_final(model, message)
}

pub(crate) fn chat_final_aggregate(
    model: &str,
    thinking: Option<String>,
    content: Option<String>,
) -> ChatResponse {
    chat_final(
        model,
        ChatMessage {
            thinking,
            content,
            ..assistant_message()
        },
    )
}

pub(crate) fn generate_frame(model: &str, event: OutgoingEvent) -> GenerateResponse {
    let (thinking, response) = match event {
        OutgoingEvent::Thinking(text) => (Some(text), None),
        OutgoingEvent::Content(text) => (None, Some(text)),
        OutgoingEvent::ToolCall(_) | OutgoingEvent::Done => (None, None),
    };

    GenerateResponse {
        model: model.to_string(),
        created_at: timestamp(),
        done: response.is_none() && thinking.is_none(),
        response,
        thinking,
    }
}

pub(crate) fn generate_final(
    model: &str,
    thinking: Option<String>,
    response: Option<String>,
) -> GenerateResponse {
    GenerateResponse {
        model: model.to_string(),
        created_at: timestamp(),
        response,
        thinking,
        done: true,
    }
}

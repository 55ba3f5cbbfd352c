use std::sync::Arc;

use futures_util::StreamExt;

use super::{chat_final, chat_final_aggregate, chat_frame, ResponseStream};
use crate::{
    assembler::{aggregate_chunks, chunk_events, finish, CHAT_FALLBACK},
    config::MockConfig,
    events::OutgoingEvent,
    pacing::DelayScheduler,
    scenarios::{FlatScenario, ScenarioIndex},
    summary::summarize_tool_payload,
    types::{latest_with_role, ChatMessage, ChatRequest, ChatResponse, MessageRole},
};

/// Serves plain `/api/chat` conversations from the dialogue catalog.
#[derive(Debug, Clone)]
pub struct ChatService {
    config: Arc<MockConfig>,
    scenarios: Arc<ScenarioIndex<FlatScenario>>,
    scheduler: DelayScheduler,
}

enum Reply<'a> {
    ToolSummary(String),
    Scenario(&'a FlatScenario),
    Unsupported,
}

impl ChatService {
    pub fn new(config: Arc<MockConfig>, scenarios: Arc<ScenarioIndex<FlatScenario>>) -> Self {
        let scheduler = DelayScheduler::from_config(&config);
        Self {
            config,
            scenarios,
            scheduler,
        }
    }

    fn reply(&self, messages: &[ChatMessage]) -> Reply<'_> {
        if let Some(latest) = latest_with_role(messages) {
            if latest.role == Some(MessageRole::Tool) {
                return Reply::ToolSummary(summarize_tool_payload(latest));
            }
        }
        match self.scenarios.find_for_conversation(messages) {
            Some(scenario) => Reply::Scenario(scenario),
            None => Reply::Unsupported,
        }
    }

    fn fallback_message(&self) -> String {
        CHAT_FALLBACK.message(&self.scenarios.supported_prompts())
    }

    pub fn events(&self, request: &ChatRequest) -> Vec<OutgoingEvent> {
        match self.reply(&request.messages) {
            Reply::ToolSummary(summary) => finish(vec![OutgoingEvent::Content(summary)]),
            Reply::Scenario(scenario) => chunk_events(&scenario.chunks, request.thinking_enabled()),
            Reply::Unsupported => finish(vec![OutgoingEvent::Content(self.fallback_message())]),
        }
    }

    pub fn stream(&self, request: &ChatRequest) -> ResponseStream<ChatResponse> {
        let model = self.config.resolve_model(request.model.as_deref());
        tracing::info!(
            messages = request.messages.len(),
            think = request.thinking_enabled(),
            %model,
            "chat stream"
        );

        let events = self.events(request);
        Box::pin(
            self.scheduler
                .pace(events)
                .map(move |event| chat_frame(&model, event)),
        )
    }

    pub fn single(&self, request: &ChatRequest) -> ChatResponse {
        let model = self.config.resolve_model(request.model.as_deref());
        tracing::info!(messages = request.messages.len(), %model, "chat single");

        match self.reply(&request.messages) {
            Reply::ToolSummary(summary) => chat_final(&model, ChatMessage::assistant(summary)),
            Reply::Scenario(scenario) => {
                let aggregate = aggregate_chunks(&scenario.chunks, request.thinking_enabled());
                chat_final_aggregate(&model, aggregate.thinking, aggregate.content)
            }
            Reply::Unsupported => chat_final(&model, ChatMessage::assistant(self.fallback_message())),
        }
    }
}

use std::sync::Arc;

use futures_util::StreamExt;

use super::{chat_final, chat_final_event, chat_frame, ResponseStream};
use crate::{
    assembler::{stage_events, stage_single, CHAT_TOOLS_FALLBACK},
    config::MockConfig,
    events::OutgoingEvent,
    pacing::DelayScheduler,
    scenarios::{ScenarioIndex, StageScenario},
    types::{ChatMessage, ChatRequest, ChatResponse},
};

/// Serves tool-calling conversations, one scripted stage per request.
#[derive(Debug, Clone)]
pub struct ChatToolsService {
    config: Arc<MockConfig>,
    scenarios: Arc<ScenarioIndex<StageScenario>>,
    scheduler: DelayScheduler,
}

impl ChatToolsService {
    pub fn new(config: Arc<MockConfig>, scenarios: Arc<ScenarioIndex<StageScenario>>) -> Self {
        let scheduler = DelayScheduler::from_config(&config);
        Self {
            config,
            scenarios,
            scheduler,
        }
    }

    fn fallback_message(&self) -> String {
        CHAT_TOOLS_FALLBACK.message(&self.scenarios.supported_prompts())
    }

    pub fn events(&self, request: &ChatRequest) -> Vec<OutgoingEvent> {
        match self.scenarios.find_for_conversation(&request.messages) {
            Some(scenario) => stage_events(scenario, &request.messages),
            None => CHAT_TOOLS_FALLBACK.events(&self.scenarios.supported_prompts()),
        }
    }

    pub fn stream(&self, request: &ChatRequest) -> ResponseStream<ChatResponse> {
        let model = self.config.resolve_model(request.model.as_deref());
        tracing::info!(
            messages = request.messages.len(),
            think = request.thinking_enabled(),
            %model,
            "chat tools stream"
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
        tracing::info!(messages = request.messages.len(), %model, "chat tools single");

        match self.scenarios.find_for_conversation(&request.messages) {
            Some(scenario) => chat_final_event(&model, stage_single(scenario, &request.messages)),
            None => chat_final(&model, ChatMessage::assistant(self.fallback_message())),
        }
    }
}

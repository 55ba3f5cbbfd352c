use std::sync::Arc;

use futures_util::StreamExt;

use super::{generate_final, generate_frame, ResponseStream};
use crate::{
    assembler::{aggregate_chunks, chunk_events, GENERATE_FALLBACK},
    config::MockConfig,
    events::OutgoingEvent,
    pacing::DelayScheduler,
    scenarios::{FlatScenario, ScenarioIndex},
    types::{GenerateRequest, GenerateResponse},
};

#[derive(Debug, Clone)]
pub struct GenerateService {
    config: Arc<MockConfig>,
    scenarios: Arc<ScenarioIndex<FlatScenario>>,
    scheduler: DelayScheduler,
}

impl GenerateService {
    pub fn new(config: Arc<MockConfig>, scenarios: Arc<ScenarioIndex<FlatScenario>>) -> Self {
        let scheduler = DelayScheduler::from_config(&config);
        Self {
            config,
            scenarios,
            scheduler,
        }
    }

    fn find(&self, request: &GenerateRequest) -> Option<&FlatScenario> {
        request
            .prompt
            .as_deref()
            .and_then(|prompt| self.scenarios.find_by_prompt(prompt))
    }

    fn fallback_message(&self) -> String {
        GENERATE_FALLBACK.message(&self.scenarios.supported_prompts())
    }

    pub fn events(&self, request: &GenerateRequest) -> Vec<OutgoingEvent> {
        match self.find(request) {
            Some(scenario) => chunk_events(&scenario.chunks, request.thinking_enabled()),
            None => GENERATE_FALLBACK.events(&self.scenarios.supported_prompts()),
        }
    }

    pub fn stream(&self, request: &GenerateRequest) -> ResponseStream<GenerateResponse> {
        let model = self.config.resolve_model(request.model.as_deref());
        tracing::info!(
            prompt = request.prompt.as_deref().unwrap_or_default(),
            think = request.thinking_enabled(),
            %model,
            "generate stream"
        );

        let events = self.events(request);
        Box::pin(
            self.scheduler
                .pace(events)
                .map(move |event| generate_frame(&model, event)),
        )
    }

    pub fn single(&self, request: &GenerateRequest) -> GenerateResponse {
        let model = self.config.resolve_model(request.model.as_deref());
        tracing::info!(
            prompt = request.prompt.as_deref().unwrap_or_default(),
            %model,
            "generate single"
        );

        match self.find(request) {
            Some(scenario) => {
                let aggregate = aggregate_chunks(&scenario.chunks, request.thinking_enabled());
                generate_final(&model, aggregate.thinking, aggregate.content)
            }
            None => generate_final(&model, None, Some(self.fallback_message())),
        }
    }
}

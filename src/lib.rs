pub mod assembler;
pub mod config;
pub mod error;
pub mod events;
pub mod http;
pub mod pacing;
pub mod scenarios;
pub mod services;
pub mod summary;
pub mod tokenizer;
pub mod types;

pub use config::MockConfig;
pub use error::MockError;
pub use events::{EventStream, OutgoingEvent, ToolCallEvent};
pub use http::{router, AppState};
pub use pacing::DelayScheduler;
pub use scenarios::{
    ChunkDefinition, FlatScenario, Scenario, ScenarioIndex, StageDefinition, StageResolution,
    StageScenario, StageTrigger, ToolCallDefinition,
};
pub use services::{ChatService, ChatToolsService, GenerateService, ResponseStream};
pub use tokenizer::tokenize;
pub use types::{
    ChatMessage, ChatRequest, ChatResponse, GenerateRequest, GenerateResponse, MessageRole,
    ToolCall, ToolCallFunction,
};

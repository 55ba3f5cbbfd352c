//! Every event list built here ends with exactly one [`OutgoingEvent::Done`].

use crate::{
    events::{OutgoingEvent, ToolCallEvent},
    scenarios::{ChunkDefinition, StageDefinition, StageResolution, StageScenario},
    tokenizer::{printable, tokenize},
    types::ChatMessage,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fallback {
    pub prefix: &'static str,
    pub empty_note: &'static str,
}

pub const GENERATE_FALLBACK: Fallback = Fallback {
    prefix: "Sorry, only these prompts are supported for this endpoint:",
    empty_note: "(no scenarios configured)",
};

pub const CHAT_FALLBACK: Fallback = Fallback {
    prefix: "Sorry, only these chat prompts are supported:",
    empty_note: "(no chat prompts configured)",
};

pub const CHAT_TOOLS_FALLBACK: Fallback = Fallback {
    prefix: "Sorry, only these chat tool prompts are supported:",
    empty_note: "(no tool prompts configured)",
};

impl Fallback {
    pub fn message(&self, prompts: &[&str]) -> String {
        if prompts.is_empty() {
            return format!("{} {}", self.prefix, self.empty_note);
        }
        let listing: Vec<String> = prompts.iter().map(|prompt| format!("- {prompt}")).collect();
        format!("{}\n{}", self.prefix, listing.join("\n"))
    }

    pub fn events(&self, prompts: &[&str]) -> Vec<OutgoingEvent> {
        finish(vec![OutgoingEvent::Content(self.message(prompts))])
    }
}

pub fn unhandled_stage_message(prompt: &str) -> String {
    format!("This step for prompt \"{prompt}\" is not configured yet. Please restart the conversation.")
}

pub fn finish(mut events: Vec<OutgoingEvent>) -> Vec<OutgoingEvent> {
    events.push(OutgoingEvent::Done);
    events
}

pub fn chunk_events(chunks: &[ChunkDefinition], thinking_enabled: bool) -> Vec<OutgoingEvent> {
    let mut events = Vec::new();
    for chunk in chunks {
        if thinking_enabled {
            if let Some(thinking) = chunk.thinking_text() {
                push_tokens(&mut events, thinking, TokenKind::Thinking);
            }
        }
        if let Some(response) = chunk.response_text() {
            push_tokens(&mut events, response, TokenKind::Content);
        }
    }
    finish(events)
}

/// Streams the stage answering the latest message: one whole tool call, or
/// its response tokens. Stage thinking is never streamed.
pub fn stage_events(scenario: &StageScenario, messages: &[ChatMessage]) -> Vec<OutgoingEvent> {
    let resolution = scenario.resolve(messages);
    tracing::debug!(prompt = %scenario.prompt, ?resolution, "resolved stage");

    let Some(stage) = resolution.stage() else {
        return finish(vec![OutgoingEvent::Content(unhandled_stage_message(&scenario.prompt))]);
    };

    let mut events = Vec::new();
    if let Some(call) = tool_call_event(stage) {
        events.push(call);
    } else if let Some(response) = stage.response_text() {
        push_tokens(&mut events, response, TokenKind::Content);
    }
    finish(events)
}

/// `None` when the matched stage scripts neither a tool call nor a response.
pub fn stage_single(scenario: &StageScenario, messages: &[ChatMessage]) -> Option<OutgoingEvent> {
    match scenario.resolve(messages) {
        StageResolution::NoMatch => Some(OutgoingEvent::Content(unhandled_stage_message(
            &scenario.prompt,
        ))),
        StageResolution::UserStage(stage) | StageResolution::ToolStage(stage) => {
            tool_call_event(stage).or_else(|| {
                stage
                    .response_text()
                    .map(|response| OutgoingEvent::Content(response.to_string()))
            })
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregate {
    pub thinking: Option<String>,
    pub content: Option<String>,
}

pub fn aggregate_chunks(chunks: &[ChunkDefinition], thinking_enabled: bool) -> Aggregate {
    let thinking: Vec<&str> = if thinking_enabled {
        chunks.iter().filter_map(ChunkDefinition::thinking_text).collect()
    } else {
        Vec::new()
    };
    let content: Vec<&str> = chunks.iter().filter_map(ChunkDefinition::response_text).collect();

    Aggregate {
        thinking: join_paragraphs(&thinking),
        content: join_paragraphs(&content),
    }
}

fn join_paragraphs(parts: &[&str]) -> Option<String> {
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n\n"))
    }
}

fn tool_call_event(stage: &StageDefinition) -> Option<OutgoingEvent> {
    stage.tool_call.as_ref().map(|call| {
        OutgoingEvent::ToolCall(ToolCallEvent::new(call.name.clone(), call.arguments.clone()))
    })
}

#[derive(Debug, Clone, Copy)]
enum TokenKind {
    Thinking,
    Content,
}

fn push_tokens(events: &mut Vec<OutgoingEvent>, text: &str, kind: TokenKind) {
    let tokens = tokenize(text);
    tracing::debug!(?kind, count = tokens.len(), "token(s) queued");
    events.extend(tokens.into_iter().map(|token| {
        tracing::trace!(?kind, token = %printable(token), "token");
        match kind {
            TokenKind::Thinking => OutgoingEvent::Thinking(token.to_string()),
            TokenKind::Content => OutgoingEvent::Content(token.to_string()),
        }
    }));
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{
        aggregate_chunks, chunk_events, stage_events, stage_single, Aggregate, CHAT_FALLBACK,
    };
    use crate::{
        events::OutgoingEvent,
        scenarios::{ChunkDefinition, StageScenario},
        types::ChatMessage,
    };

    fn text_of(events: &[OutgoingEvent], thinking: bool) -> String {
        events
            .iter()
            .filter_map(|event| match event {
                OutgoingEvent::Thinking(text) if thinking => Some(text.as_str()),
                OutgoingEvent::Content(text) if !thinking => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    fn assert_single_trailing_done(events: &[OutgoingEvent]) {
        assert_eq!(events.iter().filter(|event| event.is_done()).count(), 1);
        assert!(events.last().is_some_and(OutgoingEvent::is_done));
    }

    fn tool_scenario() -> StageScenario {
        serde_json::from_value(json!({
            "prompt": "What iphones do we have available?",
            "stages": [
                {
                    "trigger": "user",
                    "thinking": "Check the catalog first.",
                    "response": "shadowed by the tool call",
                    "toolCall": { "name": "list_products", "arguments": { "category": "electronics" } }
                },
                { "trigger": "tool", "toolName": "list_products", "thinking": "Got it.", "response": "Two phones found." },
                { "trigger": "tool", "toolName": "get_product_snapshot" }
            ]
        }))
        .expect("scenario")
    }

    #[test]
    fn chunks_stream_thinking_before_content() {
        let chunks = vec![
            ChunkDefinition {
                thinking: Some("plan it".into()),
                response: Some("done it".into()),
            },
            ChunkDefinition::default(),
            ChunkDefinition::response(" again"),
        ];

        let events = chunk_events(&chunks, true);

        assert_eq!(
            events,
            vec![
                OutgoingEvent::Thinking("plan".into()),
                OutgoingEvent::Thinking(" ".into()),
                OutgoingEvent::Thinking("it".into()),
                OutgoingEvent::Content("done".into()),
                OutgoingEvent::Content(" ".into()),
                OutgoingEvent::Content("it".into()),
                OutgoingEvent::Content(" ".into()),
                OutgoingEvent::Content("again".into()),
                OutgoingEvent::Done,
            ]
        );
    }

    #[test]
    fn thinking_is_dropped_when_disabled() {
        let chunks = vec![ChunkDefinition::thinking("secret"), ChunkDefinition::response("visible")];

        let events = chunk_events(&chunks, false);

        assert!(events.iter().all(|event| !matches!(event, OutgoingEvent::Thinking(_))));
        assert_eq!(text_of(&events, false), "visible");
        assert_single_trailing_done(&events);
    }

    #[test]
    fn empty_scenario_still_finishes() {
        assert_eq!(chunk_events(&[], true), vec![OutgoingEvent::Done]);
    }

    #[test]
    fn fallback_lists_prompts_or_says_none() {
        assert_eq!(
            CHAT_FALLBACK.message(&["One", "Two"]),
            "Sorry, only these chat prompts are supported:\n- One\n- Two"
        );
        assert_eq!(
            CHAT_FALLBACK.message(&[]),
            "Sorry, only these chat prompts are supported: (no chat prompts configured)"
        );

        let events = CHAT_FALLBACK.events(&["One"]);
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], OutgoingEvent::Content(text) if text.ends_with("- One")));
        assert_single_trailing_done(&events);
    }

    #[test]
    fn user_stage_emits_whole_tool_call() {
        let scenario = tool_scenario();
        let messages = vec![ChatMessage::user("What iphones do we have available?")];

        let events = stage_events(&scenario, &messages);

        assert_eq!(events.len(), 2);
        let OutgoingEvent::ToolCall(call) = &events[0] else {
            panic!("expected a tool call, got {:?}", events[0]);
        };
        assert_eq!(call.name, "list_products");
        assert!(call.id.starts_with("toolcall-"));
        assert_eq!(call.arguments.get("category"), Some(&json!("electronics")));
        assert!(events[1].is_done());
    }

    #[test]
    fn stage_thinking_is_never_streamed() {
        let scenario = tool_scenario();
        let first_turn = vec![ChatMessage::user("What iphones do we have available?")];
        let answer_turn = vec![
            ChatMessage::user("What iphones do we have available?"),
            ChatMessage::tool("list_products", "{}"),
        ];

        let first = stage_events(&scenario, &first_turn);
        assert_eq!(first.len(), 2);
        assert!(matches!(&first[0], OutgoingEvent::ToolCall(call) if call.name == "list_products"));

        let answer = stage_events(&scenario, &answer_turn);
        assert_eq!(text_of(&answer, true), "");
        assert_eq!(text_of(&answer, false), "Two phones found.");
        assert_single_trailing_done(&answer);
    }

    #[test]
    fn empty_stage_yields_only_done() {
        let scenario = tool_scenario();
        let messages = vec![
            ChatMessage::user("What iphones do we have available?"),
            ChatMessage::tool("get_product_snapshot", "{}"),
        ];

        assert_eq!(stage_events(&scenario, &messages), vec![OutgoingEvent::Done]);
        assert_eq!(stage_single(&scenario, &messages), None);
    }

    #[test]
    fn unmatched_stage_explains_itself() {
        let scenario = tool_scenario();
        let messages = vec![ChatMessage::user("hi"), ChatMessage::tool("unknown_tool", "{}")];

        let events = stage_events(&scenario, &messages);

        assert_eq!(events.len(), 2);
        assert_eq!(
            text_of(&events, false),
            "This step for prompt \"What iphones do we have available?\" is not configured yet. \
             Please restart the conversation."
        );
    }

    #[test]
    fn single_stage_output_is_whole_and_thinking_free() {
        let scenario = tool_scenario();
        let messages = vec![
            ChatMessage::user("What iphones do we have available?"),
            ChatMessage::tool("list_products", "{}"),
        ];

        assert_eq!(
            stage_single(&scenario, &messages),
            Some(OutgoingEvent::Content("Two phones found.".into()))
        );
    }

    #[test]
    fn aggregation_joins_paragraphs() {
        let chunks = vec![
            ChunkDefinition::thinking("a"),
            ChunkDefinition::response("b"),
            ChunkDefinition::response("c"),
        ];

        assert_eq!(
            aggregate_chunks(&chunks, true),
            Aggregate {
                thinking: Some("a".into()),
                content: Some("b\n\nc".into()),
            }
        );
        assert_eq!(
            aggregate_chunks(&chunks, false),
            Aggregate {
                thinking: None,
                content: Some("b\n\nc".into()),
            }
        );
        assert_eq!(aggregate_chunks(&[], true), Aggregate::default());
    }
}

use std::{path::PathBuf, sync::Arc};

use futures_util::StreamExt;
use ollama_mock::{
    scenarios::{CHAT_DIALOGUE_SCENARIOS_FILE, CHAT_TOOL_SCENARIOS_FILE, GENERATE_SCENARIOS_FILE},
    AppState, ChatMessage, ChatRequest, FlatScenario, MockConfig, MockError, OutgoingEvent,
    ScenarioIndex, StageScenario,
};

fn scenarios_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios")
}

fn state() -> AppState {
    AppState::load(MockConfig::immediate().with_scenarios_dir(scenarios_dir())).expect("state")
}

#[test]
fn bundled_catalogs_parse() {
    let dir = scenarios_dir();

    let generate = ScenarioIndex::<FlatScenario>::load(dir.join(GENERATE_SCENARIOS_FILE)).expect("generate");
    let dialogue =
        ScenarioIndex::<FlatScenario>::load(dir.join(CHAT_DIALOGUE_SCENARIOS_FILE)).expect("dialogue");
    let tools = ScenarioIndex::<StageScenario>::load(dir.join(CHAT_TOOL_SCENARIOS_FILE)).expect("tools");

    assert!(!generate.is_empty());
    assert!(!dialogue.is_empty());
    assert!(!tools.is_empty());
}

#[test]
fn lookup_ignores_case_and_surrounding_whitespace() {
    let index = ScenarioIndex::<FlatScenario>::load(scenarios_dir().join(GENERATE_SCENARIOS_FILE))
        .expect("generate");

    for query in [
        "Summarize the release plan",
        "  SUMMARIZE THE RELEASE PLAN  ",
        "summarize the release plan\n",
        "summarize the plan",
        "",
    ] {
        let normalized = query.trim().to_lowercase();
        assert_eq!(
            index.find_by_prompt(query).map(|s| s.prompt.clone()),
            index.find_by_prompt(&normalized).map(|s| s.prompt.clone()),
            "query {query:?}"
        );
    }
}

#[test]
fn missing_directory_serves_empty_catalogs() {
    let dir = tempfile::tempdir().expect("tempdir");
    let state = AppState::load(MockConfig::immediate().with_scenarios_dir(dir.path())).expect("state");

    let events = state
        .chat_tools
        .events(&ChatRequest::new(vec![ChatMessage::user("anything")]));

    assert_eq!(
        events,
        vec![
            OutgoingEvent::Content(
                "Sorry, only these chat tool prompts are supported: (no tool prompts configured)"
                    .to_string()
            ),
            OutgoingEvent::Done
        ]
    );
}

#[test]
fn malformed_catalog_stops_startup() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join(CHAT_TOOL_SCENARIOS_FILE), "{ \"scenarios\": [").expect("write");

    let result = AppState::load(MockConfig::immediate().with_scenarios_dir(dir.path()));

    assert!(matches!(result, Err(MockError::ScenarioParse { .. })));
}

#[test]
fn iphone_question_starts_with_catalog_lookup() {
    let state = state();
    let request = ChatRequest::new(vec![ChatMessage::user("What iphones do we have available?")]);

    let events = state.chat_tools.events(&request);

    assert_eq!(events.len(), 2);
    assert!(matches!(&events[0], OutgoingEvent::ToolCall(call) if call.name == "list_products"));
    assert_eq!(events[1], OutgoingEvent::Done);
}

#[test]
fn iphone_question_with_thinking_still_opens_with_the_tool_call() {
    let state = state();
    let request =
        ChatRequest::new(vec![ChatMessage::user("What iphones do we have available?")]).with_think(true);

    let events = state.chat_tools.events(&request);

    assert_eq!(events.len(), 2, "events: {events:?}");
    assert!(matches!(&events[0], OutgoingEvent::ToolCall(call) if call.name == "list_products"));
    assert_eq!(events[1], OutgoingEvent::Done);
}

#[test]
fn same_history_selects_same_stage() {
    let state = state();
    let request = ChatRequest::new(vec![
        ChatMessage::user("What iphones do we have available?"),
        ChatMessage::tool("list_products", "{}"),
    ]);

    let names: Vec<String> = (0..3)
        .map(|_| match &state.chat_tools.events(&request)[0] {
            OutgoingEvent::ToolCall(call) => call.name.clone(),
            other => panic!("unexpected event {other:?}"),
        })
        .collect();

    assert_eq!(names, vec!["get_product_snapshot"; 3]);
}

#[tokio::test]
async fn thinking_never_leaks_when_disabled() {
    let state = Arc::new(state());
    let prompts = [
        "Give me a quick status update on the Ollama mock",
        "Tell me a joke about testing",
        "How do I enable thinking?",
    ];

    for prompt in prompts {
        let request = ChatRequest::new(vec![ChatMessage::user(prompt)]).with_think(false);
        let frames: Vec<_> = state.chat.stream(&request).collect().await;

        assert!(frames
            .iter()
            .filter_map(|frame| frame.message.as_ref())
            .all(|message| message.thinking.is_none()));
        assert!(frames.last().is_some_and(|frame| frame.done));
    }
}

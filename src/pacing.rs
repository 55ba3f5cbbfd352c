use std::time::Duration;

use async_stream::stream;

use crate::{
    config::MockConfig,
    events::{EventStream, OutgoingEvent},
};

/// Never reorders or drops events. Dropping the paced stream abandons the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DelayScheduler {
    token_delay: Duration,
    tool_call_delay: Duration,
}

impl DelayScheduler {
    pub fn new(token_delay: Duration, tool_call_delay: Duration) -> Self {
        Self {
            token_delay,
            tool_call_delay,
        }
    }

    pub fn immediate() -> Self {
        Self::default()
    }

    pub fn from_config(config: &MockConfig) -> Self {
        Self::new(config.token_delay(), config.tool_call_delay())
    }

    pub fn delay_for(&self, event: &OutgoingEvent) -> Duration {
        match event {
            OutgoingEvent::Done => Duration::ZERO,
            OutgoingEvent::ToolCall(_) => self.tool_call_delay,
            OutgoingEvent::Thinking(_) | OutgoingEvent::Content(_) => self.token_delay,
        }
    }

    pub fn pace(self, events: Vec<OutgoingEvent>) -> EventStream {
        let scheduler = self;
        Box::pin(stream! {
            for event in events {
                let delay = scheduler.delay_for(&event);
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                yield event;
            }
        })
    }
}

use async_trait::async_trait;

use crate::events::PipelineEvent;

/// Trait for receiving pipeline observation events.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Deliver an event. Must not block coordination; implementations that
    /// forward to slow consumers should enqueue.
    async fn emit(&self, event: PipelineEvent);
}

/// No-op implementation for callers that do not observe events.
pub struct NoOpEventSink;

#[async_trait]
impl EventSink for NoOpEventSink {
    async fn emit(&self, _event: PipelineEvent) {}
}

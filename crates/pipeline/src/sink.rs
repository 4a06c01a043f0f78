//! Channel-backed event delivery.

use async_trait::async_trait;
use tokio::sync::mpsc;

use taskflow_core::traits::EventSink;
use taskflow_core::PipelineEvent;

/// Event sink that forwards into an unbounded channel, giving consumers
/// an ordered queue with explicit delivery semantics.
pub struct ChannelEventSink {
    tx: mpsc::UnboundedSender<PipelineEvent>,
}

impl ChannelEventSink {
    /// Create a sink and the receiver to drain it.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<PipelineEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl EventSink for ChannelEventSink {
    async fn emit(&self, event: PipelineEvent) {
        // A dropped receiver means nobody is observing; events are simply
        // discarded rather than failing the pipeline.
        let _ = self.tx.send(event);
    }
}

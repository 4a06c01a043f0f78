//! Post-coordination collaborator interface.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::CoordinationOutcome;

/// External consumer of successful coordination results (optimization,
/// learning). Dispatched on a detached task: started, never awaited, and a
/// failure here is logged at the dispatch site but never propagated into
/// the coordination result.
#[async_trait]
pub trait Collaborator: Send + Sync {
    /// Name used in dispatch logs.
    fn name(&self) -> &str;

    /// Consume a coordination outcome.
    async fn observe(&self, outcome: Arc<CoordinationOutcome>) -> Result<()>;
}

//! Capability invocation interface.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// Registry of invocable capabilities (tools).
///
/// The executor's `direct` strategy resolves against this. Implementations
/// fail with `Error::CapabilityNotFound` for unknown capability ids and
/// `Error::InvalidParameters` for malformed params.
#[async_trait]
pub trait CapabilityRegistry: Send + Sync {
    /// Invoke a capability by id.
    async fn invoke(&self, capability: &str, params: Value) -> Result<Value>;
}

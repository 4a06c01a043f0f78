//! Detached background work.

use std::future::Future;

use taskflow_core::Result;

/// Spawn a unit of work that is deliberately not awaited.
///
/// The decoupling is the point: the spawning call path can never be
/// failed or delayed by the detached work, and the caller holds no handle
/// to it. Errors are observed and logged here so they are not silently
/// lost.
pub fn detach<F>(name: impl Into<String>, fut: F)
where
    F: Future<Output = Result<()>> + Send + 'static,
{
    let name = name.into();
    tokio::spawn(async move {
        if let Err(e) = fut.await {
            tracing::warn!(task = %name, error = %e, "Detached task failed");
        }
    });
}

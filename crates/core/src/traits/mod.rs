//! Trait interfaces consumed and exposed by the pipeline.
//!
//! Each seam is an object-safe async trait so any implementation satisfying
//! the contract (a hosted model, a local one, a scripted mock) can be
//! plugged in without the pipeline depending on a specific provider.

pub mod capability;
pub mod collaborator;
pub mod events;
pub mod generate;

pub use capability::*;
pub use collaborator::*;
pub use events::*;
pub use generate::*;

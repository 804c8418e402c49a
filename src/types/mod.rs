//! Type definitions for subtrack

mod error;
mod subscription;
mod summary;

pub use error::*;
pub use subscription::*;
pub use summary::*;

/// Display name used when a subscription's provider is not in the snapshot
pub const UNKNOWN_PROVIDER: &str = "Unknown provider";

//! bh-core: stable foundation for Benchmark Health.
//!
//! Contains:
//! - ids (server-assigned model identifiers)
//! - numeric (float helpers shared by metric code)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod numeric;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CoreError, CoreResult};
pub use ids::*;
pub use numeric::*;

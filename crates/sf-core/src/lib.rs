//! sf-core: stable foundation for sigflow.
//!
//! Contains:
//! - ids (dense, never-recycled block ids)
//! - numeric (Real + tolerances + float helpers)
//! - units (uom time/frequency types + constructors)
//! - timing (wall-clock measurement of ticks)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod numeric;
pub mod timing;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CoreError, CoreResult};
pub use ids::*;
pub use numeric::*;
pub use units::*;

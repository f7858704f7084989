//! Linear time-invariant system support for sigflow blocks.
//!
//! Provides:
//! - Transfer function representation with pole/zero access and validation
//! - State-space realization (controllable canonical form)
//! - Continuous-to-discrete conversion of transfer functions
//! - One-interval state-space integration with first-order-hold input
//!
//! Polynomials are stored in descending powers throughout:
//! `[a_n, a_{n-1}, ..., a_0]` represents `a_n s^n + ... + a_0`.

pub mod discretize;
pub mod error;
pub mod integrate;
pub mod poly;
pub mod ss;
pub mod tf;

pub use discretize::{DiscreteTf, Method, discretize};
pub use error::{LtiError, LtiResult};
pub use integrate::{FohStepper, StepOutput};
pub use ss::StateSpace;
pub use tf::TransferFunction;

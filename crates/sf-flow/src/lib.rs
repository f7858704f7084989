//! sf-flow: block-diagram signal flow.
//!
//! A [`System`] is a graph of blocks wired output port to input port, with
//! declared input and output ports of its own. Each call to [`System::run`]
//! is one tick: values enter at the system inputs, propagate breadth-first
//! through the blocks, and land on the system outputs.
//!
//! Feedback is allowed. An edge that reaches a block already visited in the
//! current tick is delivered on the next tick instead.
//!
//! # Blocks
//!
//! - [`Identity`]: pass-through
//! - [`MatrixBlock`]: `y = M u`
//! - [`Junction`]: signed sum, `"+-"` computes `u0 - u1`
//! - [`Filter`]: digital IIR filter from a continuous transfer function
//! - [`Lti`]: continuous state-space system sampled at a fixed interval
//! - [`System`]: a whole system used as one block
//!
//! # Example
//!
//! ```
//! use sf_flow::{Junction, Node, System, scalars};
//!
//! let mut sys = System::new(1, 1);
//! let j = sys.add_block(Junction::new("+-").unwrap());
//! sys.add_edge(Node::Input, 0, j, 0).unwrap();
//! sys.add_edge(j, 0, j, 1).unwrap();
//! sys.add_edge(j, 0, Node::Output, 0).unwrap();
//!
//! assert_eq!(sys.run(&scalars(&[1.0])).unwrap(), Some(scalars(&[1.0])));
//! assert_eq!(sys.run(&scalars(&[1.0])).unwrap(), Some(scalars(&[0.0])));
//! ```

pub mod block;
pub mod error;
pub mod filter;
pub mod junction;
pub mod lti;
pub mod matrix;
pub mod sampled;
pub mod scheduler;
pub mod signal;
pub mod system;

pub use block::{Block, BlockKind, Identity, SignalProcessor};
pub use error::{FlowError, FlowResult};
pub use filter::Filter;
pub use junction::Junction;
pub use lti::Lti;
pub use matrix::MatrixBlock;
pub use sampled::{SampleClock, SampleConfig};
pub use signal::{Signal, scalars, zeros};
pub use system::{Edge, Node, OutputHold, System, SystemOptions};

pub use sf_core::BlockId;
pub use sf_lti::{Method, TransferFunction};

//! Block contract and the closed set of block kinds.
//!
//! Every block has fixed input and output port counts (which may change when
//! its configuration changes), holds its current input, and computes its
//! output from that input and any private state.
//!
//! - **Stateless**: identity, matrix, junction
//! - **Stateful**: filter, LTI (state advances on every input assignment)
//! - **Composite**: a whole system used as one block

use crate::error::{FlowError, FlowResult};
use crate::filter::Filter;
use crate::junction::Junction;
use crate::lti::Lti;
use crate::matrix::MatrixBlock;
use crate::signal::Signal;
use crate::system::System;

/// Capability contract shared by every block kind.
pub trait SignalProcessor {
    /// Number of input ports.
    fn num_inputs(&self) -> usize;

    /// Number of output ports.
    fn num_outputs(&self) -> usize;

    /// Assign the input, one signal per input port.
    ///
    /// Stateful blocks advance their internal state here, so this must be
    /// called once per sample.
    fn set_input(&mut self, inputs: &[Signal]) -> FlowResult<()>;

    /// Output for the current input and state, one signal per output port.
    ///
    /// Never changes state; reading twice gives the same result.
    fn output(&self) -> FlowResult<Vec<Signal>>;

    /// Return private state to its initial value.
    fn reset(&mut self) {}

    /// Assign the input and read the output.
    fn call(&mut self, inputs: &[Signal]) -> FlowResult<Vec<Signal>> {
        self.set_input(inputs)?;
        self.output()
    }
}

/// Check the number of supplied port values against a port count.
pub(crate) fn expect_ports(what: &'static str, expected: usize, inputs: &[Signal]) -> FlowResult<()> {
    if inputs.len() != expected {
        return Err(FlowError::ShapeMismatch {
            what,
            expected,
            actual: inputs.len(),
        });
    }
    Ok(())
}

/// Pass-through block: output equals input.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Identity {
    input: Signal,
}

impl SignalProcessor for Identity {
    fn num_inputs(&self) -> usize {
        1
    }

    fn num_outputs(&self) -> usize {
        1
    }

    fn set_input(&mut self, inputs: &[Signal]) -> FlowResult<()> {
        expect_ports("identity input ports", 1, inputs)?;
        self.input = inputs[0].clone();
        Ok(())
    }

    fn output(&self) -> FlowResult<Vec<Signal>> {
        Ok(vec![self.input.clone()])
    }

    fn reset(&mut self) {
        self.input = Signal::zero();
    }
}

/// Block kind defines the transfer law and its parameters.
#[derive(Debug, Clone)]
pub enum BlockKind {
    /// Output equals input.
    Identity(Identity),
    /// Linear map `y = M u`.
    Matrix(MatrixBlock),
    /// Signed sum of inputs.
    Junction(Junction),
    /// Digital IIR filter from a continuous transfer function.
    Filter(Filter),
    /// Sampled continuous state-space system.
    Lti(Lti),
    /// Nested system.
    System(Box<System>),
}

/// A block: a transfer law plus an optional human-readable label.
#[derive(Debug, Clone)]
pub struct Block {
    /// Label for display.
    pub label: Option<String>,
    /// Block type and configuration.
    pub kind: BlockKind,
}

impl Block {
    /// Create a new unlabeled block.
    pub fn new(kind: BlockKind) -> Self {
        Self { label: None, kind }
    }

    /// Attach a label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn identity() -> Self {
        Self::new(BlockKind::Identity(Identity::default()))
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Name of the block kind, as shown in system summaries.
    pub fn type_name(&self) -> &'static str {
        match &self.kind {
            BlockKind::Identity(_) => "Identity",
            BlockKind::Matrix(_) => "Matrix",
            BlockKind::Junction(_) => "Junction",
            BlockKind::Filter(_) => "Filter",
            BlockKind::Lti(_) => "LTI",
            BlockKind::System(_) => "System",
        }
    }

    pub fn as_matrix_mut(&mut self) -> Option<&mut MatrixBlock> {
        match &mut self.kind {
            BlockKind::Matrix(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_junction_mut(&mut self) -> Option<&mut Junction> {
        match &mut self.kind {
            BlockKind::Junction(j) => Some(j),
            _ => None,
        }
    }

    pub fn as_filter_mut(&mut self) -> Option<&mut Filter> {
        match &mut self.kind {
            BlockKind::Filter(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_lti_mut(&mut self) -> Option<&mut Lti> {
        match &mut self.kind {
            BlockKind::Lti(l) => Some(l),
            _ => None,
        }
    }

    fn processor(&self) -> &dyn SignalProcessor {
        match &self.kind {
            BlockKind::Identity(b) => b,
            BlockKind::Matrix(b) => b,
            BlockKind::Junction(b) => b,
            BlockKind::Filter(b) => b,
            BlockKind::Lti(b) => b,
            BlockKind::System(b) => &**b,
        }
    }

    fn processor_mut(&mut self) -> &mut dyn SignalProcessor {
        match &mut self.kind {
            BlockKind::Identity(b) => b,
            BlockKind::Matrix(b) => b,
            BlockKind::Junction(b) => b,
            BlockKind::Filter(b) => b,
            BlockKind::Lti(b) => b,
            BlockKind::System(b) => &mut **b,
        }
    }
}

impl SignalProcessor for Block {
    fn num_inputs(&self) -> usize {
        self.processor().num_inputs()
    }

    fn num_outputs(&self) -> usize {
        self.processor().num_outputs()
    }

    fn set_input(&mut self, inputs: &[Signal]) -> FlowResult<()> {
        self.processor_mut().set_input(inputs)
    }

    fn output(&self) -> FlowResult<Vec<Signal>> {
        self.processor().output()
    }

    fn reset(&mut self) {
        self.processor_mut().reset()
    }
}

impl From<MatrixBlock> for Block {
    fn from(b: MatrixBlock) -> Self {
        Self::new(BlockKind::Matrix(b))
    }
}

impl From<Junction> for Block {
    fn from(b: Junction) -> Self {
        Self::new(BlockKind::Junction(b))
    }
}

impl From<Filter> for Block {
    fn from(b: Filter) -> Self {
        Self::new(BlockKind::Filter(b))
    }
}

impl From<Lti> for Block {
    fn from(b: Lti) -> Self {
        Self::new(BlockKind::Lti(b))
    }
}

impl From<System> for Block {
    fn from(b: System) -> Self {
        Self::new(BlockKind::System(Box::new(b)))
    }
}

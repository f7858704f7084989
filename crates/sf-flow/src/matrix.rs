//! Matrix block: `y = M u`.

use nalgebra::DMatrix;

use crate::block::{SignalProcessor, expect_ports};
use crate::error::{FlowError, FlowResult};
use crate::signal::{self, Signal};

/// Linear map from input ports to output ports.
///
/// `num_inputs` is the column count of `M` and `num_outputs` its row count.
/// When ports carry vectors, each column of the stacked input is mapped
/// independently.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MatrixBlock {
    matrix: Option<DMatrix<f64>>,
    input: Vec<Signal>,
}

impl MatrixBlock {
    /// Create a matrix block.
    ///
    /// # Errors
    ///
    /// Returns an error if the matrix has no rows or no columns.
    pub fn new(matrix: DMatrix<f64>) -> FlowResult<Self> {
        let mut block = Self::unset();
        block.set_matrix(matrix)?;
        Ok(block)
    }

    /// Build from row slices.
    ///
    /// # Errors
    ///
    /// Returns an error if the rows are ragged or empty.
    pub fn from_rows(rows: &[Vec<f64>]) -> FlowResult<Self> {
        let ncols = rows.first().map_or(0, Vec::len);
        if let Some(bad) = rows.iter().find(|r| r.len() != ncols) {
            return Err(FlowError::ShapeMismatch {
                what: "matrix row length",
                expected: ncols,
                actual: bad.len(),
            });
        }
        Self::new(DMatrix::from_fn(rows.len(), ncols, |r, c| rows[r][c]))
    }

    /// A matrix block with no coefficients yet.
    pub fn unset() -> Self {
        Self::default()
    }

    /// The coefficient matrix.
    ///
    /// # Errors
    ///
    /// Returns `Unconfigured` if no matrix has been set.
    pub fn matrix(&self) -> FlowResult<&DMatrix<f64>> {
        self.matrix.as_ref().ok_or(FlowError::Unconfigured {
            what: "matrix block has no coefficients",
        })
    }

    /// Replace the coefficients. Port counts follow the new shape.
    pub fn set_matrix(&mut self, matrix: DMatrix<f64>) -> FlowResult<()> {
        if matrix.nrows() == 0 || matrix.ncols() == 0 {
            return Err(FlowError::ShapeMismatch {
                what: "matrix must have at least one row and one column",
                expected: 1,
                actual: 0,
            });
        }
        if self.input.is_empty() {
            self.input = signal::zeros(matrix.ncols());
        }
        self.matrix = Some(matrix);
        Ok(())
    }

    pub fn input(&self) -> &[Signal] {
        &self.input
    }
}

impl SignalProcessor for MatrixBlock {
    fn num_inputs(&self) -> usize {
        self.matrix.as_ref().map_or(0, DMatrix::ncols)
    }

    fn num_outputs(&self) -> usize {
        self.matrix.as_ref().map_or(0, DMatrix::nrows)
    }

    fn set_input(&mut self, inputs: &[Signal]) -> FlowResult<()> {
        expect_ports("matrix input ports", self.num_inputs(), inputs)?;
        self.input = inputs.to_vec();
        Ok(())
    }

    fn output(&self) -> FlowResult<Vec<Signal>> {
        let m = self.matrix()?;
        expect_ports("matrix input ports", m.ncols(), &self.input)?;
        let (u, vector) = signal::stack(&self.input)?;
        Ok(signal::unstack(&(m * u), vector))
    }

    fn reset(&mut self) {
        self.input = signal::zeros(self.num_inputs());
    }
}

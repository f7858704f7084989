//! Signal values carried by ports.

use nalgebra::{DMatrix, DVector};

use crate::error::{FlowError, FlowResult};

/// Value on one port during one tick.
///
/// A port carries either a scalar or a vector of samples. When several ports
/// meet at one block, scalars broadcast against vectors.
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    /// Scalar floating-point signal.
    Scalar(f64),
    /// Vector-valued signal.
    Vector(DVector<f64>),
}

impl Signal {
    /// Create a scalar signal.
    pub fn scalar(value: f64) -> Self {
        Self::Scalar(value)
    }

    /// Create a vector signal.
    pub fn vector(values: &[f64]) -> Self {
        Self::Vector(DVector::from_column_slice(values))
    }

    /// Zero scalar, the contents of a port nobody has written yet.
    pub fn zero() -> Self {
        Self::Scalar(0.0)
    }

    /// Get the scalar value, if scalar.
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Self::Scalar(v) => Some(*v),
            Self::Vector(_) => None,
        }
    }

    /// Vector length, `None` for scalars.
    pub fn width(&self) -> Option<usize> {
        match self {
            Self::Scalar(_) => None,
            Self::Vector(v) => Some(v.len()),
        }
    }

    /// Element `i`, broadcasting scalars.
    pub fn at(&self, i: usize) -> f64 {
        match self {
            Self::Scalar(v) => *v,
            Self::Vector(v) => v[i],
        }
    }

    /// Samples as a plain vector (a scalar gives one element).
    pub fn to_vec(&self) -> Vec<f64> {
        match self {
            Self::Scalar(v) => vec![*v],
            Self::Vector(v) => v.iter().copied().collect(),
        }
    }
}

impl From<f64> for Signal {
    fn from(value: f64) -> Self {
        Self::Scalar(value)
    }
}

impl From<Vec<f64>> for Signal {
    fn from(values: Vec<f64>) -> Self {
        Self::Vector(DVector::from_vec(values))
    }
}

impl From<DVector<f64>> for Signal {
    fn from(values: DVector<f64>) -> Self {
        Self::Vector(values)
    }
}

impl Default for Signal {
    fn default() -> Self {
        Self::zero()
    }
}

/// One scalar signal per value.
pub fn scalars(values: &[f64]) -> Vec<Signal> {
    values.iter().copied().map(Signal::Scalar).collect()
}

/// `n` zero scalars.
pub fn zeros(n: usize) -> Vec<Signal> {
    vec![Signal::zero(); n]
}

/// Align per-port signals into one `ports x width` matrix.
///
/// Scalars broadcast along the row. All vectors must share one length.
/// Returns the matrix and whether any port carried a vector.
pub fn stack(ports: &[Signal]) -> FlowResult<(DMatrix<f64>, bool)> {
    let mut width: Option<usize> = None;
    for w in ports.iter().filter_map(Signal::width) {
        match width {
            None => width = Some(w),
            Some(expected) if expected != w => {
                return Err(FlowError::ShapeMismatch {
                    what: "vector signal length",
                    expected,
                    actual: w,
                });
            }
            Some(_) => {}
        }
    }
    let vector = width.is_some();
    let cols = width.unwrap_or(1);
    let m = DMatrix::from_fn(ports.len(), cols, |r, c| ports[r].at(c));
    Ok((m, vector))
}

/// Split the rows of `m` back into per-port signals.
pub fn unstack(m: &DMatrix<f64>, vector: bool) -> Vec<Signal> {
    m.row_iter()
        .map(|row| {
            if vector {
                Signal::Vector(row.transpose())
            } else {
                Signal::Scalar(row[0])
            }
        })
        .collect()
}

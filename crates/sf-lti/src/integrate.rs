//! One-interval integration of a state-space system.
//!
//! The input is linearly interpolated between the two samples bounding the
//! interval (first-order hold). Over `[0, T]` the exact solution is
//!
//! ```text
//! x(T) = Ad x(0) + Bd0 u(0) + Bd1 u(T)
//! ```
//!
//! where the three matrices come from the exponential of the augmented matrix
//!
//! ```text
//! M = [A T  B T  0]
//!     [ 0    0   1]
//!     [ 0    0   0]
//! ```
//!
//! `Ad = e^M[0..n, 0..n]`, `Bd1 = e^M[0..n, n+1]`, `Bd0 = e^M[0..n, n] - Bd1`.

use nalgebra::{DMatrix, DVector};

use crate::error::{LtiError, LtiResult};
use crate::ss::StateSpace;

/// Result of advancing one sample interval.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutput {
    /// Output at the end of the interval.
    pub y: f64,
    /// State at the end of the interval.
    pub x: DVector<f64>,
}

/// Precomputed first-order-hold propagator for a fixed interval.
#[derive(Debug, Clone, PartialEq)]
pub struct FohStepper {
    ss: StateSpace,
    dt: f64,
    ad: DMatrix<f64>,
    bd0: DVector<f64>,
    bd1: DVector<f64>,
}

impl FohStepper {
    /// Build the propagator for `ss` over an interval of `dt` seconds.
    pub fn new(ss: StateSpace, dt: f64) -> LtiResult<Self> {
        let dt = sf_core::ensure_positive(dt, "sample interval")?;
        let n = ss.order();

        let mut m = DMatrix::<f64>::zeros(n + 2, n + 2);
        m.view_mut((0, 0), (n, n)).copy_from(&(&ss.a * dt));
        m.view_mut((0, n), (n, 1)).copy_from(&(&ss.b * dt));
        m[(n, n + 1)] = 1.0;
        let em = m.exp();

        let ad = em.view((0, 0), (n, n)).into_owned();
        let bd1: DVector<f64> = em.view((0, n + 1), (n, 1)).column(0).into_owned();
        let bd0: DVector<f64> = em.view((0, n), (n, 1)).column(0).into_owned() - &bd1;

        Ok(Self {
            ss,
            dt,
            ad,
            bd0,
            bd1,
        })
    }

    pub fn state_space(&self) -> &StateSpace {
        &self.ss
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Number of states.
    pub fn order(&self) -> usize {
        self.ss.order()
    }

    /// Advance from `x0` with input samples `u = [u(0), u(T)]`.
    pub fn step(&self, x0: &DVector<f64>, u: [f64; 2]) -> LtiResult<StepOutput> {
        if x0.len() != self.order() {
            return Err(LtiError::DimensionMismatch {
                what: "initial state",
                expected: self.order(),
                actual: x0.len(),
            });
        }
        let x = &self.ad * x0 + &self.bd0 * u[0] + &self.bd1 * u[1];
        let y = self.ss.output(&x, u[1]);
        Ok(StepOutput { y, x })
    }
}

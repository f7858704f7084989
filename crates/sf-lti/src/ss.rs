//! State-space realization of SISO transfer functions.

use nalgebra::{DMatrix, DVector};

use crate::error::{LtiError, LtiResult};
use crate::poly;
use crate::tf::TransferFunction;

/// `dx/dt = A x + B u`, `y = C x + D u` with one input and one output.
#[derive(Debug, Clone, PartialEq)]
pub struct StateSpace {
    pub a: DMatrix<f64>,
    pub b: DVector<f64>,
    pub c: DVector<f64>,
    pub d: f64,
}

impl StateSpace {
    /// Controllable canonical form of a proper transfer function.
    ///
    /// With the denominator normalized to `s^n + a_1 s^{n-1} + ... + a_n` and
    /// the numerator padded to `b_0 s^n + ... + b_n`:
    ///
    /// ```text
    /// A = [-a_1 -a_2 ... -a_n]     B = [1 0 ... 0]^T
    ///     [  1    0  ...   0 ]
    ///     [  0    1  ...   0 ]
    /// C = [b_1 - b_0 a_1, ..., b_n - b_0 a_n]     D = b_0
    /// ```
    pub fn from_tf(tf: &TransferFunction) -> LtiResult<Self> {
        let zeros = poly::degree(tf.num()).unwrap_or(0);
        let n = tf.order();
        if zeros > n {
            return Err(LtiError::Improper { zeros, poles: n });
        }
        let (num, den) = tf.normalized();
        let d = num[0];

        let mut a = DMatrix::<f64>::zeros(n, n);
        for j in 0..n {
            a[(0, j)] = -den[j + 1];
        }
        for i in 1..n {
            a[(i, i - 1)] = 1.0;
        }

        let mut b = DVector::<f64>::zeros(n);
        if n > 0 {
            b[0] = 1.0;
        }

        let c = DVector::from_iterator(n, (0..n).map(|j| num[j + 1] - d * den[j + 1]));

        Ok(Self { a, b, c, d })
    }

    /// Number of states.
    pub fn order(&self) -> usize {
        self.a.nrows()
    }

    /// Output for a given state and input.
    pub fn output(&self, x: &DVector<f64>, u: f64) -> f64 {
        self.c.dot(x) + self.d * u
    }
}

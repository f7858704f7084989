use crate::CoreError;

/// Floating point type used throughout the system
pub type Real = f64;

/// One tolerance for everything
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, CoreError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

/// Finite and strictly greater than zero (sample periods, frequencies).
pub fn ensure_positive(v: Real, what: &'static str) -> Result<Real, CoreError> {
    let v = ensure_finite(v, what)?;
    if v > 0.0 {
        Ok(v)
    } else {
        Err(CoreError::NonPositive { what, value: v })
    }
}

/// Dot product accumulated left to right.
///
/// The summation order is fixed so that two callers evaluating the same
/// difference equation get bit-identical results.
pub fn dot(a: &[Real], b: &[Real]) -> Real {
    a.iter().zip(b).fold(0.0, |acc, (x, y)| acc + x * y)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn nearly_equal_is_symmetric(a in -1e6_f64..1e6, b in -1e6_f64..1e6) {
            let tol = Tolerances::default();
            prop_assert_eq!(nearly_equal(a, b, tol), nearly_equal(b, a, tol));
        }

        #[test]
        fn dot_with_ones_is_a_left_fold(v in prop::collection::vec(-1e3_f64..1e3, 0..16)) {
            let ones = vec![1.0; v.len()];
            let sum = v.iter().fold(0.0, |acc, x| acc + x);
            prop_assert_eq!(dot(&v, &ones).to_bits(), sum.to_bits());
        }
    }
}

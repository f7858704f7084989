//! Continuous-time SISO transfer functions.

use std::fmt;

use nalgebra::Complex;

use crate::error::{LtiError, LtiResult};
use crate::poly;
use crate::ss::StateSpace;

/// `H(s) = num(s) / den(s)` with coefficients in descending powers of `s`.
///
/// Leading zeros are stripped on construction, so `num()` and `den()` always
/// start with a nonzero coefficient (except for the zero numerator, which is
/// stored as `[0.0]`).
#[derive(Debug, Clone, PartialEq)]
pub struct TransferFunction {
    num: Vec<f64>,
    den: Vec<f64>,
}

impl TransferFunction {
    /// Create a transfer function from numerator and denominator coefficients.
    ///
    /// # Errors
    ///
    /// Returns an error if the denominator is empty or all zeros, or if any
    /// coefficient is non-finite.
    pub fn new(num: &[f64], den: &[f64]) -> LtiResult<Self> {
        for c in num.iter().chain(den) {
            sf_core::ensure_finite(*c, "transfer function coefficient")?;
        }
        let den = poly::trim(den);
        if den.is_empty() {
            return Err(LtiError::DegenerateDenominator {
                what: "denominator is empty or all zeros",
            });
        }
        let num = poly::trim(num);
        let num = if num.is_empty() { vec![0.0] } else { num.to_vec() };
        Ok(Self {
            num,
            den: den.to_vec(),
        })
    }

    /// Static gain `k`.
    pub fn gain(k: f64) -> LtiResult<Self> {
        Self::new(&[k], &[1.0])
    }

    pub fn num(&self) -> &[f64] {
        &self.num
    }

    pub fn den(&self) -> &[f64] {
        &self.den
    }

    /// Number of poles (denominator degree).
    pub fn order(&self) -> usize {
        self.den.len() - 1
    }

    pub fn poles(&self) -> Vec<Complex<f64>> {
        poly::roots(&self.den)
    }

    pub fn zeros(&self) -> Vec<Complex<f64>> {
        poly::roots(&self.num)
    }

    /// At most as many zeros as poles.
    pub fn is_proper(&self) -> bool {
        poly::degree(&self.num).unwrap_or(0) <= self.order()
    }

    /// Every pole strictly in the open left half plane.
    pub fn is_stable(&self) -> bool {
        self.poles().iter().all(|p| p.re < 0.0)
    }

    /// Check that the transfer function is proper and stable.
    ///
    /// Blocks that sample a continuous system refuse anything else.
    pub fn validate(&self) -> LtiResult<()> {
        let zeros = poly::degree(&self.num).unwrap_or(0);
        let poles = self.order();
        if zeros > poles {
            return Err(LtiError::Improper { zeros, poles });
        }
        if let Some(p) = self.poles().into_iter().find(|p| p.re >= 0.0) {
            return Err(LtiError::Unstable { re: p.re, im: p.im });
        }
        Ok(())
    }

    /// Numerator padded to the denominator length, both normalized so the
    /// leading denominator coefficient is one.
    pub fn normalized(&self) -> (Vec<f64>, Vec<f64>) {
        let lead = self.den[0];
        let den: Vec<f64> = self.den.iter().map(|c| c / lead).collect();
        let num: Vec<f64> = poly::pad(&self.num, den.len())
            .iter()
            .map(|c| c / lead)
            .collect();
        (num, den)
    }

    /// Equivalent state-space realization.
    ///
    /// # Errors
    ///
    /// Returns an error if the transfer function is improper.
    pub fn to_state_space(&self) -> LtiResult<StateSpace> {
        StateSpace::from_tf(self)
    }
}

impl fmt::Display for TransferFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", render(&self.num))?;
        write!(f, " / ")?;
        write!(f, "{}", render(&self.den))
    }
}

fn render(p: &[f64]) -> String {
    let n = p.len().saturating_sub(1);
    let terms: Vec<String> = p
        .iter()
        .enumerate()
        .filter(|(_, c)| **c != 0.0)
        .map(|(i, c)| match n - i {
            0 => format!("{c}"),
            1 => format!("{c} s"),
            k => format!("{c} s^{k}"),
        })
        .collect();
    if terms.is_empty() {
        "0".to_string()
    } else {
        format!("({})", terms.join(" + "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_zeros_are_stripped() {
        let tf = TransferFunction::new(&[0.0, 1.0], &[0.0, 1.0, 2.0]).unwrap();
        assert_eq!(tf.num(), &[1.0]);
        assert_eq!(tf.den(), &[1.0, 2.0]);
        assert_eq!(tf.order(), 1);
    }

    #[test]
    fn empty_denominator_rejected() {
        assert!(matches!(
            TransferFunction::new(&[1.0], &[0.0, 0.0]),
            Err(LtiError::DegenerateDenominator { .. })
        ));
        assert!(TransferFunction::new(&[1.0], &[]).is_err());
    }

    #[test]
    fn non_finite_rejected() {
        assert!(matches!(
            TransferFunction::new(&[f64::NAN], &[1.0]),
            Err(LtiError::InvalidArg(_))
        ));
    }

    #[test]
    fn improper_is_detected() {
        // H(s) = s
        let tf = TransferFunction::new(&[1.0, 0.0], &[1.0]).unwrap();
        assert!(!tf.is_proper());
        assert_eq!(
            tf.validate(),
            Err(LtiError::Improper { zeros: 1, poles: 0 })
        );
    }

    #[test]
    fn unstable_is_detected() {
        // H(s) = 1 / (s - 1)
        let tf = TransferFunction::new(&[1.0], &[1.0, -1.0]).unwrap();
        assert!(tf.is_proper());
        assert!(!tf.is_stable());
        assert!(matches!(tf.validate(), Err(LtiError::Unstable { .. })));
    }

    #[test]
    fn marginal_pole_is_unstable() {
        // H(s) = 1 / s
        let tf = TransferFunction::new(&[1.0], &[1.0, 0.0]).unwrap();
        assert!(matches!(tf.validate(), Err(LtiError::Unstable { .. })));
    }

    #[test]
    fn third_order_example_is_valid() {
        // (s^2 + 2s + 1) / (s^3 + 5s^2 + 5s + 10)
        let tf = TransferFunction::new(&[1.0, 2.0, 1.0], &[1.0, 5.0, 5.0, 10.0]).unwrap();
        assert_eq!(tf.poles().len(), 3);
        assert_eq!(tf.zeros().len(), 2);
        tf.validate().unwrap();
    }

    #[test]
    fn normalized_pads_numerator() {
        let tf = TransferFunction::new(&[2.0], &[2.0, 4.0]).unwrap();
        let (num, den) = tf.normalized();
        assert_eq!(num, vec![0.0, 1.0]);
        assert_eq!(den, vec![1.0, 2.0]);
    }

    #[test]
    fn display_renders_polynomials() {
        let tf = TransferFunction::new(&[1.0], &[1.0, 2.0]).unwrap();
        assert_eq!(tf.to_string(), "(1) / (1 s + 2)");
    }
}

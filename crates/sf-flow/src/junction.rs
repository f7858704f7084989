//! Summing junction: a one-row matrix of +1/-1 coefficients.

use nalgebra::DMatrix;

use crate::block::SignalProcessor;
use crate::error::{FlowError, FlowResult};
use crate::matrix::MatrixBlock;
use crate::signal::Signal;

/// Signed sum of inputs, one sign per input port.
///
/// `Junction::new("+-")` computes `u0 - u1`.
#[derive(Debug, Clone, PartialEq)]
pub struct Junction {
    signs: String,
    matrix: MatrixBlock,
}

impl Junction {
    /// Create a junction from a sign string.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSign` if the string is empty or contains anything
    /// other than `+` and `-`.
    pub fn new(signs: &str) -> FlowResult<Self> {
        let matrix = MatrixBlock::new(sign_row(signs)?)?;
        Ok(Self {
            signs: signs.to_string(),
            matrix,
        })
    }

    pub fn signs(&self) -> &str {
        &self.signs
    }

    /// Replace the signs. The number of inputs becomes `signs.len()`.
    ///
    /// On error the junction is left unchanged.
    pub fn set_signs(&mut self, signs: &str) -> FlowResult<()> {
        self.matrix.set_matrix(sign_row(signs)?)?;
        self.signs = signs.to_string();
        Ok(())
    }

    /// The equivalent coefficient matrix.
    pub fn matrix(&self) -> FlowResult<&DMatrix<f64>> {
        self.matrix.matrix()
    }
}

impl Default for Junction {
    fn default() -> Self {
        let matrix = MatrixBlock::new(DMatrix::from_element(1, 2, 1.0))
            .unwrap_or_else(|_| MatrixBlock::unset());
        Self {
            signs: "++".to_string(),
            matrix,
        }
    }
}

fn sign_row(signs: &str) -> FlowResult<DMatrix<f64>> {
    let invalid = || FlowError::InvalidSign {
        signs: signs.to_string(),
    };
    if signs.is_empty() {
        return Err(invalid());
    }
    let coeffs = signs
        .chars()
        .map(|c| match c {
            '+' => Ok(1.0),
            '-' => Ok(-1.0),
            _ => Err(invalid()),
        })
        .collect::<FlowResult<Vec<f64>>>()?;
    Ok(DMatrix::from_row_slice(1, coeffs.len(), &coeffs))
}

impl SignalProcessor for Junction {
    fn num_inputs(&self) -> usize {
        self.matrix.num_inputs()
    }

    fn num_outputs(&self) -> usize {
        1
    }

    fn set_input(&mut self, inputs: &[Signal]) -> FlowResult<()> {
        self.matrix.set_input(inputs)
    }

    fn output(&self) -> FlowResult<Vec<Signal>> {
        self.matrix.output()
    }

    fn reset(&mut self) {
        self.matrix.reset()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::scalars;
    use proptest::prelude::*;

    #[test]
    fn default_is_plus_plus() {
        let j = Junction::default();
        assert_eq!(j.signs(), "++");
        assert_eq!(j.num_inputs(), 2);
    }

    #[test]
    fn invalid_sign_rejected() {
        let mut j = Junction::default();
        assert!(matches!(
            j.set_signs("+-a+"),
            Err(FlowError::InvalidSign { .. })
        ));
        assert_eq!(j.signs(), "++");
        assert!(matches!(Junction::new(""), Err(FlowError::InvalidSign { .. })));
    }

    #[test]
    fn input_count_follows_signs() {
        let mut j = Junction::new("+--+").unwrap();
        assert_eq!(j.num_inputs(), 4);
        assert_eq!(j.num_outputs(), 1);
        assert!(matches!(
            j.set_input(&scalars(&[1.0, 2.0, 3.0])),
            Err(FlowError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn signed_sum() {
        let mut j = Junction::new("+--+").unwrap();
        let out = j.call(&scalars(&[0.5, 0.25, 0.125, 1.0])).unwrap();
        assert_eq!(out, scalars(&[0.5 - 0.25 - 0.125 + 1.0]));
    }

    #[test]
    fn equivalent_matrix() {
        let j = Junction::new("+-").unwrap();
        let m = j.matrix().unwrap();
        assert_eq!(m.shape(), (1, 2));
        assert_eq!(m[(0, 0)], 1.0);
        assert_eq!(m[(0, 1)], -1.0);
    }

    proptest! {
        #[test]
        fn output_is_signed_sum(
            (signs, input) in prop::collection::vec(any::<bool>(), 1..8).prop_flat_map(|s| {
                let n = s.len();
                (Just(s), prop::collection::vec(-100.0_f64..100.0, n))
            })
        ) {
            let sign_str: String = signs.iter().map(|p| if *p { '+' } else { '-' }).collect();
            let mut j = Junction::new(&sign_str).unwrap();
            let out = j.call(&scalars(&input)).unwrap();
            let expected: f64 = signs
                .iter()
                .zip(&input)
                .map(|(p, v)| if *p { *v } else { -*v })
                .sum();
            let got = out[0].as_scalar().unwrap();
            prop_assert!((got - expected).abs() <= 1e-9 * (1.0 + expected.abs()));
        }
    }
}

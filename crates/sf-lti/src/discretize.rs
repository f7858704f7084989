//! Continuous-to-discrete conversion of transfer functions.
//!
//! Every supported method is a member of the generalized bilinear family:
//!
//! ```text
//! s = (z - 1) / (T (alpha z + 1 - alpha))
//! ```
//!
//! with `alpha = 0` (forward Euler), `alpha = 1/2` (bilinear/Tustin) and
//! `alpha = 1` (backward difference). Substituting into `N(s)/D(s)` of order
//! `n` and clearing `(alpha z + 1 - alpha)^n` gives polynomials in `z`.

use std::fmt;
use std::str::FromStr;

use crate::error::{LtiError, LtiResult};
use crate::poly;
use crate::tf::TransferFunction;

/// Discretization method.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Method {
    /// Tustin's method, `alpha = 0.5`.
    #[default]
    Bilinear,
    /// Forward Euler, `alpha = 0`.
    Euler,
    /// Backward difference, `alpha = 1`.
    BackwardDiff,
    /// Generalized bilinear transform with `0 <= alpha <= 1`.
    Gbt { alpha: f64 },
}

impl Method {
    pub fn alpha(&self) -> f64 {
        match self {
            Method::Bilinear => 0.5,
            Method::Euler => 0.0,
            Method::BackwardDiff => 1.0,
            Method::Gbt { alpha } => *alpha,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Bilinear => write!(f, "bilinear"),
            Method::Euler => write!(f, "euler"),
            Method::BackwardDiff => write!(f, "backward_diff"),
            Method::Gbt { alpha } => write!(f, "gbt:{alpha}"),
        }
    }
}

impl FromStr for Method {
    type Err = LtiError;

    /// Accepts `bilinear`, `tustin`, `euler`, `forward_diff`,
    /// `backward_diff`, and `gbt:<alpha>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unsupported = || LtiError::UnsupportedMethod {
            name: s.to_string(),
        };
        match s.trim().to_ascii_lowercase().as_str() {
            "bilinear" | "tustin" => Ok(Method::Bilinear),
            "euler" | "forward_diff" => Ok(Method::Euler),
            "backward_diff" => Ok(Method::BackwardDiff),
            other => {
                let alpha = other
                    .strip_prefix("gbt:")
                    .and_then(|a| a.parse::<f64>().ok())
                    .ok_or_else(unsupported)?;
                if (0.0..=1.0).contains(&alpha) {
                    Ok(Method::Gbt { alpha })
                } else {
                    Err(unsupported())
                }
            }
        }
    }
}

/// Discrete transfer function in descending powers of `z`, `den[0] == 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscreteTf {
    pub num: Vec<f64>,
    pub den: Vec<f64>,
    pub dt: f64,
}

/// Convert `tf` to discrete time with sample interval `dt`.
///
/// # Errors
///
/// Returns an error if `dt` is not a positive finite number, if `alpha` is
/// outside `[0, 1]`, if `tf` is improper, or if the conversion yields a zero
/// leading denominator coefficient.
pub fn discretize(tf: &TransferFunction, dt: f64, method: Method) -> LtiResult<DiscreteTf> {
    let dt = sf_core::ensure_positive(dt, "sample interval")?;
    let alpha = method.alpha();
    if !(0.0..=1.0).contains(&alpha) {
        return Err(LtiError::UnsupportedMethod {
            name: method.to_string(),
        });
    }
    if !tf.is_proper() {
        return Err(LtiError::Improper {
            zeros: poly::degree(tf.num()).unwrap_or(0),
            poles: tf.order(),
        });
    }

    let n = tf.order();
    let num_s = poly::pad(tf.num(), n + 1);
    let den_s = tf.den();

    let p = [1.0, -1.0];
    let q = [dt * alpha, dt * (1.0 - alpha)];

    // coefficient of s^k sits at index n - k
    let substitute = |coeffs: &[f64]| -> Vec<f64> {
        (0..=n).fold(vec![0.0; n + 1], |acc, k| {
            let term = poly::mul(&poly::pow(&p, k), &poly::pow(&q, n - k));
            let scaled: Vec<f64> = term.iter().map(|c| c * coeffs[n - k]).collect();
            poly::add(&acc, &scaled)
        })
    };

    let num_z = poly::pad(&substitute(&num_s), n + 1);
    let den_z = poly::pad(&substitute(den_s), n + 1);

    let lead = den_z[0];
    if lead == 0.0 || !lead.is_finite() {
        return Err(LtiError::Singular {
            what: "leading discrete denominator coefficient is zero",
        });
    }

    Ok(DiscreteTf {
        num: num_z.iter().map(|c| c / lead).collect(),
        den: den_z.iter().map(|c| c / lead).collect(),
        dt,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sf_core::{Tolerances, nearly_equal};

    fn close(a: &[f64], b: &[f64]) -> bool {
        let tol = Tolerances::default();
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| nearly_equal(*x, *y, tol))
    }

    #[test]
    fn method_names_parse() {
        assert_eq!("bilinear".parse::<Method>().unwrap(), Method::Bilinear);
        assert_eq!("Tustin".parse::<Method>().unwrap(), Method::Bilinear);
        assert_eq!("euler".parse::<Method>().unwrap(), Method::Euler);
        assert_eq!(
            "backward_diff".parse::<Method>().unwrap(),
            Method::BackwardDiff
        );
        assert_eq!(
            "gbt:0.25".parse::<Method>().unwrap(),
            Method::Gbt { alpha: 0.25 }
        );
        assert!(matches!(
            "zoh".parse::<Method>(),
            Err(LtiError::UnsupportedMethod { .. })
        ));
        assert!("gbt:2".parse::<Method>().is_err());
    }

    #[test]
    fn bilinear_first_order_lag() {
        // 1/(s+1) at T=1: (z+1)/(3z-1) -> [1/3, 1/3] / [1, -1/3]
        let tf = TransferFunction::new(&[1.0], &[1.0, 1.0]).unwrap();
        let d = discretize(&tf, 1.0, Method::Bilinear).unwrap();
        assert!(close(&d.num, &[1.0 / 3.0, 1.0 / 3.0]));
        assert!(close(&d.den, &[1.0, -1.0 / 3.0]));
    }

    #[test]
    fn euler_first_order_lag() {
        // s = (z-1)/T: 1/((z-1)/T + 1) = T / (z - 1 + T)
        let tf = TransferFunction::new(&[1.0], &[1.0, 1.0]).unwrap();
        let d = discretize(&tf, 0.1, Method::Euler).unwrap();
        assert!(close(&d.num, &[0.0, 0.1]));
        assert!(close(&d.den, &[1.0, -0.9]));
    }

    #[test]
    fn backward_first_order_lag() {
        // s = (z-1)/(Tz): Tz / ((1+T) z - 1)
        let tf = TransferFunction::new(&[1.0], &[1.0, 1.0]).unwrap();
        let d = discretize(&tf, 0.5, Method::BackwardDiff).unwrap();
        assert!(close(&d.num, &[0.5 / 1.5, 0.0]));
        assert!(close(&d.den, &[1.0, -1.0 / 1.5]));
    }

    #[test]
    fn dc_gain_is_preserved_by_bilinear() {
        // H(0) = 1/10; discrete H(z=1) must match
        let tf = TransferFunction::new(&[1.0, 2.0, 1.0], &[1.0, 5.0, 5.0, 10.0]).unwrap();
        let d = discretize(&tf, 1.0 / 128.0, Method::Bilinear).unwrap();
        let dc = d.num.iter().sum::<f64>() / d.den.iter().sum::<f64>();
        assert!((dc - 0.1).abs() < 1e-9);
        assert_eq!(d.num.len(), 4);
        assert_eq!(d.den.len(), 4);
        assert_eq!(d.den[0], 1.0);
    }

    #[test]
    fn static_gain() {
        let tf = TransferFunction::gain(2.0).unwrap();
        let d = discretize(&tf, 0.01, Method::Bilinear).unwrap();
        assert_eq!(d.num, vec![2.0]);
        assert_eq!(d.den, vec![1.0]);
    }

    #[test]
    fn bad_interval_rejected() {
        let tf = TransferFunction::new(&[1.0], &[1.0, 1.0]).unwrap();
        assert!(matches!(
            discretize(&tf, 0.0, Method::Bilinear),
            Err(LtiError::InvalidArg(_))
        ));
    }
}

//! Polynomial helpers on descending coefficient vectors.

use nalgebra::{Complex, DMatrix};

/// Strip leading zero coefficients. An all-zero polynomial becomes empty.
pub fn trim(p: &[f64]) -> &[f64] {
    let first = p.iter().position(|c| *c != 0.0).unwrap_or(p.len());
    &p[first..]
}

/// Degree of the polynomial, `None` for the zero polynomial.
pub fn degree(p: &[f64]) -> Option<usize> {
    let t = trim(p);
    if t.is_empty() { None } else { Some(t.len() - 1) }
}

/// Left-pad with zeros to `len` coefficients.
pub fn pad(p: &[f64], len: usize) -> Vec<f64> {
    let mut out = vec![0.0; len.saturating_sub(p.len())];
    out.extend_from_slice(p);
    out
}

/// Product of two polynomials.
pub fn mul(a: &[f64], b: &[f64]) -> Vec<f64> {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }
    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, x) in a.iter().enumerate() {
        for (j, y) in b.iter().enumerate() {
            out[i + j] += x * y;
        }
    }
    out
}

/// `p^k`, with `p^0 = [1]`.
pub fn pow(p: &[f64], k: usize) -> Vec<f64> {
    (0..k).fold(vec![1.0], |acc, _| mul(&acc, p))
}

/// Sum of two polynomials, aligned on the constant term.
pub fn add(a: &[f64], b: &[f64]) -> Vec<f64> {
    let len = a.len().max(b.len());
    let a = pad(a, len);
    let b = pad(b, len);
    a.iter().zip(&b).map(|(x, y)| x + y).collect()
}

/// Complex roots of a polynomial, from the eigenvalues of its companion matrix.
pub fn roots(p: &[f64]) -> Vec<Complex<f64>> {
    let p = trim(p);
    let n = match p.len() {
        0 | 1 => return Vec::new(),
        len => len - 1,
    };
    let lead = p[0];
    if n == 1 {
        return vec![Complex::new(-p[1] / lead, 0.0)];
    }

    let mut companion = DMatrix::<f64>::zeros(n, n);
    for j in 0..n {
        companion[(0, j)] = -p[j + 1] / lead;
    }
    for i in 1..n {
        companion[(i, i - 1)] = 1.0;
    }
    companion.complex_eigenvalues().iter().copied().collect()
}

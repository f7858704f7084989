//! Digital IIR filter derived from a continuous transfer function.

use sf_core::dot;
use sf_lti::{DiscreteTf, Method, TransferFunction, discretize};

use crate::block::{SignalProcessor, expect_ports};
use crate::error::{FlowError, FlowResult};
use crate::sampled::SampleConfig;
use crate::signal::Signal;

/// Direct-form IIR filter driven by two shift registers.
///
/// With discrete coefficients `b` (numerator) and `a` (denominator, `a[0] = 1`):
///
/// ```text
/// y[n] = b . [x[n], x[n-1], ...] - a[1..] . [y[n-1], y[n-2], ...]
/// ```
///
/// Changing the transfer function, sample rate or method re-derives the
/// coefficients and clears both registers.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    tf: TransferFunction,
    sample: SampleConfig,
    method: Method,
    coeffs: DiscreteTf,
    /// `[x[n], x[n-1], ...]`, one slot per numerator coefficient.
    in_reg: Vec<f64>,
    /// `[y[n-1], y[n-2], ...]`, one slot per denominator coefficient after the first.
    out_reg: Vec<f64>,
    input: f64,
}

impl Filter {
    /// Bilinear filter at sampling frequency `fs` (Hz).
    pub fn new(tf: TransferFunction, fs: f64) -> FlowResult<Self> {
        Self::with_method(tf, SampleConfig::from_frequency(fs)?, Method::Bilinear)
    }

    /// Filter with an explicit sample configuration and method.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransferFunction` if `tf` is improper or unstable, or
    /// if discretization fails.
    pub fn with_method(tf: TransferFunction, sample: SampleConfig, method: Method) -> FlowResult<Self> {
        let coeffs = derive(&tf, sample, method)?;
        let mut filter = Self {
            tf,
            sample,
            method,
            in_reg: Vec::new(),
            out_reg: Vec::new(),
            coeffs,
            input: 0.0,
        };
        filter.clear_registers();
        Ok(filter)
    }

    pub fn tf(&self) -> &TransferFunction {
        &self.tf
    }

    pub fn sample(&self) -> SampleConfig {
        self.sample
    }

    /// Sampling frequency in Hz.
    pub fn fs(&self) -> f64 {
        self.sample.frequency()
    }

    pub fn method(&self) -> Method {
        self.method
    }

    /// Discrete coefficients currently in use.
    pub fn coefficients(&self) -> &DiscreteTf {
        &self.coeffs
    }

    pub fn set_tf(&mut self, tf: TransferFunction) -> FlowResult<()> {
        self.coeffs = derive(&tf, self.sample, self.method)?;
        self.tf = tf;
        self.clear_registers();
        Ok(())
    }

    pub fn set_fs(&mut self, fs: f64) -> FlowResult<()> {
        let sample = SampleConfig::from_frequency(fs)?;
        self.coeffs = derive(&self.tf, sample, self.method)?;
        self.sample = sample;
        self.clear_registers();
        Ok(())
    }

    pub fn set_method(&mut self, method: Method) -> FlowResult<()> {
        self.coeffs = derive(&self.tf, self.sample, method)?;
        self.method = method;
        self.clear_registers();
        Ok(())
    }

    fn clear_registers(&mut self) {
        self.in_reg = vec![0.0; self.coeffs.num.len()];
        self.out_reg = vec![0.0; self.coeffs.den.len().saturating_sub(1)];
        self.input = 0.0;
    }

    fn current(&self) -> f64 {
        dot(&self.coeffs.num, &self.in_reg) - dot(&self.coeffs.den[1..], &self.out_reg)
    }
}

fn derive(tf: &TransferFunction, sample: SampleConfig, method: Method) -> FlowResult<DiscreteTf> {
    tf.validate()?;
    Ok(discretize(tf, sample.dt, method)?)
}

/// Shift toward the tail and write `value` at the head.
fn shift_in(reg: &mut [f64], value: f64) {
    if reg.is_empty() {
        return;
    }
    reg.rotate_right(1);
    reg[0] = value;
}

impl SignalProcessor for Filter {
    fn num_inputs(&self) -> usize {
        1
    }

    fn num_outputs(&self) -> usize {
        1
    }

    /// Latch the current output, then the new input.
    ///
    /// The output latched first is the response to the previous input, which
    /// is what the difference equation needs as `y[n-1]`.
    fn set_input(&mut self, inputs: &[Signal]) -> FlowResult<()> {
        expect_ports("filter input ports", 1, inputs)?;
        let x = inputs[0].as_scalar().ok_or(FlowError::ShapeMismatch {
            what: "filter accepts scalar signals only",
            expected: 1,
            actual: inputs[0].width().unwrap_or(1),
        })?;
        let y = self.current();
        shift_in(&mut self.out_reg, y);
        self.input = x;
        shift_in(&mut self.in_reg, x);
        Ok(())
    }

    fn output(&self) -> FlowResult<Vec<Signal>> {
        Ok(vec![Signal::Scalar(self.current())])
    }

    fn reset(&mut self) {
        self.clear_registers();
    }
}

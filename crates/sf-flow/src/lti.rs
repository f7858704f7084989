//! Continuous state-space system sampled at a fixed interval.

use nalgebra::DVector;
use sf_lti::{FohStepper, TransferFunction};

use crate::block::{SignalProcessor, expect_ports};
use crate::error::{FlowError, FlowResult};
use crate::signal::Signal;

/// Where the block is in its input/commit cycle.
#[derive(Debug, Clone, PartialEq)]
enum LtiPhase {
    /// No integration pending; output is read straight from the state.
    Idle,
    /// An interval has been integrated; its end state is committed on the
    /// next input assignment.
    Staged {
        next_state: DVector<f64>,
        output: f64,
    },
}

/// Sampled LTI system with first-order-hold input between samples.
///
/// Each input assignment integrates one interval from the previous input
/// sample to the new one.
#[derive(Debug, Clone, PartialEq)]
pub struct Lti {
    tf: TransferFunction,
    stepper: FohStepper,
    state: DVector<f64>,
    /// `[previous, current]` input samples.
    inputs: [f64; 2],
    phase: LtiPhase,
}

impl Lti {
    /// Build the block for `tf` sampled every `dt` seconds.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransferFunction` if `tf` is improper or unstable,
    /// and `InvalidArg` if `dt` is not a positive finite number.
    pub fn new(tf: TransferFunction, dt: f64) -> FlowResult<Self> {
        let stepper = build_stepper(&tf, dt)?;
        let state = DVector::zeros(stepper.order());
        Ok(Self {
            tf,
            stepper,
            state,
            inputs: [0.0; 2],
            phase: LtiPhase::Idle,
        })
    }

    pub fn tf(&self) -> &TransferFunction {
        &self.tf
    }

    /// Sample interval in seconds.
    pub fn dt(&self) -> f64 {
        self.stepper.dt()
    }

    /// Committed state vector.
    pub fn state(&self) -> &DVector<f64> {
        &self.state
    }

    /// True when an integrated interval awaits commit.
    pub fn is_staged(&self) -> bool {
        matches!(self.phase, LtiPhase::Staged { .. })
    }

    pub fn set_tf(&mut self, tf: TransferFunction) -> FlowResult<()> {
        self.stepper = build_stepper(&tf, self.dt())?;
        self.tf = tf;
        self.reset();
        Ok(())
    }

    pub fn set_dt(&mut self, dt: f64) -> FlowResult<()> {
        self.stepper = build_stepper(&self.tf, dt)?;
        self.reset();
        Ok(())
    }
}

fn build_stepper(tf: &TransferFunction, dt: f64) -> FlowResult<FohStepper> {
    tf.validate()?;
    let dt = sf_core::ensure_positive(dt, "sample interval")?;
    Ok(FohStepper::new(tf.to_state_space()?, dt)?)
}

impl SignalProcessor for Lti {
    fn num_inputs(&self) -> usize {
        1
    }

    fn num_outputs(&self) -> usize {
        1
    }

    fn set_input(&mut self, inputs: &[Signal]) -> FlowResult<()> {
        expect_ports("lti input ports", 1, inputs)?;
        let u = inputs[0].as_scalar().ok_or(FlowError::ShapeMismatch {
            what: "lti accepts scalar signals only",
            expected: 1,
            actual: inputs[0].width().unwrap_or(1),
        })?;

        let step = self.stepper.step(self.staged_or_committed(), [self.inputs[1], u])?;

        if let LtiPhase::Staged { next_state, .. } =
            std::mem::replace(&mut self.phase, LtiPhase::Idle)
        {
            self.state = next_state;
        }
        self.inputs = [self.inputs[1], u];
        self.phase = LtiPhase::Staged {
            next_state: step.x,
            output: step.y,
        };
        Ok(())
    }

    fn output(&self) -> FlowResult<Vec<Signal>> {
        let y = match &self.phase {
            LtiPhase::Staged { output, .. } => *output,
            LtiPhase::Idle => self.stepper.state_space().output(&self.state, self.inputs[1]),
        };
        Ok(vec![Signal::Scalar(y)])
    }

    fn reset(&mut self) {
        self.state = DVector::zeros(self.stepper.order());
        self.inputs = [0.0; 2];
        self.phase = LtiPhase::Idle;
    }
}

impl Lti {
    /// State the next interval starts from.
    fn staged_or_committed(&self) -> &DVector<f64> {
        match &self.phase {
            LtiPhase::Staged { next_state, .. } => next_state,
            LtiPhase::Idle => &self.state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::scalars;
    use sf_core::{Tolerances, nearly_equal};
    use sf_lti::LtiError;

    fn lag() -> TransferFunction {
        TransferFunction::new(&[1.0], &[1.0, 1.0]).unwrap()
    }

    fn y(out: Vec<Signal>) -> f64 {
        out[0].as_scalar().unwrap()
    }

    #[test]
    fn rejects_invalid_tf() {
        let improper = TransferFunction::new(&[1.0, 0.0, 0.0], &[1.0, 1.0]).unwrap();
        assert!(matches!(
            Lti::new(improper, 0.1),
            Err(FlowError::InvalidTransferFunction(LtiError::Improper { .. }))
        ));
        let unstable = TransferFunction::new(&[1.0], &[1.0, 0.0]).unwrap();
        assert!(matches!(
            Lti::new(unstable, 0.1),
            Err(FlowError::InvalidTransferFunction(LtiError::Unstable { .. }))
        ));
        assert!(matches!(Lti::new(lag(), 0.0), Err(FlowError::InvalidArg(_))));
    }

    #[test]
    fn starts_at_rest() {
        let lti = Lti::new(lag(), 0.1).unwrap();
        assert_eq!(lti.state().len(), 1);
        assert!(!lti.is_staged());
        assert_eq!(y(lti.output().unwrap()), 0.0);
    }

    #[test]
    fn first_interval_is_a_ramp() {
        // u ramps 0 -> 1 over T, x(T) = 1 - (1 - e^-T)/T for 1/(s+1)
        let dt = 0.5;
        let mut lti = Lti::new(lag(), dt).unwrap();
        let got = y(lti.call(&scalars(&[1.0])).unwrap());
        let expected = 1.0 - (1.0 - (-dt).exp()) / dt;
        assert!(nearly_equal(got, expected, Tolerances::default()));
        assert!(lti.is_staged());
        assert_eq!(lti.state()[0], 0.0);
    }

    #[test]
    fn staged_state_commits_on_next_input() {
        let mut lti = Lti::new(lag(), 0.1).unwrap();
        lti.set_input(&scalars(&[1.0])).unwrap();
        let staged = y(lti.output().unwrap());
        lti.set_input(&scalars(&[1.0])).unwrap();
        // C = 1, D = 0: committed state equals the previous output
        assert!(nearly_equal(lti.state()[0], staged, Tolerances::default()));
    }

    #[test]
    fn output_is_idempotent() {
        let mut lti = Lti::new(lag(), 0.1).unwrap();
        lti.set_input(&scalars(&[2.0])).unwrap();
        let a = lti.output().unwrap();
        let b = lti.output().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn step_response_converges() {
        let mut lti = Lti::new(lag(), 0.05).unwrap();
        let mut last = 0.0;
        for _ in 0..400 {
            last = y(lti.call(&scalars(&[3.0])).unwrap());
        }
        assert!((last - 3.0).abs() < 1e-6);
    }

    #[test]
    fn pure_gain_passes_through() {
        let gain = TransferFunction::gain(2.5).unwrap();
        let mut lti = Lti::new(gain, 0.1).unwrap();
        assert_eq!(lti.state().len(), 0);
        assert!(nearly_equal(
            y(lti.call(&scalars(&[4.0])).unwrap()),
            10.0,
            Tolerances::default()
        ));
    }

    #[test]
    fn reconfiguring_resets() {
        let mut lti = Lti::new(lag(), 0.1).unwrap();
        lti.call(&scalars(&[1.0])).unwrap();
        lti.call(&scalars(&[1.0])).unwrap();
        lti.set_dt(0.2).unwrap();
        assert_eq!(lti.dt(), 0.2);
        assert!(!lti.is_staged());
        assert_eq!(lti.state()[0], 0.0);

        let second = TransferFunction::new(&[1.0], &[1.0, 3.0, 2.0]).unwrap();
        lti.set_tf(second).unwrap();
        assert_eq!(lti.state().len(), 2);
    }

    #[test]
    fn failed_reconfiguration_keeps_block() {
        let mut lti = Lti::new(lag(), 0.1).unwrap();
        let unstable = TransferFunction::new(&[1.0], &[1.0, -1.0]).unwrap();
        assert!(lti.set_tf(unstable).is_err());
        assert_eq!(lti.tf(), &lag());
        assert!(lti.set_dt(-1.0).is_err());
        assert_eq!(lti.dt(), 0.1);
    }

    #[test]
    fn vector_input_rejected() {
        let mut lti = Lti::new(lag(), 0.1).unwrap();
        assert!(matches!(
            lti.set_input(&[Signal::vector(&[1.0, 2.0])]),
            Err(FlowError::ShapeMismatch { .. })
        ));
        assert!(!lti.is_staged());
    }
}

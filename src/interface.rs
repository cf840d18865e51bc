//! The estimation capability contract shared by all solver backends.
//!
//! Result accessors are only answerable once an estimation has succeeded.
//! Rather than an internal boolean flag, backends hold an
//! [`EstimationState`]: accessors read the `Estimated` variant and fail with
//! [`MnlError::NotEstimated`] on `Unestimated`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{MnlError, Result};

/// Numeric results of a successful estimation, keyed by long coefficient
/// names. Owned by the backend that produced it and replaced by the next
/// `estimate()` call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EstimationResult {
    /// Log-likelihood of the null (equal-shares) model.
    pub null_log_likelihood: f64,
    /// Log-likelihood at the optimum.
    pub final_log_likelihood: f64,
    /// Coefficient estimates.
    pub parameters: HashMap<String, f64>,
    /// Standard errors of the estimates.
    pub standard_errors: HashMap<String, f64>,
    /// t-values of the estimates.
    pub t_values: HashMap<String, f64>,
    /// Solver-reported estimation time in seconds.
    pub estimation_time: f64,
}

/// Whether a backend currently owns a successful estimation.
#[derive(Clone, Debug, Default)]
pub enum EstimationState {
    /// No successful estimation yet (initial state, or the last run failed).
    #[default]
    Unestimated,
    /// A successful estimation's results.
    Estimated(EstimationResult),
}

impl EstimationState {
    /// The result, or [`MnlError::NotEstimated`] outside `Estimated`.
    pub fn result(&self) -> Result<&EstimationResult> {
        match self {
            EstimationState::Estimated(result) => Ok(result),
            EstimationState::Unestimated => Err(MnlError::NotEstimated),
        }
    }

    /// Whether a successful estimation is held.
    pub fn is_estimated(&self) -> bool {
        matches!(self, EstimationState::Estimated(_))
    }
}

/// Capability contract implemented by estimation backends.
///
/// `estimate` blocks until the backend finishes. A solver that runs but
/// reports failure leaves the state unestimated and returns `Ok(())`;
/// plumbing failures (I/O, timeout, unparseable log) surface as errors.
pub trait Estimator {
    /// Runs the estimation, replacing any previous result on success.
    fn estimate(&mut self) -> Result<()>;

    /// The backend's current estimation state.
    fn state(&self) -> &EstimationState;

    /// Prints a human-readable account of the last run.
    fn display_results(&self) -> Result<()>;

    /// Log-likelihood of the null model.
    fn null_log_likelihood(&self) -> Result<f64> {
        Ok(self.state().result()?.null_log_likelihood)
    }

    /// Log-likelihood at the optimum.
    fn final_log_likelihood(&self) -> Result<f64> {
        Ok(self.state().result()?.final_log_likelihood)
    }

    /// Coefficient estimates keyed by long name.
    fn parameters(&self) -> Result<&HashMap<String, f64>> {
        Ok(&self.state().result()?.parameters)
    }

    /// Standard errors keyed by long name.
    fn standard_errors(&self) -> Result<&HashMap<String, f64>> {
        Ok(&self.state().result()?.standard_errors)
    }

    /// t-values keyed by long name.
    fn t_values(&self) -> Result<&HashMap<String, f64>> {
        Ok(&self.state().result()?.t_values)
    }

    /// Solver-reported estimation time in seconds.
    fn estimation_time(&self) -> Result<f64> {
        Ok(self.state().result()?.estimation_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedEstimator {
        state: EstimationState,
    }

    impl Estimator for FixedEstimator {
        fn estimate(&mut self) -> Result<()> {
            let mut parameters = HashMap::new();
            parameters.insert("p1".to_string(), 0.5);
            self.state = EstimationState::Estimated(EstimationResult {
                null_log_likelihood: -50.0,
                final_log_likelihood: -40.0,
                parameters,
                standard_errors: HashMap::new(),
                t_values: HashMap::new(),
                estimation_time: 1.0,
            });
            Ok(())
        }

        fn state(&self) -> &EstimationState {
            &self.state
        }

        fn display_results(&self) -> Result<()> {
            self.state.result().map(|_| ())
        }
    }

    #[test]
    fn accessors_fail_before_estimation() {
        let backend = FixedEstimator {
            state: EstimationState::Unestimated,
        };
        assert!(matches!(
            backend.null_log_likelihood(),
            Err(MnlError::NotEstimated)
        ));
        assert!(matches!(backend.parameters(), Err(MnlError::NotEstimated)));
        assert!(matches!(
            backend.estimation_time(),
            Err(MnlError::NotEstimated)
        ));
    }

    #[test]
    fn accessors_answer_after_estimation() {
        let mut backend = FixedEstimator {
            state: EstimationState::Unestimated,
        };
        backend.estimate().unwrap();
        assert!(backend.state().is_estimated());
        assert_eq!(backend.final_log_likelihood().unwrap(), -40.0);
        assert_eq!(backend.parameters().unwrap()["p1"], 0.5);
    }
}

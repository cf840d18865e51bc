//! Multinomial logit model specification and estimation through external
//! solvers.
//!
//! This crate describes discrete-choice (random-utility) models and hands
//! parameter estimation to solver backends behind one capability trait. It
//! offers tools to
//!
//! - specify alternatives, variables and utilities (`model` and `utility`
//!   modules),
//! - translate a specification into a fixed-format solver input language and
//!   translate numeric results back (`abbrev`, `records` and `parser`
//!   modules),
//! - drive an external solver executable through its file interface
//!   (`solver` module), and
//! - generate synthetic observations from a known utility process for
//!   validation (`synthetic` module).
//!
//! The crate deliberately contains no maximum-likelihood optimizer: backends
//! implement the [`Estimator`] trait, and the shipped backend delegates to an
//! external ALOGIT-style executable.
//!
//! # Quick start
//!
//! ```no_run
//! use mnlrs::synthetic::{synthetic_data, synthetic_model};
//! use mnlrs::{AlogitSolver, Estimator, SolverOptions};
//!
//! // Two alternatives, one alternative-dependent variable.
//! let model = synthetic_model("Commute mode choice", 2, 1);
//! let data = synthetic_data(&model, 1_000, 7);
//!
//! let options = SolverOptions::new("/opt/alogit/alo45.exe");
//! let mut solver = AlogitSolver::new(model, data, options).expect("supported model");
//!
//! solver.estimate().expect("solver invocation");
//! println!(
//!     "final log-likelihood: {}",
//!     solver.final_log_likelihood().expect("estimated")
//! );
//! ```
//!
//! A run that the solver itself rejects is not an `Err`: the backend stays
//! unestimated, result accessors fail with a typed state error, and
//! `display_results` shows the solver's raw output for diagnosis.

pub mod abbrev;
pub mod data;
pub mod error;
pub mod interface;
pub mod model;
pub mod parser;
pub mod records;
pub mod solver;
pub mod synthetic;
pub mod utility;

pub use abbrev::{AbbreviationRegistry, Role};
pub use data::{Column, Observations, ObservationsBuilder};
pub use error::{MnlError, Result};
pub use interface::{EstimationResult, EstimationState, Estimator};
pub use model::{ChoiceModel, ChoiceModelBuilder, DependentVariable, ModelKind};
pub use parser::ResultParser;
pub use records::RecordSerializer;
pub use solver::{AlogitSolver, SolverOptions, SolverRun};
pub use utility::{UtilitySpecification, UtilityTerm};

//! File/process-based estimation backend.
//!
//! The backend serializes the model to the solver's input grammar, writes the
//! observation table in the matching column order, invokes the external
//! executable synchronously and, on a zero exit status, parses the log file
//! it leaves behind. The input, data and log paths are owned by the instance
//! and reused across `estimate` calls, so concurrent calls on one instance
//! are unsafe; distinct instances share no mutable state.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::abbrev::AbbreviationRegistry;
use crate::data::{Column, Observations};
use crate::error::{MnlError, Result};
use crate::interface::{EstimationState, Estimator};
use crate::model::{ChoiceModel, ModelKind};
use crate::parser::ResultParser;
use crate::records::RecordSerializer;

const SUPPORTED_MODELS: &[ModelKind] = &[ModelKind::MultinomialLogit];

/// Configuration for [`AlogitSolver`].
#[derive(Clone, Debug)]
pub struct SolverOptions {
    /// Path to the solver executable.
    pub executable: PathBuf,
    /// Input-file path; derived from the model title when absent.
    pub input_file: Option<PathBuf>,
    /// Data-file path; derived from the model title when absent.
    pub data_file: Option<PathBuf>,
    /// Deadline for the solver process. Without one, a hung solver blocks
    /// the caller indefinitely.
    pub timeout: Option<Duration>,
}

impl SolverOptions {
    /// Options for a solver executable with derived file paths and no
    /// deadline.
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            input_file: None,
            data_file: None,
            timeout: None,
        }
    }

    /// Overrides the input-file path.
    pub fn with_input_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.input_file = Some(path.into());
        self
    }

    /// Overrides the data-file path.
    pub fn with_data_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_file = Some(path.into());
        self
    }

    /// Sets a deadline after which the solver process is killed.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Captured output of the last solver invocation, retained for diagnostics
/// whether or not the run succeeded.
#[derive(Clone, Debug)]
pub struct SolverRun {
    /// Exit status of the process.
    pub status: std::process::ExitStatus,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

/// Estimation backend that drives an external ALOGIT-style solver through
/// its file interface.
pub struct AlogitSolver {
    model: ChoiceModel,
    observations: Observations,
    registry: AbbreviationRegistry,
    executable: PathBuf,
    input_file: PathBuf,
    data_file: PathBuf,
    timeout: Option<Duration>,
    state: EstimationState,
    last_run: Option<SolverRun>,
}

impl AlogitSolver {
    /// Binds the backend to a model and observation table.
    ///
    /// Fails immediately if the model kind is unsupported or the table lacks
    /// a field the model requires.
    pub fn new(
        model: ChoiceModel,
        observations: Observations,
        options: SolverOptions,
    ) -> Result<Self> {
        if !SUPPORTED_MODELS.contains(&model.kind()) {
            return Err(MnlError::unsupported_model(
                "AlogitSolver",
                model.kind(),
                SUPPORTED_MODELS,
            ));
        }
        observations.validate_for(&model)?;
        let registry = AbbreviationRegistry::for_model(&model)?;

        let prefix = model
            .title()
            .split_whitespace()
            .next()
            .unwrap_or("model")
            .to_string();
        let input_file = options
            .input_file
            .unwrap_or_else(|| PathBuf::from(format!("{prefix}.alo")));
        let data_file = options
            .data_file
            .unwrap_or_else(|| PathBuf::from(format!("{prefix}.csv")));

        Ok(Self {
            model,
            observations,
            registry,
            executable: options.executable,
            input_file,
            data_file,
            timeout: options.timeout,
            state: EstimationState::Unestimated,
            last_run: None,
        })
    }

    /// The bound model.
    pub fn model(&self) -> &ChoiceModel {
        &self.model
    }

    /// The abbreviation registry built at construction.
    pub fn registry(&self) -> &AbbreviationRegistry {
        &self.registry
    }

    /// Path of the solver input file.
    pub fn input_file(&self) -> &Path {
        &self.input_file
    }

    /// Path of the data file.
    pub fn data_file(&self) -> &Path {
        &self.data_file
    }

    /// Diagnostics of the most recent solver invocation, if any.
    pub fn last_run(&self) -> Option<&SolverRun> {
        self.last_run.as_ref()
    }

    /// The solver input records as wrapped physical lines.
    pub fn input_records(&self) -> Vec<String> {
        RecordSerializer::new(&self.model, &self.registry).records(
            &self.data_file.display().to_string(),
            self.observations.column_names(),
        )
    }

    /// Encodes the observation table as delimited rows in table column
    /// order, with choice labels replaced by their 1-based numeric codes.
    fn encode_data_rows(&self) -> Result<Vec<String>> {
        let choice_column = self.model.choice_column();
        let labels = self
            .observations
            .labels(choice_column)
            .ok_or_else(|| MnlError::MissingField {
                field: choice_column.to_string(),
            })?;

        let mut codes = Vec::with_capacity(labels.len());
        for (row, label) in labels.iter().enumerate() {
            let position = self
                .model
                .alternatives()
                .iter()
                .position(|alt| alt == label)
                .ok_or_else(|| MnlError::UnknownChoiceLabel {
                    label: label.clone(),
                    row,
                })?;
            codes.push((position + 1) as f64);
        }

        let mut rows = Vec::with_capacity(self.observations.len());
        for row in 0..self.observations.len() {
            let mut fields = Vec::with_capacity(self.observations.column_names().len());
            for name in self.observations.column_names() {
                if name == choice_column {
                    fields.push(format!("{:?}", codes[row]));
                } else {
                    match self.observations.column(name) {
                        Some(Column::Numeric(values)) => fields.push(format!("{:?}", values[row])),
                        Some(Column::Labels(values)) => fields.push(values[row].clone()),
                        None => unreachable!("column names come from the table"),
                    }
                }
            }
            rows.push(fields.join(","));
        }
        Ok(rows)
    }

    fn write_input_file(&self) -> Result<()> {
        let mut contents = self.input_records().join("\n");
        contents.push('\n');
        fs::write(&self.input_file, contents)?;
        Ok(())
    }

    fn write_data_file(&self) -> Result<()> {
        let mut contents = self.encode_data_rows()?.join("\n");
        contents.push('\n');
        fs::write(&self.data_file, contents)?;
        Ok(())
    }

    /// The log path the solver derives from the input path.
    fn log_file(&self) -> PathBuf {
        self.input_file.with_extension("LOG")
    }

    fn run_solver(&self) -> Result<Output> {
        let input_path = fs::canonicalize(&self.input_file)?;
        let mut command = Command::new(&self.executable);
        command.arg(&input_path);
        debug!(
            "invoking {} {}",
            self.executable.display(),
            input_path.display()
        );

        match self.timeout {
            None => Ok(command.output()?),
            Some(limit) => run_with_deadline(command, limit),
        }
    }
}

/// Polls the child until it exits or the deadline passes, then kills it.
fn run_with_deadline(mut command: Command, limit: Duration) -> Result<Output> {
    command.stdout(Stdio::piped()).stderr(Stdio::piped());
    let mut child = command.spawn()?;
    let deadline = Instant::now() + limit;

    loop {
        if child.try_wait()?.is_some() {
            return Ok(child.wait_with_output()?);
        }
        if Instant::now() >= deadline {
            child.kill()?;
            child.wait()?;
            return Err(MnlError::Timeout {
                seconds: limit.as_secs(),
            });
        }
        thread::sleep(Duration::from_millis(50));
    }
}

impl Estimator for AlogitSolver {
    /// Writes the input and data files, runs the solver, and parses its log.
    ///
    /// A nonzero exit status is not an error here: the state stays
    /// unestimated and the raw output is retained for `display_results`.
    fn estimate(&mut self) -> Result<()> {
        self.state = EstimationState::Unestimated;
        self.write_input_file()?;
        self.write_data_file()?;

        let output = self.run_solver()?;
        let run = SolverRun {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        if run.status.success() {
            let log_text = fs::read_to_string(self.log_file())?;
            let expected = self.model.number_of_parameters(true);
            match ResultParser::new(&self.registry, expected).parse(&log_text) {
                Ok(result) => {
                    info!(
                        "solver finished: final LL {}",
                        result.final_log_likelihood
                    );
                    self.state = EstimationState::Estimated(result);
                }
                Err(error) => {
                    self.last_run = Some(run);
                    return Err(error);
                }
            }
        } else {
            warn!("solver exited with {}", run.status);
        }

        self.last_run = Some(run);
        Ok(())
    }

    fn state(&self) -> &EstimationState {
        &self.state
    }

    /// Prints the solver's stdout after a successful run, or its exit status
    /// and stderr after a failed one. Fails only when no run was attempted.
    fn display_results(&self) -> Result<()> {
        let run = self.last_run.as_ref().ok_or(MnlError::NotEstimated)?;
        if run.status.success() {
            println!("{}", run.stdout);
        } else {
            println!("solver returned {}", run.status);
            println!("{}", run.stderr);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ObservationsBuilder;
    use crate::model::ChoiceModelBuilder;

    fn model(kind: ModelKind) -> ChoiceModel {
        ChoiceModelBuilder::new(
            "Test model",
            vec!["car".to_string(), "bus".to_string()],
            "choice",
        )
        .kind(kind)
        .availability("car", "avail_car")
        .availability("bus", "avail_bus")
        .variable("cost")
        .parameter("p_cost")
        .utility_expression("car", "p_cost*cost")
        .utility_expression("bus", "p_cost*cost")
        .build()
        .unwrap()
    }

    fn observations() -> Observations {
        ObservationsBuilder::new()
            .numeric("cost", vec![1.5, 2.5])
            .numeric("avail_car", vec![1.0, 1.0])
            .numeric("avail_bus", vec![1.0, 1.0])
            .labels("choice", vec!["car".to_string(), "bus".to_string()])
            .build()
            .unwrap()
    }

    #[test]
    fn unsupported_model_kind_is_rejected_at_construction() {
        let result = AlogitSolver::new(
            model(ModelKind::NestedLogit),
            observations(),
            SolverOptions::new("alogit"),
        );
        assert!(matches!(result, Err(MnlError::UnsupportedModel { .. })));
    }

    #[test]
    fn file_paths_derive_from_the_title_prefix() {
        let solver = AlogitSolver::new(
            model(ModelKind::MultinomialLogit),
            observations(),
            SolverOptions::new("alogit"),
        )
        .unwrap();
        assert_eq!(solver.input_file(), Path::new("Test.alo"));
        assert_eq!(solver.data_file(), Path::new("Test.csv"));
    }

    #[test]
    fn data_rows_recode_choices_in_declared_order() {
        let solver = AlogitSolver::new(
            model(ModelKind::MultinomialLogit),
            observations(),
            SolverOptions::new("alogit"),
        )
        .unwrap();

        let rows = solver.encode_data_rows().unwrap();
        assert_eq!(rows, ["1.5,1.0,1.0,1.0", "2.5,1.0,1.0,2.0"]);
    }

    #[test]
    fn unknown_choice_label_fails_encoding() {
        let table = ObservationsBuilder::new()
            .numeric("cost", vec![1.5])
            .numeric("avail_car", vec![1.0])
            .numeric("avail_bus", vec![1.0])
            .labels("choice", vec!["tram".to_string()])
            .build()
            .unwrap();
        let solver = AlogitSolver::new(
            model(ModelKind::MultinomialLogit),
            table,
            SolverOptions::new("alogit"),
        )
        .unwrap();

        assert!(matches!(
            solver.encode_data_rows(),
            Err(MnlError::UnknownChoiceLabel { row: 0, .. })
        ));
    }

    #[test]
    fn accessors_are_guarded_before_any_run() {
        let solver = AlogitSolver::new(
            model(ModelKind::MultinomialLogit),
            observations(),
            SolverOptions::new("alogit"),
        )
        .unwrap();

        assert!(matches!(
            solver.null_log_likelihood(),
            Err(MnlError::NotEstimated)
        ));
        assert!(matches!(
            solver.display_results(),
            Err(MnlError::NotEstimated)
        ));
    }
}

//! Line-oriented scanner over the external solver's log.
//!
//! The scanner is a small explicit state machine rather than a free-form
//! text search: it seeks a handful of trigger substrings, and on the
//! coefficient-table header it switches into a sub-state that consumes
//! exactly as many rows as the model has coefficients. Extra log content is
//! ignored; a missing section or a short table is a fatal parse failure and
//! no partial result is produced.

use std::collections::HashMap;

use log::debug;

use crate::abbrev::AbbreviationRegistry;
use crate::error::{MnlError, Result};
use crate::interface::EstimationResult;

const FINAL_LL_TRIGGER: &str = "Final value of Log Likelihood";
const NULL_LL_TRIGGER: &str = "Initial Log Likelihood";
const COEFFICIENT_HEADER: &str = "Coefficient   Estimate   Std. Error 't' ratio";
const TIME_TRIGGER: &str = "Estimation time";

enum ScanState {
    Seeking,
    ReadingCoefficients { remaining: usize },
}

/// Extracts estimation results from a solver log, translating coefficient
/// tokens back to their long names.
pub struct ResultParser<'a> {
    registry: &'a AbbreviationRegistry,
    expected_rows: usize,
}

impl<'a> ResultParser<'a> {
    /// Creates a parser expecting `expected_rows` coefficient rows
    /// (parameters including intercepts).
    pub fn new(registry: &'a AbbreviationRegistry, expected_rows: usize) -> Self {
        Self {
            registry,
            expected_rows,
        }
    }

    /// Scans `log` and returns the complete result, or the first failure.
    pub fn parse(&self, log: &str) -> Result<EstimationResult> {
        let mut null_log_likelihood = None;
        let mut final_log_likelihood = None;
        let mut estimation_time = None;
        let mut parameters = HashMap::new();
        let mut standard_errors = HashMap::new();
        let mut t_values = HashMap::new();
        let mut header_seen = false;
        let mut state = ScanState::Seeking;

        for line in log.lines() {
            match state {
                ScanState::ReadingCoefficients { remaining } => {
                    let (name, estimate, error, t_value) = self.parse_coefficient_row(line)?;
                    parameters.insert(name.clone(), estimate);
                    standard_errors.insert(name.clone(), error);
                    t_values.insert(name, t_value);
                    state = if remaining > 1 {
                        ScanState::ReadingCoefficients {
                            remaining: remaining - 1,
                        }
                    } else {
                        ScanState::Seeking
                    };
                }
                ScanState::Seeking => {
                    if line.contains(FINAL_LL_TRIGGER) {
                        final_log_likelihood =
                            Some(parse_last_token(line, "final log-likelihood")?);
                    } else if line.contains(NULL_LL_TRIGGER) {
                        null_log_likelihood = Some(parse_last_token(line, "null log-likelihood")?);
                    } else if line.contains(COEFFICIENT_HEADER) {
                        header_seen = true;
                        if self.expected_rows > 0 {
                            state = ScanState::ReadingCoefficients {
                                remaining: self.expected_rows,
                            };
                        }
                    } else if line.contains(TIME_TRIGGER) {
                        estimation_time = Some(parse_second_to_last_token(line)?);
                    }
                }
            }
        }

        if let ScanState::ReadingCoefficients { remaining } = state {
            return Err(MnlError::TruncatedCoefficientTable {
                expected: self.expected_rows,
                found: self.expected_rows - remaining,
            });
        }
        if !header_seen {
            return Err(MnlError::MissingLogSection {
                section: "coefficient table",
            });
        }

        let result = EstimationResult {
            null_log_likelihood: null_log_likelihood.ok_or(MnlError::MissingLogSection {
                section: "initial log-likelihood",
            })?,
            final_log_likelihood: final_log_likelihood.ok_or(MnlError::MissingLogSection {
                section: "final log-likelihood",
            })?,
            parameters,
            standard_errors,
            t_values,
            estimation_time: estimation_time.ok_or(MnlError::MissingLogSection {
                section: "estimation time",
            })?,
        };
        debug!(
            "parsed solver log: {} coefficients, final LL {}",
            self.expected_rows, result.final_log_likelihood
        );
        Ok(result)
    }

    /// Parses one `token estimate std-error t-value` row, restoring the
    /// token's long name.
    fn parse_coefficient_row(&self, line: &str) -> Result<(String, f64, f64, f64)> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 4 {
            return Err(MnlError::MalformedCoefficientRow {
                line: line.to_string(),
            });
        }

        let name = self.registry.elongate(fields[0])?.to_string();
        Ok((
            name,
            parse_number(fields[1], "coefficient estimate")?,
            parse_number(fields[2], "standard error")?,
            parse_number(fields[3], "t-value")?,
        ))
    }
}

fn parse_number(value: &str, field: &'static str) -> Result<f64> {
    value.parse().map_err(|_| MnlError::MalformedNumber {
        field,
        value: value.to_string(),
    })
}

fn parse_last_token(line: &str, field: &'static str) -> Result<f64> {
    let token = line
        .split_whitespace()
        .last()
        .ok_or(MnlError::MissingLogSection { section: field })?;
    parse_number(token, field)
}

fn parse_second_to_last_token(line: &str) -> Result<f64> {
    let token = line
        .split_whitespace()
        .rev()
        .nth(1)
        .ok_or(MnlError::MissingLogSection {
            section: "estimation time",
        })?;
    parse_number(token, "estimation time")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abbrev::Role;

    fn registry() -> AbbreviationRegistry {
        let mut registry = AbbreviationRegistry::new();
        registry.register("parameter1", Role::Parameter).unwrap();
        registry.register("c_alt1", Role::Intercept).unwrap();
        registry
    }

    const LOG: &str = "\
ALOGIT log output
 Initial Log Likelihood  =   -50.0
 some chatter
 Final value of Log Likelihood =  -40.0
 Coefficient   Estimate   Std. Error 't' ratio
 prm1 0.50 0.10 5.0
 c1 1.20 0.30 4.0
 Estimation time  =  3.2 seconds
";

    #[test]
    fn extracts_all_sections_with_long_names() {
        let registry = registry();
        let result = ResultParser::new(&registry, 2).parse(LOG).unwrap();

        assert_eq!(result.null_log_likelihood, -50.0);
        assert_eq!(result.final_log_likelihood, -40.0);
        assert_eq!(result.parameters["parameter1"], 0.50);
        assert_eq!(result.parameters["c_alt1"], 1.20);
        assert_eq!(result.standard_errors["parameter1"], 0.10);
        assert_eq!(result.t_values["c_alt1"], 4.0);
        assert_eq!(result.estimation_time, 3.2);
    }

    #[test]
    fn short_coefficient_table_is_fatal() {
        let registry = registry();
        let result = ResultParser::new(&registry, 3).parse(LOG);
        assert!(matches!(
            result,
            Err(MnlError::MalformedCoefficientRow { .. })
        ));
    }

    #[test]
    fn truncated_log_is_fatal() {
        let registry = registry();
        let truncated = "\
 Coefficient   Estimate   Std. Error 't' ratio
 prm1 0.50 0.10 5.0
";
        let result = ResultParser::new(&registry, 2).parse(truncated);
        assert!(matches!(
            result,
            Err(MnlError::TruncatedCoefficientTable {
                expected: 2,
                found: 1
            })
        ));
    }

    #[test]
    fn missing_header_is_fatal() {
        let registry = registry();
        let result = ResultParser::new(&registry, 2).parse("no results here\n");
        assert!(matches!(
            result,
            Err(MnlError::MissingLogSection {
                section: "coefficient table"
            })
        ));
    }

    #[test]
    fn unknown_token_aborts_the_parse() {
        let mut registry = AbbreviationRegistry::new();
        registry.register("parameter1", Role::Parameter).unwrap();
        let log = "\
 Initial Log Likelihood  =   -50.0
 Final value of Log Likelihood =  -40.0
 Coefficient   Estimate   Std. Error 't' ratio
 mystery 0.50 0.10 5.0
 Estimation time  =  3.2 seconds
";
        let result = ResultParser::new(&registry, 1).parse(log);
        assert!(matches!(result, Err(MnlError::UnknownToken { token }) if token == "mystery"));
    }
}

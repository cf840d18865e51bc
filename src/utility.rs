//! Utility-function specifications: ordered parameter-variable terms plus an
//! optional intercept, and the textual expression parser that produces them.

use serde::{Deserialize, Serialize};

use crate::error::{MnlError, Result};

/// A single product term in a utility function.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtilityTerm {
    /// Coefficient multiplying the variable.
    pub parameter: String,
    /// Variable entering the alternative's utility.
    pub variable: String,
}

impl UtilityTerm {
    /// Creates a term from a parameter and variable name.
    pub fn new(parameter: impl Into<String>, variable: impl Into<String>) -> Self {
        Self {
            parameter: parameter.into(),
            variable: variable.into(),
        }
    }
}

/// The utility function of one alternative: an optional intercept plus an
/// ordered sum of parameter-variable products.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtilitySpecification {
    intercept: Option<String>,
    terms: Vec<UtilityTerm>,
}

impl UtilitySpecification {
    /// Builds a specification from parts, rejecting duplicate labels.
    pub fn new(intercept: Option<String>, terms: Vec<UtilityTerm>) -> Result<Self> {
        let spec = Self { intercept, terms };
        spec.check_duplicates()?;
        Ok(spec)
    }

    /// Parses an expression of the form `"c1 + p1*var1 + p2*var2"`.
    ///
    /// Terms are separated by `+`. A term equal to `intercept` is taken as the
    /// intercept; every other term must be a `*` product of exactly one name
    /// from `parameters` and one from `variables`, in either order.
    pub fn parse(
        expression: &str,
        variables: &[String],
        intercept: Option<&str>,
        parameters: &[String],
    ) -> Result<Self> {
        let mut parsed_intercept = None;
        let mut terms = Vec::new();

        for term in expression.split('+').map(str::trim) {
            if intercept.is_some() && intercept == Some(term) {
                parsed_intercept = intercept.map(str::to_string);
            } else {
                let (a, b) = split_term(term)?;
                terms.push(sort_term(a, b, variables, parameters)?);
            }
        }

        Self::new(parsed_intercept, terms)
    }

    /// The intercept name, if the alternative carries one.
    pub fn intercept(&self) -> Option<&str> {
        self.intercept.as_deref()
    }

    /// The product terms in declaration order.
    pub fn terms(&self) -> &[UtilityTerm] {
        &self.terms
    }

    /// Variable labels used by the terms, in order.
    pub fn variables(&self) -> Vec<&str> {
        self.terms.iter().map(|t| t.variable.as_str()).collect()
    }

    /// Parameter labels used by the terms, in order.
    pub fn parameters(&self) -> Vec<&str> {
        self.terms.iter().map(|t| t.parameter.as_str()).collect()
    }

    fn check_duplicates(&self) -> Result<()> {
        for (index, term) in self.terms.iter().enumerate() {
            for earlier in &self.terms[..index] {
                if earlier.variable == term.variable {
                    return Err(MnlError::DuplicateTermLabel {
                        role: "variable",
                        name: term.variable.clone(),
                    });
                }
                if earlier.parameter == term.parameter {
                    return Err(MnlError::DuplicateTermLabel {
                        role: "parameter",
                        name: term.parameter.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Splits a product term into its two labels.
fn split_term(term: &str) -> Result<(&str, &str)> {
    let mut labels = term.split('*').map(str::trim);
    match (labels.next(), labels.next(), labels.next()) {
        (Some(a), Some(b), None) if !a.is_empty() && !b.is_empty() => Ok((a, b)),
        _ => Err(MnlError::TermNotProduct {
            term: term.to_string(),
        }),
    }
}

/// Determines which label is the parameter and which the variable.
fn sort_term(a: &str, b: &str, variables: &[String], parameters: &[String]) -> Result<UtilityTerm> {
    let is_variable = |label: &str| variables.iter().any(|v| v == label);
    let is_parameter = |label: &str| parameters.iter().any(|p| p == label);

    if is_variable(a) && is_parameter(b) {
        Ok(UtilityTerm::new(b, a))
    } else if is_parameter(a) && is_variable(b) {
        Ok(UtilityTerm::new(a, b))
    } else {
        Err(MnlError::InvalidTermContents {
            a: a.to_string(),
            b: b.to_string(),
        })
    }
}

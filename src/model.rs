//! Choice model specifications and the validating builder that constructs them.
//!
//! A [`ChoiceModel`] is immutable once built: alternatives keep their declared
//! order (it defines the solver-side numeric encoding), and every name a
//! utility references is guaranteed to be declared in the model.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{MnlError, Result};
use crate::utility::UtilitySpecification;

/// Concrete model families an estimation backend can be bound to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelKind {
    /// Standard multinomial logit.
    MultinomialLogit,
    /// Nested logit; declared for binding checks, no backend ships with one.
    NestedLogit,
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelKind::MultinomialLogit => write!(f, "multinomial logit"),
            ModelKind::NestedLogit => write!(f, "nested logit"),
        }
    }
}

/// A variable whose value differs by alternative, stored as one data column
/// per alternative.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependentVariable {
    name: String,
    columns: HashMap<String, String>,
}

impl DependentVariable {
    /// Creates a dependent variable from its name and alternative-to-column map.
    pub fn new(name: impl Into<String>, columns: HashMap<String, String>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    /// The variable's name as used in utility expressions.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The data column holding this variable's value for `alternative`.
    pub fn column(&self, alternative: &str) -> Option<&str> {
        self.columns.get(alternative).map(String::as_str)
    }
}

/// A discrete-choice model: alternatives, variables, coefficients and one
/// utility specification per alternative.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChoiceModel {
    kind: ModelKind,
    title: String,
    alternatives: Vec<String>,
    choice_column: String,
    availability: HashMap<String, String>,
    independent_variables: Vec<String>,
    dependent_variables: Vec<DependentVariable>,
    intercepts: HashMap<String, String>,
    parameters: Vec<String>,
    specification: HashMap<String, UtilitySpecification>,
}

impl ChoiceModel {
    /// The model family this specification belongs to.
    pub fn kind(&self) -> ModelKind {
        self.kind
    }

    /// The model title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Alternatives in declared order.
    pub fn alternatives(&self) -> &[String] {
        &self.alternatives
    }

    /// Name of the data column holding the observed choice.
    pub fn choice_column(&self) -> &str {
        &self.choice_column
    }

    /// The availability column of `alternative`.
    pub fn availability(&self, alternative: &str) -> Option<&str> {
        self.availability.get(alternative).map(String::as_str)
    }

    /// Availability columns in alternative order.
    pub fn availability_fields(&self) -> Vec<&str> {
        self.alternatives
            .iter()
            .map(|alt| self.availability[alt].as_str())
            .collect()
    }

    /// Alternative-independent variables in declared order.
    pub fn independent_variables(&self) -> &[String] {
        &self.independent_variables
    }

    /// Alternative-dependent variables in declared order.
    pub fn dependent_variables(&self) -> &[DependentVariable] {
        &self.dependent_variables
    }

    /// All variable names: independent first, then dependent, declared order.
    pub fn all_variables(&self) -> Vec<&str> {
        self.independent_variables
            .iter()
            .map(String::as_str)
            .chain(self.dependent_variables.iter().map(|v| v.name()))
            .collect()
    }

    /// Data columns of the dependent variables, variable-major in alternative
    /// order.
    pub fn dependent_variable_fields(&self) -> Vec<&str> {
        let mut fields = Vec::new();
        for variable in &self.dependent_variables {
            for alternative in &self.alternatives {
                if let Some(column) = variable.column(alternative) {
                    fields.push(column);
                }
            }
        }
        fields
    }

    /// All variable data columns: independent variables are their own columns.
    pub fn all_variable_fields(&self) -> Vec<&str> {
        self.independent_variables
            .iter()
            .map(String::as_str)
            .chain(self.dependent_variable_fields())
            .collect()
    }

    /// The intercept name of `alternative`, if it carries one.
    pub fn intercept(&self, alternative: &str) -> Option<&str> {
        self.intercepts.get(alternative).map(String::as_str)
    }

    /// Intercept names in alternative order, skipping alternatives without one.
    pub fn intercept_names(&self) -> Vec<&str> {
        self.alternatives
            .iter()
            .filter_map(|alt| self.intercept(alt))
            .collect()
    }

    /// Parameter names in declared order.
    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    /// The utility specification of `alternative`.
    ///
    /// Every alternative is guaranteed a specification by the builder.
    pub fn utility(&self, alternative: &str) -> &UtilitySpecification {
        &self.specification[alternative]
    }

    /// Whether `variable` is alternative-dependent.
    pub fn is_dependent_variable(&self, variable: &str) -> bool {
        self.dependent_variables.iter().any(|v| v.name() == variable)
    }

    /// Number of alternatives.
    pub fn number_of_alternatives(&self) -> usize {
        self.alternatives.len()
    }

    /// Number of coefficients, optionally counting intercepts.
    pub fn number_of_parameters(&self, include_intercepts: bool) -> usize {
        if include_intercepts {
            self.parameters.len() + self.intercepts.len()
        } else {
            self.parameters.len()
        }
    }
}

enum UtilityInput {
    Spec(UtilitySpecification),
    Expression(String),
}

/// Builder that validates name references before constructing a [`ChoiceModel`].
pub struct ChoiceModelBuilder {
    kind: ModelKind,
    title: String,
    alternatives: Vec<String>,
    choice_column: String,
    availability: HashMap<String, String>,
    independent_variables: Vec<String>,
    dependent_variables: Vec<DependentVariable>,
    intercepts: HashMap<String, String>,
    parameters: Vec<String>,
    specification: HashMap<String, UtilityInput>,
}

impl ChoiceModelBuilder {
    /// Starts a multinomial logit model from its title, ordered alternatives
    /// and choice column.
    pub fn new(
        title: impl Into<String>,
        alternatives: Vec<String>,
        choice_column: impl Into<String>,
    ) -> Self {
        Self {
            kind: ModelKind::MultinomialLogit,
            title: title.into(),
            alternatives,
            choice_column: choice_column.into(),
            availability: HashMap::new(),
            independent_variables: Vec::new(),
            dependent_variables: Vec::new(),
            intercepts: HashMap::new(),
            parameters: Vec::new(),
            specification: HashMap::new(),
        }
    }

    /// Overrides the model family tag.
    pub fn kind(mut self, kind: ModelKind) -> Self {
        self.kind = kind;
        self
    }

    /// Declares the availability column of `alternative`.
    pub fn availability(
        mut self,
        alternative: impl Into<String>,
        column: impl Into<String>,
    ) -> Self {
        self.availability.insert(alternative.into(), column.into());
        self
    }

    /// Declares an alternative-independent variable (also its data column).
    pub fn variable(mut self, name: impl Into<String>) -> Self {
        self.independent_variables.push(name.into());
        self
    }

    /// Declares an alternative-dependent variable with one column per
    /// alternative.
    pub fn dependent_variable(
        mut self,
        name: impl Into<String>,
        columns: HashMap<String, String>,
    ) -> Self {
        self.dependent_variables
            .push(DependentVariable::new(name, columns));
        self
    }

    /// Declares the intercept of `alternative`.
    pub fn intercept(
        mut self,
        alternative: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        self.intercepts.insert(alternative.into(), name.into());
        self
    }

    /// Declares a parameter.
    pub fn parameter(mut self, name: impl Into<String>) -> Self {
        self.parameters.push(name.into());
        self
    }

    /// Sets the utility of `alternative` from an already-built specification.
    pub fn utility(
        mut self,
        alternative: impl Into<String>,
        specification: UtilitySpecification,
    ) -> Self {
        self.specification
            .insert(alternative.into(), UtilityInput::Spec(specification));
        self
    }

    /// Sets the utility of `alternative` from an expression such as
    /// `"c1 + p1*var1"`, parsed against the declared names at build time.
    pub fn utility_expression(
        mut self,
        alternative: impl Into<String>,
        expression: impl Into<String>,
    ) -> Self {
        self.specification
            .insert(alternative.into(), UtilityInput::Expression(expression.into()));
        self
    }

    /// Finalizes construction after validating availability, utilities and
    /// every referenced name.
    ///
    /// Intercept counts are deliberately not checked; identification
    /// conventions are the caller's responsibility.
    pub fn build(self) -> Result<ChoiceModel> {
        for alternative in &self.alternatives {
            if !self.availability.contains_key(alternative) {
                return Err(MnlError::UndefinedAvailability {
                    alternative: alternative.clone(),
                });
            }
            if !self.specification.contains_key(alternative) {
                return Err(MnlError::MissingUtility {
                    alternative: alternative.clone(),
                });
            }
        }

        let all_variables: Vec<String> = self
            .independent_variables
            .iter()
            .cloned()
            .chain(self.dependent_variables.iter().map(|v| v.name().to_string()))
            .collect();

        let mut specification = HashMap::new();
        for (alternative, input) in self.specification {
            let declared_intercept = self.intercepts.get(&alternative).map(String::as_str);
            let spec = match input {
                UtilityInput::Spec(spec) => spec,
                UtilityInput::Expression(expression) => UtilitySpecification::parse(
                    &expression,
                    &all_variables,
                    declared_intercept,
                    &self.parameters,
                )?,
            };

            if let Some(intercept) = spec.intercept() {
                if declared_intercept != Some(intercept) {
                    return Err(MnlError::UndeclaredIntercept {
                        intercept: intercept.to_string(),
                        alternative,
                    });
                }
            }
            for term in spec.terms() {
                if !self.parameters.iter().any(|p| p == &term.parameter) {
                    return Err(MnlError::UndeclaredParameter {
                        parameter: term.parameter.clone(),
                        alternative,
                    });
                }
                if !all_variables.iter().any(|v| v == &term.variable) {
                    return Err(MnlError::UndeclaredVariable {
                        variable: term.variable.clone(),
                        alternative,
                    });
                }
            }
            specification.insert(alternative, spec);
        }

        Ok(ChoiceModel {
            kind: self.kind,
            title: self.title,
            alternatives: self.alternatives,
            choice_column: self.choice_column,
            availability: self.availability,
            independent_variables: self.independent_variables,
            dependent_variables: self.dependent_variables,
            intercepts: self.intercepts,
            parameters: self.parameters,
            specification,
        })
    }
}

//! Bijective mapping between long names and the short tokens the solver's
//! fixed-width grammar requires.
//!
//! Each registry instance owns its own two-way table; nothing is shared or
//! global. Tokens are a role prefix followed by a 1-based counter that is
//! monotonic within the role, so distinct names can never share a token.

use std::collections::HashMap;

use crate::error::{MnlError, Result};
use crate::model::ChoiceModel;

/// Maximum token length accepted by the solver.
pub const MAX_TOKEN_LENGTH: usize = 10;

/// The role a long name plays in the solver input, fixing its token prefix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    /// An alternative's label.
    ChoiceLabel,
    /// The observed-choice column.
    ChoiceColumn,
    /// An availability column.
    AvailabilityColumn,
    /// A variable name.
    Variable,
    /// A column of an alternative-dependent variable.
    DependentVariableColumn,
    /// An intercept coefficient.
    Intercept,
    /// A slope coefficient.
    Parameter,
}

impl Role {
    const COUNT: usize = 7;

    /// The token prefix of this role.
    pub fn prefix(self) -> &'static str {
        match self {
            Role::ChoiceLabel => "ch",
            Role::ChoiceColumn => "alt",
            Role::AvailabilityColumn => "av",
            Role::Variable => "v",
            Role::DependentVariableColumn => "cv",
            Role::Intercept => "c",
            Role::Parameter => "prm",
        }
    }

    fn index(self) -> usize {
        match self {
            Role::ChoiceLabel => 0,
            Role::ChoiceColumn => 1,
            Role::AvailabilityColumn => 2,
            Role::Variable => 3,
            Role::DependentVariableColumn => 4,
            Role::Intercept => 5,
            Role::Parameter => 6,
        }
    }
}

/// Two-way table of long names and their role-prefixed tokens.
#[derive(Clone, Debug, Default)]
pub struct AbbreviationRegistry {
    forward: HashMap<String, (Role, String)>,
    reverse: HashMap<String, String>,
    counters: [usize; Role::COUNT],
}

impl AbbreviationRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the registry for a model in the fixed registration order:
    /// alternatives, choice column, availability columns, variables,
    /// dependent-variable columns, intercepts, parameters.
    pub fn for_model(model: &ChoiceModel) -> Result<Self> {
        let mut registry = Self::new();

        for alternative in model.alternatives() {
            registry.register(alternative, Role::ChoiceLabel)?;
        }
        registry.register(model.choice_column(), Role::ChoiceColumn)?;
        for column in model.availability_fields() {
            registry.register(column, Role::AvailabilityColumn)?;
        }
        for variable in model.all_variables() {
            registry.register(variable, Role::Variable)?;
        }
        for column in model.dependent_variable_fields() {
            registry.register(column, Role::DependentVariableColumn)?;
        }
        for intercept in model.intercept_names() {
            registry.register(intercept, Role::Intercept)?;
        }
        for parameter in model.parameters() {
            registry.register(parameter, Role::Parameter)?;
        }

        Ok(registry)
    }

    /// Registers `name` under `role` and returns its token.
    ///
    /// Registering the same name under the same role again returns the
    /// existing token. Registering it under a different role is an error;
    /// the table is a bijection and is never silently overwritten.
    pub fn register(&mut self, name: &str, role: Role) -> Result<String> {
        if let Some((existing_role, token)) = self.forward.get(name) {
            if *existing_role == role {
                return Ok(token.clone());
            }
            return Err(MnlError::DuplicateName {
                name: name.to_string(),
            });
        }

        self.counters[role.index()] += 1;
        let token = format!("{}{}", role.prefix(), self.counters[role.index()]);
        if self.reverse.contains_key(&token) {
            return Err(MnlError::TokenCollision { token });
        }

        self.reverse.insert(token.clone(), name.to_string());
        self.forward.insert(name.to_string(), (role, token.clone()));
        Ok(token)
    }

    /// The token of `name`, or `name` itself if it was never registered.
    pub fn abbreviate<'a>(&'a self, name: &'a str) -> &'a str {
        match self.forward.get(name) {
            Some((_, token)) => token,
            None => name,
        }
    }

    /// The long name behind `token`.
    pub fn elongate(&self, token: &str) -> Result<&str> {
        self.reverse
            .get(token)
            .map(String::as_str)
            .ok_or_else(|| MnlError::unknown_token(token))
    }

    /// Number of registered names.
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    /// Whether no names are registered.
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }
}

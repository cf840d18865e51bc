//! Serialization of a choice model into the solver's fixed-format record
//! grammar.
//!
//! Records are emitted in a fixed sequence and wrapped at the solver's line
//! limit with a greedy word wrap that never splits a token, so serializing
//! the same model twice yields byte-identical output.

use crate::abbrev::AbbreviationRegistry;
use crate::model::ChoiceModel;

/// Maximum physical line width accepted by the solver.
pub const MAX_LINE_LENGTH: usize = 77;

/// Serializes a model and its registry into ordered solver input records.
pub struct RecordSerializer<'a> {
    model: &'a ChoiceModel,
    registry: &'a AbbreviationRegistry,
}

impl<'a> RecordSerializer<'a> {
    /// Creates a serializer over a model and its abbreviation registry.
    pub fn new(model: &'a ChoiceModel, registry: &'a AbbreviationRegistry) -> Self {
        Self { model, registry }
    }

    /// Produces the full record sequence as wrapped physical lines.
    ///
    /// `data_file` is the path written into the file record; `columns` are
    /// the data table's column names in table order (the choice column is
    /// abbreviated to its numeric-encoding token like every other name).
    pub fn records(&self, data_file: &str, columns: &[String]) -> Vec<String> {
        let model = self.model;
        let abbr = |name: &str| self.registry.abbreviate(name).to_string();
        let mut lines = Vec::new();

        lines.extend(self.record("$title", &[model.title()]));
        lines.extend(self.record("$estimate", &[]));

        let coefficients: Vec<&str> = model
            .parameters()
            .iter()
            .map(String::as_str)
            .chain(model.intercept_names())
            .collect();
        lines.extend(self.record("$coeff", &coefficients));

        let alternative_tokens: Vec<String> =
            model.alternatives().iter().map(|alt| abbr(alt)).collect();
        lines.extend(wrap_record(
            &format!("$nest root({})", alternative_tokens.join(" ")),
            MAX_LINE_LENGTH,
        ));

        let column_tokens: Vec<String> = columns.iter().map(|column| abbr(column)).collect();
        lines.extend(wrap_record(
            &format!("file (name={}) {}", data_file, column_tokens.join(" ")),
            MAX_LINE_LENGTH,
        ));

        for alternative in model.alternatives() {
            let availability = model
                .availability(alternative)
                .expect("builder guarantees availability per alternative");
            lines.extend(self.record(&self.array_record("Avail", alternative), &[availability]));
        }

        for variable in model.dependent_variables() {
            let array = self.array(variable.name(), "alts");
            lines.extend(self.record("$array", &[array.as_str()]));
            for alternative in model.alternatives() {
                if let Some(column) = variable.column(alternative) {
                    lines.extend(
                        self.record(&self.array_record(variable.name(), alternative), &[column]),
                    );
                }
            }
        }

        lines.extend(wrap_record(
            &format!(
                "choice=recode({} {})",
                abbr(model.choice_column()),
                alternative_tokens.join(", ")
            ),
            MAX_LINE_LENGTH,
        ));

        for alternative in model.alternatives() {
            let utility = self.utility_string(alternative);
            lines.extend(self.record(&self.array_record("Util", alternative), &[utility.as_str()]));
        }

        lines
    }

    /// Formats one record: the command followed by abbreviated arguments,
    /// wrapped to physical lines.
    fn record(&self, command: &str, args: &[&str]) -> Vec<String> {
        let mut record = command.to_string();
        for arg in args {
            record.push(' ');
            record.push_str(self.registry.abbreviate(arg));
        }
        wrap_record(&record, MAX_LINE_LENGTH)
    }

    /// Formats `array(argument)` with both names abbreviated.
    fn array(&self, array: &str, argument: &str) -> String {
        format!(
            "{}({})",
            self.registry.abbreviate(array),
            self.registry.abbreviate(argument)
        )
    }

    /// Formats an assignment head `array(argument) =`.
    fn array_record(&self, array: &str, argument: &str) -> String {
        format!("{} =", self.array(array, argument))
    }

    /// Builds the utility expression of `alternative` in solver syntax:
    /// the intercept token, then `parameter*variable` products, with a
    /// parenthesized alternative token on alternative-dependent variables.
    fn utility_string(&self, alternative: &str) -> String {
        let utility = self.model.utility(alternative);
        let mut terms = Vec::new();

        if let Some(intercept) = utility.intercept() {
            terms.push(self.registry.abbreviate(intercept).to_string());
        }
        for term in utility.terms() {
            let parameter = self.registry.abbreviate(&term.parameter);
            let variable = self.registry.abbreviate(&term.variable);
            if self.model.is_dependent_variable(&term.variable) {
                terms.push(format!(
                    "{parameter}*{variable}({})",
                    self.registry.abbreviate(alternative)
                ));
            } else {
                terms.push(format!("{parameter}*{variable}"));
            }
        }

        terms.join(" + ")
    }
}

/// Greedy word wrap: fills each line up to `width` without ever breaking a
/// token. A token longer than `width` gets a line of its own.
fn wrap_record(record: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for token in record.split_whitespace() {
        if current.is_empty() {
            current.push_str(token);
        } else if current.len() + 1 + token.len() <= width {
            current.push(' ');
            current.push_str(token);
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(token);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

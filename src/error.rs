use thiserror::Error;

/// Unified error type for `mnlrs` operations.
#[derive(Debug, Error)]
pub enum MnlError {
    /// Raised when an interface is constructed with a model kind it does not support.
    #[error("{interface} does not support {kind} models (supported: {supported:?})")]
    UnsupportedModel {
        /// Name of the interface that rejected the model.
        interface: &'static str,
        /// Kind of the rejected model.
        kind: String,
        /// Kinds the interface accepts.
        supported: Vec<String>,
    },

    /// Raised when an alternative has no availability column.
    #[error("availability column for alternative `{alternative}` not defined")]
    UndefinedAvailability { alternative: String },

    /// Raised when an alternative has no utility specification.
    #[error("utility specification for alternative `{alternative}` not defined")]
    MissingUtility { alternative: String },

    /// Raised when a utility references a parameter missing from the model.
    #[error("parameter `{parameter}` in the utility of `{alternative}` is not declared")]
    UndeclaredParameter {
        parameter: String,
        alternative: String,
    },

    /// Raised when a utility references a variable missing from the model.
    #[error("variable `{variable}` in the utility of `{alternative}` is not declared")]
    UndeclaredVariable {
        variable: String,
        alternative: String,
    },

    /// Raised when a utility's intercept is not the one declared for its alternative.
    #[error("intercept `{intercept}` in the utility of `{alternative}` is not declared")]
    UndeclaredIntercept {
        intercept: String,
        alternative: String,
    },

    /// Raised when a utility term is not a product of two labels.
    #[error("utility term `{term}` must be a product of a parameter and a variable")]
    TermNotProduct { term: String },

    /// Raised when a utility term's labels are not one parameter and one variable.
    #[error("labels `{a}` and `{b}` must be one declared parameter and one declared variable")]
    InvalidTermContents { a: String, b: String },

    /// Raised when a variable or parameter appears twice in one utility.
    #[error("{role} `{name}` used more than once in a utility specification")]
    DuplicateTermLabel { role: &'static str, name: String },

    /// Raised when a long name is registered under two different roles.
    #[error("name `{name}` is already abbreviated under another role")]
    DuplicateName { name: String },

    /// Raised when a freshly generated token is already in use.
    #[error("token `{token}` is already bound to another name")]
    TokenCollision { token: String },

    /// Raised when elongating a token the registry never produced.
    #[error("token `{token}` is not a known abbreviation")]
    UnknownToken { token: String },

    /// Raised when querying results before a successful estimation.
    #[error("estimation has not been performed")]
    NotEstimated,

    /// Raised when a column required by the model is absent from the observations.
    #[error("field `{field}` not present in the observation table")]
    MissingField { field: String },

    /// Raised when observation columns have differing lengths.
    #[error("column `{column}` has {found} rows but the table has {expected}")]
    ColumnLengthMismatch {
        column: String,
        expected: usize,
        found: usize,
    },

    /// Raised when a choice label does not name a model alternative.
    #[error("choice label `{label}` at row {row} is not a model alternative")]
    UnknownChoiceLabel { label: String, row: usize },

    /// Raised when the solver log lacks a required section.
    #[error("solver log is missing the {section} section")]
    MissingLogSection { section: &'static str },

    /// Raised when the coefficient table ends before all rows are read.
    #[error("coefficient table ended after {found} of {expected} rows")]
    TruncatedCoefficientTable { expected: usize, found: usize },

    /// Raised when a coefficient row does not parse as four fields.
    #[error("malformed coefficient row: `{line}`")]
    MalformedCoefficientRow { line: String },

    /// Raised when a captured log field is not a number.
    #[error("could not parse `{value}` as the {field}")]
    MalformedNumber { field: &'static str, value: String },

    /// Raised when the external solver exceeds the configured deadline.
    #[error("solver did not finish within {seconds} seconds")]
    Timeout { seconds: u64 },

    /// File or process plumbing failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl MnlError {
    /// Helper to format an [`UnsupportedModel`](MnlError::UnsupportedModel) error.
    pub fn unsupported_model(
        interface: &'static str,
        kind: impl ToString,
        supported: &[impl ToString],
    ) -> Self {
        Self::UnsupportedModel {
            interface,
            kind: kind.to_string(),
            supported: supported.iter().map(ToString::to_string).collect(),
        }
    }

    /// Helper for bubbling up unknown-token failures from the registry.
    pub fn unknown_token(token: impl Into<String>) -> Self {
        Self::UnknownToken {
            token: token.into(),
        }
    }
}

/// Type alias for results returned by this crate.
pub type Result<T> = std::result::Result<T, MnlError>;

use thiserror::Error;

/// Failures raised while turning formula text and element specs into a
/// calculation tree. Any of these means the score configuration is unusable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// Token is not an operator, a `[Name]` reference, or a number
    #[error("invalid token '{0}'")]
    InvalidToken(String),

    /// `[Name]` reference with no matching catalog entry
    #[error("unknown element '{0}'")]
    UnknownElement(String),

    /// Element names cannot contain `[` or `]`, so no formula could reference them
    #[error("element name '{0}' cannot contain '[' or ']'")]
    InvalidElementName(String),

    #[error("invalid range config for '{0}': expected [min, max]")]
    InvalidRangeConfig(String),

    #[error("invalid interval config for '{0}': expected rules like \"< 5: 0.1\"")]
    InvalidIntervalConfig(String),

    /// Interval rule operator other than `<` or `/>`
    #[error("unsupported interval operator '{0}' (expected '<' or '/>')")]
    UnsupportedOperator(String),

    #[error("unbalanced parentheses at position {position}")]
    UnbalancedParentheses { position: usize },
}

/// Failures raised while evaluating a compiled tree against inputs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvaluationError {
    #[error("calculation '{operation}' has no children")]
    EmptyCalculation { operation: String },

    #[error("missing input value for '{0}'")]
    MissingInput(String),
}

use std::error;
use std::fmt::{self, Display};

/// A backtrackable failure to match some part of the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    message: String,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        ParseError {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl error::Error for ParseError {}

/// A transform could not produce a value from its sub-results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformError(pub String);

impl Display for TransformError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl error::Error for TransformError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Input did not match. The only error the parser backtracks on.
    Parse(ParseError),
    /// A parse succeeded without consuming the entire input.
    Incomplete { consumed: usize, total: usize },
    /// A nonterminal names a production the grammar doesn't have.
    UndefinedProduction(String),
    Transform(TransformError),
    InvalidPattern { pattern: String, reason: String },
    InvalidExpression { source: String, reason: String },
    InvalidGrammar(String),
    OffsetOutOfBounds { offset: usize, len: usize },
}

impl Error {
    /// Whether the error may be recovered from by trying another alternative.
    pub fn is_backtrackable(&self) -> bool {
        matches!(self, Error::Parse(_))
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Parse(ref e) => write!(f, "failed to parse: {}", e),
            Error::Incomplete { consumed, total } => write!(
                f,
                "incomplete match: did not match entire input, consumed {} of {} bytes",
                consumed, total
            ),
            Error::UndefinedProduction(ref name) => {
                write!(f, "undefined production: {}", name)
            }
            Error::Transform(ref e) => write!(f, "transform failed: {}", e),
            Error::InvalidPattern {
                ref pattern,
                ref reason,
            } => write!(f, "invalid pattern /{}/: {}", pattern, reason),
            Error::InvalidExpression {
                ref source,
                ref reason,
            } => write!(f, "invalid transform expression '{}': {}", source, reason),
            Error::InvalidGrammar(ref s) => write!(f, "invalid grammar: {}", s),
            Error::OffsetOutOfBounds { offset, len } => write!(
                f,
                "offset {} is not a character boundary within input of length {}",
                offset, len
            ),
        }
    }
}

impl error::Error for Error {}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Error {
        Error::Parse(err)
    }
}

impl From<TransformError> for Error {
    fn from(err: TransformError) -> Error {
        Error::Transform(err)
    }
}

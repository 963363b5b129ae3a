use std::fmt::{self, Debug, Display};

/// Values produced by parsing.
///
/// Terminals produce `text` values, rules without a transform produce a `list`
/// of their sub-results.
pub trait SemanticValue: Clone + Debug + Send + Sync + 'static {
    fn text(s: &str) -> Self;
    fn list(items: Vec<Self>) -> Self;
}

/// The default semantic value.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Value {
    Text(String),
    List(Vec<Value>),
}

impl Value {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            Value::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            Value::Text(_) => None,
        }
    }

    /// Short name of the value's kind for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Text(_) => "text",
            Value::List(_) => "list",
        }
    }
}

impl SemanticValue for Value {
    fn text(s: &str) -> Self {
        Value::Text(s.to_owned())
    }

    fn list(items: Vec<Self>) -> Self {
        Value::List(items)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_owned())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{:?}", s),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

use std::collections::HashMap;
use std::fmt::{self, Debug, Display};
use std::sync::Arc;

use tracing::debug;

use crate::error::{Error, TransformError};
use crate::expr::Expr;
use crate::value::{SemanticValue, Value};

type TransformFn<V> = dyn Fn(Vec<V>) -> Result<V, TransformError> + Send + Sync;

/// Turns the sub-results of a matched rule into a single value.
///
/// Transforms are compared and displayed by their label since closures can't
/// be compared.
pub struct Transform<V> {
    label: String,
    f: Arc<TransformFn<V>>,
}

impl<V: SemanticValue> Transform<V> {
    pub fn new<F>(label: &str, f: F) -> Self
    where
        F: Fn(Vec<V>) -> Result<V, TransformError> + Send + Sync + 'static,
    {
        Transform {
            label: label.to_owned(),
            f: Arc::new(f),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn apply(&self, nodes: Vec<V>) -> Result<V, TransformError> {
        (self.f)(nodes)
    }
}

impl Transform<Value> {
    /// Build a transform from expression source text, resolving calls against
    /// `callbacks`.
    pub fn from_expr(source: &str, callbacks: &Callbacks) -> Result<Self, Error> {
        let source = source.trim();
        let expr: Expr = source.parse()?;

        let mut bound = Callbacks::new();
        for name in expr.calls() {
            match callbacks.get(name) {
                Some(cb) => {
                    debug!(callback = name, transform = source, "resolved callback");
                    bound.insert(name, cb.clone())
                }
                None => {
                    return Err(Error::InvalidExpression {
                        source: source.to_owned(),
                        reason: format!("unknown callback '{}'", name),
                    })
                }
            }
        }

        Ok(Transform::new(source, move |nodes| expr.eval(&nodes, &bound)))
    }
}

impl<V> Clone for Transform<V> {
    fn clone(&self) -> Self {
        Transform {
            label: self.label.clone(),
            f: self.f.clone(),
        }
    }
}

impl<V> PartialEq for Transform<V> {
    fn eq(&self, other: &Transform<V>) -> bool {
        self.label == other.label
    }
}

impl<V> Eq for Transform<V> {}

impl<V> Debug for Transform<V> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Transform({:?})", self.label)
    }
}

impl<V> Display for Transform<V> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "-> {{ {} }}", self.label)
    }
}

pub type Callback = Arc<dyn Fn(Vec<Value>) -> Result<Value, TransformError> + Send + Sync>;

/// Named functions a grammar definition may call from its transforms.
///
/// Callbacks are supplied by the grammar author when compiling; a definition
/// can only reach the functions registered here.
#[derive(Clone, Default)]
pub struct Callbacks {
    map: HashMap<String, Callback>,
}

impl Callbacks {
    pub fn new() -> Self {
        Callbacks::default()
    }

    pub fn register<F>(mut self, name: &str, f: F) -> Self
    where
        F: Fn(Vec<Value>) -> Result<Value, TransformError> + Send + Sync + 'static,
    {
        self.insert(name, Arc::new(f));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Callback> {
        self.map.get(name)
    }

    fn insert(&mut self, name: &str, cb: Callback) {
        self.map.insert(name.to_owned(), cb);
    }
}

impl Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut names: Vec<&String> = self.map.keys().collect();
        names.sort();
        f.debug_struct("Callbacks").field("names", &names).finish()
    }
}

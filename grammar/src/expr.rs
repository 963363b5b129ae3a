//! A small expression language for rule transforms.
//!
//! Expressions can only index into the sub-results of a rule, build text and
//! list literals, concatenate, and call callbacks registered by the grammar
//! author. Nothing else is reachable.
//!
//! ```text
//! expr  = term , { "+" , term } ;
//! term  = atom , { "[" , integer , "]" } ;
//! atom  = "$" , digits | "$" | string | "[" , [ args ] , "]"
//!       | ident , "(" , [ args ] , ")" | "(" , expr , ")" ;
//! args  = expr , { "," , expr } ;
//! ```

use std::fmt::{self, Display};
use std::str::FromStr;

use crate::error::{Error, TransformError};
use crate::parser;
use crate::transform::Callbacks;
use crate::value::Value;

#[derive(PartialEq, Eq, Debug, Clone)]
pub enum Expr {
    /// `$`, the list of all sub-results.
    Nodes,
    /// `$n`
    Node(usize),
    Text(String),
    List(Vec<Expr>),
    Index(Box<Expr>, i64),
    Concat(Box<Expr>, Box<Expr>),
    Call(String, Vec<Expr>),
}

impl Expr {
    pub fn eval(&self, nodes: &[Value], callbacks: &Callbacks) -> Result<Value, TransformError> {
        match self {
            Expr::Nodes => Ok(Value::List(nodes.to_vec())),
            Expr::Node(n) => nodes.get(*n).cloned().ok_or_else(|| {
                TransformError(format!(
                    "${} out of range, rule matched {} symbols",
                    n,
                    nodes.len()
                ))
            }),
            Expr::Text(s) => Ok(Value::Text(s.clone())),
            Expr::List(items) => {
                let items = items
                    .iter()
                    .map(|item| item.eval(nodes, callbacks))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::List(items))
            }
            Expr::Index(expr, idx) => {
                let value = expr.eval(nodes, callbacks)?;
                let mut items = match value {
                    Value::List(items) => items,
                    Value::Text(_) => {
                        return Err(TransformError(format!(
                            "cannot index text with [{}]",
                            idx
                        )))
                    }
                };
                let len = items.len() as i64;
                let pos = if *idx < 0 { len + idx } else { *idx };
                if pos < 0 || pos >= len {
                    return Err(TransformError(format!(
                        "index [{}] out of range for list of length {}",
                        idx, len
                    )));
                }
                Ok(items.swap_remove(pos as usize))
            }
            Expr::Concat(lhs, rhs) => {
                match (lhs.eval(nodes, callbacks)?, rhs.eval(nodes, callbacks)?) {
                    (Value::Text(mut a), Value::Text(b)) => {
                        a.push_str(&b);
                        Ok(Value::Text(a))
                    }
                    (Value::List(mut a), Value::List(b)) => {
                        a.extend(b);
                        Ok(Value::List(a))
                    }
                    (a, b) => Err(TransformError(format!(
                        "cannot concatenate {} and {}",
                        a.kind(),
                        b.kind()
                    ))),
                }
            }
            Expr::Call(name, args) => {
                let cb = callbacks
                    .get(name)
                    .ok_or_else(|| TransformError(format!("unknown callback '{}'", name)))?;
                let args = args
                    .iter()
                    .map(|arg| arg.eval(nodes, callbacks))
                    .collect::<Result<Vec<_>, _>>()?;
                cb(args)
            }
        }
    }

    /// Names of all callbacks called anywhere in the expression.
    pub fn calls(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_calls(&mut names);
        names
    }

    fn collect_calls<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Expr::Nodes | Expr::Node(_) | Expr::Text(_) => (),
            Expr::List(items) => items.iter().for_each(|item| item.collect_calls(names)),
            Expr::Index(expr, _) => expr.collect_calls(names),
            Expr::Concat(lhs, rhs) => {
                lhs.collect_calls(names);
                rhs.collect_calls(names);
            }
            Expr::Call(name, args) => {
                names.push(name);
                args.iter().for_each(|arg| arg.collect_calls(names));
            }
        }
    }
}

fn write_args(f: &mut fmt::Formatter, args: &[Expr]) -> fmt::Result {
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", arg)?;
    }
    Ok(())
}

impl Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Nodes => write!(f, "$"),
            Expr::Node(n) => write!(f, "${}", n),
            // Strings have no escapes, so quote with whichever doesn't
            // appear in the text.
            Expr::Text(s) if s.contains('\'') => write!(f, "\"{}\"", s),
            Expr::Text(s) => write!(f, "'{}'", s),
            Expr::List(items) => {
                write!(f, "[")?;
                write_args(f, items)?;
                write!(f, "]")
            }
            Expr::Index(expr, idx) => match **expr {
                Expr::Concat(..) => write!(f, "({})[{}]", expr, idx),
                _ => write!(f, "{}[{}]", expr, idx),
            },
            Expr::Concat(lhs, rhs) => match **rhs {
                Expr::Concat(..) => write!(f, "{} + ({})", lhs, rhs),
                _ => write!(f, "{} + {}", lhs, rhs),
            },
            Expr::Call(name, args) => {
                write!(f, "{}(", name)?;
                write_args(f, args)?;
                write!(f, ")")
            }
        }
    }
}

impl FromStr for Expr {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (rem, expr) = parser::expr(s).map_err(|e| Error::InvalidExpression {
            source: s.to_owned(),
            reason: format!("{:?}", e),
        })?;
        if !rem.trim().is_empty() {
            return Err(Error::InvalidExpression {
                source: s.to_owned(),
                reason: format!("unexpected trailing input '{}'", rem.trim()),
            });
        }
        Ok(expr)
    }
}

//! A self-hosting grammar engine.
//!
//! Grammar definitions are compiled from text by parsing them with a
//! hand-built grammar for the definition language, and the resulting
//! [`Grammar`] drives the same backtracking parser for any other input.
//!
//! ```
//! let g = metagram::compile("S: '(' S '.' S ')' | atom; atom: /[A-Z]+/;").unwrap();
//! assert!(metagram::parse_all(&g, "S", "(A.(B.(C.NIL)))").is_ok());
//! ```
//!
//! Definitions are a sequence of productions:
//!
//! ```text
//! name: alternative | alternative ... ;
//! ```
//!
//! where each alternative is a sequence of symbols (`ident` for another
//! production, `'text'` for a literal, `/regex/` for a pattern matched at the
//! current position) optionally followed by `-> { expr }` to transform the
//! values of the matched symbols. Whitespace is never skipped implicitly.

pub mod bootstrap;
mod compile;

pub use compile::{compile, compile_with};
pub use engine::{expected, parse, parse_all, parse_symbol, Outcome};
pub use grammar::{
    Callback, Callbacks, Error, Grammar, ParseError, Pattern, Production, Rule, SemanticValue,
    Symbol, Transform, TransformError, Value,
};

//! Grammar data model.
//!
//! A [`Grammar`] maps names to [`Production`]s, each an ordered list of
//! alternative [`Rule`]s. A rule is a sequence of [`Symbol`]s with an optional
//! [`Transform`] computing the rule's value from the values of its symbols.
//! The `Display` impls print grammar definition text.

use std::collections::{HashMap, HashSet};
use std::fmt::{self, Display};

mod error;
pub mod expr;
mod parser;
mod pattern;
mod transform;
mod value;

pub use error::{Error, ParseError, TransformError};
pub use pattern::{unescape_slashes, Pattern};
pub use transform::{Callback, Callbacks, Transform};
pub use value::{SemanticValue, Value};

#[derive(PartialEq, Eq, Debug, Clone)]
pub enum Symbol {
    /// Matches the exact text.
    Literal(String),
    /// Matches a regex anchored at the current offset.
    Regex(Pattern),
    /// Refers to a production by name.
    Nonterminal(String),
}

impl Symbol {
    pub fn literal(s: &str) -> Self {
        Symbol::Literal(s.to_owned())
    }

    pub fn regex(source: &str) -> Result<Self, Error> {
        Ok(Symbol::Regex(Pattern::new(source)?))
    }

    pub fn nonterminal(name: &str) -> Self {
        Symbol::Nonterminal(name.to_owned())
    }
}

/// Prints the symbol as written in a definition. Definitions have no escape
/// for quotes, so a literal containing `'` prints text that won't read back.
impl Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Symbol::Literal(s) => write!(f, "'{}'", s),
            Symbol::Regex(p) => write!(f, "{}", p),
            Symbol::Nonterminal(name) => write!(f, "{}", name),
        }
    }
}

/// One alternative of a production.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Rule<V = Value> {
    pub symbols: Vec<Symbol>,
    pub transform: Option<Transform<V>>,
}

impl<V> Rule<V> {
    pub fn new(symbols: Vec<Symbol>) -> Self {
        Rule {
            symbols,
            transform: None,
        }
    }

    pub fn with_transform(mut self, transform: Transform<V>) -> Self {
        self.transform = Some(transform);
        self
    }
}

impl<V> Display for Rule<V> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, sym) in self.symbols.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", sym)?;
        }
        if let Some(tf) = &self.transform {
            write!(f, " {}", tf)?;
        }
        Ok(())
    }
}

#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Production<V = Value> {
    pub name: String,
    /// Tried in order, the first to match wins.
    pub rules: Vec<Rule<V>>,
}

impl<V> Production<V> {
    pub fn new(name: &str, rules: Vec<Rule<V>>) -> Self {
        Production {
            name: name.to_owned(),
            rules,
        }
    }
}

impl<V> Display for Production<V> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: ", self.name)?;
        for (i, rule) in self.rules.iter().enumerate() {
            if i > 0 {
                write!(f, " | ")?;
            }
            write!(f, "{}", rule)?;
        }
        write!(f, " ;")
    }
}

/// A validated set of productions. Immutable once built.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Grammar<V = Value> {
    productions: Vec<Production<V>>,
    index: HashMap<String, usize>,
}

impl<V> Grammar<V> {
    /// Build a grammar, checking that names are unique and that no production
    /// or rule is empty.
    pub fn new(productions: Vec<Production<V>>) -> Result<Self, Error> {
        let mut index = HashMap::with_capacity(productions.len());
        for (idx, prod) in productions.iter().enumerate() {
            if prod.rules.is_empty() {
                return Err(Error::InvalidGrammar(format!(
                    "production '{}' has no alternatives",
                    prod.name
                )));
            }
            if let Some(n) = prod.rules.iter().position(|r| r.symbols.is_empty()) {
                return Err(Error::InvalidGrammar(format!(
                    "alternative {} of production '{}' has no symbols",
                    n, prod.name
                )));
            }
            if index.insert(prod.name.clone(), idx).is_some() {
                return Err(Error::InvalidGrammar(format!(
                    "production '{}' defined more than once",
                    prod.name
                )));
            }
        }
        Ok(Grammar { productions, index })
    }

    pub fn get(&self, name: &str) -> Option<&Production<V>> {
        self.index.get(name).map(|&idx| &self.productions[idx])
    }

    /// Productions in the order they were defined.
    pub fn productions(&self) -> &[Production<V>] {
        &self.productions
    }

    pub fn len(&self) -> usize {
        self.productions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.productions.is_empty()
    }

    /// Nonterminal names referenced by some rule with no matching production,
    /// in order of first reference.
    pub fn undefined_references(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.productions
            .iter()
            .flat_map(|prod| prod.rules.iter())
            .flat_map(|rule| rule.symbols.iter())
            .filter_map(|sym| match sym {
                Symbol::Nonterminal(name) if !self.index.contains_key(name) => {
                    Some(name.as_str())
                }
                _ => None,
            })
            .filter(|name| seen.insert(*name))
            .collect()
    }
}

impl<V> Display for Grammar<V> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for prod in &self.productions {
            writeln!(f, "{}", prod)?;
        }
        Ok(())
    }
}

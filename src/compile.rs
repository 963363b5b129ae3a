use tracing::{debug, warn};

use engine::parse_all;
use grammar::{Callbacks, Error, Grammar, Production, Rule, Transform};

use crate::bootstrap::{self, Alternative, ProductionDef, SymbolDef};

/// Compile grammar definition text into a grammar.
///
/// Transforms may not call any callbacks, see [`compile_with`].
pub fn compile(text: &str) -> Result<Grammar, Error> {
    compile_with(text, &Callbacks::new())
}

/// Compile grammar definition text into a grammar, resolving callbacks named in
/// transforms against `callbacks`.
///
/// References to undefined productions are allowed here and only reported
/// once a parse reaches them. Text with no productions compiles to an empty
/// grammar.
pub fn compile_with(text: &str, callbacks: &Callbacks) -> Result<Grammar, Error> {
    if text.trim().is_empty() {
        debug!("compiled empty grammar");
        return Grammar::new(Vec::new());
    }

    let defs = parse_all(bootstrap::grammar(), "S", text)?;

    let productions = defs
        .into_list()?
        .into_iter()
        .map(|def| production(def.into_production()?, callbacks))
        .collect::<Result<Vec<_>, _>>()?;

    let grammar = Grammar::new(productions)?;
    for name in grammar.undefined_references() {
        warn!(production = name, "grammar references undefined production");
    }
    debug!(productions = grammar.len(), "compiled grammar");

    Ok(grammar)
}

fn production(def: ProductionDef, callbacks: &Callbacks) -> Result<Production, Error> {
    let rules = def
        .alternatives
        .into_iter()
        .map(|alt| rule(alt, callbacks))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Production::new(&def.name, rules))
}

fn rule(alt: Alternative, callbacks: &Callbacks) -> Result<Rule, Error> {
    let symbols = alt
        .symbols
        .into_iter()
        .map(SymbolDef::build)
        .collect::<Result<Vec<_>, _>>()?;
    let rule = Rule::new(symbols);
    match alt.transform {
        Some(source) => Ok(rule.with_transform(Transform::from_expr(&source, callbacks)?)),
        None => Ok(rule),
    }
}

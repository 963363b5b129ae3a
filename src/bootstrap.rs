//! The grammar of grammar definitions, built by hand.
//!
//! Parsing definition text with this grammar produces a list of
//! [`Meta::Production`] values which the compiler turns into a [`Grammar`].
//! Written in its own notation (the transform labels name what the
//! hand-written transforms do):
//!
//! ```text
//! S: ws prods -> { $1 } ;
//! prods: prod prods -> { cons($0, $1) } | prod -> { [$0] } ;
//! prod: ident ':' ws rules ws ';' ws -> { production($0, $3) } ;
//! rules: rule ws '|' ws rules -> { cons($0, $4) } | rule -> { [$0] } ;
//! rule: syms ws '->' ws '{' /[^}]*/ '}' -> { alternative($0, $5) } | syms -> { alternative($0) } ;
//! syms: sym ws syms -> { cons($0, $2) } | sym -> { [$0] } ;
//! sym: ident -> { nonterminal($0) } | /'[^']*'/ -> { literal($0) } | /\/(?:\\.|[^\/\\])+\// -> { regex($0) } ;
//! ident: /[A-Za-z_][A-Za-z0-9_]*/ -> { $0 } ;
//! ws: /\s*/ -> { $0 } ;
//! ```

use once_cell::sync::Lazy;

use grammar::{
    unescape_slashes, Error, Grammar, Production, Rule, SemanticValue, Symbol, Transform,
    TransformError,
};

/// A symbol as written in a definition. Regex sources are checked when the
/// definition is compiled.
#[derive(Clone, Debug, PartialEq)]
pub enum SymbolDef {
    Literal(String),
    Regex(String),
    Nonterminal(String),
}

impl SymbolDef {
    pub fn build(self) -> Result<Symbol, Error> {
        match self {
            SymbolDef::Literal(s) => Ok(Symbol::Literal(s)),
            SymbolDef::Regex(source) => Symbol::regex(&source),
            SymbolDef::Nonterminal(name) => Ok(Symbol::Nonterminal(name)),
        }
    }
}

/// An alternative of a production as written in a definition. The transform
/// is kept as source text until compiled.
#[derive(Clone, Debug, PartialEq)]
pub struct Alternative {
    pub symbols: Vec<SymbolDef>,
    pub transform: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ProductionDef {
    pub name: String,
    pub alternatives: Vec<Alternative>,
}

/// Values produced while parsing grammar definitions.
#[derive(Clone, Debug, PartialEq)]
pub enum Meta {
    Text(String),
    List(Vec<Meta>),
    Symbol(SymbolDef),
    Alternative(Alternative),
    Production(ProductionDef),
}

impl SemanticValue for Meta {
    fn text(s: &str) -> Self {
        Meta::Text(s.to_owned())
    }

    fn list(items: Vec<Self>) -> Self {
        Meta::List(items)
    }
}

impl Meta {
    fn kind(&self) -> &'static str {
        match self {
            Meta::Text(_) => "text",
            Meta::List(_) => "list",
            Meta::Symbol(_) => "symbol",
            Meta::Alternative(_) => "alternative",
            Meta::Production(_) => "production",
        }
    }

    fn mismatch(&self, expected: &str) -> TransformError {
        TransformError(format!("expected {}, found {}", expected, self.kind()))
    }

    pub fn into_text(self) -> Result<String, TransformError> {
        match self {
            Meta::Text(s) => Ok(s),
            other => Err(other.mismatch("text")),
        }
    }

    pub fn into_list(self) -> Result<Vec<Meta>, TransformError> {
        match self {
            Meta::List(items) => Ok(items),
            other => Err(other.mismatch("list")),
        }
    }

    pub fn into_symbol(self) -> Result<SymbolDef, TransformError> {
        match self {
            Meta::Symbol(sym) => Ok(sym),
            other => Err(other.mismatch("symbol")),
        }
    }

    pub fn into_alternative(self) -> Result<Alternative, TransformError> {
        match self {
            Meta::Alternative(alt) => Ok(alt),
            other => Err(other.mismatch("alternative")),
        }
    }

    pub fn into_production(self) -> Result<ProductionDef, TransformError> {
        match self {
            Meta::Production(prod) => Ok(prod),
            other => Err(other.mismatch("production")),
        }
    }
}

static BOOTSTRAP: Lazy<Grammar<Meta>> =
    Lazy::new(|| build().expect("bootstrap grammar is well formed"));

/// The hand-built grammar for grammar definitions.
pub fn grammar() -> &'static Grammar<Meta> {
    &BOOTSTRAP
}

fn take(nodes: &mut [Meta], idx: usize) -> Result<Meta, TransformError> {
    nodes
        .get_mut(idx)
        .map(|m| std::mem::replace(m, Meta::List(Vec::new())))
        .ok_or_else(|| TransformError(format!("${} out of range", idx)))
}

/// Take a single sub-result.
fn pick(idx: usize) -> Transform<Meta> {
    Transform::new(&format!("${}", idx), move |mut nodes: Vec<Meta>| {
        take(&mut nodes, idx)
    })
}

/// Wrap a single sub-result in a list.
fn singleton() -> Transform<Meta> {
    Transform::new("[$0]", |mut nodes: Vec<Meta>| {
        Ok(Meta::List(vec![take(&mut nodes, 0)?]))
    })
}

/// Prepend the sub-result at `head` to the list at `tail`.
fn cons(head: usize, tail: usize) -> Transform<Meta> {
    let label = format!("cons(${}, ${})", head, tail);
    Transform::new(&label, move |mut nodes: Vec<Meta>| {
        let rest = take(&mut nodes, tail)?.into_list()?;
        let mut items = Vec::with_capacity(rest.len() + 1);
        items.push(take(&mut nodes, head)?);
        items.extend(rest);
        Ok(Meta::List(items))
    })
}

fn production() -> Transform<Meta> {
    Transform::new("production($0, $3)", |mut nodes: Vec<Meta>| {
        let name = take(&mut nodes, 0)?.into_text()?;
        let alternatives = take(&mut nodes, 3)?
            .into_list()?
            .into_iter()
            .map(Meta::into_alternative)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Meta::Production(ProductionDef { name, alternatives }))
    })
}

fn alternative(body: Option<usize>) -> Transform<Meta> {
    let label = match body {
        Some(idx) => format!("alternative($0, ${})", idx),
        None => "alternative($0)".to_owned(),
    };
    Transform::new(&label, move |mut nodes: Vec<Meta>| {
        let symbols = take(&mut nodes, 0)?
            .into_list()?
            .into_iter()
            .map(Meta::into_symbol)
            .collect::<Result<Vec<_>, _>>()?;
        let transform = match body {
            Some(idx) => Some(take(&mut nodes, idx)?.into_text()?.trim().to_owned()),
            None => None,
        };
        Ok(Meta::Alternative(Alternative { symbols, transform }))
    })
}

fn nonterminal() -> Transform<Meta> {
    Transform::new("nonterminal($0)", |mut nodes: Vec<Meta>| {
        let name = take(&mut nodes, 0)?.into_text()?;
        Ok(Meta::Symbol(SymbolDef::Nonterminal(name)))
    })
}

/// Strips the first and last character, the delimiters.
fn strip_delimiters(s: &str) -> &str {
    let mut chars = s.chars();
    chars.next();
    chars.next_back();
    chars.as_str()
}

fn literal() -> Transform<Meta> {
    Transform::new("literal($0)", |mut nodes: Vec<Meta>| {
        let quoted = take(&mut nodes, 0)?.into_text()?;
        let text = strip_delimiters(&quoted).to_owned();
        Ok(Meta::Symbol(SymbolDef::Literal(text)))
    })
}

fn regex() -> Transform<Meta> {
    Transform::new("regex($0)", |mut nodes: Vec<Meta>| {
        let delimited = take(&mut nodes, 0)?.into_text()?;
        let source = unescape_slashes(strip_delimiters(&delimited));
        Ok(Meta::Symbol(SymbolDef::Regex(source)))
    })
}

fn lit(s: &str) -> Symbol {
    Symbol::literal(s)
}

fn nt(s: &str) -> Symbol {
    Symbol::nonterminal(s)
}

fn build() -> Result<Grammar<Meta>, Error> {
    Grammar::new(vec![
        Production::new(
            "S",
            vec![Rule::new(vec![nt("ws"), nt("prods")]).with_transform(pick(1))],
        ),
        Production::new(
            "prods",
            vec![
                Rule::new(vec![nt("prod"), nt("prods")]).with_transform(cons(0, 1)),
                Rule::new(vec![nt("prod")]).with_transform(singleton()),
            ],
        ),
        Production::new(
            "prod",
            vec![Rule::new(vec![
                nt("ident"),
                lit(":"),
                nt("ws"),
                nt("rules"),
                nt("ws"),
                lit(";"),
                nt("ws"),
            ])
            .with_transform(production())],
        ),
        Production::new(
            "rules",
            vec![
                Rule::new(vec![nt("rule"), nt("ws"), lit("|"), nt("ws"), nt("rules")])
                    .with_transform(cons(0, 4)),
                Rule::new(vec![nt("rule")]).with_transform(singleton()),
            ],
        ),
        Production::new(
            "rule",
            vec![
                Rule::new(vec![
                    nt("syms"),
                    nt("ws"),
                    lit("->"),
                    nt("ws"),
                    lit("{"),
                    Symbol::regex("[^}]*")?,
                    lit("}"),
                ])
                .with_transform(alternative(Some(5))),
                Rule::new(vec![nt("syms")]).with_transform(alternative(None)),
            ],
        ),
        Production::new(
            "syms",
            vec![
                Rule::new(vec![nt("sym"), nt("ws"), nt("syms")]).with_transform(cons(0, 2)),
                Rule::new(vec![nt("sym")]).with_transform(singleton()),
            ],
        ),
        Production::new(
            "sym",
            vec![
                Rule::new(vec![nt("ident")]).with_transform(nonterminal()),
                Rule::new(vec![Symbol::regex("'[^']*'")?]).with_transform(literal()),
                Rule::new(vec![Symbol::regex(r"/(?:\\.|[^/\\])+/")?]).with_transform(regex()),
            ],
        ),
        Production::new(
            "ident",
            vec![Rule::new(vec![Symbol::regex("[A-Za-z_][A-Za-z0-9_]*")?]).with_transform(pick(0))],
        ),
        Production::new(
            "ws",
            vec![Rule::new(vec![Symbol::regex(r"\s*")?]).with_transform(pick(0))],
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::{parse, parse_all};

    fn sym(input: &str) -> Symbol {
        parse_all(grammar(), "sym", input)
            .unwrap()
            .into_symbol()
            .unwrap()
            .build()
            .unwrap()
    }

    #[test]
    fn symbols() {
        let tests = vec![
            ("atom", Symbol::nonterminal("atom")),
            ("_a1", Symbol::nonterminal("_a1")),
            ("'('", Symbol::literal("(")),
            ("''", Symbol::literal("")),
            ("'a b'", Symbol::literal("a b")),
            ("/[A-Z]+/", Symbol::regex("[A-Z]+").unwrap()),
            (r"/a\/b/", Symbol::regex("a/b").unwrap()),
            (r"/\d+/", Symbol::regex(r"\d+").unwrap()),
        ];
        for (input, expected) in tests {
            assert_eq!(sym(input), expected, "input: {}", input);
        }
    }

    #[test]
    fn alternative_with_transform() {
        let got = parse_all(grammar(), "rule", "'(' S ')' -> { $1 }")
            .unwrap()
            .into_alternative()
            .unwrap();
        assert_eq!(
            got,
            Alternative {
                symbols: vec![
                    SymbolDef::Literal("(".to_owned()),
                    SymbolDef::Nonterminal("S".to_owned()),
                    SymbolDef::Literal(")".to_owned())
                ],
                transform: Some("$1".to_owned()),
            }
        );
    }

    #[test]
    fn productions() {
        let got = parse_all(grammar(), "S", "\n X: 'a' | 'ab';\n Y:X;\n")
            .unwrap()
            .into_list()
            .unwrap();
        let prods: Vec<ProductionDef> = got
            .into_iter()
            .map(|m| m.into_production().unwrap())
            .collect();
        assert_eq!(
            prods,
            vec![
                ProductionDef {
                    name: "X".to_owned(),
                    alternatives: vec![
                        Alternative {
                            symbols: vec![SymbolDef::Literal("a".to_owned())],
                            transform: None,
                        },
                        Alternative {
                            symbols: vec![SymbolDef::Literal("ab".to_owned())],
                            transform: None,
                        },
                    ],
                },
                ProductionDef {
                    name: "Y".to_owned(),
                    alternatives: vec![Alternative {
                        symbols: vec![SymbolDef::Nonterminal("X".to_owned())],
                        transform: None,
                    }],
                },
            ]
        );
    }

    #[test]
    fn prefix_of_definition() {
        // The second statement is missing its terminator.
        let input = "X: 'a'; Y: 'b'";
        let got = parse(grammar(), "S", input, 0).unwrap();
        assert_eq!(got.offset, 8);
    }

    #[test]
    fn invalid_regex_symbol() {
        let def = parse_all(grammar(), "sym", "/[a-/")
            .unwrap()
            .into_symbol()
            .unwrap();
        assert_eq!(def, SymbolDef::Regex("[a-".to_owned()));
        match def.build().unwrap_err() {
            Error::InvalidPattern { pattern, .. } => assert_eq!(pattern, "[a-"),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}

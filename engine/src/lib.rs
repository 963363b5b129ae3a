//! Backtracking recursive descent parsing driven by a [`Grammar`].
//!
//! Alternatives of a production are tried in the order they're defined. The
//! first alternative whose symbols all match is committed to, even if a later
//! alternative would consume more input. No memoization is done, so grammars
//! with a lot of overlapping alternatives can take exponential time, and left
//! recursive grammars will overflow the stack.

use std::collections::HashSet;

use grammar::{Error, Grammar, ParseError, Production, SemanticValue, Symbol};
use tracing::trace;

mod position;

use position::Position;

/// A successful parse.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<V> {
    /// Offset just after the matched input.
    pub offset: usize,
    pub value: V,
}

/// Parse the production named `start` beginning at byte `offset`.
///
/// Only a prefix of the remaining input needs to match.
pub fn parse<V: SemanticValue>(
    grammar: &Grammar<V>,
    start: &str,
    input: &str,
    offset: usize,
) -> Result<Outcome<V>, Error> {
    parse_symbol(grammar, &Symbol::Nonterminal(start.to_owned()), input, offset)
}

/// Parse a single symbol beginning at byte `offset`.
pub fn parse_symbol<V: SemanticValue>(
    grammar: &Grammar<V>,
    symbol: &Symbol,
    input: &str,
    offset: usize,
) -> Result<Outcome<V>, Error> {
    let pos = Position::new(input, offset)?;
    let (end, value) = Parser { grammar }.symbol(symbol, pos)?;
    Ok(Outcome {
        offset: end.idx,
        value,
    })
}

/// Parse the production named `start`, requiring that the entire input is
/// matched.
pub fn parse_all<V: SemanticValue>(grammar: &Grammar<V>, start: &str, input: &str) -> Result<V, Error> {
    let outcome = parse(grammar, start, input, 0)?;
    if outcome.offset != input.len() {
        return Err(Error::Incomplete {
            consumed: outcome.offset,
            total: input.len(),
        });
    }
    Ok(outcome.value)
}

/// Describe what input would satisfy `symbol`.
///
/// Productions are described by the first symbol of each of their
/// alternatives, joined with "or". Repeated descriptions are only listed once.
pub fn expected<V>(grammar: &Grammar<V>, symbol: &Symbol) -> String {
    let mut descs = Vec::new();
    describe_symbol(grammar, symbol, &mut HashSet::new(), &mut descs);
    descs.join(" or ")
}

fn describe_symbol<'g, V>(
    grammar: &'g Grammar<V>,
    symbol: &'g Symbol,
    visiting: &mut HashSet<&'g str>,
    descs: &mut Vec<String>,
) {
    let desc = match symbol {
        Symbol::Literal(s) => format!("'{}'", s),
        Symbol::Regex(p) => p.to_string(),
        Symbol::Nonterminal(name) => match grammar.get(name) {
            // Recursive references are described by name.
            Some(prod) if visiting.insert(name.as_str()) => {
                describe_production(grammar, prod, visiting, descs);
                visiting.remove(name.as_str());
                return;
            }
            _ => name.clone(),
        },
    };
    if !descs.contains(&desc) {
        descs.push(desc);
    }
}

fn describe_production<'g, V>(
    grammar: &'g Grammar<V>,
    prod: &'g Production<V>,
    visiting: &mut HashSet<&'g str>,
    descs: &mut Vec<String>,
) {
    for sym in prod.rules.iter().filter_map(|rule| rule.symbols.first()) {
        describe_symbol(grammar, sym, visiting, descs);
    }
}

struct Parser<'g, V> {
    grammar: &'g Grammar<V>,
}

impl<'g, V: SemanticValue> Parser<'g, V> {
    fn symbol<'a>(&self, symbol: &Symbol, mut pos: Position<'a>) -> Result<(Position<'a>, V), Error> {
        let start = pos.idx;
        match symbol {
            Symbol::Literal(lit) => {
                if pos.match_str(lit) {
                    Ok((pos, V::text(lit)))
                } else {
                    Err(ParseError::new(format!(
                        "expected '{}', found {} at offset {}",
                        lit,
                        pos.found(lit.chars().count()),
                        start
                    ))
                    .into())
                }
            }
            Symbol::Regex(p) => {
                if pos.match_pattern(p) {
                    let value = V::text(&pos.input[start..pos.idx]);
                    Ok((pos, value))
                } else {
                    Err(ParseError::new(format!("expected {} at offset {}", p, start)).into())
                }
            }
            Symbol::Nonterminal(name) => {
                let prod = self
                    .grammar
                    .get(name)
                    .ok_or_else(|| Error::UndefinedProduction(name.clone()))?;
                self.production(prod, pos)
            }
        }
    }

    fn production<'a>(&self, prod: &Production<V>, pos: Position<'a>) -> Result<(Position<'a>, V), Error> {
        'rules: for (n, rule) in prod.rules.iter().enumerate() {
            trace!(production = %prod.name, alternative = n, offset = pos.idx, "trying rule {}", rule);
            let mut cur = pos.clone();
            let mut nodes = Vec::with_capacity(rule.symbols.len());
            for sym in &rule.symbols {
                match self.symbol(sym, cur.clone()) {
                    Ok((next, node)) => {
                        cur = next;
                        nodes.push(node);
                    }
                    Err(e) if e.is_backtrackable() => {
                        trace!(production = %prod.name, alternative = n, "backtracking on {}: {}", sym, e);
                        continue 'rules;
                    }
                    Err(e) => return Err(e),
                }
            }

            trace!(production = %prod.name, alternative = n, offset = cur.idx, "rule succeeded");
            let value = match &rule.transform {
                Some(tf) => tf.apply(nodes)?,
                None => V::list(nodes),
            };
            return Ok((cur, value));
        }

        let mut visiting = HashSet::new();
        visiting.insert(prod.name.as_str());
        let mut descs = Vec::new();
        describe_production(self.grammar, prod, &mut visiting, &mut descs);
        Err(ParseError::new(format!(
            "expected {} at offset {}",
            descs.join(" or "),
            pos.idx
        ))
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grammar::{Rule, Transform, TransformError, Value};

    fn build(prods: Vec<(&str, Vec<Vec<Symbol>>)>) -> Grammar {
        Grammar::new(
            prods
                .into_iter()
                .map(|(name, rules)| {
                    Production::new(name, rules.into_iter().map(Rule::new).collect())
                })
                .collect(),
        )
        .unwrap()
    }

    fn lit(s: &str) -> Symbol {
        Symbol::literal(s)
    }

    fn nt(s: &str) -> Symbol {
        Symbol::nonterminal(s)
    }

    fn re(s: &str) -> Symbol {
        Symbol::regex(s).unwrap()
    }

    fn parse_err(res: Result<Outcome<Value>, Error>) -> String {
        match res {
            Err(Error::Parse(e)) => e.message().to_owned(),
            other => panic!("expected parse error, got: {:?}", other),
        }
    }

    #[test]
    fn first_alternative_wins() {
        let g = build(vec![("X", vec![vec![lit("a")], vec![lit("ab")]])]);
        let got = parse(&g, "X", "ab", 0).unwrap();
        assert_eq!(got.offset, 1);
        assert_eq!(got.value, Value::List(vec!["a".into()]));
    }

    #[test]
    fn backtracks_to_later_alternative() {
        let g = build(vec![(
            "X",
            vec![vec![lit("a"), lit("c")], vec![lit("a"), lit("b")]],
        )]);
        let got = parse(&g, "X", "abz", 0).unwrap();
        assert_eq!(got.offset, 2);
        assert_eq!(got.value, Value::List(vec!["a".into(), "b".into()]));
    }

    #[test]
    fn parse_at_offset() {
        let g = build(vec![("X", vec![vec![re("[0-9]+")]])]);
        let got = parse(&g, "X", "ab123", 2).unwrap();
        assert_eq!(got.offset, 5);
        assert_eq!(got.value, Value::List(vec!["123".into()]));
    }

    #[test]
    fn parse_symbol_terminals() {
        let g = build(vec![("X", vec![vec![lit("x")]])]);
        let got = parse_symbol(&g, &lit("he"), "hello", 0).unwrap();
        assert_eq!(
            got,
            Outcome {
                offset: 2,
                value: "he".into()
            }
        );
        let got = parse_symbol(&g, &re("l+"), "hello", 2).unwrap();
        assert_eq!(got.offset, 4);
        assert_eq!(got.value, "ll".into());
    }

    #[test]
    fn literal_errors() {
        let g = build(vec![("X", vec![vec![lit("a")]])]);
        let tests = vec![
            (lit("abc"), "abd", "expected 'abc', found 'abd' at offset 0"),
            (lit("abc"), "ab", "expected 'abc', found 'ab' at offset 0"),
            (lit("a"), "", "expected 'a', found end of input at offset 0"),
        ];
        for (sym, input, msg) in tests {
            assert_eq!(parse_err(parse_symbol(&g, &sym, input, 0)), msg);
        }
    }

    #[test]
    fn production_errors() {
        let g = build(vec![
            ("S", vec![vec![lit("("), nt("S"), lit(")")], vec![nt("atom")]]),
            ("atom", vec![vec![re("[A-Z]+")], vec![lit("nil")]]),
            ("X", vec![vec![lit("a")]]),
        ]);
        assert_eq!(
            parse_err(parse(&g, "S", "123", 0)),
            "expected '(' or /[A-Z]+/ or 'nil' at offset 0"
        );
        assert_eq!(parse_err(parse(&g, "X", "b", 0)), "expected 'a' at offset 0");
    }

    #[test]
    fn expected_descriptions() {
        let g = build(vec![
            ("A", vec![vec![nt("B"), lit("x")], vec![lit("a")]]),
            ("B", vec![vec![nt("A")], vec![re("b+")]]),
        ]);
        assert_eq!(expected(&g, &nt("A")), "A or /b+/ or 'a'");
        assert_eq!(expected(&g, &nt("B")), "B or 'a' or /b+/");
        assert_eq!(expected(&g, &lit("q")), "'q'");
        assert_eq!(expected(&g, &nt("missing")), "missing");

        let g = build(vec![
            ("X", vec![vec![nt("Y"), lit("a")], vec![nt("Y"), lit("b")]]),
            ("Y", vec![vec![lit("y")]]),
        ]);
        assert_eq!(expected(&g, &nt("X")), "'y'");
    }

    #[test]
    fn incomplete_match() {
        let g = build(vec![("X", vec![vec![lit("a"), lit("b")]])]);
        assert_eq!(parse(&g, "X", "abc", 0).unwrap().offset, 2);
        assert_eq!(
            parse_all(&g, "X", "abc").unwrap_err(),
            Error::Incomplete {
                consumed: 2,
                total: 3
            }
        );
        assert_eq!(
            parse_all(&g, "X", "ab").unwrap(),
            Value::List(vec!["a".into(), "b".into()])
        );
    }

    #[test]
    fn undefined_production_is_not_backtracked() {
        let g = build(vec![("X", vec![vec![nt("Y")], vec![lit("a")]])]);
        assert_eq!(
            parse(&g, "X", "a", 0).unwrap_err(),
            Error::UndefinedProduction("Y".to_owned())
        );
        assert_eq!(
            parse(&g, "Z", "a", 0).unwrap_err(),
            Error::UndefinedProduction("Z".to_owned())
        );
    }

    #[test]
    fn transforms() {
        let first: Transform<Value> = Transform::new("first", |mut nodes| Ok(nodes.remove(0)));
        let g = Grammar::new(vec![Production::new(
            "X",
            vec![Rule::new(vec![lit("a"), lit("b")]).with_transform(first)],
        )])
        .unwrap();
        assert_eq!(parse_all(&g, "X", "ab").unwrap(), "a".into());
    }

    #[test]
    fn transform_errors_are_not_backtracked() {
        let fail: Transform<Value> =
            Transform::new("fail", |_| Err(TransformError("nope".to_owned())));
        let g = Grammar::new(vec![Production::new(
            "X",
            vec![
                Rule::new(vec![lit("a")]).with_transform(fail),
                Rule::new(vec![lit("a")]),
            ],
        )])
        .unwrap();
        assert_eq!(
            parse(&g, "X", "a", 0).unwrap_err(),
            Error::Transform(TransformError("nope".to_owned()))
        );
    }

    #[test]
    fn bad_offset() {
        let g = build(vec![("X", vec![vec![lit("a")]])]);
        assert_eq!(
            parse(&g, "X", "a", 2).unwrap_err(),
            Error::OffsetOutOfBounds { offset: 2, len: 1 }
        );
    }
}

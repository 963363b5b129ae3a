use nom::{
    branch::alt,
    bytes::complete::{tag, take_while},
    character::complete::{alpha1, alphanumeric1, char, digit1, multispace0},
    combinator::{map, map_res, opt, recognize},
    multi::{many0, separated_list0},
    sequence::{delimited, pair, preceded},
    IResult,
};

use crate::expr::Expr;

fn ws<'a, O, F>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}

pub fn expr(input: &str) -> IResult<&str, Expr> {
    let (rem, first) = term(input)?;
    let (rem, rest) = many0(preceded(ws(char('+')), term))(rem)?;
    let expr = rest.into_iter().fold(first, |lhs, rhs| {
        Expr::Concat(Box::new(lhs), Box::new(rhs))
    });
    Ok((rem, expr))
}

pub fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ))(input)
}

fn term(input: &str) -> IResult<&str, Expr> {
    let (rem, atom) = preceded(multispace0, atom)(input)?;
    let (rem, idxs) = many0(delimited(ws(char('[')), integer, ws(char(']'))))(rem)?;
    let expr = idxs
        .into_iter()
        .fold(atom, |expr, idx| Expr::Index(Box::new(expr), idx));
    Ok((rem, expr))
}

fn integer(input: &str) -> IResult<&str, i64> {
    map_res(recognize(pair(opt(char('-')), digit1)), |s: &str| {
        s.parse::<i64>()
    })(input)
}

fn atom(input: &str) -> IResult<&str, Expr> {
    alt((node, nodes, text, list, call, group))(input)
}

fn node(input: &str) -> IResult<&str, Expr> {
    map_res(preceded(char('$'), digit1), |s: &str| {
        s.parse::<usize>().map(Expr::Node)
    })(input)
}

fn nodes(input: &str) -> IResult<&str, Expr> {
    map(char('$'), |_| Expr::Nodes)(input)
}

fn text(input: &str) -> IResult<&str, Expr> {
    let (rem, matched) = alt((
        delimited(char('\''), take_while(|c: char| c != '\''), char('\'')),
        delimited(char('"'), take_while(|c: char| c != '"'), char('"')),
    ))(input)?;
    Ok((rem, Expr::Text(matched.to_owned())))
}

fn args(input: &str) -> IResult<&str, Vec<Expr>> {
    separated_list0(ws(char(',')), expr)(input)
}

fn list(input: &str) -> IResult<&str, Expr> {
    map(delimited(char('['), args, ws(char(']'))), Expr::List)(input)
}

fn call(input: &str) -> IResult<&str, Expr> {
    let (rem, (name, args)) = pair(identifier, delimited(ws(char('(')), args, ws(char(')'))))(input)?;
    Ok((rem, Expr::Call(name.to_owned(), args)))
}

fn group(input: &str) -> IResult<&str, Expr> {
    delimited(char('('), expr, ws(char(')')))(input)
}

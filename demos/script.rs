//! Grammar of a small expression-oriented scripting language.
//!
//! Run with `cargo run --example script`.

use descent::prelude::*;
use descent::string::char_with_prop;
use descent::string::prop::{XidContinue, XidStart};
use descent::ParseError;
use std::iter;

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Bool(bool),
    Number(f64),
    Str(String),
    Tuple(Vec<Expr>),
    Block {
        stats: Vec<Stat>,
        last: Option<Box<Expr>>,
    },
    If {
        test: Box<Expr>,
        then: Box<Expr>,
        otherwise: Option<Box<Expr>>,
    },
    Ident(String),
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Property {
        target: Box<Expr>,
        name: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
enum Stat {
    Let { name: String, init: Expr },
    DefFn { name: String, params: Vec<String>, body: Expr },
    Return(Option<Expr>),
    While { test: Expr, body: Expr },
    Break,
    Expr(Expr),
}

/// A call or property access following an expression.
#[derive(Debug, Clone)]
enum Postfix {
    Call(Vec<Expr>),
    Property(String),
}

impl Postfix {
    fn apply(self, target: Expr) -> Expr {
        let target = Box::new(target);
        match self {
            Self::Call(args) => Expr::Call {
                callee: target,
                args,
            },
            Self::Property(name) => Expr::Property { target, name },
        }
    }
}

type Cx<'a> = Context<'a, str>;

fn ws(pos: usize, cx: &mut Cx<'_>) -> PResult<()> {
    many_accum(
        satisfy(|ch: &char| ch.is_whitespace()),
        || (),
        |(), _| (),
        ManyOptions::new(),
    )
    .parse_at(pos, cx)
}

/// Like `sep_by`, but also consumes a trailing separator.
fn sep_by_trailing<P, Q>(parser: P, sep: Q) -> impl Parse<str, Parsed = Vec<P::Parsed>>
where
    P: Parse<str>,
    Q: Parse<str>,
{
    qo(move |p: &mut Perform<'_, '_, str>| {
        let mut items = Vec::new();
        p.repeat(|p| {
            items.push(p.perform(&parser)?);
            p.perform_with(&sep, PerformOptions::partial())?;
            Ok(())
        });
        Ok(items)
    })
}

fn ident(pos: usize, cx: &mut Cx<'_>) -> PResult<String> {
    char_with_prop(XidStart)
        .or(el('_'))
        .pair(char_with_prop(XidContinue).many())
        .map(|(first, rest)| iter::once(first).chain(rest).collect())
        .label("identifier")
        .parse_at(pos, cx)
}

fn boolean(pos: usize, cx: &mut Cx<'_>) -> PResult<Expr> {
    choice!(
        literal("true").with_value(true),
        literal("false").with_value(false),
    )
    .map(Expr::Bool)
    .parse_at(pos, cx)
}

fn digits(pos: usize, cx: &mut Cx<'_>) -> PResult<String> {
    many_accum(
        one_of("0123456789"),
        String::new,
        |mut digits: String, digit| {
            digits.push(digit);
            digits
        },
        ManyOptions::new().min(1),
    )
    .parse_at(pos, cx)
}

fn number(pos: usize, cx: &mut Cx<'_>) -> PResult<Expr> {
    seq!(
        one_of("+-").option('+'),
        digits,
        el('.').then(digits).option(String::new()),
    )
    .map(|(sign, int, frac)| {
        let value = format!("{sign}{int}.{frac}0").parse().unwrap_or(f64::NAN);
        Expr::Number(value)
    })
    .label("number")
    .parse_at(pos, cx)
}

fn string(pos: usize, cx: &mut Cx<'_>) -> PResult<Expr> {
    none_of("\"\\")
        .or(el('\\').then(any))
        .many()
        .between(el('"'), el('"'))
        .map(|chars| Expr::Str(chars.into_iter().collect()))
        .parse_at(pos, cx)
}

fn tuple_items(pos: usize, cx: &mut Cx<'_>) -> PResult<Vec<Expr>> {
    sep_by_trailing(expr, el(','))
        .skip(ws)
        .between(el('('), el(')'))
        .parse_at(pos, cx)
}

fn block(pos: usize, cx: &mut Cx<'_>) -> PResult<Expr> {
    stat.many()
        .and_map(expr.opt(), |stats, last| Expr::Block {
            stats,
            last: last.map(Box::new),
        })
        .skip(ws)
        .between(el('{'), el('}'))
        .parse_at(pos, cx)
}

fn if_expr(pos: usize, cx: &mut Cx<'_>) -> PResult<Expr> {
    seq!(
        literal("if")
            .then(ws)
            .then(expr.between(el('('), el(')'))),
        expr,
        literal("else").then(expr).opt(),
    )
    .map(|(test, then, otherwise)| Expr::If {
        test: Box::new(test),
        then: Box::new(then),
        otherwise: otherwise.map(Box::new),
    })
    .parse_at(pos, cx)
}

fn tail(head: Expr) -> impl Parse<str, Parsed = Expr> {
    choice!(
        tuple_items.map(Postfix::Call),
        el('.').then(ws).then(ident).map(Postfix::Property),
    )
    .skip(ws)
    .many()
    .map(move |tails| {
        tails
            .into_iter()
            .fold(head.clone(), |expr, postfix| postfix.apply(expr))
    })
}

fn expr(pos: usize, cx: &mut Cx<'_>) -> PResult<Expr> {
    choice!(
        boolean,
        number,
        string,
        tuple_items.map(Expr::Tuple),
        block,
        if_expr,
        ident.map(Expr::Ident),
    )
    .between(ws, ws)
    .flat_map(tail)
    .parse_at(pos, cx)
}

fn stat(pos: usize, cx: &mut Cx<'_>) -> PResult<Stat> {
    let let_stat = literal("let")
        .then(ident.between(ws, ws))
        .skip(el('='))
        .and_map(expr, |name, init| Stat::Let { name, init });
    let def_fn = seq!(
        literal("fn").then(ident.between(ws, ws)),
        sep_by(ident.between(ws, ws), el(','), ManyOptions::new())
            .skip(ws)
            .between(el('('), el(')')),
        expr,
    )
    .map(|(name, params, body)| Stat::DefFn { name, params, body });
    let return_stat = literal("return")
        .then(expr.opt())
        .skip(ws)
        .map(Stat::Return);
    let while_stat = literal("while")
        .skip(ws)
        .then(expr.between(el('('), el(')')))
        .and_map(expr, |test, body| Stat::While { test, body });
    let break_stat = literal("break").with_value(Stat::Break).skip(ws);

    choice!(
        let_stat,
        def_fn,
        return_stat,
        while_stat,
        break_stat,
        expr.map(Stat::Expr),
    )
    .skip(el(';'))
    .between(ws, ws)
    .parse_at(pos, cx)
}

const SCRIPT: &str = r#"
    fn fib(n) {
        if (lt(n, 2)) { return n; } else { return add(fib(sub(n, 1)), fib(sub(n, 2))); };
    };
    let greeting = "hello, \"world\"";
    let pair = (greeting.len, -1.5,);
    while (true) {
        print(fib(10), pair);
        break;
    };
"#;

fn main() -> Result<(), ParseError> {
    let program = stat.many().skip(eoi).parse(SCRIPT).into_result()?;
    for stat in &program {
        println!("{stat:#?}");
    }

    let err = stat.many().skip(eoi).parse("let = 1;").into_result();
    if let Err(err) = err {
        println!("{err}");
    }
    Ok(())
}

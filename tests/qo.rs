use descent::prelude::*;
use pretty_assertions::assert_eq;

type P<'c, 'a> = Perform<'c, 'a, str>;

const INPUTS: [&str; 8] = ["", "a", "ab", "abc", "b", "ba", "aab", "xyz"];

fn assert_same<L, R, T>(lhs: L, rhs: R)
where
    L: Parse<str, Parsed = T>,
    R: Parse<str, Parsed = T>,
    T: core::fmt::Debug + PartialEq,
{
    for src in INPUTS {
        assert_eq!(lhs.parse(src), rhs.parse(src), "{src:?}");
    }
}

#[test]
fn pure_is_ok() {
    assert_same(pure(7), qo(|_: &mut P<'_, '_>| Ok(7)));
}

#[test]
fn map_is_perform_then_apply() {
    assert_same(
        el('a').map(|ch: char| ch.to_ascii_uppercase()),
        qo(|p: &mut P<'_, '_>| Ok(p.perform(&el('a'))?.to_ascii_uppercase())),
    );
}

#[test]
fn flat_map_is_nested_perform() {
    let next = |ch: char| el(if ch == 'a' { 'b' } else { 'a' });
    assert_same(
        any.flat_map(next),
        qo(move |p: &mut P<'_, '_>| {
            let ch = p.perform(&any)?;
            p.perform(&next(ch))
        }),
    );
}

#[test]
fn then_and_skip() {
    assert_same(
        el('a').then(el('b')),
        qo(|p: &mut P<'_, '_>| {
            p.perform(&el('a'))?;
            p.perform(&el('b'))
        }),
    );
    assert_same(
        el('a').skip(el('b')),
        qo(|p: &mut P<'_, '_>| {
            let a = p.perform(&el('a'))?;
            p.perform(&el('b'))?;
            Ok(a)
        }),
    );
}

#[test]
fn between_is_three_steps() {
    assert_same(
        el('b').between(el('a'), el('c')),
        qo(|p: &mut P<'_, '_>| {
            p.perform(&el('a'))?;
            let b = p.perform(&el('b'))?;
            p.perform(&el('c'))?;
            Ok(b)
        }),
    );
}

#[test]
fn or_is_attempt() {
    let ab = || el('a').then(el('b')).with_value(1);
    assert_same(
        ab().or(el('a').with_value(2)),
        qo(move |p: &mut P<'_, '_>| match p.attempt(|p| p.perform(&ab())) {
            Some(value) => Ok(value),
            None => p.perform(&el('a').with_value(2)),
        }),
    );
}

#[test]
fn option_is_option_or() {
    assert_same(
        el('a').option('-').pair(any),
        qo(|p: &mut P<'_, '_>| {
            let a = p.option_or(&el('a'), '-');
            let next = p.perform(&any)?;
            Ok((a, next))
        }),
    );
}

#[test]
fn many_is_perform_many() {
    assert_same(
        el('a').many().skip(el('b')),
        qo(|p: &mut P<'_, '_>| {
            let aa = p.many(&el('a'));
            p.perform(&el('b'))?;
            Ok(aa)
        }),
    );
}

#[test]
fn many_is_repeat() {
    assert_same(
        el('a').many().map(|aa| aa.len()),
        qo(|p: &mut P<'_, '_>| {
            let mut count = 0;
            p.repeat(|p| {
                p.perform(&el('a'))?;
                count += 1;
                Ok(())
            });
            Ok(count)
        }),
    );
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Int(i32),
    Text(&'static str),
}

#[test]
fn token_source() {
    let p = qo(|p: &mut Perform<'_, '_, [Token]>| {
        let a = p.perform(&satisfy(|t: &Token| matches!(t, Token::Int(_))))?;
        let b = p.perform(&satisfy(|t: &Token| matches!(t, Token::Text(_))))?;
        Ok((a, b))
    });
    assert_eq!(
        p.parse(&[Token::Int(5), Token::Text("*")][..]),
        ParseResult::Success {
            index: 2,
            value: (Token::Int(5), Token::Text("*")),
        }
    );
    assert!(!p.parse(&[Token::Int(20), Token::Int(5)][..]).is_success());
}

//! Generic parser and combinator building blocks.
//!
//! This module provides the combinators that most grammars are built from.
//! Everything here works with any [`Source`], whether text or tokens.
//!
//! Most functions that take a parser as a parameter and produce a transformed parser
//! (A.K.A. combinators) are also available as methods on the [`Parse`] trait.

use crate::{Context, Expectation, Fail, PResult, PResultExt, Parse, Pattern, Source, Span};
use alloc::{borrow::Cow, format, vec::Vec};
use core::cell::OnceCell;
use core::fmt::Debug;
use core::marker::PhantomData;

/// Creates a parser that matches exactly one of its arguments.
///
/// [`choice!`](choice!) accepts any number of parsers as arguments, which may
/// all be of different types as long as they produce the same value type. The
/// alternatives are tried in order from the same position and the first one to
/// succeed wins.
///
/// Also see [`either`], which [`choice!`](choice!) is a variadic version of, and
/// [`choice()`], which takes a list of parsers of one type.
///
/// # Example
///
/// ```
/// use descent::{basic::{choice, literal}, Context, PResult, Parse};
///
/// fn keyword(pos: usize, cx: &mut Context<'_, str>) -> PResult<u8> {
///     choice!(
///         literal("let").with_value(0),
///         literal("fn").with_value(1),
///         literal("if").with_value(2),
///     )
///     .parse_at(pos, cx)
/// }
///
/// assert_eq!(keyword.parse("fn main").into_value(), Some(1));
/// ```
pub use descent_macros::choice;

/// Creates a parser that matches a sequence of parsers.
///
/// [`seq!`](seq!) accepts any number of parsers as arguments. The returned parser
/// applies each of them in order and produces their values as a tuple. If any one
/// of them fails, the whole sequence fails.
///
/// Also see [`pair`], which [`seq!`](seq!) is a variadic version of, and [`seq()`],
/// which takes a list of parsers of one type and supports partial matches.
///
/// # Example
///
/// ```
/// use descent::{basic::{el, seq, satisfy}, Context, PResult, Parse};
///
/// fn range(pos: usize, cx: &mut Context<'_, str>) -> PResult<(char, char, char)> {
///     let digit = || satisfy(|ch: &char| ch.is_ascii_digit());
///     seq!(digit(), el('-'), digit()).parse_at(pos, cx)
/// }
///
/// assert_eq!(range.parse("1-9").into_value(), Some(('1', '-', '9')));
/// ```
pub use descent_macros::seq;

#[derive(Debug, Clone)]
struct PureParser<T>(T);

impl<T, S> Parse<S> for PureParser<T>
where
    T: Clone,
    S: Source + ?Sized,
{
    type Parsed = T;

    fn run(&self, pos: usize, _cx: &mut Context<'_, S>) -> PResult<T> {
        PResult::success(self.0.clone(), pos)
    }
}

/// Creates a parser that succeeds without consuming input, producing a clone
/// of `value`.
#[inline]
pub const fn pure<T, S>(value: T) -> impl Parse<S, Parsed = T>
where
    T: Clone,
    S: Source + ?Sized,
{
    PureParser(value)
}

#[derive(Debug, Clone)]
struct ConstantParser<F>(F);

impl<F, T, S> Parse<S> for ConstantParser<F>
where
    F: Fn() -> T,
    S: Source + ?Sized,
{
    type Parsed = T;

    fn run(&self, pos: usize, _cx: &mut Context<'_, S>) -> PResult<T> {
        PResult::success((self.0)(), pos)
    }
}

/// Creates a parser that succeeds without consuming input, producing the
/// result of `const_fn`.
///
/// Unlike [`pure`], the value does not need to be [`Clone`].
#[inline]
pub const fn constant<F, T, S>(const_fn: F) -> impl Parse<S, Parsed = T>
where
    F: Fn() -> T,
    S: Source + ?Sized,
{
    ConstantParser(const_fn)
}

#[derive(Debug, Clone)]
struct FailParser<T>(Option<Cow<'static, str>>, PhantomData<fn() -> T>);

impl<T, S> Parse<S> for FailParser<T>
where
    S: Source + ?Sized,
{
    type Parsed = T;

    fn run(&self, pos: usize, cx: &mut Context<'_, S>) -> PResult<T> {
        match &self.0 {
            Some(desc) => cx.expected(pos, desc.clone()),
            None => cx.unknown(pos),
        }
        Err(Fail(pos))
    }
}

/// Creates a parser that always fails, reporting [`Expectation::Unknown`].
#[inline]
pub const fn fail<T, S>() -> impl Parse<S, Parsed = T>
where
    S: Source + ?Sized,
{
    FailParser(None, PhantomData)
}

/// Creates a parser that always fails, reporting that `desc` was expected.
///
/// # Example
/// ```
/// # use descent::{basic::fail_expected, Context, Expectation, PResult, Parse};
/// fn never(pos: usize, cx: &mut Context<'_, str>) -> PResult<()> {
///     fail_expected("something else").parse_at(pos, cx)
/// }
///
/// assert_eq!(
///     never.parse("abc").expectations(),
///     &[Expectation::expected(0, "something else")],
/// );
/// ```
#[inline]
pub fn fail_expected<T, S, D>(desc: D) -> impl Parse<S, Parsed = T>
where
    S: Source + ?Sized,
    D: Into<Cow<'static, str>>,
{
    FailParser(Some(desc.into()), PhantomData)
}

#[derive(Debug, Clone)]
struct MapParser<P, F>(P, F);

impl<P, F, R, S> Parse<S> for MapParser<P, F>
where
    P: Parse<S>,
    F: Fn(P::Parsed) -> R,
    S: Source + ?Sized,
{
    type Parsed = R;

    fn run(&self, pos: usize, cx: &mut Context<'_, S>) -> PResult<R> {
        self.0.run(pos, cx).map_value(&self.1)
    }
}

/// Creates a parser whose parsed value is transformed.
///
/// Failure passes through unchanged.
///
/// # Example
/// ```
/// # use descent::{basic::{map, any}, Context, PResult, Parse};
/// fn code(pos: usize, cx: &mut Context<'_, [u8]>) -> PResult<u32> {
///     map(any, |byte: u8| u32::from(byte) * 2).parse_at(pos, cx)
/// }
///
/// assert_eq!(code.parse(&[21u8][..]).into_value(), Some(42));
/// ```
#[inline]
pub const fn map<P, F, R, S>(parser: P, map_fn: F) -> impl Parse<S, Parsed = R>
where
    P: Parse<S>,
    F: Fn(P::Parsed) -> R,
    S: Source + ?Sized,
{
    MapParser(parser, map_fn)
}

#[derive(Debug, Clone)]
struct WithValueParser<P, T>(P, T);

impl<P, T, S> Parse<S> for WithValueParser<P, T>
where
    P: Parse<S>,
    T: Clone,
    S: Source + ?Sized,
{
    type Parsed = T;

    fn run(&self, pos: usize, cx: &mut Context<'_, S>) -> PResult<T> {
        self.0.run(pos, cx).map_value(|_| self.1.clone())
    }
}

/// Creates a parser whose parsed value is replaced with a clone of `value`.
#[inline]
pub const fn with_value<P, T, S>(parser: P, value: T) -> impl Parse<S, Parsed = T>
where
    P: Parse<S>,
    T: Clone,
    S: Source + ?Sized,
{
    WithValueParser(parser, value)
}

#[derive(Debug, Clone)]
struct FlatMapParser<P, C>(P, C);

impl<P, C, R, S> Parse<S> for FlatMapParser<P, C>
where
    P: Parse<S>,
    C: Fn(P::Parsed) -> R,
    R: Parse<S>,
    S: Source + ?Sized,
{
    type Parsed = R::Parsed;

    fn run(&self, pos: usize, cx: &mut Context<'_, S>) -> PResult<R::Parsed> {
        let state = self.0.run(pos, cx)?;
        (self.1)(state.value).run(state.position, cx)
    }
}

/// Creates a parser that runs `parser`, then runs the parser produced by
/// `combinator` from where the first one stopped.
///
/// The overall position is the second parser's ending position. A failure of
/// either stage fails the whole.
#[inline]
pub const fn flat_map<P, C, R, S>(parser: P, combinator: C) -> impl Parse<S, Parsed = R::Parsed>
where
    P: Parse<S>,
    C: Fn(P::Parsed) -> R,
    R: Parse<S>,
    S: Source + ?Sized,
{
    FlatMapParser(parser, combinator)
}

#[derive(Debug, Clone)]
struct AndMapParser<P, Q, F>(P, Q, F);

impl<P, Q, F, R, S> Parse<S> for AndMapParser<P, Q, F>
where
    P: Parse<S>,
    Q: Parse<S>,
    F: Fn(P::Parsed, Q::Parsed) -> R,
    S: Source + ?Sized,
{
    type Parsed = R;

    fn run(&self, pos: usize, cx: &mut Context<'_, S>) -> PResult<R> {
        let first = self.0.run(pos, cx)?;
        let second = self.1.run(first.position, cx)?;
        PResult::success((self.2)(first.value, second.value), second.position)
    }
}

/// Creates a parser that runs two parsers in order and combines their values.
#[inline]
pub const fn and_map<P, Q, F, R, S>(first: P, second: Q, combine_fn: F) -> impl Parse<S, Parsed = R>
where
    P: Parse<S>,
    Q: Parse<S>,
    F: Fn(P::Parsed, Q::Parsed) -> R,
    S: Source + ?Sized,
{
    AndMapParser(first, second, combine_fn)
}

/// Creates a parser that runs two parsers in order, keeping both values.
#[inline]
pub const fn pair<P, Q, S>(first: P, second: Q) -> impl Parse<S, Parsed = (P::Parsed, Q::Parsed)>
where
    P: Parse<S>,
    Q: Parse<S>,
    S: Source + ?Sized,
{
    AndMapParser(first, second, pair_values::<P::Parsed, Q::Parsed>)
}

/// Creates a parser that runs two parsers in order, keeping the second value.
#[inline]
pub const fn then<P, Q, S>(first: P, second: Q) -> impl Parse<S, Parsed = Q::Parsed>
where
    P: Parse<S>,
    Q: Parse<S>,
    S: Source + ?Sized,
{
    AndMapParser(first, second, second_value::<P::Parsed, Q::Parsed>)
}

/// Creates a parser that runs two parsers in order, keeping the first value.
#[inline]
pub const fn skip<P, Q, S>(first: P, second: Q) -> impl Parse<S, Parsed = P::Parsed>
where
    P: Parse<S>,
    Q: Parse<S>,
    S: Source + ?Sized,
{
    AndMapParser(first, second, first_value::<P::Parsed, Q::Parsed>)
}

fn pair_values<A, B>(a: A, b: B) -> (A, B) {
    (a, b)
}

fn first_value<A, B>(a: A, _: B) -> A {
    a
}

fn second_value<A, B>(_: A, b: B) -> B {
    b
}

#[derive(Debug, Clone)]
struct BetweenParser<P, L, R>(P, L, R);

impl<P, L, R, S> Parse<S> for BetweenParser<P, L, R>
where
    P: Parse<S>,
    L: Parse<S>,
    R: Parse<S>,
    S: Source + ?Sized,
{
    type Parsed = P::Parsed;

    fn run(&self, pos: usize, cx: &mut Context<'_, S>) -> PResult<P::Parsed> {
        let pre = self.1.run(pos, cx)?;
        let inner = self.0.run(pre.position, cx)?;
        let post = self.2.run(inner.position, cx)?;
        PResult::success(inner.value, post.position)
    }
}

/// Creates a parser that runs `pre`, `parser` and `post` in order, keeping the
/// value of `parser`.
#[inline]
pub const fn between<P, L, R, S>(parser: P, pre: L, post: R) -> impl Parse<S, Parsed = P::Parsed>
where
    P: Parse<S>,
    L: Parse<S>,
    R: Parse<S>,
    S: Source + ?Sized,
{
    BetweenParser(parser, pre, post)
}

#[derive(Debug, Clone)]
struct EitherParser<P, Q>(P, Q);

impl<P, Q, S> Parse<S> for EitherParser<P, Q>
where
    P: Parse<S>,
    Q: Parse<S, Parsed = P::Parsed>,
    S: Source + ?Sized,
{
    type Parsed = P::Parsed;

    fn run(&self, pos: usize, cx: &mut Context<'_, S>) -> PResult<P::Parsed> {
        match self.0.run(pos, cx) {
            Ok(state) => Ok(state),
            Err(_) => self.1.run(pos, cx).map_err(|_| Fail(pos)),
        }
    }
}

/// Creates a parser that tries `first`, then `second` from the same position.
///
/// Both alternatives report their failures, so the final diagnostics come from
/// whichever reached farther.
#[inline]
pub const fn either<P, Q, S>(first: P, second: Q) -> impl Parse<S, Parsed = P::Parsed>
where
    P: Parse<S>,
    Q: Parse<S, Parsed = P::Parsed>,
    S: Source + ?Sized,
{
    EitherParser(first, second)
}

#[derive(Debug, Clone)]
struct ChoiceParser<C, P>(C, PhantomData<fn() -> P>);

impl<C, P, S> Parse<S> for ChoiceParser<C, P>
where
    C: AsRef<[P]>,
    P: Parse<S>,
    S: Source + ?Sized,
{
    type Parsed = P::Parsed;

    fn run(&self, pos: usize, cx: &mut Context<'_, S>) -> PResult<P::Parsed> {
        let parsers = self.0.as_ref();
        for parser in parsers {
            if let Ok(state) = parser.run(pos, cx) {
                return Ok(state);
            }
        }
        if parsers.is_empty() {
            cx.add_error(pos);
        }
        Err(Fail(pos))
    }
}

/// Creates a parser that tries each parser in a list, in order, from the same
/// position, producing the result of the first one to succeed.
///
/// All parsers in the list have the same type. Use [`BoxedParser`](crate::rule::BoxedParser)
/// to mix parsers of different types, or [`choice!`](choice!) for a fixed number of
/// alternatives. An empty list always fails.
///
/// # Example
/// ```
/// # use descent::{basic::{choice, literal}, Context, PResult, Parse};
/// fn unit(pos: usize, cx: &mut Context<'_, str>) -> PResult<&'static str> {
///     choice([literal("ms"), literal("s"), literal("m")]).parse_at(pos, cx)
/// }
///
/// assert_eq!(unit.parse("ms").into_value(), Some("ms"));
/// assert_eq!(unit.parse("m").into_value(), Some("m"));
/// ```
#[inline]
pub const fn choice<C, P, S>(parsers: C) -> impl Parse<S, Parsed = P::Parsed>
where
    C: AsRef<[P]>,
    P: Parse<S>,
    S: Source + ?Sized,
{
    ChoiceParser(parsers, PhantomData)
}

#[derive(Debug, Clone)]
struct OptionParser<P, T>(P, T);

impl<P, T, S> Parse<S> for OptionParser<P, T>
where
    P: Parse<S, Parsed = T>,
    T: Clone,
    S: Source + ?Sized,
{
    type Parsed = T;

    fn run(&self, pos: usize, cx: &mut Context<'_, S>) -> PResult<T> {
        match self.0.run(pos, cx) {
            Ok(state) => Ok(state),
            Err(_) => PResult::success(self.1.clone(), pos),
        }
    }
}

/// Creates a parser that produces a clone of `default` without consuming input
/// when `parser` fails.
#[inline]
pub const fn option<P, S>(parser: P, default: P::Parsed) -> impl Parse<S, Parsed = P::Parsed>
where
    P: Parse<S>,
    P::Parsed: Clone,
    S: Source + ?Sized,
{
    OptionParser(parser, default)
}

#[derive(Debug, Clone)]
struct OptParser<P>(P);

impl<P, S> Parse<S> for OptParser<P>
where
    P: Parse<S>,
    S: Source + ?Sized,
{
    type Parsed = Option<P::Parsed>;

    fn run(&self, pos: usize, cx: &mut Context<'_, S>) -> PResult<Option<P::Parsed>> {
        match self.0.run(pos, cx) {
            Ok(state) => Ok(state.map(Some)),
            Err(_) => PResult::success(None, pos),
        }
    }
}

/// Creates a parser that produces [`None`] without consuming input when
/// `parser` fails.
#[inline]
pub const fn opt<P, S>(parser: P) -> impl Parse<S, Parsed = Option<P::Parsed>>
where
    P: Parse<S>,
    S: Source + ?Sized,
{
    OptParser(parser)
}

/// Options for [`seq()`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SeqOptions {
    /// Keep the values and position reached so far when a parser fails,
    /// instead of failing the whole sequence.
    pub allow_partial: bool,
}

impl SeqOptions {
    pub const fn new() -> Self {
        Self {
            allow_partial: false,
        }
    }

    /// Options that accept a prefix of the sequence.
    pub const fn partial() -> Self {
        Self {
            allow_partial: true,
        }
    }
}

#[derive(Debug, Clone)]
struct SeqParser<C, P>(C, SeqOptions, PhantomData<fn() -> P>);

impl<C, P, S> Parse<S> for SeqParser<C, P>
where
    C: AsRef<[P]>,
    P: Parse<S>,
    S: Source + ?Sized,
{
    type Parsed = Vec<P::Parsed>;

    fn run(&self, pos: usize, cx: &mut Context<'_, S>) -> PResult<Vec<P::Parsed>> {
        let parsers = self.0.as_ref();
        let mut values = Vec::with_capacity(parsers.len());
        let mut cur = pos;
        for parser in parsers {
            match parser.run(cur, cx) {
                Ok(state) => {
                    values.push(state.value);
                    cur = state.position;
                }
                Err(_) if self.1.allow_partial => break,
                Err(fail) => return Err(fail),
            }
        }
        PResult::success(values, cur)
    }
}

/// Creates a parser that runs each parser in a list in order, collecting their
/// values.
///
/// With [`SeqOptions::partial`], a failing element ends the sequence early and
/// the values collected so far are produced, possibly none at all.
///
/// # Example
/// ```
/// # use descent::{basic::{seq, el, SeqOptions}, Context, PResult, Parse};
/// fn abc(pos: usize, cx: &mut Context<'_, str>) -> PResult<Vec<char>> {
///     seq([el('a'), el('b'), el('c')], SeqOptions::partial()).parse_at(pos, cx)
/// }
///
/// assert_eq!(abc.parse("abc").into_value(), Some(vec!['a', 'b', 'c']));
/// assert_eq!(abc.parse("abx").into_value(), Some(vec!['a', 'b']));
/// assert_eq!(abc.parse("abx").index(), 2);
/// ```
#[inline]
pub const fn seq<C, P, S>(parsers: C, options: SeqOptions) -> impl Parse<S, Parsed = Vec<P::Parsed>>
where
    C: AsRef<[P]>,
    P: Parse<S>,
    S: Source + ?Sized,
{
    SeqParser(parsers, options, PhantomData)
}

/// Bounds on the number of repetitions for [`many`], [`many_accum`] and
/// [`sep_by`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ManyOptions {
    /// Fewer repetitions than this is a failure.
    pub min: usize,
    /// Repetition stops once this many have matched.
    pub max: Option<usize>,
}

impl ManyOptions {
    pub const fn new() -> Self {
        Self { min: 0, max: None }
    }

    pub const fn min(self, min: usize) -> Self {
        Self { min, ..self }
    }

    pub const fn max(self, max: usize) -> Self {
        Self {
            max: Some(max),
            ..self
        }
    }

    const fn limit(&self) -> usize {
        match self.max {
            Some(max) => max,
            None => usize::MAX,
        }
    }
}

/// Iterator over the repetitions of a parser.
///
/// Ends at the first failure, at the first success that does not advance, or
/// once `limit` values were produced. Neither of the first two contributes a
/// value.
pub(crate) struct ManyIter<'p, 'c, 'a, P: ?Sized, S: Source + ?Sized> {
    parser: &'p P,
    cx: &'c mut Context<'a, S>,
    pos: usize,
    count: usize,
    limit: usize,
}

impl<'p, 'c, 'a, P, S> ManyIter<'p, 'c, 'a, P, S>
where
    P: Parse<S> + ?Sized,
    S: Source + ?Sized,
{
    pub(crate) fn new(parser: &'p P, pos: usize, cx: &'c mut Context<'a, S>, limit: usize) -> Self {
        Self {
            parser,
            cx,
            pos,
            count: 0,
            limit,
        }
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    /// Fails with the iterator's position unless at least `min` values were
    /// produced.
    fn finish<T>(self, min: usize, value: T) -> PResult<T> {
        if self.count < min {
            self.cx.add_error(self.pos);
            Err(Fail(self.pos))
        } else {
            PResult::success(value, self.pos)
        }
    }
}

impl<P, S> Iterator for ManyIter<'_, '_, '_, P, S>
where
    P: Parse<S> + ?Sized,
    S: Source + ?Sized,
{
    type Item = P::Parsed;

    fn next(&mut self) -> Option<P::Parsed> {
        if self.count >= self.limit {
            return None;
        }
        match self.parser.run(self.pos, self.cx) {
            Ok(state) if state.position > self.pos => {
                self.pos = state.position;
                self.count += 1;
                Some(state.value)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
struct ManyParser<P>(P, ManyOptions);

impl<P, S> Parse<S> for ManyParser<P>
where
    P: Parse<S>,
    S: Source + ?Sized,
{
    type Parsed = Vec<P::Parsed>;

    fn run(&self, pos: usize, cx: &mut Context<'_, S>) -> PResult<Vec<P::Parsed>> {
        let mut iter = ManyIter::new(&self.0, pos, cx, self.1.limit());
        let values = iter.by_ref().collect();
        iter.finish(self.1.min, values)
    }
}

/// Creates a parser that applies `parser` repeatedly, collecting the values.
///
/// Repetition stops at the first failure or at the first success that does not
/// consume input, neither of which contributes a value. A parser that always
/// succeeds without consuming therefore produces an empty list rather than
/// looping forever.
///
/// # Example
/// ```
/// # use descent::{basic::{many, el, ManyOptions}, Context, PResult, Parse};
/// fn xs(pos: usize, cx: &mut Context<'_, str>) -> PResult<Vec<char>> {
///     many(el('x'), ManyOptions::new().min(1).max(3)).parse_at(pos, cx)
/// }
///
/// assert_eq!(xs.parse("xxxxx").index(), 3);
/// assert!(!xs.parse("y").is_success());
/// ```
#[inline]
pub const fn many<P, S>(parser: P, options: ManyOptions) -> impl Parse<S, Parsed = Vec<P::Parsed>>
where
    P: Parse<S>,
    S: Source + ?Sized,
{
    ManyParser(parser, options)
}

#[derive(Debug, Clone)]
struct ManyAccumParser<P, I, F>(P, I, F, ManyOptions);

impl<P, I, F, A, S> Parse<S> for ManyAccumParser<P, I, F>
where
    P: Parse<S>,
    I: Fn() -> A,
    F: Fn(A, P::Parsed) -> A,
    S: Source + ?Sized,
{
    type Parsed = A;

    fn run(&self, pos: usize, cx: &mut Context<'_, S>) -> PResult<A> {
        let mut iter = ManyIter::new(&self.0, pos, cx, self.3.limit());
        let acc = iter.by_ref().fold((self.1)(), &self.2);
        iter.finish(self.3.min, acc)
    }
}

/// Like [`many`], but folds the values into an accumulator instead of
/// collecting them.
///
/// # Example
/// ```
/// # use descent::{basic::{many_accum, satisfy, ManyOptions}, Context, PResult, Parse};
/// fn number(pos: usize, cx: &mut Context<'_, str>) -> PResult<u32> {
///     many_accum(
///         satisfy(|ch: &char| ch.is_ascii_digit()),
///         || 0,
///         |acc, ch: char| acc * 10 + (ch as u32 - '0' as u32),
///         ManyOptions::new().min(1),
///     )
///     .parse_at(pos, cx)
/// }
///
/// assert_eq!(number.parse("1234").into_value(), Some(1234));
/// ```
#[inline]
pub const fn many_accum<P, I, F, A, S>(
    parser: P,
    init: I,
    fold: F,
    options: ManyOptions,
) -> impl Parse<S, Parsed = A>
where
    P: Parse<S>,
    I: Fn() -> A,
    F: Fn(A, P::Parsed) -> A,
    S: Source + ?Sized,
{
    ManyAccumParser(parser, init, fold, options)
}

#[derive(Debug, Clone)]
struct SepByParser<P, Q>(P, Q, ManyOptions);

impl<P, Q, S> Parse<S> for SepByParser<P, Q>
where
    P: Parse<S>,
    Q: Parse<S>,
    S: Source + ?Sized,
{
    type Parsed = Vec<P::Parsed>;

    fn run(&self, pos: usize, cx: &mut Context<'_, S>) -> PResult<Vec<P::Parsed>> {
        let limit = self.2.limit();
        let mut values = Vec::new();
        let mut cur = pos;

        if limit > 0 {
            if let Ok(first) = self.0.run(pos, cx) {
                values.push(first.value);
                cur = first.position;

                while values.len() < limit {
                    let Ok(sep) = self.1.run(cur, cx) else {
                        break;
                    };
                    let Ok(item) = self.0.run(sep.position, cx) else {
                        break;
                    };
                    if item.position <= cur {
                        break;
                    }
                    values.push(item.value);
                    cur = item.position;
                }
            }
        }

        if values.len() < self.2.min {
            cx.add_error(cur);
            Err(Fail(cur))
        } else {
            PResult::success(values, cur)
        }
    }
}

/// Creates a parser that applies `parser` repeatedly, with `separator` between
/// each repetition.
///
/// A trailing separator is not consumed.
///
/// # Example
/// ```
/// # use descent::{basic::{sep_by, el, any, ManyOptions}, Context, PResult, Parse};
/// fn items(pos: usize, cx: &mut Context<'_, str>) -> PResult<Vec<char>> {
///     sep_by(el('a'), el(','), ManyOptions::new()).parse_at(pos, cx)
/// }
///
/// let res = items.parse("a,a,");
/// assert_eq!(res.index(), 3);
/// assert_eq!(res.into_value(), Some(vec!['a', 'a']));
/// assert_eq!(items.parse("").into_value(), Some(vec![]));
/// ```
#[inline]
pub const fn sep_by<P, Q, S>(
    parser: P,
    separator: Q,
    options: ManyOptions,
) -> impl Parse<S, Parsed = Vec<P::Parsed>>
where
    P: Parse<S>,
    Q: Parse<S>,
    S: Source + ?Sized,
{
    SepByParser(parser, separator, options)
}

#[derive(Debug, Clone)]
struct LookAheadParser<P>(P);

impl<P, S> Parse<S> for LookAheadParser<P>
where
    P: Parse<S>,
    S: Source + ?Sized,
{
    type Parsed = P::Parsed;

    fn run(&self, pos: usize, cx: &mut Context<'_, S>) -> PResult<P::Parsed> {
        let state = self.0.run(pos, cx)?;
        PResult::success(state.value, pos)
    }
}

/// Creates a parser that runs `parser` but consumes nothing.
///
/// On success the value is kept and the position is left where it was. A
/// failure is propagated along with its diagnostics.
#[inline]
pub const fn look_ahead<P, S>(parser: P) -> impl Parse<S, Parsed = P::Parsed>
where
    P: Parse<S>,
    S: Source + ?Sized,
{
    LookAheadParser(parser)
}

#[derive(Debug, Clone)]
struct NotFollowedByParser<P>(P);

impl<P, S> Parse<S> for NotFollowedByParser<P>
where
    P: Parse<S>,
    S: Source + ?Sized,
{
    type Parsed = ();

    fn run(&self, pos: usize, cx: &mut Context<'_, S>) -> PResult<()> {
        match self.0.run(pos, cx) {
            Ok(_) => {
                cx.unknown(pos);
                Err(Fail(pos))
            }
            Err(_) => PResult::success((), pos),
        }
    }
}

/// Creates a parser that succeeds without consuming input exactly when
/// `parser` fails.
///
/// # Example
/// ```
/// # use descent::{basic::{literal, not_followed_by, satisfy}, Context, PResult, Parse};
/// // The keyword `in`, but not the prefix of an identifier like `int`.
/// fn kw_in(pos: usize, cx: &mut Context<'_, str>) -> PResult<&'static str> {
///     literal("in")
///         .skip(not_followed_by(satisfy(|ch: &char| ch.is_alphanumeric())))
///         .parse_at(pos, cx)
/// }
///
/// assert!(kw_in.parse("in x").is_success());
/// assert!(!kw_in.parse("int").is_success());
/// ```
#[inline]
pub const fn not_followed_by<P, S>(parser: P) -> impl Parse<S, Parsed = ()>
where
    P: Parse<S>,
    S: Source + ?Sized,
{
    NotFollowedByParser(parser)
}

#[derive(Debug, Clone)]
struct LabelParser<P>(P, Cow<'static, str>);

impl<P, S> Parse<S> for LabelParser<P>
where
    P: Parse<S>,
    S: Source + ?Sized,
{
    type Parsed = P::Parsed;

    fn run(&self, pos: usize, cx: &mut Context<'_, S>) -> PResult<P::Parsed> {
        let checkpoint = cx.checkpoint();
        let res = self.0.run(pos, cx);
        if res.is_err() {
            let length = cx.count_since(checkpoint);
            cx.report(Expectation::Label {
                index: pos,
                length,
                name: self.1.clone(),
            });
        }
        res
    }
}

/// Names a parser for diagnostics.
///
/// When `parser` fails where it started, the expectations it reported are
/// replaced in the final report by a single [`Expectation::Label`]. A failure
/// past its starting position keeps the detailed expectations, since those say
/// more about what went wrong inside the rule.
///
/// Nested labels at the same position collapse into the outermost one. A
/// nested label counts as its length minus one, so the outer label can also
/// absorb records reported just before it at that position, such as those of
/// a failed sibling alternative.
///
/// # Example
/// ```
/// # use descent::{basic::{label, one_of}, Context, Expectation, PResult, Parse};
/// fn sign(pos: usize, cx: &mut Context<'_, str>) -> PResult<char> {
///     label(one_of("+-"), "sign").parse_at(pos, cx)
/// }
///
/// assert_eq!(sign.parse("*").expectations(), &[Expectation::label(0, 2, "sign")]);
/// ```
#[inline]
pub fn label<P, S, N>(parser: P, name: N) -> impl Parse<S, Parsed = P::Parsed>
where
    P: Parse<S>,
    S: Source + ?Sized,
    N: Into<Cow<'static, str>>,
{
    LabelParser(parser, name.into())
}

#[derive(Debug, Clone)]
struct RecognizeParser<P>(P);

impl<P, S> Parse<S> for RecognizeParser<P>
where
    P: Parse<S>,
    S: Source + ?Sized,
{
    type Parsed = Span;

    fn run(&self, pos: usize, cx: &mut Context<'_, S>) -> PResult<Span> {
        let state = self.0.run(pos, cx)?;
        PResult::success(Span::new(pos, state.position), state.position)
    }
}

/// Creates a parser that produces the [`Span`] of input consumed by `parser`,
/// discarding its value.
#[inline]
pub const fn recognize<P, S>(parser: P) -> impl Parse<S, Parsed = Span>
where
    P: Parse<S>,
    S: Source + ?Sized,
{
    RecognizeParser(parser)
}

struct LazyParser<F, P> {
    build: F,
    parser: OnceCell<P>,
}

impl<F, P, S> Parse<S> for LazyParser<F, P>
where
    F: Fn() -> P,
    P: Parse<S>,
    S: Source + ?Sized,
{
    type Parsed = P::Parsed;

    fn run(&self, pos: usize, cx: &mut Context<'_, S>) -> PResult<P::Parsed> {
        self.parser.get_or_init(&self.build).run(pos, cx)
    }
}

/// Creates a parser that is built by `build` the first time it runs.
///
/// The built parser is cached and reused. This makes it possible to refer to
/// a parser before it can be constructed, as in a rule that, through other
/// rules, contains itself.
///
/// # Example
/// ```
/// # use descent::{basic::{choice, el, lazy}, Context, PResult, Parse};
/// // nested = '(' nested ')' | 'x'
/// fn nested(pos: usize, cx: &mut Context<'_, str>) -> PResult<usize> {
///     choice!(
///         lazy(|| nested.between(el('('), el(')')).map(|depth| depth + 1)),
///         el('x').with_value(0),
///     )
///     .parse_at(pos, cx)
/// }
///
/// assert_eq!(nested.parse("((x))").into_value(), Some(2));
/// ```
#[inline]
pub const fn lazy<F, P, S>(build: F) -> impl Parse<S, Parsed = P::Parsed>
where
    F: Fn() -> P,
    P: Parse<S>,
    S: Source + ?Sized,
{
    LazyParser {
        build,
        parser: OnceCell::new(),
    }
}

struct ByRefParser<'a, P: ?Sized>(&'a P);

impl<P, S> Parse<S> for ByRefParser<'_, P>
where
    P: Parse<S> + ?Sized,
    S: Source + ?Sized,
{
    type Parsed = P::Parsed;

    #[inline]
    fn run(&self, pos: usize, cx: &mut Context<'_, S>) -> PResult<P::Parsed> {
        self.0.run(pos, cx)
    }
}

impl<P: ?Sized> Clone for ByRefParser<'_, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P: ?Sized> Copy for ByRefParser<'_, P> {}

/// Creates a parser that borrows another parser.
///
/// Lets a parser be combined with others without giving it up.
#[inline]
pub const fn by_ref<P, S>(parser: &P) -> impl Parse<S, Parsed = P::Parsed> + Copy + '_
where
    P: Parse<S> + ?Sized,
    S: Source + ?Sized,
{
    ByRefParser(parser)
}

/// Parses any one symbol.
///
/// Fails with [`Expectation::Unknown`] at the end of input.
pub fn any<S>(pos: usize, cx: &mut Context<'_, S>) -> PResult<S::Symbol>
where
    S: Source + ?Sized,
{
    match cx.source().symbol_at(pos) {
        Some((sym, width)) => PResult::success(sym, pos + width),
        None => {
            cx.unknown(pos);
            Err(Fail(pos))
        }
    }
}

/// Succeeds without consuming input only at the end of input.
pub fn eoi<S>(pos: usize, cx: &mut Context<'_, S>) -> PResult<()>
where
    S: Source + ?Sized,
{
    if pos >= cx.source().len() {
        PResult::success((), pos)
    } else {
        cx.expected(pos, "end of input");
        Err(Fail(pos))
    }
}

#[derive(Debug, Clone)]
struct ElParser<T>(T);

impl<T, S> Parse<S> for ElParser<T>
where
    T: Debug,
    S: Source + ?Sized,
    S::Symbol: PartialEq<T>,
{
    type Parsed = S::Symbol;

    fn run(&self, pos: usize, cx: &mut Context<'_, S>) -> PResult<S::Symbol> {
        match cx.source().symbol_at(pos) {
            Some((sym, width)) if sym == self.0 => PResult::success(sym, pos + width),
            _ => {
                cx.expected(pos, format!("{:?}", self.0));
                Err(Fail(pos))
            }
        }
    }
}

/// Creates a parser that matches one symbol equal to `value`.
///
/// Reports the [`Debug`] rendering of `value` as expected on failure.
#[inline]
pub const fn el<T, S>(value: T) -> impl Parse<S, Parsed = S::Symbol>
where
    T: Debug,
    S: Source + ?Sized,
    S::Symbol: PartialEq<T>,
{
    ElParser(value)
}

#[derive(Debug, Clone)]
struct OneOfParser<P>(P);

impl<P, S> Parse<S> for OneOfParser<P>
where
    P: Pattern<S::Symbol>,
    S: Source + ?Sized,
    S::Symbol: PartialEq + Debug,
{
    type Parsed = S::Symbol;

    fn run(&self, pos: usize, cx: &mut Context<'_, S>) -> PResult<S::Symbol> {
        match cx.source().symbol_at(pos) {
            Some((sym, width)) if self.0.contains(&sym) => PResult::success(sym, pos + width),
            _ => {
                let mut idx = 0;
                while let Some(candidate) = self.0.nth_symbol(idx) {
                    cx.expected(pos, format!("{candidate:?}"));
                    idx += 1;
                }
                if idx == 0 {
                    cx.add_error(pos);
                }
                Err(Fail(pos))
            }
        }
    }
}

/// Creates a parser that matches one symbol contained in `set`.
///
/// Each candidate symbol is reported as expected on failure.
#[inline]
pub const fn one_of<P, S>(set: P) -> impl Parse<S, Parsed = S::Symbol>
where
    P: Pattern<S::Symbol>,
    S: Source + ?Sized,
    S::Symbol: PartialEq + Debug,
{
    OneOfParser(set)
}

#[derive(Debug, Clone)]
struct NoneOfParser<P>(P);

impl<P, S> Parse<S> for NoneOfParser<P>
where
    P: Pattern<S::Symbol>,
    S: Source + ?Sized,
    S::Symbol: PartialEq,
{
    type Parsed = S::Symbol;

    fn run(&self, pos: usize, cx: &mut Context<'_, S>) -> PResult<S::Symbol> {
        match cx.source().symbol_at(pos) {
            Some((sym, width)) if !self.0.contains(&sym) => PResult::success(sym, pos + width),
            _ => {
                cx.unknown(pos);
                Err(Fail(pos))
            }
        }
    }
}

/// Creates a parser that matches one symbol not contained in `set`.
///
/// Fails at the end of input.
#[inline]
pub const fn none_of<P, S>(set: P) -> impl Parse<S, Parsed = S::Symbol>
where
    P: Pattern<S::Symbol>,
    S: Source + ?Sized,
    S::Symbol: PartialEq,
{
    NoneOfParser(set)
}

#[derive(Debug, Clone)]
struct SatisfyParser<F>(F);

impl<F, S> Parse<S> for SatisfyParser<F>
where
    F: Fn(&S::Symbol) -> bool,
    S: Source + ?Sized,
{
    type Parsed = S::Symbol;

    fn run(&self, pos: usize, cx: &mut Context<'_, S>) -> PResult<S::Symbol> {
        match cx.source().symbol_at(pos) {
            Some((sym, width)) if (self.0)(&sym) => PResult::success(sym, pos + width),
            _ => {
                cx.unknown(pos);
                Err(Fail(pos))
            }
        }
    }
}

/// Creates a parser that matches one symbol for which `pred` returns `true`.
#[inline]
pub const fn satisfy<F, S>(pred: F) -> impl Parse<S, Parsed = S::Symbol>
where
    F: Fn(&S::Symbol) -> bool,
    S: Source + ?Sized,
{
    SatisfyParser(pred)
}

#[derive(Debug, Clone)]
struct LiteralParser<P>(P);

impl<P, S> Parse<S> for LiteralParser<P>
where
    P: Pattern<S::Symbol> + Clone,
    S: Source + ?Sized,
    S::Symbol: PartialEq,
{
    type Parsed = P;

    fn run(&self, pos: usize, cx: &mut Context<'_, S>) -> PResult<P> {
        let src = cx.source();
        let mut cur = pos;
        let mut idx = 0;
        while let Some(expected) = self.0.nth_symbol(idx) {
            match src.symbol_at(cur) {
                Some((sym, width)) if sym == expected => cur += width,
                _ => {
                    cx.expected(pos, self.0.describe());
                    return Err(Fail(pos));
                }
            }
            idx += 1;
        }
        PResult::success(self.0.clone(), cur)
    }
}

/// Creates a parser that matches the symbols of `pattern` in order.
///
/// Produces a clone of the pattern. A mismatch anywhere in the pattern is
/// reported as a single expectation at the starting position.
///
/// # Example
/// ```
/// # use descent::{basic::literal, Context, Expectation, PResult, Parse};
/// fn null(pos: usize, cx: &mut Context<'_, str>) -> PResult<&'static str> {
///     literal("null").parse_at(pos, cx)
/// }
///
/// assert_eq!(null.parse("null").index(), 4);
/// assert_eq!(
///     null.parse("nil").expectations(),
///     &[Expectation::expected(0, "\"null\"")],
/// );
/// ```
#[inline]
pub const fn literal<P, S>(pattern: P) -> impl Parse<S, Parsed = P>
where
    P: Pattern<S::Symbol> + Clone,
    S: Source + ?Sized,
    S::Symbol: PartialEq,
{
    LiteralParser(pattern)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{Config, ParseResult, ParseState};
    use alloc::{vec, vec::Vec};
    use pretty_assertions::assert_eq;

    type Cx<'a> = Context<'a, str>;

    fn digit(pos: usize, cx: &mut Cx<'_>) -> PResult<char> {
        satisfy(|ch: &char| ch.is_ascii_digit()).run(pos, cx)
    }

    #[test]
    fn then_position_is_monotonic() {
        let cfg = Config::new();
        let mut cx = Context::new("12", &cfg);
        let first = digit.run(0, &mut cx).unwrap();
        let both = then(digit, digit).run(0, &mut cx).unwrap();
        assert_eq!(first.position, 1);
        assert!(both.position >= first.position);
        assert_eq!(both, ParseState::new(2, '2'));
    }

    #[test]
    fn choice_prefers_first_success() {
        let p = either(el('a').with_value(1), literal("ab").with_value(2));
        assert_eq!(p.parse("ab"), ParseResult::Success { index: 1, value: 1 });

        let p = either(literal("ab").with_value(2), el('a').with_value(1));
        assert_eq!(p.parse("ab"), ParseResult::Success { index: 2, value: 2 });
        assert_eq!(p.parse("ax"), ParseResult::Success { index: 1, value: 1 });
    }

    #[test]
    fn choice_keeps_farthest_errors() {
        let p = choice([literal("abc"), literal("ab"), literal("xyz")]);
        assert_eq!(p.parse("abd"), ParseResult::Success { index: 2, value: "ab" });

        let p = either(then(el('a'), el('b')), el('c'));
        assert_eq!(
            p.parse("ax"),
            ParseResult::Failure {
                index: 1,
                expectations: vec![Expectation::expected(1, "'b'")],
            }
        );

        let p = either(el('a'), el('b'));
        assert_eq!(
            p.parse("c"),
            ParseResult::Failure {
                index: 0,
                expectations: vec![
                    Expectation::expected(0, "'a'"),
                    Expectation::expected(0, "'b'"),
                ],
            }
        );
    }

    #[test]
    fn empty_choice_fails() {
        let parsers: [fn(usize, &mut Cx<'_>) -> PResult<char>; 0] = [];
        let res = choice(parsers).parse("a");
        assert_eq!(res.index(), 0);
        assert!(res.expectations().is_empty());
    }

    #[test]
    fn many_stops_on_zero_width() {
        let p = many(pure::<_, str>(()), ManyOptions::new());
        assert_eq!(p.parse("abc"), ParseResult::Success { index: 0, value: vec![] });

        let p = many(option(el('a'), 'z'), ManyOptions::new());
        assert_eq!(
            p.parse("aab"),
            ParseResult::Success { index: 2, value: vec!['a', 'a'] }
        );
    }

    #[test]
    fn many_bounds() {
        let p = many(digit, ManyOptions::new().min(2).max(3));
        assert_eq!(p.parse("1234").index(), 3);
        assert_eq!(p.parse("12").into_value(), Some(vec!['1', '2']));
        assert!(!p.parse("1").is_success());
        assert_eq!(p.parse("1").index(), 1);

        let p = many(digit, ManyOptions::new().max(0));
        assert_eq!(p.parse("12"), ParseResult::Success { index: 0, value: vec![] });
    }

    #[test]
    fn many_accum_folds() {
        let p = many_accum(
            digit,
            Vec::new,
            |mut acc, ch| {
                acc.insert(0, ch);
                acc
            },
            ManyOptions::new(),
        );
        assert_eq!(p.parse("123x").into_value(), Some(vec!['3', '2', '1']));
    }

    #[test]
    fn sep_by_rolls_back_trailing_separator() {
        let p = sep_by(digit, el(','), ManyOptions::new().min(1));
        assert_eq!(
            p.parse("1,2,"),
            ParseResult::Success { index: 3, value: vec!['1', '2'] }
        );
        assert!(!p.parse(",").is_success());

        let p = sep_by(digit, el(','), ManyOptions::new().max(2));
        assert_eq!(p.parse("1,2,3").index(), 3);
    }

    #[test]
    fn seq_all_or_partial() {
        let strict = seq([el('a'), el('b')], SeqOptions::new());
        assert_eq!(strict.parse("ab").into_value(), Some(vec!['a', 'b']));
        assert!(!strict.parse("ax").is_success());

        let partial = seq([el('a'), el('b')], SeqOptions::partial());
        assert_eq!(partial.parse("x"), ParseResult::Success { index: 0, value: vec![] });
    }

    #[test]
    fn look_ahead_consumes_nothing() {
        let p = pair(look_ahead(digit), digit);
        assert_eq!(p.parse("7"), ParseResult::Success { index: 1, value: ('7', '7') });
        assert!(!look_ahead(digit).parse("x").is_success());
    }

    #[test]
    fn not_followed_by_inverts() {
        assert_eq!(
            not_followed_by(digit).parse("x"),
            ParseResult::Success { index: 0, value: () }
        );
        assert_eq!(
            not_followed_by(digit).parse("1"),
            ParseResult::Failure {
                index: 0,
                expectations: vec![Expectation::unknown(0)],
            }
        );
    }

    #[test]
    fn nested_labels_report_outer() {
        fn sign(pos: usize, cx: &mut Cx<'_>) -> PResult<char> {
            label(one_of("+-"), "sign").run(pos, cx)
        }

        let number = label(then(sign, digit), "number");
        assert_eq!(
            number.parse("x"),
            ParseResult::Failure {
                index: 0,
                expectations: vec![Expectation::label(0, 3, "number")],
            }
        );
    }

    #[test]
    fn label_keeps_inner_errors_past_start() {
        let p = label(then(el('-'), digit), "number");
        assert_eq!(
            p.parse("-x"),
            ParseResult::Failure {
                index: 1,
                expectations: vec![Expectation::unknown(1)],
            }
        );
    }

    #[test]
    fn nested_labels_absorb_sibling_records() {
        let number = label(label(one_of("+-"), "sign"), "number");
        assert_eq!(
            el('q').or(number).parse("x"),
            ParseResult::Failure {
                index: 0,
                expectations: vec![Expectation::label(0, 3, "number")],
            }
        );
    }

    #[test]
    fn leaves() {
        assert_eq!(any.parse("é"), ParseResult::Success { index: 2, value: 'é' });
        assert!(!any.parse("").is_success());
        assert_eq!(eoi.parse(""), ParseResult::Success { index: 0, value: () });
        assert_eq!(
            eoi.parse("a").expectations(),
            &[Expectation::expected(0, "end of input")]
        );
        assert_eq!(none_of("ab").parse("c").into_value(), Some('c'));
        assert!(!none_of("ab").parse("b").is_success());
        assert!(!none_of("ab").parse("").is_success());
        assert_eq!(
            one_of("ab").parse("c").expectations(),
            &[Expectation::expected(0, "'a'"), Expectation::expected(0, "'b'")]
        );
    }

    #[test]
    fn token_sources() {
        #[derive(Debug, Clone, PartialEq)]
        enum Tok {
            Num(i64),
            Plus,
        }

        fn num(pos: usize, cx: &mut Context<'_, [Tok]>) -> PResult<i64> {
            any.run(pos, cx).and_then(|state| match state.value {
                Tok::Num(n) => PResult::success(n, state.position),
                _ => {
                    cx.expected(pos, "number");
                    Err(Fail(pos))
                }
            })
        }

        let sum = and_map(num, then(el(Tok::Plus), num), |a, b| a + b);
        let toks = vec![Tok::Num(2), Tok::Plus, Tok::Num(40)];
        assert_eq!(sum.parse(&toks), ParseResult::Success { index: 3, value: 42 });
        assert_eq!(literal([Tok::Plus]).parse(&[Tok::Plus][..]).index(), 1);
    }

    #[test]
    fn flat_map_and_recognize() {
        let p = recognize(flat_map(digit, |n| {
            many(el('x'), ManyOptions::new().min(n as usize - '0' as usize))
        }));
        assert_eq!(p.parse("2xxy").into_value(), Some(Span::new(0, 3)));
        assert_eq!(p.parse("3xx").index(), 3);
    }

    #[test]
    fn lazy_builds_once() {
        use core::cell::Cell;

        let built = Cell::new(0);
        let p = lazy(|| {
            built.set(built.get() + 1);
            digit
        });
        let p = many(p, ManyOptions::new());
        assert_eq!(p.parse("123").index(), 3);
        assert_eq!(built.get(), 1);
    }

    #[test]
    fn macros() {
        let p = seq!(digit, el('+'), digit);
        assert_eq!(p.parse("1+2").into_value(), Some(('1', '+', '2')));

        let p = choice!(el('a').with_value(1), literal("bc").with_value(2), pure(3));
        assert_eq!(p.parse("bc").into_value(), Some(2));
        assert_eq!(p.parse("x").into_value(), Some(3));
    }
}

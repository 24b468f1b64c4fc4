#![no_std]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! # Backtracking parser-combinator engine.
//! `descent` is a library for building recursive descent parsers over any
//! indexed input, whether that is text or an array of tokens produced by some
//! earlier stage. Parsers are small values that are composed with combinators
//! (sequencing, choice, repetition, look-ahead) instead of being written as a
//! hand-rolled state machine. Every parse reports the farthest position any
//! attempt reached together with what was expected there, so diagnostics stay
//! useful even when the parser backtracks.
//!
//! # Contents
//! * [Example](#example) - Jump directly into an example parser
//! * [Parser Input](#parser-input) - What a parser reads from
//! * [Defining a Parser](#defining-a-parser) - How to write your own parser
//! * [Diagnostics](#diagnostics) - How expectations are collected and reported
//! * [Do-Style Parsers](#do-style-parsers) - Writing a parser as straight-line code
//! * [Recursive Grammars](#recursive-grammars) - Rules that refer to themselves
//! * [Features](#features) - Available crate features
//!
//! # Example
//! ```
//! use descent::prelude::*;
//!
//! #[derive(Debug, PartialEq)]
//! struct Pair {
//!     key: char,
//!     value: u32,
//! }
//!
//! fn digit(pos: usize, cx: &mut Context<'_, str>) -> PResult<u32> {
//!     satisfy(|ch: &char| ch.is_ascii_digit())
//!         .map(|ch| ch as u32 - '0' as u32)
//!         .parse_at(pos, cx)
//! }
//!
//! fn pair(pos: usize, cx: &mut Context<'_, str>) -> PResult<Pair> {
//!     satisfy(|ch: &char| ch.is_ascii_lowercase())
//!         .skip(el('='))
//!         .and_map(digit, |key, value| Pair { key, value })
//!         .label("pair")
//!         .parse_at(pos, cx)
//! }
//!
//! assert_eq!(
//!     pair.parse("x=7"),
//!     ParseResult::Success { index: 3, value: Pair { key: 'x', value: 7 } },
//! );
//! assert_eq!(pair.parse("x=").index(), 2);
//! ```
//!
//! # Parser Input
//! A parser reads from a [`Source`]: a finite, randomly indexable sequence of
//! symbols. [`Source`] is implemented for `str`, where a position is a byte
//! offset and each step consumes one whole `char`, and for slices `[T]`, where a
//! position is an element index. [`AsSource`] lets callers hand over a `String`,
//! a `Vec<T>` or an array directly.
//!
//! Parsers never hold on to their input. A parse call creates a single
//! [`Context`] that owns the error accumulator, borrows the source and a
//! read-only [`Config`], and is threaded by reference through every parser.
//!
//! # Defining a Parser
//! Most parsers are plain functions. Any `Fn(usize, &mut Context<'_, S>) ->
//! PResult<T>` implements [`Parse<S, Parsed = T>`](Parse). A parser receives the
//! current position and either returns a new [`ParseState`] (with a position no
//! smaller than the one it was given) or a [`Fail`]. Before failing, a parser
//! reports what it expected through the context.
//!
//! ```
//! use descent::{Context, Expectation, Fail, PResult, ParseState, Source};
//!
//! fn semicolon<S>(pos: usize, cx: &mut Context<'_, S>) -> PResult<()>
//! where
//!     S: Source<Symbol = char> + ?Sized,
//! {
//!     match cx.source().symbol_at(pos) {
//!         Some((';', width)) => Ok(ParseState::new(pos + width, ())),
//!         _ => {
//!             cx.report(Expectation::expected(pos, "';'"));
//!             Err(Fail(pos))
//!         }
//!     }
//! }
//! ```
//!
//! Functions returning [`impl Parse`](Parse) are the usual way to define a
//! reusable combinator. See [`basic`] for the combinators provided.
//!
//! # Diagnostics
//! Failure is ordinary control flow: a failed alternative inside
//! [`choice`](basic::choice) simply lets the next one run. Diagnostics are
//! tracked separately. Every failure, including failures inside alternatives
//! that were later abandoned, is recorded in the shared [`ErrorSink`], which only
//! keeps expectations for the farthest position seen so far. [`Parse::label`]
//! collapses the low-level expectations of a rule into a single named one.
//!
//! ```
//! use descent::prelude::*;
//!
//! fn boolean(pos: usize, cx: &mut Context<'_, str>) -> PResult<bool> {
//!     literal("true")
//!         .with_value(true)
//!         .or(literal("false").with_value(false))
//!         .label("boolean")
//!         .parse_at(pos, cx)
//! }
//!
//! let res = boolean.parse("maybe");
//! assert_eq!(res.index(), 0);
//! assert_eq!(res.expectations(), &[Expectation::label(0, 2, "boolean")]);
//! ```
//!
//! # Do-Style Parsers
//! [`qo`](qo::qo) turns a block of ordinary Rust code into a parser. Each
//! [`perform`](qo::Perform::perform) call runs a sub-parser at the tracked
//! position and returns a [`Step`](qo::Step), so the `?` operator takes care of
//! propagating failure. Rollback on failure is automatic.
//!
//! ```
//! use descent::prelude::*;
//!
//! let assignment = qo(|p: &mut Perform<'_, '_, str>| {
//!     let name = p.perform(&satisfy(|ch: &char| ch.is_alphabetic()))?;
//!     p.perform(&el('='))?;
//!     let value = p.perform(&satisfy(|ch: &char| ch.is_ascii_digit()))?;
//!     Ok((name, value))
//! });
//!
//! assert_eq!(assignment.parse("a=1").into_value(), Some(('a', '1')));
//! assert!(!assignment.parse("a:1").is_success());
//! ```
//!
//! # Recursive Grammars
//! Grammar rules that refer to themselves are either written as functions,
//! which can call each other freely, or built once as values with a
//! [`Rule`](rule::Rule) placeholder that is defined after the parsers referring
//! to it have been constructed. [`lazy`](basic::lazy) defers the construction
//! of a parser until it first runs.
//!
//! # Features
//! * `string` - Enable the [`string`](./string) module: regular expression,
//!   Unicode property and grapheme cluster matchers for text sources. Enabled by
//!   default.
//! * `serde` - Implement `Serialize` for [`ParseResult`] and [`Expectation`].

extern crate alloc;

mod context;
mod error;
mod result;
mod source;
mod span;

pub mod basic;
pub mod qo;
pub mod rule;

#[cfg(feature = "string")]
#[cfg_attr(docsrs, doc(cfg(feature = "string")))]
pub mod string;

pub use context::*;
pub use error::*;
pub use result::*;
pub use source::*;
pub use span::*;

extern crate self as descent;

use alloc::borrow::Cow;

/// The `descent` prelude.
pub mod prelude {
    pub use super::basic::{
        any, between, choice, either, el, eoi, fail, lazy, literal, look_ahead, many,
        many_accum, none_of, not_followed_by, one_of, option, pure, satisfy, sep_by, seq,
        ManyOptions, SeqOptions,
    };
    pub use super::qo::{qo, Perform, PerformOptions, Step};
    pub use super::rule::{BoxedParser, Rule};
    pub use super::{
        Config, Context, Expectation, Fail, PResult, PResultExt, Parse, ParseResult, ParseState,
        Source,
    };
}

/// The state produced by every successful parsing step.
///
/// `position` is the number of input positions consumed from the start of the
/// input, not from the previous step. A new state is produced by every step and
/// never modified in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParseState<T> {
    /// Position reached after the step.
    pub position: usize,
    /// Value produced by the step.
    pub value: T,
}

/// Failure signal returned by a parser.
///
/// Carries the position at which the failing step was attempted. What was
/// expected is not part of the signal; it has already been reported to the
/// [`Context`] by the time a [`Fail`] is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fail(pub usize);

/// The [`Result`] type returned by a parser.
pub type PResult<T> = Result<ParseState<T>, Fail>;

impl<T> ParseState<T> {
    pub const fn new(position: usize, value: T) -> Self {
        Self { position, value }
    }

    /// Transforms the value, keeping the position.
    pub fn map<F, R>(self, map_fn: F) -> ParseState<R>
    where
        F: FnOnce(T) -> R,
    {
        ParseState {
            position: self.position,
            value: map_fn(self.value),
        }
    }

    /// Replaces the value, keeping the position.
    pub fn with_value<U>(self, value: U) -> ParseState<U> {
        ParseState {
            position: self.position,
            value,
        }
    }
}

impl<T> From<ParseState<T>> for (usize, T) {
    fn from(state: ParseState<T>) -> (usize, T) {
        (state.position, state.value)
    }
}

impl<T> From<(usize, T)> for ParseState<T> {
    fn from((position, value): (usize, T)) -> Self {
        Self { position, value }
    }
}

/// Trait implemented by all parsers.
///
/// The [`Parse`] trait is where the logic of parsing is implemented, but most
/// users will not implement it directly. Functions and closures with the
/// signature `Fn(usize, &mut Context<'_, S>) -> PResult<T>` implement it
/// automatically, and the combinators in [`basic`] cover the rest.
pub trait Parse<S: Source + ?Sized> {
    /// The value type that is produced by the parser on success.
    type Parsed;

    /// Runs the parser at `pos`.
    ///
    /// On success the returned position is never smaller than `pos`. On
    /// failure the parser has reported its expectations to `cx`.
    fn run(&self, pos: usize, cx: &mut Context<'_, S>) -> PResult<Self::Parsed>;

    /// Alias of [`Parse::run`], reads better at the end of a combinator chain.
    #[inline]
    fn parse_at(&self, pos: usize, cx: &mut Context<'_, S>) -> PResult<Self::Parsed>
    where
        Self: Sized,
    {
        self.run(pos, cx)
    }

    /// Parses a whole source with an empty configuration.
    ///
    /// See [`parse`] for details.
    #[inline]
    fn parse<N>(&self, src: &N) -> ParseResult<Self::Parsed>
    where
        Self: Sized,
        N: AsSource<S> + ?Sized,
    {
        result::parse(self, src, &Config::new())
    }

    /// Parses a whole source with the provided configuration.
    ///
    /// # Example
    /// ```
    /// # use descent::prelude::*;
    /// fn flag(pos: usize, cx: &mut Context<'_, str>) -> PResult<bool> {
    ///     let strict = cx.config().get_bool("strict").unwrap_or(false);
    ///     pure(strict).parse_at(pos, cx)
    /// }
    ///
    /// let cfg = Config::new().with("strict", true);
    /// assert_eq!(flag.parse_with("", &cfg).into_value(), Some(true));
    /// ```
    #[inline]
    fn parse_with<N>(&self, src: &N, cfg: &Config) -> ParseResult<Self::Parsed>
    where
        Self: Sized,
        N: AsSource<S> + ?Sized,
    {
        result::parse(self, src, cfg)
    }

    /// Creates a parser whose parsed value is transformed.
    ///
    /// See also [`basic::map`].
    ///
    /// # Example
    /// ```
    /// # use descent::prelude::*;
    /// fn upper(pos: usize, cx: &mut Context<'_, str>) -> PResult<char> {
    ///     any.map(|ch: char| ch.to_ascii_uppercase()).parse_at(pos, cx)
    /// }
    ///
    /// assert_eq!(upper.parse("q").into_value(), Some('Q'));
    /// ```
    #[inline]
    fn map<F, R>(self, map_fn: F) -> impl Parse<S, Parsed = R>
    where
        Self: Sized,
        F: Fn(Self::Parsed) -> R,
    {
        basic::map(self, map_fn)
    }

    /// Replaces the parsed value with a clone of `value`.
    ///
    /// See also [`basic::with_value`].
    #[inline]
    fn with_value<T>(self, value: T) -> impl Parse<S, Parsed = T>
    where
        Self: Sized,
        T: Clone,
    {
        basic::with_value(self, value)
    }

    /// Feeds the parsed value into `combinator` and runs the parser it returns.
    ///
    /// Useful when the rest of the input must be parsed differently depending
    /// on something seen earlier.
    ///
    /// See also [`basic::flat_map`].
    ///
    /// # Example
    /// ```
    /// # use descent::prelude::*;
    /// // A digit followed by that many `x`s.
    /// fn counted(pos: usize, cx: &mut Context<'_, str>) -> PResult<Vec<char>> {
    ///     satisfy(|ch: &char| ch.is_ascii_digit())
    ///         .flat_map(|n: char| {
    ///             let n = n as usize - '0' as usize;
    ///             el('x').many_with(ManyOptions::new().min(n).max(n))
    ///         })
    ///         .parse_at(pos, cx)
    /// }
    ///
    /// assert_eq!(counted.parse("2xx").index(), 3);
    /// assert!(!counted.parse("3xx").is_success());
    /// ```
    #[inline]
    fn flat_map<F, P>(self, combinator: F) -> impl Parse<S, Parsed = P::Parsed>
    where
        Self: Sized,
        F: Fn(Self::Parsed) -> P,
        P: Parse<S>,
    {
        basic::flat_map(self, combinator)
    }

    /// Runs `other` after `self` and combines both values with `combine_fn`.
    ///
    /// See also [`basic::and_map`].
    #[inline]
    fn and_map<P, F, R>(self, other: P, combine_fn: F) -> impl Parse<S, Parsed = R>
    where
        Self: Sized,
        P: Parse<S>,
        F: Fn(Self::Parsed, P::Parsed) -> R,
    {
        basic::and_map(self, other, combine_fn)
    }

    /// Runs `other` after `self`, keeping the value of `other`.
    ///
    /// See also [`basic::then`].
    #[inline]
    fn then<P>(self, other: P) -> impl Parse<S, Parsed = P::Parsed>
    where
        Self: Sized,
        P: Parse<S>,
    {
        basic::then(self, other)
    }

    /// Runs `other` after `self`, keeping the value of `self`.
    ///
    /// See also [`basic::skip`].
    #[inline]
    fn skip<P>(self, other: P) -> impl Parse<S, Parsed = Self::Parsed>
    where
        Self: Sized,
        P: Parse<S>,
    {
        basic::skip(self, other)
    }

    /// Runs `other` after `self`, keeping both values.
    ///
    /// See also [`basic::pair`].
    #[inline]
    fn pair<P>(self, other: P) -> impl Parse<S, Parsed = (Self::Parsed, P::Parsed)>
    where
        Self: Sized,
        P: Parse<S>,
    {
        basic::pair(self, other)
    }

    /// Runs `pre`, `self` and `post` in order, keeping the value of `self`.
    ///
    /// See also [`basic::between`].
    ///
    /// # Example
    /// ```
    /// # use descent::prelude::*;
    /// fn paren(pos: usize, cx: &mut Context<'_, str>) -> PResult<char> {
    ///     any.between(el('('), el(')')).parse_at(pos, cx)
    /// }
    ///
    /// assert_eq!(paren.parse("(a)").into_value(), Some('a'));
    /// ```
    #[inline]
    fn between<L, R>(self, pre: L, post: R) -> impl Parse<S, Parsed = Self::Parsed>
    where
        Self: Sized,
        L: Parse<S>,
        R: Parse<S>,
    {
        basic::between(self, pre, post)
    }

    /// Runs `delim`, `self` and `delim` again, keeping the value of `self`.
    #[inline]
    fn surrounded_by<D>(self, delim: D) -> impl Parse<S, Parsed = Self::Parsed>
    where
        Self: Sized,
        D: Parse<S> + Clone,
    {
        basic::between(self, delim.clone(), delim)
    }

    /// Tries `self`, then `other` from the same position if `self` failed.
    ///
    /// See also [`basic::either`] and [`basic::choice`].
    #[inline]
    fn or<P>(self, other: P) -> impl Parse<S, Parsed = Self::Parsed>
    where
        Self: Sized,
        P: Parse<S, Parsed = Self::Parsed>,
    {
        basic::either(self, other)
    }

    /// Produces `default` without consuming input if `self` fails.
    ///
    /// See also [`basic::option`].
    #[inline]
    fn option(self, default: Self::Parsed) -> impl Parse<S, Parsed = Self::Parsed>
    where
        Self: Sized,
        Self::Parsed: Clone,
    {
        basic::option(self, default)
    }

    /// Produces [`None`] without consuming input if `self` fails.
    #[inline]
    fn opt(self) -> impl Parse<S, Parsed = Option<Self::Parsed>>
    where
        Self: Sized,
    {
        basic::opt(self)
    }

    /// Applies `self` as many times as it succeeds while advancing.
    ///
    /// See also [`basic::many`].
    #[inline]
    fn many(self) -> impl Parse<S, Parsed = alloc::vec::Vec<Self::Parsed>>
    where
        Self: Sized,
    {
        basic::many(self, basic::ManyOptions::new())
    }

    /// Like [`Parse::many`], with bounds on the number of repetitions.
    #[inline]
    fn many_with(
        self,
        options: basic::ManyOptions,
    ) -> impl Parse<S, Parsed = alloc::vec::Vec<Self::Parsed>>
    where
        Self: Sized,
    {
        basic::many(self, options)
    }

    /// Applies `self` repeatedly, separated by `separator`.
    ///
    /// See also [`basic::sep_by`].
    #[inline]
    fn sep_by<P>(
        self,
        separator: P,
        options: basic::ManyOptions,
    ) -> impl Parse<S, Parsed = alloc::vec::Vec<Self::Parsed>>
    where
        Self: Sized,
        P: Parse<S>,
    {
        basic::sep_by(self, separator, options)
    }

    /// Runs `self` without consuming input.
    ///
    /// See also [`basic::look_ahead`].
    #[inline]
    fn look_ahead(self) -> impl Parse<S, Parsed = Self::Parsed>
    where
        Self: Sized,
    {
        basic::look_ahead(self)
    }

    /// Succeeds without consuming input only if `self` fails.
    ///
    /// See also [`basic::not_followed_by`].
    #[inline]
    fn not_followed_by(self) -> impl Parse<S, Parsed = ()>
    where
        Self: Sized,
    {
        basic::not_followed_by(self)
    }

    /// Collapses the expectations reported by `self` into a single named one.
    ///
    /// See also [`basic::label`].
    #[inline]
    fn label<N>(self, name: N) -> impl Parse<S, Parsed = Self::Parsed>
    where
        Self: Sized,
        N: Into<Cow<'static, str>>,
    {
        basic::label(self, name)
    }

    /// Produces the [`Span`] consumed by `self` instead of its value.
    #[inline]
    fn recognize(self) -> impl Parse<S, Parsed = Span>
    where
        Self: Sized,
    {
        basic::recognize(self)
    }

    /// Passes `self` to `apply_fn`, for chaining user defined combinators.
    ///
    /// # Example
    /// ```
    /// # use descent::prelude::*;
    /// fn list(pos: usize, cx: &mut Context<'_, str>) -> PResult<Vec<char>> {
    ///     any.apply(|item| sep_by(item, el(','), ManyOptions::new()))
    ///         .parse_at(pos, cx)
    /// }
    ///
    /// assert_eq!(list.parse("a,b").into_value(), Some(vec!['a', 'b']));
    /// ```
    #[inline]
    fn apply<F, R>(self, apply_fn: F) -> R
    where
        Self: Sized,
        F: FnOnce(Self) -> R,
    {
        apply_fn(self)
    }

    /// Borrows a parser as a parser.
    #[inline]
    fn by_ref<'a>(&'a self) -> impl Parse<S, Parsed = Self::Parsed> + 'a
    where
        Self: Sized,
        S: 'a,
    {
        basic::by_ref(self)
    }

    /// Erases the type of a parser.
    #[inline]
    fn boxed<'a>(self) -> rule::BoxedParser<'a, S, Self::Parsed>
    where
        Self: Sized + 'a,
    {
        rule::BoxedParser::new(self)
    }
}

mod sealed {
    use super::PResult;

    pub trait Sealed {}

    impl<T> Sealed for PResult<T> {}
}

/// Additional convenience methods for [`PResult`].
pub trait PResultExt: sealed::Sealed {
    type Parsed;

    /// Creates a successful result.
    fn success(value: Self::Parsed, position: usize) -> Self;

    /// The position reached on success, or where the failing step was attempted.
    fn position(&self) -> usize;

    /// Gets the parsed value, if any.
    fn value(&self) -> Option<&Self::Parsed>;

    /// Transforms the parsed value of a successful result.
    fn map_value<F, R>(self, map_fn: F) -> PResult<R>
    where
        F: FnOnce(Self::Parsed) -> R;
}

impl<T> PResultExt for PResult<T> {
    type Parsed = T;

    fn success(value: T, position: usize) -> Self {
        Ok(ParseState::new(position, value))
    }

    fn position(&self) -> usize {
        match self {
            Ok(state) => state.position,
            Err(Fail(pos)) => *pos,
        }
    }

    fn value(&self) -> Option<&T> {
        match self {
            Ok(state) => Some(&state.value),
            Err(_) => None,
        }
    }

    fn map_value<F, R>(self, map_fn: F) -> PResult<R>
    where
        F: FnOnce(T) -> R,
    {
        self.map(move |state| state.map(map_fn))
    }
}

impl<F, T, S> Parse<S> for F
where
    F: Fn(usize, &mut Context<'_, S>) -> PResult<T>,
    S: Source + ?Sized,
{
    type Parsed = T;

    fn run(&self, pos: usize, cx: &mut Context<'_, S>) -> PResult<T> {
        (*self)(pos, cx)
    }
}

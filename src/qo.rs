//! Do-style parsers.
//!
//! [`qo`] builds a parser out of a block of ordinary Rust code. Inside the block,
//! a [`Perform`] handle runs sub-parsers at the current position and advances it
//! on success. A failed sub-parser produces an [`Abort`], which the `?` operator
//! carries out of the block (or out of the nearest [`Perform::attempt`]), so
//! there is no success flag to check after each step. The position is restored
//! on the way out.
//!
//! Branches and loops are plain Rust control flow:
//!
//! ```
//! use descent::prelude::*;
//!
//! #[derive(Debug, PartialEq)]
//! enum Item {
//!     Word(String),
//!     Num(u32),
//! }
//!
//! let item = qo(|p: &mut Perform<'_, '_, str>| {
//!     if p.option(&el('#')).is_some() {
//!         let digits = p.many(&satisfy(|ch: &char| ch.is_ascii_digit()));
//!         if digits.is_empty() {
//!             p.perform(&fail::<(), _>())?;
//!         }
//!         let n = digits.iter().fold(0, |n, ch| n * 10 + ch.to_digit(10).unwrap_or(0));
//!         Ok(Item::Num(n))
//!     } else {
//!         let word = p.many(&satisfy(|ch: &char| ch.is_alphabetic()));
//!         Ok(Item::Word(word.into_iter().collect()))
//!     }
//! });
//!
//! assert_eq!(item.parse("#42").into_value(), Some(Item::Num(42)));
//! assert_eq!(item.parse("hey").into_value(), Some(Item::Word("hey".into())));
//! assert!(!item.parse("#x").is_success());
//! ```

use crate::basic::ManyIter;
use crate::{Config, Context, Fail, PResult, PResultExt, Parse, Source};
use alloc::vec::Vec;

/// Options for [`Perform::perform_with`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PerformOptions {
    /// Keep the position reached so far when the failure reaches
    /// [`Perform::attempt`] or [`Perform::repeat`], instead of rolling back.
    pub allow_partial: bool,
}

impl PerformOptions {
    pub const fn new() -> Self {
        Self {
            allow_partial: false,
        }
    }

    pub const fn partial() -> Self {
        Self {
            allow_partial: true,
        }
    }
}

/// Signal that a performed parser failed.
///
/// Only [`Perform`] creates an [`Abort`]. It is meant to be propagated with `?`
/// to the nearest recovery point: [`Perform::attempt`], [`Perform::repeat`], or
/// the end of the [`qo`] block, which then fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Abort {
    position: usize,
    options: PerformOptions,
}

impl Abort {
    /// The position at which the failed parser was run.
    pub const fn position(&self) -> usize {
        self.position
    }

    pub const fn options(&self) -> PerformOptions {
        self.options
    }
}

/// The result type of a step in a [`qo`] block.
pub type Step<T> = Result<T, Abort>;

/// Handle for running parsers inside a [`qo`] block.
pub struct Perform<'c, 'a, S: Source + ?Sized> {
    pos: usize,
    cx: &'c mut Context<'a, S>,
}

impl<'a, S: Source + ?Sized> Perform<'_, 'a, S> {
    /// Runs `parser` at the current position.
    ///
    /// On success the position advances and the value is returned. On failure
    /// the position is unchanged and an [`Abort`] is returned.
    pub fn perform<P>(&mut self, parser: &P) -> Step<P::Parsed>
    where
        P: Parse<S> + ?Sized,
    {
        self.perform_with(parser, PerformOptions::new())
    }

    /// Like [`Perform::perform`], with options attached to the [`Abort`].
    pub fn perform_with<P>(&mut self, parser: &P, options: PerformOptions) -> Step<P::Parsed>
    where
        P: Parse<S> + ?Sized,
    {
        match parser.run(self.pos, self.cx) {
            Ok(state) => {
                self.pos = state.position;
                Ok(state.value)
            }
            Err(_) => Err(Abort {
                position: self.pos,
                options,
            }),
        }
    }

    /// Runs `parser`, returning [`None`] instead of aborting on failure.
    pub fn option<P>(&mut self, parser: &P) -> Option<P::Parsed>
    where
        P: Parse<S> + ?Sized,
    {
        self.perform(parser).ok()
    }

    /// Runs `parser`, returning `default` instead of aborting on failure.
    pub fn option_or<P>(&mut self, parser: &P, default: P::Parsed) -> P::Parsed
    where
        P: Parse<S> + ?Sized,
    {
        self.perform(parser).unwrap_or(default)
    }

    /// Runs `body`, recovering from an [`Abort`] that escapes it.
    ///
    /// On recovery the position is restored to where `body` started, unless the
    /// abort was raised with [`PerformOptions::allow_partial`], and [`None`] is
    /// returned.
    ///
    /// # Example
    /// ```
    /// # use descent::prelude::*;
    /// let signed = qo(|p: &mut Perform<'_, '_, str>| {
    ///     let neg = p
    ///         .attempt(|p| {
    ///             p.perform(&el('-'))?;
    ///             p.perform(&el('-'))
    ///         })
    ///         .is_some();
    ///     let digit = p.perform(&satisfy(|ch: &char| ch.is_ascii_digit()))?;
    ///     Ok((neg, digit))
    /// });
    ///
    /// assert_eq!(signed.parse("--1").into_value(), Some((true, '1')));
    /// // The lone '-' is rolled back and the digit parser sees it.
    /// assert!(!signed.parse("-1").is_success());
    /// assert_eq!(signed.parse("-1").index(), 1);
    /// ```
    pub fn attempt<T, F>(&mut self, body: F) -> Option<T>
    where
        F: FnOnce(&mut Self) -> Step<T>,
    {
        let start = self.pos;
        match body(self) {
            Ok(value) => Some(value),
            Err(abort) => {
                if !abort.options.allow_partial {
                    self.pos = start;
                }
                None
            }
        }
    }

    /// Like [`Perform::attempt`], returning `default` on recovery.
    pub fn attempt_or<T, F>(&mut self, default: T, body: F) -> T
    where
        F: FnOnce(&mut Self) -> Step<T>,
    {
        self.attempt(body).unwrap_or(default)
    }

    /// Runs `parser` as many times as it succeeds while advancing, collecting
    /// the values. Never aborts.
    pub fn many<P>(&mut self, parser: &P) -> Vec<P::Parsed>
    where
        P: Parse<S> + ?Sized,
    {
        let mut iter = ManyIter::new(parser, self.pos, self.cx, usize::MAX);
        let values = iter.by_ref().collect();
        self.pos = iter.position();
        values
    }

    /// Runs `body` repeatedly as long as every pass advances the position.
    ///
    /// An [`Abort`] escaping a pass ends the loop. That pass's progress is kept
    /// only if the abort was raised with [`PerformOptions::allow_partial`].
    pub fn repeat<F>(&mut self, mut body: F)
    where
        F: FnMut(&mut Self) -> Step<()>,
    {
        loop {
            let start = self.pos;
            match body(self) {
                Ok(()) if self.pos > start => {}
                Ok(()) => break,
                Err(abort) => {
                    if !abort.options.allow_partial {
                        self.pos = start;
                    }
                    break;
                }
            }
        }
    }

    /// The current position.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn config(&self) -> &'a Config {
        self.cx.config()
    }

    pub fn source(&self) -> &'a S {
        self.cx.source()
    }

    /// The parse context, for reporting expectations directly.
    pub fn context(&mut self) -> &mut Context<'a, S> {
        self.cx
    }
}

#[derive(Debug, Clone)]
struct QoParser<F>(F);

impl<F, T, S> Parse<S> for QoParser<F>
where
    F: Fn(&mut Perform<'_, '_, S>) -> Step<T>,
    S: Source + ?Sized,
{
    type Parsed = T;

    fn run(&self, pos: usize, cx: &mut Context<'_, S>) -> PResult<T> {
        let mut perform = Perform { pos, cx };
        match (self.0)(&mut perform) {
            Ok(value) => PResult::success(value, perform.pos),
            Err(abort) => Err(Fail(abort.position)),
        }
    }
}

/// Creates a parser from a block of code.
///
/// See the [module documentation](self) for details.
///
/// # Example
/// ```
/// # use descent::prelude::*;
/// let pair = qo(|p: &mut Perform<'_, '_, str>| {
///     let key = p.perform(&satisfy(|ch: &char| ch.is_alphabetic()))?;
///     p.perform(&el(':'))?;
///     let value = p.option_or(&satisfy(|ch: &char| ch.is_ascii_digit()), '0');
///     Ok((key, value))
/// });
///
/// assert_eq!(pair.parse("a:1").into_value(), Some(('a', '1')));
/// assert_eq!(pair.parse("a:").into_value(), Some(('a', '0')));
/// assert_eq!(pair.parse("a").index(), 1);
/// ```
#[inline]
pub const fn qo<F, T, S>(body: F) -> impl Parse<S, Parsed = T>
where
    F: Fn(&mut Perform<'_, '_, S>) -> Step<T>,
    S: Source + ?Sized,
{
    QoParser(body)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::basic::{el, literal, satisfy};
    use crate::{Expectation, ParseResult};
    use alloc::vec;
    use pretty_assertions::assert_eq;

    type P<'c, 'a> = Perform<'c, 'a, str>;

    #[test]
    fn abort_restores_and_fails() {
        let ab = qo(|p: &mut P<'_, '_>| {
            p.perform(&el('a'))?;
            p.perform(&el('b'))?;
            Ok(())
        });
        assert_eq!(ab.parse("ab"), ParseResult::Success { index: 2, value: () });
        assert_eq!(
            ab.parse("ax"),
            ParseResult::Failure {
                index: 1,
                expectations: vec![Expectation::expected(1, "'b'")],
            }
        );
    }

    #[test]
    fn attempt_rolls_back() {
        let p = qo(|p: &mut P<'_, '_>| {
            let got = p.attempt_or(false, |p| {
                p.perform(&el('a'))?;
                p.perform(&el('b'))?;
                Ok(true)
            });
            Ok((got, p.position()))
        });
        assert_eq!(p.parse("ab").into_value(), Some((true, 2)));
        assert_eq!(p.parse("ax").into_value(), Some((false, 0)));
    }

    #[test]
    fn attempt_keeps_partial() {
        let p = qo(|p: &mut P<'_, '_>| {
            p.attempt(|p| {
                p.perform(&el('a'))?;
                p.perform_with(&el('b'), PerformOptions::partial())
            });
            Ok(p.position())
        });
        assert_eq!(p.parse("ax").into_value(), Some(1));
    }

    #[test]
    fn many_stops_without_progress() {
        let p = qo(|p: &mut P<'_, '_>| {
            let xs = p.many(&el('x'));
            let empties = p.many(&literal(""));
            Ok((xs.len(), empties.len()))
        });
        assert_eq!(p.parse("xxy"), ParseResult::Success { index: 2, value: (2, 0) });
    }

    #[test]
    fn many_over_trait_object() {
        let x: &dyn Parse<str, Parsed = char> = &el('x');
        let p = qo(move |p: &mut P<'_, '_>| {
            let xs = p.many(x);
            let y = p.perform(x);
            Ok((xs, y.is_ok(), p.position()))
        });
        assert_eq!(p.parse("xxy").into_value(), Some((vec!['x', 'x'], false, 2)));
    }

    #[test]
    fn repeat_discards_failed_pass() {
        // ("a" "b")* with an incomplete last pass
        let p = qo(|p: &mut P<'_, '_>| {
            let mut count = 0;
            p.repeat(|p| {
                p.perform(&el('a'))?;
                p.perform(&el('b'))?;
                count += 1;
                Ok(())
            });
            Ok(count)
        });
        assert_eq!(p.parse("ababa"), ParseResult::Success { index: 4, value: 2 });
    }

    #[test]
    fn repeat_keeps_partial_pass() {
        let p = qo(|p: &mut P<'_, '_>| {
            p.repeat(|p| {
                p.perform(&el('a'))?;
                p.perform_with(&el('b'), PerformOptions::partial())?;
                Ok(())
            });
            Ok(())
        });
        assert_eq!(p.parse("ababa").index(), 5);
    }

    #[test]
    fn repeat_stops_without_progress() {
        let p = qo(|p: &mut P<'_, '_>| {
            let mut passes = 0;
            p.repeat(|p| {
                passes += 1;
                p.option(&el('z'));
                Ok(())
            });
            Ok(passes)
        });
        assert_eq!(p.parse("zzq").into_value(), Some(3));
    }

    #[test]
    fn config_and_context() {
        let p = qo(|p: &mut P<'_, '_>| {
            let want = p.config().get_str("want").unwrap_or("?");
            let ch = p.perform(&satisfy(|ch: &char| want.contains(*ch)))?;
            if ch == '!' {
                let pos = p.position();
                p.context().expected(pos, "not '!'");
            }
            Ok(ch)
        });
        let cfg = Config::new().with("want", "xy");
        assert_eq!(p.parse_with("y", &cfg).into_value(), Some('y'));
        assert!(!p.parse_with("z", &cfg).is_success());
        assert_eq!(p.parse("?").into_value(), Some('?'));
    }
}

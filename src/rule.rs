//! Type-erased parsers and write-once rules for recursive grammars.
//!
//! A grammar built as a value, rather than as a set of functions, cannot name
//! a parser before it exists. A [`Rule`] is a placeholder that can be referred
//! to right away and defined once the parsers referring to it are built.
//!
//! # Example
//! ```
//! use descent::prelude::*;
//!
//! // list = '[' (list (',' list)*)? ']'
//! let list: Rule<'static, str, usize> = Rule::new();
//! let items = sep_by(list.handle(), el(','), ManyOptions::new());
//! list.define(items.between(el('['), el(']')).map(|items| items.len()))
//!     .unwrap();
//!
//! assert_eq!(list.parse("[[],[[]],[]]").into_value(), Some(3));
//! assert!(!list.parse("[[]").is_success());
//! ```

use crate::{Context, Fail, PResult, Parse, Source};
use alloc::{
    boxed::Box,
    rc::{Rc, Weak},
};
use core::cell::OnceCell;
use core::fmt;

/// A parser with its type erased.
///
/// Useful for storing parsers of different types in one list, as in
/// [`choice()`](crate::basic::choice) or [`seq()`](crate::basic::seq).
pub struct BoxedParser<'a, S: Source + ?Sized, T>(Box<dyn Parse<S, Parsed = T> + 'a>);

impl<'a, S: Source + ?Sized, T> BoxedParser<'a, S, T> {
    pub fn new<P>(parser: P) -> Self
    where
        P: Parse<S, Parsed = T> + 'a,
    {
        Self(Box::new(parser))
    }
}

impl<S: Source + ?Sized, T> Parse<S> for BoxedParser<'_, S, T> {
    type Parsed = T;

    #[inline]
    fn run(&self, pos: usize, cx: &mut Context<'_, S>) -> PResult<T> {
        self.0.run(pos, cx)
    }
}

impl<S: Source + ?Sized, T> fmt::Debug for BoxedParser<'_, S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BoxedParser")
    }
}

/// Error returned by [`Rule::define`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    #[error("rule is already defined")]
    AlreadyDefined,
}

type Slot<'a, S, T> = OnceCell<BoxedParser<'a, S, T>>;

/// A grammar rule that is defined after it is first referred to.
///
/// The [`Rule`] owns its definition. Parsers inside the definition should
/// refer back to the rule through [`Rule::handle`], which does not keep the
/// definition alive, so a self-referential rule is freed when the [`Rule`] is
/// dropped. Cloning a [`Rule`] shares the same definition.
pub struct Rule<'a, S: Source + ?Sized, T> {
    slot: Rc<Slot<'a, S, T>>,
}

impl<'a, S: Source + ?Sized, T> Rule<'a, S, T> {
    pub fn new() -> Self {
        Self {
            slot: Rc::new(OnceCell::new()),
        }
    }

    /// Sets the parser this rule runs.
    ///
    /// A rule can only be defined once.
    pub fn define<P>(&self, parser: P) -> Result<(), RuleError>
    where
        P: Parse<S, Parsed = T> + 'a,
    {
        self.slot
            .set(BoxedParser::new(parser))
            .map_err(|_| RuleError::AlreadyDefined)
    }

    pub fn is_defined(&self) -> bool {
        self.slot.get().is_some()
    }

    /// Creates a non-owning reference to this rule.
    pub fn handle(&self) -> RuleRef<'a, S, T> {
        RuleRef {
            slot: Rc::downgrade(&self.slot),
        }
    }
}

impl<S: Source + ?Sized, T> Default for Rule<'_, S, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Source + ?Sized, T> Clone for Rule<'_, S, T> {
    fn clone(&self) -> Self {
        Self {
            slot: Rc::clone(&self.slot),
        }
    }
}

impl<S: Source + ?Sized, T> fmt::Debug for Rule<'_, S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("defined", &self.is_defined())
            .finish()
    }
}

fn run_slot<S, T>(slot: Option<&Slot<'_, S, T>>, pos: usize, cx: &mut Context<'_, S>) -> PResult<T>
where
    S: Source + ?Sized,
{
    match slot.and_then(OnceCell::get) {
        Some(parser) => parser.run(pos, cx),
        None => {
            tracing::warn!(pos, "running a rule that is undefined or was dropped");
            cx.unknown(pos);
            Err(Fail(pos))
        }
    }
}

impl<S: Source + ?Sized, T> Parse<S> for Rule<'_, S, T> {
    type Parsed = T;

    fn run(&self, pos: usize, cx: &mut Context<'_, S>) -> PResult<T> {
        run_slot(Some(&*self.slot), pos, cx)
    }
}

/// A non-owning reference to a [`Rule`], created by [`Rule::handle`].
pub struct RuleRef<'a, S: Source + ?Sized, T> {
    slot: Weak<Slot<'a, S, T>>,
}

impl<S: Source + ?Sized, T> Clone for RuleRef<'_, S, T> {
    fn clone(&self) -> Self {
        Self {
            slot: Weak::clone(&self.slot),
        }
    }
}

impl<S: Source + ?Sized, T> fmt::Debug for RuleRef<'_, S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleRef")
            .field("alive", &(self.slot.strong_count() > 0))
            .finish()
    }
}

impl<S: Source + ?Sized, T> Parse<S> for RuleRef<'_, S, T> {
    type Parsed = T;

    fn run(&self, pos: usize, cx: &mut Context<'_, S>) -> PResult<T> {
        let slot = self.slot.upgrade();
        run_slot(slot.as_deref(), pos, cx)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::basic::{choice, el, pure};
    use crate::{Expectation, ParseResult};
    use alloc::vec;
    use pretty_assertions::assert_eq;

    #[test]
    fn define_once() {
        let rule: Rule<'_, str, char> = Rule::new();
        assert!(!rule.is_defined());
        assert_eq!(rule.define(el('a')), Ok(()));
        assert_eq!(rule.define(el('b')), Err(RuleError::AlreadyDefined));
        assert_eq!(rule.parse("a").into_value(), Some('a'));
    }

    #[test]
    fn undefined_rule_fails() {
        let rule: Rule<'_, str, char> = Rule::new();
        assert_eq!(
            rule.parse("a"),
            ParseResult::Failure {
                index: 0,
                expectations: vec![Expectation::unknown(0)],
            }
        );
    }

    #[test]
    fn dropped_rule_fails() {
        let rule: Rule<'_, str, ()> = Rule::new();
        let handle = rule.handle();
        drop(rule);
        assert!(!handle.parse("").is_success());
    }

    #[test]
    fn recursive_rule() {
        // depth = 'a' depth | ε
        let depth: Rule<'_, str, usize> = Rule::new();
        depth
            .define(choice!(
                el('a').then(depth.handle()).map(|n| n + 1),
                pure(0),
            ))
            .unwrap();
        assert_eq!(depth.parse("aaab"), ParseResult::Success { index: 3, value: 3 });
    }

    #[test]
    fn boxed_list() {
        let parsers: [BoxedParser<'_, str, u8>; 2] = [
            el('a').with_value(1).boxed(),
            el('b').then(el('c')).with_value(2).boxed(),
        ];
        let p = choice(parsers);
        assert_eq!(p.parse("bc").into_value(), Some(2));
    }
}

//! Parsers for text sources.
//!
//! Everything in this module reads the source through [`Source::as_str`]. On a
//! source that is not text, or at a position that does not fall on a `char`
//! boundary, these parsers report [`Expectation::Unknown`](crate::Expectation)
//! and fail like any other mismatch.
//!
//! # Example
//! ```
//! use descent::prelude::*;
//! use descent::string::{grapheme, regex};
//!
//! let word = regex::<str>(r"[a-z]+").unwrap();
//! assert_eq!(word.parse("hello world").into_value().as_deref(), Some("hello"));
//!
//! // "e" followed by a combining acute accent is a single grapheme.
//! assert_eq!(grapheme.parse("e\u{301}!").into_value().as_deref(), Some("e\u{301}"));
//! ```

pub mod prop;

use crate::basic::{choice, many_accum, map, seq, ManyOptions};
use crate::{Context, Fail, PResult, PResultExt, Parse, Source, Span};
use alloc::{borrow::Cow, rc::Rc, string::String, vec::Vec};
use core::fmt;
use prop::{
    any, not, ExtendedPictographic, GraphemeClusterBreak as Gcb, IndicConjunctBreak as Icb,
    Property,
};
use regex_automata::meta::{BuildError, Regex};
use regex_automata::util::captures::Captures;
use regex_automata::{Anchored, Input, PatternID};

/// Error returned when a string parser cannot be built.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StringError {
    #[error("invalid regular expression: {0}")]
    Regex(BuildError),
    #[error("regular expression has no capture group {0}")]
    NoGroup(Group),
}

impl From<BuildError> for StringError {
    fn from(err: BuildError) -> Self {
        Self::Regex(err)
    }
}

/// Refers to a capture group by index or by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Group {
    Index(usize),
    Name(Cow<'static, str>),
}

impl From<usize> for Group {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl From<&'static str> for Group {
    fn from(name: &'static str) -> Self {
        Self::Name(Cow::Borrowed(name))
    }
}

impl From<String> for Group {
    fn from(name: String) -> Self {
        Self::Name(Cow::Owned(name))
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(f, "{index}"),
            Self::Name(name) => write!(f, "named {name:?}"),
        }
    }
}

fn text_at<'a, S>(cx: &Context<'a, S>, pos: usize) -> Option<&'a str>
where
    S: Source + ?Sized,
{
    cx.source().as_str()?.get(pos..)
}

fn mismatch<T, S>(pos: usize, cx: &mut Context<'_, S>) -> PResult<T>
where
    S: Source + ?Sized,
{
    cx.unknown(pos);
    Err(Fail(pos))
}

/// Parses one `char`.
///
/// A `char` is a single code point. Use [`grapheme`] to parse a whole
/// user-perceived character.
pub fn char<S>(pos: usize, cx: &mut Context<'_, S>) -> PResult<char>
where
    S: Source + ?Sized,
{
    match text_at(cx, pos).and_then(|text| text.chars().next()) {
        Some(ch) => PResult::success(ch, pos + ch.len_utf8()),
        None => mismatch(pos, cx),
    }
}

#[derive(Debug, Clone)]
struct CharWithPropParser<P>(P);

impl<P, S> Parse<S> for CharWithPropParser<P>
where
    P: Property,
    S: Source + ?Sized,
{
    type Parsed = char;

    fn run(&self, pos: usize, cx: &mut Context<'_, S>) -> PResult<char> {
        match text_at(cx, pos).and_then(|text| text.chars().next()) {
            Some(ch) if self.0.contains(ch) => PResult::success(ch, pos + ch.len_utf8()),
            _ => mismatch(pos, cx),
        }
    }
}

/// Creates a parser for one `char` that has `property`.
///
/// # Example
/// ```
/// # use descent::prelude::*;
/// use descent::string::{char_with_prop, prop::GeneralCategory};
///
/// let upper = char_with_prop(GeneralCategory::Lu);
/// assert_eq!(upper.parse("Ábc").into_value(), Some('Á'));
/// assert!(!upper.parse("ábc").is_success());
/// ```
#[inline]
pub const fn char_with_prop<P, S>(property: P) -> impl Parse<S, Parsed = char>
where
    P: Property,
    S: Source + ?Sized,
{
    CharWithPropParser(property)
}

fn gcb<P, S>(property: P) -> impl Parse<S, Parsed = ()>
where
    P: Property,
    S: Source + ?Sized,
{
    char_with_prop(property).with_value(())
}

fn skip_many<P, S>(parser: P, min: usize) -> impl Parse<S, Parsed = ()>
where
    P: Parse<S>,
    S: Source + ?Sized,
{
    many_accum(parser, || (), |(), _| (), ManyOptions::new().min(min))
}

fn crlf<S: Source + ?Sized>(pos: usize, cx: &mut Context<'_, S>) -> PResult<()> {
    choice!(
        seq!(gcb(Gcb::CR), gcb(Gcb::LF)).with_value(()),
        gcb(Gcb::CR),
        gcb(Gcb::LF),
    )
    .parse_at(pos, cx)
}

fn hangul_syllable<S: Source + ?Sized>(pos: usize, cx: &mut Context<'_, S>) -> PResult<()> {
    choice!(
        seq!(
            skip_many(gcb(Gcb::L), 0),
            choice!(
                skip_many(gcb(Gcb::V), 1),
                gcb(Gcb::LV).then(skip_many(gcb(Gcb::V), 0)),
                gcb(Gcb::LVT),
            ),
            skip_many(gcb(Gcb::T), 0),
        )
        .with_value(()),
        skip_many(gcb(Gcb::L), 1),
        skip_many(gcb(Gcb::T), 1),
    )
    .parse_at(pos, cx)
}

fn ri_sequence<S: Source + ?Sized>(pos: usize, cx: &mut Context<'_, S>) -> PResult<()> {
    gcb(Gcb::RegionalIndicator)
        .then(gcb(Gcb::RegionalIndicator))
        .parse_at(pos, cx)
}

fn xpicto_sequence<S: Source + ?Sized>(pos: usize, cx: &mut Context<'_, S>) -> PResult<()> {
    gcb(ExtendedPictographic)
        .then(skip_many(
            seq!(
                skip_many(gcb(Gcb::Extend), 0),
                gcb(Gcb::ZWJ),
                gcb(ExtendedPictographic),
            ),
            0,
        ))
        .parse_at(pos, cx)
}

fn conjunct_cluster<S: Source + ?Sized>(pos: usize, cx: &mut Context<'_, S>) -> PResult<()> {
    gcb(Icb::Consonant)
        .then(skip_many(
            seq!(
                skip_many(gcb(Icb::Extend), 0),
                gcb(Icb::Linker),
                skip_many(gcb(Icb::Extend | Icb::Linker), 0),
                gcb(Icb::Consonant),
            ),
            1,
        ))
        .parse_at(pos, cx)
}

fn cluster_core<S: Source + ?Sized>(pos: usize, cx: &mut Context<'_, S>) -> PResult<()> {
    choice!(
        hangul_syllable::<S>,
        ri_sequence::<S>,
        xpicto_sequence::<S>,
        conjunct_cluster::<S>,
        gcb(not(any!(Gcb::Control, Gcb::CR, Gcb::LF))),
    )
    .parse_at(pos, cx)
}

fn cluster<S: Source + ?Sized>(pos: usize, cx: &mut Context<'_, S>) -> PResult<()> {
    choice!(
        crlf::<S>,
        gcb(Gcb::Control),
        seq!(
            skip_many(gcb(Gcb::Prepend), 0),
            cluster_core::<S>,
            skip_many(gcb(any!(Gcb::Extend, Gcb::ZWJ, Gcb::SpacingMark)), 0),
        )
        .with_value(()),
        char::<S>.with_value(()),
    )
    .parse_at(pos, cx)
}

/// Parses one extended grapheme cluster.
///
/// A grapheme is never split: combining marks, emoji sequences, regional
/// indicator pairs, Hangul syllables and Indic conjuncts are consumed whole.
/// Fails only at the end of input or on a source that is not text.
///
/// # Example
/// ```
/// # use descent::prelude::*;
/// use descent::string::grapheme;
///
/// let flags = "\u{1f1ef}\u{1f1f5}\u{1f1eb}\u{1f1f7}";
/// assert_eq!(grapheme.parse(flags).index(), 8);
/// assert_eq!(grapheme.parse("\r\n").into_value().as_deref(), Some("\r\n"));
/// ```
pub fn grapheme<S>(pos: usize, cx: &mut Context<'_, S>) -> PResult<String>
where
    S: Source + ?Sized,
{
    // The grammar's inner alternatives are not part of the caller's errors.
    let mut scratch = Context::new(cx.source(), cx.config());
    let end = match cluster(pos, &mut scratch) {
        Ok(state) => state.position,
        Err(_) => return mismatch(pos, cx),
    };
    match cx.source().as_str().and_then(|text| text.get(pos..end)) {
        Some(text) => PResult::success(String::from(text), end),
        None => mismatch(pos, cx),
    }
}

/// Runs `re` anchored at `pos`, filling `caps` on a match.
/// Matches `re` against the text that remains at `pos`, so `^` and `\b` see
/// `pos` as the start of input. Capture offsets are relative to `pos`.
fn search<'t, S>(
    re: &Regex,
    caps: &mut Captures,
    pos: usize,
    cx: &Context<'t, S>,
) -> Option<&'t str>
where
    S: Source + ?Sized,
{
    let rest = cx.source().as_str()?.get(pos..)?;
    re.search_captures(&Input::new(rest).anchored(Anchored::Yes), caps);
    caps.is_match().then_some(rest)
}

fn group_text<'t>(rest: &'t str, caps: &Captures, index: usize) -> Option<&'t str> {
    caps.get_group(index)
        .and_then(|span| rest.get(span.start..span.end))
}

#[derive(Debug, Clone)]
struct RegexParser {
    re: Regex,
    group: usize,
}

impl<S: Source + ?Sized> Parse<S> for RegexParser {
    type Parsed = Option<String>;

    fn run(&self, pos: usize, cx: &mut Context<'_, S>) -> PResult<Option<String>> {
        let mut caps = self.re.create_captures();
        let Some(rest) = search(&self.re, &mut caps, pos, cx) else {
            return mismatch(pos, cx);
        };
        let end = pos + caps.get_match().map_or(0, |m| m.end());
        let value = group_text(rest, &caps, self.group).map(String::from);
        PResult::success(value, end)
    }
}

fn compile(pattern: &str) -> Result<Regex, StringError> {
    Ok(Regex::new(pattern)?)
}

/// Creates a parser that matches the regular expression `pattern` at the
/// current position and produces the matched text.
///
/// The match is anchored: it must start exactly at the current position.
/// The pattern only sees the text from the current position on, so `^` and
/// `\b` treat that position as the start of input.
/// Building the parser compiles the pattern, so build it once and reuse it.
///
/// # Example
/// ```
/// # use descent::prelude::*;
/// use descent::string::regex;
///
/// let number = regex::<str>(r"-?(0|[1-9][0-9]*)").unwrap();
/// assert_eq!(number.parse("-120 apples").index(), 4);
/// assert!(!number.parse("apples").is_success());
/// ```
pub fn regex<S>(pattern: &str) -> Result<impl Parse<S, Parsed = String>, StringError>
where
    S: Source + ?Sized,
{
    let parser = RegexParser {
        re: compile(pattern)?,
        group: 0,
    };
    Ok(map::<_, _, _, S>(parser, Option::<String>::unwrap_or_default))
}

/// Creates a parser like [`regex`] that produces the text of a single capture
/// group, or `None` when the group did not participate in the match.
///
/// # Example
/// ```
/// # use descent::prelude::*;
/// use descent::string::regex_capture;
///
/// let key = regex_capture::<str, _>(r"(?<key>\w+)\s*=", "key").unwrap();
/// assert_eq!(key.parse("width = 3").into_value(), Some(Some("width".into())));
/// ```
pub fn regex_capture<S, G>(
    pattern: &str,
    group: G,
) -> Result<impl Parse<S, Parsed = Option<String>>, StringError>
where
    S: Source + ?Sized,
    G: Into<Group>,
{
    let re = compile(pattern)?;
    let group = group.into();
    let info = re.group_info();
    let index = match &group {
        Group::Index(index) if *index < info.group_len(PatternID::ZERO) => Some(*index),
        Group::Index(_) => None,
        Group::Name(name) => info.to_index(PatternID::ZERO, name),
    };
    match index {
        Some(group) => Ok(RegexParser { re, group }),
        None => Err(StringError::NoGroup(group)),
    }
}

/// The capture groups of a regular expression match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Groups {
    groups: Vec<Option<(Span, String)>>,
    names: Rc<[(String, usize)]>,
}

impl Groups {
    /// Text of the whole match.
    pub fn matched(&self) -> &str {
        self.get(0).unwrap_or_default()
    }

    /// Text of group `index`, if it participated in the match.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.groups
            .get(index)?
            .as_ref()
            .map(|(_, text)| text.as_str())
    }

    /// Position of group `index` in the source.
    pub fn span(&self, index: usize) -> Option<Span> {
        self.groups.get(index)?.as_ref().map(|(span, _)| *span)
    }

    /// Text of the group called `name`.
    pub fn name(&self, name: &str) -> Option<&str> {
        self.names
            .iter()
            .find(|(group, _)| group == name)
            .and_then(|(_, index)| self.get(*index))
    }

    /// Number of groups, including the implicit group 0.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<&str>> + '_ {
        self.groups
            .iter()
            .map(|group| group.as_ref().map(|(_, text)| text.as_str()))
    }
}

#[derive(Debug, Clone)]
struct RegexGroupParser {
    re: Regex,
    names: Rc<[(String, usize)]>,
}

impl<S: Source + ?Sized> Parse<S> for RegexGroupParser {
    type Parsed = Groups;

    fn run(&self, pos: usize, cx: &mut Context<'_, S>) -> PResult<Groups> {
        let mut caps = self.re.create_captures();
        let Some(rest) = search(&self.re, &mut caps, pos, cx) else {
            return mismatch(pos, cx);
        };
        let groups = (0..caps.group_len())
            .map(|index| {
                let value = group_text(rest, &caps, index)?;
                let span = caps.get_group(index)?;
                Some((Span::new(pos + span.start, pos + span.end), String::from(value)))
            })
            .collect();
        let end = pos + caps.get_match().map_or(0, |m| m.end());
        PResult::success(
            Groups {
                groups,
                names: Rc::clone(&self.names),
            },
            end,
        )
    }
}

/// Creates a parser like [`regex`] that produces every capture group.
///
/// # Example
/// ```
/// # use descent::prelude::*;
/// use descent::string::regex_group;
///
/// let date = regex_group::<str>(r"(?<y>\d{4})-(?<m>\d{2})-(\d{2})").unwrap();
/// let groups = date.parse("2024-02-29").into_value().unwrap();
/// assert_eq!(groups.name("m"), Some("02"));
/// assert_eq!(groups.get(3), Some("29"));
/// ```
pub fn regex_group<S>(pattern: &str) -> Result<impl Parse<S, Parsed = Groups>, StringError>
where
    S: Source + ?Sized,
{
    let re = compile(pattern)?;
    let names = re
        .group_info()
        .pattern_names(PatternID::ZERO)
        .enumerate()
        .filter_map(|(index, name)| Some((String::from(name?), index)))
        .collect();
    Ok(RegexGroupParser { re, names })
}

#[cfg(test)]
mod test {
    use super::prop::{GeneralCategory, WhiteSpace};
    use super::*;
    use crate::basic::el;
    use crate::{Expectation, ParseResult};
    use alloc::vec;
    use pretty_assertions::assert_eq;

    #[test]
    fn chars() {
        assert_eq!(
            char::<str>.parse("λx"),
            ParseResult::Success {
                index: 2,
                value: 'λ'
            }
        );
        assert!(!char::<str>.parse("").is_success());
        assert_eq!(
            char_with_prop::<_, str>(!WhiteSpace).parse(" x"),
            ParseResult::Failure {
                index: 0,
                expectations: vec![Expectation::unknown(0)],
            }
        );
        assert_eq!(
            char_with_prop::<_, str>(GeneralCategory::Nd).parse("7").into_value(),
            Some('7')
        );
    }

    #[test]
    fn graphemes() {
        let cases = [
            ("e\u{301}x", "e\u{301}"),
            ("\r\nx", "\r\n"),
            (
                "\u{1f468}\u{200d}\u{1f469}\u{200d}\u{1f467}x",
                "\u{1f468}\u{200d}\u{1f469}\u{200d}\u{1f467}",
            ),
            ("\u{1f1ef}\u{1f1f5}\u{1f1eb}", "\u{1f1ef}\u{1f1f5}"),
            ("\u{1112}\u{1161}\u{11ab}x", "\u{1112}\u{1161}\u{11ab}"),
            ("\u{915}\u{94d}\u{937}x", "\u{915}\u{94d}\u{937}"),
            ("ab", "a"),
        ];
        for (src, expected) in cases {
            assert_eq!(
                grapheme::<str>.parse(src),
                ParseResult::Success {
                    index: expected.len(),
                    value: String::from(expected),
                },
                "{src:?}"
            );
        }
    }

    #[test]
    fn grapheme_reports_only_its_start() {
        assert_eq!(
            grapheme::<str>.parse(""),
            ParseResult::Failure {
                index: 0,
                expectations: vec![Expectation::unknown(0)],
            }
        );
    }

    #[test]
    fn regex_is_anchored() {
        let digits = regex::<str>("[0-9]+").unwrap();
        assert_eq!(
            el('x').then(digits).parse("x42y"),
            ParseResult::Success {
                index: 3,
                value: String::from("42"),
            }
        );
        let digits = regex::<str>("[0-9]+").unwrap();
        assert_eq!(
            digits.parse("x42"),
            ParseResult::Failure {
                index: 0,
                expectations: vec![Expectation::unknown(0)],
            }
        );
    }

    #[test]
    fn regex_empty_match() {
        let spaces = regex::<str>(" *").unwrap();
        assert_eq!(
            spaces.parse("x"),
            ParseResult::Success {
                index: 0,
                value: String::new(),
            }
        );
    }

    #[test]
    fn regex_input_starts_at_position() {
        let p = el('x').then(regex::<str>(r"^a\b").unwrap());
        assert_eq!(
            p.parse("xa"),
            ParseResult::Success {
                index: 2,
                value: String::from("a"),
            }
        );
        assert!(!p.parse("xab").is_success());

        let p = el('x').then(regex_group::<str>(r"(a)(b)").unwrap());
        let groups = p.parse("xab").into_value().unwrap();
        assert_eq!(groups.span(0), Some(Span::new(1, 3)));
        assert_eq!(groups.span(2), Some(Span::new(2, 3)));
        assert_eq!(groups.get(2), Some("b"));
    }

    #[test]
    fn regex_needs_text() {
        let p = regex::<[char]>("a").unwrap();
        assert_eq!(
            p.parse(&['a'][..]),
            ParseResult::Failure {
                index: 0,
                expectations: vec![Expectation::unknown(0)],
            }
        );
    }

    #[test]
    fn captures() {
        let p = regex_capture::<str, _>("(a)|(b)", 1).unwrap();
        assert_eq!(p.parse("a").into_value(), Some(Some(String::from("a"))));
        let p = regex_capture::<str, _>("(a)|(b)", 1).unwrap();
        assert_eq!(p.parse("b").into_value(), Some(None));

        assert!(matches!(
            regex_capture::<str, _>("(a)", 2),
            Err(StringError::NoGroup(Group::Index(2)))
        ));
        assert!(matches!(
            regex_capture::<str, _>("(?<x>a)", "y"),
            Err(StringError::NoGroup(_))
        ));
        assert!(matches!(regex::<str>("("), Err(StringError::Regex(_))));
    }

    #[test]
    fn groups() {
        let p = regex_group::<str>(r"(?<key>[a-z]+)(?::(?<value>[0-9]+))?").unwrap();
        let groups = p.parse("abc:12").into_value().unwrap();
        assert_eq!(groups.matched(), "abc:12");
        assert_eq!(groups.len(), 3);
        assert_eq!(groups.name("key"), Some("abc"));
        assert_eq!(groups.name("value"), Some("12"));
        assert_eq!(groups.span(2), Some(Span::new(4, 6)));

        let groups = p.parse("abc").into_value().unwrap();
        assert_eq!(groups.name("value"), None);
        assert_eq!(groups.iter().collect::<Vec<_>>(), vec![Some("abc"), Some("abc"), None]);
    }
}

use crate::{AsSource, Config, Context, Expectation, Parse, Source};
use alloc::{string::String, vec::Vec};

/// The outcome of parsing a whole source.
///
/// On failure, `index` is the farthest position any parser reached before
/// failing and `expectations` lists what was expected there, with labelled
/// runs collapsed.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseResult<T> {
    Success {
        index: usize,
        value: T,
    },
    Failure {
        index: usize,
        expectations: Vec<Expectation>,
    },
}

impl<T> ParseResult<T> {
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The position reached on success, or the farthest failure position.
    pub const fn index(&self) -> usize {
        match self {
            Self::Success { index, .. } => *index,
            Self::Failure { index, .. } => *index,
        }
    }

    pub const fn value(&self) -> Option<&T> {
        match self {
            Self::Success { value, .. } => Some(value),
            Self::Failure { .. } => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Success { value, .. } => Some(value),
            Self::Failure { .. } => None,
        }
    }

    /// The expectations of a failure. Empty on success.
    pub fn expectations(&self) -> &[Expectation] {
        match self {
            Self::Success { .. } => &[],
            Self::Failure { expectations, .. } => expectations,
        }
    }

    pub fn map<F, R>(self, map_fn: F) -> ParseResult<R>
    where
        F: FnOnce(T) -> R,
    {
        match self {
            Self::Success { index, value } => ParseResult::Success {
                index,
                value: map_fn(value),
            },
            Self::Failure {
                index,
                expectations,
            } => ParseResult::Failure {
                index,
                expectations,
            },
        }
    }

    /// Converts into a [`Result`], turning a failure into a [`ParseError`].
    ///
    /// # Example
    /// ```
    /// # use descent::prelude::*;
    /// let err = el('a').parse("b").into_result().unwrap_err();
    /// assert_eq!(err.to_string(), "expected 'a' at index 0");
    /// ```
    pub fn into_result(self) -> Result<T, ParseError> {
        match self {
            Self::Success { value, .. } => Ok(value),
            Self::Failure {
                index,
                expectations,
            } => Err(ParseError {
                index,
                expectations,
            }),
        }
    }
}

#[cfg(feature = "serde")]
impl<T: serde::Serialize> serde::Serialize for ParseResult<T> {
    fn serialize<Ser: serde::Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("ParseResult", 3)?;
        match self {
            Self::Success { index, value } => {
                state.serialize_field("success", &true)?;
                state.serialize_field("index", index)?;
                state.serialize_field("value", value)?;
            }
            Self::Failure {
                index,
                expectations,
            } => {
                state.serialize_field("success", &false)?;
                state.serialize_field("index", index)?;
                state.serialize_field("expectations", expectations)?;
            }
        }
        state.end()
    }
}

/// A failed parse as an error value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{} at index {index}", describe(.expectations))]
pub struct ParseError {
    pub index: usize,
    pub expectations: Vec<Expectation>,
}

fn describe(expectations: &[Expectation]) -> String {
    let names: Vec<String> = expectations
        .iter()
        .filter(|exp| !matches!(exp, Expectation::Unknown { .. }))
        .map(|exp| alloc::format!("{exp}"))
        .collect();

    match names.split_last() {
        None => String::from("unexpected input"),
        Some((last, [])) => alloc::format!("expected {last}"),
        Some((last, init)) => alloc::format!("expected {} or {last}", init.join(", ")),
    }
}

/// Parses `src` with `parser`, starting at position zero.
///
/// A single [`Context`] is created for the call. The parser does not need to
/// consume the whole source; combine it with [`eoi`](crate::basic::eoi) to
/// require that.
pub fn parse<P, S, N>(parser: &P, src: &N, cfg: &Config) -> ParseResult<P::Parsed>
where
    P: Parse<S> + ?Sized,
    S: Source + ?Sized,
    N: AsSource<S> + ?Sized,
{
    let src = src.as_source();
    tracing::trace!(len = src.len(), settings = cfg.len(), "parse");

    let mut cx = Context::new(src, cfg);
    let res = parser.run(0, &mut cx);
    let errors = cx.into_errors();

    match res {
        Ok(state) => {
            tracing::debug!(index = state.position, "parse succeeded");
            ParseResult::Success {
                index: state.position,
                value: state.value,
            }
        }
        Err(fail) => {
            let index = errors.farthest().unwrap_or(fail.0);
            let expectations = errors.finish();
            tracing::debug!(index, expectations = expectations.len(), "parse failed");
            ParseResult::Failure {
                index,
                expectations,
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::prelude::*;
    use alloc::{string::ToString, vec};
    use pretty_assertions::assert_eq;

    #[test]
    fn error_display() {
        let err = ParseError {
            index: 4,
            expectations: vec![
                Expectation::expected(4, "'a'"),
                Expectation::unknown(4),
                Expectation::expected(4, "'b'"),
                Expectation::label(4, 0, "thing"),
            ],
        };
        assert_eq!(err.to_string(), "expected 'a', 'b' or thing at index 4");

        let err = ParseError {
            index: 0,
            expectations: vec![Expectation::unknown(0)],
        };
        assert_eq!(err.to_string(), "unexpected input at index 0");
    }

    #[test]
    fn failure_uses_farthest_index() {
        fn ab(pos: usize, cx: &mut Context<'_, str>) -> PResult<char> {
            el('a').then(el('b')).or(el('c')).parse_at(pos, cx)
        }

        assert_eq!(
            ab.parse("ax"),
            ParseResult::Failure {
                index: 1,
                expectations: vec![Expectation::expected(1, "'b'")],
            }
        );
        assert_eq!(ab.parse("c"), ParseResult::Success { index: 1, value: 'c' });
    }

    #[test]
    fn success_ignores_stale_errors() {
        let res = el('a').or(el('b')).parse("b");
        assert!(res.is_success());
        assert!(res.expectations().is_empty());
        assert_eq!(res.map(|ch| ch.to_ascii_uppercase()).into_value(), Some('B'));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serialize_shape() {
        let ok = el('a').parse("a");
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            serde_json::json!({ "success": true, "index": 1, "value": "a" })
        );

        let err = el('a').parse("b");
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            serde_json::json!({
                "success": false,
                "index": 0,
                "expectations": [{ "type": "Expected", "index": 0, "value": "'a'" }],
            })
        );
    }
}

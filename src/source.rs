use alloc::{borrow::Cow, boxed::Box, format, rc::Rc, string::String, sync::Arc, vec::Vec};
use core::fmt::Debug;

/// An indexed, finite input that parsers read from.
///
/// A position is an index into the source between `0` and [`len`](Source::len)
/// inclusive. Parsers never modify a source; backtracking is just a matter of
/// resuming from an earlier position.
///
/// `str` and `[T]` implement [`Source`]. For `str`, positions are byte offsets
/// and every symbol is a whole `char`, so a symbol may be several positions
/// wide. For `[T]`, every element is one symbol of width one.
pub trait Source {
    /// The symbol type this source is made of.
    type Symbol;

    /// The number of positions in the source.
    fn len(&self) -> usize;

    /// Gets the symbol starting at `pos` along with its width.
    ///
    /// Returns [`None`] at or past the end of the source, or when `pos` is not
    /// at the start of a symbol.
    fn symbol_at(&self, pos: usize) -> Option<(Self::Symbol, usize)>;

    /// Returns `true` if the source has no positions.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Gets the source as a string, if it is one.
    ///
    /// Text matchers such as regular expressions need the whole remaining text
    /// rather than one symbol at a time.
    fn as_str(&self) -> Option<&str> {
        None
    }
}

impl Source for str {
    type Symbol = char;

    #[inline]
    fn len(&self) -> usize {
        str::len(self)
    }

    #[inline]
    fn symbol_at(&self, pos: usize) -> Option<(char, usize)> {
        let ch = self.get(pos..)?.chars().next()?;
        Some((ch, ch.len_utf8()))
    }

    #[inline]
    fn as_str(&self) -> Option<&str> {
        Some(self)
    }
}

impl<T: Clone> Source for [T] {
    type Symbol = T;

    #[inline]
    fn len(&self) -> usize {
        <[T]>::len(self)
    }

    #[inline]
    fn symbol_at(&self, pos: usize) -> Option<(T, usize)> {
        self.get(pos).map(|sym| (sym.clone(), 1))
    }
}

/// Trait for types that can be borrowed as a [`Source`].
///
/// [`Parse::parse`](crate::Parse::parse) accepts any [`AsSource`], so a
/// `String`, `Vec<T>` or array can be passed where a `str` or `[T]` parser is
/// expected.
pub trait AsSource<S: Source + ?Sized> {
    fn as_source(&self) -> &S;
}

impl<S: Source + ?Sized> AsSource<S> for S {
    #[inline]
    fn as_source(&self) -> &S {
        self
    }
}

impl AsSource<str> for String {
    #[inline]
    fn as_source(&self) -> &str {
        self.as_str()
    }
}

impl AsSource<str> for Box<str> {
    #[inline]
    fn as_source(&self) -> &str {
        self
    }
}

impl AsSource<str> for Rc<str> {
    #[inline]
    fn as_source(&self) -> &str {
        self
    }
}

impl AsSource<str> for Arc<str> {
    #[inline]
    fn as_source(&self) -> &str {
        self
    }
}

impl AsSource<str> for Cow<'_, str> {
    #[inline]
    fn as_source(&self) -> &str {
        self
    }
}

impl<T: Clone, const LEN: usize> AsSource<[T]> for [T; LEN] {
    #[inline]
    fn as_source(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T: Clone> AsSource<[T]> for Vec<T> {
    #[inline]
    fn as_source(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T: Clone> AsSource<[T]> for Box<[T]> {
    #[inline]
    fn as_source(&self) -> &[T] {
        self
    }
}

impl<T: Clone> AsSource<[T]> for Rc<[T]> {
    #[inline]
    fn as_source(&self) -> &[T] {
        self
    }
}

impl<T: Clone> AsSource<[T]> for Arc<[T]> {
    #[inline]
    fn as_source(&self) -> &[T] {
        self
    }
}

/// A sequence of symbols to match against a source.
///
/// Used by [`literal`](crate::basic::literal), [`one_of`](crate::basic::one_of)
/// and [`none_of`](crate::basic::none_of). Implemented for strings and chars
/// (matching `char` symbols) and for arrays, slices and vectors of any
/// comparable symbol.
pub trait Pattern<Sym> {
    /// Gets the symbol at `idx`, if the pattern is that long.
    fn nth_symbol(&self, idx: usize) -> Option<Sym>;

    /// Describes the pattern for diagnostics.
    fn describe(&self) -> Cow<'static, str>;

    /// Checks whether `sym` is any of the symbols in the pattern.
    fn contains(&self, sym: &Sym) -> bool
    where
        Sym: PartialEq,
    {
        let mut idx = 0;
        while let Some(candidate) = self.nth_symbol(idx) {
            if candidate == *sym {
                return true;
            }
            idx += 1;
        }
        false
    }
}

impl Pattern<char> for char {
    fn nth_symbol(&self, idx: usize) -> Option<char> {
        (idx == 0).then_some(*self)
    }

    fn describe(&self) -> Cow<'static, str> {
        format!("{self:?}").into()
    }

    fn contains(&self, sym: &char) -> bool {
        self == sym
    }
}

impl Pattern<char> for &str {
    fn nth_symbol(&self, idx: usize) -> Option<char> {
        self.chars().nth(idx)
    }

    fn describe(&self) -> Cow<'static, str> {
        format!("{self:?}").into()
    }

    fn contains(&self, sym: &char) -> bool {
        self.chars().any(|ch| ch == *sym)
    }
}

impl Pattern<char> for String {
    fn nth_symbol(&self, idx: usize) -> Option<char> {
        self.as_str().nth_symbol(idx)
    }

    fn describe(&self) -> Cow<'static, str> {
        self.as_str().describe()
    }

    fn contains(&self, sym: &char) -> bool {
        Pattern::contains(&self.as_str(), sym)
    }
}

impl<T: Clone + Debug> Pattern<T> for &[T] {
    fn nth_symbol(&self, idx: usize) -> Option<T> {
        self.get(idx).cloned()
    }

    fn describe(&self) -> Cow<'static, str> {
        format!("{self:?}").into()
    }
}

impl<T: Clone + Debug, const LEN: usize> Pattern<T> for [T; LEN] {
    fn nth_symbol(&self, idx: usize) -> Option<T> {
        self.get(idx).cloned()
    }

    fn describe(&self) -> Cow<'static, str> {
        format!("{self:?}").into()
    }
}

impl<T: Clone + Debug> Pattern<T> for Vec<T> {
    fn nth_symbol(&self, idx: usize) -> Option<T> {
        self.get(idx).cloned()
    }

    fn describe(&self) -> Cow<'static, str> {
        format!("{self:?}").into()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn str_positions_are_byte_offsets() {
        let src = "aé€";
        assert_eq!(Source::len(src), 6);
        assert_eq!(src.symbol_at(0), Some(('a', 1)));
        assert_eq!(src.symbol_at(1), Some(('é', 2)));
        assert_eq!(src.symbol_at(2), None);
        assert_eq!(src.symbol_at(3), Some(('€', 3)));
        assert_eq!(src.symbol_at(6), None);
    }

    #[test]
    fn slice_symbols_have_unit_width() {
        let src: &[u8] = &[1, 2, 3];
        assert_eq!(Source::len(src), 3);
        assert_eq!(src.symbol_at(2), Some((3, 1)));
        assert_eq!(src.symbol_at(3), None);
        assert_eq!(Source::as_str(src), None);
    }

    #[test]
    fn patterns() {
        assert_eq!("abc".nth_symbol(1), Some('b'));
        assert!(Pattern::contains(&"+-", &'-'));
        assert!(!Pattern::contains(&'x', &'y'));
        assert!(Pattern::contains(&[1, 2, 3], &2));
        assert_eq!("null".describe(), "\"null\"");
        assert_eq!([1u8, 2].describe(), "[1, 2]");
    }
}

//! Unicode character properties and combinators.
//!
//! Properties are small `Copy` values that answer whether a `char` has them.
//! They combine with `!`, `&` and `|`, or with [`not`], [`and`], [`or`] and the
//! [`all!`](crate::string::prop::all) and [`any!`](crate::string::prop::any)
//! macros in `const` contexts.
//!
//! ```
//! use descent::string::prop::{GeneralCategory, Property, WhiteSpace};
//!
//! let blank = WhiteSpace & !GeneralCategory::Zl;
//! assert!(blank.contains(' '));
//! assert!(!blank.contains('\u{2028}'));
//! assert!(GeneralCategory::L.contains('ж'));
//! ```

use icu_properties::props::{self as icup, BinaryProperty, EnumeratedProperty};

#[doc(inline)]
pub use crate::{string_prop_all as all, string_prop_any as any};

/// A set of characters defined by their Unicode properties.
pub trait Property: core::fmt::Debug + Copy {
    fn contains(self, ch: char) -> bool;
}

#[doc(hidden)]
#[macro_export]
macro_rules! string_prop_all {
    ($prop:expr $(,)?) => {{
        $prop
    }};
    ($prop0:expr, $($propn:expr),+ $(,)?) => {{
        $crate::string::prop::and($prop0, $crate::string::prop::all!($($propn),+))
    }};
}

#[doc(hidden)]
#[macro_export]
macro_rules! string_prop_any {
    ($prop:expr $(,)?) => {{
        $prop
    }};
    ($prop0:expr, $($propn:expr),+ $(,)?) => {{
        $crate::string::prop::or($prop0, $crate::string::prop::any!($($propn),+))
    }};
}

#[derive(Debug, Clone, Copy)]
pub struct Not<P>(P);

#[derive(Debug, Clone, Copy)]
pub struct And<L, R>(L, R);

#[derive(Debug, Clone, Copy)]
pub struct Or<L, R>(L, R);

pub const fn not<P: Property>(property: P) -> Not<P> {
    Not(property)
}

pub const fn and<L: Property, R: Property>(lhs: L, rhs: R) -> And<L, R> {
    And(lhs, rhs)
}

pub const fn or<L: Property, R: Property>(lhs: L, rhs: R) -> Or<L, R> {
    Or(lhs, rhs)
}

impl<P: Property> Property for Not<P> {
    fn contains(self, ch: char) -> bool {
        !self.0.contains(ch)
    }
}

impl<L: Property, R: Property> Property for And<L, R> {
    fn contains(self, ch: char) -> bool {
        self.0.contains(ch) && self.1.contains(ch)
    }
}

impl<L: Property, R: Property> Property for Or<L, R> {
    fn contains(self, ch: char) -> bool {
        self.0.contains(ch) || self.1.contains(ch)
    }
}

/// Implements `!`, `&` and `|` for a property type.
macro_rules! prop_ops {
    ([$($gen:tt)*] $ty:ty) => {
        impl<$($gen)*> core::ops::Not for $ty
        where
            Self: Property,
        {
            type Output = Not<Self>;

            fn not(self) -> Not<Self> {
                Not(self)
            }
        }

        impl<$($gen)* Rhs: Property> core::ops::BitAnd<Rhs> for $ty
        where
            Self: Property,
        {
            type Output = And<Self, Rhs>;

            fn bitand(self, rhs: Rhs) -> And<Self, Rhs> {
                And(self, rhs)
            }
        }

        impl<$($gen)* Rhs: Property> core::ops::BitOr<Rhs> for $ty
        where
            Self: Property,
        {
            type Output = Or<Self, Rhs>;

            fn bitor(self, rhs: Rhs) -> Or<Self, Rhs> {
                Or(self, rhs)
            }
        }
    };
}

prop_ops!([P,] Not<P>);
prop_ops!([L, R,] And<L, R>);
prop_ops!([L, R,] Or<L, R>);

macro_rules! def_bool_prop {
    ($(#[$($attr:tt)*])* $ty:ident => $prop:ty) => {
        $(#[$($attr)*])*
        #[derive(Debug, Clone, Copy)]
        pub struct $ty;

        impl Property for $ty {
            fn contains(self, ch: char) -> bool {
                <$prop as BinaryProperty>::for_char(ch)
            }
        }

        prop_ops!([] $ty);
    };
}

def_bool_prop!(Alphabetic => icup::Alphabetic);
def_bool_prop!(AsciiHexDigit => icup::AsciiHexDigit);
def_bool_prop!(Dash => icup::Dash);
def_bool_prop!(Emoji => icup::Emoji);
def_bool_prop!(ExtendedPictographic => icup::ExtendedPictographic);
def_bool_prop!(HexDigit => icup::HexDigit);
def_bool_prop!(IdContinue => icup::IdContinue);
def_bool_prop!(IdStart => icup::IdStart);
def_bool_prop!(Ideographic => icup::Ideographic);
def_bool_prop!(Lowercase => icup::Lowercase);
def_bool_prop!(Math => icup::Math);
def_bool_prop!(PatternSyntax => icup::PatternSyntax);
def_bool_prop!(PatternWhiteSpace => icup::PatternWhiteSpace);
def_bool_prop!(QuotationMark => icup::QuotationMark);
def_bool_prop!(Uppercase => icup::Uppercase);
def_bool_prop!(WhiteSpace => icup::WhiteSpace);
def_bool_prop!(XidContinue => icup::XidContinue);
def_bool_prop!(XidStart => icup::XidStart);

macro_rules! def_enum_prop {
    (
        $(#[$($attr:tt)*])*
        enum $name:ident { $($var:ident),* $(,)? } => $prop:ty, default = $dvar:ident
    ) => {
        $(#[$($attr)*])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $($var,)*
        }

        impl $name {
            /// Gets the property value of a code point.
            pub fn of(ch: char) -> Self {
                match <$prop as EnumeratedProperty>::for_char(ch) {
                    $(<$prop>::$var => Self::$var,)*
                    #[allow(unreachable_patterns)]
                    _ => Self::$dvar,
                }
            }
        }

        impl Property for $name {
            fn contains(self, ch: char) -> bool {
                self == Self::of(ch)
            }
        }

        prop_ops!([] $name);
    };
}

def_enum_prop! {
    enum GeneralCategory {
        Unassigned,
        UppercaseLetter,
        LowercaseLetter,
        TitlecaseLetter,
        ModifierLetter,
        OtherLetter,
        NonspacingMark,
        SpacingMark,
        EnclosingMark,
        DecimalNumber,
        LetterNumber,
        OtherNumber,
        SpaceSeparator,
        LineSeparator,
        ParagraphSeparator,
        Control,
        Format,
        PrivateUse,
        Surrogate,
        DashPunctuation,
        OpenPunctuation,
        ClosePunctuation,
        ConnectorPunctuation,
        InitialPunctuation,
        FinalPunctuation,
        OtherPunctuation,
        MathSymbol,
        CurrencySymbol,
        ModifierSymbol,
        OtherSymbol,
    } => icup::GeneralCategory,
    default = Unassigned
}

#[allow(non_upper_case_globals)]
impl GeneralCategory {
    pub const Cc: Self = Self::Control;
    pub const Cf: Self = Self::Format;
    pub const Co: Self = Self::PrivateUse;
    pub const Lu: Self = Self::UppercaseLetter;
    pub const Ll: Self = Self::LowercaseLetter;
    pub const Lt: Self = Self::TitlecaseLetter;
    pub const Lm: Self = Self::ModifierLetter;
    pub const Lo: Self = Self::OtherLetter;
    pub const Mn: Self = Self::NonspacingMark;
    pub const Mc: Self = Self::SpacingMark;
    pub const Me: Self = Self::EnclosingMark;
    pub const Nd: Self = Self::DecimalNumber;
    pub const Nl: Self = Self::LetterNumber;
    pub const No: Self = Self::OtherNumber;
    pub const Pd: Self = Self::DashPunctuation;
    pub const Ps: Self = Self::OpenPunctuation;
    pub const Pe: Self = Self::ClosePunctuation;
    pub const Pc: Self = Self::ConnectorPunctuation;
    pub const Pi: Self = Self::InitialPunctuation;
    pub const Pf: Self = Self::FinalPunctuation;
    pub const Po: Self = Self::OtherPunctuation;
    pub const Sm: Self = Self::MathSymbol;
    pub const Sc: Self = Self::CurrencySymbol;
    pub const Sk: Self = Self::ModifierSymbol;
    pub const So: Self = Self::OtherSymbol;
    pub const Zs: Self = Self::SpaceSeparator;
    pub const Zl: Self = Self::LineSeparator;
    pub const Zp: Self = Self::ParagraphSeparator;

    /// Any letter.
    pub const L: Or<Self, Or<Self, Or<Self, Or<Self, Self>>>> =
        any!(Self::Lu, Self::Ll, Self::Lt, Self::Lm, Self::Lo);

    /// Any mark.
    pub const M: Or<Self, Or<Self, Self>> = any!(Self::Mn, Self::Mc, Self::Me);

    /// Any number.
    pub const N: Or<Self, Or<Self, Self>> = any!(Self::Nd, Self::Nl, Self::No);

    /// Any punctuation.
    pub const P: Or<Self, Or<Self, Or<Self, Or<Self, Or<Self, Or<Self, Self>>>>>> =
        any!(Self::Pd, Self::Ps, Self::Pe, Self::Pc, Self::Pi, Self::Pf, Self::Po);

    /// Any symbol.
    pub const S: Or<Self, Or<Self, Or<Self, Self>>> =
        any!(Self::Sm, Self::Sc, Self::Sk, Self::So);

    /// Any separator.
    pub const Z: Or<Self, Or<Self, Self>> = any!(Self::Zs, Self::Zl, Self::Zp);
}

def_enum_prop! {
    enum GraphemeClusterBreak {
        Other,
        Control,
        CR,
        Extend,
        L,
        LF,
        LV,
        LVT,
        T,
        V,
        SpacingMark,
        Prepend,
        RegionalIndicator,
        EBase,
        EBaseGAZ,
        EModifier,
        GlueAfterZwj,
        ZWJ,
    } => icup::GraphemeClusterBreak,
    default = Other
}

def_enum_prop! {
    enum IndicSyllabicCategory {
        Other,
        Consonant,
        Virama,
    } => icup::IndicSyllabicCategory,
    default = Other
}

/// The `Indic_Conjunct_Break` property used by grapheme cluster rule GB9c.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IndicConjunctBreak {
    None,
    Linker,
    Consonant,
    Extend,
}

impl IndicConjunctBreak {
    /// Gets the property value of a code point.
    pub fn of(ch: char) -> Self {
        let conjunct_script = matches!(
            icup::Script::for_char(ch),
            icup::Script::Bengali
                | icup::Script::Devanagari
                | icup::Script::Gujarati
                | icup::Script::Malayalam
                | icup::Script::Oriya
                | icup::Script::Telugu
        );
        if conjunct_script {
            match IndicSyllabicCategory::of(ch) {
                IndicSyllabicCategory::Virama => return Self::Linker,
                IndicSyllabicCategory::Consonant => return Self::Consonant,
                _ => {}
            }
        }
        match GraphemeClusterBreak::of(ch) {
            GraphemeClusterBreak::ZWJ | GraphemeClusterBreak::Extend if ch != '\u{200c}' => {
                Self::Extend
            }
            _ => Self::None,
        }
    }
}

impl Property for IndicConjunctBreak {
    fn contains(self, ch: char) -> bool {
        self == Self::of(ch)
    }
}

prop_ops!([] IndicConjunctBreak);

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn combinators() {
        let ident = XidStart | all!(Alphabetic, Lowercase);
        assert!(ident.contains('a'));
        assert!(!ident.contains('1'));
        assert!((!WhiteSpace).contains('x'));
        assert!(not(Math).contains('a'));
        assert!((AsciiHexDigit & !GeneralCategory::Nd).contains('f'));
    }

    #[test]
    fn categories() {
        assert_eq!(GeneralCategory::of('A'), GeneralCategory::Lu);
        assert_eq!(GeneralCategory::of(' '), GeneralCategory::Zs);
        assert!(GeneralCategory::P.contains('!'));
        assert_eq!(GraphemeClusterBreak::of('\r'), GraphemeClusterBreak::CR);
        assert_eq!(GraphemeClusterBreak::of('\u{301}'), GraphemeClusterBreak::Extend);
        assert_eq!(IndicConjunctBreak::of('\u{915}'), IndicConjunctBreak::Consonant);
        assert_eq!(IndicConjunctBreak::of('\u{94d}'), IndicConjunctBreak::Linker);
        assert_eq!(IndicConjunctBreak::of('a'), IndicConjunctBreak::None);
    }
}

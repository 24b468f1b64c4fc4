use crate::{Checkpoint, ErrorSink, Expectation, Source};
use alloc::{borrow::Cow, collections::BTreeMap, string::String};

/// A configuration value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(untagged))]
pub enum ConfigValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for ConfigValue {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl From<f64> for ConfigValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        Self::Str(value.into())
    }
}

/// Read-only settings visible to every parser during a parse.
///
/// The engine itself never looks at the configuration; it exists so that
/// grammars can be parameterized without rebuilding them.
///
/// # Example
/// ```
/// use descent::{Config, ConfigValue};
///
/// let cfg = Config::new().with("max_depth", 32).with("name", "demo");
/// assert_eq!(cfg.get_int("max_depth"), Some(32));
/// assert_eq!(cfg.get_str("name"), Some("demo"));
/// assert_eq!(cfg.get_bool("name"), None);
/// assert_eq!(cfg.get("missing"), None::<&ConfigValue>);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(transparent))]
pub struct Config {
    values: BTreeMap<String, ConfigValue>,
}

impl Config {
    pub const fn new() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }

    /// Adds a setting, consuming and returning the [`Config`].
    pub fn with<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<ConfigValue>,
    {
        self.insert(key, value);
        self
    }

    /// Adds a setting, returning the value it replaced.
    pub fn insert<K, V>(&mut self, key: K, value: V) -> Option<ConfigValue>
    where
        K: Into<String>,
        V: Into<ConfigValue>,
    {
        self.values.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.values.get(key)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.get(key)? {
            ConfigValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        match self.get(key)? {
            ConfigValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Gets a float setting. Integer settings are converted.
    pub fn get_float(&self, key: &str) -> Option<f64> {
        match self.get(key)? {
            ConfigValue::Float(value) => Some(*value),
            ConfigValue::Int(value) => Some(*value as f64),
            _ => None,
        }
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.get(key)? {
            ConfigValue::Str(value) => Some(value),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.values.iter().map(|(key, value)| (key.as_str(), value))
    }
}

impl<K, V> FromIterator<(K, V)> for Config
where
    K: Into<String>,
    V: Into<ConfigValue>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

/// Per-parse environment shared by every parser.
///
/// A [`Context`] is created once for each call to [`parse`](crate::parse). It
/// borrows the source and configuration and owns the [`ErrorSink`] for that
/// parse. Parsers report failures through it before returning [`Fail`](crate::Fail).
pub struct Context<'a, S: Source + ?Sized> {
    src: &'a S,
    cfg: &'a Config,
    errors: ErrorSink,
}

impl<'a, S: Source + ?Sized> Context<'a, S> {
    pub fn new(src: &'a S, cfg: &'a Config) -> Self {
        Self {
            src,
            cfg,
            errors: ErrorSink::new(),
        }
    }

    /// The source being parsed.
    pub fn source(&self) -> &'a S {
        self.src
    }

    pub fn config(&self) -> &'a Config {
        self.cfg
    }

    /// Registers a failure at `index` without saying what was expected.
    pub fn add_error(&mut self, index: usize) {
        self.errors.add(index, None);
    }

    /// Registers a failure at the record's position.
    pub fn report(&mut self, expectation: Expectation) {
        self.errors.add(expectation.index(), Some(expectation));
    }

    /// Shorthand for reporting [`Expectation::Unknown`].
    pub fn unknown(&mut self, index: usize) {
        self.report(Expectation::unknown(index));
    }

    /// Shorthand for reporting [`Expectation::Expected`].
    pub fn expected(&mut self, index: usize, value: impl Into<Cow<'static, str>>) {
        self.report(Expectation::expected(index, value));
    }

    pub fn checkpoint(&self) -> Checkpoint {
        self.errors.checkpoint()
    }

    pub fn count_since(&self, checkpoint: Checkpoint) -> usize {
        self.errors.count_since(checkpoint)
    }

    pub fn errors(&self) -> &ErrorSink {
        &self.errors
    }

    pub(crate) fn into_errors(self) -> ErrorSink {
        self.errors
    }
}

impl<S: Source + ?Sized> core::fmt::Debug for Context<'_, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Context")
            .field("len", &self.src.len())
            .field("cfg", &self.cfg)
            .field("errors", &self.errors)
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn config_getters() {
        let cfg: Config = [("a", ConfigValue::Int(2)), ("b", ConfigValue::Bool(true))]
            .into_iter()
            .collect();
        assert_eq!(cfg.len(), 2);
        assert_eq!(cfg.get_float("a"), Some(2.0));
        assert_eq!(cfg.get_bool("b"), Some(true));
        assert_eq!(cfg.get_str("b"), None);
    }

    #[test]
    fn context_reports_into_sink() {
        let cfg = Config::new();
        let mut cx = Context::new("abc", &cfg);
        let cp = cx.checkpoint();
        cx.expected(1, "'b'");
        cx.unknown(1);
        cx.unknown(0);
        assert_eq!(cx.count_since(cp), 2);
        assert_eq!(cx.errors().farthest(), Some(1));
        cx.add_error(2);
        assert!(cx.errors().records().is_empty());
    }
}

//! Typed values stored in records and carried by filter literals.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{NaiveDate, NaiveTime};
use once_cell::sync::OnceCell;

use crate::dict::Dict;
use crate::error::{ModelError, ModelResult};
use crate::kind::Kind;

/// Returns true for characters allowed in ref ids and symbol names.
pub fn is_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | ':' | '-' | '.' | '~')
}

/// Returns true for characters allowed in a number's unit.
pub fn is_unit_char(c: char) -> bool {
    c.is_alphabetic() || matches!(c, '%' | '_' | '/' | '$') || !c.is_ascii()
}

// ==================== Number ====================

/// A number with an optional unit, e.g. `23cm` or `72.5°F`.
///
/// Equality treats `NaN` as equal to itself, so a `NaN` literal matches a
/// `NaN` value and compares equal to its own re-parse.
#[derive(Debug, Clone)]
pub struct Number {
    /// Magnitude.
    pub value: f64,
    /// Unit symbol, if any.
    pub unit: Option<String>,
}

impl Number {
    /// Creates a unitless number.
    pub fn new(value: f64) -> Self {
        Self { value, unit: None }
    }

    /// Creates a number with a unit.
    pub fn with_unit(value: f64, unit: impl Into<String>) -> Self {
        Self {
            value,
            unit: Some(unit.into()),
        }
    }

    /// Renders the number as filter text.
    ///
    /// `INF`, `-INF` and `NaN` have no unit syntax, so a unit on a
    /// non-finite number is not rendered: `INF` with unit `kW` renders as
    /// `INF` and re-parses as a unitless number.
    pub fn to_filter_text(&self) -> String {
        let magnitude = if self.value.is_nan() {
            "NaN".to_string()
        } else if self.value.is_infinite() {
            let text = if self.value > 0.0 { "INF" } else { "-INF" };
            text.to_string()
        } else if self.value.fract() == 0.0 && self.value.abs() < 1e15 {
            format!("{}", self.value as i64)
        } else {
            format!("{}", self.value)
        };

        match &self.unit {
            Some(unit) if self.value.is_finite() => format!("{magnitude}{unit}"),
            _ => magnitude,
        }
    }

    /// Orders by magnitude then unit. `NaN` sorts above every other number.
    fn compare(&self, other: &Number) -> Ordering {
        let magnitude = match self.value.partial_cmp(&other.value) {
            Some(ordering) => ordering,
            None => self.value.is_nan().cmp(&other.value.is_nan()),
        };
        magnitude.then_with(|| self.unit.cmp(&other.unit))
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Equal
    }
}

// ==================== Ref ====================

/// A reference to another record.
///
/// Two refs are the same reference when their ids match; the display name is
/// informational only.
#[derive(Debug, Clone)]
pub struct Ref {
    /// Record identifier (without the leading `@`).
    pub id: String,
    /// Optional display name.
    pub dis: Option<String>,
}

impl Ref {
    /// Creates a ref without validating the id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            dis: None,
        }
    }

    /// Creates a ref, rejecting ids with characters outside the ref charset.
    pub fn parse(id: &str) -> ModelResult<Self> {
        if id.is_empty() || !id.chars().all(is_id_char) {
            return Err(ModelError::invalid_name("ref", id));
        }
        Ok(Self::new(id))
    }

    /// Attaches a display name.
    pub fn with_dis(mut self, dis: impl Into<String>) -> Self {
        self.dis = Some(dis.into());
        self
    }
}

impl PartialEq for Ref {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Ref {}

impl Hash for Ref {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Ref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.id)
    }
}

// ==================== Symbol ====================

/// A def name such as `ahu` or the conjunct `elec-meter`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(String);

impl Symbol {
    /// Creates a symbol without validating the name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Creates a symbol, rejecting names with characters outside the symbol charset.
    pub fn parse(name: &str) -> ModelResult<Self> {
        if name.is_empty() || !name.chars().all(is_id_char) {
            return Err(ModelError::invalid_name("symbol", name));
        }
        Ok(Self::new(name))
    }

    /// Returns the symbol name.
    pub fn name(&self) -> &str {
        &self.0
    }

    /// Returns true if this is a conjunct (`elec-meter`).
    pub fn is_conjunct(&self) -> bool {
        self.0.contains('-')
    }

    /// Splits a conjunct into its tag parts. A plain symbol yields itself.
    pub fn parts(&self) -> Vec<&str> {
        self.0.split('-').collect()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "^{}", self.0)
    }
}

// ==================== Uri ====================

/// A URI literal. The scheme is split out on first access and cached.
#[derive(Debug, Clone)]
pub struct Uri {
    text: String,
    scheme: OnceCell<Option<String>>,
}

impl Uri {
    /// Creates a URI from its text.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            scheme: OnceCell::new(),
        }
    }

    /// Returns the raw URI text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Returns the scheme (`http` in `http://host/`), if the URI has one.
    pub fn scheme(&self) -> Option<&str> {
        self.scheme
            .get_or_init(|| {
                let (scheme, _) = self.text.split_once(':')?;
                let valid = scheme
                    .chars()
                    .next()
                    .is_some_and(|c| c.is_ascii_alphabetic())
                    && scheme
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
                valid.then(|| scheme.to_ascii_lowercase())
            })
            .as_deref()
    }
}

impl PartialEq for Uri {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

// ==================== Value ====================

/// A typed value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Marker,
    Bool(bool),
    Number(Number),
    Str(String),
    Date(NaiveDate),
    Time(NaiveTime),
    Ref(Ref),
    Symbol(Symbol),
    Uri(Uri),
    List(Vec<Value>),
    Dict(Dict),
}

impl Value {
    /// Returns the kind of this value.
    pub fn kind(&self) -> Kind {
        match self {
            Value::Marker => Kind::Marker,
            Value::Bool(_) => Kind::Bool,
            Value::Number(_) => Kind::Number,
            Value::Str(_) => Kind::Str,
            Value::Date(_) => Kind::Date,
            Value::Time(_) => Kind::Time,
            Value::Ref(_) => Kind::Ref,
            Value::Symbol(_) => Kind::Symbol,
            Value::Uri(_) => Kind::Uri,
            Value::List(_) => Kind::List,
            Value::Dict(_) => Kind::Dict,
        }
    }

    /// Returns true if the value can be written as a filter literal.
    pub fn is_scalar(&self) -> bool {
        self.kind().is_scalar()
    }

    /// Three-way comparison between two values.
    ///
    /// Values of the same kind are ordered naturally; values of different
    /// kinds are ordered by kind so the result is still total.
    pub fn compare_to(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Number(a), Value::Number(b)) => a.compare(b),
            (Value::Str(a), Value::Str(b)) => a.cmp(b),
            (Value::Date(a), Value::Date(b)) => a.cmp(b),
            (Value::Time(a), Value::Time(b)) => a.cmp(b),
            (Value::Ref(a), Value::Ref(b)) => a.id.cmp(&b.id),
            (Value::Symbol(a), Value::Symbol(b)) => a.cmp(b),
            (Value::Uri(a), Value::Uri(b)) => a.as_str().cmp(b.as_str()),
            _ => self.kind().cmp(&other.kind()),
        }
    }

    /// Renders the value as filter text.
    ///
    /// Non-scalar kinds have no filter syntax; they render in a zinc-like
    /// form that the filter lexer rejects.
    pub fn to_filter_text(&self) -> String {
        match self {
            Value::Marker => "M".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_filter_text(),
            Value::Str(s) => quote_str(s),
            Value::Date(d) => d.format("%Y-%m-%d").to_string(),
            Value::Time(t) => t.format("%H:%M:%S%.f").to_string(),
            Value::Ref(r) => r.to_string(),
            Value::Symbol(s) => s.to_string(),
            Value::Uri(u) => quote_uri(u.as_str()),
            Value::List(items) => {
                let inner: Vec<String> = items.iter().map(Value::to_filter_text).collect();
                format!("[{}]", inner.join(", "))
            }
            Value::Dict(d) => format!("{{{} tags}}", d.len()),
        }
    }

    /// Returns the ref if this value is one.
    pub fn as_reference(&self) -> Option<&Ref> {
        match self {
            Value::Ref(r) => Some(r),
            _ => None,
        }
    }

    /// Collects the symbols held by a symbol or a list of symbols.
    pub fn symbols(&self) -> Vec<Symbol> {
        match self {
            Value::Symbol(s) => vec![s.clone()],
            Value::List(items) => items
                .iter()
                .filter_map(|v| match v {
                    Value::Symbol(s) => Some(s.clone()),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Collects the refs held by a ref or a list of refs.
    pub fn refs(&self) -> Vec<&Ref> {
        match self {
            Value::Ref(r) => vec![r],
            Value::List(items) => items.iter().filter_map(Value::as_reference).collect(),
            _ => Vec::new(),
        }
    }
}

/// Quotes a string literal, escaping characters the lexer treats specially.
fn quote_str(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Backquotes a uri literal, escaping backquotes and backslashes.
fn quote_uri(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('`');
    for c in s.chars() {
        match c {
            '`' => out.push_str("\\`"),
            '\\' => out.push_str("\\\\"),
            c => out.push(c),
        }
    }
    out.push('`');
    out
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_filter_text())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(Number::new(n))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(Number::new(n as f64))
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(Number::new(f64::from(n)))
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl From<NaiveTime> for Value {
    fn from(t: NaiveTime) -> Self {
        Value::Time(t)
    }
}

impl From<Ref> for Value {
    fn from(r: Ref) -> Self {
        Value::Ref(r)
    }
}

impl From<Symbol> for Value {
    fn from(s: Symbol) -> Self {
        Value::Symbol(s)
    }
}

impl From<Uri> for Value {
    fn from(u: Uri) -> Self {
        Value::Uri(u)
    }
}

impl From<Dict> for Value {
    fn from(d: Dict) -> Self {
        Value::Dict(d)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

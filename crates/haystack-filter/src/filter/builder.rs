//! Fluent construction of filter text.

use std::fmt;

use haystack_model_rs::{Ref, Value};

use super::error::FilterResult;
use super::parser::FilterParser;
use super::token::CmpOp;

/// Builds filter text one fragment at a time.
///
/// Fragments are separated by a single space, except after `(` and before
/// `)`. Nothing is validated until [`build`](Self::build), so partial
/// expressions are fine mid-construction.
///
/// # Example
///
/// ```
/// use haystack_filter_rs::filter::FilterBuilder;
/// use haystack_model_rs::Number;
///
/// let filter = FilterBuilder::new()
///     .has("point")
///     .and()
///     .start_parens()
///     .is("sensor")
///     .or()
///     .greater_than("curVal", Number::with_unit(70.0, "°F"))
///     .end_parens()
///     .build()
///     .unwrap();
/// assert_eq!(filter, "point and (^sensor or curVal > 70°F)");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterBuilder {
    buf: String,
}

impl FilterBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the text accumulated so far.
    pub fn as_str(&self) -> &str {
        &self.buf
    }

    /// Appends a fragment, spacing it from the previous one.
    fn push(mut self, fragment: &str) -> Self {
        let needs_space = !self.buf.is_empty() && !self.buf.ends_with('(') && fragment != ")";
        if needs_space {
            self.buf.push(' ');
        }
        self.buf.push_str(fragment);
        self
    }

    /// Appends a tag (or path) test.
    pub fn has(self, path: &str) -> Self {
        self.push(path)
    }

    pub fn and(self) -> Self {
        self.push("and")
    }

    pub fn or(self) -> Self {
        self.push("or")
    }

    pub fn not(self) -> Self {
        self.push("not")
    }

    /// Appends a type test. A leading `^` is optional.
    pub fn is(self, type_name: &str) -> Self {
        let name = type_name.strip_prefix('^').unwrap_or(type_name);
        self.push(&format!("^{name}"))
    }

    /// Appends a relationship test, `name? ^term @ref`.
    pub fn relationship(self, name: &str, term: Option<&str>, reference: Option<&Ref>) -> Self {
        let mut text = format!("{name}?");
        if let Some(term) = term {
            text.push_str(" ^");
            text.push_str(term.strip_prefix('^').unwrap_or(term));
        }
        if let Some(reference) = reference {
            text.push(' ');
            text.push_str(&reference.to_string());
        }
        self.push(&text)
    }

    /// Appends a wildcard dereference test, `path *== @ref`.
    pub fn wildcard_equals(self, path: &str, reference: &Ref) -> Self {
        self.push(&format!("{path} *== {reference}"))
    }

    pub fn start_parens(self) -> Self {
        self.push("(")
    }

    pub fn end_parens(self) -> Self {
        self.push(")")
    }

    fn compare(self, path: &str, op: CmpOp, value: impl Into<Value>) -> Self {
        let value = value.into();
        self.push(&format!("{path} {op} {}", value.to_filter_text()))
    }

    pub fn equals(self, path: &str, value: impl Into<Value>) -> Self {
        self.compare(path, CmpOp::Eq, value)
    }

    pub fn not_equals(self, path: &str, value: impl Into<Value>) -> Self {
        self.compare(path, CmpOp::Ne, value)
    }

    pub fn less_than(self, path: &str, value: impl Into<Value>) -> Self {
        self.compare(path, CmpOp::Lt, value)
    }

    pub fn less_than_equals(self, path: &str, value: impl Into<Value>) -> Self {
        self.compare(path, CmpOp::Le, value)
    }

    pub fn greater_than(self, path: &str, value: impl Into<Value>) -> Self {
        self.compare(path, CmpOp::Gt, value)
    }

    pub fn greater_than_equals(self, path: &str, value: impl Into<Value>) -> Self {
        self.compare(path, CmpOp::Ge, value)
    }

    /// Appends another filter (text or builder) as a parenthesized group.
    pub fn filter(self, other: impl AsRef<str>) -> Self {
        self.push(&format!("({})", other.as_ref()))
    }

    /// Validates the accumulated text by parsing it and returns it.
    ///
    /// # Errors
    ///
    /// Returns the parse error if the text is not a valid filter.
    pub fn build(&self) -> FilterResult<String> {
        FilterParser::parse_str(&self.buf)?;
        Ok(self.buf.clone())
    }
}

impl AsRef<str> for FilterBuilder {
    fn as_ref(&self) -> &str {
        &self.buf
    }
}

impl fmt::Display for FilterBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.buf)
    }
}

#[cfg(test)]
mod tests {
    use super::super::error::FilterError;
    use super::*;
    use haystack_model_rs::Number;

    #[test]
    fn test_builder_spacing() {
        let builder = FilterBuilder::new()
            .start_parens()
            .has("a")
            .or()
            .has("b")
            .end_parens()
            .and()
            .not()
            .has("c");
        assert_eq!(builder.as_str(), "(a or b) and not c");
    }

    #[test]
    fn test_builder_comparisons() {
        let filter = FilterBuilder::new()
            .has("foo")
            .and()
            .has("goo")
            .and()
            .equals("curVal", Number::with_unit(23.0, "cm"))
            .build()
            .unwrap();
        assert_eq!(filter, "foo and goo and curVal == 23cm");

        let filter = FilterBuilder::new()
            .not_equals("a", "x")
            .or()
            .less_than("b", 1)
            .or()
            .less_than_equals("c", 2)
            .or()
            .greater_than_equals("d", 3.5)
            .build()
            .unwrap();
        assert_eq!(filter, "a != \"x\" or b < 1 or c <= 2 or d >= 3.5");
    }

    #[test]
    fn test_builder_relationship_and_type() {
        let filter = FilterBuilder::new()
            .is("^ahu")
            .and()
            .relationship("inputs", Some("elec"), Some(&Ref::new("m1")))
            .and()
            .wildcard_equals("equipRef", &Ref::new("plant"))
            .build()
            .unwrap();
        assert_eq!(filter, "^ahu and inputs? ^elec @m1 and equipRef *== @plant");
    }

    #[test]
    fn test_builder_nested_filter() {
        let inner = FilterBuilder::new().has("a").or().has("b");
        let filter = FilterBuilder::new()
            .has("site")
            .and()
            .filter(&inner)
            .build()
            .unwrap();
        assert_eq!(filter, "site and (a or b)");
    }

    #[test]
    fn test_builder_rejects_invalid_filters() {
        let result = FilterBuilder::new().start_parens().has("foo").and().build();
        assert_eq!(result, Err(FilterError::UnexpectedEndOfInput));

        let result = FilterBuilder::new().start_parens().has("foo").build();
        assert_eq!(result, Err(FilterError::UnclosedParenthesis));

        assert_eq!(FilterBuilder::new().build(), Err(FilterError::EmptyExpression));
    }
}

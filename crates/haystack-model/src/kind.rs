//! Value kinds.

use std::fmt;

/// Discriminant of the value type system.
///
/// Comparisons in filters only ever succeed between values of the same kind,
/// so the kind is checked before any equality or ordering test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Kind {
    Marker,
    Bool,
    Number,
    Str,
    Date,
    Time,
    Ref,
    Symbol,
    Uri,
    List,
    Dict,
}

impl Kind {
    /// Returns the lowercase name used in debug output.
    pub fn name(self) -> &'static str {
        match self {
            Kind::Marker => "marker",
            Kind::Bool => "bool",
            Kind::Number => "number",
            Kind::Str => "str",
            Kind::Date => "date",
            Kind::Time => "time",
            Kind::Ref => "ref",
            Kind::Symbol => "symbol",
            Kind::Uri => "uri",
            Kind::List => "list",
            Kind::Dict => "dict",
        }
    }

    /// Returns true for the kinds that can appear as a literal in filter text.
    pub fn is_scalar(self) -> bool {
        !matches!(self, Kind::Marker | Kind::List | Kind::Dict)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_display() {
        assert_eq!(Kind::Number.to_string(), "number");
        assert_eq!(Kind::Str.to_string(), "str");
    }

    #[test]
    fn test_kind_is_scalar() {
        assert!(Kind::Ref.is_scalar());
        assert!(Kind::Uri.is_scalar());
        assert!(!Kind::Marker.is_scalar());
        assert!(!Kind::List.is_scalar());
        assert!(!Kind::Dict.is_scalar());
    }
}

//! Field tag grammar.
//!
//! A schema annotation is a `,`-separated list of directives, each either a
//! bare keyword (`required`, `notEmpty`) or a `name=value` pair
//! (`minLength=1`). List-valued directives use their own separators so they
//! never clash with the directive separator: `enum=red|green|blue` and
//! `oneof_type=string;null`.

/// Separates directives within an annotation.
pub const DIRECTIVE_SEPARATOR: char = ',';

/// Separates values of `enum=`.
pub const VALUE_SEPARATOR: char = '|';

/// Separates type names of `oneof_type=`.
pub const TYPE_LIST_SEPARATOR: char = ';';

/// Leading token that suppresses a field.
pub const IGNORE_MARKER: &str = "-";

/// One parsed annotation directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Keyword(String),
    Pair { name: String, value: String },
}

impl Directive {
    pub fn name(&self) -> &str {
        match self {
            Directive::Keyword(name) => name,
            Directive::Pair { name, .. } => name,
        }
    }

    pub fn value(&self) -> Option<&str> {
        match self {
            Directive::Keyword(_) => None,
            Directive::Pair { value, .. } => Some(value),
        }
    }

    pub fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self, Directive::Keyword(k) if k == keyword)
    }
}

/// Split an annotation into directives.
///
/// Each token is split on its first `=`, so values may themselves contain
/// `=`. Empty tokens are dropped.
pub fn parse_directives(tag: &str) -> Vec<Directive> {
    tag.split(DIRECTIVE_SEPARATOR)
        .filter(|token| !token.is_empty())
        .map(|token| match token.split_once('=') {
            Some((name, value)) => Directive::Pair {
                name: name.to_string(),
                value: value.to_string(),
            },
            None => Directive::Keyword(token.to_string()),
        })
        .collect()
}

/// Whether an annotation suppresses its field (leading `-`).
pub fn is_ignored(tag: &str) -> bool {
    tag.split(DIRECTIVE_SEPARATOR).next() == Some(IGNORE_MARKER)
}

/// Parsed serialization directive (`name,omitempty`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SerialTag<'a> {
    /// Explicit property name; `None` keeps the field identifier.
    pub name: Option<&'a str>,
    pub omit_empty: bool,
    pub ignored: bool,
}

/// Parse a serialization directive.
pub fn parse_serial_tag(tag: &str) -> SerialTag<'_> {
    let mut parts = tag.split(DIRECTIVE_SEPARATOR);
    let first = parts.next().unwrap_or_default();

    if first == IGNORE_MARKER {
        return SerialTag {
            name: None,
            omit_empty: false,
            ignored: true,
        };
    }

    SerialTag {
        name: Some(first).filter(|name| !name.is_empty()),
        omit_empty: parts.any(|option| option == "omitempty"),
        ignored: false,
    }
}

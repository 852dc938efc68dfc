//! Annotation directives to schema keywords.
//!
//! The keyword set is chosen by the node's instance type as reflected, before
//! any directive runs:
//!
//! | type | keywords |
//! |------|----------|
//! | string, or none (refs, compositions) | `minLength` `maxLength` `pattern` `enum` `format` `notEmpty` `allowNull` |
//! | integer | `multipleOf` `minimum` `maximum` `exclusiveMinimum` `exclusiveMaximum` `enum` `allowNull` |
//! | number | `enum` `allowNull` |
//! | array | `minItems` `maxItems` `uniqueItems` |
//!
//! `title`, `description`, `default`, `example` and `oneof_type` apply to
//! every node. Malformed values never abort reflection: numbers fall back to
//! zero, booleans to false, and unknown formats are dropped.

use std::str::FromStr;

use serde_json::Value;

use crate::schema::{InstanceType, SchemaNode};
use crate::tags::{Directive, TYPE_LIST_SEPARATOR, VALUE_SEPARATOR};

/// Formats accepted by `format=`.
pub const FORMATS: &[&str] = &["date-time", "email", "hostname", "ipv4", "ipv6", "uri"];

/// Pattern forced by `notEmpty`: first character is not whitespace.
pub const NOT_EMPTY_PATTERN: &str = "^\\S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeywordSet {
    String,
    Integer,
    Number,
    Array,
    Generic,
}

impl KeywordSet {
    fn for_type(instance_type: Option<InstanceType>) -> Self {
        match instance_type {
            None | Some(InstanceType::String) => KeywordSet::String,
            Some(InstanceType::Integer) => KeywordSet::Integer,
            Some(InstanceType::Number) => KeywordSet::Number,
            Some(InstanceType::Array) => KeywordSet::Array,
            Some(_) => KeywordSet::Generic,
        }
    }

    fn allows_null(self) -> bool {
        matches!(
            self,
            KeywordSet::String | KeywordSet::Integer | KeywordSet::Number
        )
    }
}

/// Apply annotation directives to a reflected node.
///
/// `required` and `oneof_required` are consumed elsewhere and ignored here.
pub fn apply_directives(node: &mut SchemaNode, directives: &[Directive]) {
    let instance_type = node.instance_type;
    let keywords = KeywordSet::for_type(instance_type);

    for directive in directives {
        let applied = match directive {
            Directive::Keyword(name) => apply_keyword(node, keywords, name),
            Directive::Pair { name, value } => {
                apply_generic(node, instance_type, name, value)
                    || apply_pair(node, keywords, name, value)
            }
        };
        if !applied {
            tracing::debug!(
                directive = directive.name(),
                ?instance_type,
                "directive does not apply, skipping"
            );
        }
    }
}

/// Group names from `oneof_required=<group>` directives, in order.
pub fn required_groups(directives: &[Directive]) -> impl Iterator<Item = &str> {
    directives.iter().filter_map(|d| match d {
        Directive::Pair { name, value } if name == "oneof_required" => Some(value.as_str()),
        _ => None,
    })
}

/// Rewrite `node` into `oneOf: [<node's own type or ref>, {type: null}]`.
pub fn allow_null(node: &mut SchemaNode) {
    let inner = SchemaNode {
        instance_type: node.instance_type.take(),
        reference: node.reference.take(),
        one_of: std::mem::take(&mut node.one_of),
        ..Default::default()
    };
    node.one_of = vec![inner, SchemaNode::of(InstanceType::Null)];
}

fn apply_keyword(node: &mut SchemaNode, keywords: KeywordSet, name: &str) -> bool {
    match (keywords, name) {
        (_, "required") => true,
        (KeywordSet::String, "notEmpty") => {
            node.pattern = Some(NOT_EMPTY_PATTERN.to_string());
            true
        }
        (keywords, "allowNull") if keywords.allows_null() => {
            allow_null(node);
            true
        }
        (KeywordSet::Array, "uniqueItems") => {
            node.unique_items = Some(true);
            true
        }
        _ => false,
    }
}

fn apply_generic(
    node: &mut SchemaNode,
    instance_type: Option<InstanceType>,
    name: &str,
    value: &str,
) -> bool {
    match name {
        "title" => node.title = Some(value.to_string()),
        "description" => node.description = Some(value.to_string()),
        "default" => node.default = Some(literal(instance_type, name, value)),
        "example" => node.examples.push(literal(instance_type, name, value)),
        "oneof_type" => {
            node.instance_type = None;
            for type_name in value.split(TYPE_LIST_SEPARATOR) {
                match InstanceType::parse(type_name) {
                    Some(t) => node.one_of.push(SchemaNode::of(t)),
                    None => tracing::debug!(type_name, "unknown oneof_type entry, dropping"),
                }
            }
        }
        "oneof_required" => {}
        _ => return false,
    }
    true
}

fn apply_pair(node: &mut SchemaNode, keywords: KeywordSet, name: &str, value: &str) -> bool {
    match (keywords, name) {
        (KeywordSet::String, "minLength") => node.min_length = Some(number_or_zero(name, value)),
        (KeywordSet::String, "maxLength") => node.max_length = Some(number_or_zero(name, value)),
        (KeywordSet::String, "pattern") => node.pattern = Some(value.to_string()),
        (KeywordSet::String, "format") => {
            if FORMATS.contains(&value) {
                node.format = Some(value.to_string());
            } else {
                tracing::debug!(format = value, "unrecognized format, dropping");
            }
        }
        (KeywordSet::String, "enum") => {
            node.enum_values = value
                .split(VALUE_SEPARATOR)
                .map(|v| Value::String(v.to_string()))
                .collect();
        }

        (KeywordSet::Integer, "multipleOf") => node.multiple_of = Some(number_or_zero(name, value)),
        (KeywordSet::Integer, "minimum") => node.minimum = Some(number_or_zero(name, value)),
        (KeywordSet::Integer, "maximum") => node.maximum = Some(number_or_zero(name, value)),
        (KeywordSet::Integer, "exclusiveMinimum") => {
            node.exclusive_minimum = Some(flag_or_false(name, value))
        }
        (KeywordSet::Integer, "exclusiveMaximum") => {
            node.exclusive_maximum = Some(flag_or_false(name, value))
        }
        (KeywordSet::Integer, "enum") => {
            node.enum_values = value
                .split(VALUE_SEPARATOR)
                .map(|v| Value::from(number_or_zero::<i64>(name, v)))
                .collect();
        }

        (KeywordSet::Number, "enum") => {
            node.enum_values = value
                .split(VALUE_SEPARATOR)
                .map(|v| float_literal(name, v))
                .collect();
        }

        (KeywordSet::Array, "minItems") => node.min_items = Some(number_or_zero(name, value)),
        (KeywordSet::Array, "maxItems") => node.max_items = Some(number_or_zero(name, value)),
        (KeywordSet::Array, "uniqueItems") => node.unique_items = Some(flag_or_false(name, value)),

        _ => return false,
    }
    true
}

/// A `default`/`example` literal typed after the node.
fn literal(instance_type: Option<InstanceType>, name: &str, raw: &str) -> Value {
    match instance_type {
        Some(InstanceType::Integer) => Value::from(number_or_zero::<i64>(name, raw)),
        Some(InstanceType::Number) => float_literal(name, raw),
        Some(InstanceType::Boolean) => Value::Bool(flag_or_false(name, raw)),
        _ => Value::String(raw.to_string()),
    }
}

fn number_or_zero<T: FromStr + Default>(directive: &str, raw: &str) -> T {
    raw.parse().unwrap_or_else(|_| {
        tracing::debug!(directive, value = raw, "unparseable number, using zero");
        T::default()
    })
}

fn float_literal(directive: &str, raw: &str) -> Value {
    let parsed = raw.parse::<f64>().ok().filter(|f| f.is_finite());
    if parsed.is_none() {
        tracing::debug!(directive, value = raw, "unparseable number, using zero");
    }
    Value::from(parsed.unwrap_or(0.0))
}

fn flag_or_false(directive: &str, raw: &str) -> bool {
    raw.parse().unwrap_or_else(|_| {
        tracing::debug!(directive, value = raw, "unparseable boolean, using false");
        false
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags::parse_directives;
    use serde_json::json;

    fn applied(instance_type: InstanceType, tag: &str) -> Value {
        let mut node = SchemaNode::of(instance_type);
        apply_directives(&mut node, &parse_directives(tag));
        serde_json::to_value(node).unwrap()
    }

    #[test]
    fn string_lengths_and_pattern() {
        assert_eq!(
            applied(InstanceType::String, "required,minLength=1,maxLength=20,pattern=\\S+"),
            json!({"type": "string", "minLength": 1, "maxLength": 20, "pattern": "\\S+"})
        );
    }

    #[test]
    fn string_enum_preserves_order_and_duplicates() {
        assert_eq!(
            applied(InstanceType::String, "enum=red|green|blue|red"),
            json!({"type": "string", "enum": ["red", "green", "blue", "red"]})
        );
    }

    #[test]
    fn format_allow_list() {
        assert_eq!(
            applied(InstanceType::String, "format=email"),
            json!({"type": "string", "format": "email"})
        );
        assert_eq!(
            applied(InstanceType::String, "format=uuid"),
            json!({"type": "string"})
        );
    }

    #[test]
    fn not_empty_forces_pattern() {
        assert_eq!(
            applied(InstanceType::String, "pattern=abc,notEmpty"),
            json!({"type": "string", "pattern": "^\\S"})
        );
    }

    #[test]
    fn allow_null_rewrites_type() {
        assert_eq!(
            applied(InstanceType::String, "required,allowNull"),
            json!({"oneOf": [{"type": "string"}, {"type": "null"}]})
        );
        assert_eq!(
            applied(InstanceType::Integer, "allowNull"),
            json!({"oneOf": [{"type": "integer"}, {"type": "null"}]})
        );
    }

    #[test]
    fn allow_null_on_reference_moves_ref() {
        let mut node = SchemaNode::reference("Pet");
        apply_directives(&mut node, &parse_directives("allowNull"));
        assert_eq!(
            serde_json::to_value(node).unwrap(),
            json!({"oneOf": [{"$ref": "#/definitions/Pet"}, {"type": "null"}]})
        );
    }

    #[test]
    fn integer_keywords() {
        assert_eq!(
            applied(
                InstanceType::Integer,
                "minimum=18,maximum=120,exclusiveMaximum=true,exclusiveMinimum=true,multipleOf=2"
            ),
            json!({
                "type": "integer",
                "multipleOf": 2,
                "maximum": 120,
                "exclusiveMaximum": true,
                "minimum": 18,
                "exclusiveMinimum": true
            })
        );
        assert_eq!(
            applied(InstanceType::Integer, "enum=9|30|28|52"),
            json!({"type": "integer", "enum": [9, 30, 28, 52]})
        );
    }

    #[test]
    fn number_enum() {
        assert_eq!(
            applied(InstanceType::Number, "enum=9.1|30.2|28.4|52.9"),
            json!({"type": "number", "enum": [9.1, 30.2, 28.4, 52.9]})
        );
    }

    #[test]
    fn malformed_values_default_to_zero() {
        assert_eq!(
            applied(InstanceType::Integer, "minimum=eighteen,exclusiveMinimum=yes,enum=1|x"),
            json!({"type": "integer", "minimum": 0, "exclusiveMinimum": false, "enum": [1, 0]})
        );
        assert_eq!(
            applied(InstanceType::String, "minLength=-1"),
            json!({"type": "string", "minLength": 0})
        );
        assert_eq!(
            applied(InstanceType::Number, "enum=NaN|1.5"),
            json!({"type": "number", "enum": [0.0, 1.5]})
        );
    }

    #[test]
    fn array_keywords() {
        assert_eq!(
            applied(InstanceType::Array, "minItems=1,maxItems=3,uniqueItems"),
            json!({"type": "array", "minItems": 1, "maxItems": 3, "uniqueItems": true})
        );
    }

    #[test]
    fn keywords_outside_the_set_are_ignored() {
        assert_eq!(
            applied(InstanceType::Array, "minLength=3,allowNull"),
            json!({"type": "array"})
        );
        assert_eq!(
            applied(InstanceType::Boolean, "notEmpty,enum=true"),
            json!({"type": "boolean"})
        );
    }

    #[test]
    fn untyped_nodes_take_string_keywords() {
        let mut node = SchemaNode {
            one_of: vec![
                SchemaNode::of(InstanceType::String),
                SchemaNode::of(InstanceType::Null),
            ],
            ..Default::default()
        };
        apply_directives(&mut node, &parse_directives("minLength=1"));
        assert_eq!(node.min_length, Some(1));
    }

    #[test]
    fn descriptive_keywords() {
        assert_eq!(
            applied(
                InstanceType::String,
                "title=the name,description=this is a property,example=joe,example=lucy,default=alex"
            ),
            json!({
                "type": "string",
                "title": "the name",
                "description": "this is a property",
                "default": "alex",
                "examples": ["joe", "lucy"]
            })
        );
        assert_eq!(
            applied(InstanceType::Integer, "default=7,example=3"),
            json!({"type": "integer", "default": 7, "examples": [3]})
        );
    }

    #[test]
    fn oneof_type_replaces_type() {
        assert_eq!(
            applied(InstanceType::String, "oneof_type=string;array;bogus"),
            json!({"oneOf": [{"type": "string"}, {"type": "array"}]})
        );
    }

    #[test]
    fn required_groups_in_order() {
        let directives = parse_directives("oneof_required=a,required,oneof_required=b");
        assert_eq!(required_groups(&directives).collect::<Vec<_>>(), vec!["a", "b"]);
    }
}

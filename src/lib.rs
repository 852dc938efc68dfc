//! Reflect Schema
//!
//! Generation of JSON Schema (draft-04) documents from type descriptions.
//!
//! A [`TypeCatalog`] describes records, aliases and the capabilities they opt
//! into. [`reflect`] walks the type graph from a root type and produces a
//! [`Schema`] whose named records live under `definitions` and are referenced
//! with `$ref`, so recursive types are finite.
//!
//! # Example
//!
//! ```
//! use reflect_schema::{reflect, FieldDef, ReflectOptions, TypeCatalog, TypeDef, TypeExpr};
//! use serde_json::json;
//!
//! let catalog = TypeCatalog::new().with(TypeDef::record(
//!     "Record",
//!     vec![
//!         FieldDef::new("Id", TypeExpr::Integer).serial_tag("id"),
//!         FieldDef::new("Name", TypeExpr::String)
//!             .serial_tag("name,omitempty")
//!             .schema_tag("maxLength=20"),
//!         FieldDef::new("Tags", TypeExpr::map(TypeExpr::Any)).serial_tag("tags,omitempty"),
//!     ],
//! ));
//!
//! let schema = reflect(&catalog, &TypeExpr::named("Record"), &ReflectOptions::new()).unwrap();
//! let value = schema.to_value().unwrap();
//!
//! assert_eq!(value["$ref"], "#/definitions/Record");
//! assert_eq!(value["definitions"]["Record"]["required"], json!(["id"]));
//! assert_eq!(value["definitions"]["Record"]["properties"]["name"]["maxLength"], 20);
//! ```
//!
//! # Annotations
//!
//! A field's schema annotation is a `,`-separated list of directives. Which
//! directives apply depends on the field's kind:
//!
//! | Kind | Directives |
//! |------|------------|
//! | string | `minLength`, `maxLength`, `pattern`, `format`, `notEmpty`, `enum=a\|b`, `allowNull` |
//! | integer | `minimum`, `maximum`, `exclusiveMinimum`, `exclusiveMaximum`, `multipleOf`, `enum`, `allowNull` |
//! | number | `enum`, `allowNull` |
//! | array | `minItems`, `maxItems`, `uniqueItems` |
//! | any | `title`, `description`, `default`, `example`, `oneof_type=a;b`, `oneof_required=group` |
//!
//! A leading `-` suppresses the field. With
//! [`ReflectOptions::required_from_annotations`], the `required` keyword
//! decides requiredness instead of the serialization tag's `omitempty`.

mod constraints;
mod descriptor;
mod error;
mod field;
mod loader;
mod overrides;
mod polymorphism;
mod reflector;
mod schema;
mod tags;
mod types;

pub use constraints::{allow_null, apply_directives, required_groups, FORMATS, NOT_EMPTY_PATTERN};
pub use descriptor::{
    Alternative, Capabilities, Condition, FieldDef, Shape, TypeCatalog, TypeDef, TypeExpr, TypeId,
};
pub use error::{LoadError, OverrideError, ReflectError};
pub use field::{resolve_field, ResolvedField};
pub use loader::{load_catalog, load_catalog_str, load_overrides, load_overrides_str};
pub use overrides::TagOverrides;
pub use reflector::{reflect, reflect_type, MATCH_ALL_PATTERN};
pub use schema::{AdditionalProperties, Definitions, InstanceType, Media, Schema, SchemaNode};
pub use tags::{
    is_ignored, parse_directives, parse_serial_tag, Directive, SerialTag, DIRECTIVE_SEPARATOR,
    IGNORE_MARKER, TYPE_LIST_SEPARATOR, VALUE_SEPARATOR,
};
pub use types::{
    ReflectOptions, TypeOverrideFn, DEFAULT_MAX_DEPTH, DEFINITIONS_PREFIX, DRAFT_04,
};

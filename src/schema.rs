//! Output model: schema nodes, definitions and the root document.
//!
//! Keyword fields follow draft-04 naming. Empty or absent keywords are skipped
//! when serializing, and every map is a `BTreeMap`, so two reflections of the
//! same type produce byte-identical JSON.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::DEFINITIONS_PREFIX;

/// Named, reusable schema nodes keyed by definition name.
pub type Definitions = BTreeMap<String, SchemaNode>;

/// Primitive JSON Schema instance types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceType {
    Null,
    Boolean,
    Object,
    Array,
    Number,
    Integer,
    String,
}

impl InstanceType {
    /// Parse an instance type name.
    ///
    /// Returns `None` for unknown names.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "null" => Some(InstanceType::Null),
            "boolean" => Some(InstanceType::Boolean),
            "object" => Some(InstanceType::Object),
            "array" => Some(InstanceType::Array),
            "number" => Some(InstanceType::Number),
            "integer" => Some(InstanceType::Integer),
            "string" => Some(InstanceType::String),
            _ => None,
        }
    }
}

/// `additionalProperties` is either a flag or a schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Bool(bool),
    Schema(Box<SchemaNode>),
}

/// Hyper-schema media description (used for base64 byte strings).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    pub binary_encoding: String,
}

/// A single node of the schema graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SchemaNode {
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<InstanceType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<Value>,

    // numeric
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiple_of: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_maximum: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_minimum: Option<bool>,

    // string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    // array
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaNode>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_items: Option<bool>,

    // object
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, SchemaNode>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub pattern_properties: BTreeMap<String, SchemaNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<AdditionalProperties>,

    #[serde(rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<Value>,

    // composition
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub all_of: Vec<SchemaNode>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub any_of: Vec<SchemaNode>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<SchemaNode>,
    #[serde(rename = "if", skip_serializing_if = "Option::is_none")]
    pub if_schema: Option<Box<SchemaNode>>,
    #[serde(rename = "then", skip_serializing_if = "Option::is_none")]
    pub then_schema: Option<Box<SchemaNode>>,
    #[serde(rename = "else", skip_serializing_if = "Option::is_none")]
    pub else_schema: Option<Box<SchemaNode>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<Media>,
}

impl SchemaNode {
    /// A node with only a `type`.
    pub fn of(instance_type: InstanceType) -> Self {
        Self {
            instance_type: Some(instance_type),
            ..Default::default()
        }
    }

    /// A string node with a `format`.
    pub fn formatted(format: &str) -> Self {
        Self {
            format: Some(format.to_string()),
            ..Self::of(InstanceType::String)
        }
    }

    /// A `$ref` to the named definition.
    pub fn reference(definition: &str) -> Self {
        Self {
            reference: Some(format!("{}{}", DEFINITIONS_PREFIX, definition)),
            ..Default::default()
        }
    }

    /// An object node accepting any properties.
    pub fn any() -> Self {
        Self::object(true)
    }

    /// An object node with the given `additionalProperties` flag.
    pub fn object(additional_properties: bool) -> Self {
        Self {
            additional_properties: Some(AdditionalProperties::Bool(additional_properties)),
            ..Self::of(InstanceType::Object)
        }
    }

    /// Raw bytes travel as a base64 string.
    pub fn base64() -> Self {
        Self {
            media: Some(Media {
                binary_encoding: "base64".to_string(),
            }),
            ..Self::of(InstanceType::String)
        }
    }

    /// Definition name this node points to, if it is a `$ref` into definitions.
    pub fn definition_name(&self) -> Option<&str> {
        self.reference
            .as_deref()
            .and_then(|r| r.strip_prefix(DEFINITIONS_PREFIX))
    }

    /// Whether this node or any node below it references the named definition.
    pub fn references(&self, definition: &str) -> bool {
        if self.definition_name() == Some(definition) {
            return true;
        }

        let boxed = [
            &self.items,
            &self.if_schema,
            &self.then_schema,
            &self.else_schema,
        ];
        if boxed
            .into_iter()
            .flatten()
            .any(|child| child.references(definition))
        {
            return true;
        }

        if let Some(AdditionalProperties::Schema(child)) = &self.additional_properties {
            if child.references(definition) {
                return true;
            }
        }

        self.properties
            .values()
            .chain(self.pattern_properties.values())
            .chain(&self.all_of)
            .chain(&self.any_of)
            .chain(&self.one_of)
            .any(|child| child.references(definition))
    }
}

/// Root schema document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schema {
    #[serde(rename = "$schema")]
    pub version: String,
    #[serde(flatten)]
    pub root: SchemaNode,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub definitions: Definitions,
}

impl Schema {
    /// Render the document as a JSON value.
    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

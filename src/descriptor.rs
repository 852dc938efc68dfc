//! Type descriptors: the reflector's view of a program's types.
//!
//! A [`TypeCatalog`] holds named definitions (records and aliases) together with
//! the capabilities each one opts into. Field and element types are
//! [`TypeExpr`]s that point at named definitions by [`TypeId`], so recursive type
//! graphs are described without owning cycles.
//!
//! Every type here round-trips through serde, which is how the CLI reads a
//! catalog:
//!
//! ```json
//! { "types": [
//!   { "id": { "name": "User" },
//!     "shape": { "struct": [
//!       { "ident": "ID", "ty": "integer", "serial_tag": "id" },
//!       { "ident": "Friends", "ty": { "seq": { "named": { "name": "User" } } },
//!         "serial_tag": "friends,omitempty" }
//!     ] } }
//! ] }
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::schema::SchemaNode;

/// Identity of a named type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeId {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    pub name: String,
}

impl TypeId {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            name: name.into(),
        }
    }

    pub fn in_namespace(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            name: name.into(),
        }
    }

    /// Parse `ns.Name` (split on the last dot) or a bare `Name`.
    pub fn parse(s: &str) -> Self {
        match s.rsplit_once('.') {
            Some((namespace, name)) if !namespace.is_empty() && !name.is_empty() => {
                Self::in_namespace(namespace, name)
            }
            _ => Self::new(s),
        }
    }

    /// Namespace-qualified name, with `/` path separators mapped to `.`.
    pub fn qualified_name(&self) -> String {
        match &self.namespace {
            Some(namespace) => format!("{}.{}", namespace.replace('/', "."), self.name),
            None => self.name.clone(),
        }
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified_name())
    }
}

impl From<&str> for TypeId {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

/// Structural kind of a type occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeExpr {
    Bool,
    Integer,
    Number,
    String,
    /// Untyped value.
    Any,
    /// Raw byte sequence.
    Bytes,
    DateTime,
    IpAddr,
    Uri,
    /// Pointer or optional wrapper.
    Optional(Box<TypeExpr>),
    /// Variable-length sequence.
    Seq(Box<TypeExpr>),
    /// Fixed-length array.
    Array { items: Box<TypeExpr>, len: u64 },
    /// String-keyed map with the given value type.
    Map(Box<TypeExpr>),
    Named(TypeId),
    /// A host type with no JSON mapping (channels, functions, ...).
    Opaque(String),
}

impl TypeExpr {
    pub fn named(id: impl Into<TypeId>) -> Self {
        TypeExpr::Named(id.into())
    }

    pub fn optional(inner: TypeExpr) -> Self {
        TypeExpr::Optional(Box::new(inner))
    }

    pub fn seq(items: TypeExpr) -> Self {
        TypeExpr::Seq(Box::new(items))
    }

    pub fn array(items: TypeExpr, len: u64) -> Self {
        TypeExpr::Array {
            items: Box::new(items),
            len,
        }
    }

    pub fn map(value: TypeExpr) -> Self {
        TypeExpr::Map(Box::new(value))
    }

    /// The named type behind any optional wrappers.
    pub fn named_id(&self) -> Option<&TypeId> {
        match self {
            TypeExpr::Named(id) => Some(id),
            TypeExpr::Optional(inner) => inner.named_id(),
            _ => None,
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Bool => f.write_str("bool"),
            TypeExpr::Integer => f.write_str("integer"),
            TypeExpr::Number => f.write_str("number"),
            TypeExpr::String => f.write_str("string"),
            TypeExpr::Any => f.write_str("any"),
            TypeExpr::Bytes => f.write_str("bytes"),
            TypeExpr::DateTime => f.write_str("date_time"),
            TypeExpr::IpAddr => f.write_str("ip_addr"),
            TypeExpr::Uri => f.write_str("uri"),
            TypeExpr::Optional(inner) => write!(f, "optional<{}>", inner),
            TypeExpr::Seq(items) => write!(f, "seq<{}>", items),
            TypeExpr::Array { items, len } => write!(f, "array<{}; {}>", items, len),
            TypeExpr::Map(value) => write!(f, "map<{}>", value),
            TypeExpr::Named(id) => write!(f, "{}", id),
            TypeExpr::Opaque(description) => f.write_str(description),
        }
    }
}

fn exported_by_default() -> bool {
    true
}

/// A declared field of a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Declared identifier; the property name unless the serial tag renames it.
    pub ident: String,
    pub ty: TypeExpr,
    /// Serialization directive, e.g. `id,omitempty` or `-`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub serial_tag: String,
    /// Schema annotation, e.g. `required,minLength=1`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub schema_tag: String,
    #[serde(default = "exported_by_default")]
    pub exported: bool,
    /// Anonymous field whose own fields are promoted into the parent.
    #[serde(default)]
    pub embedded: bool,
}

impl FieldDef {
    pub fn new(ident: impl Into<String>, ty: TypeExpr) -> Self {
        Self {
            ident: ident.into(),
            ty,
            serial_tag: String::new(),
            schema_tag: String::new(),
            exported: true,
            embedded: false,
        }
    }

    /// An embedded field of the given record type.
    pub fn embed(id: impl Into<TypeId>) -> Self {
        let id = id.into();
        Self {
            embedded: true,
            ..Self::new(id.name.clone(), TypeExpr::Named(id))
        }
    }

    pub fn serial_tag(mut self, tag: impl Into<String>) -> Self {
        self.serial_tag = tag.into();
        self
    }

    pub fn schema_tag(mut self, tag: impl Into<String>) -> Self {
        self.schema_tag = tag.into();
        self
    }

    pub fn unexported(mut self) -> Self {
        self.exported = false;
        self
    }
}

/// A candidate schema in a `oneOf` built from capabilities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alternative {
    /// Literal `{"type": "null"}`.
    Null,
    Type(TypeExpr),
}

/// Conditional schema: `if` built from `field`'s annotations, then/else from types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub field: FieldDef,
    #[serde(default)]
    pub then: Option<TypeExpr>,
    #[serde(default, rename = "else")]
    pub otherwise: Option<TypeExpr>,
}

/// Behaviors a named type opts into.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Capabilities {
    /// Enumerated value accepted in textual or numeric form.
    pub enum_provider: bool,
    /// Complete schema replacing all structural inference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_schema: Option<SchemaNode>,
    /// Exclusive alternatives: the schema is nothing but this `oneOf`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub one_of: Option<Vec<Alternative>>,
    /// Combined alternatives merged into the type's own schema.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub and_one_of: Option<Vec<Alternative>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
}

impl Capabilities {
    /// Names of the capabilities that are set, for display.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.enum_provider {
            names.push("enum");
        }
        if self.custom_schema.is_some() {
            names.push("custom_schema");
        }
        if self.one_of.is_some() {
            names.push("one_of");
        }
        if self.and_one_of.is_some() {
            names.push("and_one_of");
        }
        if self.condition.is_some() {
            names.push("condition");
        }
        names
    }
}

/// Body of a named type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    /// Compound record.
    Struct(Vec<FieldDef>),
    /// Named non-compound type, e.g. a named integer.
    Alias(TypeExpr),
}

/// A named type and its capabilities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDef {
    pub id: TypeId,
    pub shape: Shape,
    #[serde(default)]
    pub capabilities: Capabilities,
}

impl TypeDef {
    pub fn record(id: impl Into<TypeId>, fields: Vec<FieldDef>) -> Self {
        Self {
            id: id.into(),
            shape: Shape::Struct(fields),
            capabilities: Capabilities::default(),
        }
    }

    pub fn alias(id: impl Into<TypeId>, target: TypeExpr) -> Self {
        Self {
            id: id.into(),
            shape: Shape::Alias(target),
            capabilities: Capabilities::default(),
        }
    }

    pub fn enum_provider(mut self) -> Self {
        self.capabilities.enum_provider = true;
        self
    }

    pub fn custom_schema(mut self, node: SchemaNode) -> Self {
        self.capabilities.custom_schema = Some(node);
        self
    }

    pub fn one_of(mut self, alternatives: Vec<Alternative>) -> Self {
        self.capabilities.one_of = Some(alternatives);
        self
    }

    pub fn and_one_of(mut self, alternatives: Vec<Alternative>) -> Self {
        self.capabilities.and_one_of = Some(alternatives);
        self
    }

    pub fn condition(mut self, condition: Condition) -> Self {
        self.capabilities.condition = Some(condition);
        self
    }

    /// Declared fields, if this is a record.
    pub fn fields(&self) -> Option<&[FieldDef]> {
        match &self.shape {
            Shape::Struct(fields) => Some(fields.as_slice()),
            Shape::Alias(_) => None,
        }
    }
}

/// All named types reachable from a reflection root.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeCatalog {
    defs: BTreeMap<TypeId, TypeDef>,
}

impl TypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a definition, returning the one it replaced.
    pub fn insert(&mut self, def: TypeDef) -> Option<TypeDef> {
        self.defs.insert(def.id.clone(), def)
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, def: TypeDef) -> Self {
        self.insert(def);
        self
    }

    pub fn get(&self, id: &TypeId) -> Option<&TypeDef> {
        self.defs.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeDef> {
        self.defs.values()
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

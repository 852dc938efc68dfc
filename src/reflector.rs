//! Type reflection: walks a type graph and builds its schema.
//!
//! Each named record is registered in the definitions table before its fields
//! are visited, so any later occurrence (including one inside its own fields)
//! resolves to a `$ref` and recursive types terminate.

use std::collections::HashMap;

use crate::constraints::{apply_directives, required_groups};
use crate::descriptor::{FieldDef, Shape, TypeCatalog, TypeDef, TypeExpr, TypeId};
use crate::error::ReflectError;
use crate::field::resolve_field;
use crate::polymorphism::add_required_group;
use crate::schema::{Definitions, InstanceType, Schema, SchemaNode};
use crate::types::ReflectOptions;

/// Pattern used as the single `patternProperties` key of map schemas.
pub const MATCH_ALL_PATTERN: &str = ".*";

/// Reflect `root` into a complete schema document.
///
/// # Errors
///
/// Returns `ReflectError::UnsupportedType` for types with no JSON mapping,
/// `ReflectError::UndefinedType` for named types missing from `catalog`, and
/// `ReflectError::CyclicType` when recursion exceeds `options.max_depth`.
///
/// # Example
///
/// ```
/// use reflect_schema::{reflect, FieldDef, ReflectOptions, TypeCatalog, TypeDef, TypeExpr};
///
/// let catalog = TypeCatalog::new().with(TypeDef::record(
///     "Pet",
///     vec![FieldDef::new("Name", TypeExpr::String).serial_tag("name")],
/// ));
/// let schema = reflect(&catalog, &TypeExpr::named("Pet"), &ReflectOptions::new()).unwrap();
///
/// assert_eq!(schema.root.reference.as_deref(), Some("#/definitions/Pet"));
/// assert!(schema.definitions["Pet"].properties.contains_key("name"));
/// ```
pub fn reflect(
    catalog: &TypeCatalog,
    root: &TypeExpr,
    options: &ReflectOptions,
) -> Result<Schema, ReflectError> {
    let mut walker = Walker::new(catalog, options, Definitions::new());
    let mut root_node = walker.reflect_type(root)?;
    let mut definitions = walker.into_definitions();

    if options.expand_top_level {
        root_node = expand_root(root_node, &mut definitions);
    }

    Ok(Schema {
        version: options.version.clone(),
        root: root_node,
        definitions,
    })
}

/// Reflect a single type into `definitions`, returning its node.
///
/// Records already present in `definitions` are referenced rather than
/// rebuilt, so several calls can share one table. A failed call leaves the
/// table as it found it.
///
/// # Errors
///
/// Same as [`reflect`].
pub fn reflect_type(
    catalog: &TypeCatalog,
    ty: &TypeExpr,
    definitions: &mut Definitions,
    options: &ReflectOptions,
) -> Result<SchemaNode, ReflectError> {
    let mut walker = Walker::new(catalog, options, std::mem::take(definitions));
    let result = walker.reflect_type(ty);
    if result.is_err() {
        walker.discard_registered();
    }
    *definitions = walker.into_definitions();
    result
}

/// Inline the root's definition into the root node.
///
/// The definition is kept when something still points at it (a record that
/// contains itself), so every `$ref` stays resolvable.
fn expand_root(root: SchemaNode, definitions: &mut Definitions) -> SchemaNode {
    let Some(name) = root.definition_name().map(str::to_string) else {
        return root;
    };
    let Some(expanded) = definitions.remove(&name) else {
        return root;
    };

    let still_referenced =
        expanded.references(&name) || definitions.values().any(|def| def.references(&name));
    if still_referenced {
        definitions.insert(name, expanded.clone());
    }
    expanded
}

/// Schemas of kinds that never recurse.
fn leaf(ty: &TypeExpr) -> Option<SchemaNode> {
    let node = match ty {
        TypeExpr::Bool => SchemaNode::of(InstanceType::Boolean),
        TypeExpr::Integer => SchemaNode::of(InstanceType::Integer),
        TypeExpr::Number => SchemaNode::of(InstanceType::Number),
        TypeExpr::String => SchemaNode::of(InstanceType::String),
        TypeExpr::Any => SchemaNode::any(),
        TypeExpr::Bytes => SchemaNode::base64(),
        TypeExpr::DateTime => SchemaNode::formatted("date-time"),
        TypeExpr::IpAddr => SchemaNode::formatted("ipv4"),
        TypeExpr::Uri => SchemaNode::formatted("uri"),
        _ => return None,
    };
    Some(node)
}

/// State of one reflection.
pub(crate) struct Walker<'a> {
    catalog: &'a TypeCatalog,
    options: &'a ReflectOptions,
    definitions: Definitions,
    /// Which type registered each definition key, to spot bare-name clashes.
    owners: HashMap<String, TypeId>,
    depth: usize,
}

impl<'a> Walker<'a> {
    fn new(catalog: &'a TypeCatalog, options: &'a ReflectOptions, definitions: Definitions) -> Self {
        Self {
            catalog,
            options,
            definitions,
            owners: HashMap::new(),
            depth: 0,
        }
    }

    fn into_definitions(self) -> Definitions {
        self.definitions
    }

    /// Drop every definition this walker added, complete or not.
    fn discard_registered(&mut self) {
        for key in self.owners.keys() {
            self.definitions.remove(key);
        }
        self.owners.clear();
    }

    /// Run `f` one level deeper, failing once the depth ceiling is reached.
    fn descend<T>(
        &mut self,
        label: &dyn std::fmt::Display,
        f: impl FnOnce(&mut Self) -> Result<T, ReflectError>,
    ) -> Result<T, ReflectError> {
        if self.depth >= self.options.max_depth {
            return Err(ReflectError::CyclicType {
                type_name: label.to_string(),
                depth: self.depth,
            });
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    pub(crate) fn reflect_type(&mut self, ty: &TypeExpr) -> Result<SchemaNode, ReflectError> {
        self.descend(ty, |walker| walker.reflect_kind(ty))
    }

    fn reflect_kind(&mut self, ty: &TypeExpr) -> Result<SchemaNode, ReflectError> {
        if let Some(hook) = &self.options.type_override {
            if let Some(node) = hook.as_ref()(ty) {
                return Ok(node);
            }
        }
        if let Some(node) = leaf(ty) {
            return Ok(node);
        }

        match ty {
            TypeExpr::Optional(inner) => self.reflect_type(inner),
            TypeExpr::Seq(items) => self.array(items),
            TypeExpr::Array { items, len } => {
                let mut node = self.array(items)?;
                node.min_items = Some(*len);
                node.max_items = Some(*len);
                Ok(node)
            }
            TypeExpr::Map(value) => {
                let mut node = SchemaNode::of(InstanceType::Object);
                node.pattern_properties
                    .insert(MATCH_ALL_PATTERN.to_string(), self.reflect_type(value)?);
                Ok(node)
            }
            TypeExpr::Named(id) => self.reflect_named(id),
            _ => Err(ReflectError::UnsupportedType {
                type_name: ty.to_string(),
            }),
        }
    }

    fn array(&mut self, items: &TypeExpr) -> Result<SchemaNode, ReflectError> {
        Ok(SchemaNode {
            items: Some(Box::new(self.reflect_type(items)?)),
            ..SchemaNode::of(InstanceType::Array)
        })
    }

    fn reflect_named(&mut self, id: &TypeId) -> Result<SchemaNode, ReflectError> {
        if self.options.is_ignored(id) {
            return Ok(SchemaNode::any());
        }

        let catalog = self.catalog;
        let def = catalog
            .get(id)
            .ok_or_else(|| ReflectError::UndefinedType {
                type_name: id.to_string(),
            })?;

        if let Some(node) = self.registered(id) {
            return Ok(node);
        }

        let capabilities = &def.capabilities;
        if capabilities.enum_provider {
            return Ok(SchemaNode {
                one_of: vec![
                    SchemaNode::of(InstanceType::String),
                    SchemaNode::of(InstanceType::Integer),
                ],
                ..Default::default()
            });
        }
        if let Some(custom) = &capabilities.custom_schema {
            return Ok(custom.clone());
        }

        match &def.shape {
            Shape::Struct(fields) => self.register(def, |walker| match &def.capabilities.one_of {
                Some(alternatives) => walker.exclusive_alternatives(alternatives),
                None => walker.reflect_struct(def, fields),
            }),
            Shape::Alias(target) => match &capabilities.one_of {
                Some(alternatives) => self.exclusive_alternatives(alternatives),
                None => {
                    let mut node = self.reflect_type(target)?;
                    if let Some(alternatives) = &capabilities.and_one_of {
                        let alternatives = self.alternatives(alternatives)?;
                        node.one_of.extend(alternatives);
                    }
                    Ok(node)
                }
            },
        }
    }

    /// `$ref` to an already registered definition of `id`.
    fn registered(&self, id: &TypeId) -> Option<SchemaNode> {
        if self.options.do_not_reference {
            return None;
        }
        let key = self.options.definition_name(id);
        if !self.definitions.contains_key(&key) {
            return None;
        }
        if let Some(owner) = self.owners.get(&key).filter(|owner| *owner != id) {
            tracing::warn!(
                definition = %key,
                registered = %owner,
                requested = %id,
                "definition name shared by two types; enable fully qualified names"
            );
        }
        Some(SchemaNode::reference(&key))
    }

    /// Store the node built by `build` as the definition of `def` and return a
    /// `$ref` to it. Without references the node itself is returned.
    fn register(
        &mut self,
        def: &TypeDef,
        build: impl FnOnce(&mut Self) -> Result<SchemaNode, ReflectError>,
    ) -> Result<SchemaNode, ReflectError> {
        if self.options.do_not_reference {
            return build(self);
        }

        let key = self.options.definition_name(&def.id);
        // placeholder: self-references inside `build` resolve to a $ref
        self.definitions.insert(key.clone(), SchemaNode::default());
        self.owners.insert(key.clone(), def.id.clone());

        let node = build(self)?;
        tracing::debug!(definition = %key, "registered definition");
        self.definitions.insert(key.clone(), node);
        Ok(SchemaNode::reference(&key))
    }

    fn reflect_struct(&mut self, def: &TypeDef, fields: &[FieldDef]) -> Result<SchemaNode, ReflectError> {
        let mut node = SchemaNode::object(self.options.allow_additional_properties);
        self.reflect_fields(&mut node, &def.id, fields)?;

        if let Some(condition) = &def.capabilities.condition {
            self.attach_condition(&mut node, condition)?;
        }
        if let Some(alternatives) = &def.capabilities.and_one_of {
            let alternatives = self.alternatives(alternatives)?;
            node.one_of.extend(alternatives);
        }
        Ok(node)
    }

    /// Add the properties of `fields` (declared on `owner`) to `node`.
    /// Embedded records are flattened into the same node.
    fn reflect_fields(
        &mut self,
        node: &mut SchemaNode,
        owner: &TypeId,
        fields: &[FieldDef],
    ) -> Result<(), ReflectError> {
        for field in fields {
            if field.embedded && field.exported {
                if let Some(id) = field.ty.named_id() {
                    if self.options.is_ignored(id) {
                        continue;
                    }
                    let catalog = self.catalog;
                    if let Some(inner) = catalog.get(id).and_then(TypeDef::fields) {
                        self.descend(id, |walker| walker.reflect_fields(node, id, inner))?;
                        continue;
                    }
                }
            }

            let Some(resolved) = resolve_field(field, owner, self.options) else {
                tracing::debug!(owner = %owner, field = %field.ident, "field skipped");
                continue;
            };

            let mut property = self.reflect_type(&field.ty)?;
            apply_directives(&mut property, &resolved.directives);

            for group in required_groups(&resolved.directives) {
                add_required_group(node, group, &resolved.name);
            }
            if resolved.required && !node.required.contains(&resolved.name) {
                node.required.push(resolved.name.clone());
            }
            node.properties.insert(resolved.name, property);
        }
        Ok(())
    }
}

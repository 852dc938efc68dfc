//! Composition schemas driven by type capabilities.
//!
//! Exclusive alternatives replace a type's schema with a bare `oneOf`;
//! combined alternatives are merged into the type's own schema; a condition
//! adds `if`/`then`/`else` to a record. Fields tagged `oneof_required=<group>`
//! collect into one titled `oneOf` branch per group.

use crate::constraints::apply_directives;
use crate::descriptor::{Alternative, Condition};
use crate::error::ReflectError;
use crate::reflector::Walker;
use crate::schema::{InstanceType, SchemaNode};
use crate::tags::{parse_directives, parse_serial_tag};

impl Walker<'_> {
    /// Schemas for each alternative, in declaration order.
    pub(crate) fn alternatives(
        &mut self,
        alternatives: &[Alternative],
    ) -> Result<Vec<SchemaNode>, ReflectError> {
        alternatives
            .iter()
            .map(|alternative| match alternative {
                Alternative::Null => Ok(SchemaNode::of(InstanceType::Null)),
                Alternative::Type(ty) => self.reflect_type(ty),
            })
            .collect()
    }

    /// A node whose only content is `oneOf` over the alternatives.
    pub(crate) fn exclusive_alternatives(
        &mut self,
        alternatives: &[Alternative],
    ) -> Result<SchemaNode, ReflectError> {
        Ok(SchemaNode {
            one_of: self.alternatives(alternatives)?,
            ..Default::default()
        })
    }

    /// Attach `if`/`then`/`else` to a record node.
    ///
    /// `if` constrains the condition field by its own annotations only:
    /// `{"properties": {<field>: <keywords>}}`.
    pub(crate) fn attach_condition(
        &mut self,
        node: &mut SchemaNode,
        condition: &Condition,
    ) -> Result<(), ReflectError> {
        let field = &condition.field;
        let name = parse_serial_tag(&field.serial_tag)
            .name
            .unwrap_or(field.ident.as_str())
            .to_string();

        let mut constraint = SchemaNode::default();
        apply_directives(&mut constraint, &parse_directives(&field.schema_tag));

        let mut if_schema = SchemaNode::default();
        if_schema.properties.insert(name, constraint);
        node.if_schema = Some(Box::new(if_schema));

        if let Some(then) = &condition.then {
            node.then_schema = Some(Box::new(self.reflect_type(then)?));
        }
        if let Some(otherwise) = &condition.otherwise {
            node.else_schema = Some(Box::new(self.reflect_type(otherwise)?));
        }
        Ok(())
    }
}

/// Add `property` to the `oneOf` branch titled `group`, creating it if needed.
pub(crate) fn add_required_group(node: &mut SchemaNode, group: &str, property: &str) {
    let position = node
        .one_of
        .iter()
        .position(|branch| branch.title.as_deref() == Some(group));
    let branch = match position {
        Some(i) => &mut node.one_of[i],
        None => {
            node.one_of.push(SchemaNode {
                title: Some(group.to_string()),
                ..Default::default()
            });
            let last = node.one_of.len() - 1;
            &mut node.one_of[last]
        }
    };
    if !branch.required.iter().any(|r| r == property) {
        branch.required.push(property.to_string());
    }
}

//! Reflection options and shared constants.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::descriptor::{TypeExpr, TypeId};
use crate::overrides::TagOverrides;
use crate::schema::SchemaNode;

/// Draft-04 meta-schema URI, the default `$schema` of generated documents.
pub const DRAFT_04: &str = "http://json-schema.org/draft-04/schema#";

/// JSON Pointer prefix of `$ref`s into the definitions table.
pub const DEFINITIONS_PREFIX: &str = "#/definitions/";

/// Default recursion ceiling for a single reflection.
///
/// Low enough that hitting it on a 2 MiB thread stack fails with
/// `CyclicType` before the stack runs out.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Escape hatch consulted before structural inference for every type.
pub type TypeOverrideFn = dyn Fn(&TypeExpr) -> Option<SchemaNode> + Send + Sync;

/// Options for schema reflection.
///
/// Fixed for the duration of a reflection. The override table and the type
/// override hook sit behind `Arc`s so one set of options can be shared by
/// concurrent reflections; neither can be mutated while shared.
#[derive(Clone)]
pub struct ReflectOptions {
    /// `$schema` URI written on the root document.
    pub version: String,
    /// Emit `additionalProperties: true` instead of `false` on record objects.
    pub allow_additional_properties: bool,
    /// A field is required only when its annotation says `required`, instead
    /// of whenever its serial tag lacks `omitempty`.
    pub required_from_annotations: bool,
    /// Inline the root record rather than referencing its definition.
    pub expand_top_level: bool,
    /// Inline every record at every occurrence; no definitions are produced.
    /// Self-referential types fail with `CyclicType` under this option.
    pub do_not_reference: bool,
    /// Qualify definition keys with the type's namespace.
    pub fully_qualify_names: bool,
    /// Types treated as absent wherever they appear.
    pub ignored_types: BTreeSet<TypeId>,
    pub type_override: Option<Arc<TypeOverrideFn>>,
    pub overrides: Option<Arc<TagOverrides>>,
    /// Recursion ceiling; exceeding it yields `CyclicType`.
    pub max_depth: usize,
}

impl Default for ReflectOptions {
    fn default() -> Self {
        Self {
            version: DRAFT_04.to_string(),
            allow_additional_properties: false,
            required_from_annotations: false,
            expand_top_level: false,
            do_not_reference: false,
            fully_qualify_names: false,
            ignored_types: BTreeSet::new(),
            type_override: None,
            overrides: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl fmt::Debug for ReflectOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReflectOptions")
            .field("version", &self.version)
            .field(
                "allow_additional_properties",
                &self.allow_additional_properties,
            )
            .field("required_from_annotations", &self.required_from_annotations)
            .field("expand_top_level", &self.expand_top_level)
            .field("do_not_reference", &self.do_not_reference)
            .field("fully_qualify_names", &self.fully_qualify_names)
            .field("ignored_types", &self.ignored_types)
            .field("type_override", &self.type_override.is_some())
            .field("overrides", &self.overrides)
            .field("max_depth", &self.max_depth)
            .finish()
    }
}

impl ReflectOptions {
    /// Create options with every switch off and draft-04 as the version.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn allow_additional_properties(mut self, allow: bool) -> Self {
        self.allow_additional_properties = allow;
        self
    }

    pub fn required_from_annotations(mut self, enabled: bool) -> Self {
        self.required_from_annotations = enabled;
        self
    }

    pub fn expand_top_level(mut self, enabled: bool) -> Self {
        self.expand_top_level = enabled;
        self
    }

    pub fn do_not_reference(mut self, enabled: bool) -> Self {
        self.do_not_reference = enabled;
        self
    }

    pub fn fully_qualify_names(mut self, enabled: bool) -> Self {
        self.fully_qualify_names = enabled;
        self
    }

    pub fn ignore_type(mut self, id: impl Into<TypeId>) -> Self {
        self.ignored_types.insert(id.into());
        self
    }

    pub fn type_override<F>(mut self, hook: F) -> Self
    where
        F: Fn(&TypeExpr) -> Option<SchemaNode> + Send + Sync + 'static,
    {
        self.type_override = Some(Arc::new(hook));
        self
    }

    /// Install a populated override table. The table is frozen from here on.
    pub fn overrides(mut self, overrides: TagOverrides) -> Self {
        self.overrides = Some(Arc::new(overrides));
        self
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn is_ignored(&self, id: &TypeId) -> bool {
        self.ignored_types.contains(id)
    }

    /// Key under which `id` is stored in the definitions table.
    pub fn definition_name(&self, id: &TypeId) -> String {
        if self.fully_qualify_names {
            id.qualified_name()
        } else {
            id.name.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let opts = ReflectOptions::new();
        assert_eq!(opts.version, DRAFT_04);
        assert!(!opts.allow_additional_properties);
        assert!(!opts.do_not_reference);
        assert_eq!(opts.max_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn definition_name_qualification() {
        let id = TypeId::in_namespace("v1", "Hardware");
        assert_eq!(ReflectOptions::new().definition_name(&id), "Hardware");
        assert_eq!(
            ReflectOptions::new()
                .fully_qualify_names(true)
                .definition_name(&id),
            "v1.Hardware"
        );
    }

    #[test]
    fn ignore_type_accepts_strings() {
        let opts = ReflectOptions::new().ignore_type("audit.Trail");
        assert!(opts.is_ignored(&TypeId::in_namespace("audit", "Trail")));
        assert!(!opts.is_ignored(&TypeId::new("Trail")));
    }

    #[test]
    fn debug_hides_hook_body() {
        let opts = ReflectOptions::new().type_override(|_| None);
        let rendered = format!("{:?}", opts);
        assert!(rendered.contains("type_override: true"));
    }
}

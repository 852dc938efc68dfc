//! Externally supplied replacements for field annotations.

use std::collections::BTreeMap;

use crate::descriptor::{TypeCatalog, TypeExpr, TypeId};
use crate::error::OverrideError;

/// Annotation overrides keyed by record type and field identifier.
///
/// Targets are validated when set, so lookups during reflection never fail.
/// Populate the table first, then hand it to
/// [`ReflectOptions::overrides`](crate::ReflectOptions::overrides), which
/// freezes it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagOverrides {
    entries: BTreeMap<TypeId, BTreeMap<String, String>>,
}

impl TagOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the annotation of `field` on the record `target`.
    ///
    /// # Errors
    ///
    /// Returns `OverrideError::NotCompound` if `target` is not a named record
    /// (optional wrappers included), or `OverrideError::FieldNotFound` if the
    /// record declares no field with that identifier.
    pub fn set(
        &mut self,
        catalog: &TypeCatalog,
        target: &TypeExpr,
        field: &str,
        tag: impl Into<String>,
    ) -> Result<(), OverrideError> {
        let not_compound = || OverrideError::NotCompound {
            type_name: target.to_string(),
        };

        let TypeExpr::Named(id) = target else {
            return Err(not_compound());
        };
        let fields = catalog
            .get(id)
            .and_then(|def| def.fields())
            .ok_or_else(not_compound)?;

        if !fields.iter().any(|f| f.ident == field) {
            return Err(OverrideError::FieldNotFound {
                type_name: id.to_string(),
                field: field.to_string(),
            });
        }

        self.entries
            .entry(id.clone())
            .or_default()
            .insert(field.to_string(), tag.into());
        Ok(())
    }

    /// Override for `field` on `target`, if one was set.
    pub fn get(&self, target: &TypeId, field: &str) -> Option<&str> {
        self.entries
            .get(target)
            .and_then(|fields| fields.get(field))
            .map(String::as_str)
    }

    /// Number of overridden fields.
    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{FieldDef, TypeDef};

    fn catalog() -> TypeCatalog {
        TypeCatalog::new()
            .with(TypeDef::record(
                "Human",
                vec![
                    FieldDef::new("Name", TypeExpr::String),
                    FieldDef::new("Sex", TypeExpr::String),
                    FieldDef::new("age", TypeExpr::Integer).unexported(),
                ],
            ))
            .with(TypeDef::record(
                "Alien",
                vec![FieldDef::new("bloop", TypeExpr::Number).unexported()],
            ))
            .with(TypeDef::alias("Age", TypeExpr::Integer))
    }

    #[test]
    fn set_on_record_field() {
        let mut overrides = TagOverrides::new();
        let result = overrides.set(&catalog(), &TypeExpr::named("Human"), "Name", "required");
        assert!(result.is_ok());
        assert_eq!(overrides.len(), 1);
    }

    #[test]
    fn set_rejects_pointer_to_record() {
        let mut overrides = TagOverrides::new();
        let target = TypeExpr::optional(TypeExpr::named("Human"));
        let result = overrides.set(&catalog(), &target, "Name", "required");
        assert!(matches!(result, Err(OverrideError::NotCompound { .. })));
        assert!(overrides.is_empty());
    }

    #[test]
    fn set_rejects_non_record_types() {
        let mut overrides = TagOverrides::new();
        let catalog = catalog();
        for target in [
            TypeExpr::String,
            TypeExpr::named("Age"),
            TypeExpr::named("Missing"),
        ] {
            let result = overrides.set(&catalog, &target, "Name", "required");
            assert!(matches!(result, Err(OverrideError::NotCompound { .. })));
        }
    }

    #[test]
    fn set_rejects_unknown_field() {
        let mut overrides = TagOverrides::new();
        let result = overrides.set(&catalog(), &TypeExpr::named("Human"), "name", "required");
        assert_eq!(
            result,
            Err(OverrideError::FieldNotFound {
                type_name: "Human".into(),
                field: "name".into(),
            })
        );
    }

    #[test]
    fn get_returns_exact_tag() {
        let catalog = catalog();
        let mut overrides = TagOverrides::new();
        let human = TypeExpr::named("Human");
        overrides.set(&catalog, &human, "Name", "required").unwrap();
        overrides
            .set(&catalog, &human, "Sex", "required,enum=male|female|neither|both")
            .unwrap();

        let id = TypeId::new("Human");
        assert_eq!(overrides.get(&id, "Name"), Some("required"));
        assert_eq!(
            overrides.get(&id, "Sex"),
            Some("required,enum=male|female|neither|both")
        );
        assert_eq!(overrides.get(&id, "bloop"), None);
    }

    #[test]
    fn entries_are_scoped_per_type() {
        let catalog = catalog();
        let mut overrides = TagOverrides::new();
        overrides
            .set(&catalog, &TypeExpr::named("Human"), "Name", "required")
            .unwrap();
        overrides
            .set(
                &catalog,
                &TypeExpr::named("Alien"),
                "bloop",
                "required,enum=3.1415926535897932384626",
            )
            .unwrap();

        assert_eq!(overrides.get(&TypeId::new("Human"), "bloop"), None);
        assert_eq!(
            overrides.get(&TypeId::new("Alien"), "bloop"),
            Some("required,enum=3.1415926535897932384626")
        );
    }

    #[test]
    fn later_set_replaces_earlier() {
        let catalog = catalog();
        let mut overrides = TagOverrides::new();
        let human = TypeExpr::named("Human");
        overrides.set(&catalog, &human, "Name", "required").unwrap();
        overrides.set(&catalog, &human, "Name", "minLength=2").unwrap();
        assert_eq!(overrides.get(&TypeId::new("Human"), "Name"), Some("minLength=2"));
        assert_eq!(overrides.len(), 1);
    }
}

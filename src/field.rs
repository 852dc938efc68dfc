//! Field name and requiredness resolution.

use crate::descriptor::{FieldDef, TypeId};
use crate::tags::{is_ignored, parse_directives, parse_serial_tag, Directive};
use crate::types::ReflectOptions;

/// A field that survives resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedField {
    /// Property name in the generated schema.
    pub name: String,
    pub required: bool,
    /// Effective annotation directives (override table first, then the field's own).
    pub directives: Vec<Directive>,
}

/// Resolve a field's exported name, requiredness and directives.
///
/// Returns `None` when the field is unexported, suppressed by either tag, or
/// typed with an ignored type.
pub fn resolve_field(
    field: &FieldDef,
    owner: &TypeId,
    options: &ReflectOptions,
) -> Option<ResolvedField> {
    if !field.exported {
        return None;
    }

    let serial = parse_serial_tag(&field.serial_tag);
    if serial.ignored {
        return None;
    }

    let annotation = options
        .overrides
        .as_ref()
        .and_then(|overrides| overrides.get(owner, &field.ident))
        .unwrap_or(field.schema_tag.as_str());
    if is_ignored(annotation) {
        return None;
    }

    if field
        .ty
        .named_id()
        .is_some_and(|id| options.is_ignored(id))
    {
        return None;
    }

    let directives = parse_directives(annotation);
    let required = if options.required_from_annotations {
        directives.iter().any(|d| d.is_keyword("required"))
    } else {
        !serial.omit_empty
    };

    Some(ResolvedField {
        name: serial.name.unwrap_or(field.ident.as_str()).to_string(),
        required,
        directives,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{TypeCatalog, TypeDef, TypeExpr};
    use crate::overrides::TagOverrides;

    fn owner() -> TypeId {
        TypeId::new("User")
    }

    #[test]
    fn name_defaults_to_identifier() {
        let field = FieldDef::new("TestFlag", TypeExpr::Bool);
        let resolved = resolve_field(&field, &owner(), &ReflectOptions::new()).unwrap();
        assert_eq!(resolved.name, "TestFlag");
        assert!(resolved.required);
    }

    #[test]
    fn serial_name_and_omitempty() {
        let field = FieldDef::new("Friends", TypeExpr::seq(TypeExpr::Integer))
            .serial_tag("friends,omitempty");
        let resolved = resolve_field(&field, &owner(), &ReflectOptions::new()).unwrap();
        assert_eq!(resolved.name, "friends");
        assert!(!resolved.required);
    }

    #[test]
    fn skipped_fields() {
        let options = ReflectOptions::new();
        let cases = [
            FieldDef::new("secret", TypeExpr::String)
                .serial_tag("i_am_private")
                .schema_tag("required")
                .unexported(),
            FieldDef::new("Ignored", TypeExpr::String)
                .serial_tag("-")
                .schema_tag("required"),
            FieldDef::new("SchemaIgnored", TypeExpr::String).schema_tag("-,required"),
        ];
        for field in &cases {
            assert_eq!(resolve_field(field, &owner(), &options), None, "{}", field.ident);
        }
    }

    #[test]
    fn ignored_types_are_skipped() {
        let options = ReflectOptions::new().ignore_type("Audit");
        let field = FieldDef::new("Audit", TypeExpr::optional(TypeExpr::named("Audit")));
        assert_eq!(resolve_field(&field, &owner(), &options), None);
    }

    #[test]
    fn required_from_annotations_mode() {
        let options = ReflectOptions::new().required_from_annotations(true);

        let tagged = FieldDef::new("Photo", TypeExpr::Bytes)
            .serial_tag("photo,omitempty")
            .schema_tag("required");
        assert!(resolve_field(&tagged, &owner(), &options).unwrap().required);

        let untagged = FieldDef::new("Age", TypeExpr::Integer).serial_tag("age");
        assert!(!resolve_field(&untagged, &owner(), &options).unwrap().required);
    }

    #[test]
    fn required_keyword_ignored_by_default() {
        let field = FieldDef::new("Photo", TypeExpr::Bytes)
            .serial_tag("photo,omitempty")
            .schema_tag("required");
        let resolved = resolve_field(&field, &owner(), &ReflectOptions::new()).unwrap();
        assert!(!resolved.required);
    }

    #[test]
    fn override_replaces_annotation() {
        let catalog = TypeCatalog::new().with(TypeDef::record(
            "User",
            vec![FieldDef::new("Sex", TypeExpr::String).schema_tag("enum=a|b")],
        ));
        let mut overrides = TagOverrides::new();
        overrides
            .set(&catalog, &TypeExpr::named("User"), "Sex", "required,maxLength=4")
            .unwrap();
        let options = ReflectOptions::new()
            .required_from_annotations(true)
            .overrides(overrides);

        let field = FieldDef::new("Sex", TypeExpr::String).schema_tag("enum=a|b");
        let resolved = resolve_field(&field, &owner(), &options).unwrap();
        assert!(resolved.required);
        assert_eq!(resolved.directives, parse_directives("required,maxLength=4"));
    }

    #[test]
    fn override_can_suppress_field() {
        let catalog = TypeCatalog::new().with(TypeDef::record(
            "User",
            vec![FieldDef::new("Sex", TypeExpr::String)],
        ));
        let mut overrides = TagOverrides::new();
        overrides
            .set(&catalog, &TypeExpr::named("User"), "Sex", "-")
            .unwrap();
        let options = ReflectOptions::new().overrides(overrides);

        let field = FieldDef::new("Sex", TypeExpr::String);
        assert_eq!(resolve_field(&field, &owner(), &options), None);
    }
}

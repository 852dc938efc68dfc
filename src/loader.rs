//! Catalog and override loading from JSON files and strings.
//!
//! A catalog file lists type definitions:
//!
//! ```json
//! { "types": [ { "id": { "name": "Pet" }, "shape": { "struct": [] } } ] }
//! ```
//!
//! An override file maps `Type` (or `namespace.Type`) to field annotations:
//!
//! ```json
//! { "Pet": { "Name": "required,minLength=1" } }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::descriptor::{TypeCatalog, TypeDef, TypeExpr, TypeId};
use crate::error::LoadError;
use crate::overrides::TagOverrides;

#[derive(Deserialize)]
struct CatalogFile {
    types: Vec<TypeDef>,
}

type OverrideFile = BTreeMap<String, BTreeMap<String, String>>;

fn read_file(path: &Path) -> Result<String, LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    std::fs::read_to_string(path).map_err(|source| LoadError::ReadError {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a type catalog from a file path.
///
/// # Errors
///
/// Returns `LoadError::FileNotFound` if the file doesn't exist,
/// `LoadError::InvalidJson` if it isn't a valid catalog, or
/// `LoadError::DuplicateType` if a type is declared twice.
pub fn load_catalog(path: &Path) -> Result<TypeCatalog, LoadError> {
    load_catalog_str(&read_file(path)?)
}

/// Load a type catalog from a JSON string.
///
/// # Errors
///
/// Same as [`load_catalog`], minus the I/O cases.
pub fn load_catalog_str(content: &str) -> Result<TypeCatalog, LoadError> {
    let file: CatalogFile =
        serde_json::from_str(content).map_err(|source| LoadError::InvalidJson { source })?;

    let mut catalog = TypeCatalog::new();
    for def in file.types {
        let type_name = def.id.to_string();
        if catalog.insert(def).is_some() {
            return Err(LoadError::DuplicateType { type_name });
        }
    }
    tracing::debug!(types = catalog.len(), "loaded catalog");
    Ok(catalog)
}

/// Load an override table from a file path, validating it against `catalog`.
///
/// # Errors
///
/// Returns `LoadError::FileNotFound`/`ReadError` for I/O failures,
/// `LoadError::InvalidJson` for malformed content, or `LoadError::Override`
/// if an entry names a non-record type or a missing field.
pub fn load_overrides(path: &Path, catalog: &TypeCatalog) -> Result<TagOverrides, LoadError> {
    load_overrides_str(&read_file(path)?, catalog)
}

/// Load an override table from a JSON string.
///
/// # Errors
///
/// Same as [`load_overrides`], minus the I/O cases.
pub fn load_overrides_str(content: &str, catalog: &TypeCatalog) -> Result<TagOverrides, LoadError> {
    let file: OverrideFile =
        serde_json::from_str(content).map_err(|source| LoadError::InvalidJson { source })?;

    let mut overrides = TagOverrides::new();
    for (type_name, fields) in file {
        let target = TypeExpr::Named(TypeId::parse(&type_name));
        for (field, tag) in fields {
            overrides
                .set(catalog, &target, &field, tag)
                .map_err(|source| LoadError::Override {
                    target: format!("{}.{}", type_name, field),
                    source,
                })?;
        }
    }
    tracing::debug!(fields = overrides.len(), "loaded overrides");
    Ok(overrides)
}

//! Error types for schema reflection, tag overrides and catalog loading.

use std::path::PathBuf;
use thiserror::Error;

/// Errors during reflection of a type into a schema.
#[derive(Debug, Error)]
pub enum ReflectError {
    #[error("unsupported type: {type_name}")]
    UnsupportedType { type_name: String },

    #[error("type {type_name} is not defined in the catalog")]
    UndefinedType { type_name: String },

    #[error("cyclic type {type_name}: reflection exceeded depth {depth}")]
    CyclicType { type_name: String, depth: usize },
}

impl ReflectError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        2
    }
}

/// Errors when registering a tag override.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OverrideError {
    #[error("expecting compound type, got {type_name} instead")]
    NotCompound { type_name: String },

    #[error("type {type_name} does not have field {field}")]
    FieldNotFound { type_name: String, field: String },
}

/// Errors while loading catalogs and override tables.
#[derive(Debug, Error)]
pub enum LoadError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Parse errors (exit code 2)
    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    #[error("type {type_name} is declared more than once")]
    DuplicateType { type_name: String },

    #[error("invalid override for {target}: {source}")]
    Override {
        target: String,
        #[source]
        source: OverrideError,
    },
}

impl LoadError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadError::FileNotFound { .. } | LoadError::ReadError { .. } => 3,
            _ => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_error_exit_codes() {
        let err = LoadError::FileNotFound {
            path: PathBuf::from("types.json"),
        };
        assert_eq!(err.exit_code(), 3);

        let err = LoadError::DuplicateType {
            type_name: "User".into(),
        };
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn reflect_error_messages() {
        let err = ReflectError::UnsupportedType {
            type_name: "chan int".into(),
        };
        assert_eq!(err.to_string(), "unsupported type: chan int");
        assert_eq!(err.exit_code(), 2);

        let err = ReflectError::CyclicType {
            type_name: "Node".into(),
            depth: 256,
        };
        assert_eq!(
            err.to_string(),
            "cyclic type Node: reflection exceeded depth 256"
        );
    }

    #[test]
    fn override_error_display() {
        let err = OverrideError::FieldNotFound {
            type_name: "Human".into(),
            field: "name".into(),
        };
        assert_eq!(err.to_string(), "type Human does not have field name");
    }
}

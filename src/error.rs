//! Error taxonomy.
//!
//! - [`DeclarationError`]: malformed schema, raised by the builders.
//! - [`RegistrationError`]: per-field (or per-source) failures found while
//!   resolving; collected into a [`RegistrationReport`](crate::RegistrationReport).
//! - [`AccessError`]: returned by the typed accessors and overrides.
//! - [`SourceError`]: a value source could not produce its values.
//! - [`ConfigError`]: lifecycle misuse of the configuration root.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::{FieldId, FieldType};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DeclarationError {
    #[error("Field key must not be empty")]
    EmptyFieldKey,

    #[error("Field '{key}' has no type; call .field_type() on the builder")]
    MissingType { key: String },

    #[error("Field '{key}' sets both a default and a default generator")]
    DefaultConflict { key: String },

    #[error("Default for field '{key}' is {found}, but the field is declared {expected}")]
    DefaultTypeMismatch {
        key: String,
        expected: FieldType,
        found: FieldType,
    },

    #[error("Enumeration for field '{key}' contains a {found}, but the field is declared {expected}")]
    EnumerationTypeMismatch {
        key: String,
        expected: FieldType,
        found: FieldType,
    },

    #[error("Enumeration is not supported on list field '{key}' ({field_type})")]
    EnumerationOnList { key: String, field_type: FieldType },

    #[error("Default '{value}' for field '{key}' is not in its enumeration")]
    DefaultNotInEnumeration { key: String, value: String },

    #[error("Field set key must not be empty")]
    EmptyFieldSetKey,

    #[error("Duplicate field '{field}' in field set '{field_set}'")]
    DuplicateField { field_set: String, field: String },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RegistrationError {
    #[error("{field}: default generator failed: {reason}")]
    Generator { field: FieldId, reason: String },

    #[error("{field}: cannot use '{raw}' as {expected}: {reason}")]
    Coercion {
        field: FieldId,
        raw: String,
        expected: FieldType,
        reason: String,
    },

    #[error("{field}: '{value}' is not one of [{}]", .allowed.join(", "))]
    NotInEnumeration {
        field: FieldId,
        value: String,
        allowed: Vec<String>,
    },

    #[error("{field}: {reason}")]
    Validation { field: FieldId, reason: String },

    #[error("{field}: a value is required")]
    Required { field: FieldId },

    #[error("Unknown key '{field}' reported by {source_name}")]
    UnknownKey { source_name: String, field: FieldId },

    #[error("Value source {source_name} failed: {reason}")]
    Source { source_name: String, reason: String },
}

impl RegistrationError {
    /// The field this error is attributed to, if any.
    pub fn field(&self) -> Option<&FieldId> {
        match self {
            RegistrationError::Generator { field, .. }
            | RegistrationError::Coercion { field, .. }
            | RegistrationError::NotInEnumeration { field, .. }
            | RegistrationError::Validation { field, .. }
            | RegistrationError::Required { field }
            | RegistrationError::UnknownKey { field, .. } => Some(field),
            RegistrationError::Source { .. } => None,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AccessError {
    #[error("Field '{field}' is not registered")]
    NotRegistered { field: FieldId },

    #[error("Field '{field}' is declared {declared}, not {requested}")]
    TypeMismatch {
        field: FieldId,
        declared: FieldType,
        requested: FieldType,
    },

    #[error("Field '{field}' has no resolved value")]
    Unresolved { field: FieldId },

    #[error("Override for '{field}' rejected: {reason}")]
    Rejected { field: FieldId, reason: String },

    #[error("Configuration is not registered yet; call .register() first")]
    NotReady,
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {origin}: {reason}")]
    Parse { origin: String, reason: String },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Duplicate field set '{0}'")]
    DuplicateFieldSet(String),

    #[error("Configuration is already registered")]
    AlreadyRegistered,
}

//! The outcome of a registration: every error found, or none.

use std::fmt;

use serde::Serialize;

use crate::error::RegistrationError;

/// All errors collected during one registration pass.
///
/// An empty report means the configuration is ready. Display renders one
/// error per line; [`to_json`](Self::to_json) renders machine-readable
/// records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistrationReport {
    errors: Vec<RegistrationError>,
}

/// One error flattened for serialization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_set: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub message: String,
}

impl RegistrationReport {
    pub fn new(errors: Vec<RegistrationError>) -> Self {
        Self { errors }
    }

    /// True when registration found no errors.
    pub fn is_ready(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[RegistrationError] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_errors(self) -> Vec<RegistrationError> {
        self.errors
    }

    pub fn records(&self) -> Vec<ErrorRecord> {
        self.errors
            .iter()
            .map(|e| ErrorRecord {
                field_set: e.field().map(|id| id.field_set.clone()),
                field: e.field().map(|id| id.field.clone()),
                message: e.to_string(),
            })
            .collect()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.records())
    }
}

impl fmt::Display for RegistrationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a RegistrationReport {
    type Item = &'a RegistrationError;
    type IntoIter = std::slice::Iter<'a, RegistrationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

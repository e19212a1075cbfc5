//! The value source contract and an in-memory implementation.
//!
//! A source receives the full [`Schema`] and reports raw candidates for the
//! fields it recognizes. Presence in [`SourceOutput::values`] means
//! "present"; absence means the source has nothing to say about a field.
//! Sources are polled once per registration, in the order they were added,
//! and later sources override earlier ones field by field.

use indexmap::IndexMap;

use crate::error::SourceError;
use crate::field_set::Schema;
use crate::types::{FieldId, RawValue};

/// What a single source reported during registration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceOutput {
    pub values: IndexMap<FieldId, RawValue>,
    /// Set when the source saw a help request (e.g. `--help`).
    pub help_requested: bool,
}

impl SourceOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: FieldId, raw: RawValue) {
        self.values.insert(id, raw);
    }

    pub fn get(&self, id: &FieldId) -> Option<&RawValue> {
        self.values.get(id)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A provider of raw candidate values.
///
/// Implementations may report keys that are not declared in the schema;
/// whether those are ignored or reported is decided by the root's strict
/// setting, not by the source.
pub trait ValueSource: Send + Sync {
    /// Short name used in diagnostics and provenance (e.g. `"env"`).
    fn name(&self) -> &str;

    fn load(&self, schema: &Schema<'_>) -> Result<SourceOutput, SourceError>;

    /// The external key this source reads for `id` (an env var name, a
    /// flag), shown in help output.
    fn field_hint(&self, _id: &FieldId) -> Option<String> {
        None
    }
}

/// A named, in-memory source. Useful for programmatic overrides and tests.
#[derive(Debug, Clone)]
pub struct MapSource {
    name: String,
    values: IndexMap<FieldId, RawValue>,
}

impl MapSource {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            values: IndexMap::new(),
        }
    }

    /// Report `raw` for `field_set.field`. Later calls for the same field win.
    pub fn set(mut self, field_set: &str, field: &str, raw: impl Into<RawValue>) -> Self {
        self.values.insert(FieldId::new(field_set, field), raw.into());
        self
    }
}

impl ValueSource for MapSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&self, _schema: &Schema<'_>) -> Result<SourceOutput, SourceError> {
        Ok(SourceOutput {
            values: self.values.clone(),
            help_requested: false,
        })
    }
}

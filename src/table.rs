//! The resolved table: one typed value and its origin per field.

use indexmap::IndexMap;

use crate::error::AccessError;
use crate::field_set::Schema;
use crate::types::{FieldId, FieldType, Origin, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub value: Value,
    pub origin: Origin,
}

#[derive(Debug, Clone, Default)]
pub struct ResolvedTable {
    entries: IndexMap<FieldId, Resolved>,
}

impl ResolvedTable {
    pub fn insert(&mut self, id: FieldId, resolved: Resolved) {
        self.entries.insert(id, resolved);
    }

    pub fn get(&self, id: &FieldId) -> Option<&Resolved> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Look up `id`, checking it against the schema first so that an
    /// undeclared field, a wrong type and a field that failed to resolve
    /// are told apart.
    ///
    /// `requested` of `None` skips the type check.
    pub fn lookup(
        &self,
        schema: Schema<'_>,
        id: &FieldId,
        requested: Option<FieldType>,
    ) -> Result<&Resolved, AccessError> {
        let field = schema.field(id).ok_or_else(|| AccessError::NotRegistered {
            field: id.clone(),
        })?;
        if let Some(requested) = requested
            && field.field_type() != requested
        {
            return Err(AccessError::TypeMismatch {
                field: id.clone(),
                declared: field.field_type(),
                requested,
            });
        }
        self.get(id)
            .ok_or_else(|| AccessError::Unresolved { field: id.clone() })
    }
}

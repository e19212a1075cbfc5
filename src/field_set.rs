//! Field sets (named, ordered groups of fields) and the [`Schema`] view that
//! value sources receive.

use indexmap::IndexMap;

use crate::error::DeclarationError;
use crate::field::Field;
use crate::types::FieldId;

/// A named namespace of fields. Field order is declaration order.
#[derive(Debug, Clone)]
pub struct FieldSet {
    key: String,
    fields: IndexMap<String, Field>,
}

impl FieldSet {
    pub fn builder() -> FieldSetBuilder {
        FieldSetBuilder::default()
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn field(&self, key: &str) -> Option<&Field> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.values()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Builder for [`FieldSet`].
#[derive(Default)]
pub struct FieldSetBuilder {
    key: String,
    fields: Vec<Field>,
}

impl FieldSetBuilder {
    /// The set's key, unique within the configuration root.
    pub fn key(mut self, key: &str) -> Self {
        self.key = key.to_string();
        self
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn fields(mut self, fields: impl IntoIterator<Item = Field>) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Produce the field set. Duplicate field keys are rejected rather than
    /// silently overwritten.
    pub fn build(self) -> Result<FieldSet, DeclarationError> {
        if self.key.is_empty() {
            return Err(DeclarationError::EmptyFieldSetKey);
        }

        let mut fields = IndexMap::with_capacity(self.fields.len());
        for field in self.fields {
            if fields.contains_key(field.key()) {
                return Err(DeclarationError::DuplicateField {
                    field_set: self.key,
                    field: field.key().to_string(),
                });
            }
            fields.insert(field.key().to_string(), field);
        }

        Ok(FieldSet {
            key: self.key,
            fields,
        })
    }
}

/// Read-only view over every declared field set, in declaration order.
#[derive(Debug, Clone, Copy)]
pub struct Schema<'a> {
    sets: &'a [FieldSet],
}

impl<'a> Schema<'a> {
    pub fn new(sets: &'a [FieldSet]) -> Self {
        Self { sets }
    }

    pub fn field_sets(self) -> impl Iterator<Item = &'a FieldSet> + 'a {
        self.sets.iter()
    }

    /// Every declared field with its identity, set order then field order.
    pub fn fields(self) -> impl Iterator<Item = (FieldId, &'a Field)> + 'a {
        self.sets.iter().flat_map(|set| {
            set.fields()
                .map(move |field| (FieldId::new(set.key(), field.key()), field))
        })
    }

    pub fn field(&self, id: &FieldId) -> Option<&'a Field> {
        self.sets
            .iter()
            .find(|set| set.key() == id.field_set)?
            .field(&id.field)
    }

    pub fn contains(&self, id: &FieldId) -> bool {
        self.field(id).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.iter().all(FieldSet::is_empty)
    }
}

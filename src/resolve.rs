//! Core resolution pipeline: turn declared fields plus polled source layers
//! into a resolved table and a complete list of registration errors.
//!
//! Operates on pre-loaded source output (`ResolveInput`) with no I/O, making
//! the whole pipeline testable with synthetic inputs. For each field, in
//! field-set order then field order:
//!
//! 1. Seed with the static default, or call the generator exactly once
//! 2. Overlay each layer in order; a present value replaces the candidate
//! 3. Coerce the candidate to the declared type
//! 4. Check `required`, then the enumeration, then the validator
//! 5. Store the value with its origin
//!
//! Errors never stop the pass. A field that fails in step 1 (with nothing to
//! overlay) or step 3 has no entry; a field that fails step 4 keeps its
//! value so callers can still inspect it.

use crate::coerce::coerce;
use crate::error::RegistrationError;
use crate::field::Field;
use crate::field_set::Schema;
use crate::source::SourceOutput;
use crate::table::{Resolved, ResolvedTable};
use crate::types::{FieldId, Origin, RawValue, Value};

/// One polled source.
pub struct Layer {
    pub source: String,
    pub output: SourceOutput,
}

/// All pre-loaded data needed to resolve a schema.
pub struct ResolveInput<'a> {
    pub schema: Schema<'a>,
    /// Source layers in precedence order: first = lowest, last = highest.
    pub layers: Vec<Layer>,
    /// Report keys that no declared field matches.
    pub strict: bool,
}

pub struct Resolution {
    pub table: ResolvedTable,
    pub errors: Vec<RegistrationError>,
}

pub fn resolve(input: ResolveInput<'_>) -> Resolution {
    let mut table = ResolvedTable::default();
    let mut errors = Vec::new();

    for (id, field) in input.schema.fields() {
        if let Some(resolved) = resolve_field(&id, field, &input.layers, &mut errors) {
            tracing::trace!(field = %id, origin = %resolved.origin, "resolved field");
            table.insert(id, resolved);
        }
    }

    if input.strict {
        for layer in &input.layers {
            for id in layer.output.values.keys() {
                if !input.schema.contains(id) {
                    errors.push(RegistrationError::UnknownKey {
                        source_name: layer.source.clone(),
                        field: id.clone(),
                    });
                }
            }
        }
    }

    Resolution { table, errors }
}

/// A value on its way to the table: typed when seeded, raw when reported
/// by a source.
enum Candidate {
    Typed(Value),
    Raw(RawValue),
}

fn resolve_field(
    id: &FieldId,
    field: &Field,
    layers: &[Layer],
    errors: &mut Vec<RegistrationError>,
) -> Option<Resolved> {
    // 1: seed
    let mut seed_failed = false;
    let mut candidate = match field.default_value() {
        Some(default) => Some((Candidate::Typed(default.clone()), Origin::Default)),
        None => match field.generate() {
            Some(Ok(generated)) => Some((Candidate::Typed(generated), Origin::Generated)),
            Some(Err(reason)) => {
                errors.push(RegistrationError::Generator {
                    field: id.clone(),
                    reason,
                });
                seed_failed = true;
                None
            }
            None => None,
        },
    };

    // 2: overlay, last writer wins
    for layer in layers {
        if let Some(raw) = layer.output.get(id) {
            candidate = Some((
                Candidate::Raw(raw.clone()),
                Origin::Source(layer.source.clone()),
            ));
        }
    }

    // 3: coerce
    let (value, origin) = match candidate {
        Some((Candidate::Typed(value), origin)) if value.field_type() == field.field_type() => {
            (value, origin)
        }
        Some((candidate, origin)) => {
            let raw = match candidate {
                Candidate::Typed(value) => RawValue::from(value),
                Candidate::Raw(raw) => raw,
            };
            match coerce(&raw, field.field_type()) {
                Ok(value) => (value, origin),
                Err(reason) => {
                    errors.push(RegistrationError::Coercion {
                        field: id.clone(),
                        raw: field.display_value(&raw),
                        expected: field.field_type(),
                        reason,
                    });
                    return None;
                }
            }
        }
        None if seed_failed => return None,
        None => (field.field_type().zero_value(), Origin::Zero),
    };

    // 4: validate
    let supplied = origin != Origin::Zero;
    if field.is_required() && (!supplied || value.is_empty()) {
        errors.push(RegistrationError::Required { field: id.clone() });
    } else if supplied && !field.allows(&value) {
        let allowed = field
            .enumeration()
            .unwrap_or_default()
            .iter()
            .map(|v| field.display_value(v))
            .collect();
        errors.push(RegistrationError::NotInEnumeration {
            field: id.clone(),
            value: field.display_value(&value),
            allowed,
        });
    } else if supplied && let Err(reason) = field.run_validator(&value) {
        errors.push(RegistrationError::Validation {
            field: id.clone(),
            reason,
        });
    }

    // 5: store
    Some(Resolved { value, origin })
}

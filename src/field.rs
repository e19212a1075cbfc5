//! Field definitions: one declared, typed configuration value and its
//! constraints.
//!
//! Fields are declared through a consuming [`FieldBuilder`]:
//!
//! ```ignore
//! let level = Field::builder()
//!     .key("level")
//!     .field_type(FieldType::String)
//!     .description("Logging level")
//!     .default("info")
//!     .enumeration(["debug", "info", "warn", "error"])
//!     .build();
//! ```
//!
//! Schema mistakes are programmer errors. [`FieldBuilder::build`] panics on
//! them; [`FieldBuilder::try_build`] returns the [`DeclarationError`] instead.

use std::fmt;
use std::sync::Arc;

use crate::error::DeclarationError;
use crate::help::redact;
use crate::types::{FieldType, Value};

/// Error type returned by generators and validators.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Produces a field's default at registration time.
pub type Generator = Arc<dyn Fn() -> Result<Value, BoxError> + Send + Sync>;

/// Checks a coerced value; an `Err` rejects it with the error's message.
pub type Validator = Arc<dyn Fn(&Value) -> Result<(), BoxError> + Send + Sync>;

/// An immutable field definition. Build one with [`Field::builder`].
#[derive(Clone)]
pub struct Field {
    key: String,
    field_type: FieldType,
    description: Option<String>,
    default: Option<Value>,
    generator: Option<Generator>,
    validator: Option<Validator>,
    enumeration: Option<Vec<Value>>,
    required: bool,
    sensitive: bool,
}

impl Field {
    pub fn builder() -> FieldBuilder {
        // `FieldBuilder::default` is the default-value setter
        <FieldBuilder as Default>::default()
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn has_generator(&self) -> bool {
        self.generator.is_some()
    }

    pub fn has_validator(&self) -> bool {
        self.validator.is_some()
    }

    pub fn enumeration(&self) -> Option<&[Value]> {
        self.enumeration.as_deref()
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_sensitive(&self) -> bool {
        self.sensitive
    }

    /// Run the default generator, if one is declared.
    pub(crate) fn generate(&self) -> Option<Result<Value, String>> {
        self.generator
            .as_ref()
            .map(|generate| generate().map_err(|e| e.to_string()))
    }

    /// Whether `value` satisfies the enumeration (always true without one).
    pub(crate) fn allows(&self, value: &Value) -> bool {
        self.enumeration
            .as_ref()
            .is_none_or(|allowed| allowed.contains(value))
    }

    pub(crate) fn run_validator(&self, value: &Value) -> Result<(), String> {
        match &self.validator {
            Some(validate) => validate(value).map_err(|e| e.to_string()),
            None => Ok(()),
        }
    }

    /// Render a value of this field for diagnostics, hiding sensitive ones.
    pub(crate) fn display_value(&self, value: &impl fmt::Display) -> String {
        redact(self.sensitive, value)
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let default = self.default.as_ref().map(|v| self.display_value(v));
        f.debug_struct("Field")
            .field("key", &self.key)
            .field("field_type", &self.field_type)
            .field("description", &self.description)
            .field("default", &default)
            .field("generator", &self.generator.is_some())
            .field("validator", &self.validator.is_some())
            .field("enumeration", &self.enumeration)
            .field("required", &self.required)
            .field("sensitive", &self.sensitive)
            .finish()
    }
}

/// Builder for [`Field`]. Every setter consumes and returns the builder.
#[derive(Default)]
pub struct FieldBuilder {
    key: String,
    field_type: Option<FieldType>,
    description: Option<String>,
    default: Option<Value>,
    generator: Option<Generator>,
    validator: Option<Validator>,
    enumeration: Option<Vec<Value>>,
    required: bool,
    sensitive: bool,
}

impl FieldBuilder {
    /// The field's key, unique within its field set.
    pub fn key(mut self, key: &str) -> Self {
        self.key = key.to_string();
        self
    }

    pub fn field_type(mut self, field_type: FieldType) -> Self {
        self.field_type = Some(field_type);
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// A static default. Its type must match [`field_type`](Self::field_type).
    pub fn default<V: Into<Value>>(mut self, value: V) -> Self {
        self.default = Some(value.into());
        self
    }

    /// A default computed once per registration. Mutually exclusive with
    /// [`default`](Self::default).
    pub fn default_generator<F, V>(mut self, generate: F) -> Self
    where
        F: Fn() -> Result<V, BoxError> + Send + Sync + 'static,
        V: Into<Value>,
    {
        self.generator = Some(Arc::new(move || generate().map(Into::into)));
        self
    }

    pub fn validator<F>(mut self, validate: F) -> Self
    where
        F: Fn(&Value) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(validate));
        self
    }

    /// Restrict the resolved value to a closed set.
    pub fn enumeration<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.enumeration = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Reject registration when no non-empty value is resolved.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Redact the value in help text, listings and error messages.
    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    /// Validate the declaration and produce an immutable [`Field`].
    pub fn try_build(self) -> Result<Field, DeclarationError> {
        if self.key.is_empty() {
            return Err(DeclarationError::EmptyFieldKey);
        }
        let key = self.key;
        let Some(field_type) = self.field_type else {
            return Err(DeclarationError::MissingType { key });
        };
        if self.default.is_some() && self.generator.is_some() {
            return Err(DeclarationError::DefaultConflict { key });
        }
        if let Some(default) = &self.default
            && default.field_type() != field_type
        {
            return Err(DeclarationError::DefaultTypeMismatch {
                key,
                expected: field_type,
                found: default.field_type(),
            });
        }
        if let Some(allowed) = &self.enumeration {
            if field_type.is_list() {
                return Err(DeclarationError::EnumerationOnList { key, field_type });
            }
            if let Some(bad) = allowed.iter().find(|v| v.field_type() != field_type) {
                return Err(DeclarationError::EnumerationTypeMismatch {
                    key,
                    expected: field_type,
                    found: bad.field_type(),
                });
            }
            if let Some(default) = &self.default
                && !allowed.contains(default)
            {
                let value = redact(self.sensitive, default);
                return Err(DeclarationError::DefaultNotInEnumeration { key, value });
            }
        }

        Ok(Field {
            key,
            field_type,
            description: self.description,
            default: self.default,
            generator: self.generator,
            validator: self.validator,
            enumeration: self.enumeration,
            required: self.required,
            sensitive: self.sensitive,
        })
    }

    /// Like [`try_build`](Self::try_build), but panics on a declaration error.
    pub fn build(self) -> Field {
        self.try_build()
            .unwrap_or_else(|e| panic!("layerfig: invalid field declaration: {e}"))
    }
}

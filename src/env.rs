//! Environment variable source.
//!
//! With prefix `MYAPP`, field `log.level` is read from `MYAPP__LOG__LEVEL`.
//! Double underscore `__` separates prefix, field set and field; single `_`
//! within a segment is literal. Names are upper case. Without a prefix the
//! name is just `LOG__LEVEL`.
//!
//! Every variable carrying the prefix with exactly two further segments is
//! reported, declared or not, so strict mode can flag typos such as
//! `MYAPP__LOG__LEVLE`. Without a prefix only declared names are read.

use std::collections::HashMap;

use crate::error::SourceError;
use crate::field_set::Schema;
use crate::source::{SourceOutput, ValueSource};
use crate::types::{FieldId, RawValue};

pub struct EnvSource {
    prefix: Option<String>,
    /// Synthetic variables; `None` reads the process environment at load time.
    vars: Option<Vec<(String, String)>>,
}

impl EnvSource {
    /// Read from the process environment.
    pub fn new() -> Self {
        Self {
            prefix: None,
            vars: None,
        }
    }

    /// Read from the given pairs instead of `std::env::vars()`.
    pub fn with_vars(vars: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            prefix: None,
            vars: Some(vars.into_iter().collect()),
        }
    }

    /// Set the key prefix (case-insensitive, e.g. `"ext_http_api"`).
    pub fn prefix(mut self, prefix: &str) -> Self {
        self.prefix = Some(prefix.to_uppercase());
        self
    }

    /// The variable name read for `id`.
    pub fn var_name(&self, id: &FieldId) -> String {
        let tail = format!("{}__{}", id.field_set, id.field).to_uppercase();
        match &self.prefix {
            Some(prefix) => format!("{prefix}__{tail}"),
            None => tail,
        }
    }

    fn undeclared_id(&self, name: &str) -> Option<FieldId> {
        let needle = format!("{}__", self.prefix.as_deref()?);
        let rest = name.strip_prefix(&needle)?;
        let (set, field) = rest.split_once("__")?;
        if set.is_empty() || field.is_empty() || field.contains("__") {
            return None;
        }
        Some(FieldId::new(set.to_lowercase(), field.to_lowercase()))
    }
}

impl Default for EnvSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueSource for EnvSource {
    fn name(&self) -> &str {
        "env"
    }

    fn load(&self, schema: &Schema<'_>) -> Result<SourceOutput, SourceError> {
        let declared: HashMap<String, FieldId> = schema
            .fields()
            .map(|(id, _)| (self.var_name(&id), id))
            .collect();

        let vars: Box<dyn Iterator<Item = (String, String)> + '_> = match &self.vars {
            Some(vars) => Box::new(vars.iter().cloned()),
            None => Box::new(std::env::vars()),
        };

        let mut output = SourceOutput::new();
        for (name, value) in vars {
            let id = match declared.get(&name) {
                Some(id) => id.clone(),
                None => match self.undeclared_id(&name) {
                    Some(id) => id,
                    None => continue,
                },
            };
            output.insert(id, RawValue::Text(value));
        }

        tracing::debug!(
            prefix = self.prefix.as_deref().unwrap_or(""),
            values = output.len(),
            "read environment variables"
        );
        Ok(output)
    }

    fn field_hint(&self, id: &FieldId) -> Option<String> {
        Some(self.var_name(id))
    }
}

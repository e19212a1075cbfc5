//! TOML file source.
//!
//! One table per field set, one key per field:
//!
//! ```toml
//! [log]
//! level = "warn"
//! color_enabled = false
//! ```
//!
//! Strings are reported as text, so durations and other parsed types are
//! written as strings (`timeout = "30s"`). Integers, floats, bools and arrays
//! keep their native shape. A missing file is silently treated as empty;
//! listing a file is a suggestion, not a requirement. Unreadable or
//! malformed files are source errors.

use std::path::{Path, PathBuf};

use crate::error::SourceError;
use crate::field_set::Schema;
use crate::source::{SourceOutput, ValueSource};
use crate::types::{FieldId, RawValue};

pub struct FileSource {
    name: String,
    path: Option<PathBuf>,
}

impl FileSource {
    /// Read an explicit file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            name: format!("file {}", path.display()),
            path: Some(path),
        }
    }

    /// Read `file_name` from the platform config directory for `app_name`
    /// (XDG on Linux, `~/Library/Application Support` on macOS).
    ///
    /// If no config directory can be determined the source reports nothing.
    pub fn platform(app_name: &str, file_name: &str) -> Self {
        match directories::ProjectDirs::from("", "", app_name) {
            Some(dirs) => Self::new(dirs.config_dir().join(file_name)),
            None => Self {
                name: format!("file {file_name}"),
                path: None,
            },
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl ValueSource for FileSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&self, _schema: &Schema<'_>) -> Result<SourceOutput, SourceError> {
        let Some(path) = &self.path else {
            return Ok(SourceOutput::new());
        };
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "config file not found, skipping");
                return Ok(SourceOutput::new());
            }
            Err(e) => {
                return Err(SourceError::Io {
                    path: path.clone(),
                    source: e,
                });
            }
        };
        parse_document(&content, &path.display().to_string())
    }

    fn field_hint(&self, id: &FieldId) -> Option<String> {
        Some(format!("[{}] {}", id.field_set, id.field))
    }
}

/// Parse a TOML document into source values. `origin` names the document in
/// error messages.
pub fn parse_document(content: &str, origin: &str) -> Result<SourceOutput, SourceError> {
    let parse_error = |reason: String| SourceError::Parse {
        origin: origin.to_string(),
        reason,
    };

    let table: toml::Table = toml::from_str(content).map_err(|e| parse_error(e.to_string()))?;

    let mut output = SourceOutput::new();
    for (set_key, item) in table {
        let toml::Value::Table(fields) = item else {
            return Err(parse_error(format!(
                "'{set_key}' must be a table of fields"
            )));
        };
        for (field_key, value) in fields {
            let raw = to_raw(value)
                .map_err(|reason| parse_error(format!("{set_key}.{field_key}: {reason}")))?;
            output.insert(FieldId::new(&set_key, field_key), raw);
        }
    }
    Ok(output)
}

fn to_raw(value: toml::Value) -> Result<RawValue, String> {
    match value {
        toml::Value::String(s) => Ok(RawValue::Text(s)),
        toml::Value::Integer(i) => Ok(RawValue::Int(i)),
        toml::Value::Float(x) => Ok(RawValue::Float(x)),
        toml::Value::Boolean(b) => Ok(RawValue::Bool(b)),
        toml::Value::Datetime(dt) => Ok(RawValue::Text(dt.to_string())),
        toml::Value::Array(items) => items
            .into_iter()
            .map(to_raw)
            .collect::<Result<Vec<_>, _>>()
            .map(RawValue::List),
        toml::Value::Table(_) => Err("nested tables are not supported".into()),
    }
}

//! Human-readable diagnostics: the help page and the resolved value listing.
//!
//! Both redact sensitive fields. The help page never shows a sensitive
//! default or enumeration; the listing never shows a sensitive value.

use std::fmt;

use crate::field::Field;
use crate::field_set::Schema;
use crate::source::ValueSource;
use crate::table::ResolvedTable;
use crate::types::FieldId;

/// Placeholder printed instead of a sensitive value.
pub const REDACTED: &str = "<redacted>";

/// Render `value`, or [`REDACTED`] when `sensitive`.
pub(crate) fn redact(sensitive: bool, value: &impl fmt::Display) -> String {
    if sensitive {
        REDACTED.to_string()
    } else {
        value.to_string()
    }
}

/// Placeholder printed for a default computed by a generator.
pub const GENERATED: &str = "<generated>";

/// Help page for a configuration root, rendered through `Display`.
pub struct HelpPage<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub schema: Schema<'a>,
    pub sources: &'a [Box<dyn ValueSource>],
}

impl HelpPage<'_> {
    fn write_field(&self, f: &mut fmt::Formatter<'_>, id: &FieldId, field: &Field) -> fmt::Result {
        write!(f, "  {}  {}", field.key(), field.field_type())?;
        let tags: Vec<&str> = [
            field.is_required().then_some("required"),
            field.is_sensitive().then_some("sensitive"),
        ]
        .into_iter()
        .flatten()
        .collect();
        if !tags.is_empty() {
            write!(f, "  ({})", tags.join(", "))?;
        }
        writeln!(f)?;

        if let Some(description) = field.description() {
            writeln!(f, "      {description}")?;
        }
        if let Some(default) = field.default_value() {
            writeln!(f, "      default: {}", field.display_value(default))?;
        } else if field.has_generator() {
            writeln!(f, "      default: {GENERATED}")?;
        }
        if let Some(allowed) = field.enumeration() {
            let allowed: Vec<String> = allowed.iter().map(|v| field.display_value(v)).collect();
            writeln!(f, "      allowed: {}", allowed.join(", "))?;
        }
        for source in self.sources {
            if let Some(hint) = source.field_hint(id) {
                writeln!(f, "      {}: {hint}", source.name())?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for HelpPage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.description.is_empty() {
            writeln!(f, "{}", self.name)?;
        } else {
            writeln!(f, "{} - {}", self.name, self.description)?;
        }

        for set in self.schema.field_sets() {
            writeln!(f)?;
            writeln!(f, "[{}]", set.key())?;
            for field in set.fields() {
                let id = FieldId::new(set.key(), field.key());
                self.write_field(f, &id, field)?;
            }
        }
        Ok(())
    }
}

/// Render `set.field = value (origin)` for every stored entry, in schema
/// order. Fields without a stored value are listed as unresolved.
pub fn list_values(schema: Schema<'_>, table: &ResolvedTable) -> String {
    let lines: Vec<String> = schema
        .fields()
        .map(|(id, field)| match table.get(&id) {
            Some(resolved) => format!(
                "{id} = {} ({})",
                field.display_value(&resolved.value),
                resolved.origin
            ),
            None => format!("{id} = <unresolved>"),
        })
        .collect();
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::EnvSource;
    use crate::field_set::FieldSet;
    use crate::fixtures::test::{app_field_set, log_field_set};
    use crate::table::Resolved;
    use crate::types::{Origin, Value};

    fn render(sets: &[FieldSet], sources: &[Box<dyn ValueSource>]) -> String {
        HelpPage {
            name: "demo",
            description: "A demo service",
            schema: Schema::new(sets),
            sources,
        }
        .to_string()
    }

    #[test]
    fn help_lists_sets_and_fields() {
        let sets = vec![app_field_set(), log_field_set()];
        let text = render(&sets, &[]);
        assert!(text.starts_with("demo - A demo service\n"));
        assert!(text.contains("[app]"));
        assert!(text.contains("[log]"));
        assert!(text.contains("  level  string"));
        assert!(text.contains("allowed: debug, info, warn, error"));
        assert!(text.contains("default: info"));
    }

    #[test]
    fn help_marks_generated_and_required() {
        let sets = vec![app_field_set()];
        let text = render(&sets, &[]);
        assert!(text.contains(&format!("default: {GENERATED}")));
        assert!(text.contains("session_secret  string  (required, sensitive)"));
    }

    #[test]
    fn help_redacts_sensitive_default() {
        let sets = vec![
            FieldSet::builder()
                .key("db")
                .field(
                    Field::builder()
                        .key("password")
                        .field_type(crate::types::FieldType::String)
                        .default("hunter2")
                        .sensitive()
                        .build(),
                )
                .build()
                .unwrap(),
        ];
        let text = render(&sets, &[]);
        assert!(!text.contains("hunter2"));
        assert!(text.contains(&format!("default: {REDACTED}")));
    }

    #[test]
    fn help_shows_source_hints() {
        let sets = vec![log_field_set()];
        let sources: Vec<Box<dyn ValueSource>> = vec![Box::new(EnvSource::new().prefix("demo"))];
        let text = render(&sets, &sources);
        assert!(text.contains("env: DEMO__LOG__LEVEL"));
    }

    #[test]
    fn listing_shows_origin_and_redacts() {
        let sets = vec![app_field_set()];
        let mut table = ResolvedTable::default();
        table.insert(
            FieldId::new("app", "id"),
            Resolved {
                value: Value::from("abc"),
                origin: Origin::Generated,
            },
        );
        table.insert(
            FieldId::new("app", "session_secret"),
            Resolved {
                value: Value::from("super-secret-value-1234"),
                origin: Origin::Source("env".into()),
            },
        );
        let text = list_values(Schema::new(&sets), &table);
        assert_eq!(
            text,
            format!("app.id = abc (generated)\napp.session_secret = {REDACTED} (env)")
        );
    }

    #[test]
    fn listing_marks_unresolved() {
        let sets = vec![log_field_set()];
        let text = list_values(Schema::new(&sets), &ResolvedTable::default());
        assert!(text.starts_with("log.level = <unresolved>"));
    }
}

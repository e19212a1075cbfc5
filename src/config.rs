//! The configuration root: declare field sets and sources, register once,
//! then read typed values from any thread.
//!
//! ```ignore
//! let mut config = AppConfig::new("ext-http-api", "HTTP API service");
//! config
//!     .add_field_sets([app_fields, log_fields])?
//!     .add_source(EnvSource::new().prefix("ext_http_api"))?
//!     .add_source(FlagSource::new())?;
//!
//! match config.register(true)? {
//!     Registration::Help(text) => { println!("{text}"); std::process::exit(0) }
//!     Registration::Resolved(report) if !report.is_ready() => { ... }
//!     Registration::Resolved(_) => {}
//! }
//! let level = config.get_string("log", "level")?;
//! ```

use std::time::Duration;

use parking_lot::RwLock;

use crate::error::{AccessError, ConfigError, RegistrationError};
use crate::field_set::{FieldSet, Schema};
use crate::help::{self, HelpPage};
use crate::report::RegistrationReport;
use crate::resolve::{self, Layer, ResolveInput};
use crate::source::ValueSource;
use crate::table::{Resolved, ResolvedTable};
use crate::types::{FieldId, FromValue, Origin, Value};

/// Result of [`AppConfig::register`].
#[derive(Debug, Clone, PartialEq)]
pub enum Registration {
    /// A source saw a help request. Nothing was resolved; the text is ready
    /// to print. Exiting is up to the caller.
    Help(String),
    /// Resolution ran. The report lists every error found (empty when ready).
    Resolved(RegistrationReport),
}

impl Registration {
    pub fn is_help(&self) -> bool {
        matches!(self, Registration::Help(_))
    }

    /// Errors from resolution; empty for [`Registration::Help`].
    pub fn errors(&self) -> &[RegistrationError] {
        match self {
            Registration::Help(_) => &[],
            Registration::Resolved(report) => report.errors(),
        }
    }
}

/// Root of a declared configuration.
///
/// Declaration methods take `&mut self` and fail once registration has
/// completed. After [`register`](Self::register) the root is immutable
/// except through [`set_override`](Self::set_override), and can be shared
/// behind an `Arc` for concurrent reads.
pub struct AppConfig {
    name: String,
    description: String,
    field_sets: Vec<FieldSet>,
    sources: Vec<Box<dyn ValueSource>>,
    strict: bool,
    registered: bool,
    table: RwLock<ResolvedTable>,
}

impl AppConfig {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            field_sets: Vec::new(),
            sources: Vec::new(),
            strict: false,
            registered: false,
            table: RwLock::new(ResolvedTable::default()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_registered(&self) -> bool {
        self.registered
    }

    pub fn schema(&self) -> Schema<'_> {
        Schema::new(&self.field_sets)
    }

    fn ensure_declaring(&self) -> Result<(), ConfigError> {
        if self.registered {
            return Err(ConfigError::AlreadyRegistered);
        }
        Ok(())
    }

    /// Append a source. Sources are polled in the order added; later
    /// sources take precedence.
    pub fn add_source<S: ValueSource + 'static>(
        &mut self,
        source: S,
    ) -> Result<&mut Self, ConfigError> {
        self.ensure_declaring()?;
        self.sources.push(Box::new(source));
        Ok(self)
    }

    /// Replace all sources.
    pub fn set_sources(
        &mut self,
        sources: Vec<Box<dyn ValueSource>>,
    ) -> Result<&mut Self, ConfigError> {
        self.ensure_declaring()?;
        self.sources = sources;
        Ok(self)
    }

    pub fn add_field_set(&mut self, set: FieldSet) -> Result<&mut Self, ConfigError> {
        self.ensure_declaring()?;
        if self.field_sets.iter().any(|s| s.key() == set.key()) {
            return Err(ConfigError::DuplicateFieldSet(set.key().to_string()));
        }
        self.field_sets.push(set);
        Ok(self)
    }

    /// Add several field sets. On a duplicate key nothing is added.
    pub fn add_field_sets(
        &mut self,
        sets: impl IntoIterator<Item = FieldSet>,
    ) -> Result<&mut Self, ConfigError> {
        self.ensure_declaring()?;
        let sets: Vec<FieldSet> = sets.into_iter().collect();
        for (i, set) in sets.iter().enumerate() {
            let mut seen = self.field_sets.iter().chain(&sets[..i]);
            if seen.any(|s| s.key() == set.key()) {
                return Err(ConfigError::DuplicateFieldSet(set.key().to_string()));
            }
        }
        self.field_sets.extend(sets);
        Ok(self)
    }

    /// Report keys that no declared field matches (default: off).
    pub fn strict(&mut self, strict: bool) -> Result<&mut Self, ConfigError> {
        self.ensure_declaring()?;
        self.strict = strict;
        Ok(self)
    }

    /// Poll every source once, resolve every field and freeze the result.
    ///
    /// When `handle_help` is set and a source reported a help request,
    /// returns [`Registration::Help`] without resolving; the root stays
    /// unregistered. Field errors never make this return `Err`: they are
    /// collected in the [`RegistrationReport`].
    pub fn register(&mut self, handle_help: bool) -> Result<Registration, ConfigError> {
        self.ensure_declaring()?;

        let schema = Schema::new(&self.field_sets);
        let mut layers = Vec::with_capacity(self.sources.len());
        let mut errors = Vec::new();
        let mut help_requested = false;

        for source in &self.sources {
            match source.load(&schema) {
                Ok(output) => {
                    tracing::debug!(
                        source = source.name(),
                        values = output.len(),
                        "polled value source"
                    );
                    help_requested |= output.help_requested;
                    layers.push(Layer {
                        source: source.name().to_string(),
                        output,
                    });
                }
                Err(e) => errors.push(RegistrationError::Source {
                    source_name: source.name().to_string(),
                    reason: e.to_string(),
                }),
            }
        }

        if handle_help && help_requested {
            for error in &errors {
                tracing::warn!("{error}");
            }
            tracing::debug!("help requested, skipping resolution");
            return Ok(Registration::Help(self.help_text()));
        }

        let resolution = resolve::resolve(ResolveInput {
            schema,
            layers,
            strict: self.strict,
        });
        errors.extend(resolution.errors);

        for error in &errors {
            tracing::warn!("{error}");
        }
        tracing::info!(
            app = %self.name,
            fields = resolution.table.len(),
            errors = errors.len(),
            "configuration registered"
        );

        *self.table.get_mut() = resolution.table;
        self.registered = true;
        Ok(Registration::Resolved(RegistrationReport::new(errors)))
    }

    /// Read a field as `T`. The declared type must be `T::FIELD_TYPE`.
    pub fn get<T: FromValue>(&self, field_set: &str, field: &str) -> Result<T, AccessError> {
        let id = FieldId::new(field_set, field);
        let table = self.table.read();
        let resolved = table.lookup(self.schema(), &id, Some(T::FIELD_TYPE))?;
        let declared = resolved.value.field_type();
        T::from_value(resolved.value.clone()).ok_or(AccessError::TypeMismatch {
            field: id,
            declared,
            requested: T::FIELD_TYPE,
        })
    }

    pub fn get_string(&self, field_set: &str, field: &str) -> Result<String, AccessError> {
        self.get(field_set, field)
    }

    pub fn get_bool(&self, field_set: &str, field: &str) -> Result<bool, AccessError> {
        self.get(field_set, field)
    }

    pub fn get_int(&self, field_set: &str, field: &str) -> Result<i64, AccessError> {
        self.get(field_set, field)
    }

    pub fn get_float(&self, field_set: &str, field: &str) -> Result<f64, AccessError> {
        self.get(field_set, field)
    }

    pub fn get_duration(&self, field_set: &str, field: &str) -> Result<Duration, AccessError> {
        self.get(field_set, field)
    }

    pub fn get_strings(&self, field_set: &str, field: &str) -> Result<Vec<String>, AccessError> {
        self.get(field_set, field)
    }

    pub fn get_bools(&self, field_set: &str, field: &str) -> Result<Vec<bool>, AccessError> {
        self.get(field_set, field)
    }

    pub fn get_ints(&self, field_set: &str, field: &str) -> Result<Vec<i64>, AccessError> {
        self.get(field_set, field)
    }

    pub fn get_floats(&self, field_set: &str, field: &str) -> Result<Vec<f64>, AccessError> {
        self.get(field_set, field)
    }

    pub fn get_durations(
        &self,
        field_set: &str,
        field: &str,
    ) -> Result<Vec<Duration>, AccessError> {
        self.get(field_set, field)
    }

    /// Read a field without a type check.
    pub fn get_value(&self, field_set: &str, field: &str) -> Result<Value, AccessError> {
        let id = FieldId::new(field_set, field);
        let table = self.table.read();
        Ok(table.lookup(self.schema(), &id, None)?.value.clone())
    }

    /// Where the stored value of a field came from.
    pub fn origin(&self, field_set: &str, field: &str) -> Result<Origin, AccessError> {
        let id = FieldId::new(field_set, field);
        let table = self.table.read();
        Ok(table.lookup(self.schema(), &id, None)?.origin.clone())
    }

    /// Replace a field's value after registration.
    ///
    /// The value must have the declared type and pass the field's
    /// `required`, enumeration and validator checks. Readers see either the
    /// old or the new value, never a partial write.
    pub fn set_override(
        &self,
        field_set: &str,
        field: &str,
        value: impl Into<Value>,
    ) -> Result<(), AccessError> {
        if !self.registered {
            return Err(AccessError::NotReady);
        }
        let id = FieldId::new(field_set, field);
        let value = value.into();
        let schema = self.schema();
        let Some(declared) = schema.field(&id) else {
            return Err(AccessError::NotRegistered { field: id });
        };

        if value.field_type() != declared.field_type() {
            return Err(AccessError::TypeMismatch {
                field: id,
                declared: declared.field_type(),
                requested: value.field_type(),
            });
        }
        let rejected = if declared.is_required() && value.is_empty() {
            Some("a value is required".to_string())
        } else if !declared.allows(&value) {
            Some(format!(
                "'{}' is not one of the allowed values",
                declared.display_value(&value)
            ))
        } else {
            declared.run_validator(&value).err()
        };
        if let Some(reason) = rejected {
            return Err(AccessError::Rejected { field: id, reason });
        }

        tracing::debug!(field = %id, "applied override");
        self.table.write().insert(
            id,
            Resolved {
                value,
                origin: Origin::Override,
            },
        );
        Ok(())
    }

    /// Help page listing every field, its constraints and where each source
    /// reads it from. Sensitive defaults are redacted.
    pub fn help_text(&self) -> String {
        HelpPage {
            name: &self.name,
            description: &self.description,
            schema: self.schema(),
            sources: &self.sources,
        }
        .to_string()
    }

    /// One `set.field = value (origin)` line per field, sensitive values
    /// redacted.
    pub fn list_values(&self) -> String {
        help::list_values(self.schema(), &self.table.read())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;
    use crate::error::SourceError;
    use crate::field::Field;
    use crate::fixtures::test::{SECRET, app_field_set, log_field_set, sample_config};
    use crate::help::REDACTED;
    use crate::source::{MapSource, SourceOutput};
    use crate::types::FieldType;

    fn with_secret() -> MapSource {
        MapSource::new("memory").set("app", "session_secret", SECRET)
    }

    fn registered(source: MapSource) -> (AppConfig, RegistrationReport) {
        let mut config = sample_config(source);
        match config.register(true).unwrap() {
            Registration::Resolved(report) => (config, report),
            Registration::Help(_) => panic!("Expected resolution, got help"),
        }
    }

    struct FailingSource;

    impl ValueSource for FailingSource {
        fn name(&self) -> &str {
            "broken"
        }

        fn load(&self, _schema: &Schema<'_>) -> Result<SourceOutput, SourceError> {
            Err(SourceError::Parse {
                origin: "broken".into(),
                reason: "unreadable".into(),
            })
        }
    }

    struct HelpSource;

    impl ValueSource for HelpSource {
        fn name(&self) -> &str {
            "help"
        }

        fn load(&self, _schema: &Schema<'_>) -> Result<SourceOutput, SourceError> {
            Ok(SourceOutput {
                help_requested: true,
                ..SourceOutput::default()
            })
        }
    }

    #[test]
    fn defaults_resolve_and_report_is_ready() {
        let (config, report) = registered(with_secret());
        assert!(report.is_ready(), "{report}");
        assert!(config.is_registered());
        assert_eq!(config.get_string("log", "level").unwrap(), "info");
        assert_eq!(config.get_string("log", "format").unwrap(), "json");
        assert!(config.get_bool("log", "color_enabled").unwrap());
        assert_eq!(config.get_string("app", "session_secret").unwrap(), SECRET);
        assert_eq!(config.origin("log", "level").unwrap(), Origin::Default);
        assert_eq!(
            config.origin("app", "session_secret").unwrap(),
            Origin::Source("memory".into())
        );
    }

    #[test]
    fn generated_id_is_a_uuid() {
        let (config, _) = registered(with_secret());
        let id = config.get_string("app", "id").unwrap();
        assert!(uuid::Uuid::parse_str(&id).is_ok());
        assert_eq!(config.origin("app", "id").unwrap(), Origin::Generated);
    }

    #[test]
    fn missing_secret_reported_and_zero_value_stored() {
        let (config, report) = registered(MapSource::new("memory"));
        assert_eq!(report.len(), 1);
        assert_eq!(
            report.errors()[0],
            RegistrationError::Required {
                field: FieldId::new("app", "session_secret"),
            }
        );
        assert_eq!(config.get_string("app", "session_secret").unwrap(), "");
        assert_eq!(config.get_string("log", "level").unwrap(), "info");
    }

    #[test]
    fn short_secret_rejected_by_validator() {
        let (_, report) = registered(MapSource::new("memory").set("app", "session_secret", "short"));
        assert_eq!(
            report.to_string(),
            "app.session_secret: expected string of minimum 20 characters (len=5)"
        );
    }

    #[test]
    fn later_source_wins() {
        let mut config = AppConfig::new("demo", "");
        config
            .add_field_set(log_field_set())
            .unwrap()
            .add_source(MapSource::new("first").set("log", "level", "debug"))
            .unwrap()
            .add_source(MapSource::new("second").set("log", "level", "error"))
            .unwrap();
        config.register(false).unwrap();
        assert_eq!(config.get_string("log", "level").unwrap(), "error");
        assert_eq!(
            config.origin("log", "level").unwrap(),
            Origin::Source("second".into())
        );
    }

    #[cfg(feature = "clap")]
    #[test]
    fn flag_overrides_env_and_default() {
        use crate::env::EnvSource;
        use crate::flag::FlagSource;

        let mut config = AppConfig::new("ext-http-api", "");
        config
            .add_field_sets([app_field_set(), log_field_set()])
            .unwrap()
            .add_source(
                EnvSource::with_vars([
                    ("EXT_HTTP_API__LOG__LEVEL".to_string(), "debug".to_string()),
                    (
                        "EXT_HTTP_API__APP__SESSION_SECRET".to_string(),
                        SECRET.to_string(),
                    ),
                ])
                .prefix("ext_http_api"),
            )
            .unwrap()
            .add_source(FlagSource::from_args(["ext-http-api", "--log-level", "warn"]))
            .unwrap();

        let registration = config.register(true).unwrap();
        assert!(registration.errors().is_empty());
        assert_eq!(config.get_string("log", "level").unwrap(), "warn");
        assert_eq!(
            config.origin("app", "session_secret").unwrap(),
            Origin::Source("env".into())
        );
    }

    #[test]
    fn second_register_fails() {
        let (mut config, _) = registered(with_secret());
        assert_eq!(config.register(true), Err(ConfigError::AlreadyRegistered));
    }

    #[test]
    fn declaration_after_register_fails() {
        let (mut config, _) = registered(with_secret());
        assert_eq!(
            config.add_source(MapSource::new("late")).err(),
            Some(ConfigError::AlreadyRegistered)
        );
        assert_eq!(
            config.strict(true).err(),
            Some(ConfigError::AlreadyRegistered)
        );
    }

    #[test]
    fn duplicate_field_set_rejected() {
        let mut config = AppConfig::new("demo", "");
        config.add_field_set(log_field_set()).unwrap();
        assert_eq!(
            config.add_field_set(log_field_set()).err(),
            Some(ConfigError::DuplicateFieldSet("log".into()))
        );
        assert_eq!(
            config
                .add_field_sets([app_field_set(), app_field_set()])
                .err(),
            Some(ConfigError::DuplicateFieldSet("app".into()))
        );
        assert_eq!(config.schema().field_sets().count(), 1);
    }

    #[test]
    fn accessor_errors() {
        let (config, _) = registered(with_secret());
        assert_eq!(
            config.get_string("log", "nope"),
            Err(AccessError::NotRegistered {
                field: FieldId::new("log", "nope"),
            })
        );
        assert_eq!(
            config.get_int("log", "level"),
            Err(AccessError::TypeMismatch {
                field: FieldId::new("log", "level"),
                declared: FieldType::String,
                requested: FieldType::Int,
            })
        );
    }

    #[test]
    fn reads_before_register_are_unresolved() {
        let config = sample_config(with_secret());
        assert!(matches!(
            config.get_string("log", "level"),
            Err(AccessError::Unresolved { .. })
        ));
    }

    #[test]
    fn source_failure_is_reported_and_others_still_apply() {
        let mut config = sample_config(with_secret());
        config.add_source(FailingSource).unwrap();
        let registration = config.register(true).unwrap();
        assert_eq!(
            registration.errors(),
            [RegistrationError::Source {
                source_name: "broken".into(),
                reason: "Failed to parse broken: unreadable".into(),
            }]
        );
        assert_eq!(config.get_string("app", "session_secret").unwrap(), SECRET);
    }

    #[test]
    fn help_short_circuits_validation() {
        // no secret: resolution would fail, help must win
        let mut config = sample_config(MapSource::new("memory"));
        config.add_source(HelpSource).unwrap();
        let registration = config.register(true).unwrap();
        let Registration::Help(text) = registration else {
            panic!("Expected help");
        };
        assert!(text.starts_with("demo - A demo service"));
        assert!(text.contains("session_secret"));
        assert!(!config.is_registered());
    }

    #[test]
    fn help_returned_even_when_a_source_fails() {
        let mut config = sample_config(with_secret());
        config.add_source(FailingSource).unwrap().add_source(HelpSource).unwrap();
        assert!(config.register(true).unwrap().is_help());
    }

    #[cfg(feature = "clap")]
    #[test]
    fn help_flag_with_bad_flag_still_returns_help() {
        use crate::flag::FlagSource;

        let mut config = sample_config(with_secret());
        config
            .add_source(FlagSource::from_args(["demo", "--nope", "--help"]))
            .unwrap();
        assert!(config.register(true).unwrap().is_help());
    }

    #[cfg(feature = "clap")]
    #[test]
    fn colliding_flags_reported_not_panicking() {
        use crate::flag::FlagSource;

        let field = |key: &str| Field::builder().key(key).field_type(FieldType::String).build();
        let mut config = AppConfig::new("demo", "");
        config
            .add_field_sets([
                FieldSet::builder().key("a_b").field(field("c")).build().unwrap(),
                FieldSet::builder().key("a").field(field("b_c")).build().unwrap(),
            ])
            .unwrap()
            .add_source(FlagSource::from_args(["demo"]))
            .unwrap();
        let registration = config.register(false).unwrap();
        assert!(matches!(
            registration.errors(),
            [RegistrationError::Source { source_name, .. }] if source_name == "flags"
        ));
        assert_eq!(config.get_string("a", "b_c").unwrap(), "");
    }

    #[cfg(feature = "clap")]
    #[test]
    fn negative_flag_value_reaches_int_field() {
        use crate::flag::FlagSource;

        let mut config = AppConfig::new("demo", "");
        config
            .add_field_set(
                FieldSet::builder()
                    .key("s")
                    .field(Field::builder().key("n").field_type(FieldType::Int).build())
                    .build()
                    .unwrap(),
            )
            .unwrap()
            .add_source(FlagSource::from_args(["demo", "--s-n", "-5"]))
            .unwrap();
        assert!(config.register(false).unwrap().errors().is_empty());
        assert_eq!(config.get_int("s", "n").unwrap(), -5);
    }

    fn typed_fields() -> FieldSet {
        let field = |key: &str, field_type: FieldType| {
            Field::builder().key(key).field_type(field_type).build()
        };
        FieldSet::builder()
            .key("t")
            .fields([
                field("name", FieldType::String),
                field("on", FieldType::Bool),
                field("count", FieldType::Int),
                field("ratio", FieldType::Float),
                field("timeout", FieldType::Duration),
                field("tags", FieldType::Strings),
                field("flags", FieldType::Bools),
                field("ports", FieldType::Ints),
                field("weights", FieldType::Floats),
                field("backoff", FieldType::Durations),
            ])
            .build()
            .unwrap()
    }

    #[test]
    fn every_typed_getter_reads_env_text() {
        use crate::env::EnvSource;

        let vars = [
            ("T__NAME", "api"),
            ("T__ON", "t"),
            ("T__COUNT", "-3"),
            ("T__RATIO", "-1.5"),
            ("T__TIMEOUT", "1m30s"),
            ("T__TAGS", "a, b"),
            ("T__FLAGS", "true,0"),
            ("T__PORTS", "80,443"),
            ("T__WEIGHTS", "0.5,2"),
            ("T__BACKOFF", "1s,2m"),
        ]
        .map(|(k, v)| (k.to_string(), v.to_string()));

        let mut config = AppConfig::new("demo", "");
        config
            .add_field_set(typed_fields())
            .unwrap()
            .add_source(EnvSource::with_vars(vars))
            .unwrap();
        let registration = config.register(false).unwrap();
        assert!(registration.errors().is_empty(), "{:?}", registration.errors());

        assert_eq!(config.get_string("t", "name").unwrap(), "api");
        assert!(config.get_bool("t", "on").unwrap());
        assert_eq!(config.get_int("t", "count").unwrap(), -3);
        assert_eq!(config.get_float("t", "ratio").unwrap(), -1.5);
        assert_eq!(
            config.get_duration("t", "timeout").unwrap(),
            Duration::from_secs(90)
        );
        assert_eq!(config.get_strings("t", "tags").unwrap(), ["a", "b"]);
        assert_eq!(config.get_bools("t", "flags").unwrap(), [true, false]);
        assert_eq!(config.get_ints("t", "ports").unwrap(), [80, 443]);
        assert_eq!(config.get_floats("t", "weights").unwrap(), [0.5, 2.0]);
        assert_eq!(
            config.get_durations("t", "backoff").unwrap(),
            [Duration::from_secs(1), Duration::from_secs(120)]
        );
        assert_eq!(
            config.get_value("t", "ports").unwrap(),
            Value::Ints(vec![80, 443])
        );
    }

    #[test]
    fn every_typed_getter_reads_defaults() {
        let mut config = AppConfig::new("demo", "");
        config
            .add_field_set(
                FieldSet::builder()
                    .key("d")
                    .fields([
                        Field::builder()
                            .key("ratio")
                            .field_type(FieldType::Float)
                            .default(0.25)
                            .build(),
                        Field::builder()
                            .key("timeout")
                            .field_type(FieldType::Duration)
                            .default(Duration::from_millis(1500))
                            .build(),
                        Field::builder()
                            .key("hosts")
                            .field_type(FieldType::Strings)
                            .default(vec!["a", "b"])
                            .build(),
                        Field::builder()
                            .key("ports")
                            .field_type(FieldType::Ints)
                            .default(vec![1i64, 2])
                            .build(),
                        Field::builder()
                            .key("backoff")
                            .field_type(FieldType::Durations)
                            .default(vec![Duration::from_secs(1)])
                            .build(),
                    ])
                    .build()
                    .unwrap(),
            )
            .unwrap();
        config.register(false).unwrap();

        assert_eq!(config.get_float("d", "ratio").unwrap(), 0.25);
        assert_eq!(
            config.get_duration("d", "timeout").unwrap(),
            Duration::from_millis(1500)
        );
        assert_eq!(config.get_strings("d", "hosts").unwrap(), ["a", "b"]);
        assert_eq!(config.get_ints("d", "ports").unwrap(), [1, 2]);
        assert_eq!(
            config.get_durations("d", "backoff").unwrap(),
            [Duration::from_secs(1)]
        );
        assert_eq!(config.origin("d", "ports").unwrap(), Origin::Default);
    }

    #[test]
    fn file_source_feeds_registration() {
        use crate::file::FileSource;

        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("demo.toml");
        std::fs::write(
            &path,
            format!("[app]\nsession_secret = \"{SECRET}\"\n[log]\nlevel = \"error\"\n"),
        )
        .unwrap();

        let mut config = AppConfig::new("demo", "");
        config
            .add_field_sets([app_field_set(), log_field_set()])
            .unwrap()
            .add_source(FileSource::new(&path))
            .unwrap()
            .add_source(MapSource::new("memory").set("log", "format", "console"))
            .unwrap();
        let registration = config.register(false).unwrap();
        assert!(registration.errors().is_empty(), "{:?}", registration.errors());

        assert_eq!(config.get_string("log", "level").unwrap(), "error");
        assert_eq!(config.get_string("log", "format").unwrap(), "console");
        assert_eq!(
            config.origin("log", "level").unwrap(),
            Origin::Source(format!("file {}", path.display()))
        );
    }

    #[test]
    fn generator_runs_once_across_repeated_reads() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut config = AppConfig::new("demo", "");
        config
            .add_field_set(
                FieldSet::builder()
                    .key("app")
                    .field(
                        Field::builder()
                            .key("id")
                            .field_type(FieldType::String)
                            .default_generator(move || {
                                let n = counter.fetch_add(1, Ordering::SeqCst);
                                Ok(format!("id-{n}"))
                            })
                            .build(),
                    )
                    .build()
                    .unwrap(),
            )
            .unwrap();
        config.register(false).unwrap();

        for _ in 0..5 {
            assert_eq!(config.get_string("app", "id").unwrap(), "id-0");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn help_ignored_when_not_handled() {
        let mut config = sample_config(with_secret());
        config.add_source(HelpSource).unwrap();
        let registration = config.register(false).unwrap();
        assert!(!registration.is_help());
        assert!(config.is_registered());
    }

    #[test]
    fn listing_redacts_secret() {
        let (config, _) = registered(with_secret());
        let listing = config.list_values();
        assert!(!listing.contains(SECRET));
        assert!(listing.contains(&format!("app.session_secret = {REDACTED} (memory)")));
        assert!(listing.contains("log.level = info (default)"));
    }

    #[test]
    fn strict_mode_reports_unknown_keys() {
        let mut config = sample_config(with_secret().set("log", "levle", "warn"));
        config.strict(true).unwrap();
        let registration = config.register(true).unwrap();
        assert_eq!(
            registration.errors(),
            [RegistrationError::UnknownKey {
                source_name: "memory".into(),
                field: FieldId::new("log", "levle"),
            }]
        );
    }

    #[test]
    fn override_requires_registration() {
        let config = sample_config(with_secret());
        assert_eq!(
            config.set_override("log", "level", "debug"),
            Err(AccessError::NotReady)
        );
    }

    #[test]
    fn override_is_checked_and_applied() {
        let (config, _) = registered(with_secret());

        config.set_override("log", "level", "debug").unwrap();
        assert_eq!(config.get_string("log", "level").unwrap(), "debug");
        assert_eq!(config.origin("log", "level").unwrap(), Origin::Override);

        assert!(matches!(
            config.set_override("log", "level", "verbose"),
            Err(AccessError::Rejected { .. })
        ));
        assert!(matches!(
            config.set_override("log", "level", 3),
            Err(AccessError::TypeMismatch { .. })
        ));
        assert!(matches!(
            config.set_override("log", "nope", "x"),
            Err(AccessError::NotRegistered { .. })
        ));
        assert!(matches!(
            config.set_override("app", "session_secret", ""),
            Err(AccessError::Rejected { .. })
        ));
        assert_eq!(
            config.set_override("app", "session_secret", "short"),
            Err(AccessError::Rejected {
                field: FieldId::new("app", "session_secret"),
                reason: "expected string of minimum 20 characters (len=5)".into(),
            })
        );
        // rejected overrides leave the stored value alone
        assert_eq!(config.get_string("log", "level").unwrap(), "debug");
    }

    #[test]
    fn concurrent_reads_during_overrides() {
        let (config, _) = registered(with_secret());
        let config = Arc::new(config);

        let readers: Vec<_> = (0..8)
            .map(|_| {
                let config = Arc::clone(&config);
                thread::spawn(move || {
                    for _ in 0..500 {
                        let level = config.get_string("log", "level").unwrap();
                        assert!(["info", "debug", "error"].contains(&level.as_str()));
                    }
                })
            })
            .collect();

        let writer = {
            let config = Arc::clone(&config);
            thread::spawn(move || {
                for i in 0..200 {
                    let level = if i % 2 == 0 { "debug" } else { "error" };
                    config.set_override("log", "level", level).unwrap();
                }
            })
        };

        for reader in readers {
            reader.join().unwrap();
        }
        writer.join().unwrap();
        assert_eq!(config.get_string("log", "level").unwrap(), "error");
    }

    #[test]
    fn app_config_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AppConfig>();
    }
}

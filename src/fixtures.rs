#[cfg(test)]
pub mod test {
    use crate::field::Field;
    use crate::field_set::FieldSet;
    use crate::source::MapSource;
    use crate::types::{FieldType, Value};
    use crate::AppConfig;

    /// A secret long enough to pass the `session_secret` validator.
    pub const SECRET: &str = "0123456789abcdefghij-secret";

    /// `app.id` (generated) and `app.session_secret` (required, sensitive,
    /// at least 20 characters).
    pub fn app_field_set() -> FieldSet {
        FieldSet::builder()
            .key("app")
            .field(
                Field::builder()
                    .key("id")
                    .field_type(FieldType::String)
                    .description("Application instance identifier")
                    .default_generator(|| Ok(uuid::Uuid::new_v4().to_string()))
                    .build(),
            )
            .field(
                Field::builder()
                    .key("session_secret")
                    .field_type(FieldType::String)
                    .description("Secret used to sign sessions")
                    .validator(min_length(20))
                    .required()
                    .sensitive()
                    .build(),
            )
            .build()
            .unwrap()
    }

    /// `log.level`, `log.format` and `log.color_enabled`, all with defaults.
    pub fn log_field_set() -> FieldSet {
        FieldSet::builder()
            .key("log")
            .field(
                Field::builder()
                    .key("level")
                    .field_type(FieldType::String)
                    .description("Logging level")
                    .default("info")
                    .enumeration(["debug", "info", "warn", "error"])
                    .build(),
            )
            .field(
                Field::builder()
                    .key("format")
                    .field_type(FieldType::String)
                    .description("Logging format")
                    .default("json")
                    .enumeration(["console", "json"])
                    .build(),
            )
            .field(
                Field::builder()
                    .key("color_enabled")
                    .field_type(FieldType::Bool)
                    .description("Colored console output")
                    .default(true)
                    .build(),
            )
            .build()
            .unwrap()
    }

    pub fn min_length(
        min: usize,
    ) -> impl Fn(&Value) -> Result<(), crate::BoxError> + Send + Sync + 'static {
        move |value: &Value| {
            let len = value.as_str().map_or(0, str::len);
            if len < min {
                return Err(format!("expected string of minimum {min} characters (len={len})").into());
            }
            Ok(())
        }
    }

    /// A root with both fixture sets and a single in-memory source.
    pub fn sample_config(source: MapSource) -> AppConfig {
        let mut config = AppConfig::new("demo", "A demo service");
        config
            .add_field_sets([app_field_set(), log_field_set()])
            .unwrap()
            .add_source(source)
            .unwrap();
        config
    }

    #[test]
    fn fixture_sets_build() {
        assert_eq!(app_field_set().len(), 2);
        assert_eq!(log_field_set().len(), 3);
    }

    #[test]
    fn min_length_message() {
        let check = min_length(20);
        assert!(check(&Value::from(SECRET)).is_ok());
        assert_eq!(
            check(&Value::from("short")).unwrap_err().to_string(),
            "expected string of minimum 20 characters (len=5)"
        );
    }
}

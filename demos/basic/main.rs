//! # layerfig demo application
//!
//! A small HTTP-API-shaped program that declares two field sets, reads them
//! from the environment and the command line, and prints the log level.
//!
//! ## Running
//!
//! ```sh
//! EXT_HTTP_API__APP__SESSION_SECRET=0123456789abcdefghij \
//!     cargo run --example basic -- --log-level warn
//! cargo run --example basic -- --help
//! ```
//!
//! Without a session secret registration fails and every error is printed.

use std::process;

use layerfig::{
    AppConfig, BoxError, EnvSource, Field, FieldSet, FieldType, FlagSource, Registration, Value,
};

fn app_fields() -> Result<FieldSet, layerfig::DeclarationError> {
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
                .validator(min_length)
                .required()
                .sensitive()
                .build(),
        )
        .build()
}

fn log_fields() -> Result<FieldSet, layerfig::DeclarationError> {
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
}

fn min_length(value: &Value) -> Result<(), BoxError> {
    let len = value.as_str().map_or(0, str::len);
    if len < 20 {
        return Err(format!("expected string of minimum 20 characters (len={len})").into());
    }
    Ok(())
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::new("ext-http-api", "Example HTTP API service");
    config
        .add_field_sets([app_fields()?, log_fields()?])?
        .add_source(EnvSource::new().prefix("ext_http_api"))?
        .add_source(FlagSource::new())?;

    match config.register(true)? {
        Registration::Help(text) => {
            println!("{text}");
            process::exit(0);
        }
        Registration::Resolved(report) if !report.is_ready() => {
            eprintln!("configuration errors:\n{report}");
            process::exit(2);
        }
        Registration::Resolved(_) => {}
    }

    println!("log-level: {}", config.get_string("log", "level")?);
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

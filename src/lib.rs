//! Declared, layered, typed configuration for Rust applications.
//!
//! Declare your settings as named field sets, list the sources that may
//! supply them, and register once at startup. Every field resolves to a
//! typed value, and every problem found along the way is reported together
//! instead of one at a time.
//!
//! ```ignore
//! let log = FieldSet::builder()
//!     .key("log")
//!     .field(
//!         Field::builder()
//!             .key("level")
//!             .field_type(FieldType::String)
//!             .default("info")
//!             .enumeration(["debug", "info", "warn", "error"])
//!             .build(),
//!     )
//!     .build()?;
//!
//! let mut config = AppConfig::new("myapp", "My application");
//! config
//!     .add_field_set(log)?
//!     .add_source(EnvSource::new().prefix("myapp"))?
//!     .add_source(FlagSource::new())?;
//!
//! let registration = config.register(true)?;
//! let level = config.get_string("log", "level")?;
//! ```
//!
//! # Declaring fields
//!
//! A [`Field`] has a key, a [`FieldType`] and optional attributes:
//!
//! - **default** or **default generator**: the seed value. A generator runs
//!   exactly once per registration, even when a source later overrides it.
//! - **required**: registration reports an error when no source supplies a
//!   non-empty value.
//! - **enumeration**: the resolved value must be one of a closed set.
//! - **validator**: a closure that may reject the resolved value with a
//!   message.
//! - **sensitive**: the value is redacted in help text, listings and error
//!   messages.
//!
//! Declaration mistakes (a default of the wrong type, a default outside the
//! enumeration) are programmer errors: [`FieldBuilder::build`] panics,
//! [`FieldBuilder::try_build`] returns a [`DeclarationError`].
//!
//! Fields are grouped into [`FieldSet`]s. The pair `(set key, field key)`
//! is a field's identity ([`FieldId`]), displayed as `set.field`.
//!
//! # Layer precedence
//!
//! ```text
//! Zero value            nothing supplied anything
//!        ↑ overridden by
//! Default / generator   declared on the field
//!        ↑ overridden by
//! Sources               in the order added, later sources win
//! ```
//!
//! Every source is sparse. It reports only the fields it has a value for;
//! everything else falls through to the layer below. The built-in sources
//! are [`EnvSource`], [`FlagSource`] (behind the `clap` feature, on by
//! default), [`FileSource`] (TOML) and [`MapSource`] (in memory). Implement
//! [`ValueSource`] for anything else.
//!
//! # Environment variables
//!
//! With prefix `MYAPP`, field `log.level` is read from `MYAPP__LOG__LEVEL`.
//! `__` separates prefix, set and field; single `_` is literal.
//!
//! # Command-line flags
//!
//! Field `log.color_enabled` becomes `--log-color-enabled`. Bool flags may
//! be given bare. `-h`/`--help` is reported to the root, which returns
//! [`Registration::Help`] when asked to handle help. The library never
//! exits the process.
//!
//! # Registration
//!
//! [`AppConfig::register`] polls every source once, resolves every field
//! and returns a [`RegistrationReport`] listing every error: coercion
//! failures, missing required values, enumeration and validator rejections,
//! failing sources, and with [`strict`](AppConfig::strict) mode, keys no
//! field declares. A field that fails validation keeps its value, so the
//! rest of the configuration stays readable.
//!
//! # Reading values
//!
//! Typed accessors (`get_string`, `get_int`, `get_duration`, ...) check the
//! declared type and distinguish an undeclared field
//! ([`AccessError::NotRegistered`]) from a wrong type
//! ([`AccessError::TypeMismatch`]) and a field with no stored value
//! ([`AccessError::Unresolved`]). After registration the root is
//! `Send + Sync`; reads take a shared lock and
//! [`set_override`](AppConfig::set_override) takes the exclusive one.
//!
//! # Error handling
//!
//! Errors are user-facing and grouped by phase. See the [`error`] module.

pub mod error;
pub mod types;

mod coerce;
mod config;
mod env;
mod field;
mod field_set;
mod file;
#[cfg(feature = "clap")]
mod flag;
mod help;
mod report;
mod resolve;
mod source;
mod table;

#[cfg(test)]
mod fixtures;

pub use coerce::{format_duration, parse_duration};
pub use config::{AppConfig, Registration};
pub use env::EnvSource;
pub use error::{AccessError, ConfigError, DeclarationError, RegistrationError, SourceError};
pub use field::{BoxError, Field, FieldBuilder};
pub use field_set::{FieldSet, FieldSetBuilder, Schema};
pub use file::{FileSource, parse_document};
#[cfg(feature = "clap")]
pub use flag::FlagSource;
pub use help::{GENERATED, REDACTED};
pub use report::{ErrorRecord, RegistrationReport};
pub use source::{MapSource, SourceOutput, ValueSource};
pub use types::{FieldId, FieldType, FromValue, Origin, RawValue, Value};

//! Command-line flag source, built on [clap](https://docs.rs/clap).
//!
//! Compiled only with the `clap` Cargo feature (on by default). The flag set
//! is derived from the schema at load time: field `log.color_enabled`
//! becomes `--log-color-enabled`. Bool flags may be given bare
//! (`--log-color-enabled` means `true`) or with a value. Repeating a flag
//! keeps the last occurrence.
//!
//! clap's built-in help is replaced by a plain `-h/--help` switch that is
//! reported as [`SourceOutput::help_requested`], so the registration
//! controller decides what help looks like and whether the process exits.

use std::collections::HashMap;
use std::ffi::OsString;

use clap::{Arg, ArgAction, Command};

use crate::error::SourceError;
use crate::field_set::Schema;
use crate::source::{SourceOutput, ValueSource};
use crate::types::{FieldId, FieldType, RawValue};

const HELP_ARG: &str = "help";

pub struct FlagSource {
    /// Explicit argv (program name first); `None` reads `std::env::args_os()`.
    args: Option<Vec<OsString>>,
}

impl FlagSource {
    /// Parse the process arguments.
    pub fn new() -> Self {
        Self { args: None }
    }

    /// Parse the given argv instead. The first item is the program name.
    pub fn from_args<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Self {
            args: Some(args.into_iter().map(Into::into).collect()),
        }
    }

    /// The long flag (without dashes) for `id`.
    pub fn flag_name(id: &FieldId) -> String {
        format!("{}-{}", id.field_set, id.field).replace('_', "-")
    }

    fn command(schema: &Schema<'_>) -> Result<Command, SourceError> {
        let mut command = Command::new("layerfig")
            .disable_help_flag(true)
            .disable_version_flag(true)
            .args_override_self(true)
            .arg(
                Arg::new(HELP_ARG)
                    .short('h')
                    .long("help")
                    .action(ArgAction::SetTrue),
            );

        let mut claimed: HashMap<String, FieldId> = HashMap::new();
        for (id, field) in schema.fields() {
            let long = Self::flag_name(&id);
            if let Some(other) = claimed.get(&long) {
                return Err(parse_error(format!(
                    "flag --{long} is claimed by both {other} and {id}"
                )));
            }

            let mut arg = Arg::new(id.to_string())
                .long(long.clone())
                .action(ArgAction::Set)
                .value_name(field.field_type().to_string().to_uppercase());
            if let Some(description) = field.description() {
                arg = arg.help(description.to_string());
            }
            if field.field_type() == FieldType::Bool {
                arg = arg.num_args(0..=1).default_missing_value("true");
            } else {
                arg = arg.allow_hyphen_values(true);
            }
            command = command.arg(arg);
            claimed.insert(long, id);
        }
        Ok(command)
    }
}

fn parse_error(reason: String) -> SourceError {
    SourceError::Parse {
        origin: "command-line flags".into(),
        reason,
    }
}

/// Whether `-h` or `--help` appears before a `--` terminator.
fn wants_help(args: &[OsString]) -> bool {
    args.iter()
        .skip(1)
        .take_while(|arg| *arg != "--")
        .any(|arg| arg == "-h" || arg == "--help")
}

impl Default for FlagSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueSource for FlagSource {
    fn name(&self) -> &str {
        "flags"
    }

    fn load(&self, schema: &Schema<'_>) -> Result<SourceOutput, SourceError> {
        let args = match &self.args {
            Some(args) => args.clone(),
            None => std::env::args_os().collect(),
        };

        let matches = match Self::command(schema)?.try_get_matches_from(&args) {
            Ok(matches) => matches,
            // help wins over a malformed command line
            Err(_) if wants_help(&args) => {
                tracing::debug!("help requested alongside invalid flags");
                return Ok(SourceOutput {
                    help_requested: true,
                    ..SourceOutput::default()
                });
            }
            Err(e) => return Err(parse_error(e.to_string().trim().to_string())),
        };

        let mut output = SourceOutput::new();
        output.help_requested = matches.get_flag(HELP_ARG);
        for (id, _) in schema.fields() {
            if let Some(value) = matches.get_one::<String>(&id.to_string()) {
                output.insert(id, RawValue::Text(value.clone()));
            }
        }

        tracing::debug!(
            values = output.len(),
            help = output.help_requested,
            "parsed command-line flags"
        );
        Ok(output)
    }

    fn field_hint(&self, id: &FieldId) -> Option<String> {
        Some(format!("--{}", Self::flag_name(id)))
    }
}

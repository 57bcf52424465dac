//! Command-line arguments.

use clap::{Parser, Subcommand, ValueEnum};
use url::Url;

use crate::domain::{EntityId, FormFields, ResourceKind};

/// `rental-console` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "rental-console",
    about = "List and edit rental properties, rooms and transactions",
    version
)]
pub struct CliArgs {
    /// Backend base URL. Falls back to `RENTAL_CONSOLE_BASE_URL`.
    #[arg(long = "base-url", value_name = "url", global = true)]
    pub base_url: Option<Url>,
    /// What to do.
    #[command(subcommand)]
    pub command: Command,
}

/// Console subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print a collection as a table.
    List {
        /// Resource kind.
        kind: KindArg,
    },
    /// Create an entity from `--field` values.
    Create {
        /// Resource kind.
        kind: KindArg,
        /// Field value as `name=value`; repeat per field.
        #[arg(long = "field", short = 'f', value_name = "name=value", value_parser = parse_field)]
        fields: Vec<(String, String)>,
    },
    /// Update an entity; unspecified fields keep their current values.
    Update {
        /// Resource kind.
        kind: KindArg,
        /// Identifier of the entity to update.
        id: EntityId,
        /// Field value as `name=value`; repeat per field.
        #[arg(long = "field", short = 'f', value_name = "name=value", value_parser = parse_field)]
        fields: Vec<(String, String)>,
    },
    /// Delete an entity.
    Delete {
        /// Resource kind.
        kind: KindArg,
        /// Identifier of the entity to delete.
        id: EntityId,
    },
    /// Describe the form fields of a kind.
    Schema {
        /// Resource kind.
        kind: KindArg,
    },
}

/// Resource kind as spelled on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    /// Rental properties.
    Property,
    /// Rooms.
    Room,
    /// Income and expense transactions.
    Transaction,
}

impl From<KindArg> for ResourceKind {
    fn from(value: KindArg) -> Self {
        match value {
            KindArg::Property => Self::Property,
            KindArg::Room => Self::Room,
            KindArg::Transaction => Self::Transaction,
        }
    }
}

/// Collect `--field` pairs into form input.
pub(super) fn form_fields(pairs: Vec<(String, String)>) -> FormFields {
    pairs.into_iter().collect()
}

fn parse_field(raw: &str) -> Result<(String, String), String> {
    let (raw_name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got `{raw}`"))?;
    let name = raw_name.trim();
    if name.is_empty() {
        return Err("field name must not be empty".to_owned());
    }
    Ok((name.to_owned(), value.to_owned()))
}

//! `rental-console` command-line front end.
//!
//! Parses arguments with `clap`, resolves settings with `ortho_config`, drives
//! a [`Console`](crate::domain::Console) and renders results as plain-text
//! tables. Adapter wiring lives in the binary.

mod args;
mod commands;
mod config;
mod render;

pub use args::{CliArgs, Command, KindArg};
pub use commands::{describe_schema, execute};
pub use config::ConsoleSettings;

//! Inbound adapters driving the domain.
//!
//! - **cli**: the `rental-console` command-line front end.

pub mod cli;

//! Command execution against a [`Console`].

use std::io::{self, Write};

use color_eyre::eyre::{Report, Result, eyre};
use tracing::debug;

use super::args::{Command, form_fields};
use super::render;
use crate::domain::{Console, ResourceKind, SyncError};

/// Describe the form fields of `kind` without touching the backend.
///
/// # Errors
///
/// Returns an I/O error writing the output.
pub fn describe_schema(kind: ResourceKind, out: &mut impl Write) -> io::Result<()> {
    render::schema(out, kind)
}

/// Run one command through `console`, writing its output to `out`.
///
/// # Errors
///
/// Returns the synchronization failure, rendered with its category, or an
/// I/O error writing the output.
pub async fn execute(console: &Console, command: Command, out: &mut impl Write) -> Result<()> {
    debug!(?command, "executing console command");
    match command {
        Command::List { kind: arg } => {
            let kind = ResourceKind::from(arg);
            let rows = console.refresh(kind).await.map_err(|error| report(&error))?;
            render::collection(out, kind, rows.entities())?;
        }
        Command::Create { kind: arg, fields } => {
            let kind = ResourceKind::from(arg);
            if !console.open_create(kind) {
                debug!(%kind, "submitting into the form that was already open");
            }
            let outcome = console
                .submit(kind, &form_fields(fields))
                .await
                .map_err(|error| report(&error))?;
            render::outcome(out, kind, &outcome)?;
        }
        Command::Update {
            kind: arg,
            id,
            fields,
        } => {
            let kind = ResourceKind::from(arg);
            console.open_edit_by_id(kind, id).await.map_err(|error| report(&error))?;
            let form = console.form_defaults(kind).merged(form_fields(fields));
            let outcome = console.submit(kind, &form).await.map_err(|error| report(&error))?;
            render::outcome(out, kind, &outcome)?;
        }
        Command::Delete { kind: arg, id } => {
            let kind = ResourceKind::from(arg);
            let outcome = console.remove(kind, id).await.map_err(|error| report(&error))?;
            render::outcome(out, kind, &outcome)?;
        }
        Command::Schema { kind } => render::schema(out, kind.into())?,
    }
    Ok(())
}

fn report(error: &SyncError) -> Report {
    eyre!(render::error_line(error))
}

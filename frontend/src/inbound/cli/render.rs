//! Plain-text rendering of collections, schemas and outcomes.

use std::io::{self, Write};

use crate::domain::{
    AnyEntity, EntitySchema, ErrorCategory, FieldType, MutationOutcome, ResourceKind, SyncError,
};

const COLUMN_GAP: &str = "  ";

/// Write `rows` as an aligned table with the schema labels as headers.
pub(super) fn collection(
    out: &mut impl Write,
    kind: ResourceKind,
    rows: &[AnyEntity],
) -> io::Result<()> {
    let schema = kind.schema();
    writeln!(out, "{}", kind.title())?;

    let header = std::iter::once("ID".to_owned())
        .chain(schema.fields().iter().map(|field| field.label().to_owned()))
        .collect::<Vec<_>>();
    let body = rows
        .iter()
        .map(|entity| row(schema, entity))
        .collect::<Vec<_>>();

    let widths = header
        .iter()
        .enumerate()
        .map(|(column, title)| {
            body.iter()
                .map(|cells| cells.get(column).map_or(0, |cell| cell.chars().count()))
                .chain(std::iter::once(title.chars().count()))
                .max()
                .unwrap_or_default()
        })
        .collect::<Vec<_>>();

    for cells in std::iter::once(&header).chain(body.iter()) {
        let line = cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join(COLUMN_GAP);
        writeln!(out, "{}", line.trim_end())?;
    }
    if rows.is_empty() {
        writeln!(out, "(no {kind} records)")?;
    }
    Ok(())
}

fn row(schema: &EntitySchema, entity: &AnyEntity) -> Vec<String> {
    let fields = entity.to_fields();
    std::iter::once(entity.id().to_string())
        .chain(
            schema
                .fields()
                .iter()
                .map(|field| fields.get(field.name()).unwrap_or_default().to_owned()),
        )
        .collect()
}

/// Describe the form fields of `kind`.
pub(super) fn schema(out: &mut impl Write, kind: ResourceKind) -> io::Result<()> {
    writeln!(out, "{} fields", kind.title())?;
    for field in kind.schema().fields() {
        let requirement = if field.is_required() {
            "required"
        } else {
            "optional"
        };
        writeln!(
            out,
            "  {name:<12} {label:<14} {kind:<28} {requirement}",
            name = field.name(),
            label = field.label(),
            kind = describe(field.field_type()),
        )?;
    }
    Ok(())
}

fn describe(field_type: FieldType) -> String {
    match field_type {
        FieldType::Text => "text".to_owned(),
        FieldType::Date => "date (YYYY-MM-DD)".to_owned(),
        FieldType::Decimal => "decimal".to_owned(),
        FieldType::Choice(options) => format!("one of: {}", options.join(", ")),
    }
}

/// Report a confirmed write.
pub(super) fn outcome(
    out: &mut impl Write,
    kind: ResourceKind,
    outcome: &MutationOutcome<AnyEntity>,
) -> io::Result<()> {
    match outcome {
        MutationOutcome::Created(entity) => writeln!(out, "created {kind} {}", entity.id()),
        MutationOutcome::Updated(entity) => writeln!(out, "updated {kind} {}", entity.id()),
        MutationOutcome::Deleted(id) => writeln!(out, "deleted {kind} {id}"),
    }
}

/// One-line summary of a failure, prefixed with its recovery category.
pub(super) fn error_line(error: &SyncError) -> String {
    let category = match error.category() {
        ErrorCategory::Validation => "validation",
        ErrorCategory::Network => "network",
        ErrorCategory::Server => "server",
        ErrorCategory::NotFound => "not found",
    };
    format!("{category} error: {error}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fixtures::{entity_id, property};

    #[test]
    fn collection_pads_every_column_to_its_widest_cell() {
        let rows = [
            AnyEntity::from(property(1, "Oak")),
            AnyEntity::from(property(12, "Birchwood Terrace")),
        ];
        let mut out = Vec::new();
        collection(&mut out, ResourceKind::Property, &rows).expect("writes to memory");
        let text = String::from_utf8(out).expect("utf-8 output");
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.first().copied(), Some("Property Management"));
        let name_column = |line: &str| line.find("Oak").or_else(|| line.find("Birchwood"));
        assert_eq!(
            lines.get(2).copied().and_then(name_column),
            lines.get(3).copied().and_then(name_column)
        );
        assert_eq!(
            lines.get(1).and_then(|header| header.find("Property Name")),
            lines.get(2).copied().and_then(name_column)
        );
    }

    #[test]
    fn empty_collections_say_so() {
        let mut out = Vec::new();
        collection(&mut out, ResourceKind::Room, &[]).expect("writes to memory");
        let text = String::from_utf8(out).expect("utf-8 output");
        assert!(text.ends_with("(no room records)\n"));
    }

    #[test]
    fn schema_lists_every_field() {
        let mut out = Vec::new();
        schema(&mut out, ResourceKind::Room).expect("writes to memory");
        let text = String::from_utf8(out).expect("utf-8 output");

        assert!(text.starts_with("Room Management fields"));
        assert!(text.contains("one of: vacant, occupied"));
        assert_eq!(text.matches("optional").count(), 1, "only tenant is optional");
    }

    #[test]
    fn outcomes_name_the_entity() {
        let mut out = Vec::new();
        outcome(
            &mut out,
            ResourceKind::Property,
            &MutationOutcome::Created(property(2, "Elm").into()),
        )
        .expect("writes to memory");
        outcome(
            &mut out,
            ResourceKind::Property,
            &MutationOutcome::Deleted(entity_id(1)),
        )
        .expect("writes to memory");

        assert_eq!(
            String::from_utf8(out).expect("utf-8 output"),
            "created property 2\ndeleted property 1\n"
        );
    }

    #[test]
    fn error_lines_carry_the_category() {
        assert_eq!(
            error_line(&SyncError::NoActiveSession),
            "validation error: no edit session is open"
        );
    }
}

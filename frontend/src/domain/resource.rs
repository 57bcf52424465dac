//! Resource-kind descriptors shared by every screen.
//!
//! A [`Resource`] ties together an entity type, its id-less draft, the
//! [`EntitySchema`] that validates form input, and the REST base path. The
//! cache, mutation coordinator and edit session are generic over it, so the
//! three management screens are one implementation instantiated three times.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::property::Property;
use super::room::Room;
use super::schema::{EntitySchema, FormFields, ValidatedFields, ValidationError};
use super::transaction::Transaction;

/// One of the three resource kinds managed by the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    /// Rental properties.
    Property,
    /// Rooms within properties.
    Room,
    /// Income and expense transactions.
    Transaction,
}

impl ResourceKind {
    /// Every resource kind, in dashboard order.
    pub const ALL: [Self; 3] = [Self::Property, Self::Room, Self::Transaction];

    /// REST collection path for this kind.
    ///
    /// # Examples
    /// ```
    /// use frontend::domain::ResourceKind;
    ///
    /// assert_eq!(ResourceKind::Room.base_path(), "/api/rooms");
    /// ```
    #[must_use]
    pub const fn base_path(self) -> &'static str {
        match self {
            Self::Property => "/api/properties",
            Self::Room => "/api/rooms",
            Self::Transaction => "/api/transactions",
        }
    }

    /// Singular, lower-case name used in logs and CLI output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Property => "property",
            Self::Room => "room",
            Self::Transaction => "transaction",
        }
    }

    /// Screen title shown above the collection table.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Property => "Property Management",
            Self::Room => "Room Management",
            Self::Transaction => "Financial Management",
        }
    }

    /// Schema governing form submissions for this kind.
    #[must_use]
    pub fn schema(self) -> &'static EntitySchema {
        match self {
            Self::Property => super::property::Properties::schema(),
            Self::Room => super::room::Rooms::schema(),
            Self::Transaction => super::transaction::Transactions::schema(),
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Server-assigned entity identifier.
///
/// The client never invents identifiers: values come from decoded server
/// responses or from [`EntityId::from_str`] when a user names an existing
/// row (for example on the command line).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(i64);

impl EntityId {
    /// Access the raw integer.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntityId {
    type Err = std::num::ParseIntError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        value.trim().parse().map(Self)
    }
}

/// Kind-erased entity used by the kind-dispatched console surface.
#[derive(Debug, Clone, PartialEq)]
pub enum AnyEntity {
    /// A property row.
    Property(Property),
    /// A room row.
    Room(Room),
    /// A transaction row.
    Transaction(Transaction),
}

impl AnyEntity {
    /// Resource kind of the wrapped entity.
    #[must_use]
    pub const fn kind(&self) -> ResourceKind {
        match self {
            Self::Property(_) => ResourceKind::Property,
            Self::Room(_) => ResourceKind::Room,
            Self::Transaction(_) => ResourceKind::Transaction,
        }
    }

    /// Identifier of the wrapped entity.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        match self {
            Self::Property(property) => property.id(),
            Self::Room(room) => room.id(),
            Self::Transaction(transaction) => transaction.id(),
        }
    }

    /// Form values of the wrapped entity, keyed by schema field name.
    #[must_use]
    pub fn to_fields(&self) -> FormFields {
        match self {
            Self::Property(property) => super::property::Properties::to_fields(property),
            Self::Room(room) => super::room::Rooms::to_fields(room),
            Self::Transaction(transaction) => {
                super::transaction::Transactions::to_fields(transaction)
            }
        }
    }
}

/// Descriptor binding one resource kind to its types and schema.
pub trait Resource: Send + Sync + 'static {
    /// Canonical server representation, `id` included.
    type Entity: Clone
        + fmt::Debug
        + PartialEq
        + Serialize
        + DeserializeOwned
        + Into<AnyEntity>
        + TryFrom<AnyEntity, Error = AnyEntity>
        + Send
        + Sync
        + 'static;

    /// Creation payload: the entity without its `id`.
    type Draft: Clone + fmt::Debug + PartialEq + Serialize + Send + Sync + 'static;

    /// Which kind this descriptor describes.
    const KIND: ResourceKind;

    /// Field declarations used to validate form input.
    fn schema() -> &'static EntitySchema;

    /// Identifier of a server-returned entity.
    fn id(entity: &Self::Entity) -> EntityId;

    /// Build a typed draft from schema-validated form values.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when a value the schema accepted still
    /// cannot be represented (the schema and the draft disagree).
    fn draft_from_fields(fields: &ValidatedFields) -> Result<Self::Draft, ValidationError>;

    /// Attach a server-assigned id to a draft for a full-replacement update.
    fn with_id(id: EntityId, draft: Self::Draft) -> Self::Entity;

    /// Render an entity back into form values (edit modal defaults).
    fn to_fields(entity: &Self::Entity) -> FormFields;

    /// Validate raw form values and build a draft in one step.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when a required field is missing or a
    /// value is malformed.
    fn validate(fields: &FormFields) -> Result<Self::Draft, ValidationError> {
        let validated = Self::schema().validate(fields)?;
        Self::draft_from_fields(&validated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ResourceKind::Property, "/api/properties")]
    #[case(ResourceKind::Room, "/api/rooms")]
    #[case(ResourceKind::Transaction, "/api/transactions")]
    fn base_paths_match_backend_routes(#[case] kind: ResourceKind, #[case] path: &str) {
        assert_eq!(kind.base_path(), path);
        assert_eq!(kind.schema().kind(), kind);
    }

    #[rstest]
    #[case(" 42 ", Some(42))]
    #[case("7", Some(7))]
    #[case("seven", None)]
    #[case("", None)]
    fn entity_ids_parse_from_user_input(#[case] raw: &str, #[case] expected: Option<i64>) {
        let parsed = raw.parse::<EntityId>().ok().map(EntityId::get);
        assert_eq!(parsed, expected);
    }

    #[test]
    fn entity_ids_are_transparent_on_the_wire() {
        let id: EntityId = serde_json::from_str("12").expect("integer id decodes");
        assert_eq!(id.get(), 12);
        assert_eq!(serde_json::to_string(&id).expect("id encodes"), "12");
    }
}

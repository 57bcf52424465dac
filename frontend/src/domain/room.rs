//! Room resource: a lettable unit within a property.
//!
//! `tenant` is only meaningful while a room is occupied, but a vacant room
//! carrying a tenant name is accepted as-is and never cleared by the client.

use serde::{Deserialize, Deserializer, Serialize};

use super::resource::{AnyEntity, EntityId, Resource, ResourceKind};
use super::schema::{
    EntitySchema, FieldSpec, FieldType, FormFields, ValidatedFields, ValidationError,
};

const ROOM_STATUSES: &[&str] = &["vacant", "occupied"];

static ROOM_FIELDS: [FieldSpec; 5] = [
    FieldSpec::required("number", "Room Number", FieldType::Text),
    FieldSpec::required("type", "Room Type", FieldType::Text),
    FieldSpec::required("status", "Status", FieldType::Choice(ROOM_STATUSES)),
    FieldSpec::optional("tenant", "Tenant Name", FieldType::Text),
    FieldSpec::required("property", "Property", FieldType::Text),
];

static ROOM_SCHEMA: EntitySchema = EntitySchema::new(ResourceKind::Room, &ROOM_FIELDS);

/// Occupancy of a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    /// Nobody lives here.
    Vacant,
    /// Let to a tenant.
    Occupied,
}

impl RoomStatus {
    /// Wire spelling of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Vacant => "vacant",
            Self::Occupied => "occupied",
        }
    }

    fn from_choice(choice: &str) -> Result<Self, ValidationError> {
        match choice {
            "vacant" => Ok(Self::Vacant),
            "occupied" => Ok(Self::Occupied),
            _ => Err(ValidationError::SchemaMismatch { field: "status" }),
        }
    }
}

/// A room as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    id: EntityId,
    /// Room number as printed on the door.
    pub number: String,
    /// Free-form room type, e.g. "double".
    #[serde(rename = "type")]
    pub room_type: String,
    /// Occupancy.
    pub status: RoomStatus,
    /// Tenant name, if any.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub tenant: Option<String>,
    /// Name of the property the room belongs to.
    pub property: String,
}

impl Room {
    /// Server-assigned identifier.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }
}

/// Creation payload for a [`Room`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomDraft {
    /// Room number.
    pub number: String,
    /// Free-form room type.
    #[serde(rename = "type")]
    pub room_type: String,
    /// Occupancy.
    pub status: RoomStatus,
    /// Tenant name, if any.
    pub tenant: Option<String>,
    /// Owning property's name.
    pub property: String,
}

/// Descriptor for the room resource kind.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rooms;

impl Resource for Rooms {
    type Entity = Room;
    type Draft = RoomDraft;

    const KIND: ResourceKind = ResourceKind::Room;

    fn schema() -> &'static EntitySchema {
        &ROOM_SCHEMA
    }

    fn id(entity: &Room) -> EntityId {
        entity.id()
    }

    fn draft_from_fields(fields: &ValidatedFields) -> Result<RoomDraft, ValidationError> {
        Ok(RoomDraft {
            number: fields.text("number")?,
            room_type: fields.text("type")?,
            status: RoomStatus::from_choice(fields.choice("status")?)?,
            tenant: fields.optional_text("tenant")?,
            property: fields.text("property")?,
        })
    }

    fn with_id(id: EntityId, draft: RoomDraft) -> Room {
        Room {
            id,
            number: draft.number,
            room_type: draft.room_type,
            status: draft.status,
            tenant: draft.tenant,
            property: draft.property,
        }
    }

    fn to_fields(entity: &Room) -> FormFields {
        FormFields::new()
            .with("number", entity.number.as_str())
            .with("type", entity.room_type.as_str())
            .with("status", entity.status.as_str())
            .with("tenant", entity.tenant.as_deref().unwrap_or_default())
            .with("property", entity.property.as_str())
    }
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|tenant| !tenant.trim().is_empty()))
}

impl From<Room> for AnyEntity {
    fn from(value: Room) -> Self {
        Self::Room(value)
    }
}

impl TryFrom<AnyEntity> for Room {
    type Error = AnyEntity;

    fn try_from(value: AnyEntity) -> Result<Self, Self::Error> {
        match value {
            AnyEntity::Room(room) => Ok(room),
            other => Err(other),
        }
    }
}

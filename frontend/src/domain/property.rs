//! Property resource: a rental building with its owner and caretaker.

use serde::{Deserialize, Serialize};

use super::resource::{AnyEntity, EntityId, Resource, ResourceKind};
use super::schema::{
    EntitySchema, FieldSpec, FieldType, FormFields, ValidatedFields, ValidationError,
};

static PROPERTY_FIELDS: [FieldSpec; 4] = [
    FieldSpec::required("name", "Property Name", FieldType::Text),
    FieldSpec::required("address", "Address", FieldType::Text),
    FieldSpec::required("owner", "Owner", FieldType::Text),
    FieldSpec::required("caretaker", "Caretaker", FieldType::Text),
];

static PROPERTY_SCHEMA: EntitySchema = EntitySchema::new(ResourceKind::Property, &PROPERTY_FIELDS);

/// A property as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    id: EntityId,
    /// Display name, e.g. "Oak House".
    pub name: String,
    /// Postal address.
    pub address: String,
    /// Owner's name.
    pub owner: String,
    /// Caretaker's name.
    pub caretaker: String,
}

impl Property {
    /// Server-assigned identifier.
    ///
    /// Only decoding and [`Resource::with_id`] set it; callers cannot
    /// reassign it:
    ///
    /// ```compile_fail
    /// use frontend::domain::{EntityId, Property};
    ///
    /// fn reassign(property: &mut Property, id: EntityId) {
    ///     property.id = id;
    /// }
    /// ```
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }
}

/// Creation payload for a [`Property`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyDraft {
    /// Display name.
    pub name: String,
    /// Postal address.
    pub address: String,
    /// Owner's name.
    pub owner: String,
    /// Caretaker's name.
    pub caretaker: String,
}

/// Descriptor for the property resource kind.
#[derive(Debug, Clone, Copy, Default)]
pub struct Properties;

impl Resource for Properties {
    type Entity = Property;
    type Draft = PropertyDraft;

    const KIND: ResourceKind = ResourceKind::Property;

    fn schema() -> &'static EntitySchema {
        &PROPERTY_SCHEMA
    }

    fn id(entity: &Property) -> EntityId {
        entity.id()
    }

    fn draft_from_fields(fields: &ValidatedFields) -> Result<PropertyDraft, ValidationError> {
        Ok(PropertyDraft {
            name: fields.text("name")?,
            address: fields.text("address")?,
            owner: fields.text("owner")?,
            caretaker: fields.text("caretaker")?,
        })
    }

    fn with_id(id: EntityId, draft: PropertyDraft) -> Property {
        Property {
            id,
            name: draft.name,
            address: draft.address,
            owner: draft.owner,
            caretaker: draft.caretaker,
        }
    }

    fn to_fields(entity: &Property) -> FormFields {
        FormFields::new()
            .with("name", entity.name.as_str())
            .with("address", entity.address.as_str())
            .with("owner", entity.owner.as_str())
            .with("caretaker", entity.caretaker.as_str())
    }
}

impl From<Property> for AnyEntity {
    fn from(value: Property) -> Self {
        Self::Property(value)
    }
}

impl TryFrom<AnyEntity> for Property {
    type Error = AnyEntity;

    fn try_from(value: AnyEntity) -> Result<Self, Self::Error> {
        match value {
            AnyEntity::Property(property) => Ok(property),
            other => Err(other),
        }
    }
}

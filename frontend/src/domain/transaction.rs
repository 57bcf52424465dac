//! Transaction resource: income or expense booked against a property.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::resource::{AnyEntity, EntityId, Resource, ResourceKind};
use super::schema::{
    DATE_FORMAT, EntitySchema, FieldSpec, FieldType, FormFields, ValidatedFields,
    ValidationError,
};

const TRANSACTION_TYPES: &[&str] = &["income", "expense"];

static TRANSACTION_FIELDS: [FieldSpec; 5] = [
    FieldSpec::required("date", "Date", FieldType::Date),
    FieldSpec::required("type", "Type", FieldType::Choice(TRANSACTION_TYPES)),
    FieldSpec::required("amount", "Amount", FieldType::Decimal),
    FieldSpec::required("description", "Description", FieldType::Text),
    FieldSpec::required("property", "Property", FieldType::Text),
];

static TRANSACTION_SCHEMA: EntitySchema =
    EntitySchema::new(ResourceKind::Transaction, &TRANSACTION_FIELDS);

/// Direction of money flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money received, e.g. rent.
    Income,
    /// Money spent, e.g. repairs.
    Expense,
}

impl TransactionType {
    /// Wire spelling of the type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    fn from_choice(choice: &str) -> Result<Self, ValidationError> {
        match choice {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            _ => Err(ValidationError::SchemaMismatch { field: "type" }),
        }
    }
}

/// A transaction as returned by the backend.
///
/// `amount` is expected to be positive; the sign lives in
/// [`TransactionType`]. The client does not enforce this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    id: EntityId,
    /// Booking date.
    pub date: NaiveDate,
    /// Income or expense.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// Monetary amount.
    pub amount: f64,
    /// Free-form description.
    pub description: String,
    /// Name of the property the transaction belongs to.
    pub property: String,
}

impl Transaction {
    /// Server-assigned identifier.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }
}

/// Creation payload for a [`Transaction`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionDraft {
    /// Booking date.
    pub date: NaiveDate,
    /// Income or expense.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// Monetary amount.
    pub amount: f64,
    /// Free-form description.
    pub description: String,
    /// Owning property's name.
    pub property: String,
}

/// Descriptor for the transaction resource kind.
#[derive(Debug, Clone, Copy, Default)]
pub struct Transactions;

impl Resource for Transactions {
    type Entity = Transaction;
    type Draft = TransactionDraft;

    const KIND: ResourceKind = ResourceKind::Transaction;

    fn schema() -> &'static EntitySchema {
        &TRANSACTION_SCHEMA
    }

    fn id(entity: &Transaction) -> EntityId {
        entity.id()
    }

    fn draft_from_fields(fields: &ValidatedFields) -> Result<TransactionDraft, ValidationError> {
        Ok(TransactionDraft {
            date: fields.date("date")?,
            transaction_type: TransactionType::from_choice(fields.choice("type")?)?,
            amount: fields.decimal("amount")?,
            description: fields.text("description")?,
            property: fields.text("property")?,
        })
    }

    fn with_id(id: EntityId, draft: TransactionDraft) -> Transaction {
        Transaction {
            id,
            date: draft.date,
            transaction_type: draft.transaction_type,
            amount: draft.amount,
            description: draft.description,
            property: draft.property,
        }
    }

    fn to_fields(entity: &Transaction) -> FormFields {
        FormFields::new()
            .with("date", entity.date.format(DATE_FORMAT).to_string())
            .with("type", entity.transaction_type.as_str())
            .with("amount", entity.amount.to_string())
            .with("description", entity.description.as_str())
            .with("property", entity.property.as_str())
    }
}

impl From<Transaction> for AnyEntity {
    fn from(value: Transaction) -> Self {
        Self::Transaction(value)
    }
}

impl TryFrom<AnyEntity> for Transaction {
    type Error = AnyEntity;

    fn try_from(value: AnyEntity) -> Result<Self, Self::Error> {
        match value {
            AnyEntity::Transaction(transaction) => Ok(transaction),
            other => Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn draft_uses_wire_names_and_iso_dates() {
        let form = FormFields::new()
            .with("date", "2024-05-31")
            .with("type", "expense")
            .with("amount", "89.99")
            .with("description", "Boiler service")
            .with("property", "Oak House");

        let draft = Transactions::validate(&form).expect("form is valid");
        let body = serde_json::to_value(&draft).expect("draft encodes");

        assert_eq!(body["date"], "2024-05-31");
        assert_eq!(body["type"], "expense");
        assert_eq!(body["amount"], json!(89.99));
    }

    #[test]
    fn edit_form_reproduces_the_entity() {
        let transaction: Transaction = serde_json::from_value(json!({
            "id": 9, "date": "2024-01-15", "type": "income", "amount": 650.0,
            "description": "January rent", "property": "Oak House"
        }))
        .expect("transaction decodes");

        let fields = Transactions::to_fields(&transaction);
        assert_eq!(fields.get("date"), Some("2024-01-15"));
        assert_eq!(fields.get("amount"), Some("650"));

        let draft = Transactions::validate(&fields).expect("edit form is valid");
        assert_eq!(Transactions::with_id(transaction.id(), draft), transaction);
    }

    #[test]
    fn negative_amounts_are_not_rejected() {
        let form = FormFields::new()
            .with("date", "2024-05-31")
            .with("type", "income")
            .with("amount", "-10")
            .with("description", "Refund")
            .with("property", "Oak House");

        let draft = Transactions::validate(&form).expect("sign is a convention only");
        assert!(draft.amount < 0.0);
    }
}

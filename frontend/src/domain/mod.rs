//! Domain layer: entity schemas and the synchronization core.
//!
//! Nothing in here performs I/O directly. Remote access goes through the
//! [`ports::ResourceClient`] port, and time through [`mockable::Clock`].

pub mod collection_cache;
pub mod console;
pub mod edit_session;
pub mod error;
pub mod mutation;
pub mod ports;
pub mod property;
pub mod resource;
pub mod room;
pub mod schema;
pub mod screen;
pub mod transaction;

pub use self::collection_cache::{CacheStatus, CollectionCache, CollectionView, Snapshot};
pub use self::console::Console;
pub use self::edit_session::{EditSession, SessionState, SessionTarget};
pub use self::error::{ErrorCategory, SyncError};
pub use self::mutation::{
    Mutation, MutationCoordinator, MutationKind, MutationOutcome, MutationStatus,
};
pub use self::property::{Properties, Property, PropertyDraft};
pub use self::resource::{AnyEntity, EntityId, Resource, ResourceKind};
pub use self::room::{Room, RoomDraft, RoomStatus, Rooms};
pub use self::schema::{
    DATE_FORMAT, EntitySchema, FieldSpec, FieldType, FormFields, ValidatedFields,
    ValidationError,
};
pub use self::screen::ManagementScreen;
pub use self::transaction::{Transaction, TransactionDraft, TransactionType, Transactions};

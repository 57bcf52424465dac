//! Kind-dispatched surface over the three management screens.
//!
//! A UI that addresses screens by [`ResourceKind`] talks to the [`Console`];
//! rows cross this boundary as [`AnyEntity`].

use std::sync::Arc;

use mockable::Clock;

use super::collection_cache::{CacheStatus, CollectionCache, CollectionView, Snapshot};
use super::edit_session::SessionState;
use super::error::SyncError;
use super::mutation::{MutationOutcome, MutationStatus};
use super::ports::ResourceClient;
use super::property::Properties;
use super::resource::{AnyEntity, EntityId, Resource, ResourceKind};
use super::room::Rooms;
use super::schema::FormFields;
use super::screen::ManagementScreen;
use super::transaction::Transactions;

macro_rules! with_screen {
    ($console:expr, $kind:expr, |$screen:ident| $body:expr) => {
        match $kind {
            ResourceKind::Property => {
                let $screen = &$console.properties;
                $body
            }
            ResourceKind::Room => {
                let $screen = &$console.rooms;
                $body
            }
            ResourceKind::Transaction => {
                let $screen = &$console.transactions;
                $body
            }
        }
    };
}

fn erase<E: Clone + Into<AnyEntity>>(entity: &E) -> AnyEntity {
    entity.clone().into()
}

/// Owner of the property, room and transaction screens.
pub struct Console {
    properties: ManagementScreen<Properties>,
    rooms: ManagementScreen<Rooms>,
    transactions: ManagementScreen<Transactions>,
}

impl std::fmt::Debug for Console {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Console").finish_non_exhaustive()
    }
}

impl Console {
    /// Assemble a console from three prepared screens.
    #[must_use]
    pub const fn new(
        properties: ManagementScreen<Properties>,
        rooms: ManagementScreen<Rooms>,
        transactions: ManagementScreen<Transactions>,
    ) -> Self {
        Self {
            properties,
            rooms,
            transactions,
        }
    }

    /// Build each screen with its own cache over the given clients.
    #[must_use]
    pub fn from_clients(
        properties: Arc<dyn ResourceClient<Properties>>,
        rooms: Arc<dyn ResourceClient<Rooms>>,
        transactions: Arc<dyn ResourceClient<Transactions>>,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Self {
        Self::new(
            build_screen(properties, Arc::clone(&clock)),
            build_screen(rooms, Arc::clone(&clock)),
            build_screen(transactions, clock),
        )
    }

    /// The property screen.
    #[must_use]
    pub const fn properties(&self) -> &ManagementScreen<Properties> {
        &self.properties
    }

    /// The room screen.
    #[must_use]
    pub const fn rooms(&self) -> &ManagementScreen<Rooms> {
        &self.rooms
    }

    /// The transaction screen.
    #[must_use]
    pub const fn transactions(&self) -> &ManagementScreen<Transactions> {
        &self.transactions
    }

    /// Rows of `kind` to render, fetching them if needed.
    #[must_use]
    pub fn get_collection(&self, kind: ResourceKind) -> CollectionView<AnyEntity> {
        with_screen!(self, kind, |screen| screen.get_collection().map(erase))
    }

    /// Rows of `kind` to render, without fetching.
    #[must_use]
    pub fn collection(&self, kind: ResourceKind) -> CollectionView<AnyEntity> {
        with_screen!(self, kind, |screen| screen.collection().map(erase))
    }

    /// Await a fresh collection of `kind`.
    ///
    /// # Errors
    ///
    /// Returns the fetch failure.
    pub async fn refresh(&self, kind: ResourceKind) -> Result<Snapshot<AnyEntity>, SyncError> {
        with_screen!(self, kind, |screen| screen
            .refresh()
            .await
            .map(|snapshot| snapshot.map(erase)))
    }

    /// Cache phase of `kind`.
    #[must_use]
    pub fn cache_status(&self, kind: ResourceKind) -> CacheStatus {
        with_screen!(self, kind, |screen| screen.cache_status())
    }

    /// Open the create form of `kind`; ignored while a session is open.
    #[must_use]
    pub fn open_create(&self, kind: ResourceKind) -> bool {
        with_screen!(self, kind, |screen| screen.open_create())
    }

    /// Open the edit form of `kind` for `entity`.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::KindMismatch`] when `entity` is not a `kind` row.
    pub fn open_edit(&self, kind: ResourceKind, entity: AnyEntity) -> Result<(), SyncError> {
        with_screen!(self, kind, |screen| screen.open_edit_any(entity))
    }

    /// Open the edit form of `kind` for the row with `id`.
    ///
    /// # Errors
    ///
    /// Returns the fetch failure or [`SyncError::UnknownEntity`].
    pub async fn open_edit_by_id(&self, kind: ResourceKind, id: EntityId) -> Result<(), SyncError> {
        with_screen!(self, kind, |screen| screen.open_edit_by_id(id).await)
    }

    /// Close the modal of `kind`.
    pub fn close_session(&self, kind: ResourceKind) {
        with_screen!(self, kind, |screen| screen.close_session());
    }

    /// Session state of `kind`.
    #[must_use]
    pub fn session(&self, kind: ResourceKind) -> SessionState<AnyEntity> {
        with_screen!(self, kind, |screen| screen.session().map(Into::into))
    }

    /// Values to pre-fill the open modal of `kind` with.
    #[must_use]
    pub fn form_defaults(&self, kind: ResourceKind) -> FormFields {
        with_screen!(self, kind, |screen| screen.form_defaults())
    }

    /// Status of the latest write on `kind`.
    #[must_use]
    pub fn mutation_status(&self, kind: ResourceKind) -> MutationStatus {
        with_screen!(self, kind, |screen| screen.mutation_status())
    }

    /// Submit the open modal of `kind`.
    ///
    /// # Errors
    ///
    /// See [`ManagementScreen::submit`].
    pub async fn submit(
        &self,
        kind: ResourceKind,
        fields: &FormFields,
    ) -> Result<MutationOutcome<AnyEntity>, SyncError> {
        with_screen!(self, kind, |screen| screen
            .submit(fields)
            .await
            .map(|outcome| outcome.map(Into::into)))
    }

    /// Delete the `kind` row with `id`.
    ///
    /// # Errors
    ///
    /// See [`ManagementScreen::remove`].
    pub async fn remove(
        &self,
        kind: ResourceKind,
        id: EntityId,
    ) -> Result<MutationOutcome<AnyEntity>, SyncError> {
        with_screen!(self, kind, |screen| screen
            .remove(id)
            .await
            .map(|outcome| outcome.map(Into::into)))
    }
}

fn build_screen<R: Resource>(
    client: Arc<dyn ResourceClient<R>>,
    clock: Arc<dyn Clock + Send + Sync>,
) -> ManagementScreen<R> {
    let cache = CollectionCache::new(Arc::clone(&client), clock);
    ManagementScreen::new(client, cache)
}

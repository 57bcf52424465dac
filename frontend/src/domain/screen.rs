//! Management screen: one resource kind's cache, coordinator and session.
//!
//! The screen is the unit a UI talks to. It owns the edit session and the
//! status of the latest mutation, shares its collection cache with the
//! mutation coordinator, and applies the cross-component rules: a confirmed
//! write closes the session that submitted it, a failed one keeps the modal
//! open with the user's input intact.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use super::collection_cache::{CacheStatus, CollectionCache, CollectionView, Snapshot};
use super::edit_session::{EditSession, SessionState, SessionTarget};
use super::error::SyncError;
use super::mutation::{
    Mutation, MutationCoordinator, MutationKind, MutationOutcome, MutationStatus,
};
use super::ports::ResourceClient;
use super::resource::{AnyEntity, EntityId, Resource};
use super::schema::FormFields;

/// Everything a UI needs to render and drive one resource kind.
pub struct ManagementScreen<R: Resource> {
    cache: CollectionCache<R>,
    coordinator: MutationCoordinator<R>,
    session: Mutex<EditSession<R>>,
    status: Mutex<MutationStatus>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<R: Resource> ManagementScreen<R> {
    /// Screen writing through `client` and serving rows from `cache`.
    ///
    /// The cache should be backed by the same client.
    #[must_use]
    pub fn new(client: Arc<dyn ResourceClient<R>>, cache: CollectionCache<R>) -> Self {
        Self {
            coordinator: MutationCoordinator::new(client, cache.clone()),
            cache,
            session: Mutex::new(EditSession::new()),
            status: Mutex::new(MutationStatus::Idle),
        }
    }

    /// The screen's collection cache.
    #[must_use]
    pub const fn cache(&self) -> &CollectionCache<R> {
        &self.cache
    }

    /// Rows to render, fetching them when absent, stale or failed.
    #[must_use]
    pub fn get_collection(&self) -> CollectionView<R::Entity> {
        self.cache.get()
    }

    /// Rows to render, without fetching.
    #[must_use]
    pub fn collection(&self) -> CollectionView<R::Entity> {
        self.cache.view()
    }

    /// Await a fresh collection.
    ///
    /// # Errors
    ///
    /// Returns the fetch failure.
    pub async fn refresh(&self) -> Result<Snapshot<R::Entity>, SyncError> {
        self.cache.fetch().await
    }

    /// Phase of the collection cache.
    #[must_use]
    pub fn cache_status(&self) -> CacheStatus {
        self.cache.status()
    }

    /// Open the create form; ignored while a session is open.
    #[must_use]
    pub fn open_create(&self) -> bool {
        lock(&self.session).open_create()
    }

    /// Open the edit form for `entity`.
    pub fn open_edit(&self, entity: R::Entity) {
        lock(&self.session).open_edit(entity);
    }

    /// Open the edit form for a kind-erased entity.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::KindMismatch`] when `entity` belongs to another
    /// resource kind.
    pub fn open_edit_any(&self, row: AnyEntity) -> Result<(), SyncError> {
        let entity = R::Entity::try_from(row).map_err(|other| SyncError::KindMismatch {
            expected: R::KIND,
            actual: other.kind(),
        })?;
        self.open_edit(entity);
        Ok(())
    }

    /// Open the edit form for the row with `id`, loading the collection if
    /// needed.
    ///
    /// # Errors
    ///
    /// Returns the fetch failure, or [`SyncError::UnknownEntity`] when no
    /// row has that id.
    pub async fn open_edit_by_id(&self, id: EntityId) -> Result<(), SyncError> {
        let snapshot = self.cache.fetch().await?;
        let entity = snapshot
            .iter()
            .find(|entity| R::id(entity) == id)
            .cloned()
            .ok_or(SyncError::UnknownEntity { kind: R::KIND, id })?;
        self.open_edit(entity);
        Ok(())
    }

    /// Close the modal without submitting.
    pub fn close_session(&self) {
        lock(&self.session).close();
    }

    /// Current session state.
    #[must_use]
    pub fn session(&self) -> SessionState<R::Entity> {
        lock(&self.session).state().clone()
    }

    /// Values to pre-fill the open modal with.
    #[must_use]
    pub fn form_defaults(&self) -> FormFields {
        lock(&self.session).form_defaults()
    }

    /// Status of the latest create, update or delete.
    #[must_use]
    pub fn mutation_status(&self) -> MutationStatus {
        lock(&self.status).clone()
    }

    /// Submit the open modal: create when `Creating`, update the subject
    /// when `Editing`.
    ///
    /// On success the cache is invalidated and the session closes, unless it
    /// was moved to another subject while the request was in flight. On
    /// failure the session stays open.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::NoActiveSession`] when no modal is open,
    /// otherwise validation or client failures.
    pub async fn submit(
        &self,
        fields: &FormFields,
    ) -> Result<MutationOutcome<R::Entity>, SyncError> {
        let target = lock(&self.session).target()?;
        let (kind, prepared) = match target {
            SessionTarget::Create => (
                MutationKind::Create,
                self.coordinator.prepare_create(fields),
            ),
            SessionTarget::Edit(id) => (
                MutationKind::Update,
                self.coordinator.prepare_update(id, fields),
            ),
        };
        let mutation = prepared.inspect_err(|error| {
            self.record(MutationStatus::Failed {
                kind,
                error: error.clone(),
            });
        })?;

        let result = self.run(mutation).await;
        if result.is_ok() && !lock(&self.session).close_if_targeting(target) {
            debug!(kind = %R::KIND, "session moved during submission; left open");
        }
        result
    }

    /// Delete the row with `id`. The session is not affected.
    ///
    /// # Errors
    ///
    /// Returns client failures, e.g. not-found when the row is already gone.
    pub async fn remove(&self, id: EntityId) -> Result<MutationOutcome<R::Entity>, SyncError> {
        self.run(self.coordinator.prepare_delete(id)).await
    }

    async fn run(&self, mutation: Mutation<R>) -> Result<MutationOutcome<R::Entity>, SyncError> {
        let kind = mutation.kind();
        self.record(MutationStatus::Pending(kind));
        let result = mutation.execute().await;
        self.record(match &result {
            Ok(_) => MutationStatus::Succeeded(kind),
            Err(error) => MutationStatus::Failed {
                kind,
                error: error.clone(),
            },
        });
        result
    }

    fn record(&self, status: MutationStatus) {
        *lock(&self.status) = status;
    }
}

#[cfg(test)]
#[path = "screen_tests.rs"]
mod tests;

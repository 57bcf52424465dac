//! Mutation coordinator: one validated create, update or delete at a time.
//!
//! Preparing a mutation validates the form against the resource schema, so a
//! [`ValidationError`](super::ValidationError) never costs a network call.
//! The prepared [`Mutation`] is consumed by [`Mutation::execute`]; it cannot
//! be retried or executed twice. Success invalidates the collection cache.
//! Nothing is applied to the cache optimistically.

use std::fmt;
use std::sync::Arc;

use tracing::{info, warn};

use super::collection_cache::CollectionCache;
use super::error::SyncError;
use super::ports::ResourceClient;
use super::resource::{EntityId, Resource};
use super::schema::FormFields;

/// Which write a mutation performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    /// POST a new entity.
    Create,
    /// PUT a full replacement.
    Update,
    /// DELETE by id.
    Delete,
}

impl MutationKind {
    /// Lower-case verb used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Server-confirmed result of a mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome<E> {
    /// The created entity, with its server-assigned id.
    Created(E),
    /// The entity as stored after the update.
    Updated(E),
    /// The id that was deleted.
    Deleted(EntityId),
}

impl<E> MutationOutcome<E> {
    /// Convert the carried entity.
    #[must_use]
    pub fn map<T>(self, f: impl FnOnce(E) -> T) -> MutationOutcome<T> {
        match self {
            Self::Created(entity) => MutationOutcome::Created(f(entity)),
            Self::Updated(entity) => MutationOutcome::Updated(f(entity)),
            Self::Deleted(id) => MutationOutcome::Deleted(id),
        }
    }
}

/// Progress of a screen's latest mutation.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum MutationStatus {
    /// Nothing submitted yet.
    #[default]
    Idle,
    /// Awaiting the server.
    Pending(MutationKind),
    /// The server confirmed the write.
    Succeeded(MutationKind),
    /// Validation or the server refused the write.
    Failed {
        /// Which write failed.
        kind: MutationKind,
        /// Why it failed.
        error: SyncError,
    },
}

impl MutationStatus {
    /// Whether a mutation is awaiting the server.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }

    /// Error of the latest failed mutation, if any.
    #[must_use]
    pub const fn error(&self) -> Option<&SyncError> {
        match self {
            Self::Failed { error, .. } => Some(error),
            _ => None,
        }
    }
}

enum Request<R: Resource> {
    Create(R::Draft),
    Update(R::Entity),
    Delete(EntityId),
}

/// A validated write, ready to send exactly once.
#[must_use = "a prepared mutation does nothing until executed"]
pub struct Mutation<R: Resource> {
    request: Request<R>,
    client: Arc<dyn ResourceClient<R>>,
    cache: CollectionCache<R>,
}

impl<R: Resource> fmt::Debug for Mutation<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mutation")
            .field("kind", &R::KIND)
            .field("mutation", &self.kind())
            .finish_non_exhaustive()
    }
}

impl<R: Resource> Mutation<R> {
    /// Which write this is.
    #[must_use]
    pub const fn kind(&self) -> MutationKind {
        match self.request {
            Request::Create(_) => MutationKind::Create,
            Request::Update(_) => MutationKind::Update,
            Request::Delete(_) => MutationKind::Delete,
        }
    }

    /// Send the write and invalidate the cache when the server confirms it.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Remote`] when the client fails. The cache is left
    /// untouched, except when the server accepted the write but its reply
    /// could not be decoded, in which case the cache is invalidated before
    /// the error is returned.
    pub async fn execute(self) -> Result<MutationOutcome<R::Entity>, SyncError> {
        let kind = self.kind();
        let Self {
            request,
            client,
            cache,
        } = self;

        let result = match request {
            Request::Create(draft) => client.create(&draft).await.map(MutationOutcome::Created),
            Request::Update(entity) => client.update(&entity).await.map(MutationOutcome::Updated),
            Request::Delete(id) => client
                .delete(id)
                .await
                .map(|()| MutationOutcome::Deleted(id)),
        };

        match result {
            Ok(outcome) => {
                info!(kind = %R::KIND, mutation = %kind, "mutation confirmed");
                cache.invalidate();
                Ok(outcome)
            }
            Err(error) => {
                if error.write_landed() {
                    warn!(
                        kind = %R::KIND,
                        mutation = %kind,
                        error = %error,
                        "write accepted but reply unreadable; refreshing collection"
                    );
                    cache.invalidate();
                } else {
                    warn!(kind = %R::KIND, mutation = %kind, error = %error, "mutation failed");
                }
                Err(error.into())
            }
        }
    }
}

/// Builds and runs mutations for one resource kind.
pub struct MutationCoordinator<R: Resource> {
    client: Arc<dyn ResourceClient<R>>,
    cache: CollectionCache<R>,
}

impl<R: Resource> Clone for MutationCoordinator<R> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            cache: self.cache.clone(),
        }
    }
}

impl<R: Resource> MutationCoordinator<R> {
    /// Coordinator writing through `client` and invalidating `cache`.
    #[must_use]
    pub fn new(client: Arc<dyn ResourceClient<R>>, cache: CollectionCache<R>) -> Self {
        Self { client, cache }
    }

    fn mutation(&self, request: Request<R>) -> Mutation<R> {
        Mutation {
            request,
            client: Arc::clone(&self.client),
            cache: self.cache.clone(),
        }
    }

    /// Validate a create form.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Validation`] for missing or malformed fields.
    pub fn prepare_create(&self, fields: &FormFields) -> Result<Mutation<R>, SyncError> {
        let draft = R::validate(fields)?;
        Ok(self.mutation(Request::Create(draft)))
    }

    /// Validate an edit form for the entity `id`.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Validation`] for missing or malformed fields.
    pub fn prepare_update(
        &self,
        id: EntityId,
        fields: &FormFields,
    ) -> Result<Mutation<R>, SyncError> {
        let draft = R::validate(fields)?;
        Ok(self.mutation(Request::Update(R::with_id(id, draft))))
    }

    /// Prepare a delete of `id`. Deletes carry no form, so nothing can fail.
    pub fn prepare_delete(&self, id: EntityId) -> Mutation<R> {
        self.mutation(Request::Delete(id))
    }

    /// Validate and send a create.
    ///
    /// # Errors
    ///
    /// Returns validation or client failures; see [`Mutation::execute`].
    pub async fn submit_create(
        &self,
        fields: &FormFields,
    ) -> Result<MutationOutcome<R::Entity>, SyncError> {
        self.prepare_create(fields)?.execute().await
    }

    /// Validate and send an update of `id`.
    ///
    /// # Errors
    ///
    /// Returns validation or client failures; see [`Mutation::execute`].
    pub async fn submit_update(
        &self,
        id: EntityId,
        fields: &FormFields,
    ) -> Result<MutationOutcome<R::Entity>, SyncError> {
        self.prepare_update(id, fields)?.execute().await
    }

    /// Send a delete of `id`.
    ///
    /// # Errors
    ///
    /// Returns client failures; see [`Mutation::execute`].
    pub async fn submit_delete(
        &self,
        id: EntityId,
    ) -> Result<MutationOutcome<R::Entity>, SyncError> {
        self.prepare_delete(id).execute().await
    }
}

//! Synchronized collection cache for one resource kind.
//!
//! The cache moves through `Absent → Loading → Present → Invalidated →
//! Loading → …` and additionally `Failed` when a fetch errors. Fetches are
//! coalesced: while a request is in flight every caller observes that same
//! request. Each request carries a monotonically increasing ticket; a
//! response only replaces the held snapshot when its ticket is newer, so a
//! slow, older request can never overwrite fresher data.
//!
//! State lives behind a `std::sync::Mutex` whose guard is never held across
//! an `.await`.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use futures_util::future::{BoxFuture, FutureExt, Shared};
use mockable::Clock;
use tracing::{debug, info, warn};

use super::error::SyncError;
use super::ports::{ResourceClient, ResourceClientError};
use super::resource::Resource;

/// Immutable copy of a collection as last confirmed by the server.
///
/// Cloning is cheap: the rows are shared.
pub struct Snapshot<E> {
    entities: Arc<[E]>,
    ticket: u64,
    fetched_at: DateTime<Utc>,
}

impl<E> Snapshot<E> {
    fn new(entities: Vec<E>, ticket: u64, fetched_at: DateTime<Utc>) -> Self {
        Self {
            entities: entities.into(),
            ticket,
            fetched_at,
        }
    }

    /// Rows in server order.
    #[must_use]
    pub fn entities(&self) -> &[E] {
        &self.entities
    }

    /// Iterate over the rows.
    pub fn iter(&self) -> std::slice::Iter<'_, E> {
        self.entities.iter()
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Issue ticket of the request that produced this snapshot.
    #[must_use]
    pub const fn ticket(&self) -> u64 {
        self.ticket
    }

    /// When the response arrived.
    #[must_use]
    pub const fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    /// Project every row, keeping ticket and timestamp.
    #[must_use]
    pub fn map<T>(&self, f: impl FnMut(&E) -> T) -> Snapshot<T> {
        Snapshot {
            entities: self.entities.iter().map(f).collect(),
            ticket: self.ticket,
            fetched_at: self.fetched_at,
        }
    }
}

impl<E> Clone for Snapshot<E> {
    fn clone(&self) -> Self {
        Self {
            entities: Arc::clone(&self.entities),
            ticket: self.ticket,
            fetched_at: self.fetched_at,
        }
    }
}

impl<E: PartialEq> PartialEq for Snapshot<E> {
    fn eq(&self, other: &Self) -> bool {
        self.ticket == other.ticket
            && self.fetched_at == other.fetched_at
            && self.entities == other.entities
    }
}

impl<E: fmt::Debug> fmt::Debug for Snapshot<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot")
            .field("ticket", &self.ticket)
            .field("fetched_at", &self.fetched_at)
            .field("entities", &self.entities)
            .finish()
    }
}

/// Bare cache phase, for diagnostics and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Never fetched.
    Absent,
    /// A fetch is in flight.
    Loading,
    /// Holding a fresh snapshot.
    Present,
    /// Marked stale; the next `get()` refetches.
    Invalidated,
    /// The last fetch failed; the next `get()` retries.
    Failed,
}

/// What a screen should render for a collection.
#[derive(Debug, Clone, PartialEq)]
pub enum CollectionView<E> {
    /// Nothing to show yet.
    Pending,
    /// A fresh, server-confirmed snapshot.
    Ready(Snapshot<E>),
    /// The previous snapshot, shown while a refetch is pending.
    Stale(Snapshot<E>),
    /// The last fetch failed; replaces the table until retried.
    Failed(SyncError),
}

impl<E> CollectionView<E> {
    /// Snapshot to render, fresh or stale.
    #[must_use]
    pub const fn snapshot(&self) -> Option<&Snapshot<E>> {
        match self {
            Self::Ready(snapshot) | Self::Stale(snapshot) => Some(snapshot),
            Self::Pending | Self::Failed(_) => None,
        }
    }

    /// Screen-level error, if any.
    #[must_use]
    pub const fn error(&self) -> Option<&SyncError> {
        match self {
            Self::Failed(error) => Some(error),
            _ => None,
        }
    }

    /// Project the rows of the view.
    #[must_use]
    pub fn map<T>(&self, f: impl FnMut(&E) -> T) -> CollectionView<T> {
        match self {
            Self::Pending => CollectionView::Pending,
            Self::Ready(snapshot) => CollectionView::Ready(snapshot.map(f)),
            Self::Stale(snapshot) => CollectionView::Stale(snapshot.map(f)),
            Self::Failed(error) => CollectionView::Failed(error.clone()),
        }
    }
}

type SharedFetch<E> = Shared<BoxFuture<'static, Result<Snapshot<E>, SyncError>>>;

enum Phase {
    Absent,
    Loading,
    Present,
    Invalidated,
    Failed(SyncError),
}

struct InFlight<E> {
    ticket: u64,
    request: SharedFetch<E>,
}

struct CacheState<E> {
    phase: Phase,
    snapshot: Option<Snapshot<E>>,
    in_flight: Option<InFlight<E>>,
    last_ticket: u64,
}

impl<E: Clone> CacheState<E> {
    fn view(&self) -> CollectionView<E> {
        match (&self.phase, &self.snapshot) {
            (Phase::Failed(error), _) => CollectionView::Failed(error.clone()),
            (Phase::Present, Some(snapshot)) => CollectionView::Ready(snapshot.clone()),
            (_, Some(snapshot)) => CollectionView::Stale(snapshot.clone()),
            (_, None) => CollectionView::Pending,
        }
    }

    const fn status(&self) -> CacheStatus {
        match self.phase {
            Phase::Absent => CacheStatus::Absent,
            Phase::Loading => CacheStatus::Loading,
            Phase::Present => CacheStatus::Present,
            Phase::Invalidated => CacheStatus::Invalidated,
            Phase::Failed(_) => CacheStatus::Failed,
        }
    }
}

struct CacheInner<R: Resource> {
    client: Arc<dyn ResourceClient<R>>,
    clock: Arc<dyn Clock + Send + Sync>,
    state: Mutex<CacheState<R::Entity>>,
}

impl<R: Resource> CacheInner<R> {
    fn lock(&self) -> MutexGuard<'_, CacheState<R::Entity>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn issue(this: &Arc<Self>, state: &mut CacheState<R::Entity>) -> SharedFetch<R::Entity> {
        state.last_ticket += 1;
        let ticket = state.last_ticket;
        let owner = Arc::clone(this);
        let request = async move {
            let result = owner.client.list().await;
            owner.settle(ticket, result)
        }
        .boxed()
        .shared();

        debug!(kind = %R::KIND, ticket, "issuing collection fetch");
        state.phase = Phase::Loading;
        state.in_flight = Some(InFlight {
            ticket,
            request: request.clone(),
        });
        drive(request.clone());
        request
    }

    fn settle(
        &self,
        ticket: u64,
        result: Result<Vec<R::Entity>, ResourceClientError>,
    ) -> Result<Snapshot<R::Entity>, SyncError> {
        let mut state = self.lock();
        let is_current = state
            .in_flight
            .as_ref()
            .is_some_and(|in_flight| in_flight.ticket == ticket);
        if is_current {
            state.in_flight = None;
        }
        let completes_load = is_current && matches!(state.phase, Phase::Loading);

        match result {
            Ok(entities) => {
                let snapshot = Snapshot::new(entities, ticket, self.clock.utc());
                let is_newer = state
                    .snapshot
                    .as_ref()
                    .is_none_or(|held| held.ticket < ticket);
                if completes_load {
                    info!(kind = %R::KIND, ticket, rows = snapshot.len(), "collection loaded");
                    state.phase = Phase::Present;
                    state.snapshot = Some(snapshot.clone());
                } else if is_newer {
                    debug!(kind = %R::KIND, ticket, "keeping superseded response as stale rows");
                    state.snapshot = Some(snapshot.clone());
                } else {
                    debug!(kind = %R::KIND, ticket, "discarding out-of-date response");
                }
                Ok(snapshot)
            }
            Err(failure) => {
                let error = SyncError::from(failure);
                if completes_load {
                    warn!(kind = %R::KIND, ticket, error = %error, "collection fetch failed");
                    state.phase = Phase::Failed(error.clone());
                } else {
                    debug!(
                        kind = %R::KIND,
                        ticket,
                        error = %error,
                        "ignoring superseded fetch failure"
                    );
                }
                Err(error)
            }
        }
    }
}

/// Run the fetch on the ambient Tokio runtime so it progresses even when
/// nobody awaits it. Without a runtime the first `fetch()` awaiter drives it.
fn drive<E: Send + Sync + 'static>(request: SharedFetch<E>) {
    tokio::runtime::Handle::try_current().map_or_else(
        |_| debug!("no Tokio runtime; fetch starts when first awaited"),
        |handle| drop(handle.spawn(request)),
    );
}

/// Cache of one resource kind's collection, shared by a screen and its
/// mutation coordinator.
pub struct CollectionCache<R: Resource> {
    inner: Arc<CacheInner<R>>,
}

impl<R: Resource> Clone for CollectionCache<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: Resource> CollectionCache<R> {
    /// Create an empty (`Absent`) cache backed by `client`.
    #[must_use]
    pub fn new(client: Arc<dyn ResourceClient<R>>, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                client,
                clock,
                state: Mutex::new(CacheState {
                    phase: Phase::Absent,
                    snapshot: None,
                    in_flight: None,
                    last_ticket: 0,
                }),
            }),
        }
    }

    /// Request the collection for display.
    ///
    /// Starts a fetch when the cache is absent, invalidated or failed, then
    /// returns what can be shown right now: the fresh snapshot, the previous
    /// snapshot while loading, a pending marker, or the failure. A call made
    /// while loading joins the in-flight request instead of issuing another.
    #[must_use]
    pub fn get(&self) -> CollectionView<R::Entity> {
        let mut state = self.inner.lock();
        if matches!(
            state.phase,
            Phase::Absent | Phase::Invalidated | Phase::Failed(_)
        ) {
            CacheInner::issue(&self.inner, &mut state);
        }
        state.view()
    }

    /// Await a fresh snapshot.
    ///
    /// Returns immediately when the cache is present, joins the in-flight
    /// request when loading, and otherwise issues a new one.
    ///
    /// # Errors
    ///
    /// Returns the fetch failure; the cache keeps it until the next retry.
    pub async fn fetch(&self) -> Result<Snapshot<R::Entity>, SyncError> {
        let request = {
            let mut state = self.inner.lock();
            if let (Phase::Present, Some(snapshot)) = (&state.phase, &state.snapshot) {
                return Ok(snapshot.clone());
            }
            let joined = match (&state.phase, &state.in_flight) {
                (Phase::Loading, Some(in_flight)) => Some(in_flight.request.clone()),
                _ => None,
            };
            joined.unwrap_or_else(|| CacheInner::issue(&self.inner, &mut state))
        };
        request.await
    }

    /// Observe the cache without triggering a fetch.
    #[must_use]
    pub fn view(&self) -> CollectionView<R::Entity> {
        self.inner.lock().view()
    }

    /// Current phase.
    #[must_use]
    pub fn status(&self) -> CacheStatus {
        self.inner.lock().status()
    }

    /// Mark the held snapshot stale without refetching.
    ///
    /// Idempotent. An in-flight request keeps running, but its response can
    /// no longer make the cache present; the next `get()` issues a new one.
    pub fn invalidate(&self) {
        let mut state = self.inner.lock();
        if !matches!(state.phase, Phase::Invalidated) {
            debug!(kind = %R::KIND, "collection invalidated");
        }
        state.phase = Phase::Invalidated;
    }
}

#[cfg(test)]
#[path = "collection_cache_tests.rs"]
mod tests;

//! Test utilities for the frontend crate.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`). Only
//! compiled for tests or with the `test-support` feature.

pub mod clock {
    //! Deterministic clock.

    use chrono::{DateTime, Local, TimeZone, Utc};
    use mockable::Clock;

    /// Clock frozen at one instant.
    #[derive(Debug, Clone, Copy)]
    pub struct FixedClock(pub DateTime<Utc>);

    impl FixedClock {
        /// Noon on 1 March 2024, UTC.
        ///
        /// # Panics
        ///
        /// Never in practice; the instant is a fixed UTC timestamp.
        #[must_use]
        pub fn noon() -> Self {
            match Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).single() {
                Some(instant) => Self(instant),
                None => panic!("fixed instant is unambiguous"),
            }
        }
    }

    impl Clock for FixedClock {
        fn local(&self) -> DateTime<Local> {
            self.0.with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            self.0
        }
    }
}

pub mod client {
    //! Scripted [`ResourceClient`] double.
    //!
    //! Responses are queued per operation and consumed in call order. A
    //! response may be gated: the call then blocks until the test releases
    //! it, which lets tests interleave concurrent requests deterministically.

    use std::collections::VecDeque;
    use std::sync::{Mutex, MutexGuard, PoisonError};

    use async_trait::async_trait;
    use tokio::sync::oneshot;

    use crate::domain::ports::{ResourceClient, ResourceClientError};
    use crate::domain::{EntityId, Resource};

    /// A call observed by [`ScriptedResourceClient`].
    #[derive(Debug, Clone, PartialEq)]
    pub enum ClientCall {
        /// `list()`.
        List,
        /// `create()` with the encoded draft.
        Create(serde_json::Value),
        /// `update()` with the encoded entity.
        Update(serde_json::Value),
        /// `delete()` with the addressed id.
        Delete(EntityId),
    }

    enum Step<T> {
        Ready(Result<T, ResourceClientError>),
        Gated(oneshot::Receiver<Result<T, ResourceClientError>>),
    }

    impl<T> Step<T> {
        async fn resolve(self) -> Result<T, ResourceClientError> {
            match self {
                Self::Ready(result) => result,
                Self::Gated(receiver) => receiver
                    .await
                    .unwrap_or_else(|_| Err(ResourceClientError::network("gate dropped"))),
            }
        }
    }

    /// Releases one gated response.
    pub struct Gate<T>(oneshot::Sender<Result<T, ResourceClientError>>);

    impl<T> Gate<T> {
        /// Let the blocked call complete with `result`.
        pub fn release(self, result: Result<T, ResourceClientError>) {
            // The call may have been dropped already; nobody is left to tell.
            if let Err(unsent) = self.0.send(result) {
                drop(unsent);
            }
        }
    }

    fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
        mutex.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next<T>(queue: &Mutex<VecDeque<Step<T>>>, operation: &str) -> Step<T> {
        lock(queue).pop_front().unwrap_or_else(|| {
            Step::Ready(Err(ResourceClientError::network(format!(
                "no scripted {operation} response"
            ))))
        })
    }

    fn gate<T>(queue: &Mutex<VecDeque<Step<T>>>) -> Gate<T> {
        let (sender, receiver) = oneshot::channel();
        lock(queue).push_back(Step::Gated(receiver));
        Gate(sender)
    }

    /// In-memory resource client driven by queued responses.
    ///
    /// An unscripted call fails with a network error.
    pub struct ScriptedResourceClient<R: Resource> {
        lists: Mutex<VecDeque<Step<Vec<R::Entity>>>>,
        creates: Mutex<VecDeque<Step<R::Entity>>>,
        updates: Mutex<VecDeque<Step<R::Entity>>>,
        deletes: Mutex<VecDeque<Step<()>>>,
        calls: Mutex<Vec<ClientCall>>,
    }

    impl<R: Resource> Default for ScriptedResourceClient<R> {
        fn default() -> Self {
            Self {
                lists: Mutex::new(VecDeque::new()),
                creates: Mutex::new(VecDeque::new()),
                updates: Mutex::new(VecDeque::new()),
                deletes: Mutex::new(VecDeque::new()),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl<R: Resource> ScriptedResourceClient<R> {
        /// Client with nothing scripted.
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue a `list()` response.
        pub fn push_list(&self, result: Result<Vec<R::Entity>, ResourceClientError>) {
            lock(&self.lists).push_back(Step::Ready(result));
        }

        /// Queue a `list()` response the test releases later.
        #[must_use]
        pub fn gate_list(&self) -> Gate<Vec<R::Entity>> {
            gate(&self.lists)
        }

        /// Queue a `create()` response.
        pub fn push_create(&self, result: Result<R::Entity, ResourceClientError>) {
            lock(&self.creates).push_back(Step::Ready(result));
        }

        /// Queue a `create()` response the test releases later.
        #[must_use]
        pub fn gate_create(&self) -> Gate<R::Entity> {
            gate(&self.creates)
        }

        /// Queue an `update()` response.
        pub fn push_update(&self, result: Result<R::Entity, ResourceClientError>) {
            lock(&self.updates).push_back(Step::Ready(result));
        }

        /// Queue an `update()` response the test releases later.
        #[must_use]
        pub fn gate_update(&self) -> Gate<R::Entity> {
            gate(&self.updates)
        }

        /// Queue a `delete()` response.
        pub fn push_delete(&self, result: Result<(), ResourceClientError>) {
            lock(&self.deletes).push_back(Step::Ready(result));
        }

        /// Every call made so far, in order.
        #[must_use]
        pub fn calls(&self) -> Vec<ClientCall> {
            lock(&self.calls).clone()
        }

        /// Number of `list()` calls made so far.
        #[must_use]
        pub fn list_calls(&self) -> usize {
            lock(&self.calls)
                .iter()
                .filter(|call| matches!(call, ClientCall::List))
                .count()
        }

        /// Number of create, update and delete calls made so far.
        #[must_use]
        pub fn write_calls(&self) -> usize {
            lock(&self.calls)
                .iter()
                .filter(|call| !matches!(call, ClientCall::List))
                .count()
        }

        fn record(&self, call: ClientCall) {
            lock(&self.calls).push(call);
        }
    }

    fn encode(value: &impl serde::Serialize) -> serde_json::Value {
        serde_json::to_value(value).unwrap_or(serde_json::Value::Null)
    }

    #[async_trait]
    impl<R: Resource> ResourceClient<R> for ScriptedResourceClient<R> {
        async fn list(&self) -> Result<Vec<R::Entity>, ResourceClientError> {
            self.record(ClientCall::List);
            next(&self.lists, "list").resolve().await
        }

        async fn create(&self, draft: &R::Draft) -> Result<R::Entity, ResourceClientError> {
            self.record(ClientCall::Create(encode(draft)));
            next(&self.creates, "create").resolve().await
        }

        async fn update(&self, entity: &R::Entity) -> Result<R::Entity, ResourceClientError> {
            self.record(ClientCall::Update(encode(entity)));
            next(&self.updates, "update").resolve().await
        }

        async fn delete(&self, id: EntityId) -> Result<(), ResourceClientError> {
            self.record(ClientCall::Delete(id));
            next(&self.deletes, "delete").resolve().await
        }
    }
}

pub mod fixtures {
    //! Sample entities and form input.

    use crate::domain::{
        EntityId, FormFields, Properties, Property, PropertyDraft, Resource, Room, RoomDraft,
        RoomStatus, Rooms,
    };

    /// Parse a literal id.
    ///
    /// # Panics
    ///
    /// Panics when `raw` is not a positive id.
    #[must_use]
    pub fn entity_id(raw: i64) -> EntityId {
        match raw.to_string().parse() {
            Ok(id) => id,
            Err(error) => panic!("{raw} is not an entity id: {error}"),
        }
    }

    /// A property named `name`.
    #[must_use]
    pub fn property(id: i64, name: &str) -> Property {
        Properties::with_id(
            entity_id(id),
            PropertyDraft {
                name: name.to_owned(),
                address: format!("{id} High St"),
                owner: "Ann".to_owned(),
                caretaker: "Bob".to_owned(),
            },
        )
    }

    /// A vacant room in Oak House.
    #[must_use]
    pub fn room(id: i64, number: &str) -> Room {
        Rooms::with_id(
            entity_id(id),
            RoomDraft {
                number: number.to_owned(),
                room_type: "single".to_owned(),
                status: RoomStatus::Vacant,
                tenant: None,
                property: "Oak House".to_owned(),
            },
        )
    }

    /// A complete property form.
    #[must_use]
    pub fn property_form(name: &str) -> FormFields {
        FormFields::new()
            .with("name", name)
            .with("address", "5 St")
            .with("owner", "A")
            .with("caretaker", "B")
    }
}

/// Give spawned tasks on the current-thread runtime a chance to run.
pub async fn yield_to_tasks() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

//! Throw-away REST backend for end-to-end adapter tests.
//!
//! Serves `/api/{collection}` from memory on an ephemeral port. Ids are
//! assigned sequentially across all collections, starting after the highest
//! seeded id.

use std::collections::BTreeMap;
use std::net::TcpListener;
use std::sync::Mutex;

use actix_web::dev::ServerHandle;
use actix_web::{App, HttpResponse, HttpServer, web};
use serde_json::{Value, json};
use url::Url;

/// A request observed by the fake backend.
#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub method: &'static str,
    pub path: String,
    pub body: Option<Value>,
}

#[derive(Default)]
struct State {
    collections: BTreeMap<String, Vec<Value>>,
    next_id: i64,
    requests: Vec<Recorded>,
    malformed_lists: bool,
}

#[derive(Default)]
pub struct Store(Mutex<State>);

impl Store {
    fn with<T>(&self, f: impl FnOnce(&mut State) -> T) -> T {
        let mut state = self.0.lock().expect("store lock");
        f(&mut state)
    }
}

pub struct FakeBackend {
    pub base_url: Url,
    store: web::Data<Store>,
    handle: ServerHandle,
}

impl FakeBackend {
    /// Start a backend on `127.0.0.1:0`.
    pub fn spawn() -> Self {
        let store = web::Data::new(Store::default());
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
        let addr = listener.local_addr().expect("listener address");

        let data = store.clone();
        let server = HttpServer::new(move || {
            App::new()
                .app_data(data.clone())
                .route("/api/{collection}", web::get().to(list))
                .route("/api/{collection}", web::post().to(create))
                .route("/api/{collection}/{id}", web::put().to(update))
                .route("/api/{collection}/{id}", web::delete().to(remove))
        })
        .disable_signals()
        .workers(1)
        .listen(listener)
        .expect("listen on ephemeral port")
        .run();

        let handle = server.handle();
        actix_web::rt::spawn(server);

        Self {
            base_url: Url::parse(&format!("http://{addr}")).expect("server URL parses"),
            store,
            handle,
        }
    }

    /// Insert a row as if it already existed server-side.
    pub fn seed(&self, collection: &str, row: Value) {
        self.store.with(|state| {
            let id = row["id"].as_i64().expect("seeded rows carry an id");
            state.next_id = state.next_id.max(id);
            state
                .collections
                .entry(collection.to_owned())
                .or_default()
                .push(row);
        });
    }

    /// Delete a row behind the client's back.
    pub fn forget(&self, collection: &str, id: i64) {
        self.store.with(|state| {
            if let Some(rows) = state.collections.get_mut(collection) {
                rows.retain(|row| row["id"] != id);
            }
        });
    }

    /// Answer list requests with an object instead of an array.
    pub fn serve_malformed_lists(&self) {
        self.store.with(|state| state.malformed_lists = true);
    }

    /// Every request received so far.
    pub fn requests(&self) -> Vec<Recorded> {
        self.store.with(|state| state.requests.clone())
    }

    /// Number of requests with `method`.
    pub fn count(&self, method: &str) -> usize {
        self.requests()
            .iter()
            .filter(|request| request.method == method)
            .count()
    }

    pub async fn stop(self) {
        self.handle.stop(true).await;
    }
}

fn record(state: &mut State, method: &'static str, path: String, body: Option<Value>) {
    state.requests.push(Recorded { method, path, body });
}

async fn list(store: web::Data<Store>, path: web::Path<String>) -> HttpResponse {
    let collection = path.into_inner();
    store.with(|state| {
        record(state, "GET", format!("/api/{collection}"), None);
        if state.malformed_lists {
            return HttpResponse::Ok().json(json!({ "rows": [] }));
        }
        let rows = state.collections.get(&collection).cloned().unwrap_or_default();
        HttpResponse::Ok().json(rows)
    })
}

async fn create(
    store: web::Data<Store>,
    path: web::Path<String>,
    body: web::Json<Value>,
) -> HttpResponse {
    let collection = path.into_inner();
    let mut row = body.into_inner();
    store.with(|state| {
        record(state, "POST", format!("/api/{collection}"), Some(row.clone()));
        if row["name"] == "Taken" {
            return HttpResponse::UnprocessableEntity()
                .json(json!({ "message": "name already taken" }));
        }
        state.next_id += 1;
        row["id"] = json!(state.next_id);
        state
            .collections
            .entry(collection)
            .or_default()
            .push(row.clone());
        HttpResponse::Created().json(row)
    })
}

async fn update(
    store: web::Data<Store>,
    path: web::Path<(String, i64)>,
    body: web::Json<Value>,
) -> HttpResponse {
    let (collection, id) = path.into_inner();
    let row = body.into_inner();
    store.with(|state| {
        record(
            state,
            "PUT",
            format!("/api/{collection}/{id}"),
            Some(row.clone()),
        );
        let Some(existing) = state
            .collections
            .get_mut(&collection)
            .and_then(|rows| rows.iter_mut().find(|existing| existing["id"] == id))
        else {
            return HttpResponse::NotFound().json(json!({ "error": "no such record" }));
        };
        *existing = row.clone();
        HttpResponse::Ok().json(row)
    })
}

async fn remove(store: web::Data<Store>, path: web::Path<(String, i64)>) -> HttpResponse {
    let (collection, id) = path.into_inner();
    store.with(|state| {
        record(state, "DELETE", format!("/api/{collection}/{id}"), None);
        let Some(rows) = state.collections.get_mut(&collection) else {
            return HttpResponse::NotFound().finish();
        };
        let before = rows.len();
        rows.retain(|row| row["id"] != id);
        if rows.len() == before {
            HttpResponse::NotFound().finish()
        } else {
            HttpResponse::NoContent().finish()
        }
    })
}

/// A base URL nothing listens on.
pub fn unreachable_base_url() -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let addr = listener.local_addr().expect("listener address");
    drop(listener);
    Url::parse(&format!("http://{addr}")).expect("URL parses")
}

//! End-to-end coverage of the console over the real HTTP adapter.

// `expect` is idiomatic in test code for failing fast on precondition violations.
#![expect(
    clippy::expect_used,
    reason = "test code uses expect for clear failure messages"
)]

mod support;

use std::sync::Arc;
use std::time::Duration;

use frontend::domain::{
    AnyEntity, CacheStatus, CollectionView, Console, ErrorCategory, FormFields, MutationOutcome,
    Properties, ResourceKind, Rooms, SessionState, Transactions,
};
use frontend::inbound::cli::{Command, KindArg, execute};
use frontend::outbound::http::HttpResourceClient;
use frontend::test_support::clock::FixedClock;
use serde_json::json;
use support::{FakeBackend, unreachable_base_url};
use url::Url;

fn console_for(base_url: &Url) -> Console {
    let timeout = Duration::from_secs(5);
    Console::from_clients(
        Arc::new(HttpResourceClient::<Properties>::new(base_url, timeout).expect("client")),
        Arc::new(HttpResourceClient::<Rooms>::new(base_url, timeout).expect("client")),
        Arc::new(HttpResourceClient::<Transactions>::new(base_url, timeout).expect("client")),
        Arc::new(FixedClock::noon()),
    )
}

fn oak_house() -> serde_json::Value {
    json!({
        "id": 1, "name": "Oak House", "address": "1 Oak Rd", "owner": "Ann", "caretaker": "Bob"
    })
}

fn elm_form() -> FormFields {
    FormFields::new()
        .with("name", "Elm")
        .with("address", "5 St")
        .with("owner", "A")
        .with("caretaker", "B")
}

fn ids(view: &CollectionView<AnyEntity>) -> Vec<i64> {
    view.snapshot()
        .map(|snapshot| snapshot.iter().map(|row| row.id().get()).collect())
        .unwrap_or_default()
}

#[actix_rt::test]
async fn first_visit_fetches_the_collection_once() {
    let backend = FakeBackend::spawn();
    backend.seed("properties", oak_house());
    let console = console_for(&backend.base_url);

    assert_eq!(
        console.get_collection(ResourceKind::Property),
        CollectionView::Pending
    );
    let rows = console
        .refresh(ResourceKind::Property)
        .await
        .expect("collection loads");

    assert_eq!(rows.len(), 1);
    assert!(matches!(
        console.collection(ResourceKind::Property),
        CollectionView::Ready(_)
    ));
    assert_eq!(backend.count("GET"), 1);
    backend.stop().await;
}

#[actix_rt::test]
async fn created_entity_carries_the_server_id_and_reappears_on_refetch() {
    let backend = FakeBackend::spawn();
    backend.seed("properties", oak_house());
    let console = console_for(&backend.base_url);
    console
        .refresh(ResourceKind::Property)
        .await
        .expect("collection loads");

    assert!(console.open_create(ResourceKind::Property));
    let outcome = console
        .submit(ResourceKind::Property, &elm_form())
        .await
        .expect("create succeeds");

    let MutationOutcome::Created(created) = outcome else {
        panic!("expected a created entity");
    };
    assert_eq!(created.id().get(), 2);
    assert_eq!(
        console.cache_status(ResourceKind::Property),
        CacheStatus::Invalidated
    );
    assert_eq!(
        console.session(ResourceKind::Property),
        SessionState::Closed
    );

    let posted = backend
        .requests()
        .into_iter()
        .find(|request| request.method == "POST")
        .and_then(|request| request.body)
        .expect("POST body recorded");
    assert!(posted.get("id").is_none(), "POST bodies never carry an id");

    let rows = console
        .refresh(ResourceKind::Property)
        .await
        .expect("collection reloads");
    assert_eq!(
        rows.iter().map(|row| row.id().get()).collect::<Vec<_>>(),
        [1, 2]
    );
    backend.stop().await;
}

#[actix_rt::test]
async fn update_puts_the_full_entity_to_its_id() {
    let backend = FakeBackend::spawn();
    backend.seed("properties", oak_house());
    let console = console_for(&backend.base_url);

    let id = "1".parse().expect("id parses");
    console
        .open_edit_by_id(ResourceKind::Property, id)
        .await
        .expect("row exists");
    let form = console
        .form_defaults(ResourceKind::Property)
        .merged(FormFields::new().with("caretaker", "Cleo"));
    console
        .submit(ResourceKind::Property, &form)
        .await
        .expect("update succeeds");

    let put = backend
        .requests()
        .into_iter()
        .find(|request| request.method == "PUT")
        .expect("PUT recorded");
    assert_eq!(put.path, "/api/properties/1");
    assert_eq!(
        put.body,
        Some(json!({
            "id": 1, "name": "Oak House", "address": "1 Oak Rd", "owner": "Ann", "caretaker": "Cleo"
        }))
    );
    backend.stop().await;
}

#[actix_rt::test]
async fn deleting_a_vanished_row_reports_not_found_and_keeps_the_snapshot() {
    let backend = FakeBackend::spawn();
    backend.seed("properties", oak_house());
    let console = console_for(&backend.base_url);
    console
        .refresh(ResourceKind::Property)
        .await
        .expect("collection loads");
    backend.forget("properties", 1);

    let error = console
        .remove(ResourceKind::Property, "1".parse().expect("id parses"))
        .await
        .expect_err("row is already gone");

    assert_eq!(error.category(), ErrorCategory::NotFound);
    assert_eq!(ids(&console.collection(ResourceKind::Property)), [1]);
    backend.stop().await;
}

#[actix_rt::test]
async fn rejected_payload_keeps_the_modal_open_with_the_server_message() {
    let backend = FakeBackend::spawn();
    let console = console_for(&backend.base_url);

    assert!(console.open_create(ResourceKind::Property));
    let error = console
        .submit(ResourceKind::Property, &elm_form().with("name", "Taken"))
        .await
        .expect_err("server rejects the name");

    assert_eq!(error.category(), ErrorCategory::Validation);
    assert!(error.to_string().contains("name already taken"));
    assert_eq!(
        console.session(ResourceKind::Property),
        SessionState::Creating
    );
    backend.stop().await;
}

#[actix_rt::test]
async fn blank_tenant_is_sent_as_null() {
    let backend = FakeBackend::spawn();
    let console = console_for(&backend.base_url);
    let form = FormFields::new()
        .with("number", "12B")
        .with("type", "double")
        .with("status", "vacant")
        .with("tenant", "")
        .with("property", "Oak House");

    assert!(console.open_create(ResourceKind::Room));
    let outcome = console
        .submit(ResourceKind::Room, &form)
        .await
        .expect("create succeeds");

    let MutationOutcome::Created(AnyEntity::Room(room)) = outcome else {
        panic!("expected a created room");
    };
    assert_eq!(room.tenant, None);
    let posted = backend
        .requests()
        .into_iter()
        .find_map(|request| request.body)
        .expect("POST body recorded");
    assert_eq!(posted["tenant"], serde_json::Value::Null);
    backend.stop().await;
}

#[actix_rt::test]
async fn non_array_collections_render_as_empty() {
    let backend = FakeBackend::spawn();
    backend.serve_malformed_lists();
    let console = console_for(&backend.base_url);

    let rows = console
        .refresh(ResourceKind::Transaction)
        .await
        .expect("malformed list is tolerated");

    assert!(rows.is_empty());
    backend.stop().await;
}

#[actix_rt::test]
async fn unreachable_backend_fails_the_screen_until_retried() {
    let console = console_for(&unreachable_base_url());

    let error = console
        .refresh(ResourceKind::Room)
        .await
        .expect_err("nothing is listening");

    assert_eq!(error.category(), ErrorCategory::Network);
    assert_eq!(
        console.collection(ResourceKind::Room).error().map(|error| error.category()),
        Some(ErrorCategory::Network)
    );
}

#[actix_rt::test]
async fn a_missing_collection_route_is_a_server_failure() {
    let backend = FakeBackend::spawn();
    let misrouted = backend.base_url.join("legacy/").expect("prefix joins");
    let console = console_for(&misrouted);

    let error = console
        .refresh(ResourceKind::Room)
        .await
        .expect_err("nothing is routed under the prefix");

    assert_eq!(error.category(), ErrorCategory::Server);
    assert!(backend.requests().is_empty());
    backend.stop().await;
}

#[actix_rt::test]
async fn list_command_prints_a_labelled_table() {
    let backend = FakeBackend::spawn();
    backend.seed("properties", oak_house());
    let console = console_for(&backend.base_url);

    let mut out = Vec::new();
    execute(
        &console,
        Command::List {
            kind: KindArg::Property,
        },
        &mut out,
    )
    .await
    .expect("list succeeds");

    let text = String::from_utf8(out).expect("utf-8 output");
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("Property Management"));
    let header = lines.next().expect("header row");
    assert!(header.starts_with("ID"));
    assert!(header.contains("Property Name"));
    assert!(lines.next().is_some_and(|row| row.contains("Oak House")));
    backend.stop().await;
}

#[actix_rt::test]
async fn update_command_overlays_fields_on_the_current_row() {
    let backend = FakeBackend::spawn();
    backend.seed("properties", oak_house());
    let console = console_for(&backend.base_url);

    let mut out = Vec::new();
    execute(
        &console,
        Command::Update {
            kind: KindArg::Property,
            id: "1".parse().expect("id parses"),
            fields: vec![("owner".to_owned(), "Dee".to_owned())],
        },
        &mut out,
    )
    .await
    .expect("update succeeds");

    assert_eq!(String::from_utf8(out).expect("utf-8"), "updated property 1\n");
    let put = backend
        .requests()
        .into_iter()
        .find(|request| request.method == "PUT")
        .and_then(|request| request.body)
        .expect("PUT body recorded");
    assert_eq!(put["owner"], "Dee");
    assert_eq!(put["name"], "Oak House");
    backend.stop().await;
}

#[actix_rt::test]
async fn create_command_reports_validation_errors_without_a_request() {
    let backend = FakeBackend::spawn();
    let console = console_for(&backend.base_url);

    let mut out = Vec::new();
    let error = execute(
        &console,
        Command::Create {
            kind: KindArg::Transaction,
            fields: vec![("date".to_owned(), "31/05/2024".to_owned())],
        },
        &mut out,
    )
    .await
    .expect_err("form is incomplete");

    assert!(error.to_string().starts_with("validation error:"));
    assert!(backend.requests().is_empty());
    backend.stop().await;
}

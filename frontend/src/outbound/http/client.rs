//! Reqwest-backed resource client.
//!
//! This adapter owns transport details only: URL construction, timeouts,
//! JSON (de)serialisation and HTTP status mapping.

use std::marker::PhantomData;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::ports::{ResourceClient, ResourceClientError};
use crate::domain::{EntityId, Resource};

/// Errors raised while constructing an [`HttpResourceClient`].
#[derive(Debug, Error)]
pub enum HttpClientError {
    /// The reqwest client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
    /// The base URL cannot carry a path, e.g. `mailto:` URLs.
    #[error("base URL `{0}` cannot address REST collections")]
    InvalidBaseUrl(Url),
}

/// Which endpoint a request addressed.
///
/// A 404 from the collection endpoint means the backend is misrouted, not that
/// a row vanished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endpoint {
    Collection,
    Entity,
}

/// Resource client for one kind, talking to `<base>/api/<collection>`.
pub struct HttpResourceClient<R> {
    client: Client,
    collection: Url,
    kind: PhantomData<fn() -> R>,
}

impl<R: Resource> HttpResourceClient<R> {
    /// Build an adapter with its own reqwest client and request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed or the
    /// base URL cannot carry a path.
    pub fn new(base_url: &Url, timeout: Duration) -> Result<Self, HttpClientError> {
        let client = Client::builder().timeout(timeout).build()?;
        Self::with_client(client, base_url)
    }

    /// Build an adapter sharing an existing reqwest client.
    ///
    /// # Errors
    ///
    /// Returns [`HttpClientError::InvalidBaseUrl`] when the base URL cannot
    /// carry a path.
    pub fn with_client(client: Client, base_url: &Url) -> Result<Self, HttpClientError> {
        if base_url.cannot_be_a_base() {
            return Err(HttpClientError::InvalidBaseUrl(base_url.clone()));
        }
        let mut collection = base_url.clone();
        let prefix = base_url.path().trim_end_matches('/');
        collection.set_path(&format!("{prefix}{}", R::KIND.base_path()));
        Ok(Self {
            client,
            collection,
            kind: PhantomData,
        })
    }

    /// URL of the collection endpoint.
    #[must_use]
    pub const fn collection_url(&self) -> &Url {
        &self.collection
    }

    fn entity_url(&self, id: EntityId) -> Url {
        let mut url = self.collection.clone();
        url.set_path(&format!("{}/{id}", self.collection.path()));
        url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!(kind = %R::KIND, %method, %url, "sending request");
        self.client
            .request(method, url)
            .header(reqwest::header::ACCEPT, "application/json")
    }
}

#[async_trait]
impl<R: Resource> ResourceClient<R> for HttpResourceClient<R> {
    async fn list(&self) -> Result<Vec<R::Entity>, ResourceClientError> {
        let request = self.request(Method::GET, self.collection.clone());
        let body = send(request, Endpoint::Collection).await?;
        parse_collection::<R::Entity>(&body, &self.collection)
    }

    async fn create(&self, draft: &R::Draft) -> Result<R::Entity, ResourceClientError> {
        let request = self
            .request(Method::POST, self.collection.clone())
            .json(draft);
        let body = send(request, Endpoint::Collection).await?;
        parse_entity(&body)
    }

    async fn update(&self, entity: &R::Entity) -> Result<R::Entity, ResourceClientError> {
        let url = self.entity_url(R::id(entity));
        let body = send(self.request(Method::PUT, url).json(entity), Endpoint::Entity).await?;
        parse_entity(&body)
    }

    async fn delete(&self, id: EntityId) -> Result<(), ResourceClientError> {
        send(self.request(Method::DELETE, self.entity_url(id)), Endpoint::Entity).await?;
        Ok(())
    }
}

async fn send(
    request: RequestBuilder,
    endpoint: Endpoint,
) -> Result<Vec<u8>, ResourceClientError> {
    let response: Response = request
        .send()
        .await
        .map_err(|error| map_transport_error(&error))?;
    let status = response.status();
    let url = response.url().clone();
    let body = response
        .bytes()
        .await
        .map_err(|error| map_transport_error(&error))?;
    if !status.is_success() {
        return Err(map_status_error(status, endpoint, &url, body.as_ref()));
    }
    Ok(body.to_vec())
}

fn parse_collection<E: DeserializeOwned>(
    body: &[u8],
    url: &Url,
) -> Result<Vec<E>, ResourceClientError> {
    match serde_json::from_slice::<serde_json::Value>(body) {
        Ok(value @ serde_json::Value::Array(_)) => serde_json::from_value(value).map_err(|error| {
            ResourceClientError::decode(format!("invalid collection element: {error}"))
        }),
        Ok(_) | Err(_) => {
            warn!(
                %url,
                body = %body_preview(body),
                "collection response is not an array; treating as empty"
            );
            Ok(Vec::new())
        }
    }
}

fn parse_entity<E: DeserializeOwned>(body: &[u8]) -> Result<E, ResourceClientError> {
    serde_json::from_slice(body)
        .map_err(|error| ResourceClientError::decode(format!("invalid entity JSON: {error}")))
}

fn map_transport_error(error: &reqwest::Error) -> ResourceClientError {
    if error.is_timeout() {
        ResourceClientError::network(format!("request timed out: {error}"))
    } else {
        ResourceClientError::network(error.to_string())
    }
}

fn map_status_error(
    status: StatusCode,
    endpoint: Endpoint,
    url: &Url,
    body: &[u8],
) -> ResourceClientError {
    let message = server_message(body)
        .or_else(|| Some(body_preview(body)).filter(|preview| !preview.is_empty()))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .map_or_else(|| url.to_string(), str::to_owned)
        });

    match (status, endpoint) {
        (StatusCode::NOT_FOUND, Endpoint::Entity) => ResourceClientError::not_found(message),
        (StatusCode::NOT_FOUND, Endpoint::Collection) => {
            ResourceClientError::server(status.as_u16(), message)
        }
        _ if status.is_client_error() => ResourceClientError::rejected(status.as_u16(), message),
        _ => ResourceClientError::server(status.as_u16(), message),
    }
}

/// The `message` or `error` string of a JSON error body.
fn server_message(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    ["message", "error"]
        .into_iter()
        .find_map(|key| value.get(key).and_then(serde_json::Value::as_str))
        .map(str::to_owned)
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    //! Coverage for the non-network mapping helpers.

    use super::*;
    use crate::domain::{Properties, Property, Rooms};
    use rstest::rstest;

    fn base() -> Url {
        Url::parse("http://localhost:3000").expect("static URL parses")
    }

    #[rstest]
    #[case("http://localhost:3000", "http://localhost:3000/api/rooms")]
    #[case("http://localhost:3000/", "http://localhost:3000/api/rooms")]
    #[case("http://gateway/rental/", "http://gateway/rental/api/rooms")]
    fn collection_url_keeps_the_base_path(#[case] raw_base: &str, #[case] expected: &str) {
        let base_url = Url::parse(raw_base).expect("test URL parses");
        let client = HttpResourceClient::<Rooms>::with_client(Client::new(), &base_url)
            .expect("base URL is usable");
        assert_eq!(client.collection_url().as_str(), expected);
    }

    #[test]
    fn entity_urls_append_the_id() {
        let client = HttpResourceClient::<Properties>::with_client(Client::new(), &base())
            .expect("base URL is usable");
        let id = "7".parse().expect("id parses");
        assert_eq!(
            client.entity_url(id).as_str(),
            "http://localhost:3000/api/properties/7"
        );
    }

    #[test]
    fn rejects_base_urls_without_a_path() {
        let base = Url::parse("mailto:ops@example.com").expect("test URL parses");
        let result = HttpResourceClient::<Properties>::with_client(Client::new(), &base);
        assert!(matches!(result, Err(HttpClientError::InvalidBaseUrl(_))));
    }

    #[rstest]
    #[case::vanished_row(StatusCode::NOT_FOUND, Endpoint::Entity, "NotFound")]
    #[case::missing_route(StatusCode::NOT_FOUND, Endpoint::Collection, "Server")]
    #[case::unprocessable(StatusCode::UNPROCESSABLE_ENTITY, Endpoint::Collection, "Rejected")]
    #[case::bad_request(StatusCode::BAD_REQUEST, Endpoint::Entity, "Rejected")]
    #[case::server_error(StatusCode::INTERNAL_SERVER_ERROR, Endpoint::Entity, "Server")]
    #[case::unavailable(StatusCode::SERVICE_UNAVAILABLE, Endpoint::Collection, "Server")]
    fn maps_http_statuses_to_port_errors(
        #[case] status: StatusCode,
        #[case] endpoint: Endpoint,
        #[case] expected: &str,
    ) {
        let error = map_status_error(status, endpoint, &base(), b"{\"message\":\"nope\"}");
        let actual = match error {
            ResourceClientError::NotFound { .. } => "NotFound",
            ResourceClientError::Rejected { .. } => "Rejected",
            ResourceClientError::Server { .. } => "Server",
            ResourceClientError::Network { .. } | ResourceClientError::Decode { .. } => "other",
        };
        assert_eq!(actual, expected, "{status} mapped to {actual}");
    }

    #[rstest]
    #[case(br#"{"message":"name taken"}"#.as_slice(), "name taken")]
    #[case(br#"{"error":"boom"}"#.as_slice(), "boom")]
    #[case(b"  plain\n text ".as_slice(), "plain text")]
    #[case(b"".as_slice(), "Internal Server Error")]
    fn error_messages_prefer_the_server_text(#[case] body: &[u8], #[case] expected: &str) {
        let error = map_status_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            Endpoint::Entity,
            &base(),
            body,
        );
        assert_eq!(
            error,
            ResourceClientError::server(500_u16, expected.to_owned())
        );
    }

    #[test]
    fn long_bodies_are_truncated() {
        let body = "x".repeat(400);
        let preview = body_preview(body.as_bytes());
        assert_eq!(preview.chars().count(), 163);
        assert!(preview.ends_with("..."));
    }

    #[rstest]
    #[case(b"{\"rows\":[]}".as_slice())]
    #[case(b"null".as_slice())]
    #[case(b"<html>oops</html>".as_slice())]
    fn non_array_collections_are_empty(#[case] body: &[u8]) {
        let rows = parse_collection::<Property>(body, &base()).expect("treated as empty");
        assert!(rows.is_empty());
    }

    #[test]
    fn malformed_rows_are_decode_errors() {
        let error = parse_collection::<Property>(br#"[{"id":"one"}]"#, &base())
            .expect_err("row does not decode");
        assert!(error.write_landed());
    }

    #[test]
    fn decodes_collection_rows() {
        let body = br#"[{"id":1,"name":"Oak House","address":"1 Oak Rd",
            "owner":"Ann","caretaker":"Bob"}]"#;
        let rows = parse_collection::<Property>(body, &base()).expect("rows decode");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows.first().map(|row| row.name.as_str()), Some("Oak House"));
    }
}

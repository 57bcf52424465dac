//! Driven port for the REST resource endpoints.
//!
//! One client instance serves one resource kind. Every call returns the
//! server's canonical representation; the domain never fabricates entities
//! or identifiers on the client's behalf.

use async_trait::async_trait;

use crate::domain::error::ErrorCategory;
use crate::domain::resource::{EntityId, Resource};

use super::define_port_error;

define_port_error! {
    /// Errors surfaced by resource client adapters.
    pub enum ResourceClientError {
        /// No response arrived: connection refused, timeout, broken body.
        Network {
            /// Transport error text.
            message: String,
        } => "network request failed: {message}",
        /// The server answered with a non-2xx status outside the 4xx range.
        Server {
            /// Response status code.
            status: u16,
            /// Message extracted from the response body.
            message: String,
        } => "server responded with status {status}: {message}",
        /// The server refused the payload with a 4xx status other than 404.
        Rejected {
            /// Response status code.
            status: u16,
            /// Message extracted from the response body.
            message: String,
        } => "server rejected the request with status {status}: {message}",
        /// The addressed entity does not exist (any more).
        NotFound {
            /// Message extracted from the response body.
            message: String,
        } => "resource not found: {message}",
        /// A 2xx response body could not be decoded.
        Decode {
            /// Decoder error text.
            message: String,
        } => "response could not be decoded: {message}",
    }
}

impl ResourceClientError {
    /// Coarse category used to decide how the UI recovers.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Network { .. } => ErrorCategory::Network,
            Self::Server { .. } | Self::Decode { .. } => ErrorCategory::Server,
            Self::Rejected { .. } => ErrorCategory::Validation,
            Self::NotFound { .. } => ErrorCategory::NotFound,
        }
    }

    /// Whether the server accepted the write even though the reply was
    /// unusable.
    #[must_use]
    pub const fn write_landed(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }
}

/// Port for list/create/update/delete calls against one resource kind.
#[async_trait]
pub trait ResourceClient<R: Resource>: Send + Sync {
    /// Fetch the whole collection.
    async fn list(&self) -> Result<Vec<R::Entity>, ResourceClientError>;

    /// Create an entity; the server assigns its id.
    async fn create(&self, draft: &R::Draft) -> Result<R::Entity, ResourceClientError>;

    /// Replace an entity wholesale, addressed by its id.
    async fn update(&self, entity: &R::Entity) -> Result<R::Entity, ResourceClientError>;

    /// Delete an entity by id.
    async fn delete(&self, id: EntityId) -> Result<(), ResourceClientError>;
}

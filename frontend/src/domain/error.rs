//! Domain-level error taxonomy.
//!
//! Errors are recoverable by construction: the screen that raised one stays
//! interactive and retriable. [`SyncError::category`] tells a UI which of the
//! four recovery paths applies.

use thiserror::Error;

use super::ports::ResourceClientError;
use super::resource::{EntityId, ResourceKind};
use super::schema::ValidationError;

/// Recovery category of a [`SyncError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Bad or missing input; shown inline, the session stays open.
    Validation,
    /// No response from the backend.
    Network,
    /// The backend answered with a failure status or an unusable body.
    Server,
    /// The addressed entity no longer exists.
    NotFound,
}

/// Errors raised by the synchronization core.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// Form input failed schema validation; nothing was sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The resource client failed.
    #[error(transparent)]
    Remote(#[from] ResourceClientError),
    /// A submission arrived while no edit session was open.
    #[error("no edit session is open")]
    NoActiveSession,
    /// An entity of one kind was handed to another kind's screen.
    #[error("expected a {expected} entity, got a {actual} entity")]
    KindMismatch {
        /// Kind of the screen addressed.
        expected: ResourceKind,
        /// Kind of the entity supplied.
        actual: ResourceKind,
    },
    /// An id was named that the current snapshot does not contain.
    #[error("{kind} {id} is not in the current collection")]
    UnknownEntity {
        /// Kind of the screen addressed.
        kind: ResourceKind,
        /// Identifier that was looked up.
        id: EntityId,
    },
}

impl SyncError {
    /// Recovery category for this error.
    ///
    /// # Examples
    /// ```
    /// use frontend::domain::{ErrorCategory, SyncError};
    ///
    /// assert_eq!(SyncError::NoActiveSession.category(), ErrorCategory::Validation);
    /// ```
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation(_) | Self::NoActiveSession | Self::KindMismatch { .. } => {
                ErrorCategory::Validation
            }
            Self::Remote(error) => error.category(),
            Self::UnknownEntity { .. } => ErrorCategory::NotFound,
        }
    }

    /// Whether the error was detected before any request left the client.
    #[must_use]
    pub const fn is_client_side(&self) -> bool {
        !matches!(self, Self::Remote(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_never_reach_the_network() {
        let error = SyncError::from(ValidationError::MissingField { field: "name" });
        assert!(error.is_client_side());
        assert_eq!(error.category(), ErrorCategory::Validation);
        assert_eq!(error.to_string(), "name is required");
    }

    #[test]
    fn remote_errors_keep_their_adapter_category() {
        let error = SyncError::from(ResourceClientError::not_found("/api/properties/1"));
        assert!(!error.is_client_side());
        assert_eq!(error.category(), ErrorCategory::NotFound);
    }
}

//! Modal edit session: closed, open for create, or open for edit of one row.
//!
//! At most one session is open per screen. Opening an edit always wins and
//! replaces whatever was open before; opening a create form while a session
//! is already open leaves that session alone.

use std::fmt;

use tracing::debug;

use super::error::SyncError;
use super::resource::{EntityId, Resource};
use super::schema::FormFields;

/// Observable state of an edit session.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SessionState<E> {
    /// No modal is shown.
    #[default]
    Closed,
    /// The create form is shown.
    Creating,
    /// The edit form for this entity is shown.
    Editing(E),
}

impl<E> SessionState<E> {
    /// Whether a modal is shown.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        !matches!(self, Self::Closed)
    }

    /// Entity being edited, if any.
    #[must_use]
    pub const fn subject(&self) -> Option<&E> {
        match self {
            Self::Editing(subject) => Some(subject),
            Self::Closed | Self::Creating => None,
        }
    }

    /// Convert the subject, keeping the state.
    #[must_use]
    pub fn map<T>(self, f: impl FnOnce(E) -> T) -> SessionState<T> {
        match self {
            Self::Closed => SessionState::Closed,
            Self::Creating => SessionState::Creating,
            Self::Editing(subject) => SessionState::Editing(f(subject)),
        }
    }
}

/// What a submission was made for, captured when it was sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionTarget {
    /// A new entity.
    Create,
    /// The entity with this id.
    Edit(EntityId),
}

/// Edit session for one resource kind.
pub struct EditSession<R: Resource> {
    state: SessionState<R::Entity>,
}

impl<R: Resource> Default for EditSession<R> {
    fn default() -> Self {
        Self {
            state: SessionState::Closed,
        }
    }
}

impl<R: Resource> fmt::Debug for EditSession<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditSession")
            .field("kind", &R::KIND)
            .field("state", &self.state)
            .finish()
    }
}

impl<R: Resource> EditSession<R> {
    /// A closed session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &SessionState<R::Entity> {
        &self.state
    }

    /// Open the create form. Returns `false`, changing nothing, when a
    /// session is already open.
    pub fn open_create(&mut self) -> bool {
        if self.state.is_open() {
            debug!(kind = %R::KIND, "create ignored; a session is already open");
            return false;
        }
        self.state = SessionState::Creating;
        true
    }

    /// Open the edit form for `entity`, replacing any open session.
    pub fn open_edit(&mut self, entity: R::Entity) {
        debug!(kind = %R::KIND, id = %R::id(&entity), "editing");
        self.state = SessionState::Editing(entity);
    }

    /// Close the modal.
    pub fn close(&mut self) {
        self.state = SessionState::Closed;
    }

    /// Values to pre-fill the modal with: nothing for a create form, the
    /// subject's current values for an edit.
    #[must_use]
    pub fn form_defaults(&self) -> FormFields {
        self.state
            .subject()
            .map(R::to_fields)
            .unwrap_or_default()
    }

    /// Target of a submission made now.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::NoActiveSession`] when the session is closed.
    pub fn target(&self) -> Result<SessionTarget, SyncError> {
        match &self.state {
            SessionState::Closed => Err(SyncError::NoActiveSession),
            SessionState::Creating => Ok(SessionTarget::Create),
            SessionState::Editing(subject) => Ok(SessionTarget::Edit(R::id(subject))),
        }
    }

    /// Close after a successful submission for `target`, unless the user has
    /// since moved the session elsewhere. Returns whether it closed.
    pub fn close_if_targeting(&mut self, target: SessionTarget) -> bool {
        if self.target().ok() != Some(target) {
            return false;
        }
        self.close();
        true
    }
}

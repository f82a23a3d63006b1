// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::fmt::{Debug, Formatter, Result};

use crate::{Cancelable, ConnectionId, ConnectionIdentity, TrackedConnectionId};

/// Associates a [`Cancelable`] (usually a [`crate::Callback`]) with one of the ids it
/// issued. This is a plain value: copying it does not copy the registration, and
/// dropping it does not cancel anything. Use [`crate::UniqueConnection`] for that.
///
/// The registry is borrowed, not owned, so the compiler guarantees that it outlives
/// every handle referring to it. Equality is by id.
///
/// An empty handle ([`Default`]) refers to no registry and holds id `0`.
#[derive(Clone, Copy)]
pub struct Connection<'a, Id = ConnectionId>
where
    Id: ConnectionIdentity,
{
    cancelable: Option<&'a dyn Cancelable<Id>>,
    id: Id,
}

/// [`Connection`] whose id is a [`TrackedConnectionId`].
pub type TrackedConnection<'a> = Connection<'a, TrackedConnectionId>;

impl<'a, Id> Connection<'a, Id>
where
    Id: ConnectionIdentity,
{
    pub fn new(cancelable: &'a dyn Cancelable<Id>, id: Id) -> Self {
        Self {
            cancelable: Some(cancelable),
            id,
        }
    }

    /// Cancels the registration and empties this handle. Calling it again is a no-op.
    ///
    /// Returns `true` only if this call removed a live registration.
    pub fn disconnect(&mut self) -> bool {
        let cancelled = self
            .cancelable
            .take()
            .is_some_and(|cancelable| cancelable.cancel(&self.id));
        self.id = Id::default();
        cancelled
    }

    /// Whether the registration is still live. For [`ConnectionId`] this asks the
    /// registry; for [`TrackedConnectionId`] it only reads the shared cell.
    #[must_use]
    pub fn connected(&self) -> bool {
        self.cancelable
            .is_some_and(|cancelable| self.id.is_connected_via(cancelable))
    }

    #[must_use]
    pub fn cancelable(&self) -> Option<&'a dyn Cancelable<Id>> { self.cancelable }

    #[must_use]
    pub fn id(&self) -> &Id { &self.id }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.cancelable.is_none() }
}

impl<Id> Default for Connection<'_, Id>
where
    Id: ConnectionIdentity,
{
    fn default() -> Self {
        Self {
            cancelable: None,
            id: Id::default(),
        }
    }
}

impl<Id> PartialEq for Connection<'_, Id>
where
    Id: ConnectionIdentity,
{
    fn eq(&self, other: &Self) -> bool { self.id == other.id }
}

impl<Id> Debug for Connection<'_, Id>
where
    Id: ConnectionIdentity,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("has_cancelable", &self.cancelable.is_some())
            .finish()
    }
}

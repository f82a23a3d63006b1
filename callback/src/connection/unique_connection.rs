// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! [RAII] guard for a single registration. See [`UniqueConnection`].
//!
//! [RAII]: https://en.wikipedia.org/wiki/Resource_acquisition_is_initialization

use std::fmt::{Debug, Formatter, Result};

use crate::{Cancelable, Connection, ConnectionId, ConnectionIdentity,
            TrackedConnectionId};

/// An [RAII] guard that owns exactly one [`Connection`] and cancels it on drop.
///
/// # Ownership
///
/// There should never be two guards for the same registration. While a guard exists,
/// the registration should only be cancelled through it (unless it is
/// [released](Self::release) first).
///
/// The guard is move-only. Assigning a new guard into a binding that already holds one
/// drops the old guard first, which cancels its registration, and then adopts the new
/// one:
///
/// ```
/// use r3bl_callback::{Callback, UniqueConnection};
///
/// let callback = Callback::<(), i32>::new();
/// let mut guard = UniqueConnection::from(callback.add(|_| 1));
/// assert_eq!(callback.call(()), vec![1]);
///
/// guard = UniqueConnection::from(callback.add(|_| 2));
///
/// assert_eq!(callback.call(()), vec![2]);
/// assert!(guard.connected());
/// ```
///
/// # Drop Behavior
///
/// [`Drop`] calls [`Self::disconnect()`]. The inner handle is emptied right after the
/// cancel request, so dropping a guard that was already disconnected (or released)
/// does nothing.
///
/// [RAII]: https://en.wikipedia.org/wiki/Resource_acquisition_is_initialization
pub struct UniqueConnection<'a, Id = ConnectionId>
where
    Id: ConnectionIdentity,
{
    connection: Connection<'a, Id>,
}

/// [`UniqueConnection`] whose id is a [`TrackedConnectionId`].
pub type TrackedUniqueConnection<'a> = UniqueConnection<'a, TrackedConnectionId>;

impl<'a, Id> UniqueConnection<'a, Id>
where
    Id: ConnectionIdentity,
{
    pub fn new(cancelable: &'a dyn Cancelable<Id>, id: Id) -> Self {
        Self {
            connection: Connection::new(cancelable, id),
        }
    }

    /// Cancels the owned registration (at most once) and empties the guard.
    pub fn disconnect(&mut self) -> bool { self.connection.disconnect() }

    #[must_use]
    pub fn connected(&self) -> bool { self.connection.connected() }

    /// Gives up ownership without cancelling. The caller becomes responsible for
    /// eventually cancelling the returned handle. The guard is empty afterwards, and
    /// releasing again returns an empty handle.
    pub fn release(&mut self) -> Connection<'a, Id> { std::mem::take(&mut self.connection) }

    #[must_use]
    pub fn cancelable(&self) -> Option<&'a dyn Cancelable<Id>> {
        self.connection.cancelable()
    }

    #[must_use]
    pub fn id(&self) -> &Id { self.connection.id() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.connection.is_empty() }
}

impl<'a, Id> From<Connection<'a, Id>> for UniqueConnection<'a, Id>
where
    Id: ConnectionIdentity,
{
    fn from(connection: Connection<'a, Id>) -> Self { Self { connection } }
}

impl<Id> Default for UniqueConnection<'_, Id>
where
    Id: ConnectionIdentity,
{
    fn default() -> Self {
        Self {
            connection: Connection::default(),
        }
    }
}

impl<Id> Drop for UniqueConnection<'_, Id>
where
    Id: ConnectionIdentity,
{
    fn drop(&mut self) { self.connection.disconnect(); }
}

impl<Id> Debug for UniqueConnection<'_, Id>
where
    Id: ConnectionIdentity,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.debug_struct("UniqueConnection")
            .field("connection", &self.connection)
            .finish()
    }
}

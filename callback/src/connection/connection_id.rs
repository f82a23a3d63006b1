// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The two id flavors a registration can be named by. See [`ConnectionIdentity`].
//!
//! | Flavor                  | Storage            | `connected()` answered by        |
//! | :---------------------- | :----------------- | :------------------------------- |
//! | [`ConnectionId`]        | plain `u64`        | asking the registry (`contains`) |
//! | [`TrackedConnectionId`] | `Rc<Cell<u64>>`    | reading the shared cell, O(1)    |
//!
//! The raw value `0` is reserved and means "invalid / none" for both flavors.

use std::{cell::Cell,
          fmt::{Debug, Display, Formatter, Result},
          num::NonZeroU64,
          rc::Rc};

use crate::Cancelable;

/// Behavior shared by every id flavor that a [`crate::Callback`] can mint, and that
/// [`crate::Connection`] and [`crate::UniqueConnection`] can hold.
pub trait ConnectionIdentity: Clone + Default + Debug + PartialEq {
    /// Wraps a raw id that was just issued by an [`crate::IdAllocator`].
    fn from_raw(raw: NonZeroU64) -> Self;

    /// The raw id, or `0` if this id is empty or has been invalidated.
    fn raw(&self) -> u64;

    /// Invalidates this id. For [`TrackedConnectionId`] this is observed by every copy
    /// that shares the same cell.
    fn reset(&mut self);

    fn is_valid(&self) -> bool { self.raw() != 0 }

    /// Answers [`crate::Connection::connected()`] for a handle holding this id.
    fn is_connected_via(&self, cancelable: &dyn Cancelable<Self>) -> bool {
        self.is_valid() && cancelable.contains(self)
    }
}

/// Plain id. Its validity can only be known by asking the registry that issued it.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId {
    pub value: u64,
}

impl ConnectionId {
    #[must_use]
    pub fn new(value: u64) -> Self { Self { value } }
}

impl ConnectionIdentity for ConnectionId {
    fn from_raw(raw: NonZeroU64) -> Self { Self { value: raw.get() } }

    fn raw(&self) -> u64 { self.value }

    fn reset(&mut self) { self.value = 0; }
}

impl Debug for ConnectionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result { write!(f, "ConnectionId({})", self.value) }
}

impl Display for ConnectionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result { write!(f, "{}", self.value) }
}

impl From<&TrackedConnectionId> for ConnectionId {
    /// Snapshot of the current raw value. It does not follow later cancellation.
    fn from(tracked: &TrackedConnectionId) -> Self { Self::new(tracked.raw()) }
}

/// Id whose validity cell is shared between every copy.
///
/// The registry keeps one copy inside the slot, and every handle it gives out holds a
/// clone of the same [`Rc`]. When the registration is cancelled (through any handle, by
/// [`crate::Callback::clear()`], or by dropping the registry) the registry zeroes the
/// cell, so all copies report invalid from then on. The cell lives as long as its
/// longest holder, which may be longer than the registry itself.
///
/// Two tracked ids are equal when they share the same cell (or are both empty).
#[derive(Clone, Default)]
pub struct TrackedConnectionId {
    value: Option<Rc<Cell<u64>>>,
}

impl TrackedConnectionId {
    /// Number of live copies sharing this cell (including this one). `0` when empty.
    #[must_use]
    pub fn share_count(&self) -> usize { self.value.as_ref().map_or(0, Rc::strong_count) }
}

impl ConnectionIdentity for TrackedConnectionId {
    fn from_raw(raw: NonZeroU64) -> Self {
        Self {
            value: Some(Rc::new(Cell::new(raw.get()))),
        }
    }

    fn raw(&self) -> u64 { self.value.as_ref().map_or(0, |cell| cell.get()) }

    /// Zeroes the shared cell, then lets go of this copy's share of it.
    fn reset(&mut self) {
        if let Some(cell) = self.value.take() {
            cell.set(0);
        }
    }

    /// The registry zeroes the cell on every removal path, so the cell alone is
    /// authoritative. The registry is not consulted.
    fn is_connected_via(&self, _cancelable: &dyn Cancelable<Self>) -> bool {
        self.is_valid()
    }
}

impl PartialEq for TrackedConnectionId {
    fn eq(&self, other: &Self) -> bool {
        match (&self.value, &other.value) {
            (Some(lhs), Some(rhs)) => Rc::ptr_eq(lhs, rhs),
            (None, None) => true,
            _ => false,
        }
    }
}

impl Eq for TrackedConnectionId {}

impl Debug for TrackedConnectionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(
            f,
            "TrackedConnectionId({}, shares: {})",
            self.raw(),
            self.share_count()
        )
    }
}

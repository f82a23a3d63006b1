// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{ConnectionId, ConnectionIdentity};

/// Anything that hands out connection ids and can later cancel them.
///
/// [`crate::Callback`] is the implementation in this crate. Other components can
/// implement this trait to reuse [`crate::Connection`] and [`crate::UniqueConnection`]
/// for their own registrations.
///
/// Both methods take `&self`: a cancel request can arrive while the implementor is in
/// the middle of dispatching (from inside a listener), so implementors need interior
/// mutability.
pub trait Cancelable<Id = ConnectionId>
where
    Id: ConnectionIdentity,
{
    /// Cancels the registration named by `id`.
    ///
    /// Returns `false` (and does nothing) if `id` is `0`, unknown, or was already
    /// cancelled. This is normal control flow, not an error.
    fn cancel(&self, id: &Id) -> bool;

    /// Returns `true` if `id` names a registration that is still live.
    fn contains(&self, id: &Id) -> bool;
}

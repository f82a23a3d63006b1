// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{cell::RefCell,
          fmt::{Debug, Formatter},
          rc::Rc};

use super::{DEBUG_CALLBACK_DISPATCH, FrameIndex, SlotRegistry};
use crate::{Cancelable, Connection, ConnectionId, ConnectionIdentity, ListenerFailed,
            TrackedConnectionId};

/// Signature every listener is stored as. The [`Connection`] refers to the listener's
/// own registration.
pub type ListenerFn<A, R, Id> = dyn Fn(Connection<'_, Id>, &A) -> R;

/// Listeners are reference counted so that one can be cloned out of the registry and
/// invoked while the registry itself is free to change (or even drop that slot).
pub type SharedListener<A, R, Id> = Rc<ListenerFn<A, R, Id>>;

/// A list of listener functions that are all invoked, in registration order, when the
/// callback fires.
///
/// - `A` is the argument passed (by reference) to every listener. Use a tuple for more
///   than one value, and `()` for none.
/// - `R` is what each listener returns. [`Self::call()`] collects them in order.
/// - `Id` is the id flavor, [`ConnectionId`] or [`TrackedConnectionId`].
///
/// # Reentrancy
///
/// Every method takes `&self`, and no internal borrow is held while a listener runs.
/// A listener may therefore, from inside a dispatch:
/// 1. Cancel any registration, including its own, through its [`Connection`] or
///    [`Self::cancel()`]. A cancelled listener that has not been visited yet is
///    skipped. The invocation already underway always finishes.
/// 2. Add new listeners. They are appended at the tail, so they are visited later in
///    the same dispatch.
/// 3. Fire the same callback again. The nested dispatch runs to completion with its
///    own cursor before the outer dispatch resumes where it left off.
///
/// To fire the callback from one of its own listeners, share it through an [`Rc`] and
/// capture a [`std::rc::Weak`] in the listener.
///
/// # Threads
///
/// The type is `!Send` and `!Sync`, so it can only be used from the thread that
/// created it.
///
/// # Example
///
/// ```
/// use r3bl_callback::Callback;
///
/// let callback = Callback::<i32, i32>::new();
/// callback.add(|it| it + 1);
/// let mut second = callback.add(|it| it * 10);
///
/// assert_eq!(callback.call(2), vec![3, 20]);
///
/// second.disconnect();
/// assert_eq!(callback.call(2), vec![3]);
/// ```
pub struct Callback<A, R = (), Id = ConnectionId>
where
    Id: ConnectionIdentity,
{
    registry: RefCell<SlotRegistry<SharedListener<A, R, Id>, Id>>,
}

/// [`Callback`] that hands out [`TrackedConnectionId`]s.
pub type TrackedCallback<A, R = ()> = Callback<A, R, TrackedConnectionId>;

/// Pops the frame pushed by [`FrameGuard::push()`] on every exit path, including a
/// panicking listener and an early `return` from [`Callback::try_call()`].
struct FrameGuard<'a, A, R, Id>
where
    Id: ConnectionIdentity,
{
    callback: &'a Callback<A, R, Id>,
    index: FrameIndex,
}

impl<'a, A, R, Id> FrameGuard<'a, A, R, Id>
where
    Id: ConnectionIdentity,
{
    fn push(callback: &'a Callback<A, R, Id>) -> Self {
        let index = callback.registry.borrow_mut().push_frame();
        Self { callback, index }
    }
}

impl<A, R, Id> Drop for FrameGuard<'_, A, R, Id>
where
    Id: ConnectionIdentity,
{
    fn drop(&mut self) {
        let mut registry = self.callback.registry.borrow_mut();
        debug_assert_eq!(registry.frames().depth(), self.index.0 + 1);
        registry.pop_frame();
    }
}

impl<A, R, Id> Default for Callback<A, R, Id>
where
    Id: ConnectionIdentity,
{
    fn default() -> Self {
        Self {
            registry: RefCell::new(SlotRegistry::new()),
        }
    }
}

impl<A, R, Id> Callback<A, R, Id>
where
    Id: ConnectionIdentity,
{
    #[must_use]
    pub fn new() -> Self { Self::default() }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            registry: RefCell::new(SlotRegistry::with_capacity(capacity)),
        }
    }

    /// Registers `listener` at the end of the list. Returns a handle that can cancel it.
    ///
    /// # Panics
    ///
    /// Panics if this callback has issued `u64::MAX` ids.
    pub fn add(&self, listener: impl Fn(&A) -> R + 'static) -> Connection<'_, Id> {
        self.add_with_connection(move |_, args| listener(args))
    }

    /// Registers a listener that also receives the [`Connection`] for its own
    /// registration, so it can cancel itself from inside a dispatch.
    ///
    /// # Panics
    ///
    /// Panics if this callback has issued `u64::MAX` ids.
    pub fn add_with_connection(
        &self,
        listener: impl Fn(Connection<'_, Id>, &A) -> R + 'static,
    ) -> Connection<'_, Id> {
        let listener: SharedListener<A, R, Id> = Rc::new(listener);
        let id = self.registry.borrow_mut().append(listener);
        Connection::new(self, id)
    }

    /// Cancels every registration, then registers `listener` as the only one.
    pub fn set(&self, listener: impl Fn(&A) -> R + 'static) -> Connection<'_, Id> {
        self.clear();
        self.add(listener)
    }

    /// Same as [`Self::set()`], for a listener that receives its own [`Connection`].
    pub fn set_with_connection(
        &self,
        listener: impl Fn(Connection<'_, Id>, &A) -> R + 'static,
    ) -> Connection<'_, Id> {
        self.clear();
        self.add_with_connection(listener)
    }

    /// Invokes every live listener with `args`, in registration order, and returns what
    /// they returned in the same order.
    ///
    /// See the [Reentrancy](Self#reentrancy) section for what listeners may do while
    /// this runs. A panicking listener unwinds through this method; the remaining
    /// listeners of this pass are not invoked, and the callback stays usable.
    pub fn call(&self, args: A) -> Vec<R> {
        let frame = FrameGuard::push(self);
        let mut results = Vec::with_capacity(self.len());
        self.trace_dispatch_started(frame.index);

        while let Some((id, listener)) = self.advance(frame.index) {
            results.push(listener(Connection::new(self, id), &args));
        }

        if DEBUG_CALLBACK_DISPATCH {
            tracing::trace!(
                message = "dispatch finished",
                depth = frame.index.0 + 1,
                visited = results.len(),
            );
        }

        results
    }

    /// Same as [`Self::call()`], for when the listeners' return values are not needed.
    pub fn emit(&self, args: A) { drop(self.call(args)); }

    /// Cancels the registration named by `id`. Returns `false` if there is no live
    /// registration with that id.
    ///
    /// Safe to call from inside a listener, for any registration. Any in-flight
    /// dispatch that was about to visit the cancelled listener skips it.
    pub fn cancel(&self, id: &Id) -> bool {
        let removed = self.registry.borrow_mut().remove(id);
        // Dropped here, after the borrow ends, since dropping a listener may run
        // arbitrary code (eg: a captured guard cancelling another registration).
        removed.is_some()
    }

    /// Cancels every registration. Every id handed out so far becomes invalid.
    pub fn clear(&self) {
        let removed = self.registry.borrow_mut().remove_all();
        if DEBUG_CALLBACK_DISPATCH {
            tracing::debug!(message = "callback cleared", count = removed.len());
        }
        drop(removed);
    }

    #[must_use]
    pub fn contains(&self, id: &Id) -> bool { self.registry.borrow().contains(id) }

    /// Number of live registrations.
    #[must_use]
    pub fn len(&self) -> usize { self.registry.borrow().len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.registry.borrow().is_empty() }

    /// Number of dispatches currently in flight on this callback (`0` outside of
    /// [`Self::call()`], `1` inside a listener, `2` inside a nested dispatch, etc).
    #[must_use]
    pub fn call_depth(&self) -> usize { self.registry.borrow().frames().depth() }

    fn trace_dispatch_started(&self, index: FrameIndex) {
        if DEBUG_CALLBACK_DISPATCH {
            tracing::trace!(
                message = "dispatch started",
                depth = index.0 + 1,
                len = self.len(),
            );
        }
    }

    /// The borrow is released before this returns, so the caller can invoke the
    /// listener freely.
    fn advance(&self, index: FrameIndex) -> Option<(Id, SharedListener<A, R, Id>)> {
        self.registry.borrow_mut().advance(index)
    }
}

impl<A, T, E, Id> Callback<A, Result<T, E>, Id>
where
    Id: ConnectionIdentity,
{
    /// Like [`Self::call()`] for fallible listeners, except that the first listener to
    /// return [`Err`] ends the dispatch. Listeners after it are not invoked in this pass.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerFailed`] carrying the failing registration's id and its error.
    pub fn try_call(&self, args: A) -> Result<Vec<T>, ListenerFailed<E>> {
        let frame = FrameGuard::push(self);
        let mut results = Vec::with_capacity(self.len());
        self.trace_dispatch_started(frame.index);

        while let Some((id, listener)) = self.advance(frame.index) {
            // Captured first, since the listener may cancel itself (which zeroes a
            // tracked id).
            let snapshot = ConnectionId::new(id.raw());
            match listener(Connection::new(self, id), &args) {
                Ok(value) => results.push(value),
                Err(source) => {
                    if DEBUG_CALLBACK_DISPATCH {
                        tracing::warn!(
                            message = "listener failed, dispatch aborted",
                            id = %snapshot,
                            depth = frame.index.0 + 1,
                            visited = results.len() + 1,
                        );
                    }
                    return Err(ListenerFailed {
                        id: snapshot,
                        source,
                    });
                }
            }
        }

        Ok(results)
    }
}

impl<A, R, Id> Cancelable<Id> for Callback<A, R, Id>
where
    Id: ConnectionIdentity,
{
    fn cancel(&self, id: &Id) -> bool { Callback::cancel(self, id) }

    fn contains(&self, id: &Id) -> bool { Callback::contains(self, id) }
}

impl<A, R, Id> Debug for Callback<A, R, Id>
where
    Id: ConnectionIdentity,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.registry.try_borrow() {
            Ok(registry) => f
                .debug_struct("Callback")
                .field("ids", &registry.raw_ids())
                .field("call_depth", &registry.frames().depth())
                .finish(),
            Err(_) => f.debug_struct("Callback").finish_non_exhaustive(),
        }
    }
}

// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! For more information on error types, see:
//!
//! 1. [Article](https://developerlife.com/2024/06/10/rust-miette-error-handling/)
//! 2. [Video](https://youtu.be/TmLF7vI8lKk)

use crate::ConnectionId;

/// Type alias to make it easy to work with:
/// 1. [`core::result::Result`]
/// 2. [`miette::Result`] and [`miette::Report`], which are [`std::error::Error`]
///    wrappers.
///
/// It is basically `miette::Result<T, miette::Report>`, and works hand in hand with
/// [`CallbackError`] and any other type of error.
pub type CommonResult<T> = miette::Result<T>;

/// Errors from setting up this crate's ambient services. Dispatch itself never fails
/// with this type: cancelling an unknown id is not an error, and listener failures are
/// reported as [`ListenerFailed`].
///
/// | Variant                     | When                                              |
/// | :-------------------------- | :------------------------------------------------ |
/// | [`TracingAlreadyInstalled`] | a global subscriber was installed before this one |
///
/// [`TracingAlreadyInstalled`]: Self::TracingAlreadyInstalled
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum CallbackError {
    /// [`crate::init_tracing()`] with [`crate::TracingScope::Global`] was called after
    /// some global subscriber (this crate's or anyone else's) was already set.
    #[error("A global tracing subscriber is already installed")]
    #[diagnostic(
        code(r3bl_callback::log::already_installed),
        help(
            "The global subscriber can only be set once per process. \
             Use `TracingScope::ThreadLocal` in tests."
        )
    )]
    TracingAlreadyInstalled(#[source] tracing_subscriber::util::TryInitError),
}

/// Returned by [`crate::Callback::try_call()`] when a listener returns [`Err`].
///
/// `id` is the failing registration's id as it was when the listener was invoked, even
/// if the listener cancelled itself before failing.
#[derive(Debug, thiserror::Error)]
#[error("Listener {id} failed, dispatch aborted")]
pub struct ListenerFailed<E> {
    pub id: ConnectionId,
    #[source]
    pub source: E,
}

// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The listener registry and its dispatch. [`Callback`] is the public entry point; the
//! other types are the building blocks it is made of, exported for anyone who wants to
//! build a different front end on top of the same reentrancy-safe storage.

/// Enable trace / debug events for slot bookkeeping and dispatch. These are only emitted
/// when a subscriber is installed (see [`crate::init_tracing()`]) and the level filter
/// lets them through.
pub const DEBUG_CALLBACK_DISPATCH: bool = true;

// Attach sources.
pub mod call_frame;
pub mod callback_impl;
pub mod id_allocator;
pub mod slot_registry;

// Re-export.
pub use call_frame::*;
pub use callback_impl::*;
pub use id_allocator::*;
pub use slot_registry::*;

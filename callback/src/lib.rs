// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! # r3bl_callback
//!
//! An ordered list of listener functions that are all invoked when the owning
//! [`Callback`] fires. It is built for event driven code where a listener's reaction to
//! an event is to change the very list that is being dispatched:
//!
//! - A listener can cancel any registration (including its own) mid dispatch. Listeners
//!   cancelled before their turn are skipped.
//! - A listener can add new listeners mid dispatch. They run later in the same pass.
//! - A listener can fire the same callback again. The nested dispatch completes before
//!   the outer one resumes.
//!
//! Everything is single threaded. Nothing is locked, and the types are `!Send`.
//!
//! # Registering and cancelling
//!
//! [`Callback::add()`] returns a [`Connection`], a small copyable handle that can cancel
//! the registration. Wrap it in a [`UniqueConnection`] to have it cancelled on drop.
//!
//! ```
//! use std::{cell::RefCell, rc::Rc};
//!
//! use r3bl_callback::{Callback, UniqueConnection};
//!
//! let on_save = Callback::<String>::new();
//! let saved = Rc::new(RefCell::new(vec![]));
//!
//! {
//!     let saved = saved.clone();
//!     let _guard = UniqueConnection::from(on_save.add(move |path| {
//!         saved.borrow_mut().push(path.clone());
//!     }));
//!     on_save.emit("a.txt".to_string());
//! }
//!
//! // The guard went out of scope, so this is not recorded.
//! on_save.emit("b.txt".to_string());
//! assert_eq!(*saved.borrow(), vec!["a.txt".to_string()]);
//! assert!(on_save.is_empty());
//! ```
//!
//! # Id flavors
//!
//! A [`Callback`] hands out plain [`ConnectionId`]s by default. A [`TrackedCallback`]
//! hands out [`TrackedConnectionId`]s instead, which share one cell with the registry
//! entry. When the registration goes away (through any handle, [`Callback::clear()`], or
//! the callback being dropped), every copy of a tracked id sees it immediately, without
//! asking the registry.
//!
//! # Logging
//!
//! Dispatch emits [`tracing`] events. Call [`init_tracing()`] with a [`TracingConfig`]
//! to see them.

// Enforce strict error handling in production library code only. Tests and examples are
// allowed to use .unwrap() (workspace `Cargo.toml` config allows it).
#![cfg_attr(not(test), deny(clippy::unwrap_in_result))]

// Attach modules (re-exported below to provide a flat public API).
pub mod callback;
pub mod common;
pub mod connection;
pub mod log;

// Re-export.
pub use callback::*;
pub use common::*;
pub use connection::*;
pub use log::*;

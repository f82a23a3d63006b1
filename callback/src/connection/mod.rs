// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Caller facing handles to a registration: the plain [`Connection`] value, the
//! [`UniqueConnection`] guard, the two id flavors, and the [`Cancelable`] trait that
//! lets any registry reuse them.

// Attach sources.
pub mod cancelable;
pub mod connection_handle;
pub mod connection_id;
pub mod unique_connection;

// Re-export.
pub use cancelable::*;
pub use connection_handle::*;
pub use connection_id::*;
pub use unique_connection::*;

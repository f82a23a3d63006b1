// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Opt-in [`tracing`] setup. The dispatch code emits `trace` / `debug` / `warn` events
//! (see [`crate::DEBUG_CALLBACK_DISPATCH`]); this module installs a subscriber that
//! displays them.

// Attach sources.
pub mod tracing_config;
pub mod tracing_init;

// Re-export.
pub use tracing_config::*;
pub use tracing_init::*;

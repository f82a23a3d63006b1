// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::num::NonZeroU64;

/// Issues strictly increasing, nonzero raw ids. Each registry owns its own allocator,
/// so ids from different registries must never be compared.
///
/// Ids are never handed out twice, even after the registration they named has been
/// cancelled.
#[derive(Debug, Default)]
pub struct IdAllocator {
    last_issued: Option<NonZeroU64>,
}

impl IdAllocator {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// # Panics
    ///
    /// Panics if all `u64::MAX` ids of this allocator have been issued.
    pub fn next_id(&mut self) -> NonZeroU64 {
        let next = match self.last_issued {
            None => NonZeroU64::MIN,
            Some(last) => last
                .checked_add(1)
                .unwrap_or_else(|| panic!("IdAllocator exhausted after {last} ids")),
        };
        self.last_issued = Some(next);
        next
    }
}

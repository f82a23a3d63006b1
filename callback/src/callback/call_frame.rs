// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Iteration state for every dispatch that is currently in flight on one registry.
//!
//! # Stack of cursors
//!
//! Each [`crate::Callback::call()`] pushes a [`CallFrame`] and pops it when it returns.
//! Because a nested call (a listener firing the same callback again) always finishes
//! before its caller resumes, the frames form a stack whose length equals the current
//! recursion depth. The frame at index `i - 1` is the parent of the frame at index `i`.
//!
//! A frame's cursor names the next slot that frame will visit. The registry keeps the
//! cursors valid while the list changes underneath them:
//!
//! | List change               | Cursor repair                                           |
//! | :------------------------ | :------------------------------------------------------ |
//! | slot `x` removed          | every frame whose cursor is `x` moves to `x`'s successor |
//! | slot appended at the tail | every exhausted frame (cursor `None`) moves to the new tail |
//! | anything else             | none                                                    |
//!
//! Repair walks from the innermost frame outward. It never touches the slot that a
//! frame is currently invoking, since a frame's cursor is advanced past a slot before
//! that slot's listener runs.

/// One in-flight dispatch. `cursor` is the raw id of the next slot to visit, or `None`
/// once the frame has run past the tail.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallFrame {
    pub cursor: Option<u64>,
}

/// Position of a frame in its [`CallFrameStack`]. Stays valid until that frame is
/// popped, since frames above it are always popped first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FrameIndex(pub usize);

#[derive(Debug, Default)]
pub struct CallFrameStack {
    frames: Vec<CallFrame>,
}

impl CallFrameStack {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Pushes a frame that will start visiting at `start`.
    pub fn push(&mut self, start: Option<u64>) -> FrameIndex {
        self.frames.push(CallFrame { cursor: start });
        FrameIndex(self.frames.len() - 1)
    }

    /// Pops the innermost frame.
    pub fn pop(&mut self) -> Option<CallFrame> { self.frames.pop() }

    /// Number of live frames, which is the current dispatch recursion depth.
    #[must_use]
    pub fn depth(&self) -> usize { self.frames.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.frames.is_empty() }

    #[must_use]
    pub fn cursor(&self, index: FrameIndex) -> Option<u64> {
        self.frames.get(index.0).and_then(|frame| frame.cursor)
    }

    pub fn set_cursor(&mut self, index: FrameIndex, cursor: Option<u64>) {
        if let Some(frame) = self.frames.get_mut(index.0) {
            frame.cursor = cursor;
        }
    }

    /// Redirects every frame that was about to visit `removed` to `successor`.
    /// Returns how many frames were repaired.
    pub fn repair_for_removal(&mut self, removed: u64, successor: Option<u64>) -> usize {
        let mut repaired = 0;
        for frame in self.frames.iter_mut().rev() {
            if frame.cursor == Some(removed) {
                frame.cursor = successor;
                repaired += 1;
            }
        }
        repaired
    }

    /// Points every exhausted frame at a slot that was just appended at the tail.
    /// Returns how many frames were resumed.
    pub fn resume_for_append(&mut self, appended: u64) -> usize {
        let mut resumed = 0;
        for frame in self.frames.iter_mut().rev() {
            if frame.cursor.is_none() {
                frame.cursor = Some(appended);
                resumed += 1;
            }
        }
        resumed
    }

    /// Cursors from the innermost frame outward.
    pub fn cursors(&self) -> impl Iterator<Item = Option<u64>> + '_ {
        self.frames.iter().rev().map(|frame| frame.cursor)
    }
}

// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Ordered, id addressed storage for registered listeners. See [`SlotRegistry`].

use rustc_hash::{FxBuildHasher, FxHashMap};

use super::{CallFrameStack, DEBUG_CALLBACK_DISPATCH, FrameIndex, IdAllocator};
use crate::ConnectionIdentity;

/// One registered listener. Linked to its neighbours by raw id.
#[derive(Debug)]
struct SlotNode<L, Id> {
    id: Id,
    listener: L,
    prev: Option<u64>,
    next: Option<u64>,
}

/// Owns every registered listener of one callback, in registration order, along with
/// the [`CallFrameStack`] of the dispatches currently walking it.
///
/// The list is a doubly linked list whose nodes live in an arena keyed by raw id, so
/// append, lookup, and removal are all O(1). The list only ever changes in two ways:
/// 1. [`Self::append()`] at the tail.
/// 2. [`Self::remove()`] of one id.
///
/// Both keep every frame cursor valid (see [`super::call_frame`]), which is what lets a
/// listener cancel or add registrations while one or more dispatches are in flight.
///
/// Nothing outside this registry holds a reference to a node. Handles only hold an id,
/// which is resolved here on every use.
#[derive(Debug)]
pub struct SlotRegistry<L, Id>
where
    Id: ConnectionIdentity,
{
    slots: FxHashMap<u64, SlotNode<L, Id>>,
    head: Option<u64>,
    tail: Option<u64>,
    id_allocator: IdAllocator,
    frames: CallFrameStack,
}

impl<L, Id> Default for SlotRegistry<L, Id>
where
    Id: ConnectionIdentity,
{
    fn default() -> Self { Self::with_capacity(0) }
}

impl<L, Id> SlotRegistry<L, Id>
where
    Id: ConnectionIdentity,
{
    #[must_use]
    pub fn new() -> Self { Self::default() }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: FxHashMap::with_capacity_and_hasher(capacity, FxBuildHasher),
            head: None,
            tail: None,
            id_allocator: IdAllocator::new(),
            frames: CallFrameStack::new(),
        }
    }

    /// Appends `listener` at the tail under a freshly issued id, and returns a copy of
    /// that id. Frames that already ran past the old tail will visit the new slot.
    pub fn append(&mut self, listener: L) -> Id {
        let raw = self.id_allocator.next_id();
        let id = Id::from_raw(raw);
        let raw = raw.get();

        match self.tail {
            Some(tail) => {
                if let Some(tail_node) = self.slots.get_mut(&tail) {
                    tail_node.next = Some(raw);
                }
            }
            None => self.head = Some(raw),
        }

        self.slots.insert(
            raw,
            SlotNode {
                id: id.clone(),
                listener,
                prev: self.tail,
                next: None,
            },
        );
        self.tail = Some(raw);

        let resumed = self.frames.resume_for_append(raw);

        if DEBUG_CALLBACK_DISPATCH {
            // % is Display, ? is Debug.
            tracing::trace!(
                message = "slot appended",
                id = raw,
                len = self.slots.len(),
                resumed_frames = resumed,
            );
        }

        id
    }

    /// Removes the slot named by `id` and returns its listener, or `None` if there is no
    /// live slot with that id. The slot must hold an id equal to `id`, so a tracked id
    /// issued by another registry never matches here, even when the raw values collide.
    ///
    /// Before the node is unlinked, every active frame whose cursor targets it is moved
    /// on to its successor. The slot's own id is invalidated, which for tracked ids is
    /// seen by every handle sharing it.
    ///
    /// The listener is handed back instead of dropped here, so that the caller can drop
    /// it after releasing any borrow of this registry.
    pub fn remove(&mut self, id: &Id) -> Option<L> {
        if !self.contains(id) {
            return None;
        }
        let raw = id.raw();
        let mut node = self.slots.remove(&raw)?;

        let repaired = self.frames.repair_for_removal(raw, node.next);

        match node.prev {
            Some(prev) => {
                if let Some(prev_node) = self.slots.get_mut(&prev) {
                    prev_node.next = node.next;
                }
            }
            None => self.head = node.next,
        }
        match node.next {
            Some(next) => {
                if let Some(next_node) = self.slots.get_mut(&next) {
                    next_node.prev = node.prev;
                }
            }
            None => self.tail = node.prev,
        }

        node.id.reset();

        if DEBUG_CALLBACK_DISPATCH {
            tracing::trace!(
                message = "slot removed",
                id = raw,
                len = self.slots.len(),
                repaired_frames = repaired,
                depth = self.frames.depth(),
            );
        }

        Some(node.listener)
    }

    /// Removes every slot, head first, repairing frames exactly as [`Self::remove()`]
    /// does. Returns the listeners (in registration order) for the caller to drop.
    pub fn remove_all(&mut self) -> Vec<L> {
        let mut removed = Vec::with_capacity(self.slots.len());
        while let Some(head) = self.head {
            let Some(id) = self.slots.get(&head).map(|node| node.id.clone()) else {
                break;
            };
            match self.remove(&id) {
                Some(listener) => removed.push(listener),
                None => break,
            }
        }
        removed
    }

    /// Captures the slot that the frame at `index` should visit next, and advances that
    /// frame's cursor past it *before* returning. Returns `None` when the frame is
    /// exhausted.
    ///
    /// Advancing first is what makes it safe for the listener that is about to run to
    /// cancel itself, cancel the slot after it, or start a nested dispatch.
    pub fn advance(&mut self, index: FrameIndex) -> Option<(Id, L)>
    where
        L: Clone,
    {
        let cursor = self.frames.cursor(index)?;
        let node = self.slots.get(&cursor)?;
        self.frames.set_cursor(index, node.next);
        Some((node.id.clone(), node.listener.clone()))
    }

    /// Pushes a frame that starts at the current head.
    pub fn push_frame(&mut self) -> FrameIndex { self.frames.push(self.head) }

    pub fn pop_frame(&mut self) { self.frames.pop(); }

    #[must_use]
    pub fn frames(&self) -> &CallFrameStack { &self.frames }

    /// True if a live slot holds an id equal to `id`. Matching the raw value alone is not
    /// enough: tracked ids are only equal when they share the same cell.
    #[must_use]
    pub fn contains(&self, id: &Id) -> bool {
        let raw = id.raw();
        raw != 0 && self.slots.get(&raw).is_some_and(|node| node.id == *id)
    }

    #[must_use]
    pub fn len(&self) -> usize { self.slots.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.slots.is_empty() }

    /// Raw ids of the live slots in registration order.
    #[must_use]
    pub fn raw_ids(&self) -> Vec<u64> {
        let mut ids = Vec::with_capacity(self.slots.len());
        let mut cursor = self.head;
        while let Some(raw) = cursor {
            ids.push(raw);
            cursor = self.slots.get(&raw).and_then(|node| node.next);
        }
        ids
    }
}

impl<L, Id> Drop for SlotRegistry<L, Id>
where
    Id: ConnectionIdentity,
{
    /// Invalidates every remaining id. Listeners are dropped without being invoked.
    fn drop(&mut self) {
        for node in self.slots.values_mut() {
            node.id.reset();
        }
    }
}

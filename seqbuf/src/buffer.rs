// Copyright (C) 2025 Category Labs, Inc.
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

use std::collections::VecDeque;

use crate::slot::SequencedSlot;
use crate::sync::{lock, Mutex};
use crate::{Item, SeqBufError};

/// Result of a single [`BoundedOrderedBuffer::try_push`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// Appended; the expected sequence number moved past the item.
    Accepted,
    /// Some predecessor of the item has not been accepted yet.
    RejectedNotNext,
    /// The item is next in sequence but there is no room for it.
    RejectedFull,
}

/// Result of a single [`BoundedOrderedBuffer::try_pop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopOutcome {
    Popped(Item),
    /// Nothing buffered, but more items are still to come.
    EmptyNotDone,
    /// Nothing buffered and every item has already been accepted.
    EmptyDone,
}

struct BufferState {
    items: VecDeque<Item>,
    high_water: usize,
}

/// Fixed-capacity FIFO that only ever accepts the next expected item.
///
/// Contents and length share one lock; the expected sequence number lives in
/// its own [`SequencedSlot`]. Lock order is always buffer before slot.
pub struct BoundedOrderedBuffer {
    state: Mutex<BufferState>,
    slot: SequencedSlot,
    capacity: usize,
    total: Item,
}

impl BoundedOrderedBuffer {
    /// Buffer holding at most `capacity` items out of `0..total`.
    pub fn new(capacity: usize, total: Item) -> Result<Self, SeqBufError> {
        if capacity == 0 {
            return Err(SeqBufError::ZeroCapacity);
        }
        Ok(BoundedOrderedBuffer {
            state: Mutex::new(BufferState {
                items: VecDeque::with_capacity(capacity),
                high_water: 0,
            }),
            slot: SequencedSlot::new(),
            capacity,
            total,
        })
    }

    pub fn try_push(&self, item: Item) -> PushOutcome {
        let mut state = lock(&self.state, "buffer lock poisoned");
        let mut slot = self.slot.claim();

        let expected = slot.expected();
        if item != expected {
            crate::seq_trace!(item = item, expected = expected, "push rejected: not next");
            assert!(item > expected, "item {item} pushed twice");
            return PushOutcome::RejectedNotNext;
        }

        if state.items.len() == self.capacity {
            crate::seq_trace!(item = item, len = state.items.len(), "push rejected: full");
            return PushOutcome::RejectedFull;
        }

        state.items.push_back(item);
        state.high_water = state.high_water.max(state.items.len());
        slot.advance();

        crate::seq_trace!(item = item, len = state.items.len(), "push accepted");
        PushOutcome::Accepted
    }

    pub fn try_pop(&self) -> PopOutcome {
        let mut state = lock(&self.state, "buffer lock poisoned");

        if let Some(item) = state.items.pop_front() {
            crate::seq_trace!(item = item, len = state.items.len(), "pop");
            return PopOutcome::Popped(item);
        }

        if self.slot.expected() == self.total {
            PopOutcome::EmptyDone
        } else {
            PopOutcome::EmptyNotDone
        }
    }

    pub fn len(&self) -> usize {
        lock(&self.state, "buffer lock poisoned").items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Largest length observed after any push.
    pub fn high_water(&self) -> usize {
        lock(&self.state, "buffer lock poisoned").high_water
    }

    pub fn expected(&self) -> Item {
        self.slot.expected()
    }
}

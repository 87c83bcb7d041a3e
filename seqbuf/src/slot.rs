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

use crate::sync::{lock, Mutex, MutexGuard};
use crate::Item;

/// The next item number the buffer will accept.
///
/// Guarded by its own lock, separate from the buffer contents. Only ever
/// moves forward, by exactly one per accepted item.
pub struct SequencedSlot {
    expected: Mutex<Item>,
}

impl SequencedSlot {
    pub fn new() -> Self {
        SequencedSlot {
            expected: Mutex::new(0),
        }
    }

    pub fn expected(&self) -> Item {
        *lock(&self.expected, "sequence slot lock poisoned")
    }

    /// Holds the slot for a check-then-advance under the caller's buffer lock.
    pub(crate) fn claim(&self) -> SlotClaim<'_> {
        SlotClaim(lock(&self.expected, "sequence slot lock poisoned"))
    }
}

impl Default for SequencedSlot {
    fn default() -> Self {
        SequencedSlot::new()
    }
}

pub(crate) struct SlotClaim<'a>(MutexGuard<'a, Item>);

impl SlotClaim<'_> {
    pub(crate) fn expected(&self) -> Item {
        *self.0
    }

    pub(crate) fn advance(&mut self) {
        *self.0 += 1;
    }
}

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

//! Condition-variable gates used to park producers and the consumer.
//!
//! A [`BroadcastGate`] wakes everyone parked on it and latches its predicate,
//! so a signal sent before the waiter arrives is not lost. A
//! [`TargetedGate`] belongs to a single producer and only wakes it for the
//! exact item it is waiting on.

use crate::sync::{lock, wait, Condvar, Mutex};
use crate::Item;

pub struct BroadcastGate {
    ready: Mutex<bool>,
    condvar: Condvar,
}

impl BroadcastGate {
    pub fn new() -> Self {
        BroadcastGate {
            ready: Mutex::new(false),
            condvar: Condvar::new(),
        }
    }

    /// Block until signalled, then clear the predicate.
    pub fn wait(&self) {
        let mut ready = lock(&self.ready, "broadcast gate lock poisoned");
        while !*ready {
            ready = wait(&self.condvar, ready, "broadcast gate wait failed");
        }
        *ready = false;
    }

    pub fn signal(&self) {
        let mut ready = lock(&self.ready, "broadcast gate lock poisoned");
        *ready = true;
        self.condvar.notify_all();
    }
}

impl Default for BroadcastGate {
    fn default() -> Self {
        BroadcastGate::new()
    }
}

#[derive(Default)]
struct TargetState {
    blocked_on: Option<Item>,
    ready: bool,
    /// Highest value ever passed to `notify`.
    latest: Option<Item>,
    wakes: u64,
    spurious: u64,
}

impl TargetState {
    fn passed(&self, value: Item) -> bool {
        self.latest.is_some_and(|latest| latest >= value)
    }
}

/// Per-producer gate that only wakes for one specific item.
pub struct TargetedGate {
    state: Mutex<TargetState>,
    condvar: Condvar,
}

impl TargetedGate {
    pub fn new() -> Self {
        TargetedGate {
            state: Mutex::new(TargetState::default()),
            condvar: Condvar::new(),
        }
    }

    /// Block until `notify(value)` is called.
    ///
    /// Returns immediately if `value` (or anything after it) was already
    /// notified, since accepted items only ever increase.
    pub fn wait_for(&self, value: Item) {
        let mut state = lock(&self.state, "targeted gate lock poisoned");
        if state.passed(value) {
            return;
        }

        state.blocked_on = Some(value);
        loop {
            state = wait(&self.condvar, state, "targeted gate wait failed");
            if state.ready {
                break;
            }
            state.spurious += 1;
            if state.passed(value) {
                break;
            }
        }

        state.ready = false;
        state.blocked_on = None;
        state.wakes += 1;
    }

    /// Record `value` as accepted and wake the owner if it waits on exactly it.
    ///
    /// Returns whether the owner was woken.
    pub fn notify(&self, value: Item) -> bool {
        let mut state = lock(&self.state, "targeted gate lock poisoned");
        state.latest = Some(state.latest.map_or(value, |latest| latest.max(value)));

        if state.blocked_on != Some(value) {
            return false;
        }

        crate::seq_trace!(value = value, "targeted gate woken");
        state.ready = true;
        self.condvar.notify_one();
        true
    }

    /// The item the owner is currently parked on, if any.
    pub fn blocked_on(&self) -> Option<Item> {
        lock(&self.state, "targeted gate lock poisoned").blocked_on
    }

    pub fn wakes(&self) -> u64 {
        lock(&self.state, "targeted gate lock poisoned").wakes
    }

    /// Returns from the condition wait that found nothing addressed to us.
    pub fn spurious_wakes(&self) -> u64 {
        lock(&self.state, "targeted gate lock poisoned").spurious
    }
}

impl Default for TargetedGate {
    fn default() -> Self {
        TargetedGate::new()
    }
}

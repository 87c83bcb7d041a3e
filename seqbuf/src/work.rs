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

use std::time::Duration;

use rand::Rng;

use crate::Item;

/// The per-item work a producer or the consumer performs.
///
/// Always called outside every pipeline lock.
pub trait Work: Send + Sync {
    fn perform(&self, item: Item);
}

/// Sleeps for a uniformly random duration in `[0, bound)`.
#[derive(Debug, Clone, Copy)]
pub struct RandomDelay {
    bound: Duration,
}

impl RandomDelay {
    pub fn new(bound: Duration) -> Self {
        RandomDelay { bound }
    }
}

impl Work for RandomDelay {
    fn perform(&self, _item: Item) {
        let bound = self.bound.as_nanos() as u64;
        if bound == 0 {
            return;
        }
        let nanos = rand::thread_rng().gen_range(0..bound);
        std::thread::sleep(Duration::from_nanos(nanos));
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoWork;

impl Work for NoWork {
    fn perform(&self, _item: Item) {}
}

impl<F> Work for F
where
    F: Fn(Item) + Send + Sync,
{
    fn perform(&self, item: Item) {
        self(item)
    }
}

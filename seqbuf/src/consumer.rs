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

use tracing::debug;

use crate::pipeline::Pipeline;
use crate::work::Work;
use crate::Item;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumerState {
    Popping,
    Working(Item),
    Terminated,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsumerStats {
    pub consumed: u64,
    pub empty_waits: u64,
}

/// The single consumer: drains the buffer in sequence order.
pub struct Consumer<'a, W: ?Sized> {
    pipeline: &'a Pipeline,
    work: &'a W,
}

impl<'a, W: Work + ?Sized> Consumer<'a, W> {
    pub fn new(pipeline: &'a Pipeline, work: &'a W) -> Self {
        Consumer { pipeline, work }
    }

    /// Hand every item to `sink` in order, then return once all are consumed.
    pub fn run<F: FnMut(Item)>(self, mut sink: F) -> ConsumerStats {
        let mut stats = ConsumerStats::default();
        let mut state = ConsumerState::Popping;

        loop {
            state = match state {
                ConsumerState::Popping => {
                    debug!("consumer receiving");
                    let (item, waits) = self.pipeline.receive();
                    stats.empty_waits += waits;
                    match item {
                        Some(item) => {
                            stats.consumed += 1;
                            sink(item);
                            ConsumerState::Working(item)
                        }
                        None => ConsumerState::Terminated,
                    }
                }
                ConsumerState::Working(item) => {
                    debug!(item = item, "consumer working");
                    self.work.perform(item);
                    ConsumerState::Popping
                }
                ConsumerState::Terminated => break,
            };
        }

        debug!(consumed = stats.consumed, "consumer finished");
        stats
    }
}

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

use crate::{Item, SeqBufError};

pub const DEFAULT_ITEMS: Item = 100;
pub const DEFAULT_PRODUCERS: usize = 4;
pub const DEFAULT_CAPACITY: usize = 5;
pub const DEFAULT_WORK: Duration = Duration::from_micros(100);

/// Fixed parameters of a single pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Total item count `N`; items are `0..N`.
    pub items: Item,
    /// Producer thread count `P`.
    pub producers: usize,
    /// Buffer capacity `C`.
    pub capacity: usize,
    /// Upper bound of the random delay a producer spends per item.
    pub producer_work: Duration,
    /// Upper bound of the random delay the consumer spends per item.
    pub consumer_work: Duration,
    /// Seed for the job dispenser. `None` draws one from the OS.
    pub seed: Option<u64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            items: DEFAULT_ITEMS,
            producers: DEFAULT_PRODUCERS,
            capacity: DEFAULT_CAPACITY,
            producer_work: DEFAULT_WORK,
            consumer_work: DEFAULT_WORK,
            seed: None,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), SeqBufError> {
        if self.items == 0 {
            return Err(SeqBufError::NoItems);
        }
        if self.producers == 0 {
            return Err(SeqBufError::NoProducers);
        }
        if self.capacity == 0 {
            return Err(SeqBufError::ZeroCapacity);
        }
        Ok(())
    }
}

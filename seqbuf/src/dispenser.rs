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

//! Hands out item numbers to producers.
//!
//! The only hard requirement on dispatch order is liveness: with `P`
//! producers, item `c - P` must have been handed out by the `c`-th call.
//! Otherwise every producer could end up parked behind a predecessor that
//! nobody holds.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::sync::{lock, Mutex};
use crate::{Item, SeqBufError};

/// Source of item numbers for producers. `None` means no work is left.
pub trait JobSource: Send + Sync {
    fn next_job(&self) -> Option<Item>;
}

struct Ledger {
    issued: Vec<bool>,
    counter: u64,
    rng: StdRng,
}

/// Deadlock-avoiding dispenser of `0..items`, each exactly once.
pub struct JobDispenser {
    ledger: Mutex<Ledger>,
    items: Item,
    producers: u64,
}

impl JobDispenser {
    pub fn new(items: Item, producers: usize, seed: Option<u64>) -> Result<Self, SeqBufError> {
        if producers == 0 {
            return Err(SeqBufError::NoProducers);
        }
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(JobDispenser {
            ledger: Mutex::new(Ledger {
                issued: vec![false; items as usize],
                counter: 0,
                rng,
            }),
            items,
            producers: producers as u64,
        })
    }

    /// Number of items handed out so far.
    pub fn issued(&self) -> u64 {
        let ledger = lock(&self.ledger, "dispenser lock poisoned");
        ledger.counter.min(self.items)
    }

    fn pick(&self, ledger: &mut Ledger) -> Item {
        let n = self.items;
        let p = self.producers;
        let c = ledger.counter;

        let mut found = if c < p {
            // any item will do; bias towards low numbers
            (ledger.rng.gen_range(0..2 * p)) % n
        } else {
            let forced = c - p;
            if ledger.issued[forced as usize] {
                (c + ledger.rng.gen_range(0..p)) % n
            } else {
                forced
            }
        };

        if ledger.issued[found as usize] {
            found = ledger
                .issued
                .iter()
                .position(|issued| !issued)
                .expect("fewer than `items` calls leave an unissued item") as Item;
        }
        found
    }
}

impl JobSource for JobDispenser {
    fn next_job(&self) -> Option<Item> {
        let mut ledger = lock(&self.ledger, "dispenser lock poisoned");

        ledger.counter += 1;
        if ledger.counter > self.items {
            return None;
        }

        let found = self.pick(&mut ledger);
        assert!(!ledger.issued[found as usize], "item {found} dispatched twice");
        ledger.issued[found as usize] = true;

        debug!(item = found, counter = ledger.counter, "dispatched item");
        Some(found)
    }
}

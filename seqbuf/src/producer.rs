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

use crate::dispenser::JobSource;
use crate::gate::TargetedGate;
use crate::pipeline::Pipeline;
use crate::work::Work;
use crate::{Item, SeqBufError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProducerState {
    Fetching,
    Working(Item),
    Pushing(Item),
    Terminated,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProducerStats {
    pub index: usize,
    pub produced: u64,
    pub rejected_not_next: u64,
    pub rejected_full: u64,
}

/// One producer worker: fetch an item, work on it, push it in order.
pub struct Producer<'a, J: ?Sized, W: ?Sized> {
    index: usize,
    gate: &'a TargetedGate,
    pipeline: &'a Pipeline,
    jobs: &'a J,
    work: &'a W,
}

impl<'a, J, W> Producer<'a, J, W>
where
    J: JobSource + ?Sized,
    W: Work + ?Sized,
{
    pub fn new(
        index: usize,
        pipeline: &'a Pipeline,
        jobs: &'a J,
        work: &'a W,
    ) -> Result<Self, SeqBufError> {
        let gate = pipeline.targeted_gate(index)?;
        Ok(Producer {
            index,
            gate,
            pipeline,
            jobs,
            work,
        })
    }

    /// Drive the worker loop until the job source runs dry.
    pub fn run(self) -> ProducerStats {
        let mut stats = ProducerStats {
            index: self.index,
            ..Default::default()
        };

        let mut state = ProducerState::Fetching;
        while state != ProducerState::Terminated {
            state = self.step(state, &mut stats);
        }

        debug!(producer = self.index, produced = stats.produced, "producer finished");
        stats
    }

    fn step(&self, state: ProducerState, stats: &mut ProducerStats) -> ProducerState {
        match state {
            ProducerState::Fetching => {
                debug!(producer = self.index, "producer getting item");
                match self.jobs.next_job() {
                    Some(item) => ProducerState::Working(item),
                    None => ProducerState::Terminated,
                }
            }
            ProducerState::Working(item) => {
                debug!(producer = self.index, item = item, "producer working");
                self.work.perform(item);
                ProducerState::Pushing(item)
            }
            ProducerState::Pushing(item) => {
                debug!(producer = self.index, item = item, "producer submitting");
                let rejections = self.pipeline.submit(self.gate, item);
                stats.produced += 1;
                stats.rejected_not_next += rejections.not_next;
                stats.rejected_full += rejections.full;
                debug!(
                    producer = self.index,
                    item = item,
                    not_next = rejections.not_next,
                    full = rejections.full,
                    "producer submitted"
                );
                ProducerState::Fetching
            }
            ProducerState::Terminated => ProducerState::Terminated,
        }
    }
}

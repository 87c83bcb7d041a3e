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

use crossbeam::utils::CachePadded;
use tracing::debug;

use crate::buffer::{BoundedOrderedBuffer, PopOutcome, PushOutcome};
use crate::gate::{BroadcastGate, TargetedGate};
use crate::{Item, SeqBufError};

/// How often a single submission was turned away before it was accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rejections {
    pub not_next: u64,
    pub full: u64,
}

/// Shared context of one run: the buffer and every gate around it.
///
/// Handed by reference to each producer and the consumer for the lifetime
/// of the run.
pub struct Pipeline {
    buffer: BoundedOrderedBuffer,
    non_empty: BroadcastGate,
    non_full: BroadcastGate,
    targeted: Box<[CachePadded<TargetedGate>]>,
}

impl Pipeline {
    pub fn new(items: Item, producers: usize, capacity: usize) -> Result<Self, SeqBufError> {
        if items == 0 {
            return Err(SeqBufError::NoItems);
        }
        if producers == 0 {
            return Err(SeqBufError::NoProducers);
        }

        Ok(Pipeline {
            buffer: BoundedOrderedBuffer::new(capacity, items)?,
            non_empty: BroadcastGate::new(),
            non_full: BroadcastGate::new(),
            targeted: (0..producers)
                .map(|_| CachePadded::new(TargetedGate::new()))
                .collect(),
        })
    }

    pub fn buffer(&self) -> &BoundedOrderedBuffer {
        &self.buffer
    }

    pub fn producers(&self) -> usize {
        self.targeted.len()
    }

    pub fn targeted_gate(&self, producer: usize) -> Result<&TargetedGate, SeqBufError> {
        self.targeted
            .get(producer)
            .map(|gate| &**gate)
            .ok_or(SeqBufError::ProducerOutOfRange {
                index: producer,
                producers: self.targeted.len(),
            })
    }

    /// One push attempt. On acceptance wakes the consumer and whichever
    /// producer is parked on `item`.
    pub fn push(&self, item: Item) -> PushOutcome {
        let outcome = self.buffer.try_push(item);
        if outcome == PushOutcome::Accepted {
            self.non_empty.signal();
            for gate in self.targeted.iter() {
                gate.notify(item);
            }
        }
        outcome
    }

    /// Push `item` on behalf of `producer`, parking between attempts until
    /// it is accepted.
    pub(crate) fn submit(&self, producer: &TargetedGate, item: Item) -> Rejections {
        let mut rejections = Rejections::default();
        loop {
            match self.push(item) {
                PushOutcome::Accepted => {
                    debug!(item = item, "push accepted");
                    return rejections;
                }
                PushOutcome::RejectedNotNext => {
                    debug!(
                        item = item,
                        expected = self.buffer.expected(),
                        "push rejected, not next"
                    );
                    rejections.not_next += 1;
                    let predecessor = item
                        .checked_sub(1)
                        .expect("item 0 is always next until accepted");
                    producer.wait_for(predecessor);
                }
                PushOutcome::RejectedFull => {
                    debug!(item = item, "push rejected, buffer full");
                    rejections.full += 1;
                    self.non_full.wait();
                }
            }
        }
    }

    /// One pop attempt. Frees a slot for a producer blocked on a full buffer.
    pub fn pop(&self) -> PopOutcome {
        let outcome = self.buffer.try_pop();
        if let PopOutcome::Popped(_) = outcome {
            self.non_full.signal();
        }
        outcome
    }

    /// Next item in sequence, blocking while the buffer is empty. `None`
    /// once every item has been delivered.
    ///
    /// Also returns how many times it had to park.
    pub(crate) fn receive(&self) -> (Option<Item>, u64) {
        let mut waits = 0;
        loop {
            match self.pop() {
                PopOutcome::Popped(item) => return (Some(item), waits),
                PopOutcome::EmptyDone => return (None, waits),
                PopOutcome::EmptyNotDone => {
                    debug!(waits = waits, "buffer empty, consumer waiting");
                    waits += 1;
                    self.non_empty.wait();
                }
            }
        }
    }

    /// Sum of wakes and spurious wakes across all targeted gates.
    pub fn targeted_wakes(&self) -> (u64, u64) {
        self.targeted.iter().fold((0, 0), |(wakes, spurious), gate| {
            (wakes + gate.wakes(), spurious + gate.spurious_wakes())
        })
    }
}

#[cfg(all(test, not(feature = "loom")))]
mod tests {
    use super::*;
    use rstest::*;
    use std::io;
    use std::sync::{Arc, Mutex};
    use std::thread;
    use std::time::Duration;

    #[rstest]
    #[case(0, 1, 1, SeqBufError::NoItems)]
    #[case(1, 0, 1, SeqBufError::NoProducers)]
    #[case(1, 1, 0, SeqBufError::ZeroCapacity)]
    fn test_rejects_degenerate(
        #[case] items: Item,
        #[case] producers: usize,
        #[case] capacity: usize,
        #[case] expected: SeqBufError,
    ) {
        assert_eq!(Pipeline::new(items, producers, capacity).err(), Some(expected));
    }

    #[rstest]
    fn test_gate_index_checked() {
        let pipeline = Pipeline::new(4, 2, 1).unwrap();
        assert!(pipeline.targeted_gate(1).is_ok());
        assert_eq!(
            pipeline.targeted_gate(2).err(),
            Some(SeqBufError::ProducerOutOfRange {
                index: 2,
                producers: 2
            })
        );
    }

    #[rstest]
    fn test_push_wakes_waiting_predecessor_chain() {
        let pipeline = Pipeline::new(3, 2, 3).unwrap();

        thread::scope(|s| {
            let waiter = s.spawn(|| {
                let gate = pipeline.targeted_gate(1).unwrap();
                pipeline.submit(gate, 1)
            });

            while pipeline.targeted_gate(1).unwrap().blocked_on() != Some(0) {
                thread::yield_now();
            }
            assert_eq!(pipeline.push(0), PushOutcome::Accepted);

            let rejections = waiter.join().unwrap();
            assert_eq!(rejections, Rejections { not_next: 1, full: 0 });
        });

        assert_eq!(pipeline.buffer().expected(), 2);
        assert_eq!(pipeline.targeted_wakes(), (1, 0));
    }

    #[rstest]
    fn test_full_buffer_backpressure() {
        // N = 3, C = 1: the holder of item 1 waits until item 0 is popped
        let pipeline = Pipeline::new(3, 2, 1).unwrap();
        assert_eq!(pipeline.push(0), PushOutcome::Accepted);

        thread::scope(|s| {
            let holder = s.spawn(|| {
                let gate = pipeline.targeted_gate(0).unwrap();
                pipeline.submit(gate, 1)
            });

            thread::sleep(Duration::from_millis(20));
            assert!(!holder.is_finished());
            assert_eq!(pipeline.buffer().len(), 1);
            assert_eq!(pipeline.buffer().expected(), 1);

            assert_eq!(pipeline.receive(), (Some(0), 0));
            let rejections = holder.join().unwrap();
            assert!(rejections.full >= 1);
            assert_eq!(rejections.not_next, 0);
        });

        assert_eq!(pipeline.pop(), PopOutcome::Popped(1));
        assert_eq!(pipeline.buffer().high_water(), 1);
    }

    #[rstest]
    fn test_receive_reports_done() {
        let pipeline = Pipeline::new(1, 1, 1).unwrap();
        assert_eq!(pipeline.push(0), PushOutcome::Accepted);
        assert_eq!(pipeline.receive(), (Some(0), 0));
        assert_eq!(pipeline.receive(), (None, 0));
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[rstest]
    fn test_submit_logs_each_attempt() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let pipeline = Pipeline::new(2, 2, 2).unwrap();
        thread::scope(|s| {
            s.spawn(|| {
                while pipeline.targeted_gate(1).unwrap().blocked_on() != Some(0) {
                    thread::yield_now();
                }
                assert_eq!(pipeline.push(0), PushOutcome::Accepted);
            });

            tracing::subscriber::with_default(subscriber, || {
                let gate = pipeline.targeted_gate(1).unwrap();
                assert_eq!(pipeline.submit(gate, 1).not_next, 1);
            });
        });

        let logs = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(logs.contains("push rejected, not next"), "logs: {logs}");
        assert!(logs.contains("push accepted"), "logs: {logs}");
    }
}

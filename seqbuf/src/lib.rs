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

//! # seqbuf - Ordered Multi-Producer Single-Consumer Buffer
//!
//! Producers finish work on items `0..N` in any order; the consumer sees
//! them strictly in ascending order. A bounded buffer only accepts the next
//! expected item, producers that are ahead park on their own gate until
//! their predecessor lands, and a full buffer pushes back on the producer
//! holding the next item until the consumer makes room.
//!
//! Everything is built from `Mutex` + `Condvar`; there are no lock-free
//! structures and no async runtime.
//!
//! ## Running a Pipeline
//!
//! ```rust
//! use seqbuf::PipelineConfig;
//! use std::time::Duration;
//!
//! let config = PipelineConfig {
//!     items: 20,
//!     producers: 3,
//!     capacity: 2,
//!     producer_work: Duration::from_micros(50),
//!     consumer_work: Duration::from_micros(50),
//!     seed: Some(7),
//! };
//!
//! let mut consumed = Vec::new();
//! let report = seqbuf::run(&config, |item| consumed.push(item))?;
//!
//! assert_eq!(consumed, (0..20).collect::<Vec<_>>());
//! assert!(report.high_water <= 2);
//! # Ok::<(), seqbuf::SeqBufError>(())
//! ```
//!
//! ## Driving the Pieces Directly
//!
//! [`Pipeline`] is the shared context. Producers and the consumer borrow it
//! for the duration of a run; [`run_with`] accepts any [`JobSource`] and
//! [`Work`] so dispatch order and per-item work can be scripted.
//!
//! ```rust
//! use seqbuf::{JobDispenser, NoWork, Pipeline};
//!
//! let pipeline = Pipeline::new(10, 2, 1)?;
//! let jobs = JobDispenser::new(10, 2, Some(1))?;
//!
//! let mut consumed = Vec::new();
//! seqbuf::run_with(&pipeline, &jobs, &NoWork, &NoWork, |item| consumed.push(item));
//! assert_eq!(consumed, (0..10).collect::<Vec<_>>());
//! # Ok::<(), seqbuf::SeqBufError>(())
//! ```
//!
//! ## Single Pushes and Pops
//!
//! ```rust
//! use seqbuf::{Pipeline, PopOutcome, PushOutcome};
//!
//! let pipeline = Pipeline::new(3, 1, 1)?;
//!
//! assert_eq!(pipeline.push(1), PushOutcome::RejectedNotNext);
//! assert_eq!(pipeline.push(0), PushOutcome::Accepted);
//! assert_eq!(pipeline.push(1), PushOutcome::RejectedFull);
//! assert_eq!(pipeline.pop(), PopOutcome::Popped(0));
//! assert_eq!(pipeline.push(1), PushOutcome::Accepted);
//! # Ok::<(), seqbuf::SeqBufError>(())
//! ```
//!
//! ## Failure Model
//!
//! Locking never returns an error to the caller. A poisoned lock, a worker
//! that cannot be spawned, or a panic inside a worker aborts the process
//! after logging the cause, since the remaining roles would otherwise wait
//! forever.

pub use buffer::{BoundedOrderedBuffer, PopOutcome, PushOutcome};
pub use config::PipelineConfig;
pub use consumer::{Consumer, ConsumerState, ConsumerStats};
pub use dispenser::{JobDispenser, JobSource};
pub use error::SeqBufError;
pub use gate::{BroadcastGate, TargetedGate};
pub use pipeline::{Pipeline, Rejections};
pub use producer::{Producer, ProducerState, ProducerStats};
pub use runner::{run, run_with, RunReport};
pub use slot::SequencedSlot;
pub use work::{NoWork, RandomDelay, Work};

pub mod buffer;
pub mod config;
pub mod consumer;
pub mod dispenser;
pub mod error;
pub mod gate;
#[cfg(all(test, feature = "loom"))]
pub(crate) mod loom;
pub mod pipeline;
pub mod producer;
pub mod runner;
pub mod slot;
pub(crate) mod sync;
mod trace_macro;
pub mod work;

/// An item number. Items are delivered to the consumer in ascending order.
pub type Item = u64;

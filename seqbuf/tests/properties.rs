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

#![cfg(not(feature = "loom"))]

use rstest::rstest;
use seqbuf::{
    run, run_with, Item, JobDispenser, JobSource, NoWork, Pipeline, PipelineConfig, PopOutcome,
    Producer, RandomDelay, RunReport,
};
use std::collections::VecDeque;
use std::sync::{mpsc, Mutex};
use std::thread;
use std::time::Duration;

const WATCHDOG: Duration = Duration::from_secs(30);

fn config(items: Item, producers: usize, capacity: usize, seed: u64) -> PipelineConfig {
    PipelineConfig {
        items,
        producers,
        capacity,
        producer_work: Duration::from_micros(100),
        consumer_work: Duration::from_micros(100),
        seed: Some(seed),
    }
}

/// Run to completion on a helper thread, failing the test if it stalls.
fn run_with_watchdog(config: PipelineConfig) -> (Vec<Item>, RunReport) {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut consumed = Vec::new();
        let report = run(&config, |item| consumed.push(item)).expect("valid config");
        let _ = tx.send((consumed, report));
    });
    rx.recv_timeout(WATCHDOG)
        .expect("pipeline stalled: producers or consumer never terminated")
}

#[rstest]
#[case::single_everything(1, 1, 1)]
#[case::single_producer(25, 1, 1)]
#[case::default_shape(100, 4, 5)]
#[case::tight_buffer(60, 8, 1)]
#[case::wide_buffer(60, 3, 64)]
#[case::more_producers_than_items(5, 16, 2)]
fn test_order_preserved(#[case] items: Item, #[case] producers: usize, #[case] capacity: usize) {
    for seed in 0..3 {
        let (consumed, report) = run_with_watchdog(config(items, producers, capacity, seed));

        assert_eq!(consumed, (0..items).collect::<Vec<_>>(), "seed {seed}");
        assert_eq!(report.produced(), items);
        assert_eq!(report.consumer.consumed, items);
        assert!(report.high_water <= capacity);
    }
}

#[rstest]
fn test_buffer_bound_observed_by_consumer() {
    let capacity = 2;
    let pipeline = Pipeline::new(200, 6, capacity).unwrap();
    let jobs = JobDispenser::new(200, 6, Some(5)).unwrap();
    let producer_work = RandomDelay::new(Duration::from_micros(50));
    let check = |_item: Item| {
        assert!(pipeline.buffer().len() <= capacity);
    };

    let mut consumed = Vec::new();
    let report = run_with(&pipeline, &jobs, &producer_work, &check, |item| {
        consumed.push(item)
    });

    assert_eq!(consumed.len(), 200);
    assert!(report.high_water <= capacity);
}

#[rstest]
fn test_deadlock_boundary_scenario() {
    // N = 6, P = 3, C = 2 across many dispatch orders
    for seed in 0..100 {
        let dispenser = JobDispenser::new(6, 3, Some(seed)).unwrap();
        let mut issued = Vec::new();
        while let Some(item) = dispenser.next_job() {
            issued.push(item);
            let calls = issued.len() as u64;
            if calls >= 3 {
                assert!(
                    (0..=calls - 3).all(|item| issued.contains(&item)),
                    "seed {seed}: dispatch {issued:?} lets an item lag more than 3 calls"
                );
            }
        }

        let mut config = config(6, 3, 2, seed);
        config.producer_work = Duration::from_micros(200);
        config.consumer_work = Duration::from_micros(20);
        let (consumed, _) = run_with_watchdog(config);
        assert_eq!(consumed, vec![0, 1, 2, 3, 4, 5], "seed {seed}");
    }
}

struct Scripted(Mutex<VecDeque<Item>>);

impl JobSource for Scripted {
    fn next_job(&self) -> Option<Item> {
        self.0.lock().unwrap().pop_front()
    }
}

#[rstest]
fn test_full_buffer_backpressure() {
    // C = 1, N = 3: item 0 sits unpopped, the holder of item 1 must wait
    let pipeline = Pipeline::new(3, 1, 1).unwrap();
    let jobs = Scripted(Mutex::new([0, 1, 2].into_iter().collect()));

    thread::scope(|s| {
        let producer = s.spawn(|| Producer::new(0, &pipeline, &jobs, &NoWork).unwrap().run());

        while pipeline.buffer().expected() < 1 {
            thread::yield_now();
        }
        thread::sleep(Duration::from_millis(20));
        assert_eq!(pipeline.buffer().len(), 1);
        assert_eq!(pipeline.buffer().expected(), 1);
        assert!(!producer.is_finished());

        let mut consumed = Vec::new();
        loop {
            match pipeline.pop() {
                PopOutcome::Popped(item) => consumed.push(item),
                PopOutcome::EmptyNotDone => thread::yield_now(),
                PopOutcome::EmptyDone => break,
            }
        }

        let stats = producer.join().unwrap();
        assert_eq!(consumed, vec![0, 1, 2]);
        assert!(stats.rejected_full >= 1);
        assert_eq!(stats.rejected_not_next, 0);
    });

    assert_eq!(pipeline.buffer().high_water(), 1);
    assert_eq!(pipeline.pop(), PopOutcome::EmptyDone);
}

#[rstest]
fn test_targeted_wakeup_precision_under_load() {
    let (consumed, report) = run_with_watchdog(config(300, 8, 3, 42));
    assert_eq!(consumed.len(), 300);
    assert!(report.targeted_wakes <= report.rejected_not_next());
}

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

use std::thread;

use tracing::{debug, info};

use crate::config::PipelineConfig;
use crate::consumer::{Consumer, ConsumerStats};
use crate::dispenser::{JobDispenser, JobSource};
use crate::pipeline::Pipeline;
use crate::producer::{Producer, ProducerStats};
use crate::sync::{fail_fast, AbortOnPanic};
use crate::work::{RandomDelay, Work};
use crate::{Item, SeqBufError};

/// What happened during a completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub producers: Vec<ProducerStats>,
    pub consumer: ConsumerStats,
    /// Largest buffer length ever observed.
    pub high_water: usize,
    pub targeted_wakes: u64,
    pub spurious_wakes: u64,
}

impl RunReport {
    pub fn produced(&self) -> u64 {
        self.producers.iter().map(|p| p.produced).sum()
    }

    pub fn rejected_not_next(&self) -> u64 {
        self.producers.iter().map(|p| p.rejected_not_next).sum()
    }

    pub fn rejected_full(&self) -> u64 {
        self.producers.iter().map(|p| p.rejected_full).sum()
    }
}

/// Run the whole pipeline described by `config`, handing each consumed item
/// to `sink` in order.
pub fn run<F>(config: &PipelineConfig, sink: F) -> Result<RunReport, SeqBufError>
where
    F: FnMut(Item) + Send,
{
    config.validate()?;

    let pipeline = Pipeline::new(config.items, config.producers, config.capacity)?;
    let jobs = JobDispenser::new(config.items, config.producers, config.seed)?;
    let producer_work = RandomDelay::new(config.producer_work);
    let consumer_work = RandomDelay::new(config.consumer_work);

    info!(
        items = config.items,
        producers = config.producers,
        capacity = config.capacity,
        seed = ?config.seed,
        "starting pipeline"
    );

    Ok(run_with(
        &pipeline,
        &jobs,
        &producer_work,
        &consumer_work,
        sink,
    ))
}

/// Spawn one consumer and one producer per targeted gate of `pipeline`,
/// wait for all of them, and collect their statistics.
pub fn run_with<J, PW, CW, F>(
    pipeline: &Pipeline,
    jobs: &J,
    producer_work: &PW,
    consumer_work: &CW,
    sink: F,
) -> RunReport
where
    J: JobSource + ?Sized,
    PW: Work + ?Sized,
    CW: Work + ?Sized,
    F: FnMut(Item) + Send,
{
    let (producers, consumer) = thread::scope(|s| {
        debug!("starting consumer thread");
        let consumer = thread::Builder::new()
            .name("consumer".to_string())
            .spawn_scoped(s, move || {
                let _guard = AbortOnPanic("consumer thread panicked");
                Consumer::new(pipeline, consumer_work).run(sink)
            })
            .unwrap_or_else(|_| fail_fast("failed to spawn consumer thread"));

        let producers: Vec<_> = (0..pipeline.producers())
            .map(|index| {
                let producer = match Producer::new(index, pipeline, jobs, producer_work) {
                    Ok(producer) => producer,
                    Err(_) => fail_fast("producer index outside the gate arena"),
                };
                debug!(producer = index, "starting producer thread");
                thread::Builder::new()
                    .name(format!("producer-{index}"))
                    .spawn_scoped(s, move || {
                        let _guard = AbortOnPanic("producer thread panicked");
                        producer.run()
                    })
                    .unwrap_or_else(|_| fail_fast("failed to spawn producer thread"))
            })
            .collect();

        let consumer = consumer
            .join()
            .unwrap_or_else(|_| fail_fast("consumer thread panicked"));
        let producers: Vec<ProducerStats> = producers
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|_| fail_fast("producer thread panicked"))
            })
            .collect();

        (producers, consumer)
    });

    let (targeted_wakes, spurious_wakes) = pipeline.targeted_wakes();
    RunReport {
        producers,
        consumer,
        high_water: pipeline.buffer().high_water(),
        targeted_wakes,
        spurious_wakes,
    }
}

#[cfg(all(test, not(feature = "loom")))]
mod tests {
    use super::*;
    use crate::work::NoWork;
    use rstest::*;
    use std::time::Duration;

    #[rstest]
    fn test_run_rejects_invalid_config() {
        let config = PipelineConfig {
            capacity: 0,
            ..Default::default()
        };
        assert_eq!(run(&config, |_| {}).err(), Some(SeqBufError::ZeroCapacity));
    }

    #[rstest]
    fn test_run_reports_totals() {
        let config = PipelineConfig {
            items: 40,
            producers: 3,
            capacity: 2,
            producer_work: Duration::from_micros(50),
            consumer_work: Duration::from_micros(50),
            seed: Some(3),
        };
        let mut seen = Vec::new();
        let report = run(&config, |item| seen.push(item)).unwrap();

        assert_eq!(seen, (0..40).collect::<Vec<_>>());
        assert_eq!(report.produced(), 40);
        assert_eq!(report.consumer.consumed, 40);
        assert_eq!(report.producers.len(), 3);
        assert!(report.high_water <= 2);
    }

    #[rstest]
    fn test_run_with_no_work() {
        let pipeline = Pipeline::new(100, 4, 1).unwrap();
        let jobs = JobDispenser::new(100, 4, Some(11)).unwrap();
        let mut seen = Vec::new();
        let report = run_with(&pipeline, &jobs, &NoWork, &NoWork, |item| seen.push(item));

        assert_eq!(seen, (0..100).collect::<Vec<_>>());
        assert_eq!(report.high_water, 1);
    }
}

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

#[cfg(all(test, feature = "loom"))]
mod tests {
    use crate::{
        consumer::Consumer, dispenser::JobDispenser, gate::BroadcastGate, gate::TargetedGate,
        pipeline::Pipeline, producer::Producer, work::NoWork,
    };
    use ::loom::{model::Builder, sync::Arc, thread};

    fn builder() -> Builder {
        let mut builder = Builder::new();
        if builder.preemption_bound.is_none() {
            builder.preemption_bound = Some(3);
        }
        builder
    }

    #[test]
    fn test_broadcast_signal_not_lost() {
        builder().check(|| {
            let gate = Arc::new(BroadcastGate::new());
            let signaller = {
                let gate = gate.clone();
                thread::spawn(move || gate.signal())
            };

            gate.wait();
            signaller.join().unwrap();
        });
    }

    #[test]
    fn test_targeted_notify_not_lost() {
        builder().check(|| {
            let gate = Arc::new(TargetedGate::new());
            let notifier = {
                let gate = gate.clone();
                thread::spawn(move || {
                    gate.notify(0);
                    gate.notify(1);
                })
            };

            gate.wait_for(1);
            notifier.join().unwrap();
            assert_eq!(gate.spurious_wakes(), 0);
        });
    }

    #[test]
    fn test_two_producers_in_order() {
        let mut builder = Builder::new();
        if builder.preemption_bound.is_none() {
            builder.preemption_bound = Some(2);
        }

        builder.check(|| {
            let num_items = 2;
            let num_producers = 2;
            let pipeline = Arc::new(Pipeline::new(num_items, num_producers, 1).unwrap());
            let jobs = Arc::new(JobDispenser::new(num_items, num_producers, Some(0)).unwrap());

            let handles: Vec<_> = (0..num_producers)
                .map(|index| {
                    let pipeline = pipeline.clone();
                    let jobs = jobs.clone();
                    thread::spawn(move || {
                        Producer::new(index, &pipeline, &*jobs, &NoWork)
                            .unwrap()
                            .run()
                    })
                })
                .collect();

            let mut received = vec![];
            let stats = Consumer::new(&pipeline, &NoWork).run(|item| received.push(item));

            let produced: u64 = handles
                .into_iter()
                .map(|handle| handle.join().unwrap().produced)
                .sum();

            assert_eq!(received, vec![0, 1]);
            assert_eq!(stats.consumed, num_items);
            assert_eq!(produced, num_items);
            assert!(pipeline.buffer().high_water() <= 1);
        });
    }
}

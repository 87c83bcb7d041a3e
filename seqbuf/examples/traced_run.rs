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

//! Runs a small pipeline with every producer and consumer transition logged.
//!
//! ```sh
//! RUST_LOG=debug cargo run -p seqbuf --example traced_run
//! ```

use seqbuf::PipelineConfig;
use std::time::Duration;
use tracing::info;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_thread_names(true)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .init();

    let config = PipelineConfig {
        items: 12,
        producers: 3,
        capacity: 2,
        producer_work: Duration::from_millis(2),
        consumer_work: Duration::from_millis(1),
        seed: None,
    };

    let report = seqbuf::run(&config, |item| println!("{item}"))?;

    info!(
        not_next = report.rejected_not_next(),
        full = report.rejected_full(),
        high_water = report.high_water,
        targeted_wakes = report.targeted_wakes,
        "run complete"
    );
    Ok(())
}

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

use clap::Parser;
use eyre::{Context, Result};
use prodcons::config::Config;
use std::io::{BufWriter, Write};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

static LONG_VERSION: OnceLock<String> = OnceLock::new();

fn get_long_version() -> &'static str {
    LONG_VERSION.get_or_init(|| {
        format!(
            "{} (commit: {})",
            env!("CARGO_PKG_VERSION"),
            env!("GIT_REVISION", "unknown"),
        )
    })
}

#[derive(Parser, Debug)]
#[command(name = "prodcons")]
#[command(about = "ordered delivery from many producers to one consumer through a bounded buffer")]
#[command(version = None, long_version = get_long_version())]
struct Args {
    #[arg(short, long, help = "configuration file path (toml format)")]
    config: Option<String>,

    #[arg(short = 'n', long, help = "total number of items")]
    items: Option<u64>,

    #[arg(short, long, help = "number of producer threads")]
    producers: Option<usize>,

    #[arg(short = 'b', long, help = "buffer capacity")]
    capacity: Option<usize>,

    #[arg(
        long,
        value_parser = humantime::parse_duration,
        help = "upper bound of a producer's per-item work (e.g. 100us, 2ms)"
    )]
    producer_work: Option<Duration>,

    #[arg(
        long,
        value_parser = humantime::parse_duration,
        help = "upper bound of the consumer's per-item work (e.g. 100us, 2ms)"
    )]
    consumer_work: Option<Duration>,

    #[arg(short, long, help = "job dispenser seed")]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_thread_names(true)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config path={}", path))?,
        None => Config::default(),
    };

    let mut pipeline_config = config.pipeline_config();
    if let Some(items) = args.items {
        pipeline_config.items = items;
    }
    if let Some(producers) = args.producers {
        pipeline_config.producers = producers;
    }
    if let Some(capacity) = args.capacity {
        pipeline_config.capacity = capacity;
    }
    if let Some(work) = args.producer_work {
        pipeline_config.producer_work = work;
    }
    if let Some(work) = args.consumer_work {
        pipeline_config.consumer_work = work;
    }
    if args.seed.is_some() {
        pipeline_config.seed = args.seed;
    }

    tracing::debug!(?pipeline_config, "pipeline configuration");

    let mut out = BufWriter::new(std::io::stdout());
    let mut write_error = None;
    let start = Instant::now();

    let report = seqbuf::run(&pipeline_config, |item| {
        if write_error.is_none() {
            if let Err(e) = writeln!(out, "{item}") {
                write_error = Some(e);
            }
        }
    })
    .wrap_err("invalid pipeline configuration")?;

    if let Some(e) = write_error {
        return Err(e).wrap_err("failed to write consumed items");
    }
    out.flush().wrap_err("failed to flush consumed items")?;

    tracing::info!(
        items = report.consumer.consumed,
        rejected_not_next = report.rejected_not_next(),
        rejected_full = report.rejected_full(),
        empty_waits = report.consumer.empty_waits,
        high_water = report.high_water,
        targeted_wakes = report.targeted_wakes,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "pipeline complete"
    );
    Ok(())
}

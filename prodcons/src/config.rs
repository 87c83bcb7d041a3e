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

use seqbuf::config::{DEFAULT_CAPACITY, DEFAULT_ITEMS, DEFAULT_PRODUCERS, DEFAULT_WORK};
use seqbuf::PipelineConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub seed: Option<u64>,

    #[serde(default)]
    pub pipeline: PipelineSection,

    #[serde(default)]
    pub work: WorkSection,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PipelineSection {
    #[serde(default = "default_items")]
    pub items: u64,
    #[serde(default = "default_producers")]
    pub producers: usize,
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

/// Upper bounds of the random per-item delay, in microseconds.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkSection {
    #[serde(default = "default_work_us")]
    pub producer_us: u64,
    #[serde(default = "default_work_us")]
    pub consumer_us: u64,
}

impl Default for PipelineSection {
    fn default() -> Self {
        PipelineSection {
            items: default_items(),
            producers: default_producers(),
            capacity: default_capacity(),
        }
    }
}

impl Default for WorkSection {
    fn default() -> Self {
        WorkSection {
            producer_us: default_work_us(),
            consumer_us: default_work_us(),
        }
    }
}

fn default_items() -> u64 {
    DEFAULT_ITEMS
}

fn default_producers() -> usize {
    DEFAULT_PRODUCERS
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

fn default_work_us() -> u64 {
    DEFAULT_WORK.as_micros() as u64
}

impl Config {
    pub fn load(path: &str) -> eyre::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            items: self.pipeline.items,
            producers: self.pipeline.producers,
            capacity: self.pipeline.capacity,
            producer_work: Duration::from_micros(self.work.producer_us),
            consumer_work: Duration::from_micros(self.work.consumer_us),
            seed: self.seed,
        }
    }
}

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

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SeqBufError {
    #[error("item count must be at least 1")]
    NoItems,

    #[error("producer count must be at least 1")]
    NoProducers,

    #[error("buffer capacity must be at least 1")]
    ZeroCapacity,

    #[error("producer index {index} out of range for {producers} producers")]
    ProducerOutOfRange { index: usize, producers: usize },
}

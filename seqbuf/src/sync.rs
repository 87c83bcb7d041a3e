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

//! Lock and condition variable substrate shared by every component.
//!
//! Under the `loom` feature the same names resolve to `loom::sync` so the
//! protocol can be model-checked without touching call sites.

#[cfg(not(feature = "loom"))]
pub(crate) use std::sync::{Condvar, Mutex, MutexGuard};

#[cfg(feature = "loom")]
pub(crate) use loom::sync::{Condvar, Mutex, MutexGuard};

use tracing::error;

/// Log `what` and abort the process.
///
/// Used for states the protocol cannot recover from: a poisoned lock, a
/// worker thread that failed to spawn or panicked mid-protocol.
#[cold]
pub(crate) fn fail_fast(what: &str) -> ! {
    error!(
        thread = std::thread::current().name().unwrap_or("<unnamed>"),
        "{what}"
    );
    std::process::abort()
}

/// Acquire `mutex`, aborting if another thread panicked while holding it.
#[inline]
pub(crate) fn lock<'a, T>(mutex: &'a Mutex<T>, what: &str) -> MutexGuard<'a, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(_) => fail_fast(what),
    }
}

/// Block on `condvar`, aborting on a poisoned lock.
#[inline]
pub(crate) fn wait<'a, T>(
    condvar: &Condvar,
    guard: MutexGuard<'a, T>,
    what: &str,
) -> MutexGuard<'a, T> {
    match condvar.wait(guard) {
        Ok(guard) => guard,
        Err(_) => fail_fast(what),
    }
}

/// Aborts the process if dropped while its thread is unwinding.
///
/// A producer or consumer that panics would otherwise leave the remaining
/// roles blocked on gates nobody will ever signal.
pub(crate) struct AbortOnPanic(pub(crate) &'static str);

impl Drop for AbortOnPanic {
    fn drop(&mut self) {
        if std::thread::panicking() {
            fail_fast(self.0);
        }
    }
}

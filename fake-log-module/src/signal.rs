// Copyright 2024 Wladimir Palant
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Interrupt processing

use log::info;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::Error;

/// A flag that stops a running generator, cloned handles share the same state
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl StopSignal {
    /// Creates a signal that hasn’t been triggered.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, bool> {
        // The flag stays meaningful even if a holder panicked
        self.inner.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Requests the generator to stop and wakes it up if it is waiting.
    pub fn trigger(&self) {
        *self.lock() = true;
        self.inner.1.notify_all();
    }

    /// Returns `true` once the signal has been triggered.
    pub fn is_triggered(&self) -> bool {
        *self.lock()
    }

    /// Waits for the given duration unless the signal is triggered first. Returns `true` if the
    /// signal has been triggered.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let guard = self.lock();
        let (guard, _) = self
            .inner
            .1
            .wait_timeout_while(guard, timeout, |triggered| !*triggered)
            .unwrap_or_else(PoisonError::into_inner);
        *guard
    }
}

/// Triggers the signal on Ctrl+C as well as `SIGTERM` and `SIGHUP` on Unix.
pub fn listen(stop: &StopSignal) -> Result<(), Error> {
    let stop = stop.clone();
    ctrlc::set_handler(move || {
        info!("Received interrupt, stopping");
        stop.trigger();
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::thread;
    use std::time::Instant;
    use test_log::test;

    #[test]
    fn trigger() {
        let stop = StopSignal::new();
        assert!(!stop.is_triggered());

        let clone = stop.clone();
        clone.trigger();
        assert!(stop.is_triggered());
        assert!(stop.wait_timeout(Duration::from_secs(10)));
    }

    #[test]
    fn timeout_expires() {
        let stop = StopSignal::new();
        let start = Instant::now();
        assert!(!stop.wait_timeout(Duration::from_millis(20)));
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn wakes_up_waiter() {
        let stop = StopSignal::new();
        let waiter = {
            let stop = stop.clone();
            thread::spawn(move || {
                let start = Instant::now();
                let triggered = stop.wait_timeout(Duration::from_secs(60));
                (triggered, start.elapsed())
            })
        };

        thread::sleep(Duration::from_millis(20));
        stop.trigger();

        let (triggered, elapsed) = waiter.join().unwrap();
        assert!(triggered);
        assert!(elapsed < Duration::from_secs(30));
    }
}

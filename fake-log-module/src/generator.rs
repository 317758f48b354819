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

//! The loop writing generated records

use chrono::Local;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::Duration;

use crate::configuration::FakeLogConf;
use crate::record::{Clock, LocalClock};
use crate::sampler::Sampler;
use crate::signal::StopSignal;
use crate::sink::Sink;
use crate::Error;

fn parse_delay(name: &'static str, value: f64) -> Result<Duration, Error> {
    Duration::try_from_secs_f64(value).map_err(|_| Error::Delay { name, value })
}

/// Reason the generator stopped
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// The configured number of lines has been written
    CountReached,
    /// The stop signal has been triggered
    Interrupted,
    /// Nobody is reading the console output any more
    OutputClosed,
}

/// Outcome of a completed run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Number of lines written
    pub lines: u64,
    /// Location of the output file, `None` for console output
    pub path: Option<PathBuf>,
    /// Why the run ended
    pub reason: StopReason,
}

/// Generator of fake access logs, created from a validated configuration
#[derive(Debug, Clone)]
pub struct FakeLogGenerator {
    conf: FakeLogConf,
    sampler: Sampler,
    sleep: Duration,
    max_random_delay: Duration,
}

impl TryFrom<FakeLogConf> for FakeLogGenerator {
    type Error = Error;

    fn try_from(conf: FakeLogConf) -> Result<Self, Self::Error> {
        let sampler = Sampler::try_from(&conf.sampling)?;
        let sleep = parse_delay("sleep", conf.sleep)?;
        let max_random_delay = parse_delay("max_random_delay", conf.max_random_delay)?;
        Ok(Self {
            conf,
            sampler,
            sleep,
            max_random_delay,
        })
    }
}

impl FakeLogGenerator {
    /// Configuration this generator has been created from
    pub fn conf(&self) -> &FakeLogConf {
        &self.conf
    }

    /// Random generator for a run, seeded from the configuration if a seed is set.
    pub fn rng(&self) -> StdRng {
        match self.conf.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }

    /// Opens the configured output and writes records to it until done or stopped.
    pub fn run(&self, stop: &StopSignal) -> Result<RunSummary, Error> {
        let sink = Sink::open(
            self.conf.output,
            &self.conf.output_dir,
            self.conf.prefix.as_deref(),
            &Local::now(),
        )?;
        self.run_with(sink, &mut self.rng(), &LocalClock, stop)
    }

    fn delay<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Duration> {
        if !self.sleep.is_zero() {
            Some(self.sleep)
        } else if !self.max_random_delay.is_zero() {
            Some(self.max_random_delay.mul_f64(rng.random_range(0.0..=1.0)))
        } else {
            None
        }
    }

    /// Writes records to the given sink using the supplied random generator and clock. The
    /// stop signal is checked before every record and interrupts delays.
    pub fn run_with<R, C>(
        &self,
        mut sink: Sink,
        rng: &mut R,
        clock: &C,
        stop: &StopSignal,
    ) -> Result<RunSummary, Error>
    where
        R: Rng + ?Sized,
        C: Clock,
    {
        info!(
            "Generating {} {:?} lines into {sink:?}",
            if self.conf.num > 0 {
                self.conf.num.to_string()
            } else {
                "unlimited".to_owned()
            },
            self.conf.log_format,
        );
        debug!(
            "Delay between lines: fixed {:?}, random up to {:?}",
            self.sleep, self.max_random_delay
        );

        let mut buf = Vec::<u8>::with_capacity(1024);
        let mut lines = 0;

        let reason = loop {
            if stop.is_triggered() {
                break StopReason::Interrupted;
            }

            let record = self.sampler.record(rng, clock);
            record.write_line(&mut buf, self.conf.log_format);

            let mut result = sink.write_line(&buf);
            if result.is_ok() && !sink.is_console() {
                result = sink.flush();
            }
            match result {
                Ok(()) => {}
                Err(err) if err.kind() == ErrorKind::BrokenPipe && sink.is_console() => {
                    debug!("Output closed: {err}");
                    break StopReason::OutputClosed;
                }
                // Dropping the sink closes it, gzip data is finalized on drop
                Err(err) => return Err(Error::Write(err)),
            }

            lines += 1;
            if self.conf.num > 0 && lines >= self.conf.num {
                break StopReason::CountReached;
            }

            if let Some(delay) = self.delay(rng) {
                if stop.wait_timeout(delay) {
                    break StopReason::Interrupted;
                }
            }
        };

        let path = sink.finish().map_err(Error::Write)?;
        info!("Stopped after {lines} lines ({reason:?})");

        Ok(RunSummary {
            lines,
            path,
            reason,
        })
    }
}

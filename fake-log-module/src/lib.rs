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

//! # Fake Log Module
//!
//! This crate generates synthetic access logs in the
//! [Common Log Format](https://en.wikipedia.org/wiki/Common_Log_Format) or the combined
//! (extended) format which adds referrer and user agent. Such logs are useful to exercise log
//! processing pipelines without a real web server. A configuration could look like this:
//!
//! ```yaml
//! output: gz
//! log_format: elf
//! num: 0
//! prefix: web01
//! sleep: 0.5
//! ```
//!
//! All top-level settings are also available as command line options, see [`FakeLogOpt`].
//!
//! The supported settings are:
//!
//! * `output`: `console` (default), `log` for a plain text file or `gz` for a gzip-compressed file
//! * `log_format`: `clf` for the Common Log Format or `elf` (default) for the combined format
//! * `num`: number of lines to generate, `0` means no limit. Default is `10`.
//! * `prefix`: prefix of the output file name
//! * `output_dir`: directory to create the output file in, current directory by default
//! * `sleep`: delay between lines in seconds, `0` (default) means no delay
//! * `max_random_delay`: if `sleep` is `0`, wait a random time up to this many seconds between
//!   lines. Default is `0`, no delay.
//! * `seed`: seed of the random generator, making the generated data reproducible
//! * `sampling`: weights of request methods (`verb_weights`) and status codes
//!   (`status_weights`), mean (`bytes_mean`) and standard deviation (`bytes_std_dev`) of the
//!   response size
//!
//! Output files are named `[prefix_]access_log_<YYYYMMDD-HHMMSS>.log` (with `.gz` appended for
//! compressed output) after the time the generator started. Each line is flushed to the file
//! immediately, so the output can be followed with `tail -f`.
//!
//! A generated line looks like this:
//!
//! ```text
//! 127.0.0.1 - - [10/Oct/2000:13:55:36 -0700] "GET /apache_pb.gif HTTP/1.0" 200 2326 "https://example.com/" "Mozilla/5.0 ..."
//! ```
//!
//! ## Code example
//!
//! ```rust
//! use fake_log_module::{FakeLogConf, FakeLogGenerator, FakeLogOpt, FromYaml, StopSignal};
//!
//! let mut conf = FakeLogConf::from_yaml("num: 3\nlog_format: clf").unwrap();
//! conf.merge_with_opt(FakeLogOpt::default());
//!
//! let generator = FakeLogGenerator::try_from(conf).unwrap();
//! let stop = StopSignal::new();
//! let summary = generator.run(&stop).unwrap();
//! assert_eq!(summary.lines, 3);
//! ```

pub mod configuration;
mod error;
mod generator;
pub mod record;
pub mod sampler;
mod signal;
pub mod sink;

pub use configuration::{Dialect, FakeLogConf, FakeLogOpt, FromYaml, OutputKind};
pub use error::Error;
pub use generator::{FakeLogGenerator, RunSummary, StopReason};
pub use signal::{listen, StopSignal};

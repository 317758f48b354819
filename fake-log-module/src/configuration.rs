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

//! Structures handling command line options and YAML deserialization for the Fake Log Module

use clap::{Args, ValueEnum};
use log::trace;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fmt::Debug;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::Error;

/// Trait for configuration structures that can be loaded from YAML. This trait has a blanket
/// implementation for any structure implementing [`serde::Deserialize`].
pub trait FromYaml {
    /// Loads configuration from a YAML file.
    fn load_from_yaml<P>(path: P) -> Result<Self, Error>
    where
        P: AsRef<Path>,
        Self: Sized;

    /// Loads configuration from a YAML string.
    fn from_yaml<S>(yaml: S) -> Result<Self, Error>
    where
        S: AsRef<str>,
        Self: Sized;
}

impl<D> FromYaml for D
where
    D: DeserializeOwned + Debug + ?Sized,
{
    fn load_from_yaml<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let file = File::open(path.as_ref()).map_err(|source| Error::ConfigOpen {
            path: path.as_ref().to_owned(),
            source,
        })?;
        let reader = BufReader::new(file);

        let conf = serde_yaml::from_reader(reader)?;
        trace!("Loaded configuration file: {conf:#?}");

        Ok(conf)
    }

    fn from_yaml<S: AsRef<str>>(yaml: S) -> Result<Self, Error> {
        let conf = serde_yaml::from_str(yaml.as_ref())?;
        trace!("Loaded configuration: {conf:#?}");

        Ok(conf)
    }
}

/// Log line grammar
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Deserialize, ValueEnum)]
pub enum Dialect {
    /// Common Log Format: address, timestamp, request line, status and byte count
    #[serde(rename = "clf", alias = "CLF", alias = "common")]
    #[value(name = "clf", alias = "common")]
    Common,
    /// Combined (extended) Log Format: common format plus referrer and user agent
    #[default]
    #[serde(rename = "elf", alias = "ELF", alias = "extended", alias = "combined")]
    #[value(name = "elf", alias = "extended", alias = "combined")]
    Extended,
}

/// Destination of the generated lines
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Deserialize, ValueEnum)]
pub enum OutputKind {
    /// Standard output
    #[default]
    #[serde(rename = "console", alias = "CONSOLE")]
    #[value(name = "console")]
    Console,
    /// Plain text file named `[prefix_]access_log_<timestamp>.log`
    #[serde(rename = "log", alias = "LOG")]
    #[value(name = "log")]
    Log,
    /// Gzip-compressed file named `[prefix_]access_log_<timestamp>.log.gz`
    #[serde(rename = "gz", alias = "GZ", alias = "gzip")]
    #[value(name = "gz", alias = "gzip")]
    Gzip,
}

/// Command line options of the fake log module
#[derive(Debug, Default, Args)]
pub struct FakeLogOpt {
    /// Write to a file (log), a gzip-compressed file (gz) or standard output (console)
    #[arg(short, long, value_enum, ignore_case = true)]
    pub output: Option<OutputKind>,
    /// Log format: clf is the Common Log Format, elf the combined/extended one
    #[arg(short, long, value_enum, ignore_case = true)]
    pub log_format: Option<Dialect>,
    /// Number of lines to generate, 0 means no limit
    #[arg(short, long)]
    pub num: Option<u64>,
    /// Prefix for output file names (log and gz output only)
    #[arg(short, long)]
    pub prefix: Option<String>,
    /// Directory to create output files in
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
    /// Seconds to sleep between lines, can be fractional
    #[arg(short, long)]
    pub sleep: Option<f64>,
    /// Upper bound in seconds of a random delay between lines, used if no fixed delay is set
    #[arg(long)]
    pub max_random_delay: Option<f64>,
    /// Seed for the random generator, makes the output reproducible apart from timestamps
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Parameters of the random distributions
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SamplingConf {
    /// Weights of `GET`, `POST`, `DELETE` and `PUT` requests
    pub verb_weights: [f64; 4],
    /// Weights of the 200, 301, 404 and 500 status codes
    pub status_weights: [f64; 4],
    /// Mean of the normally distributed response size
    pub bytes_mean: f64,
    /// Standard deviation of the normally distributed response size
    pub bytes_std_dev: f64,
}

impl Default for SamplingConf {
    fn default() -> Self {
        Self {
            verb_weights: [0.65, 0.20, 0.10, 0.05],
            status_weights: [0.90, 0.04, 0.04, 0.02],
            bytes_mean: 5000.0,
            bytes_std_dev: 500.0,
        }
    }
}

/// Configuration settings of the fake log module
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FakeLogConf {
    /// Where generated lines go
    pub output: OutputKind,
    /// Grammar of the generated lines
    pub log_format: Dialect,
    /// Number of lines to generate, 0 means no limit
    pub num: u64,
    /// Prefix for output file names, only used for file output
    pub prefix: Option<String>,
    /// Directory output files are created in
    pub output_dir: PathBuf,
    /// Fixed delay between lines in seconds, 0 means no delay
    pub sleep: f64,
    /// Upper bound of a random delay between lines in seconds, 0 disables random delays
    ///
    /// Only used if `sleep` is 0.
    pub max_random_delay: f64,
    /// Seed for the random generator, taken from the operating system if missing
    pub seed: Option<u64>,
    /// Parameters of the random distributions
    pub sampling: SamplingConf,
}

impl Default for FakeLogConf {
    fn default() -> Self {
        Self {
            output: OutputKind::default(),
            log_format: Dialect::default(),
            num: 10,
            prefix: None,
            output_dir: PathBuf::from("."),
            sleep: 0.0,
            max_random_delay: 0.0,
            seed: None,
            sampling: SamplingConf::default(),
        }
    }
}

impl FakeLogConf {
    /// Merges the command line options into the current configuration. Any command line options
    /// present overwrite existing settings.
    pub fn merge_with_opt(&mut self, opt: FakeLogOpt) {
        if let Some(output) = opt.output {
            self.output = output;
        }
        if let Some(log_format) = opt.log_format {
            self.log_format = log_format;
        }
        if let Some(num) = opt.num {
            self.num = num;
        }
        if let Some(prefix) = opt.prefix {
            self.prefix = Some(prefix);
        }
        if let Some(output_dir) = opt.output_dir {
            self.output_dir = output_dir;
        }
        if let Some(sleep) = opt.sleep {
            self.sleep = sleep;
        }
        if let Some(max_random_delay) = opt.max_random_delay {
            self.max_random_delay = max_random_delay;
        }
        if let Some(seed) = opt.seed {
            self.seed = Some(seed);
        }
    }
}

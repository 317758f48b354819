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

//! Error type of the Fake Log Module

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while configuring or running the generator
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration file could not be opened
    #[error("failed opening configuration file {}: {source}", path.display())]
    ConfigOpen {
        /// Path of the configuration file
        path: PathBuf,
        /// Underlying I/O error
        source: io::Error,
    },
    /// Configuration data is not valid YAML or contains unknown settings
    #[error("failed reading configuration file: {0}")]
    ConfigParse(#[from] serde_yaml::Error),
    /// Sampling parameters cannot be turned into a distribution
    #[error("invalid {name}: {reason}")]
    Sampling {
        /// Name of the offending setting
        name: &'static str,
        /// Explanation produced by the distribution
        reason: String,
    },
    /// A delay setting is negative or not a finite number
    #[error("invalid {name} value {value}, expected a non-negative number of seconds")]
    Delay {
        /// Name of the offending setting
        name: &'static str,
        /// The rejected value
        value: f64,
    },
    /// Output file could not be created
    #[error("failed opening output file {}: {source}", path.display())]
    SinkOpen {
        /// Path of the output file
        path: PathBuf,
        /// Underlying I/O error
        source: io::Error,
    },
    /// Writing, flushing or closing the output failed
    #[error("failed writing log output: {0}")]
    Write(#[source] io::Error),
    /// The interrupt handler could not be installed
    #[error("failed installing interrupt handler: {0}")]
    Signal(#[from] ctrlc::Error),
}

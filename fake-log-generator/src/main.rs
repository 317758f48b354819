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

#![doc = include_str!("../README.md")]

use clap::Parser;
use fake_log_module::{
    listen, Error, FakeLogConf, FakeLogGenerator, FakeLogOpt, FromYaml, RunSummary, StopSignal,
};
use log::error;
use std::path::PathBuf;
use std::process::ExitCode;

/// Generate fake Apache access logs
#[derive(Debug, Parser)]
#[command(version)]
struct Opt {
    /// The path to a YAML configuration file. Command line flags take precedence over its
    /// settings.
    #[arg(short, long)]
    conf: Option<PathBuf>,
    #[command(flatten)]
    log: FakeLogOpt,
}

fn load_conf(opt: Opt) -> Result<FakeLogConf, Error> {
    let mut conf = match &opt.conf {
        Some(path) => FakeLogConf::load_from_yaml(path)?,
        None => FakeLogConf::default(),
    };
    conf.merge_with_opt(opt.log);
    Ok(conf)
}

fn run(opt: Opt) -> Result<RunSummary, Error> {
    let generator = FakeLogGenerator::try_from(load_conf(opt)?)?;

    let stop = StopSignal::new();
    listen(&stop)?;

    generator.run(&stop)
}

fn main() -> ExitCode {
    env_logger::init();

    let opt = Opt::parse();

    match run(opt) {
        Ok(summary) => {
            if let Some(path) = summary.path {
                println!("Wrote {} lines → {}", summary.lines, path.display());
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

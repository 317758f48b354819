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

//! Random field values for generated records
//!
//! Every field is drawn independently from the random generator passed in, nothing is remembered
//! between calls.

use rand::distr::weighted::WeightedIndex;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use std::net::Ipv4Addr;

use crate::configuration::SamplingConf;
use crate::record::{Clock, Record, Status, Verb};
use crate::Error;

/// Request targets, uniformly distributed
pub const RESOURCES: [&str; 14] = [
    "/",
    "/index.html",
    "/about.html",
    "/search?q=cloud",
    "/docs/api",
    "/wp-content",
    "/wp-admin",
    "/explore",
    "/app/main/posts",
    "/posts/posts/explore",
    "/apps/cart.jsp?appID=",
    "/img/logo.png",
    "/css/site.css",
    "/js/app.js",
];

/// Range of the numeric id appended to targets containing `apps`
pub const RESOURCE_ID_RANGE: std::ops::Range<u32> = 1000..10000;

/// `Referer` header values, `-` means no header
pub const REFERRERS: [&str; 6] = [
    "-",
    "https://www.google.com/",
    "https://www.bing.com/",
    "https://twitter.com/",
    "https://news.ycombinator.com/",
    "https://example.com/",
];

/// `User-Agent` header values
pub const USER_AGENTS: [&str; 5] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 13_6_1) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Safari/605.1.15",
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:122.0) Gecko/20100101 Firefox/122.0",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:122.0) Gecko/20100101 Firefox/122.0",
];

/// Distributions of all record fields
#[derive(Debug, Clone)]
pub struct Sampler {
    verbs: WeightedIndex<f64>,
    statuses: WeightedIndex<f64>,
    bytes: Normal<f64>,
}

fn weighted(name: &'static str, weights: [f64; 4]) -> Result<WeightedIndex<f64>, Error> {
    // WeightedIndex panics instead of failing on an infinite total
    if !weights.iter().all(|weight| weight.is_finite())
        || !weights.iter().sum::<f64>().is_finite()
    {
        return Err(Error::Sampling {
            name,
            reason: "weights and their sum have to be finite".to_owned(),
        });
    }
    WeightedIndex::new(weights).map_err(|err| Error::Sampling {
        name,
        reason: err.to_string(),
    })
}

impl TryFrom<&SamplingConf> for Sampler {
    type Error = Error;

    fn try_from(conf: &SamplingConf) -> Result<Self, Self::Error> {
        let verbs = weighted("verb_weights", conf.verb_weights)?;
        let statuses = weighted("status_weights", conf.status_weights)?;

        if !conf.bytes_mean.is_finite() {
            return Err(Error::Sampling {
                name: "bytes_mean",
                reason: format!("{} is not a finite number", conf.bytes_mean),
            });
        }
        // Normal::new accepts negative values and mirrors the distribution
        if !conf.bytes_std_dev.is_finite() || conf.bytes_std_dev < 0.0 {
            return Err(Error::Sampling {
                name: "bytes_std_dev",
                reason: format!("{} is not a non-negative number", conf.bytes_std_dev),
            });
        }
        let bytes =
            Normal::new(conf.bytes_mean, conf.bytes_std_dev).map_err(|err| Error::Sampling {
                name: "bytes_std_dev",
                reason: err.to_string(),
            })?;
        Ok(Self {
            verbs,
            statuses,
            bytes,
        })
    }
}

impl Sampler {
    /// Client address with every octet in the 1 to 254 range.
    pub fn address<R: Rng + ?Sized>(&self, rng: &mut R) -> Ipv4Addr {
        let mut octets = [0u8; 4];
        for octet in &mut octets {
            *octet = rng.random_range(1..=254);
        }
        Ipv4Addr::from(octets)
    }

    /// Request method according to the configured weights.
    pub fn verb<R: Rng + ?Sized>(&self, rng: &mut R) -> Verb {
        Verb::ALL[self.verbs.sample(rng)]
    }

    /// Request target. Targets containing `apps` get a random id appended, simulating a dynamic
    /// query parameter.
    pub fn resource<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        let resource = RESOURCES[rng.random_range(0..RESOURCES.len())];
        if resource.contains("apps") {
            format!("{resource}{}", rng.random_range(RESOURCE_ID_RANGE))
        } else {
            resource.to_owned()
        }
    }

    /// Response status according to the configured weights.
    pub fn status<R: Rng + ?Sized>(&self, rng: &mut R) -> Status {
        Status::ALL[self.statuses.sample(rng)]
    }

    /// Response size, normally distributed and never negative.
    pub fn bytes<R: Rng + ?Sized>(&self, rng: &mut R) -> u64 {
        // Float to integer casts saturate, negative values and NaN become 0
        self.bytes.sample(rng) as u64
    }

    /// `Referer` header value.
    pub fn referrer<R: Rng + ?Sized>(&self, rng: &mut R) -> &'static str {
        REFERRERS[rng.random_range(0..REFERRERS.len())]
    }

    /// `User-Agent` header value.
    pub fn user_agent<R: Rng + ?Sized>(&self, rng: &mut R) -> &'static str {
        USER_AGENTS[rng.random_range(0..USER_AGENTS.len())]
    }

    /// Draws a complete record, timestamped by the clock.
    pub fn record<R: Rng + ?Sized>(&self, rng: &mut R, clock: &impl Clock) -> Record {
        Record {
            address: self.address(rng),
            time: clock.now(),
            verb: self.verb(rng),
            resource: self.resource(rng),
            status: self.status(rng),
            bytes: self.bytes(rng),
            referrer: self.referrer(rng),
            user_agent: self.user_agent(rng),
        }
    }
}

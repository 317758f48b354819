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

//! Log records and their text representation

use chrono::{DateTime, FixedOffset, Local};
use std::fmt::{Display, Formatter};
use std::io::Write;
use std::net::Ipv4Addr;

use crate::configuration::Dialect;

/// Source of timestamps for generated records
pub trait Clock {
    /// Returns the current time along with the UTC offset to be logged.
    fn now(&self) -> DateTime<FixedOffset>;
}

/// Clock reading the local wall-clock time
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// Clock always returning the same instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<FixedOffset>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}

/// HTTP request method
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Verb {
    /// `GET` request
    Get,
    /// `POST` request
    Post,
    /// `DELETE` request
    Delete,
    /// `PUT` request
    Put,
}

impl Verb {
    /// All verbs, in the order their weights are configured
    pub const ALL: [Self; 4] = [Self::Get, Self::Post, Self::Delete, Self::Put];

    /// Returns the method name as it appears in the request line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Delete => "DELETE",
            Self::Put => "PUT",
        }
    }
}

impl Display for Verb {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HTTP response status
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Status {
    /// 200 OK
    Ok,
    /// 301 Moved Permanently
    MovedPermanently,
    /// 404 Not Found
    NotFound,
    /// 500 Internal Server Error
    InternalServerError,
}

impl Status {
    /// All status codes, in the order their weights are configured
    pub const ALL: [Self; 4] = [
        Self::Ok,
        Self::MovedPermanently,
        Self::NotFound,
        Self::InternalServerError,
    ];

    /// Returns the numeric status code.
    pub fn as_u16(&self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::MovedPermanently => 301,
            Self::NotFound => 404,
            Self::InternalServerError => 500,
        }
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_u16())
    }
}

/// A single access log entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Client address
    pub address: Ipv4Addr,
    /// Time of the request
    pub time: DateTime<FixedOffset>,
    /// Request method
    pub verb: Verb,
    /// Request target, path and query
    pub resource: String,
    /// Response status
    pub status: Status,
    /// Size of the response body
    pub bytes: u64,
    /// Value of the `Referer` header, `-` if none
    pub referrer: &'static str,
    /// Value of the `User-Agent` header
    pub user_agent: &'static str,
}

impl Record {
    /// Replaces the buffer contents by the newline-terminated log line for this record.
    pub fn write_line(&self, buf: &mut Vec<u8>, dialect: Dialect) {
        buf.truncate(0);

        let _ = write!(
            buf,
            "{} - - [{} {}] \"{} {} HTTP/1.0\" {} {}",
            self.address,
            self.time.format("%d/%b/%Y:%H:%M:%S"),
            self.time.format("%z"),
            self.verb,
            self.resource,
            self.status,
            self.bytes,
        );
        if dialect == Dialect::Extended {
            let _ = write!(buf, " \"{}\" \"{}\"", self.referrer, self.user_agent);
        }
        let _ = writeln!(buf);
    }

    /// Returns the newline-terminated log line for this record.
    pub fn to_line(&self, dialect: Dialect) -> String {
        let mut buf = Vec::new();
        self.write_line(&mut buf, dialect);
        String::from_utf8_lossy(&buf).into_owned()
    }
}

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

//! Output destinations for generated log lines

use chrono::{DateTime, TimeZone};
use flate2::write::GzEncoder;
use flate2::Compression;
use log::debug;
use std::fmt::{Debug, Formatter};
use std::fs::File;
use std::io::{stdout, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::configuration::OutputKind;
use crate::Error;

/// Builds the output file name `[prefix_]access_log_<YYYYMMDD-HHMMSS>.log` for a run started at
/// the given time. An empty prefix is ignored.
pub fn file_name<Tz>(prefix: Option<&str>, started: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let timestamp = started.format("%Y%m%d-%H%M%S");
    match prefix {
        Some(prefix) if !prefix.is_empty() => format!("{prefix}_access_log_{timestamp}.log"),
        _ => format!("access_log_{timestamp}.log"),
    }
}

fn create_file(path: &Path) -> Result<File, Error> {
    File::create(path).map_err(|source| Error::SinkOpen {
        path: path.to_owned(),
        source,
    })
}

/// An open output stream, exclusively owned by the run writing to it
pub enum Sink {
    /// Standard output or another stream the generator doesn’t own. It is flushed but never
    /// closed.
    Console(Box<dyn Write + Send>),
    /// Plain text file
    File {
        /// Buffered file handle
        writer: BufWriter<File>,
        /// Location of the file
        path: PathBuf,
    },
    /// Gzip-compressed text file
    Gzip {
        /// Compressing file writer
        writer: GzEncoder<File>,
        /// Location of the file
        path: PathBuf,
    },
}

impl Debug for Sink {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Console(_) => f.write_str("Console"),
            Self::File { path, .. } => f.debug_struct("File").field("path", path).finish(),
            Self::Gzip { path, .. } => f.debug_struct("Gzip").field("path", path).finish(),
        }
    }
}

impl Sink {
    /// Opens the output of the given kind. File names are derived from the start time of the
    /// run, existing files are truncated.
    pub fn open<Tz>(
        kind: OutputKind,
        dir: &Path,
        prefix: Option<&str>,
        started: &DateTime<Tz>,
    ) -> Result<Self, Error>
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        let sink = match kind {
            OutputKind::Console => Self::console(),
            OutputKind::Log => {
                let path = dir.join(file_name(prefix, started));
                Self::File {
                    writer: BufWriter::new(create_file(&path)?),
                    path,
                }
            }
            OutputKind::Gzip => {
                let mut name = file_name(prefix, started);
                name.push_str(".gz");
                let path = dir.join(name);
                Self::Gzip {
                    writer: GzEncoder::new(create_file(&path)?, Compression::default()),
                    path,
                }
            }
        };
        debug!("Opened output {sink:?}");
        Ok(sink)
    }

    /// Standard output sink.
    pub fn console() -> Self {
        Self::Console(Box::new(stdout()))
    }

    /// Console-like sink writing into an arbitrary stream.
    pub fn from_writer(writer: impl Write + Send + 'static) -> Self {
        Self::Console(Box::new(writer))
    }

    /// Returns `true` for sinks that aren’t files.
    pub fn is_console(&self) -> bool {
        matches!(self, Self::Console(_))
    }

    /// Location of the output file if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Console(_) => None,
            Self::File { path, .. } | Self::Gzip { path, .. } => Some(path),
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Console(writer) => writer,
            Self::File { writer, .. } => writer,
            Self::Gzip { writer, .. } => writer,
        }
    }

    /// Writes a complete log line.
    pub fn write_line(&mut self, line: &[u8]) -> std::io::Result<()> {
        self.writer().write_all(line)
    }

    /// Pushes buffered data to the underlying stream so that the line becomes visible to
    /// processes tailing the file.
    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer().flush()
    }

    /// Flushes and closes the output, writing the gzip trailer if necessary. Returns the file
    /// location if a file was written.
    pub fn finish(self) -> std::io::Result<Option<PathBuf>> {
        match self {
            Self::Console(mut writer) => match writer.flush() {
                Err(err) if err.kind() != ErrorKind::BrokenPipe => Err(err),
                _ => Ok(None),
            },
            Self::File { writer, path } => {
                let file = writer.into_inner().map_err(|err| err.into_error())?;
                file.sync_all()?;
                Ok(Some(path))
            }
            Self::Gzip { writer, path } => {
                let file = writer.finish()?;
                file.sync_all()?;
                Ok(Some(path))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{Local, NaiveDate};
    use flate2::read::GzDecoder;
    use std::io::Read;
    use std::sync::{Arc, Mutex};
    use test_log::test;

    fn start_time() -> DateTime<Local> {
        NaiveDate::from_ymd_opt(2025, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap()
            .and_local_timezone(Local)
            .earliest()
            .unwrap()
    }

    #[derive(Debug, Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().write(buf)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn file_names() {
        let started = start_time();
        assert_eq!(
            file_name(None, &started),
            "access_log_20250102-030405.log"
        );
        assert_eq!(
            file_name(Some(""), &started),
            "access_log_20250102-030405.log"
        );
        assert_eq!(
            file_name(Some("web01"), &started),
            "web01_access_log_20250102-030405.log"
        );
    }

    #[test]
    fn console() {
        let sink = Sink::open(OutputKind::Console, Path::new("."), Some("x"), &start_time()).unwrap();
        assert!(sink.is_console());
        assert_eq!(sink.path(), None);
        assert_eq!(sink.finish().unwrap(), None);
    }

    #[test]
    fn custom_writer() {
        let buffer = SharedBuffer::default();
        let mut sink = Sink::from_writer(buffer.clone());
        assert!(sink.is_console());
        sink.write_line(b"line 1\n").unwrap();
        sink.write_line(b"line 2\n").unwrap();
        assert_eq!(sink.finish().unwrap(), None);
        assert_eq!(&*buffer.0.lock().unwrap(), b"line 1\nline 2\n");
    }

    #[test]
    fn plain_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = Sink::open(OutputKind::Log, dir.path(), Some("test"), &start_time()).unwrap();
        assert!(!sink.is_console());

        let expected = dir.path().join("test_access_log_20250102-030405.log");
        assert_eq!(sink.path(), Some(expected.as_path()));

        sink.write_line(b"first\n").unwrap();
        sink.flush().unwrap();
        assert_eq!(std::fs::read_to_string(&expected).unwrap(), "first\n");

        sink.write_line(b"second\n").unwrap();
        assert_eq!(sink.finish().unwrap(), Some(expected.clone()));
        assert_eq!(
            std::fs::read_to_string(&expected).unwrap(),
            "first\nsecond\n"
        );
    }

    #[test]
    fn truncates_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("access_log_20250102-030405.log");
        std::fs::write(&path, "old contents\n").unwrap();

        let mut sink = Sink::open(OutputKind::Log, dir.path(), None, &start_time()).unwrap();
        sink.write_line(b"new\n").unwrap();
        sink.finish().unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new\n");
    }

    #[test]
    fn gzip_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = Sink::open(OutputKind::Gzip, dir.path(), None, &start_time()).unwrap();

        let expected = dir.path().join("access_log_20250102-030405.log.gz");
        assert_eq!(sink.path(), Some(expected.as_path()));

        sink.write_line(b"compressed line\n").unwrap();
        sink.flush().unwrap();
        sink.write_line(b"another one\n").unwrap();
        assert_eq!(sink.finish().unwrap(), Some(expected.clone()));

        let mut contents = String::new();
        GzDecoder::new(File::open(&expected).unwrap())
            .read_to_string(&mut contents)
            .unwrap();
        assert_eq!(contents, "compressed line\nanother one\n");
    }

    #[test]
    fn gzip_finalized_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = Sink::open(OutputKind::Gzip, dir.path(), None, &start_time()).unwrap();
        let path = sink.path().unwrap().to_owned();
        sink.write_line(b"dropped\n").unwrap();
        drop(sink);

        let mut contents = String::new();
        GzDecoder::new(File::open(&path).unwrap())
            .read_to_string(&mut contents)
            .unwrap();
        assert_eq!(contents, "dropped\n");
    }

    #[test]
    fn open_failure() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        for kind in [OutputKind::Log, OutputKind::Gzip] {
            let result = Sink::open(kind, &missing, None, &start_time());
            assert!(
                matches!(&result, Err(Error::SinkOpen { path, .. }) if path.starts_with(&missing)),
                "unexpected result {result:?}"
            );
        }
    }
}

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::{Result, StreamError};

/// The distinguished end-of-stream record: a line containing exactly `{}`.
///
/// The sentinel is written even for an empty stream, so the minimal valid
/// file is the two bytes `{}`. A file reaching physical EOF without the
/// sentinel was truncated mid-write and is treated as corrupt.
pub const EOF_SENTINEL: &str = "{}";

/// Appends typed records to a file, one JSON object per line.
///
/// [`RecordWriter::close`] writes the sentinel and flushes; a writer dropped
/// without `close` leaves a file with no sentinel, which readers reject.
pub struct RecordWriter<T> {
    writer: BufWriter<File>,
    path: PathBuf,
    written: u64,
    _marker: PhantomData<T>,
}

impl<T: Serialize> RecordWriter<T> {
    /// Create (truncating) the file at `path`.
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
            path: path.to_path_buf(),
            written: 0,
            _marker: PhantomData,
        })
    }

    /// Append one record as a newline-terminated JSON line.
    pub fn write(&mut self, record: &T) -> Result<()> {
        let line =
            serde_json::to_string(record).map_err(|e| StreamError::Serialization(e.to_string()))?;
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    /// Number of records written so far (sentinel excluded).
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Write the EOF sentinel and flush. Consumes the writer.
    pub fn close(mut self) -> Result<()> {
        self.writer.write_all(EOF_SENTINEL.as_bytes())?;
        self.writer.flush()?;
        debug!(path = %self.path.display(), records = self.written, "record stream closed");
        Ok(())
    }
}

/// Iterates typed records from a file written by [`RecordWriter`].
///
/// Produces a finite sequence: iteration stops at the sentinel line, not at
/// physical end of file. Physical EOF before the sentinel yields
/// [`StreamError::CorruptStream`]. Re-opening the file restarts the
/// sequence from the beginning.
pub struct RecordReader<T> {
    reader: BufReader<File>,
    path: PathBuf,
    line: u64,
    finished: bool,
    _marker: PhantomData<T>,
}

impl<T: DeserializeOwned> RecordReader<T> {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self {
            reader: BufReader::new(file),
            path: path.to_path_buf(),
            line: 0,
            finished: false,
            _marker: PhantomData,
        })
    }

    /// Read all remaining records into memory.
    pub fn read_all(self) -> Result<Vec<T>> {
        self.collect()
    }

    fn next_record(&mut self) -> Option<Result<T>> {
        if self.finished {
            return None;
        }

        let mut buf = String::new();
        match self.reader.read_line(&mut buf) {
            Ok(0) => {
                // Physical EOF without sentinel: truncated stream.
                self.finished = true;
                Some(Err(StreamError::CorruptStream {
                    path: self.path.clone(),
                }))
            }
            Ok(_) => {
                self.line += 1;
                let trimmed = buf.trim_end_matches(['\r', '\n']);
                if trimmed == EOF_SENTINEL {
                    self.finished = true;
                    return None;
                }
                match serde_json::from_str(trimmed) {
                    Ok(record) => Some(Ok(record)),
                    Err(e) => {
                        self.finished = true;
                        Some(Err(StreamError::MalformedRecord {
                            path: self.path.clone(),
                            line: self.line,
                            reason: e.to_string(),
                        }))
                    }
                }
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e.into()))
            }
        }
    }
}

impl<T: DeserializeOwned> Iterator for RecordReader<T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record()
    }
}

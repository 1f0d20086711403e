//! Append-only CSV file with whole-row writes
//!
//! A row is encoded in memory and handed to the file in one `write_all`.
//! Nothing is buffered between writes, so a row that failed is never written
//! later by an unrelated flush. If a write fails partway the file is cut back
//! to its length before the row, leaving no fragment behind.

use crate::error::{Error, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Write target that can drop a partially written tail
pub trait AppendTarget: Write {
    /// Bytes currently committed
    fn committed_len(&self) -> io::Result<u64>;

    /// Cut the target back to `len` bytes
    fn truncate_to(&mut self, len: u64) -> io::Result<()>;

    /// Make committed rows durable
    fn sync(&mut self) -> io::Result<()> {
        self.flush()
    }
}

impl AppendTarget for File {
    fn committed_len(&self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }

    fn truncate_to(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }

    fn sync(&mut self) -> io::Result<()> {
        self.sync_data()
    }
}

/// CSV file appended one complete row at a time
pub struct CsvAppender<T = File> {
    path: PathBuf,
    target: T,
}

impl CsvAppender<File> {
    /// Open (or create) `path` for appending.
    ///
    /// A new or empty file gets `header`. An existing header must equal
    /// `header` exactly.
    ///
    /// # Errors
    /// - `Error::Config` if an existing file's header differs
    /// - `Error::Io` if the directory or file cannot be created
    pub fn open(path: &Path, header: &[String]) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let has_header = check_existing_header(path, header)?;
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let mut appender = Self::with_target(path, file);

        if has_header {
            info!("Appending to {}", path.display());
        } else {
            appender.append(header)?;
            info!("Created {}", path.display());
        }
        Ok(appender)
    }
}

impl<T: AppendTarget> CsvAppender<T> {
    pub fn with_target(path: impl Into<PathBuf>, target: T) -> Self {
        Self {
            path: path.into(),
            target,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one row; on error nothing of the row remains
    pub fn append<I, F>(&mut self, fields: I) -> Result<()>
    where
        I: IntoIterator<Item = F>,
        F: AsRef<[u8]>,
    {
        let bytes = encode_row(fields)?;
        let committed = self.target.committed_len()?;

        if let Err(e) = self
            .target
            .write_all(&bytes)
            .and_then(|_| self.target.flush())
        {
            if let Err(undo) = self.target.truncate_to(committed) {
                warn!(
                    "Could not remove partial row from {}: {}",
                    self.path.display(),
                    undo
                );
            }
            return Err(e.into());
        }
        Ok(())
    }

    pub fn sync(&mut self) -> Result<()> {
        Ok(self.target.sync()?)
    }
}

fn encode_row<I, F>(fields: I) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = F>,
    F: AsRef<[u8]>,
{
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(fields)?;
    writer.into_inner().map_err(|e| Error::Io(e.into_error()))
}

/// Returns whether the file already carries a (matching) header
fn check_existing_header(path: &Path, expected: &[String]) -> Result<bool> {
    let is_empty = match fs::metadata(path) {
        Ok(meta) => meta.len() == 0,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e.into()),
    };
    if is_empty {
        return Ok(false);
    }

    let mut reader = csv::Reader::from_path(path)?;
    let found = reader.headers()?;
    if found.iter().ne(expected.iter().map(String::as_str)) {
        return Err(Error::Config(format!(
            "{} has a {}-column header that does not match the expected {} columns ({}, ...)",
            path.display(),
            found.len(),
            expected.len(),
            expected.iter().take(3).cloned().collect::<Vec<_>>().join(",")
        )));
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    /// In-memory target that accepts `budget` more bytes, then fails
    #[derive(Default)]
    struct ShortTarget {
        bytes: Vec<u8>,
        budget: Option<usize>,
    }

    impl Write for ShortTarget {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let room = self.budget.unwrap_or(usize::MAX);
            if room == 0 {
                return Err(io::Error::new(io::ErrorKind::Other, "no space left"));
            }
            let n = room.min(buf.len());
            self.bytes.extend_from_slice(&buf[..n]);
            self.budget = self.budget.map(|b| b - n);
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl AppendTarget for ShortTarget {
        fn committed_len(&self) -> io::Result<u64> {
            Ok(self.bytes.len() as u64)
        }

        fn truncate_to(&mut self, len: u64) -> io::Result<()> {
            self.bytes.truncate(len as usize);
            Ok(())
        }
    }

    fn text(appender: &CsvAppender<ShortTarget>) -> String {
        String::from_utf8(appender.target.bytes.clone()).unwrap()
    }

    #[test]
    fn test_rows_are_csv_encoded() {
        let mut appender = CsvAppender::with_target("mem.csv", ShortTarget::default());
        appender.append(["a", "b,c", "1.5"]).unwrap();
        assert_eq!(text(&appender), "a,\"b,c\",1.5\n");
    }

    #[test]
    fn test_failed_row_leaves_no_fragment_and_never_reappears() {
        let mut appender = CsvAppender::with_target("mem.csv", ShortTarget::default());
        appender.append(["first", "1"]).unwrap();

        // Room for part of the next row only
        appender.target.budget = Some(4);
        let result = appender.append(["second", "2"]);
        assert!(matches!(result, Err(Error::Io(_))));
        assert_eq!(text(&appender), "first,1\n");

        appender.target.budget = None;
        appender.append(["third", "3"]).unwrap();
        appender.sync().unwrap();
        assert_eq!(text(&appender), "first,1\nthird,3\n");
    }

    #[test]
    fn test_open_writes_header_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sub").join("rows.csv");
        let header = vec!["x".to_string(), "y".to_string()];

        {
            let mut appender = CsvAppender::open(&path, &header).unwrap();
            appender.append(["1", "2"]).unwrap();
        }
        {
            let mut appender = CsvAppender::open(&path, &header).unwrap();
            appender.append(["3", "4"]).unwrap();
        }
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "x,y\n1,2\n3,4\n");
    }

    #[test]
    fn test_open_rejects_different_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rows.csv");
        drop(CsvAppender::open(&path, &["x".to_string(), "y".to_string()]).unwrap());

        let result = CsvAppender::open(&path, &["x".to_string(), "z".to_string()]);
        assert!(matches!(result, Err(Error::Config(_))));
    }
}

//! Recorded accelerometer rows and the labelled-row file
//!
//! Input rows come from an earlier recording session:
//!
//! ```text
//! time,Ax,Ay,Az,A_mag
//! 2024-05-01 10:00:02.120,0.012,-0.031,0.998,0.999
//! ```
//!
//! Extra columns are ignored. Labelled output repeats the row and appends the
//! numeric class id in a `label` column.

use crate::error::{Error, Result};
use crate::output::{AppendTarget, CsvAppender, Delivery, RecordSink};
use har_common::{ClassId, Label};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Output columns, in order
pub const LABELLED_HEADER: [&str; 6] = ["time", "Ax", "Ay", "Az", "A_mag", "label"];

/// One recorded accelerometer row
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RecordedRow {
    /// Passed through unchanged
    pub time: String,
    #[serde(rename = "Ax")]
    pub ax: f64,
    #[serde(rename = "Ay")]
    pub ay: f64,
    #[serde(rename = "Az")]
    pub az: f64,
    #[serde(rename = "A_mag")]
    pub a_mag: f64,
}

impl RecordedRow {
    /// `[Ax, Ay, Az, A_mag]`
    pub fn values(&self) -> [f64; 4] {
        [self.ax, self.ay, self.az, self.a_mag]
    }
}

/// Load every row of a recorded CSV file
pub fn load_rows<P: AsRef<Path>>(path: P) -> Result<Vec<RecordedRow>> {
    let rows = read_rows(File::open(path.as_ref())?)?;
    info!("Loaded {} rows from {}", rows.len(), path.as_ref().display());
    Ok(rows)
}

pub fn read_rows<R: Read>(reader: R) -> Result<Vec<RecordedRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let rows = reader
        .deserialize()
        .collect::<std::result::Result<Vec<RecordedRow>, csv::Error>>()?;
    Ok(rows)
}

/// A recorded row with the class the operator chose
#[derive(Debug, Clone, PartialEq)]
pub struct LabelledRow {
    pub row: RecordedRow,
    pub class: ClassId,
}

/// Appending sink for labelled rows
pub struct LabelledRowSink<T = File> {
    appender: CsvAppender<T>,
}

impl LabelledRowSink {
    /// Open (or create) the labelled-row file.
    ///
    /// # Errors
    /// - `Error::Config` if an existing file has different columns
    /// - `Error::Io` if the directory or file cannot be created
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let header: Vec<String> = LABELLED_HEADER.iter().map(|c| c.to_string()).collect();
        let appender = CsvAppender::open(path.as_ref(), &header)?;
        Ok(Self::with_appender(appender))
    }
}

impl<T: AppendTarget> LabelledRowSink<T> {
    pub fn with_appender(appender: CsvAppender<T>) -> Self {
        Self { appender }
    }

    pub fn path(&self) -> &Path {
        self.appender.path()
    }

    fn persistence_error(&self, reason: impl ToString) -> Error {
        Error::PersistenceWrite {
            path: self.path().to_path_buf(),
            reason: reason.to_string(),
        }
    }
}

impl<T: AppendTarget> RecordSink<LabelledRow> for LabelledRowSink<T> {
    fn write(&mut self, record: &LabelledRow) -> Result<Delivery> {
        let row = &record.row;
        let fields = [
            row.time.clone(),
            row.ax.to_string(),
            row.ay.to_string(),
            row.az.to_string(),
            row.a_mag.to_string(),
            Label::Class(record.class).to_string(),
        ];
        self.appender
            .append(&fields)
            .map_err(|e| self.persistence_error(e))?;

        debug!("Wrote row {} labelled {}", row.time, record.class);
        Ok(Delivery::Written)
    }

    fn flush(&mut self) -> Result<()> {
        self.appender.sync().map_err(|e| self.persistence_error(e))
    }
}

//! Replay driver
//!
//! Plays back raw readings recorded in a CSV file, one row per read:
//!
//! ```text
//! ax,ay,az,gx,gy,gz
//! 0.012,-0.031,0.998,0.001,0.000,-0.002
//! ```
//!
//! When the rows run out every further read reports `SensorError::Exhausted`,
//! which the sample source handles like any other failed read.

use super::{Reading, SensorDriver};
use crate::error::{Error, Result, SensorError};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::info;

/// Sensor driver backed by pre-recorded readings
pub struct ReplayDriver {
    readings: Vec<Reading>,
    position: usize,
}

impl ReplayDriver {
    pub fn new(readings: Vec<Reading>) -> Self {
        Self {
            readings,
            position: 0,
        }
    }

    /// Load readings from a CSV file with a header row
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let driver = Self::from_reader(file)?;
        info!(
            "Loaded {} replay readings from {}",
            driver.readings.len(),
            path.as_ref().display()
        );
        Ok(driver)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::Reader::from_reader(reader);
        let mut readings = Vec::new();

        for (index, record) in reader.records().enumerate() {
            let record = record?;
            let line = index + 2; // +1 for header, +1 for 1-based indexing
            if record.len() < 6 {
                return Err(Error::Config(format!(
                    "replay line {}: expected 6 columns, found {}",
                    line,
                    record.len()
                )));
            }

            let mut reading = [0.0; 6];
            for (column, value) in reading.iter_mut().enumerate() {
                *value = record[column].trim().parse().map_err(|e| {
                    Error::Config(format!("replay line {} column {}: {}", line, column + 1, e))
                })?;
            }
            readings.push(reading);
        }

        Ok(Self::new(readings))
    }

    /// Readings not yet played back
    pub fn remaining(&self) -> usize {
        self.readings.len() - self.position
    }
}

impl SensorDriver for ReplayDriver {
    fn read_raw(&mut self) -> std::result::Result<Reading, SensorError> {
        let reading = self
            .readings
            .get(self.position)
            .copied()
            .ok_or(SensorError::Exhausted)?;
        self.position += 1;
        Ok(reading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATA: &str = "ax,ay,az,gx,gy,gz\n\
                        0.1,0.2,0.3,0.4,0.5,0.6\n\
                        1,2,3,4,5,6\n";

    #[test]
    fn test_plays_rows_in_order_then_exhausts() {
        let mut driver = ReplayDriver::from_reader(DATA.as_bytes()).unwrap();
        assert_eq!(driver.remaining(), 2);
        assert_eq!(driver.read_raw().unwrap(), [0.1, 0.2, 0.3, 0.4, 0.5, 0.6]);
        assert_eq!(driver.read_raw().unwrap(), [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(driver.read_raw(), Err(SensorError::Exhausted));
        assert_eq!(driver.remaining(), 0);
    }

    #[test]
    fn test_short_row_rejected() {
        let data = "ax,ay,az,gx,gy,gz\n1,2,3\n";
        let result = ReplayDriver::from_reader(data.as_bytes());
        assert!(result.is_err());
    }

    #[test]
    fn test_bad_number_reports_line() {
        let data = "ax,ay,az,gx,gy,gz\n1,2,3,4,5,6\n1,2,x,4,5,6\n";
        match ReplayDriver::from_reader(data.as_bytes()) {
            Err(Error::Config(msg)) => assert!(msg.contains("line 3"), "{}", msg),
            Err(other) => panic!("Expected Config error, got {}", other),
            Ok(_) => panic!("Expected error"),
        }
    }
}

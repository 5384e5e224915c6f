use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::domain::ApplicantRecord;

/// Reads applicant records from CSV whose header uses the record field names.
pub struct ApplicantCsvReader;

/// One data line of a batch file.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchEntry {
    /// 1-based line number, counting the header as line 1.
    pub line: u64,
    pub record: Result<ApplicantRecord, String>,
}

impl ApplicantCsvReader {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Vec<BatchEntry>, BatchError> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Parse every data line. Lines that fail to deserialize are kept as errors so the rest of
    /// the batch can still be scored; I/O failures abort the whole read.
    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<BatchEntry>, BatchError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = reader.headers()?.clone();

        let mut entries = Vec::new();
        for (index, row) in reader.records().enumerate() {
            // Blank lines are skipped by the reader, so the row index is only a fallback.
            let fallback = index as u64 + 2;
            let entry = match row {
                Ok(raw) => BatchEntry {
                    line: raw.position().map_or(fallback, csv::Position::line),
                    record: raw
                        .deserialize::<ApplicantRecord>(Some(&headers))
                        .map_err(|err| err.to_string()),
                },
                Err(err) if err.is_io_error() => return Err(BatchError::Csv(err)),
                Err(err) => BatchEntry {
                    line: err.position().map_or(fallback, csv::Position::line),
                    record: Err(err.to_string()),
                },
            };
            entries.push(entry);
        }

        Ok(entries)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("failed to read applicant batch: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid applicant batch: {0}")]
    Csv(#[from] csv::Error),
}

//! Tab-separated results sink
//!
//! The sink is recreated at the start of each run with a fixed header and is
//! only appended to afterwards. Every append of one page's rows happens under
//! an exclusive lock, so rows from concurrent pages never interleave.

use crate::WriteError;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// First line of every results file
pub const HEADER: &str = "source_url\tparsed_url\n";

/// One `(source, discovered)` row
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OutputRecord {
    source: String,
    target: String,
}

impl OutputRecord {
    /// Builds a record, rejecting values that would break the line format
    pub fn new(source: &str, target: &str) -> Result<Self, WriteError> {
        check_field("source_url", source)?;
        Self::with_checked_source(source, target)
    }

    /// Builds a record whose source has already passed [`check_field`]
    fn with_checked_source(source: &str, target: &str) -> Result<Self, WriteError> {
        check_field("parsed_url", target)?;
        Ok(Self {
            source: source.to_string(),
            target: target.to_string(),
        })
    }

    /// Formats the record as one sink line, newline included
    pub fn to_line(&self) -> String {
        format!("{}\t{}\n", self.source, self.target)
    }
}

fn check_field(field: &'static str, value: &str) -> Result<(), WriteError> {
    if value.contains(|c: char| matches!(c, '\t' | '\n' | '\r')) {
        return Err(WriteError::InvalidField {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

/// Counts from one page's append
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteReport {
    pub written: usize,
    pub rejected: usize,
}

/// Serialized appender for the results file
#[derive(Debug)]
pub struct ResultWriter {
    path: PathBuf,
    lock: Mutex<()>,
}

impl ResultWriter {
    /// Truncates (or creates) the sink and writes the header
    pub async fn create(path: impl AsRef<Path>) -> Result<Self, WriteError> {
        let path = path.as_ref().to_path_buf();
        let io_err = |source| WriteError::Io {
            path: path.clone(),
            source,
        };

        let mut file = tokio::fs::File::create(&path).await.map_err(io_err)?;
        file.write_all(HEADER.as_bytes()).await.map_err(io_err)?;
        file.flush().await.map_err(io_err)?;

        tracing::debug!("Created results file {}", path.display());
        Ok(Self {
            path,
            lock: Mutex::new(()),
        })
    }

    /// Appends one row per discovered URL for `source`
    ///
    /// An empty `discovered` set is a no-op. Targets containing tabs or line
    /// breaks are skipped with a warning; a source containing them fails the
    /// whole call because none of its rows could be written. Rows are written
    /// in sorted order with a single append while holding the lock.
    pub async fn write_results(
        &self,
        source: &str,
        discovered: &HashSet<String>,
    ) -> Result<WriteReport, WriteError> {
        if discovered.is_empty() {
            return Ok(WriteReport::default());
        }

        check_field("source_url", source)?;

        let mut report = WriteReport::default();
        let mut records = Vec::with_capacity(discovered.len());
        for target in discovered {
            match OutputRecord::with_checked_source(source, target) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!(source = %source, "Skipping record: {}", e);
                    report.rejected += 1;
                }
            }
        }

        if records.is_empty() {
            return Ok(report);
        }

        records.sort();
        let buf: String = records.iter().map(OutputRecord::to_line).collect();

        self.append(buf.as_bytes()).await?;

        report.written = records.len();
        tracing::info!(rows = report.written, "Wrote results for source URL: {}", source);
        Ok(report)
    }

    async fn append(&self, bytes: &[u8]) -> Result<(), WriteError> {
        let io_err = |source| WriteError::Io {
            path: self.path.clone(),
            source,
        };

        let _guard = self.lock.lock().await;
        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .await
            .map_err(io_err)?;
        file.write_all(bytes).await.map_err(io_err)?;
        file.flush().await.map_err(io_err)?;
        Ok(())
    }
}

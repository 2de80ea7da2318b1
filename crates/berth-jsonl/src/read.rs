//! Resilient JSONL reading.
//!
//! Reads a JSONL file line-by-line with buffered async I/O. Lines that fail
//! to parse are skipped and reported as [`Warning`]s so a single corrupt line
//! cannot take the whole catalog down with it.

use crate::error::Result;
use crate::warning::Warning;
use serde::de::DeserializeOwned;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Read a JSONL file, collecting every line that parses as `T`.
///
/// Empty lines are ignored. Whitespace-only lines and lines containing
/// invalid JSON are skipped and reported in the returned warning list with
/// their 1-based line numbers.
///
/// # Errors
///
/// Returns an error only if the file itself cannot be opened or read.
/// Parse failures never abort the read.
pub async fn read_jsonl_resilient<T, P>(path: P) -> Result<(Vec<T>, Vec<Warning>)>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path).await?;
    let mut lines = BufReader::new(file).lines();

    let mut records = Vec::new();
    let mut warnings = Vec::new();
    let mut line_number = 0usize;

    while let Some(line) = lines.next_line().await? {
        line_number += 1;

        if line.is_empty() {
            continue;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            warnings.push(Warning::SkippedLine {
                line_number,
                reason: "whitespace-only line".to_string(),
            });
            continue;
        }

        match serde_json::from_str::<T>(trimmed) {
            Ok(record) => records.push(record),
            Err(e) => {
                warnings.push(Warning::MalformedJson {
                    line_number,
                    error: e.to_string(),
                });
            }
        }
    }

    tracing::debug!(
        path = %path.display(),
        records = records.len(),
        warnings = warnings.len(),
        "read JSONL file"
    );

    Ok((records, warnings))
}

//! Atomic JSONL writing.
//!
//! On POSIX systems a rename within one filesystem is atomic. Writes here go
//! to a `.tmp` sibling first and are renamed over the target only after a
//! successful flush, so a crash mid-write leaves the original file intact.

use crate::error::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};

/// Atomically write a slice of values to a JSONL file.
///
/// Each value is serialized to a single JSON line. The data is written to a
/// temporary file next to `path` and renamed into place afterwards; on any
/// failure the original file is left unchanged and the temporary file is
/// removed on a best-effort basis.
///
/// # Errors
///
/// Returns an error if the temporary file cannot be created, any value fails
/// to serialize, an I/O error occurs, or the final rename fails.
pub async fn write_jsonl_atomic<T, P>(path: P, values: &[T]) -> Result<()>
where
    T: Serialize,
    P: AsRef<Path>,
{
    write_jsonl_atomic_iter(path, values.iter()).await
}

/// Atomically write an iterator of values to a JSONL file.
///
/// A more flexible form of [`write_jsonl_atomic`] that avoids collecting
/// into a slice first. See that function for the atomicity contract.
///
/// # Errors
///
/// See [`write_jsonl_atomic`].
pub async fn write_jsonl_atomic_iter<T, I, P>(path: P, values: I) -> Result<()>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let temp_path = make_temp_path(path);

    if let Err(e) = write_to_temp_file(&temp_path, values).await {
        // Best-effort cleanup; the original file is untouched either way.
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(e);
    }

    tokio::fs::rename(&temp_path, path).await?;
    Ok(())
}

/// Derive the temporary file path used during an atomic write.
fn make_temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map_or_else(
        || std::ffi::OsString::from("jsonl"),
        std::ffi::OsStr::to_os_string,
    );
    name.push(".tmp");
    path.with_file_name(name)
}

async fn write_to_temp_file<T, I>(temp_path: &Path, values: I) -> Result<()>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    let file = File::create(temp_path).await?;
    let mut writer = BufWriter::new(file);

    for value in values {
        let line = serde_json::to_string(&value)?;
        writer.write_all(line.as_bytes()).await?;
        writer.write_all(b"\n").await?;
    }

    writer.flush().await?;
    Ok(())
}

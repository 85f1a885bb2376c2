//! JSON-lines cycle recorder.
//!
//! Appends one JSON object per cycle to a per-role log file. Records are
//! only ever appended, never rewritten.

use super::recorder::{CycleRecord, CycleRecorder, RecordError};
use async_trait::async_trait;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Append-only JSONL file recorder.
///
/// Uses `spawn_blocking` to keep file I/O off the async runtime.
pub struct JsonlRecorder {
    file_path: Arc<PathBuf>,
}

impl JsonlRecorder {
    pub fn new(file_path: PathBuf) -> Self {
        Self {
            file_path: Arc::new(file_path),
        }
    }

    /// Recorder writing to the conventional per-role log name, so the
    /// receiver and provider sides of one channel never share a file.
    pub fn for_role(dir: &Path, is_stable_receiver: bool) -> Self {
        let name = if is_stable_receiver {
            "stablelog-receiver.jsonl"
        } else {
            "stablelog-provider.jsonl"
        };
        Self::new(dir.join(name))
    }
}

#[async_trait]
impl CycleRecorder for JsonlRecorder {
    async fn append(&self, record: &CycleRecord) -> Result<(), RecordError> {
        let file_path = Arc::clone(&self.file_path);
        let line = record.to_json_line()?;

        tokio::task::spawn_blocking(move || {
            if let Some(parent) = file_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&*file_path)?;
            writeln!(file, "{}", line)?;
            Ok::<(), RecordError>(())
        })
        .await
        .map_err(|e| RecordError::Io(std::io::Error::other(e)))??;

        Ok(())
    }
}

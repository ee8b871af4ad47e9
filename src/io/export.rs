//! JSON export of fit results.
//!
//! Every export shares one envelope so downstream scripts can tell which
//! command produced a file and when:
//!
//! ```json
//! { "tool": "nirfit", "generated_at": "...", "command": "poly", "result": { ... } }
//! ```

use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub const TOOL_NAME: &str = "nirfit";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportEnvelope<T> {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    pub command: String,
    pub result: T,
}

impl<T> ExportEnvelope<T> {
    pub fn new(command: impl Into<String>, result: T) -> Self {
        Self {
            tool: TOOL_NAME.to_string(),
            generated_at: Utc::now(),
            command: command.into(),
            result,
        }
    }
}

/// Write `result` wrapped in an envelope to a JSON file.
pub fn write_result_json<T: Serialize>(path: &Path, command: &str, result: &T) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export JSON '{}': {e}", path.display())))?;
    write_result(file, command, result)
}

pub fn write_result<W: Write, T: Serialize>(mut writer: W, command: &str, result: &T) -> Result<(), AppError> {
    let envelope = ExportEnvelope::new(command, result);
    serde_json::to_writer_pretty(&mut writer, &envelope)
        .map_err(|e| AppError::new(2, format!("Failed to write export JSON: {e}")))?;
    writeln!(writer).map_err(|e| AppError::new(2, format!("Failed to write export JSON: {e}")))?;
    Ok(())
}

//! File-backed touchpoint feed. `.jsonl` / `.ndjson` files hold one record per
//! line; anything else is read as a single JSON array.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use touchcredit_core::{TouchcreditError, TouchcreditResult, TouchpointRecord};
use tracing::{debug, info};

use crate::source::{DateWindow, JourneySource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    JsonArray,
    JsonLines,
}

impl FileFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if is_lines_extension(ext) => Self::JsonLines,
            _ => Self::JsonArray,
        }
    }
}

fn is_lines_extension(ext: &str) -> bool {
    ext.eq_ignore_ascii_case("jsonl") || ext.eq_ignore_ascii_case("ndjson")
}

pub struct FileSource {
    path: PathBuf,
    format: FileFormat,
    label: String,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let format = FileFormat::from_path(&path);
        let label = format!("file:{}", path.display());
        Self { path, format, label }
    }

    fn read_lines(&self) -> TouchcreditResult<Vec<TouchpointRecord>> {
        let reader = BufReader::new(File::open(&self.path)?);
        let mut records = Vec::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record = serde_json::from_str(&line).map_err(|e| {
                TouchcreditError::Source(format!(
                    "{}: line {}: {}",
                    self.path.display(),
                    idx + 1,
                    e
                ))
            })?;
            records.push(record);
        }
        Ok(records)
    }

    fn read_array(&self) -> TouchcreditResult<Vec<TouchpointRecord>> {
        let reader = BufReader::new(File::open(&self.path)?);
        serde_json::from_reader(reader)
            .map_err(|e| TouchcreditError::Source(format!("{}: {}", self.path.display(), e)))
    }
}

impl JourneySource for FileSource {
    fn name(&self) -> &str {
        &self.label
    }

    fn fetch(&self, window: &DateWindow) -> TouchcreditResult<Vec<TouchpointRecord>> {
        let records = match self.format {
            FileFormat::JsonLines => self.read_lines()?,
            FileFormat::JsonArray => self.read_array()?,
        };
        let read = records.len();
        let records: Vec<_> = records.into_iter().filter(|r| window.admits(r)).collect();

        debug!(read, kept = records.len(), "Applied date window");
        info!(
            path = %self.path.display(),
            format = ?self.format,
            records = records.len(),
            "Loaded touchpoint file"
        );
        Ok(records)
    }
}

use super::ResultStore;
use crate::error::AppError;
use crate::report::AnalysisRecord;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

/// Append-only file with one JSON record per line.
///
/// Writes are serialized through a mutex guarding the next id.
#[derive(Debug)]
pub struct JsonLinesResultStore {
    path: PathBuf,
    next_id: Mutex<u64>,
}

impl JsonLinesResultStore {
    /// Open or create the store, continuing ids after any existing records.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let path = path.into();
        let last_id = read_records(&path)?
            .iter()
            .map(|r| r.id)
            .max()
            .unwrap_or(0);
        debug!("Opened result store {} at id {}", path.display(), last_id);
        Ok(Self {
            path,
            next_id: Mutex::new(last_id + 1),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResultStore for JsonLinesResultStore {
    fn save(&self, mut record: AnalysisRecord) -> Result<u64, AppError> {
        let mut next_id = self
            .next_id
            .lock()
            .map_err(|_| AppError::Store("Result store lock poisoned".to_string()))?;
        record.id = *next_id;

        let mut line = serde_json::to_string(&record)?;
        line.push('\n');
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)?;

        let len = file.metadata()?.len();
        if len > 0 && !ends_with_newline(&mut file)? {
            // terminate a fragment left by an interrupted write
            line.insert(0, '\n');
        }
        if let Err(e) = file.write_all(line.as_bytes()) {
            if let Err(truncate) = file.set_len(len) {
                warn!("Could not roll back partial write to {}: {}", self.path.display(), truncate);
            }
            return Err(e.into());
        }

        *next_id += 1;
        Ok(record.id)
    }

    fn list(&self) -> Result<Vec<AnalysisRecord>, AppError> {
        let _guard = self
            .next_id
            .lock()
            .map_err(|_| AppError::Store("Result store lock poisoned".to_string()))?;
        let mut records = read_records(&self.path)?;
        records.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(records)
    }
}

fn ends_with_newline(file: &mut File) -> Result<bool, AppError> {
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

fn read_records(path: &Path) -> Result<Vec<AnalysisRecord>, AppError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let reader = BufReader::new(File::open(path)?);
    let mut records = Vec::new();
    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str(&line) {
            Ok(record) => records.push(record),
            Err(e) => warn!("Skipping malformed line {} in {}: {}", number + 1, path.display(), e),
        }
    }
    Ok(records)
}

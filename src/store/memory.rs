use super::ResultStore;
use crate::error::AppError;
use crate::report::AnalysisRecord;
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct InMemoryResultStore {
    records: Mutex<Vec<AnalysisRecord>>,
}

impl InMemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResultStore for InMemoryResultStore {
    fn save(&self, mut record: AnalysisRecord) -> Result<u64, AppError> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| AppError::Store("In-memory store lock poisoned".to_string()))?;
        record.id = records.len() as u64 + 1;
        let id = record.id;
        records.push(record);
        Ok(id)
    }

    fn list(&self) -> Result<Vec<AnalysisRecord>, AppError> {
        let records = self
            .records
            .lock()
            .map_err(|_| AppError::Store("In-memory store lock poisoned".to_string()))?;
        Ok(records.iter().rev().cloned().collect())
    }
}

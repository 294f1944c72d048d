use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::SheetBackend;
use crate::store::error::{Result, StoreError};

/// In-process sheet, used for tests and local runs without a spreadsheet.
#[derive(Debug, Default)]
pub struct MemorySheet {
    rows: Mutex<Vec<Vec<String>>>,
}

impl MemorySheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(rows: Vec<Vec<String>>) -> Self {
        Self {
            rows: Mutex::new(rows),
        }
    }

    /// Snapshot of the current rows. Returns nothing if the lock is poisoned.
    pub fn rows(&self) -> Vec<Vec<String>> {
        self.rows.lock().map(|rows| rows.clone()).unwrap_or_default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<Vec<String>>>> {
        self.rows
            .lock()
            .map_err(|_| StoreError::Backend("sheet lock poisoned".to_string()))
    }
}

#[async_trait]
impl SheetBackend for MemorySheet {
    async fn read_rows(&self) -> Result<Vec<Vec<String>>> {
        Ok(self.lock()?.clone())
    }

    async fn append_row(&self, row: Vec<String>) -> Result<()> {
        self.lock()?.push(row);
        Ok(())
    }

    async fn write_row(&self, position: usize, row: Vec<String>) -> Result<()> {
        let mut rows = self.lock()?;
        if rows.len() <= position {
            rows.resize(position + 1, Vec::new());
        }
        rows[position] = row;
        Ok(())
    }

    async fn clear_row(&self, position: usize) -> Result<()> {
        let mut rows = self.lock()?;
        if let Some(row) = rows.get_mut(position) {
            row.clear();
        }
        Ok(())
    }
}

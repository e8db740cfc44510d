use crate::model::{DisciplineRecord, RecordInput, ValidationError, now_millis};
use crate::seed::seed_records;
use chrono::NaiveDate;
use log::{debug, info};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_STORE_FILE: &str = "mtij_records_v3.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("gagal mengakses {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("data rekod dalam {path} rosak: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("gagal menukar rekod ke JSON: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("Fail tidak sah. ({0})")]
    InvalidImport(String),
    #[error("rekod {0} tidak dijumpai")]
    NotFound(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// The whole record collection, kept in one JSON file and written through
/// on every mutation.
#[derive(Debug)]
pub struct RecordStore {
    path: PathBuf,
    records: Vec<DisciplineRecord>,
}

impl RecordStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        Self::open_with_seed(path, seed_records())
    }

    /// Loads the store, appending any seed record whose id is missing.
    pub fn open_with_seed(
        path: impl Into<PathBuf>,
        seed: Vec<DisciplineRecord>,
    ) -> Result<Self, StoreError> {
        let path = path.into();
        let mut store = Self {
            path,
            records: Vec::new(),
        };

        if !store.path.exists() {
            info!("{} belum wujud, memuatkan data asas", store.path.display());
            store.persist(seed)?;
            return Ok(store);
        }

        let content = fs::read_to_string(&store.path).map_err(io_error(&store.path))?;
        let saved: Vec<DisciplineRecord> =
            serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
                path: store.path.clone(),
                source,
            })?;
        let saved_ids: HashSet<&str> = saved.iter().map(|r| r.id.as_str()).collect();
        let missing: Vec<DisciplineRecord> = seed
            .into_iter()
            .filter(|r| !saved_ids.contains(r.id.as_str()))
            .collect();

        if missing.is_empty() {
            store.records = saved;
        } else {
            info!("menambah {} rekod asas yang tiada", missing.len());
            let mut merged = saved;
            merged.extend(missing);
            store.persist(merged)?;
        }
        debug!("{} rekod dimuatkan", store.records.len());
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn records(&self) -> &[DisciplineRecord] {
        &self.records
    }

    pub fn get(&self, id: &str) -> Option<&DisciplineRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    fn ids(&self) -> HashSet<&str> {
        self.records.iter().map(|r| r.id.as_str()).collect()
    }

    pub fn add(&mut self, input: RecordInput) -> Result<DisciplineRecord, StoreError> {
        let record = input.into_record(&self.ids(), now_millis())?;
        let mut next = Vec::with_capacity(self.records.len() + 1);
        next.push(record.clone());
        next.extend(self.records.iter().cloned());
        self.persist(next)?;
        Ok(record)
    }

    /// Validates every input first; nothing is written if one fails.
    pub fn add_batch(
        &mut self,
        inputs: Vec<RecordInput>,
    ) -> Result<Vec<DisciplineRecord>, StoreError> {
        for input in &inputs {
            input.validate()?;
        }
        let created_at = now_millis();
        let mut taken: HashSet<String> = self.records.iter().map(|r| r.id.clone()).collect();
        let mut added = Vec::with_capacity(inputs.len());
        for input in inputs {
            let view: HashSet<&str> = taken.iter().map(String::as_str).collect();
            let record = input.into_record(&view, created_at)?;
            taken.insert(record.id.clone());
            added.push(record);
        }
        let mut next = added.clone();
        next.extend(self.records.iter().cloned());
        self.persist(next)?;
        Ok(added)
    }

    pub fn update(&mut self, id: &str, input: RecordInput) -> Result<DisciplineRecord, StoreError> {
        let existing = self
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let replaced = input.replace(existing)?;
        let next = self
            .records
            .iter()
            .map(|r| if r.id == id { replaced.clone() } else { r.clone() })
            .collect();
        self.persist(next)?;
        Ok(replaced)
    }

    pub fn delete(&mut self, id: &str) -> Result<DisciplineRecord, StoreError> {
        let removed = self
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let next = self.records.iter().filter(|r| r.id != id).cloned().collect();
        self.persist(next)?;
        Ok(removed)
    }

    /// Writes the full collection to `MTIJ_Backup_<date>.json` inside `dir`.
    pub fn export_to(&self, dir: &Path, today: NaiveDate) -> Result<PathBuf, StoreError> {
        let path = dir.join(backup_file_name(today));
        let json = serde_json::to_string_pretty(&self.records).map_err(StoreError::Encode)?;
        fs::write(&path, json).map_err(io_error(&path))?;
        Ok(path)
    }

    /// Appends records whose ids are new, returning how many were added.
    pub fn merge(&mut self, imported: Vec<DisciplineRecord>) -> Result<usize, StoreError> {
        let mut seen: HashSet<String> = self.records.iter().map(|r| r.id.clone()).collect();
        let fresh: Vec<DisciplineRecord> = imported
            .into_iter()
            .filter(|r| seen.insert(r.id.clone()))
            .collect();
        let added = fresh.len();
        let mut next = self.records.clone();
        next.extend(fresh);
        self.persist(next)?;
        Ok(added)
    }

    // Newest first, then written out before memory is updated.
    fn persist(&mut self, mut records: Vec<DisciplineRecord>) -> Result<(), StoreError> {
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let json = serde_json::to_string(&records).map_err(StoreError::Encode)?;
        fs::write(&self.path, json).map_err(io_error(&self.path))?;
        self.records = records;
        Ok(())
    }
}

pub fn backup_file_name(today: NaiveDate) -> String {
    format!("MTIJ_Backup_{}.json", today.format("%Y-%m-%d"))
}

/// Parses an import file; anything but a JSON array of records is rejected.
pub fn parse_import(content: &str) -> Result<Vec<DisciplineRecord>, StoreError> {
    let value: serde_json::Value =
        serde_json::from_str(content).map_err(|e| StoreError::InvalidImport(e.to_string()))?;
    if !value.is_array() {
        return Err(StoreError::InvalidImport("bukan senarai rekod".to_string()));
    }
    serde_json::from_value(value).map_err(|e| StoreError::InvalidImport(e.to_string()))
}

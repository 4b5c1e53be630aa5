use log::{debug, info};

use chrono::Local;
use serde::{Deserialize, Serialize};
use snafu::{prelude::*, Snafu};
use std::fs;
use std::path::{Path, PathBuf};

use survey_tally::RecordTypeDefinition;

pub type RecordId = u64;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum StorageError {
    #[snafu(display("Error opening store {path}"))]
    OpeningStore {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing store {path}"))]
    ParsingStore {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error writing store {path}"))]
    WritingStore {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error encoding store {path}"))]
    EncodingStore {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("record type {slug:?} is not registered"))]
    UnknownRecordType { slug: String },
    #[snafu(display("record {id} does not exist"))]
    UnknownRecord { id: RecordId },
}

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Eq, PartialEq, Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    Publish,
    Draft,
}

/// What a listing shows about a record.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RecordSummary {
    pub id: RecordId,
    pub title: String,
    pub status: RecordStatus,
    /// Local time, formatted with [TIMESTAMP_FORMAT].
    pub created: String,
}

/// Persistence of submissions.
///
/// Record ids grow with creation time.
pub trait SubmissionStore {
    fn create_record(
        &mut self,
        record_type: &str,
        title: &str,
        status: RecordStatus,
    ) -> StorageResult<RecordId>;

    fn attach_metadata(&mut self, id: RecordId, key: &str, value: &str) -> StorageResult<()>;

    fn set_status(&mut self, id: RecordId, status: RecordStatus) -> StorageResult<()>;

    /// The records of a type with the given status, oldest first.
    fn list_records(&self, record_type: &str, status: RecordStatus) -> StorageResult<Vec<RecordId>>;

    /// The metadata of a record, in the order it was attached.
    fn read_metadata(&self, id: RecordId) -> StorageResult<Vec<(String, String)>>;

    fn read_record(&self, id: RecordId) -> StorageResult<RecordSummary>;
}

/// Registration of record types.
pub trait RecordTypeHost {
    fn record_type_exists(&self, slug: &str) -> bool;

    fn register_record_type(&mut self, def: &RecordTypeDefinition) -> StorageResult<()>;
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
struct StoredRecordType {
    slug: String,
    name_plural: String,
    name_singular: String,
    menu_label: String,
    public: bool,
    supports: Vec<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
struct StoredRecord {
    id: RecordId,
    #[serde(rename = "type")]
    record_type: String,
    title: String,
    status: RecordStatus,
    created: String,
    meta: Vec<(String, String)>,
}

/// A store kept in memory.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryStore {
    #[serde(rename = "recordTypes")]
    record_types: Vec<StoredRecordType>,
    records: Vec<StoredRecord>,
    #[serde(rename = "lastId")]
    last_id: RecordId,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    fn record(&self, id: RecordId) -> StorageResult<&StoredRecord> {
        self.records
            .iter()
            .find(|r| r.id == id)
            .context(UnknownRecordSnafu { id })
    }
}

impl SubmissionStore for MemoryStore {
    fn create_record(
        &mut self,
        record_type: &str,
        title: &str,
        status: RecordStatus,
    ) -> StorageResult<RecordId> {
        if !self.record_type_exists(record_type) {
            return UnknownRecordTypeSnafu { slug: record_type }.fail();
        }
        self.last_id += 1;
        let id = self.last_id;
        self.records.push(StoredRecord {
            id,
            record_type: record_type.to_string(),
            title: title.to_string(),
            status,
            created: Local::now().format(TIMESTAMP_FORMAT).to_string(),
            meta: Vec::new(),
        });
        debug!("create_record: {:?} #{}: {:?}", record_type, id, title);
        Ok(id)
    }

    fn attach_metadata(&mut self, id: RecordId, key: &str, value: &str) -> StorageResult<()> {
        let record = self
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .context(UnknownRecordSnafu { id })?;
        record.meta.push((key.to_string(), value.to_string()));
        Ok(())
    }

    fn set_status(&mut self, id: RecordId, status: RecordStatus) -> StorageResult<()> {
        let record = self
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .context(UnknownRecordSnafu { id })?;
        record.status = status;
        Ok(())
    }

    fn list_records(&self, record_type: &str, status: RecordStatus) -> StorageResult<Vec<RecordId>> {
        Ok(self
            .records
            .iter()
            .filter(|r| r.record_type == record_type && r.status == status)
            .map(|r| r.id)
            .collect())
    }

    fn read_metadata(&self, id: RecordId) -> StorageResult<Vec<(String, String)>> {
        Ok(self.record(id)?.meta.clone())
    }

    fn read_record(&self, id: RecordId) -> StorageResult<RecordSummary> {
        let r = self.record(id)?;
        Ok(RecordSummary {
            id: r.id,
            title: r.title.clone(),
            status: r.status,
            created: r.created.clone(),
        })
    }
}

impl RecordTypeHost for MemoryStore {
    fn record_type_exists(&self, slug: &str) -> bool {
        self.record_types.iter().any(|t| t.slug == slug)
    }

    fn register_record_type(&mut self, def: &RecordTypeDefinition) -> StorageResult<()> {
        self.record_types.retain(|t| t.slug != def.slug);
        self.record_types.push(StoredRecordType {
            slug: def.slug.clone(),
            name_plural: def.name_plural.clone(),
            name_singular: def.name_singular.clone(),
            menu_label: def.menu_label.clone(),
            public: def.is_public,
            supports: def.supports_fields.clone(),
        });
        Ok(())
    }
}

/// A [MemoryStore] saved to a JSON file after every change.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl JsonFileStore {
    /// Opens the store at the given path. A missing file is an empty store.
    pub fn open(path: &Path) -> StorageResult<JsonFileStore> {
        let p = path.display().to_string();
        let inner = if path.exists() {
            let contents = fs::read_to_string(path).context(OpeningStoreSnafu { path: p.clone() })?;
            serde_json::from_str(&contents).context(ParsingStoreSnafu { path: p })?
        } else {
            info!("open: no store at {:?}, starting an empty one", p);
            MemoryStore::new()
        };
        Ok(JsonFileStore {
            path: path.to_path_buf(),
            inner,
        })
    }

    fn save(&self) -> StorageResult<()> {
        let p = self.path.display().to_string();
        let js = serde_json::to_string_pretty(&self.inner).context(EncodingStoreSnafu { path: p.clone() })?;
        fs::write(&self.path, js).context(WritingStoreSnafu { path: p })
    }
}

impl SubmissionStore for JsonFileStore {
    fn create_record(
        &mut self,
        record_type: &str,
        title: &str,
        status: RecordStatus,
    ) -> StorageResult<RecordId> {
        let id = self.inner.create_record(record_type, title, status)?;
        self.save()?;
        Ok(id)
    }

    fn attach_metadata(&mut self, id: RecordId, key: &str, value: &str) -> StorageResult<()> {
        self.inner.attach_metadata(id, key, value)?;
        self.save()
    }

    fn set_status(&mut self, id: RecordId, status: RecordStatus) -> StorageResult<()> {
        self.inner.set_status(id, status)?;
        self.save()
    }

    fn list_records(&self, record_type: &str, status: RecordStatus) -> StorageResult<Vec<RecordId>> {
        self.inner.list_records(record_type, status)
    }

    fn read_metadata(&self, id: RecordId) -> StorageResult<Vec<(String, String)>> {
        self.inner.read_metadata(id)
    }

    fn read_record(&self, id: RecordId) -> StorageResult<RecordSummary> {
        self.inner.read_record(id)
    }
}

impl RecordTypeHost for JsonFileStore {
    fn record_type_exists(&self, slug: &str) -> bool {
        self.inner.record_type_exists(slug)
    }

    fn register_record_type(&mut self, def: &RecordTypeDefinition) -> StorageResult<()> {
        self.inner.register_record_type(def)?;
        self.save()
    }
}

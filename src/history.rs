//! Catalog of the domains a user derives passwords for, with the schema used
//! for each, persisted as a JSON array.
//!
//! Nothing secret is stored: an entry only says which schema to apply to a
//! domain. Entries are kept sorted by domain (case-insensitive), then schema
//! name, then size, and entries comparing equal on that key are merged.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::io::{Read, Write};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::schema::{FormatVersion, Schema, SchemaError, SAFE_NAME};

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("history I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed history JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("history root must be a JSON array")]
    NotAnArray,

    #[error("history entry {0} has no domain")]
    MissingDomain(usize),

    #[error("history entry {index}: {source}")]
    Schema {
        index: usize,
        #[source]
        source: SchemaError,
    },
}

/// A domain and the schema its password is derived with.
#[derive(Clone, Debug)]
pub struct Entry {
    pub domain: String,
    pub schema: Schema,
    pub version: FormatVersion,
}

impl Entry {
    pub fn new(domain: impl Into<String>, schema: Schema) -> Self {
        Self::with_version(domain, schema, FormatVersion::CURRENT)
    }

    pub fn with_version(domain: impl Into<String>, schema: Schema, version: FormatVersion) -> Self {
        Self {
            domain: domain.into(),
            schema,
            version,
        }
    }

    fn from_record(index: usize, record: EntryRecord) -> Result<Self, HistoryError> {
        let domain = record.domain.ok_or(HistoryError::MissingDomain(index))?;
        let version = match record.version {
            Some(v) => FormatVersion::try_from(v),
            None => Ok(FormatVersion::CURRENT),
        }
        .map_err(|source| HistoryError::Schema { index, source })?;
        let name = record.schema.as_deref().unwrap_or(SAFE_NAME);
        let schema = Schema::from_name(name, record.size, version)
            .map_err(|source| HistoryError::Schema { index, source })?;
        Ok(Self::with_version(domain, schema, version))
    }

    fn to_record(&self) -> EntryRecord {
        EntryRecord {
            schema: Some(self.schema.name().to_string()),
            domain: Some(self.domain.clone()),
            size: Some(i64::from(self.schema.size())),
            version: (self.version != FormatVersion::CURRENT).then(|| self.version.as_u32()),
        }
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_ignore_case(&self.domain, &other.domain)
            .then_with(|| cmp_ignore_case(self.schema.name(), other.schema.name()))
            .then_with(|| self.schema.size().cmp(&other.schema.size()))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

/// On-disk shape of an entry. Field order is the serialized key order.
#[derive(Serialize, Deserialize)]
struct EntryRecord {
    #[serde(default)]
    schema: Option<String>,
    #[serde(default)]
    domain: Option<String>,
    #[serde(default)]
    size: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    version: Option<u32>,
}

/// Sorted set of unique entries.
#[derive(Clone, Debug, Default)]
pub struct History {
    entries: BTreeSet<Entry>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: impl IntoIterator<Item = Entry>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Adds `entry`. Returns false, leaving the history unchanged, if an equal
    /// entry is already present.
    pub fn add(&mut self, entry: Entry) -> bool {
        self.entries.insert(entry)
    }

    /// Removes `entry`. Returns false if it was not present.
    pub fn remove(&mut self, entry: &Entry) -> bool {
        self.entries.remove(entry)
    }

    /// All entries, sorted.
    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    /// Entries for `domain`, compared case-insensitively.
    pub fn for_domain<'a>(&'a self, domain: &'a str) -> impl Iterator<Item = &'a Entry> {
        self.entries
            .iter()
            .filter(move |e| cmp_ignore_case(&e.domain, domain) == Ordering::Equal)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reads a history from its JSON form.
    ///
    /// Array elements that are not objects are skipped. Any entry that cannot
    /// be understood fails the whole load.
    pub fn load_from<R: Read>(reader: R) -> Result<Self, HistoryError> {
        let root: Value = serde_json::from_reader(reader)?;
        let Value::Array(items) = root else {
            return Err(HistoryError::NotAnArray);
        };

        let mut history = History::new();
        for (index, item) in items.into_iter().enumerate() {
            if !item.is_object() {
                continue;
            }
            let record: EntryRecord = serde_json::from_value(item)?;
            history.add(Entry::from_record(index, record)?);
        }
        tracing::debug!(entries = history.len(), "loaded history");
        Ok(history)
    }

    /// Writes the JSON form of the history, sorted, and flushes `writer`.
    pub fn save_to<W: Write>(&self, mut writer: W) -> Result<(), HistoryError> {
        let records: Vec<EntryRecord> = self.entries.iter().map(Entry::to_record).collect();
        serde_json::to_writer(&mut writer, &records)?;
        writer.flush()?;
        Ok(())
    }
}

fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

//! Immutable, shared record sequences loaded once per run.
mod loader;


use std::sync::Arc;

pub use loader::{load_dataset, load_dataset_file};

/// Column a dataset must provide for every record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Named(&'static str),
    Position(usize),
}

/// Columns every credential record must carry.
pub const CREDENTIAL_FIELDS: [Field; 2] = [Field::Named("email"), Field::Named("password")];

/// Product names are read from the first column whatever its header.
pub const PRODUCT_FIELDS: [Field; 1] = [Field::Position(0)];

/// One dataset row: header/value pairs in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    pub(crate) const fn new(fields: Vec<(String, String)>) -> Self {
        Self { fields }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(header, _)| header.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    #[must_use]
    pub fn value_at(&self, position: usize) -> Option<&str> {
        self.fields.get(position).map(|(_, value)| value.as_str())
    }

    #[must_use]
    pub fn field(&self, field: Field) -> Option<&str> {
        match field {
            Field::Named(name) => self.get(name),
            Field::Position(position) => self.value_at(position),
        }
    }
}

/// Ordered, non-empty record sequence shared read-only by every worker.
/// Cloning only bumps a reference count.
#[derive(Debug, Clone)]
pub struct Dataset {
    name: Arc<str>,
    records: Arc<[Record]>,
}

impl Dataset {
    /// Returns `None` when `records` is empty.
    #[must_use]
    pub fn new(name: &str, records: Vec<Record>) -> Option<Self> {
        if records.is_empty() {
            return None;
        }
        Some(Self {
            name: Arc::from(name),
            records: Arc::from(records),
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Returns the record at `index` modulo the dataset length, so any
    /// worker or iteration number maps onto the finite sequence.
    #[must_use]
    pub fn get(&self, index: u64) -> Option<&Record> {
        let len = u64::try_from(self.records.len()).ok()?;
        let position = index.checked_rem(len)?;
        self.records.get(usize::try_from(position).ok()?)
    }
}

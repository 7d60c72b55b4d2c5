//! Storage seam between the request layer and whatever persists schedules.

use crate::{
    error::Result,
    models::record::{AssetDepreciationRecord, StoredRecord},
};

pub trait DepreciationStore {
    fn insert(&self, record: &AssetDepreciationRecord) -> Result<StoredRecord>;

    /// Writes a whole schedule atomically: every row or none.
    fn insert_schedule(&self, records: &[AssetDepreciationRecord]) -> Result<Vec<StoredRecord>>;

    /// All records in insertion order.
    fn find_all(&self) -> Result<Vec<StoredRecord>>;

    /// Returns the number of records removed.
    fn delete_all(&self) -> Result<usize>;
}

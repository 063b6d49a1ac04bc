//! Record persistence: the document-store seam.
//!
//! Handlers talk to `Arc<dyn RecordStore>` only. Production uses
//! `PgRecordStore`; tests swap in `memory::InMemoryRecordStore`.

use async_trait::async_trait;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::record::Record;

#[cfg(test)]
pub mod memory;
pub mod postgres;

/// The three record collections the portal persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Applications,
    Inquiries,
    Positions,
}

/// Listing order for a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListOrder {
    NewestFirst,
    TitleAscending,
}

impl Collection {
    pub fn table(self) -> &'static str {
        match self {
            Collection::Applications => "applications",
            Collection::Inquiries => "inquiries",
            Collection::Positions => "positions",
        }
    }

    pub fn list_order(self) -> ListOrder {
        match self {
            Collection::Applications | Collection::Inquiries => ListOrder::NewestFirst,
            Collection::Positions => ListOrder::TitleAscending,
        }
    }
}

/// A partial update, split into the document merge and the viewed flag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordPatch {
    pub fields: Map<String, Value>,
    pub viewed: Option<bool>,
}

impl RecordPatch {
    /// Splits a raw admin payload. `id` and `submittedAt` are dropped; a boolean
    /// `viewed` targets the flag, anything else under `viewed` is discarded.
    pub fn from_document(mut doc: Map<String, Value>) -> Self {
        doc.remove("id");
        doc.remove("submittedAt");
        let viewed = doc.remove("viewed").and_then(|v| v.as_bool());
        RecordPatch {
            fields: doc,
            viewed,
        }
    }
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Persists a new record with a server-assigned id and timestamp, unviewed.
    async fn insert(
        &self,
        collection: Collection,
        document: Map<String, Value>,
    ) -> Result<Record, AppError>;

    async fn list(&self, collection: Collection) -> Result<Vec<Record>, AppError>;

    async fn get(&self, collection: Collection, id: Uuid) -> Result<Option<Record>, AppError>;

    /// Shallow-merges the patch. Returns false when no record has this id.
    async fn update(
        &self,
        collection: Collection,
        id: Uuid,
        patch: RecordPatch,
    ) -> Result<bool, AppError>;

    /// Returns whether a record was removed.
    async fn delete(&self, collection: Collection, id: Uuid) -> Result<bool, AppError>;

    /// Flags every unviewed record as viewed and returns how many changed.
    async fn mark_all_viewed(&self, collection: Collection) -> Result<u64, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_patch_splits_viewed_flag() {
        let patch = RecordPatch::from_document(object(json!({
            "status": "Interview",
            "viewed": true
        })));
        assert_eq!(patch.viewed, Some(true));
        assert_eq!(patch.fields.len(), 1);
        assert_eq!(patch.fields["status"], "Interview");
    }

    #[test]
    fn test_patch_ignores_immutable_keys() {
        let patch = RecordPatch::from_document(object(json!({
            "id": "00000000-0000-0000-0000-000000000000",
            "submittedAt": "2020-01-01T00:00:00Z",
            "notes": "call back"
        })));
        assert!(patch.viewed.is_none());
        assert_eq!(patch.fields.keys().collect::<Vec<_>>(), vec!["notes"]);
    }

    #[test]
    fn test_non_boolean_viewed_is_discarded() {
        let patch = RecordPatch::from_document(object(json!({ "viewed": "yes" })));
        assert!(patch.viewed.is_none());
        assert!(patch.fields.is_empty());
    }

    #[test]
    fn test_collection_ordering() {
        assert_eq!(Collection::Applications.list_order(), ListOrder::NewestFirst);
        assert_eq!(Collection::Inquiries.list_order(), ListOrder::NewestFirst);
        assert_eq!(Collection::Positions.list_order(), ListOrder::TitleAscending);
        assert_eq!(Collection::Positions.table(), "positions");
    }
}

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::record::{strip_reserved, Record};
use crate::records::{Collection, ListOrder, RecordPatch, RecordStore};

/// Test double for `RecordStore`. Ties on timestamp break by insertion order.
#[derive(Default)]
pub struct InMemoryRecordStore {
    inner: Mutex<HashMap<Collection, Vec<(u64, Record)>>>,
    seq: Mutex<u64>,
}

impl InMemoryRecordStore {
    pub fn count(&self, collection: Collection) -> usize {
        self.inner
            .lock()
            .unwrap()
            .get(&collection)
            .map_or(0, Vec::len)
    }

    pub fn snapshot(&self, collection: Collection) -> Vec<Record> {
        self.inner
            .lock()
            .unwrap()
            .get(&collection)
            .map(|rows| rows.iter().map(|(_, r)| r.clone()).collect())
            .unwrap_or_default()
    }

    /// Seeds a record verbatim, including its envelope fields.
    pub fn seed(&self, collection: Collection, record: Record) {
        let seq = self.next_seq();
        self.inner
            .lock()
            .unwrap()
            .entry(collection)
            .or_default()
            .push((seq, record));
    }

    fn next_seq(&self) -> u64 {
        let mut seq = self.seq.lock().unwrap();
        *seq += 1;
        *seq
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn insert(
        &self,
        collection: Collection,
        document: Map<String, Value>,
    ) -> Result<Record, AppError> {
        let record = Record {
            id: Uuid::new_v4(),
            submitted_at: Utc::now(),
            viewed: false,
            data: strip_reserved(document),
        };
        self.seed(collection, record.clone());
        Ok(record)
    }

    async fn list(&self, collection: Collection) -> Result<Vec<Record>, AppError> {
        let mut rows = self
            .inner
            .lock()
            .unwrap()
            .get(&collection)
            .cloned()
            .unwrap_or_default();
        match collection.list_order() {
            ListOrder::NewestFirst => rows.sort_by(|(sa, a), (sb, b)| {
                b.submitted_at.cmp(&a.submitted_at).then(sb.cmp(sa))
            }),
            // Untitled records sort last, like `NULLS LAST` in Postgres.
            ListOrder::TitleAscending => rows.sort_by(|(_, a), (_, b)| {
                match (a.field_str("title"), b.field_str("title")) {
                    (Some(x), Some(y)) => x.cmp(y),
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                }
            }),
        }
        Ok(rows.into_iter().map(|(_, r)| r).collect())
    }

    async fn get(&self, collection: Collection, id: Uuid) -> Result<Option<Record>, AppError> {
        Ok(self
            .snapshot(collection)
            .into_iter()
            .find(|record| record.id == id))
    }

    async fn update(
        &self,
        collection: Collection,
        id: Uuid,
        patch: RecordPatch,
    ) -> Result<bool, AppError> {
        let mut inner = self.inner.lock().unwrap();
        let Some((_, record)) = inner
            .get_mut(&collection)
            .and_then(|rows| rows.iter_mut().find(|(_, r)| r.id == id))
        else {
            return Ok(false);
        };
        record.data.extend(patch.fields);
        if let Some(viewed) = patch.viewed {
            record.viewed = viewed;
        }
        Ok(true)
    }

    async fn delete(&self, collection: Collection, id: Uuid) -> Result<bool, AppError> {
        let mut inner = self.inner.lock().unwrap();
        let Some(rows) = inner.get_mut(&collection) else {
            return Ok(false);
        };
        let before = rows.len();
        rows.retain(|(_, r)| r.id != id);
        Ok(rows.len() < before)
    }

    async fn mark_all_viewed(&self, collection: Collection) -> Result<u64, AppError> {
        let mut inner = self.inner.lock().unwrap();
        let mut updated = 0;
        if let Some(rows) = inner.get_mut(&collection) {
            for (_, record) in rows.iter_mut().filter(|(_, r)| !r.viewed) {
                record.viewed = true;
                updated += 1;
            }
        }
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_positions_list_sorted_by_title() {
        let store = InMemoryRecordStore::default();
        for title in ["QA Analyst", "Data Annotator", "Linguist"] {
            store
                .insert(Collection::Positions, doc(json!({ "title": title })))
                .await
                .unwrap();
        }
        let titles: Vec<_> = store
            .list(Collection::Positions)
            .await
            .unwrap()
            .iter()
            .map(|r| r.field_str("title").unwrap().to_string())
            .collect();
        assert_eq!(titles, vec!["Data Annotator", "Linguist", "QA Analyst"]);
    }

    #[tokio::test]
    async fn test_untitled_positions_sort_last() {
        let store = InMemoryRecordStore::default();
        store
            .insert(Collection::Positions, doc(json!({ "location": "Remote" })))
            .await
            .unwrap();
        store
            .insert(Collection::Positions, doc(json!({ "title": "Linguist" })))
            .await
            .unwrap();
        let listed = store.list(Collection::Positions).await.unwrap();
        assert_eq!(listed[0].field_str("title"), Some("Linguist"));
        assert_eq!(listed[1].field_str("title"), None);
    }

    #[tokio::test]
    async fn test_newest_first_breaks_ties_by_insertion() {
        let store = InMemoryRecordStore::default();
        let first = store
            .insert(Collection::Inquiries, doc(json!({ "name": "first" })))
            .await
            .unwrap();
        let second = store
            .insert(Collection::Inquiries, doc(json!({ "name": "second" })))
            .await
            .unwrap();
        let listed = store.list(Collection::Inquiries).await.unwrap();
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[1].id, first.id);
    }

    #[tokio::test]
    async fn test_update_unknown_id_reports_missing() {
        let store = InMemoryRecordStore::default();
        let updated = store
            .update(Collection::Applications, Uuid::new_v4(), RecordPatch::default())
            .await
            .unwrap();
        assert!(!updated);
    }
}

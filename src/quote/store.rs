//! In-memory submission store.
//!
//! Records live for the process lifetime: append-only, insertion ordered, no
//! trimming. The handle is cheap to clone and safe to share across tasks.

use std::sync::Arc;
use tokio::sync::RwLock;

use super::model::QuoteRecord;

#[derive(Clone, Debug, Default)]
pub struct SubmissionStore {
    records: Arc<RwLock<Vec<QuoteRecord>>>,
}

impl SubmissionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn append(&self, record: QuoteRecord) {
        self.records.write().await.push(record);
    }

    /// Snapshot of every record, oldest first.
    pub async fn list_recent(&self) -> Vec<QuoteRecord> {
        self.records.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quote::model::tests::sample_request;

    #[tokio::test]
    async fn keeps_insertion_order() {
        let store = SubmissionStore::new();
        assert!(store.is_empty().await);

        for name in ["Anne", "Bruno", "Chloé"] {
            let mut request = sample_request();
            request.name = name.to_string();
            store.append(QuoteRecord::accept(request)).await;
        }

        let names: Vec<String> = store
            .list_recent()
            .await
            .into_iter()
            .map(|record| record.request().name.clone())
            .collect();
        assert_eq!(names, vec!["Anne", "Bruno", "Chloé"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_appends_are_not_lost() {
        let store = SubmissionStore::new();
        let mut handles = Vec::new();

        for index in 0..64 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let mut request = sample_request();
                request.name = format!("client-{index}");
                store.append(QuoteRecord::accept(request)).await;
            }));
        }

        for handle in handles {
            assert!(handle.await.is_ok());
        }

        let records = store.list_recent().await;
        assert_eq!(records.len(), 64);
        let mut names: Vec<String> = records
            .iter()
            .map(|record| record.request().name.clone())
            .collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 64);
    }
}

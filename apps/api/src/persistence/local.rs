//! Local JSON file store for completed assessments.
//!
//! The whole file is one JSON array, rewritten on every save. Writes are
//! serialized through a mutex so concurrent saves cannot drop records.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::persistence::{PersistenceError, ResultSink, SavedAssessment};

#[derive(Clone)]
pub struct LocalStore {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl LocalStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    /// All saved assessments, oldest first. A missing file means none yet.
    pub async fn list(&self) -> Result<Vec<SavedAssessment>, PersistenceError> {
        let _guard = self.lock.lock().await;
        self.read_all().await
    }

    pub async fn append(&self, record: &SavedAssessment) -> Result<(), PersistenceError> {
        let _guard = self.lock.lock().await;
        let mut records = self.read_all().await?;
        records.push(record.clone());

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let bytes = serde_json::to_vec_pretty(&records)?;
        tokio::fs::write(&self.path, bytes).await?;

        debug!(
            "Local store {} now holds {} assessments",
            self.path.display(),
            records.len()
        );
        Ok(())
    }

    async fn read_all(&self) -> Result<Vec<SavedAssessment>, PersistenceError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(Vec::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl ResultSink for LocalStore {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn save(&self, record: &SavedAssessment) -> Result<(), PersistenceError> {
        self.append(record).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::models::{AssessmentResult, Biodata};
    use tempfile::tempdir;

    fn record(name: &str, rate: u32) -> SavedAssessment {
        let biodata = Biodata {
            full_name: name.to_string(),
            ..Default::default()
        };
        let result = AssessmentResult {
            success_rate: rate,
            strengths: vec!["basics".to_string()],
            weaknesses: vec![],
            recommendations: vec![],
        };
        SavedAssessment::new(&biodata, None, &result)
    }

    #[tokio::test]
    async fn test_missing_file_lists_empty() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path().join("results.json"));
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_append_then_list_in_order() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path().join("nested/results.json"));

        let first = record("First", 60);
        let second = record("Second", 90);
        store.append(&first).await.unwrap();
        store.append(&second).await.unwrap();

        let saved = store.list().await.unwrap();
        assert_eq!(saved, vec![first, second]);
    }

    #[tokio::test]
    async fn test_concurrent_saves_keep_every_record() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path().join("results.json"));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move { store.save(&record(&format!("user{i}"), 70)).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.list().await.unwrap().len(), 8);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("results.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = LocalStore::new(path).list().await.unwrap_err();
        assert!(matches!(err, PersistenceError::Serde(_)));
    }
}

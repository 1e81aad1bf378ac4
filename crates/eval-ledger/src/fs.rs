//! Filesystem-backed run store.
//!
//! Layout: one pretty-printed JSON document per run at `<root>/<run_id>.json`.
//! Writes are atomic (temp file in the same directory, then rename), so a
//! crashed save never leaves a half-written document behind for listing to
//! trip over.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::NamedTempFile;
use uuid::Uuid;

use crate::error::StorageError;
use crate::model::EvalRun;
use crate::store::{high_water_mark, sort_newest_first, RunStore, StorageResult};

/// Default directory for persisted runs, relative to the working directory.
pub const DEFAULT_STORE_DIR: &str = ".eval_runs";

/// Run store persisting each run as a JSON file under a root directory.
pub struct FsRunStore {
    root: PathBuf,
}

impl FsRunStore {
    /// Create a store rooted at `root`. The directory is created lazily on
    /// first save, so listing an absent directory is an empty history rather
    /// than an error.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Store rooted at [`DEFAULT_STORE_DIR`].
    pub fn default_location() -> Self {
        Self::new(DEFAULT_STORE_DIR)
    }

    fn run_path(&self, run_id: &Uuid) -> PathBuf {
        self.root.join(format!("{run_id}.json"))
    }

    /// Read every persisted run document. Any unreadable or undecodable
    /// document is an error: revision assignment must not proceed over a
    /// partial view of history.
    fn read_all(&self) -> StorageResult<Vec<EvalRun>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut runs = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let text = fs::read_to_string(&path)?;
            let run: EvalRun =
                serde_json::from_str(&text).map_err(|e| StorageError::Corrupt {
                    path: path.clone(),
                    detail: e.to_string(),
                })?;
            runs.push(run);
        }
        Ok(runs)
    }

    fn write_run(&self, run: &EvalRun) -> StorageResult<()> {
        fs::create_dir_all(&self.root)?;
        let path = self.run_path(&run.id);
        if path.exists() {
            return Err(StorageError::DuplicateRun {
                run_id: run.id.to_string(),
            });
        }

        let json = serde_json::to_string_pretty(run)?;
        let mut tmp = NamedTempFile::new_in(&self.root)?;
        tmp.write_all(json.as_bytes())?;
        tmp.persist(&path).map_err(|e| StorageError::Io(e.error))?;
        Ok(())
    }
}

#[async_trait]
impl RunStore for FsRunStore {
    async fn save_run(&self, mut run: EvalRun) -> StorageResult<EvalRun> {
        if run.revision.is_none() {
            run.revision = Some(high_water_mark(&self.read_all()?) + 1);
        }
        self.write_run(&run)?;
        tracing::debug!(run_id = %run.id, revision = ?run.revision, "run persisted");
        Ok(run)
    }

    async fn save_batch(&self, batch: Vec<EvalRun>) -> StorageResult<Vec<EvalRun>> {
        let revision = high_water_mark(&self.read_all()?) + 1;

        let mut saved = Vec::with_capacity(batch.len());
        for mut run in batch {
            if run.revision.is_none() {
                run.revision = Some(revision);
            }
            self.write_run(&run)?;
            saved.push(run);
        }
        Ok(saved)
    }

    async fn get_run(&self, run_id: &Uuid) -> StorageResult<EvalRun> {
        let path = self.run_path(run_id);
        let text = fs::read_to_string(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::RunNotFound {
                    run_id: run_id.to_string(),
                }
            } else {
                StorageError::Io(e)
            }
        })?;
        serde_json::from_str(&text).map_err(|e| StorageError::Corrupt {
            path,
            detail: e.to_string(),
        })
    }

    async fn list_runs(&self, suite_id: Option<&str>) -> StorageResult<Vec<EvalRun>> {
        let mut runs = self.read_all()?;
        if let Some(suite) = suite_id {
            runs.retain(|r| r.suite_id == suite);
        }
        sort_newest_first(&mut runs);
        Ok(runs)
    }

    async fn next_revision(&self) -> StorageResult<u64> {
        Ok(high_water_mark(&self.read_all()?) + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EvalResult;

    fn make_store() -> (tempfile::TempDir, FsRunStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FsRunStore::new(dir.path());
        (dir, store)
    }

    fn run_for(suite: &str) -> EvalRun {
        let result = EvalResult::new(suite, "case-1", "gpt-4o-mini", "p", "r", true, 1.0, vec![]);
        EvalRun::new(suite, "gpt-4o-mini", vec![result])
    }

    #[tokio::test]
    async fn save_and_get_roundtrip() {
        let (_dir, store) = make_store();
        let saved = store.save_run(run_for("suite-a")).await.unwrap();
        let got = store.get_run(&saved.id).await.unwrap();
        assert_eq!(saved, got);
    }

    #[tokio::test]
    async fn get_missing_run_is_not_found() {
        let (_dir, store) = make_store();
        let missing = Uuid::new_v4();
        match store.get_run(&missing).await {
            Err(StorageError::RunNotFound { run_id }) => {
                assert_eq!(run_id, missing.to_string());
            }
            other => panic!("expected RunNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn duplicate_save_is_rejected() {
        let (_dir, store) = make_store();
        let saved = store.save_run(run_for("suite-a")).await.unwrap();
        match store.save_run(saved).await {
            Err(StorageError::DuplicateRun { .. }) => {}
            other => panic!("expected DuplicateRun, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn list_filters_by_suite_and_orders_newest_first() {
        let (_dir, store) = make_store();
        let mut older = run_for("suite-a");
        older.timestamp -= chrono::Duration::seconds(60);
        let older = store.save_run(older).await.unwrap();
        let newer = store.save_run(run_for("suite-a")).await.unwrap();
        store.save_run(run_for("suite-b")).await.unwrap();

        let listed = store.list_runs(Some("suite-a")).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, newer.id);
        assert_eq!(listed[1].id, older.id);
    }

    #[tokio::test]
    async fn listing_empty_directory_is_empty_history() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsRunStore::new(dir.path().join("never-created"));
        assert!(store.list_runs(None).await.unwrap().is_empty());
        assert_eq!(store.next_revision().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn corrupt_document_fails_listing_loudly() {
        let (dir, store) = make_store();
        store.save_run(run_for("suite-a")).await.unwrap();
        fs::write(dir.path().join("broken.json"), "{ not json").unwrap();

        match store.list_runs(None).await {
            Err(StorageError::Corrupt { .. }) => {}
            other => panic!("expected Corrupt, got {other:?}"),
        }
        // Revision assignment must refuse to guess over unreadable history.
        assert!(store.next_revision().await.is_err());
    }
}

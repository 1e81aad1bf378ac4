//! In-memory run store (testing only)
//!
//! `MemoryRunStore` satisfies the `RunStore` contract without touching the
//! filesystem. The mutex is held across the scan-then-stamp sequence, so
//! revision uniqueness holds for concurrent in-process callers.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StorageError;
use crate::model::EvalRun;
use crate::store::{high_water_mark, sort_newest_first, RunStore, StorageResult};

/// In-memory run store backed by a `HashMap<run_id, EvalRun>`.
#[derive(Debug, Default)]
pub struct MemoryRunStore {
    runs: Mutex<HashMap<Uuid, EvalRun>>,
}

impl MemoryRunStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn stamp_and_insert(
        runs: &mut HashMap<Uuid, EvalRun>,
        mut run: EvalRun,
        revision: u64,
    ) -> StorageResult<EvalRun> {
        if runs.contains_key(&run.id) {
            return Err(StorageError::DuplicateRun {
                run_id: run.id.to_string(),
            });
        }
        if run.revision.is_none() {
            run.revision = Some(revision);
        }
        runs.insert(run.id, run.clone());
        Ok(run)
    }
}

#[async_trait]
impl RunStore for MemoryRunStore {
    async fn save_run(&self, run: EvalRun) -> StorageResult<EvalRun> {
        let mut runs = self.runs.lock().unwrap();
        let all: Vec<EvalRun> = runs.values().cloned().collect();
        let revision = high_water_mark(&all) + 1;
        Self::stamp_and_insert(&mut runs, run, revision)
    }

    async fn save_batch(&self, batch: Vec<EvalRun>) -> StorageResult<Vec<EvalRun>> {
        let mut runs = self.runs.lock().unwrap();
        let all: Vec<EvalRun> = runs.values().cloned().collect();
        let revision = high_water_mark(&all) + 1;

        let mut saved = Vec::with_capacity(batch.len());
        for run in batch {
            saved.push(Self::stamp_and_insert(&mut runs, run, revision)?);
        }
        Ok(saved)
    }

    async fn get_run(&self, run_id: &Uuid) -> StorageResult<EvalRun> {
        let runs = self.runs.lock().unwrap();
        runs.get(run_id)
            .cloned()
            .ok_or_else(|| StorageError::RunNotFound {
                run_id: run_id.to_string(),
            })
    }

    async fn list_runs(&self, suite_id: Option<&str>) -> StorageResult<Vec<EvalRun>> {
        let runs = self.runs.lock().unwrap();
        let mut records: Vec<EvalRun> = runs
            .values()
            .filter(|r| suite_id.map(|s| r.suite_id == s).unwrap_or(true))
            .cloned()
            .collect();
        sort_newest_first(&mut records);
        Ok(records)
    }

    async fn next_revision(&self) -> StorageResult<u64> {
        let runs = self.runs.lock().unwrap();
        let all: Vec<EvalRun> = runs.values().cloned().collect();
        Ok(high_water_mark(&all) + 1)
    }
}

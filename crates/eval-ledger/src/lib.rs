//! eval-ledger: persistence layer for Verisuite eval runs.
//!
//! Defines the run/result records, the append-only [`RunStore`] trait with
//! its revision-stamping contract, a filesystem backend ([`FsRunStore`]) and
//! an in-memory fake ([`MemoryRunStore`]) for tests.

pub mod error;
pub mod fs;
pub mod memory;
pub mod model;
pub mod store;

pub use error::StorageError;
pub use fs::{FsRunStore, DEFAULT_STORE_DIR};
pub use memory::MemoryRunStore;
pub use model::{EvalResult, EvalRun};
pub use store::{RunStore, StorageResult};

//! Orchestration services for dataflow deployment.

mod sync;

pub use sync::{DataflowSyncError, DataflowSyncResult, DataflowSyncService, SyncReport};

pub mod form_service;
pub mod query_cache;
pub mod record_sync_service;
pub mod write_coalescer;

pub use form_service::{DialogController, DraftForm, FieldErrors, SubmitError, SubmitOutcome};
pub use query_cache::{CacheRead, Conflict, QueryCache, ReconcileReport};
pub use record_sync_service::RecordSyncService;
pub use write_coalescer::WriteCoalescer;

//! Domain façades over the record gateway
//!
//! Each public method is one user-level action: it builds the request, makes
//! the remote call(s), maps the response and reports the outcome. Every
//! failing call produces exactly one error notice and returns `Err`; callers
//! choose whether that is fatal (see [`crate::ResultExt::or_empty`]).

mod housekeeping;
mod room;

use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::error::{Error, Result};
use crate::gateway::{ensure_success, BatchResponse};
use crate::mapper::FromRecord;
use crate::models::RecordId;
use crate::notify::{Notice, Notifier};
use crate::transitions::TransitionPolicy;

pub use housekeeping::HousekeepingService;
pub use room::RoomService;

/// Author recorded on notes and tasks when none is configured
pub const DEFAULT_OPERATOR: &str = "Current User";

/// Per-façade settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacadeOptions {
    /// Name written into `created_by` / note authors
    pub operator: String,
    pub policy: TransitionPolicy,
}

impl Default for FacadeOptions {
    fn default() -> Self {
        Self {
            operator: DEFAULT_OPERATOR.to_string(),
            policy: TransitionPolicy::default(),
        }
    }
}

/// A record a batch could not write
#[derive(Debug, Clone, PartialEq)]
pub struct BulkFailure {
    pub id: RecordId,
    pub message: String,
}

/// Result of a batched write; both halves are normal outcomes
#[derive(Debug, Clone, PartialEq)]
pub struct BulkOutcome<T> {
    pub succeeded: Vec<T>,
    pub failed: Vec<BulkFailure>,
}

impl<T> Default for BulkOutcome<T> {
    fn default() -> Self {
        Self {
            succeeded: Vec::new(),
            failed: Vec::new(),
        }
    }
}

impl<T> BulkOutcome<T> {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn failed_ids(&self) -> Vec<RecordId> {
        self.failed.iter().map(|f| f.id).collect()
    }
}

/// Log and notify once if the action failed, then hand the result back
pub(crate) fn report<T>(notifier: &dyn Notifier, action: &str, result: Result<T>) -> Result<T> {
    if let Err(e) = &result {
        error!(action, error = %e, "Action failed");
        notifier.notify(Notice::error(format!("{}: {}", action, e)));
    }
    result
}

/// Map the first result of a single-record write
pub(crate) fn single_result<T: FromRecord>(resp: BatchResponse) -> Result<T> {
    ensure_success(resp.success, resp.message.as_deref())?;

    let first = resp
        .results
        .into_iter()
        .next()
        .ok_or_else(|| Error::Gateway("No result returned".to_string()))?;

    if !first.success {
        return Err(Error::Gateway(
            first.message.unwrap_or_else(|| "Write failed".to_string()),
        ));
    }

    let data = first
        .data
        .ok_or_else(|| Error::Gateway("No record returned".to_string()))?;
    T::from_record(&data)
}

/// Pair batch results with the ids sent, by position
pub(crate) fn split_batch<T: FromRecord>(ids: &[RecordId], resp: BatchResponse) -> BulkOutcome<T> {
    let mut outcome = BulkOutcome::default();
    let mut results = resp.results.into_iter();

    for id in ids {
        let failure = |message: String| BulkFailure { id: *id, message };

        match results.next() {
            Some(result) if result.success => match result.data.as_ref().map(T::from_record) {
                Some(Ok(item)) => outcome.succeeded.push(item),
                Some(Err(e)) => outcome.failed.push(failure(e.to_string())),
                None => outcome.failed.push(failure("No record returned".to_string())),
            },
            Some(result) => outcome.failed.push(failure(
                result.message.unwrap_or_else(|| "Write failed".to_string()),
            )),
            None => outcome.failed.push(failure("No result returned".to_string())),
        }
    }

    if !outcome.failed.is_empty() {
        warn!(
            failed = ?outcome.failed_ids(),
            succeeded = outcome.succeeded.len(),
            "Batch partially failed"
        );
    }

    outcome
}

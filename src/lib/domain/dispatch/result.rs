//! Aggregated send results

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// The outcome of one batch's provider call
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(untagged)]
pub enum BatchOutcome {
    /// The provider accepted the batch
    Delivered {
        /// The provider-assigned identifier
        id: String,

        /// The provider's full response payload
        #[schema(value_type = Object)]
        data: Value,
    },

    /// The provider rejected the batch; dispatch continued with the
    /// remaining batches
    Failed {
        /// The provider's error message
        error: String,
    },
}

/// One batch's recorded result
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    /// The 1-based batch number, in dispatch order
    #[schema(example = 1)]
    pub batch: usize,

    /// How many `to` recipients this batch carried
    #[schema(example = 20)]
    pub recipients: usize,

    /// The provider outcome for this batch
    pub outcome: BatchOutcome,
}

impl BatchResult {
    /// Whether this batch failed at the provider
    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, BatchOutcome::Failed { .. })
    }
}

/// The aggregate result of one dispatched request.
///
/// Present only when the pipeline completed; per-batch provider errors are
/// reported here as data rather than failing the whole request.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SendResult {
    /// The `Message-ID` used for the send
    #[schema(example = "<1714670000000.k2j9x4q8w1abc@example.com>")]
    pub message_id: String,

    /// Per-batch outcomes, in dispatch order
    pub batches: Vec<BatchResult>,
}

//! Sequence Counter Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// One counter document per sequence domain; `id` is `counter:<domain-key>`.
/// The value is only ever changed by a single atomic increment statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Counter {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    pub value: i64,
}

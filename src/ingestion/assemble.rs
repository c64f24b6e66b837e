//! Dataset assembly: the single place identifiers and timestamps are generated.

use chrono::Utc;
use uuid::Uuid;

use crate::types::{Dataset, DatasetData};

/// Wrap a decoded payload into a new [`Dataset`] with a fresh id and the current time.
///
/// The dataset type is taken from the payload variant.
pub fn assemble(name: impl Into<String>, data: DatasetData) -> Dataset {
    Dataset::new(Uuid::new_v4(), name.into(), data, Utc::now())
}

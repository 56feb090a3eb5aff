//! Row shapes for the remote tables.
//!
//! Each table declares three shapes: the stored row, the insert payload and
//! the update payload. [`Table`] binds them to the table name so the client
//! can stay generic. None of these types enforce anything beyond what serde
//! checks; the remote service is the validation boundary.

pub mod bugs;

use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use thiserror::Error;

pub use bugs::{Bug, BugPriority, BugStatus, BugUpdate, Bugs, NewBug};

/// A remote table and its three payload shapes.
pub trait Table {
    /// Table name as exposed under `/rest/v1/`.
    const NAME: &'static str;
    /// Column used by `get` / `update` / `delete`.
    const PRIMARY_KEY: &'static str = "id";

    type Row: DeserializeOwned + Send;
    type Insert: Serialize + Sync;
    type Update: Serialize + Sync;
}

/// An enum wire value outside its declared set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind} '{value}' (expected one of: {expected})")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
    pub expected: &'static str,
}

/// Deserializer for tri-state nullable payload fields.
///
/// Paired with `#[serde(default)]`: an absent field stays `None`, an explicit
/// `null` becomes `Some(None)`, and a value becomes `Some(Some(v))`.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

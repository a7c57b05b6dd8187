use serde::{Deserialize, Serialize};

use crate::domain::view::ResolvedOrderView;

/// Payload attached to a resolution: one joined view for a direct order
/// lookup, the full list when a product search matches several orders.
/// Serialized untagged so the wire envelope carries either an object or
/// an array under `data`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResolutionPayload {
    Single(ResolvedOrderView),
    Many(Vec<ResolvedOrderView>),
}

/// Outcome of one logistics query. `succeeded: false` covers the
/// user-facing "not found" and "need more information" cases; it is
/// never an infrastructure fault (those surface as [`crate::StoreError`]
/// before a resolution is produced).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QueryResolution {
    pub succeeded: bool,
    pub message: String,
    pub payload: Option<ResolutionPayload>,
}

impl QueryResolution {
    pub fn succeeded(message: impl Into<String>, payload: ResolutionPayload) -> Self {
        Self { succeeded: true, message: message.into(), payload: Some(payload) }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self { succeeded: false, message: message.into(), payload: None }
    }
}

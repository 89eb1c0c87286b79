//! Payload and timeout value types.
//!
//! Query and result payloads are opaque to the client: they are carried as
//! structured JSON and only the remote service gives them meaning. The types
//! here exist so that a query can never be passed where a result frame is
//! expected, and so that timeouts carry their unit in the type.

use std::time::Duration;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

/// A query request payload understood by the remote service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Query(serde_json::Value);

impl Query {
    /// Wraps a structured payload.
    pub fn new(payload: serde_json::Value) -> Self {
        Self(payload)
    }

    /// Parses a payload from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text).map(Self)
    }

    /// Returns the payload.
    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    /// Consumes the query, returning the payload.
    pub fn into_value(self) -> serde_json::Value {
        self.0
    }
}

// ---------------------------------------------------------------------------

/// One page of results for a submitted query.
///
/// End-of-results, row layout, and column metadata are all carried inside
/// the payload and are the caller's concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultFrame(serde_json::Value);

impl ResultFrame {
    /// Wraps a structured payload.
    pub fn new(payload: serde_json::Value) -> Self {
        Self(payload)
    }

    /// Returns the payload.
    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    /// Consumes the frame, returning the payload.
    pub fn into_value(self) -> serde_json::Value {
        self.0
    }
}

// ---------------------------------------------------------------------------
// Timeouts
// ---------------------------------------------------------------------------

/// Upper bound on how long one adapter call waits for the remote operation.
///
/// Expressed in whole seconds, so it is non-negative by construction. A zero
/// timeout fails any call whose remote operation has not already completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryTimeout(u32);

impl QueryTimeout {
    /// Creates a timeout of `secs` whole seconds.
    pub fn from_secs(secs: u32) -> Self {
        Self(secs)
    }

    /// Returns the timeout in whole seconds.
    pub fn as_secs(self) -> u32 {
        self.0
    }

    /// Returns the timeout as a [`Duration`] for the async runtime.
    pub fn as_duration(self) -> Duration {
        Duration::from_secs(u64::from(self.0))
    }
}

impl std::fmt::Display for QueryTimeout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}s", self.0)
    }
}

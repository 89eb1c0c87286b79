//! Newtype identifiers for the query client.
//!
//! Every concept that identifies something on the wire is represented as a
//! distinct newtype wrapping a primitive. This prevents accidentally passing
//! a page index where a correlation id is expected, or an arbitrary string
//! where an endpoint address is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Endpoint
// ---------------------------------------------------------------------------

/// Network address of the remote query service (e.g. `"svc:1234"` or
/// `"http://10.0.0.5:8080"`).
///
/// Captured verbatim. Whether the address is usable is decided by the
/// [`crate::ServiceConnector`] when the transport handle is built, so an
/// adapter can be constructed without performing any I/O or validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Endpoint(String);

impl Endpoint {
    /// Captures an endpoint address.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the address as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the address is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Endpoint {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Endpoint {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

// ---------------------------------------------------------------------------
// Correlation id
// ---------------------------------------------------------------------------

/// Identifies a submitted query on the remote service.
///
/// Returned by `submit_query` and passed back on every page fetch. The
/// adapter never interprets the value; an unknown or stale id is rejected by
/// the remote service, not checked locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(Uuid);

impl CorrelationId {
    /// Generates a new random identifier.
    ///
    /// Real ids come from the remote service; this exists for fakes and tests.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a [`CorrelationId`] from an existing UUID (e.g. decoded from a response).
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the underlying [`Uuid`].
    pub fn as_uuid(self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Page index
// ---------------------------------------------------------------------------

/// Zero-based index of a result page.
///
/// Used both as the adapter's page cursor and as the page number sent on
/// the wire.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PageIndex(u32);

impl PageIndex {
    /// The first page of any result set.
    pub const FIRST: PageIndex = PageIndex(0);

    /// Creates a [`PageIndex`] from a raw integer.
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the underlying integer value.
    pub fn as_u32(self) -> u32 {
        self.0
    }

    /// Returns the index of the following page, saturating at `u32::MAX`.
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl std::fmt::Display for PageIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

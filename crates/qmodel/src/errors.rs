//! Error types for the query client.
//!
//! Two layers:
//!
//! - [`ServiceError`] is what a transport or remote service reports. Port
//!   implementations (see [`crate::ports`]) return it.
//! - [`QueryFailure`] is the single failure kind that adapter callers see.
//!   Every error raised while dispatching a call, or while waiting for it, is
//!   wrapped into one at the operation boundary, with the original cause
//!   attached as its [`std::error::Error::source`].
//!
//! Callers that need to tell a timeout from a transport error inspect
//! [`QueryFailure::cause`]; the outer type never changes.

use std::time::Duration;

use thiserror::Error;

use crate::{Endpoint, PageIndex};

// ---------------------------------------------------------------------------
// Transport / service errors
// ---------------------------------------------------------------------------

/// Errors reported by a [`crate::ServiceConnector`] or [`crate::QueryService`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// A client handle could not be created for the endpoint.
    ///
    /// Produced by: malformed endpoint address, transport initialisation failure.
    #[error("Cannot connect to '{endpoint}': {message}")]
    Connect {
        /// The endpoint the handle was being built for.
        endpoint: Endpoint,
        /// Description of what went wrong.
        message: String,
    },

    /// The request could not be delivered or the response could not be read.
    #[error("Transport error: {message}")]
    Transport {
        /// Description of the connectivity failure.
        message: String,
    },

    /// The remote service answered with something that is not a valid response.
    #[error("Protocol error: {message}")]
    Protocol {
        /// Description of the malformed payload.
        message: String,
    },

    /// The remote service understood the request and refused it
    /// (unknown correlation id, invalid query, internal failure).
    #[error("Remote service rejected the request (status {status}): {message}")]
    Rejected {
        /// Status code reported by the service.
        status: u16,
        /// Error text reported by the service.
        message: String,
    },
}

impl ServiceError {
    /// Shorthand for [`ServiceError::Connect`].
    pub fn connect(endpoint: &Endpoint, message: impl Into<String>) -> Self {
        Self::Connect {
            endpoint: endpoint.clone(),
            message: message.into(),
        }
    }

    /// Shorthand for [`ServiceError::Transport`].
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Shorthand for [`ServiceError::Protocol`].
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// The uniform failure
// ---------------------------------------------------------------------------

/// The adapter operation a [`QueryFailure`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOperation {
    /// `query`: submitting a query and waiting for its correlation id.
    SubmitQuery,
    /// `get_results`: fetching the page at `page`.
    FetchPage {
        /// The page index that was requested.
        page: PageIndex,
    },
}

impl std::fmt::Display for QueryOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryOperation::SubmitQuery => write!(f, "submit query"),
            QueryOperation::FetchPage { page } => write!(f, "fetch page {page}"),
        }
    }
}

/// Underlying reason for a [`QueryFailure`].
#[derive(Debug, Error)]
pub enum FailureCause {
    /// The transport handle could not be created.
    #[error("transport unavailable: {0}")]
    Connect(#[source] ServiceError),

    /// The remote call failed (connectivity, protocol, or remote rejection).
    #[error("remote call failed: {0}")]
    Remote(#[source] ServiceError),

    /// The bounded wait expired before the remote call completed.
    ///
    /// The remote operation is not cancelled server-side.
    #[error("no response within {after:?}")]
    Timeout {
        /// The bound that expired.
        after: Duration,
    },

    /// An unexpected local failure while dispatching the call.
    ///
    /// Produced by: runtime start-up failure, a panicked or cancelled task,
    /// calling the blocking adapter from inside an async runtime.
    #[error("dispatch failed: {message}")]
    Dispatch {
        /// Description of the local failure.
        message: String,
    },
}

/// The single failure kind raised by every adapter operation.
#[derive(Debug, Error)]
#[error("{operation} failed: {cause}")]
pub struct QueryFailure {
    operation: QueryOperation,
    #[source]
    cause: FailureCause,
}

impl QueryFailure {
    /// Wraps `cause` as a failure of `operation`.
    pub fn new(operation: QueryOperation, cause: FailureCause) -> Self {
        Self { operation, cause }
    }

    /// The operation that failed.
    pub fn operation(&self) -> QueryOperation {
        self.operation
    }

    /// The underlying cause.
    pub fn cause(&self) -> &FailureCause {
        &self.cause
    }

    /// Returns `true` if the bounded wait expired.
    pub fn is_timeout(&self) -> bool {
        matches!(self.cause, FailureCause::Timeout { .. })
    }
}

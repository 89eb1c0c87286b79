//! Core domain for the Scray query client.
//!
//! This crate contains the value types, newtype identifiers, the uniform
//! failure type, and the port traits used throughout the workspace.
//! Infrastructure crates implement the traits defined here; they never add
//! client semantics of their own.
//!
//! ## Architectural Layer
//!
//! **Domain + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; infrastructure crates define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`Endpoint`, `CorrelationId`, `PageIndex`) |
//! | [`types`] | Opaque payloads and timeouts (`Query`, `ResultFrame`, `QueryTimeout`) |
//! | [`errors`] | `ServiceError` and the uniform `QueryFailure` |
//! | [`ports`] | `QueryService`, `ServiceConnector`, `QueryAdapter` |

pub mod errors;
pub mod identifiers;
pub mod ports;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use errors::{FailureCause, QueryFailure, QueryOperation, ServiceError};
pub use identifiers::{CorrelationId, Endpoint, PageIndex};
pub use ports::{QueryAdapter, QueryService, ServiceConnector};
pub use types::{Query, QueryTimeout, ResultFrame};

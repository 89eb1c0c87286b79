//! Scray query service transport over JSON/HTTP.
//!
//! Implements the [`qmodel::ServiceConnector`] and [`qmodel::QueryService`]
//! traits with `reqwest`. Endpoints may be full URLs
//! (`https://gateway:8443/scray`) or bare `host:port` pairs, which get the
//! configured scheme.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** URL resolution, request framing, status mapping, and
//! body decoding all live here. The `adapter` crate sees only
//! [`qmodel::QueryService`].

pub mod client;
pub mod config;

pub use client::{HttpConnector, HttpQueryService};
pub use config::{ConfigError, HttpTransportConfig};

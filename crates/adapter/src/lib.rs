//! Scray stateless query adapter.
//!
//! Turns an asynchronous, paginated [`qmodel::QueryService`] into a blocking
//! call/fetch interface with a bounded wait on every call:
//!
//! - [`TransportProvider`] builds the service handle on first use and reuses
//!   it afterwards.
//! - [`StatelessQueryAdapter`] implements [`qmodel::QueryAdapter`] on top of
//!   it, tracking the page cursor and collapsing every failure into
//!   [`qmodel::QueryFailure`].
//!
//! ## Architectural Layer
//!
//! **Orchestration.** The adapter sequences calls on a transport handle; it
//! knows nothing about the wire. Concrete transports live in infrastructure
//! crates (see `http-transport`) and are injected as a
//! [`qmodel::ServiceConnector`].
//!
//! ## Concurrency
//!
//! Both operations take `&mut self`. The page cursor and the lazily-built
//! handle are plain fields; an adapter shared across threads must be
//! wrapped in a lock by the caller, and each lock holder will still advance
//! the same cursor.

pub mod provider;
pub mod stateless;

pub use provider::TransportProvider;
pub use stateless::StatelessQueryAdapter;

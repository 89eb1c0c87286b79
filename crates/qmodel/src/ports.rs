//! Port traits between the adapter and its transports.
//!
//! [`QueryService`] and [`ServiceConnector`] are implemented by
//! infrastructure crates (e.g. `http-transport`); [`QueryAdapter`] is the
//! blocking contract offered to callers and implemented by the `adapter`
//! crate. Nothing here performs I/O.

use async_trait::async_trait;

use crate::{
    CorrelationId, Endpoint, PageIndex, Query, QueryFailure, QueryTimeout, ResultFrame,
    ServiceError,
};

/// Asynchronous client handle to a remote query service.
///
/// A handle is bound to one endpoint and shared by reference across all calls
/// made through one adapter, so implementations must be callable concurrently.
#[async_trait]
pub trait QueryService: Send + Sync {
    /// Submits `query` and returns the id that correlates its result pages.
    async fn submit_query(&self, query: Query) -> Result<CorrelationId, ServiceError>;

    /// Fetches page `page` of the results for the query identified by `id`.
    async fn fetch_page(&self, id: CorrelationId, page: PageIndex)
        -> Result<ResultFrame, ServiceError>;
}

/// Builds [`QueryService`] handles from endpoint addresses.
///
/// Construction is synchronous; implementations are expected to defer actual
/// network activity to the first call on the returned handle.
pub trait ServiceConnector {
    /// The handle type produced by this connector.
    type Service: QueryService + 'static;

    /// Creates a handle bound to `endpoint`.
    ///
    /// # Errors
    ///
    /// [`ServiceError::Connect`] if the endpoint is malformed or the transport
    /// cannot be initialised.
    fn connect(&self, endpoint: &Endpoint) -> Result<Self::Service, ServiceError>;
}

/// Blocking, timeout-bounded facade over a [`QueryService`].
///
/// Both operations fail with the same [`QueryFailure`] kind regardless of
/// whether the cause was connectivity, a remote rejection, or the bound
/// expiring.
pub trait QueryAdapter {
    /// Submits `query`, waiting at most `timeout` for its correlation id.
    fn query(
        &mut self,
        query: Query,
        timeout: QueryTimeout,
    ) -> Result<CorrelationId, QueryFailure>;

    /// Fetches the next page of results for `id`, waiting at most `timeout`.
    fn get_results(
        &mut self,
        id: CorrelationId,
        timeout: QueryTimeout,
    ) -> Result<ResultFrame, QueryFailure>;
}

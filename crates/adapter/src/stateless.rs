//! Blocking, timeout-bounded paging facade over an async [`QueryService`].
//!
//! [`QueryService`]: qmodel::QueryService

use std::future::Future;
use std::sync::Arc;

use qmodel::{
    CorrelationId, Endpoint, FailureCause, PageIndex, Query, QueryAdapter, QueryFailure,
    QueryOperation, QueryService, QueryTimeout, ResultFrame, ServiceConnector, ServiceError,
};
use tokio::runtime::{Builder, Handle, Runtime};
use tracing::{debug, info_span, warn};

use crate::provider::TransportProvider;

/// Synchronous adapter that submits queries and pages through their results.
///
/// The adapter remembers which page to request next. The cursor starts at
/// page 0, moves forward by exactly one after every successful
/// [`QueryAdapter::get_results`], and never moves on failure, so retrying a
/// failed call requests the same page again. The cursor is not reset between
/// correlation ids: use one adapter per query.
///
/// Each call spawns the remote operation on an adapter-owned runtime and
/// blocks the calling thread until it completes or the timeout expires. An
/// expired wait does not cancel the remote operation; its eventual result
/// is discarded.
///
/// Must not be called from inside an async runtime; such calls fail with
/// [`FailureCause::Dispatch`].
///
/// # Example
///
/// ```rust,ignore
/// use adapter::StatelessQueryAdapter;
/// use http_transport::HttpConnector;
/// use qmodel::{Query, QueryAdapter, QueryTimeout};
///
/// let mut adapter = StatelessQueryAdapter::new("svc:1234", HttpConnector::default());
/// let timeout = QueryTimeout::from_secs(5);
///
/// let id = adapter.query(Query::from_json_str(r#"{"table":"events"}"#)?, timeout)?;
/// let first = adapter.get_results(id, timeout)?;  // page 0
/// let second = adapter.get_results(id, timeout)?; // page 1
/// ```
pub struct StatelessQueryAdapter<C: ServiceConnector> {
    provider: TransportProvider<C>,
    page_cursor: PageIndex,
    runtime: Option<Runtime>,
}

impl<C: ServiceConnector> StatelessQueryAdapter<C> {
    /// Captures the endpoint and connector. Performs no I/O and starts no threads.
    pub fn new(endpoint: impl Into<Endpoint>, connector: C) -> Self {
        Self {
            provider: TransportProvider::new(endpoint.into(), connector),
            page_cursor: PageIndex::FIRST,
            runtime: None,
        }
    }

    /// The page the next successful `get_results` call will return.
    pub fn page_cursor(&self) -> PageIndex {
        self.page_cursor
    }

    /// The endpoint this adapter talks to.
    pub fn endpoint(&self) -> &Endpoint {
        self.provider.endpoint()
    }

    /// Returns `true` once the transport handle has been built.
    pub fn is_connected(&self) -> bool {
        self.provider.is_connected()
    }

    /// Obtains the transport handle and runs `call` on it under a bounded wait.
    ///
    /// The handle is built inside the adapter's runtime context, so
    /// connectors may rely on an ambient tokio handle.
    fn dispatch<T, F>(
        &mut self,
        operation: QueryOperation,
        timeout: QueryTimeout,
        call: impl FnOnce(Arc<C::Service>) -> F,
    ) -> Result<T, QueryFailure>
    where
        T: Send + 'static,
        F: Future<Output = Result<T, ServiceError>> + Send + 'static,
    {
        let runtime =
            start_runtime(&mut self.runtime).map_err(|cause| failure(operation, cause))?;
        let service = {
            let _guard = runtime.enter();
            self.provider.get_client()
        }
        .map_err(|e| failure(operation, FailureCause::Connect(e)))?;

        bounded_wait(runtime, timeout, call(service)).map_err(|cause| failure(operation, cause))
    }
}

impl<C: ServiceConnector> QueryAdapter for StatelessQueryAdapter<C> {
    fn query(
        &mut self,
        query: Query,
        timeout: QueryTimeout,
    ) -> Result<CorrelationId, QueryFailure> {
        let operation = QueryOperation::SubmitQuery;
        let span = info_span!(
            "query",
            endpoint = %self.provider.endpoint(),
            %operation,
            timeout_secs = timeout.as_secs(),
        );
        let _enter = span.enter();

        let id = self.dispatch(operation, timeout, |service| async move {
            service.submit_query(query).await
        })?;

        debug!(correlation_id = %id, "Query submitted");
        Ok(id)
    }

    fn get_results(
        &mut self,
        id: CorrelationId,
        timeout: QueryTimeout,
    ) -> Result<ResultFrame, QueryFailure> {
        let page = self.page_cursor;
        let operation = QueryOperation::FetchPage { page };
        let span = info_span!(
            "get_results",
            endpoint = %self.provider.endpoint(),
            %operation,
            correlation_id = %id,
            page = page.as_u32(),
            timeout_secs = timeout.as_secs(),
        );
        let _enter = span.enter();

        let frame = self.dispatch(operation, timeout, |service| async move {
            service.fetch_page(id, page).await
        })?;

        self.page_cursor = page.next();
        debug!(next_page = self.page_cursor.as_u32(), "Result page fetched");
        Ok(frame)
    }
}

impl<C: ServiceConnector> Drop for StatelessQueryAdapter<C> {
    fn drop(&mut self) {
        // Timed-out calls may still be in flight; don't block on them.
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

/// Returns the runtime in `slot`, starting it on first use.
///
/// Refuses to run from inside another runtime, where `block_on` would panic.
fn start_runtime(slot: &mut Option<Runtime>) -> Result<&Runtime, FailureCause> {
    if Handle::try_current().is_ok() {
        return Err(FailureCause::Dispatch {
            message: "blocking adapter called from inside an async runtime".to_string(),
        });
    }

    let runtime = match slot.take() {
        Some(runtime) => runtime,
        None => Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("scray-adapter")
            .enable_all()
            .build()
            .map_err(|e| FailureCause::Dispatch {
                message: format!("Failed to start async runtime: {e}"),
            })?,
    };
    Ok(slot.insert(runtime))
}

/// Runs `call` on `runtime` and blocks until it finishes or `timeout` expires.
///
/// The call is spawned rather than awaited in place so that it keeps running
/// after the wait gives up.
fn bounded_wait<T, F>(
    runtime: &Runtime,
    timeout: QueryTimeout,
    call: F,
) -> Result<T, FailureCause>
where
    T: Send + 'static,
    F: Future<Output = Result<T, ServiceError>> + Send + 'static,
{
    let after = timeout.as_duration();
    let task = runtime.spawn(call);

    match runtime.block_on(async { tokio::time::timeout(after, task).await }) {
        Ok(Ok(Ok(value))) => Ok(value),
        Ok(Ok(Err(e))) => Err(FailureCause::Remote(e)),
        Ok(Err(join_error)) => Err(FailureCause::Dispatch {
            message: format!("remote call task failed: {join_error}"),
        }),
        Err(_elapsed) => Err(FailureCause::Timeout { after }),
    }
}

fn failure(operation: QueryOperation, cause: FailureCause) -> QueryFailure {
    warn!(%operation, error = %cause, "Query adapter call failed");
    QueryFailure::new(operation, cause)
}

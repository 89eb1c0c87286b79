//! Lazily-built, shared transport handle bound to one endpoint.

use std::sync::Arc;

use qmodel::{Endpoint, ServiceConnector, ServiceError};
use tracing::{debug, info, warn};

/// Produces the [`qmodel::QueryService`] handle for one endpoint on demand.
///
/// No connection is attempted until [`TransportProvider::get_client`] is first
/// called. After a successful construction the same handle is returned on
/// every call; a failed construction is not remembered, so the next call
/// tries again.
///
/// First use takes `&mut self`, so concurrent first use is ruled out by the
/// borrow checker; callers sharing a provider across threads must wrap it in
/// their own lock (or call `get_client` once up front).
pub struct TransportProvider<C: ServiceConnector> {
    endpoint: Endpoint,
    connector: C,
    client: Option<Arc<C::Service>>,
}

impl<C: ServiceConnector> TransportProvider<C> {
    /// Captures `endpoint` and `connector`. Performs no I/O.
    pub fn new(endpoint: Endpoint, connector: C) -> Self {
        Self {
            endpoint,
            connector,
            client: None,
        }
    }

    /// Returns the handle, building it on first use.
    ///
    /// # Errors
    ///
    /// Whatever the connector reports when the handle cannot be built
    /// (normally [`ServiceError::Connect`]).
    pub fn get_client(&mut self) -> Result<Arc<C::Service>, ServiceError> {
        if let Some(client) = &self.client {
            debug!(endpoint = %self.endpoint, "Reusing transport handle");
            return Ok(Arc::clone(client));
        }

        debug!(endpoint = %self.endpoint, "Creating transport handle");
        let client = match self.connector.connect(&self.endpoint) {
            Ok(service) => Arc::new(service),
            Err(e) => {
                warn!(endpoint = %self.endpoint, error = %e, "Transport handle creation failed");
                return Err(e);
            }
        };
        info!(endpoint = %self.endpoint, "Transport handle created");

        self.client = Some(Arc::clone(&client));
        Ok(client)
    }

    /// Returns `true` once a handle has been built.
    pub fn is_connected(&self) -> bool {
        self.client.is_some()
    }

    /// The endpoint this provider connects to.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }
}

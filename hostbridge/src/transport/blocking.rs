//
// Copyright 2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Blocking-request transport.
//!
//! Some execution contexts cannot await: a worker before its message
//! channel is live, or a bootstrap window before the event loop turns. Those
//! platforms expose a dedicated synchronous endpoint that accepts the same
//! encoded payload and returns the same encoded result, in the same call
//! stack. This variant wraps such an endpoint.
//!
//! The blocking path is incompatible with concurrent callers sharing one
//! channel; it exists for narrow bootstrap windows, not as a general call
//! mode.

use crate::pending::CallId;
use crate::transport::{Dispatcher, Transport, TransportError};
use std::sync::Arc;

/// A synchronous request/response endpoint on the host side.
///
/// The endpoint blocks the calling thread until the single reply is
/// available.
pub trait SyncEndpoint: Send + Sync + 'static {
    /// Issues one request and blocks until the encoded response returns.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] if the request could not be carried out.
    fn request(&self, payload: &[u8]) -> Result<Vec<u8>, TransportError>;
}

/// Transport variant over a synchronous request/response endpoint.
///
/// `send_blocking` is the native mode. The async [`Transport::send`] is
/// also available (it runs the endpoint on a blocking-capable runtime
/// thread and routes the result through the dispatcher), so a bridge
/// configured with this variant still serves ordinary async callers during
/// bootstrap.
pub struct BlockingTransport {
    endpoint: Arc<dyn SyncEndpoint>,
    dispatcher: Dispatcher,
}

impl BlockingTransport {
    /// Creates a blocking transport over a synchronous endpoint.
    #[must_use]
    pub fn new(endpoint: Arc<dyn SyncEndpoint>, dispatcher: Dispatcher) -> Self {
        Self {
            endpoint,
            dispatcher,
        }
    }
}

#[async_trait::async_trait]
impl Transport for BlockingTransport {
    fn name(&self) -> &'static str {
        "blocking"
    }

    async fn send(&self, id: CallId, payload: Vec<u8>) -> Result<(), TransportError> {
        let endpoint = self.endpoint.clone();
        // The endpoint blocks its thread; keep that off the async workers.
        let response = tokio::task::spawn_blocking(move || endpoint.request(&payload))
            .await
            .map_err(|_| TransportError::Closed)??;
        if !id.is_none() {
            self.dispatcher.deliver_response(id, &response);
        }
        Ok(())
    }

    fn send_blocking(&self, payload: &[u8]) -> Result<Vec<u8>, TransportError> {
        self.endpoint.request(payload)
    }
}

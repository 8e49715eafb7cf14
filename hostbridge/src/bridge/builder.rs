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

//! Builder wiring a bridge session to its platform transport.

use crate::bridge::Bridge;
use crate::hub::NotificationHub;
use crate::observability::BridgeMetrics;
use crate::pending::PendingCalls;
use crate::transport::{
    callback, BlockingTransport, CallbackTransport, DeliveryGuard, Dispatcher, HostHandler,
    HostSink, InProcessTransport, SocketConfig, SocketTransport, SyncEndpoint, Transport,
    TransportError,
};
use std::sync::Arc;

/// Builder for a bridge session.
///
/// A session is one pending-call registry, one notification hub, one
/// metrics tracker, and the single transport detected for the platform at
/// startup. The transport choice is made exactly once, here; the built
/// [`Bridge`] holds it immutably for the session's lifetime.
///
/// # Examples
///
/// ```rust
/// use hostbridge::{BridgeBuilder, HostHandler, TransportError};
/// use std::sync::Arc;
///
/// struct NullHost;
///
/// #[async_trait::async_trait]
/// impl HostHandler for NullHost {
///     async fn handle(&self, _payload: Vec<u8>) -> Result<Vec<u8>, TransportError> {
///         Ok(Vec::new())
///     }
/// }
///
/// let bridge = BridgeBuilder::new().in_process(Arc::new(NullHost));
/// assert_eq!(bridge.metrics().calls_sent(), 0);
/// ```
#[derive(Default)]
pub struct BridgeBuilder {
    hub: Option<Arc<NotificationHub>>,
    metrics: Option<Arc<BridgeMetrics>>,
}

impl BridgeBuilder {
    /// Creates a builder with fresh session components.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses an existing notification hub instead of a fresh one.
    ///
    /// Useful when subscriptions must be in place before the transport
    /// connects and can start delivering.
    #[must_use]
    pub fn with_hub(mut self, hub: Arc<NotificationHub>) -> Self {
        self.hub = Some(hub);
        self
    }

    /// Uses an existing metrics tracker instead of a fresh one.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<BridgeMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Builds a bridge over a privileged in-process host.
    #[must_use]
    pub fn in_process(self, handler: Arc<dyn HostHandler>) -> Bridge {
        self.with_transport(|dispatcher| Arc::new(InProcessTransport::new(handler, dispatcher)))
    }

    /// Builds a bridge over a native-callback platform sink and installs
    /// the process-wide delivery entry points.
    ///
    /// The returned guard keeps the entry points installed; keep it alive
    /// for the whole session.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::CallbackAlreadyInstalled`] if another
    /// session's guard is still alive.
    pub fn native_callback(
        self,
        sink: Arc<dyn HostSink>,
    ) -> Result<(Bridge, DeliveryGuard), TransportError> {
        let (pending, hub, metrics) = self.parts();
        let dispatcher = Dispatcher::new(pending.clone(), hub.clone(), metrics.clone());
        let guard = callback::install(dispatcher)?;
        let transport = Arc::new(CallbackTransport::new(sink));
        Ok((Bridge::new(transport, pending, hub, metrics), guard))
    }

    /// Builds a bridge over a synchronous request/response endpoint.
    #[must_use]
    pub fn blocking(self, endpoint: Arc<dyn SyncEndpoint>) -> Bridge {
        self.with_transport(|dispatcher| Arc::new(BlockingTransport::new(endpoint, dispatcher)))
    }

    /// Builds a bridge over a socket connection to a host peer.
    ///
    /// # Errors
    ///
    /// Propagates connection failures from
    /// [`SocketTransport::connect`].
    pub async fn socket(self, addr: &str, config: &SocketConfig) -> Result<Bridge, TransportError> {
        let (pending, hub, metrics) = self.parts();
        let dispatcher = Dispatcher::new(pending.clone(), hub.clone(), metrics.clone());
        let transport = Arc::new(SocketTransport::connect(addr, dispatcher, config).await?);
        Ok(Bridge::new(transport, pending, hub, metrics))
    }

    /// Builds a bridge over the first socket candidate that accepts.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::AllCandidatesFailed`] when every candidate
    /// fails.
    pub async fn socket_any<'a>(
        self,
        addrs: impl IntoIterator<Item = &'a str>,
        config: &SocketConfig,
    ) -> Result<Bridge, TransportError> {
        let (pending, hub, metrics) = self.parts();
        let dispatcher = Dispatcher::new(pending.clone(), hub.clone(), metrics.clone());
        let transport = Arc::new(SocketTransport::connect_any(addrs, dispatcher, config).await?);
        Ok(Bridge::new(transport, pending, hub, metrics))
    }

    /// Builds a bridge over a caller-constructed transport.
    ///
    /// The closure receives the session's dispatcher so the transport can
    /// wire its receive path.
    #[must_use]
    pub fn with_transport<F>(self, build: F) -> Bridge
    where
        F: FnOnce(Dispatcher) -> Arc<dyn Transport>,
    {
        let (pending, hub, metrics) = self.parts();
        let dispatcher = Dispatcher::new(pending.clone(), hub.clone(), metrics.clone());
        let transport = build(dispatcher);
        Bridge::new(transport, pending, hub, metrics)
    }

    fn parts(
        self,
    ) -> (
        Arc<PendingCalls<Vec<crate::wire::Value>>>,
        Arc<NotificationHub>,
        Arc<BridgeMetrics>,
    ) {
        (
            Arc::new(PendingCalls::new()),
            self.hub.unwrap_or_default(),
            self.metrics.unwrap_or_default(),
        )
    }
}

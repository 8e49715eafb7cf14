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

//! In-process transport: direct calls into a privileged in-memory host.
//!
//! On platforms where the privileged side lives in the same process, the
//! boundary is a function call. The response comes back as the call's
//! return value and is routed through the dispatcher like any other
//! delivery, so callers observe identical behavior across variants. This
//! variant is also the natural test double for the whole stack.

use crate::pending::CallId;
use crate::transport::{Dispatcher, Transport, TransportError};
use std::sync::Arc;
use tracing::debug;

/// The privileged host side of an in-process boundary.
///
/// The handler receives the full encoded request payload, opcode byte plus
/// arguments, which [`Request::decode`](crate::wire::Request::decode)
/// parses, and returns the encoded response argument list.
///
/// # Example
///
/// ```rust
/// use hostbridge::{HostHandler, TransportError};
/// use hostbridge::wire::{encode_values, Request, Value};
///
/// struct EchoHost;
///
/// #[async_trait::async_trait]
/// impl HostHandler for EchoHost {
///     async fn handle(&self, payload: Vec<u8>) -> Result<Vec<u8>, TransportError> {
///         let request = Request::decode(&payload)
///             .map_err(|e| TransportError::HandlerFailed { reason: e.to_string() })?;
///         Ok(encode_values(&request.args))
///     }
/// }
/// ```
#[async_trait::async_trait]
pub trait HostHandler: Send + Sync + 'static {
    /// Executes one host operation and returns its encoded response.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when the operation cannot be carried
    /// out; it surfaces as the caller's call error.
    async fn handle(&self, payload: Vec<u8>) -> Result<Vec<u8>, TransportError>;
}

/// Transport variant backed by a privileged object in the same process.
pub struct InProcessTransport {
    handler: Arc<dyn HostHandler>,
    dispatcher: Dispatcher,
}

impl InProcessTransport {
    /// Creates an in-process transport over a host handler.
    #[must_use]
    pub fn new(handler: Arc<dyn HostHandler>, dispatcher: Dispatcher) -> Self {
        Self {
            handler,
            dispatcher,
        }
    }
}

#[async_trait::async_trait]
impl Transport for InProcessTransport {
    fn name(&self) -> &'static str {
        "in-process"
    }

    async fn send(&self, id: CallId, payload: Vec<u8>) -> Result<(), TransportError> {
        let response = self.handler.handle(payload).await?;
        if id.is_none() {
            // Fire-and-forget: the host's response, if any, is discarded.
            debug!("discarding response to uncorrelated call");
        } else {
            self.dispatcher.deliver_response(id, &response);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hub::NotificationHub;
    use crate::observability::BridgeMetrics;
    use crate::pending::PendingCalls;
    use crate::wire::{encode, encode_values, Request, Value};

    struct ReverseHost;

    #[async_trait::async_trait]
    impl HostHandler for ReverseHost {
        async fn handle(&self, payload: Vec<u8>) -> Result<Vec<u8>, TransportError> {
            let request = Request::decode(&payload).map_err(|e| TransportError::HandlerFailed {
                reason: e.to_string(),
            })?;
            let mut args = request.args;
            args.reverse();
            Ok(encode_values(&args))
        }
    }

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(
            Arc::new(PendingCalls::new()),
            Arc::new(NotificationHub::new()),
            Arc::new(BridgeMetrics::new()),
        )
    }

    #[tokio::test]
    async fn test_send_resolves_through_dispatcher() {
        let dispatcher = dispatcher();
        let transport = InProcessTransport::new(Arc::new(ReverseHost), dispatcher.clone());

        let (id, rx) = dispatcher.pending().register();
        let payload = encode(7, &[Value::from("a"), Value::from("b")]);
        transport.send(id, payload).await.unwrap();

        let values = rx.await.unwrap().into_completed().unwrap();
        assert_eq!(values, vec![Value::from("b"), Value::from("a")]);
    }

    #[tokio::test]
    async fn test_fire_and_forget_discards_response() {
        let dispatcher = dispatcher();
        let transport = InProcessTransport::new(Arc::new(ReverseHost), dispatcher.clone());

        let payload = encode(100, &[Value::from("project")]);
        transport.send(CallId::NONE, payload).await.unwrap();

        assert!(dispatcher.pending().is_empty());
        assert_eq!(dispatcher.metrics().late_responses(), 0);
    }

    #[tokio::test]
    async fn test_handler_failure_propagates() {
        struct FailingHost;

        #[async_trait::async_trait]
        impl HostHandler for FailingHost {
            async fn handle(&self, _payload: Vec<u8>) -> Result<Vec<u8>, TransportError> {
                Err(TransportError::HandlerFailed {
                    reason: "denied".to_string(),
                })
            }
        }

        let dispatcher = dispatcher();
        let transport = InProcessTransport::new(Arc::new(FailingHost), dispatcher.clone());
        let (id, _rx) = dispatcher.pending().register();

        let result = transport.send(id, vec![1]).await;
        assert!(matches!(
            result,
            Err(TransportError::HandlerFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_blocking_unsupported() {
        let dispatcher = dispatcher();
        let transport = InProcessTransport::new(Arc::new(ReverseHost), dispatcher);
        assert!(matches!(
            transport.send_blocking(&[1]),
            Err(TransportError::SyncUnsupported {
                transport: "in-process"
            })
        ));
    }
}

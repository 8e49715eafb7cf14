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

//! The bridge façade: framing, correlation, and transport hand-off.

use crate::bridge::CallError;
use crate::hub::NotificationHub;
use crate::observability::BridgeMetrics;
use crate::pending::{CallId, Outcome, PendingCalls};
use crate::transport::{Dispatcher, Transport};
use crate::wire::{self, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::timeout;

/// The public call surface between sandboxed callers and the host.
///
/// A bridge owns one pending-call registry (the generic call domain), one
/// notification hub, and the transport selected at startup. It performs no
/// opcode validation; the opcode space belongs to the modules issuing
/// calls; the façade's only responsibilities are framing, correlation, and
/// transport selection.
///
/// # Example
///
/// ```rust
/// use hostbridge::{BridgeBuilder, HostHandler, TransportError, Value};
/// use hostbridge::wire::{encode_values, Request};
/// use std::sync::Arc;
///
/// struct StatHost;
///
/// #[async_trait::async_trait]
/// impl HostHandler for StatHost {
///     async fn handle(&self, payload: Vec<u8>) -> Result<Vec<u8>, TransportError> {
///         let request = Request::decode(&payload)
///             .map_err(|e| TransportError::HandlerFailed { reason: e.to_string() })?;
///         assert_eq!(request.opcode, 8);
///         // exists = true, isFile = true
///         Ok(encode_values(&[Value::from(true), Value::from(true)]))
///     }
/// }
///
/// # async fn example() -> Result<(), hostbridge::CallError> {
/// let bridge = BridgeBuilder::new().in_process(Arc::new(StatHost));
/// let values = bridge.call(8, vec![Value::from("foo.txt")]).await?;
/// assert_eq!(values, vec![Value::from(true), Value::from(true)]);
/// # Ok(())
/// # }
/// ```
pub struct Bridge {
    transport: Arc<dyn Transport>,
    pending: Arc<PendingCalls<Vec<Value>>>,
    hub: Arc<NotificationHub>,
    metrics: Arc<BridgeMetrics>,
}

impl Bridge {
    /// Creates a bridge over pre-wired session components.
    ///
    /// Most callers use [`BridgeBuilder`](crate::BridgeBuilder), which
    /// constructs the components and the transport together.
    #[must_use]
    pub fn new(
        transport: Arc<dyn Transport>,
        pending: Arc<PendingCalls<Vec<Value>>>,
        hub: Arc<NotificationHub>,
        metrics: Arc<BridgeMetrics>,
    ) -> Self {
        Self {
            transport,
            pending,
            hub,
            metrics,
        }
    }

    /// Issues an asynchronous call and awaits its decoded response values.
    ///
    /// # Errors
    ///
    /// Returns [`CallError::Transport`] if the payload could not be handed
    /// to the host, or [`CallError::Aborted`] if the session was torn down
    /// before the response arrived.
    pub async fn call(&self, opcode: u8, args: Vec<Value>) -> Result<Vec<Value>, CallError> {
        let (_, rx) = self.issue(opcode, &args).await?;
        Self::await_outcome(rx).await
    }

    /// Issues a call and applies a result transformer to the decoded
    /// values.
    ///
    /// The transformer runs after decode and before the caller's future
    /// resolves, for example mapping `[exists, is_file]` to a typed
    /// option, or folding a paired list into structs.
    ///
    /// # Errors
    ///
    /// Same as [`call`](Self::call); the transformer itself is infallible.
    pub async fn call_map<T, F>(&self, opcode: u8, args: Vec<Value>, transform: F) -> Result<T, CallError>
    where
        F: FnOnce(Vec<Value>) -> T,
    {
        self.call(opcode, args).await.map(transform)
    }

    /// Issues a call that must complete within `duration`.
    ///
    /// On timeout the caller's future rejects and the pending id is
    /// forgotten, so a late host response no longer matches anything and is
    /// dropped as a logged diagnostic.
    ///
    /// # Errors
    ///
    /// [`CallError::Timeout`] after the deadline, otherwise as
    /// [`call`](Self::call).
    pub async fn call_timeout(
        &self,
        opcode: u8,
        args: Vec<Value>,
        duration: Duration,
    ) -> Result<Vec<Value>, CallError> {
        let (id, rx) = self.issue(opcode, &args).await?;
        match timeout(duration, Self::await_outcome(rx)).await {
            Ok(result) => result,
            Err(_) => {
                self.pending.forget(id);
                self.metrics.record_calls_aborted(1);
                Err(CallError::Timeout { duration })
            }
        }
    }

    /// Issues a call synchronously, blocking the calling thread.
    ///
    /// Reserved for execution contexts that cannot await (early bootstrap,
    /// a worker before its channel is live). It starves all other work on
    /// the thread while blocked and is incompatible with concurrent callers
    /// sharing one blocking channel.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::SyncUnsupported`] through
    /// [`CallError::Transport`] on transports without a blocking path, or
    /// [`CallError::Decode`] if the returned buffer violates the wire
    /// contract.
    ///
    /// [`TransportError::SyncUnsupported`]: crate::TransportError::SyncUnsupported
    pub fn call_blocking(&self, opcode: u8, args: &[Value]) -> Result<Vec<Value>, CallError> {
        self.metrics.record_call_sent();
        let payload = wire::encode(opcode, args);
        let response = self.transport.send_blocking(&payload)?;
        Ok(wire::decode(&response)?)
    }

    /// Issues a fire-and-forget call: no id is allocated and no response is
    /// tracked.
    ///
    /// # Errors
    ///
    /// Returns [`CallError::Transport`] if the payload could not be handed
    /// to the host.
    pub async fn send(&self, opcode: u8, args: Vec<Value>) -> Result<(), CallError> {
        self.metrics.record_call_sent();
        let payload = wire::encode(opcode, &args);
        self.transport.send(CallId::NONE, payload).await?;
        Ok(())
    }

    /// Aborts every outstanding call in this bridge's domain.
    ///
    /// Call on session teardown so no caller awaits forever; each
    /// outstanding future completes with [`CallError::Aborted`].
    pub fn drain_all(&self) {
        self.pending.drain_all();
    }

    /// The notification hub fed by this bridge's transport.
    #[must_use]
    pub fn hub(&self) -> &Arc<NotificationHub> {
        &self.hub
    }

    /// The diagnostic counters for this session.
    #[must_use]
    pub fn metrics(&self) -> &Arc<BridgeMetrics> {
        &self.metrics
    }

    /// A dispatcher over this bridge's session components.
    ///
    /// Host-side glue and tests use this to deliver responses and
    /// notifications as a transport would.
    #[must_use]
    pub fn dispatcher(&self) -> Dispatcher {
        Dispatcher::new(
            self.pending.clone(),
            self.hub.clone(),
            self.metrics.clone(),
        )
    }

    async fn issue(
        &self,
        opcode: u8,
        args: &[Value],
    ) -> Result<(CallId, oneshot::Receiver<Outcome<Vec<Value>>>), CallError> {
        self.metrics.record_call_sent();
        let payload = wire::encode(opcode, args);
        let (id, rx) = self.pending.register();
        if let Err(e) = self.transport.send(id, payload).await {
            // Release the id; nothing will ever resolve it.
            self.pending.forget(id);
            return Err(e.into());
        }
        Ok((id, rx))
    }

    async fn await_outcome(
        rx: oneshot::Receiver<Outcome<Vec<Value>>>,
    ) -> Result<Vec<Value>, CallError> {
        match rx.await {
            Ok(Outcome::Completed(values)) => Ok(values),
            Ok(Outcome::Aborted) | Err(_) => Err(CallError::Aborted),
        }
    }
}

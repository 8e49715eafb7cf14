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

use crate::pending::CallId;
use crate::transport::TransportError;

/// Core abstraction over the sandbox↔host boundary.
///
/// A transport moves already-encoded payloads across the boundary in both
/// directions. The call id rides in the transport's own envelope, never
/// inside the encoded payload, so each variant frames it however its
/// platform channel requires.
///
/// Responses do not come back through [`send`](Self::send): the transport
/// wires its receive path into a [`Dispatcher`](crate::transport::Dispatcher)
/// at construction, and the dispatcher completes the caller's future (or
/// fans a notification out) when bytes arrive.
///
/// # Implementations
///
/// - [`InProcessTransport`](crate::transport::InProcessTransport)
/// - [`CallbackTransport`](crate::transport::CallbackTransport)
/// - [`BlockingTransport`](crate::transport::BlockingTransport)
/// - [`SocketTransport`](crate::transport::SocketTransport)
///
/// # Implementing a custom transport
///
/// ```rust
/// use hostbridge::{CallId, Transport, TransportError};
///
/// struct NullTransport;
///
/// #[async_trait::async_trait]
/// impl Transport for NullTransport {
///     fn name(&self) -> &'static str {
///         "null"
///     }
///
///     async fn send(&self, _id: CallId, _payload: Vec<u8>) -> Result<(), TransportError> {
///         Err(TransportError::Closed)
///     }
/// }
/// ```
#[async_trait::async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Returns the variant name, for logs and error context.
    fn name(&self) -> &'static str;

    /// Hands an encoded payload to the host.
    ///
    /// For a tracked call, `id` is the allocated call id and the matching
    /// response arrives later through the dispatcher. For fire-and-forget
    /// traffic the id is [`CallId::NONE`] and no response is expected.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] if the payload could not be handed
    /// over. Delivery failures after handover surface through the
    /// dispatcher's drain path, not here.
    async fn send(&self, id: CallId, payload: Vec<u8>) -> Result<(), TransportError>;

    /// Issues a request synchronously, blocking the calling thread until
    /// the host returns the encoded response.
    ///
    /// Reserved for narrow bootstrap windows where no event-loop turn can
    /// be awaited; it starves all other work on the thread while blocked
    /// and must never be used from a context that has to stay responsive.
    ///
    /// # Errors
    ///
    /// The default implementation reports [`TransportError::SyncUnsupported`];
    /// only variants with a genuine blocking channel override it.
    fn send_blocking(&self, payload: &[u8]) -> Result<Vec<u8>, TransportError> {
        let _ = payload;
        Err(TransportError::SyncUnsupported {
            transport: self.name(),
        })
    }
}

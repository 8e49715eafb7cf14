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

//! Native-bridge-callback transport.
//!
//! On webview-style platforms the UI hands a payload to a platform API and
//! the native side later invokes a globally registered "deliver" entry
//! point with the result. The platforms impose exactly one such
//! registration per process; this module models it as an explicit
//! [`install`] call that returns a [`DeliveryGuard`]. The registration
//! lives exactly as long as the guard, and a second install while one is
//! alive is an error rather than a silent overwrite.
//!
//! The embedding host glue calls the free functions [`deliver_response`]
//! and [`deliver_notification`]; both entry points must be installed before
//! the first call is issued over a [`CallbackTransport`].

use crate::pending::CallId;
use crate::transport::{Dispatcher, Transport, TransportError};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::warn;

static ACTIVE: Mutex<Option<Dispatcher>> = Mutex::new(None);

/// The platform API that carries payloads to the native host.
///
/// `post` hands the envelope to the platform and returns immediately; the
/// host replies later through the installed entry points.
pub trait HostSink: Send + Sync + 'static {
    /// Posts one request envelope to the native host.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] if the platform refused the payload.
    fn post(&self, id: CallId, payload: Vec<u8>) -> Result<(), TransportError>;
}

/// Keeps the process-wide delivery entry points installed.
///
/// Dropping the guard deregisters the entry points and drains the session's
/// outstanding calls, so nothing awaits a response that can no longer be
/// delivered.
#[must_use = "dropping the guard uninstalls the delivery entry points"]
pub struct DeliveryGuard {
    _private: (),
}

impl Drop for DeliveryGuard {
    fn drop(&mut self) {
        let dispatcher = ACTIVE.lock().take();
        if let Some(dispatcher) = dispatcher {
            dispatcher.drain();
        }
    }
}

/// Installs the process-wide delivery entry points for a session.
///
/// Must be called once, before any call is issued over a
/// [`CallbackTransport`].
///
/// # Errors
///
/// Returns [`TransportError::CallbackAlreadyInstalled`] if another guard is
/// still alive.
pub fn install(dispatcher: Dispatcher) -> Result<DeliveryGuard, TransportError> {
    let mut active = ACTIVE.lock();
    if active.is_some() {
        return Err(TransportError::CallbackAlreadyInstalled);
    }
    *active = Some(dispatcher);
    Ok(DeliveryGuard { _private: () })
}

/// Process-wide entry point: the native host delivers a response for a
/// correlated call.
///
/// A delivery with no installed session is logged and dropped; the host may
/// race a teardown, and this path must never unwind into platform code.
pub fn deliver_response(id: CallId, payload: &[u8]) {
    let dispatcher = ACTIVE.lock().clone();
    match dispatcher {
        Some(dispatcher) => dispatcher.deliver_response(id, payload),
        None => warn!(%id, "response delivered with no installed session"),
    }
}

/// Process-wide entry point: the native host delivers an unsolicited
/// notification for a topic.
pub fn deliver_notification(topic: &str, payload: &[u8]) {
    let dispatcher = ACTIVE.lock().clone();
    match dispatcher {
        Some(dispatcher) => dispatcher.deliver_notification(topic, payload),
        None => warn!(topic, "notification delivered with no installed session"),
    }
}

/// Transport variant that posts payloads to a platform API and receives
/// results through the process-wide entry points.
pub struct CallbackTransport {
    sink: Arc<dyn HostSink>,
}

impl CallbackTransport {
    /// Creates a callback transport over a platform sink.
    ///
    /// The matching [`install`] call wires the receive direction; the
    /// transport itself only moves payloads outward.
    #[must_use]
    pub fn new(sink: Arc<dyn HostSink>) -> Self {
        Self { sink }
    }
}

#[async_trait::async_trait]
impl Transport for CallbackTransport {
    fn name(&self) -> &'static str {
        "native-callback"
    }

    async fn send(&self, id: CallId, payload: Vec<u8>) -> Result<(), TransportError> {
        self.sink.post(id, payload)
    }
}

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

#![doc = include_str!("../README.md")]
#![allow(clippy::module_inception)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

//! # Hostbridge - Sandbox-to-Host RPC Bridge
//!
//! Hostbridge is the remote-procedure bridge between an application UI
//! running in a constrained sandbox (a webview, a worker, a thin scripting
//! host) and the privileged native host that owns the real capabilities:
//! filesystem, processes, builds, version control, peer networking. It
//! provides:
//!
//! - **A compact binary wire format**: heterogeneous argument lists
//!   (strings, 32-bit integers, booleans, byte buffers) in one
//!   self-delimiting buffer prefixed by an opcode
//! - **Request/response correlation**: small reusable call ids, one
//!   independent id pool per logical call domain
//! - **Pluggable transports**: in-process, native-callback, blocking
//!   endpoint, and socket; one is selected per platform at startup
//! - **Host-initiated notifications**: a topic-keyed publish/subscribe hub
//!   fed by the same transport deliveries
//! - **Remote stubs**: explicit method-path builders for worker-isolated
//!   services
//!
//! ## Architecture
//!
//! - **[`wire`]**: argument values and the self-delimiting codec
//! - **[`pending`]**: in-flight call registries with reusable ids
//! - **[`transport`]**: the platform boundary, in four variants, plus the
//!   [`Dispatcher`] every inbound byte converges on
//! - **[`bridge`]**: the public call surface and session builder
//! - **[`hub`]**: the notification hub
//! - **[`stub`]**: remote stubs and worker channels
//! - **[`observability`]**: diagnostic counters for the conditions that are
//!   logged rather than escalated
//!
//! ## Quick Start
//!
//! ```rust
//! use hostbridge::{BridgeBuilder, HostHandler, TransportError, Value};
//! use hostbridge::wire::{encode_values, Request};
//! use std::sync::Arc;
//!
//! // The privileged side: here, in-process. Opcode 8 is "does this path
//! // exist"; real hosts switch on their own opcode table.
//! struct Host;
//!
//! #[async_trait::async_trait]
//! impl HostHandler for Host {
//!     async fn handle(&self, payload: Vec<u8>) -> Result<Vec<u8>, TransportError> {
//!         let request = Request::decode(&payload)
//!             .map_err(|e| TransportError::HandlerFailed { reason: e.to_string() })?;
//!         match request.opcode {
//!             8 => Ok(encode_values(&[Value::from(true), Value::from(true)])),
//!             _ => Ok(Vec::new()),
//!         }
//!     }
//! }
//!
//! # async fn example() -> Result<(), hostbridge::CallError> {
//! let bridge = BridgeBuilder::new().in_process(Arc::new(Host));
//!
//! // Issue a call and shape the response with a transformer.
//! let is_file = bridge
//!     .call_map(8, vec![Value::from("src/main.ts")], |values| {
//!         values.first().and_then(Value::as_bool).unwrap_or(false)
//!     })
//!     .await?;
//! assert!(is_file);
//!
//! // Subscribe to host-initiated notifications.
//! bridge.hub().subscribe("file-event", |payload| {
//!     println!("files changed: {}", String::from_utf8_lossy(payload));
//! });
//! # Ok(())
//! # }
//! ```
//!
//! ## Call domains
//!
//! Responses are matched to calls by small integer ids allocated
//! lowest-available-first. Each logical call domain (the bridge's generic
//! calls, each worker channel, any module tracking long-running jobs)
//! owns its own [`PendingCalls`] pool, so unrelated call types never share
//! an id space. Id 0 is reserved for fire-and-forget traffic and
//! notification frames.
//!
//! ## Error Handling
//!
//! Three layers, composed at the call surface:
//!
//! - [`DecodeError`]: wire-contract violations
//! - [`TransportError`]: boundary failures
//! - [`CallError`]: what a caller of [`Bridge::call`] sees
//!
//! Transport failures propagate to the caller without retry; duplicate or
//! late responses and subscriber-less notifications are logged and counted
//! ([`BridgeMetrics`]) but never escalated.
//!
//! ## Safety
//!
//! 100% safe Rust with `#![deny(unsafe_code)]`. Async plumbing is built on
//! Tokio; registries use short synchronous critical sections that are never
//! held across an await point.

pub mod bridge;
pub mod hub;
pub mod observability;
pub mod pending;
pub mod stub;
pub mod transport;
pub mod wire;

pub use bridge::{Bridge, BridgeBuilder, CallError};
pub use hub::{NotificationHub, SubscriptionId};
pub use observability::BridgeMetrics;
pub use pending::{CallId, Outcome, PendingCalls};
pub use stub::{Invoker, RemoteStub, WorkerChannel, WorkerService};
pub use transport::{
    BlockingTransport, CallbackTransport, Dispatcher, HostHandler, HostSink, InProcessTransport,
    SocketConfig, SocketTransport, SyncEndpoint, Transport, TransportError,
};
pub use wire::{DecodeError, Value};

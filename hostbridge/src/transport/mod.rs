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

//! Platform transports: the only layer with platform-specific code.
//!
//! One transport instance is selected at process start, injected into the
//! bridge at construction, and stays active for the whole session. Every
//! variant moves the same encoded payloads across the sandbox boundary; they
//! differ only in *how* the bytes cross:
//!
//! - [`InProcessTransport`]: direct call into a privileged in-memory
//!   [`HostHandler`]
//! - [`CallbackTransport`]: payload posted to a platform API; the host calls
//!   the process-wide delivery entry points later
//! - [`BlockingTransport`]: synchronous request/response endpoint, the
//!   fallback for execution contexts that cannot await
//! - [`SocketTransport`]: bidirectional TCP connection with a background
//!   reader
//!
//! Inbound traffic converges on a [`Dispatcher`]: frames correlated by call
//! id resolve the pending-call registry, unsolicited frames fan out through
//! the notification hub. A transport never retries on failure; retry and
//! failover policy belongs to the caller (see
//! [`SocketTransport::connect_any`] for the candidate-list helper).

mod blocking;
pub mod callback;
mod config;
mod dispatch;
mod error;
mod in_process;
mod socket;
mod traits;

pub use blocking::{BlockingTransport, SyncEndpoint};
pub use callback::{CallbackTransport, DeliveryGuard, HostSink};
pub use config::SocketConfig;
pub use dispatch::Dispatcher;
pub use error::TransportError;
pub use in_process::{HostHandler, InProcessTransport};
pub use socket::{encode_notification, SocketTransport};
pub use traits::Transport;

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

//! Socket transport configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default per-attempt connection timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default maximum inbound/outbound frame size (16 MB).
pub const DEFAULT_MAX_FRAME_SIZE: u32 = 16 * 1024 * 1024;

/// Configuration for the socket transport.
///
/// Selected once at process start and immutable for the session, like the
/// transport it configures.
///
/// # Examples
///
/// ```rust
/// use hostbridge::SocketConfig;
/// use std::time::Duration;
///
/// let config = SocketConfig::new()
///     .with_connect_timeout(Duration::from_secs(2))
///     .with_max_frame_size(1024 * 1024);
/// assert_eq!(config.connect_timeout, Duration::from_secs(2));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocketConfig {
    /// Time allowed for one connection attempt before giving up on that
    /// candidate. The transport does not retry; failover across candidates
    /// belongs to the caller (or [`connect_any`]).
    ///
    /// [`connect_any`]: crate::transport::SocketTransport::connect_any
    pub connect_timeout: Duration,

    /// Upper bound on a single frame, in either direction.
    pub max_frame_size: u32,
}

impl SocketConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the per-attempt connection timeout.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the maximum frame size.
    #[must_use]
    pub fn with_max_frame_size(mut self, max: u32) -> Self {
        self.max_frame_size = max;
        self
    }
}

impl Default for SocketConfig {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }
}

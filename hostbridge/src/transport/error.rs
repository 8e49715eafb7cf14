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

//! Transport layer error types.
//!
//! Transport errors surface to the immediate caller of a bridge call:
//! as the call's error in async mode, or as the returned failure in
//! blocking mode. The transport itself never retries; callers that want
//! failover implement it above this layer.

use std::io;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur in the transport layer.
///
/// # Examples
///
/// ```rust
/// use hostbridge::TransportError;
/// use std::time::Duration;
///
/// let error = TransportError::ConnectTimeout {
///     address: "10.0.0.7:14000".to_string(),
///     duration: Duration::from_secs(5),
/// };
/// assert!(error.is_recoverable());
/// assert!(!TransportError::Closed.is_recoverable());
/// ```
#[derive(Debug, Error)]
pub enum TransportError {
    /// Failed to establish a connection to the host endpoint.
    #[error("failed to connect to {address}: {source}")]
    ConnectionFailed {
        /// The address that failed to connect.
        address: String,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A connection attempt exceeded its timeout.
    #[error("connecting to {address} timed out after {duration:?}")]
    ConnectTimeout {
        /// The address that timed out.
        address: String,
        /// The per-attempt timeout that was exceeded.
        duration: Duration,
    },

    /// Every candidate address failed during a failover sweep.
    #[error("all {attempted} candidate addresses failed")]
    AllCandidatesFailed {
        /// Number of addresses attempted.
        attempted: usize,
    },

    /// An established connection was lost.
    #[error("connection lost: {reason}")]
    ConnectionLost {
        /// Description of why the connection was lost.
        reason: String,
        /// The underlying I/O error, if available.
        #[source]
        source: Option<io::Error>,
    },

    /// Failed to write a payload across the boundary.
    #[error("send failed: {source}")]
    SendFailed {
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// An outbound payload exceeded the configured frame cap.
    #[error("frame of {size} bytes exceeds maximum {max}")]
    FrameTooLarge {
        /// The attempted frame size.
        size: usize,
        /// The configured maximum.
        max: u32,
    },

    /// The privileged host handler reported a failure.
    #[error("host handler failed: {reason}")]
    HandlerFailed {
        /// Host-provided description of the failure.
        reason: String,
    },

    /// The transport has been shut down.
    #[error("transport is closed")]
    Closed,

    /// This transport variant has no synchronous call path.
    #[error("transport {transport:?} does not support blocking calls")]
    SyncUnsupported {
        /// Name of the transport variant.
        transport: &'static str,
    },

    /// The process-wide delivery entry points are already installed.
    ///
    /// The platforms allow exactly one native callback registration per
    /// process; a second install while a [`DeliveryGuard`] is alive is a
    /// programming error.
    ///
    /// [`DeliveryGuard`]: crate::transport::DeliveryGuard
    #[error("delivery entry points are already installed for this process")]
    CallbackAlreadyInstalled,
}

impl TransportError {
    /// Returns `true` if retrying the operation may succeed.
    ///
    /// Connection-establishment failures and timeouts are transient; a
    /// closed transport, an oversized frame, or a double callback install
    /// are not.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed { .. }
                | Self::ConnectTimeout { .. }
                | Self::AllCandidatesFailed { .. }
                | Self::ConnectionLost { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverability() {
        let timeout = TransportError::ConnectTimeout {
            address: "localhost:1".to_string(),
            duration: Duration::from_secs(5),
        };
        assert!(timeout.is_recoverable());

        assert!(!TransportError::Closed.is_recoverable());
        assert!(!TransportError::CallbackAlreadyInstalled.is_recoverable());
        assert!(!TransportError::FrameTooLarge { size: 20, max: 10 }.is_recoverable());
    }

    #[test]
    fn test_display_carries_context() {
        let error = TransportError::AllCandidatesFailed { attempted: 3 };
        assert!(error.to_string().contains('3'));

        let error = TransportError::SyncUnsupported { transport: "socket" };
        assert!(error.to_string().contains("socket"));
    }
}

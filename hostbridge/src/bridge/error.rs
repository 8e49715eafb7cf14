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

//! Call-level error type.

use crate::transport::TransportError;
use crate::wire::DecodeError;
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced to a caller of [`Bridge::call`](crate::Bridge::call) and
/// its variants.
///
/// Transport failures propagate here unchanged; the façade never retries
/// and never swallows them. Retry and backoff policy belongs to the calling
/// module.
#[derive(Debug, Error)]
pub enum CallError {
    /// The transport failed to carry the request or its connection died.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// A response payload violated the wire contract.
    #[error("malformed response payload: {0}")]
    Decode(#[from] DecodeError),

    /// The session was torn down before a response arrived.
    #[error("call aborted before a response arrived")]
    Aborted,

    /// No response arrived within the caller-supplied deadline.
    #[error("no response within {duration:?}")]
    Timeout {
        /// The deadline that was exceeded.
        duration: Duration,
    },
}

impl CallError {
    /// Returns `true` if the call ended without a host response (aborted or
    /// timed out) rather than failing outright.
    #[must_use]
    pub const fn is_abandoned(&self) -> bool {
        matches!(self, Self::Aborted | Self::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_abandoned() {
        assert!(CallError::Aborted.is_abandoned());
        assert!(CallError::Timeout {
            duration: Duration::from_secs(1)
        }
        .is_abandoned());
        assert!(!CallError::Transport(TransportError::Closed).is_abandoned());
    }

    #[test]
    fn test_from_layers() {
        let e: CallError = TransportError::Closed.into();
        assert!(matches!(e, CallError::Transport(_)));

        let e: CallError = DecodeError::EmptyRequest.into();
        assert!(matches!(e, CallError::Decode(_)));
    }
}

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

//! Call identifier type.

use std::fmt;

/// Identifier correlating a response with its in-flight call.
///
/// Call ids are small integers allocated lowest-available-first by a
/// [`PendingCalls`](crate::pending::PendingCalls) registry, so a bursty but
/// shallow call pattern keeps reusing the same handful of small values. An
/// id is meaningful only within the registry that allocated it and only
/// while the call is outstanding.
///
/// Id 0 ([`CallId::NONE`]) is reserved for uncorrelated traffic:
/// fire-and-forget calls and transport frames that carry notifications
/// rather than responses.
///
/// # Example
///
/// ```rust
/// use hostbridge::CallId;
///
/// let id = CallId::from(3);
/// assert_eq!(id.as_u32(), 3);
/// assert!(!id.is_none());
/// assert!(CallId::NONE.is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallId(u32);

impl CallId {
    /// The reserved id for uncorrelated traffic.
    pub const NONE: Self = Self(0);

    /// Creates a call id from a raw integer.
    #[must_use]
    pub const fn from_u32(value: u32) -> Self {
        Self(value)
    }

    /// Returns the id as a raw integer.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// Returns `true` if this is the reserved uncorrelated id.
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl From<u32> for CallId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<CallId> for u32 {
    fn from(id: CallId) -> Self {
        id.0
    }
}

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Call({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_is_zero() {
        assert_eq!(CallId::NONE.as_u32(), 0);
        assert!(CallId::NONE.is_none());
        assert!(!CallId::from(1).is_none());
    }

    #[test]
    fn test_conversion() {
        let id = CallId::from(42u32);
        let back: u32 = id.into();
        assert_eq!(back, 42);
    }

    #[test]
    fn test_display() {
        assert_eq!(CallId::from(7).to_string(), "Call(7)");
    }
}

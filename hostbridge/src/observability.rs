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

//! Diagnostic counters for the bridge.
//!
//! Several conditions in the bridge are logged but deliberately not
//! escalated: a response for an id nobody is waiting on, a notification
//! with zero subscribers, a malformed buffer on the receive path. The
//! counters here make those conditions observable to monitoring and to
//! tests without turning them into errors.

use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic counters fed from the bridge's issue and receive paths.
///
/// Thread-safe; share one instance per bridge session via `Arc`.
///
/// # Examples
///
/// ```rust
/// use hostbridge::BridgeMetrics;
///
/// let metrics = BridgeMetrics::new();
/// metrics.record_call_sent();
/// metrics.record_response_resolved();
/// assert_eq!(metrics.calls_sent(), 1);
/// assert_eq!(metrics.responses_resolved(), 1);
/// assert_eq!(metrics.late_responses(), 0);
/// ```
#[derive(Debug, Default)]
pub struct BridgeMetrics {
    /// Calls handed to the transport (tracked and fire-and-forget).
    calls_sent: AtomicU64,
    /// Responses that matched an outstanding call.
    responses_resolved: AtomicU64,
    /// Responses dropped because their id was unknown or already released.
    late_responses: AtomicU64,
    /// Calls that ended with the aborted sentinel (drain or teardown).
    calls_aborted: AtomicU64,
    /// Receive-path payloads that failed to decode.
    decode_failures: AtomicU64,
    /// Notification callbacks invoked.
    notifications_delivered: AtomicU64,
    /// Notifications dispatched to a topic with zero subscribers.
    notifications_unclaimed: AtomicU64,
}

impl BridgeMetrics {
    /// Creates a zeroed metrics tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a call handed to the transport.
    pub fn record_call_sent(&self) {
        self.calls_sent.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a response routed to its waiting continuation.
    pub fn record_response_resolved(&self) {
        self.responses_resolved.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a response dropped for want of a matching id.
    pub fn record_late_response(&self) {
        self.late_responses.fetch_add(1, Ordering::Relaxed);
    }

    /// Records `count` calls that completed with the aborted sentinel.
    pub fn record_calls_aborted(&self, count: u64) {
        self.calls_aborted.fetch_add(count, Ordering::Relaxed);
    }

    /// Records a receive-path payload that failed to decode.
    pub fn record_decode_failure(&self) {
        self.decode_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Records `count` notification callbacks invoked by one dispatch.
    pub fn record_notifications_delivered(&self, count: u64) {
        self.notifications_delivered.fetch_add(count, Ordering::Relaxed);
    }

    /// Records a notification dispatched to an empty topic.
    pub fn record_notification_unclaimed(&self) {
        self.notifications_unclaimed.fetch_add(1, Ordering::Relaxed);
    }

    /// Total calls handed to the transport.
    #[must_use]
    pub fn calls_sent(&self) -> u64 {
        self.calls_sent.load(Ordering::Relaxed)
    }

    /// Total responses routed to a waiting continuation.
    #[must_use]
    pub fn responses_resolved(&self) -> u64 {
        self.responses_resolved.load(Ordering::Relaxed)
    }

    /// Total responses dropped for want of a matching id.
    #[must_use]
    pub fn late_responses(&self) -> u64 {
        self.late_responses.load(Ordering::Relaxed)
    }

    /// Total calls completed with the aborted sentinel.
    #[must_use]
    pub fn calls_aborted(&self) -> u64 {
        self.calls_aborted.load(Ordering::Relaxed)
    }

    /// Total receive-path decode failures.
    #[must_use]
    pub fn decode_failures(&self) -> u64 {
        self.decode_failures.load(Ordering::Relaxed)
    }

    /// Total notification callbacks invoked.
    #[must_use]
    pub fn notifications_delivered(&self) -> u64 {
        self.notifications_delivered.load(Ordering::Relaxed)
    }

    /// Total notifications dispatched to an empty topic.
    #[must_use]
    pub fn notifications_unclaimed(&self) -> u64 {
        self.notifications_unclaimed.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_start_at_zero() {
        let metrics = BridgeMetrics::new();
        assert_eq!(metrics.calls_sent(), 0);
        assert_eq!(metrics.responses_resolved(), 0);
        assert_eq!(metrics.late_responses(), 0);
        assert_eq!(metrics.calls_aborted(), 0);
        assert_eq!(metrics.decode_failures(), 0);
        assert_eq!(metrics.notifications_delivered(), 0);
        assert_eq!(metrics.notifications_unclaimed(), 0);
    }

    #[test]
    fn test_counters_accumulate() {
        let metrics = BridgeMetrics::new();
        metrics.record_call_sent();
        metrics.record_call_sent();
        metrics.record_response_resolved();
        metrics.record_late_response();
        metrics.record_notifications_delivered(3);
        metrics.record_notification_unclaimed();

        assert_eq!(metrics.calls_sent(), 2);
        assert_eq!(metrics.responses_resolved(), 1);
        assert_eq!(metrics.late_responses(), 1);
        assert_eq!(metrics.notifications_delivered(), 3);
        assert_eq!(metrics.notifications_unclaimed(), 1);
    }
}

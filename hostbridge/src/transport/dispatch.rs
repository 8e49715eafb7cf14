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

//! The inbound delivery seam between transports and the bridge session.

use crate::hub::NotificationHub;
use crate::observability::BridgeMetrics;
use crate::pending::{CallId, PendingCalls};
use crate::wire::{self, Value};
use std::sync::Arc;
use tracing::{debug, error};

/// Routes inbound transport traffic to the right session component.
///
/// A transport receives raw bytes from the host and calls exactly one of
/// two entry points: [`deliver_response`](Self::deliver_response) for frames
/// correlated by call id, [`deliver_notification`](Self::deliver_notification)
/// for unsolicited topic messages. Both are total: they log and count
/// failures instead of panicking, because the receive path may be a callback
/// the platform owns and cannot tolerate unwinding.
///
/// The dispatcher is handed to each transport at construction; this is the
/// explicit form of the one-per-process "deliver a response" registration
/// the native platforms impose (see the [`callback`](crate::transport::callback)
/// module for the process-wide variant).
#[derive(Clone)]
pub struct Dispatcher {
    pending: Arc<PendingCalls<Vec<Value>>>,
    hub: Arc<NotificationHub>,
    metrics: Arc<BridgeMetrics>,
}

impl Dispatcher {
    /// Creates a dispatcher over a session's registry, hub, and metrics.
    #[must_use]
    pub fn new(
        pending: Arc<PendingCalls<Vec<Value>>>,
        hub: Arc<NotificationHub>,
        metrics: Arc<BridgeMetrics>,
    ) -> Self {
        Self {
            pending,
            hub,
            metrics,
        }
    }

    /// Decodes a response payload and resolves the matching pending call.
    ///
    /// A payload that fails to decode is a contract violation between the
    /// paired encoder and decoder; it is logged and counted, never
    /// recovered. A response whose id no longer matches an outstanding call
    /// (duplicate or late delivery) is likewise logged and dropped.
    pub fn deliver_response(&self, id: CallId, payload: &[u8]) {
        match wire::decode(payload) {
            Ok(values) => {
                if self.pending.resolve(id, values) {
                    self.metrics.record_response_resolved();
                } else {
                    self.metrics.record_late_response();
                }
            }
            Err(e) => {
                error!(%id, error = %e, "malformed response payload from paired transport");
                self.metrics.record_decode_failure();
            }
        }
    }

    /// Fans a notification payload out to the topic's subscribers.
    pub fn deliver_notification(&self, topic: &str, payload: &[u8]) {
        let delivered = self.hub.dispatch(topic, payload);
        if delivered == 0 {
            self.metrics.record_notification_unclaimed();
        } else {
            self.metrics.record_notifications_delivered(delivered as u64);
        }
    }

    /// Aborts every outstanding call in the owning session.
    ///
    /// Called by transports whose receive path has terminated (reader task
    /// exit, worker disposal), so no caller is left awaiting a response
    /// that can no longer arrive.
    pub fn drain(&self) {
        let outstanding = self.pending.len();
        if outstanding > 0 {
            debug!(outstanding, "draining pending calls");
            self.metrics.record_calls_aborted(outstanding as u64);
        }
        self.pending.drain_all();
    }

    /// The pending-call registry this dispatcher resolves into.
    #[must_use]
    pub fn pending(&self) -> &Arc<PendingCalls<Vec<Value>>> {
        &self.pending
    }

    /// The notification hub this dispatcher fans out through.
    #[must_use]
    pub fn hub(&self) -> &Arc<NotificationHub> {
        &self.hub
    }

    /// The session metrics fed by this dispatcher.
    #[must_use]
    pub fn metrics(&self) -> &Arc<BridgeMetrics> {
        &self.metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::encode_values;

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(
            Arc::new(PendingCalls::new()),
            Arc::new(NotificationHub::new()),
            Arc::new(BridgeMetrics::new()),
        )
    }

    #[tokio::test]
    async fn test_deliver_response_resolves() {
        let dispatcher = dispatcher();
        let (id, rx) = dispatcher.pending().register();

        dispatcher.deliver_response(id, &encode_values(&[Value::from(true)]));

        let outcome = rx.await.unwrap().into_completed().unwrap();
        assert_eq!(outcome, vec![Value::from(true)]);
        assert_eq!(dispatcher.metrics().responses_resolved(), 1);
    }

    #[test]
    fn test_deliver_response_unknown_id() {
        let dispatcher = dispatcher();
        dispatcher.deliver_response(CallId::from(9), &encode_values(&[]));
        assert_eq!(dispatcher.metrics().late_responses(), 1);
    }

    #[test]
    fn test_deliver_response_malformed() {
        let dispatcher = dispatcher();
        let (id, _rx) = dispatcher.pending().register();

        dispatcher.deliver_response(id, &[0xEE]);
        assert_eq!(dispatcher.metrics().decode_failures(), 1);
        // The call stays outstanding; drain still completes it.
        assert_eq!(dispatcher.pending().len(), 1);
    }

    #[test]
    fn test_deliver_notification_counts() {
        let dispatcher = dispatcher();
        dispatcher.hub().subscribe("topic", |_| {});
        dispatcher.hub().subscribe("topic", |_| {});

        dispatcher.deliver_notification("topic", b"x");
        dispatcher.deliver_notification("empty", b"x");

        assert_eq!(dispatcher.metrics().notifications_delivered(), 2);
        assert_eq!(dispatcher.metrics().notifications_unclaimed(), 1);
    }

    #[tokio::test]
    async fn test_drain_aborts() {
        let dispatcher = dispatcher();
        let (_, rx) = dispatcher.pending().register();

        dispatcher.drain();
        assert!(rx.await.unwrap().is_aborted());
        assert!(dispatcher.pending().is_empty());
    }
}

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

//! Topic-keyed publish/subscribe channel for host-initiated messages.
//!
//! Unsolicited host events (filesystem change batches, build progress,
//! peer-connectivity changes) arrive on a transport's receive path and fan
//! out here to every subscriber of the named topic. Topics are free-form
//! strings with no collision detection; callers namespace them (for example
//! by suffixing a session id) when one session hosts multiple logical
//! sub-channels.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, error};

/// Token identifying one subscription, returned by
/// [`NotificationHub::subscribe`].
///
/// Closures have no identity in Rust, so unsubscription is by token rather
/// than by callback reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Subscription({})", self.0)
    }
}

type Callback = Arc<dyn Fn(&[u8]) + Send + Sync>;

/// Registry of host-notification subscribers, keyed by topic name.
///
/// Multiple independent subscribers may watch one topic; each is invoked on
/// every dispatch, and one panicking subscriber never prevents the others
/// from running. A topic with zero subscribers at delivery time is a logged
/// diagnostic, not an error: host-originated messages are not guaranteed a
/// listener.
///
/// # Example
///
/// ```rust
/// use hostbridge::NotificationHub;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
///
/// let hub = NotificationHub::new();
/// let seen = Arc::new(AtomicUsize::new(0));
///
/// let watched = seen.clone();
/// let id = hub.subscribe("build", move |_payload| {
///     watched.fetch_add(1, Ordering::Relaxed);
/// });
///
/// assert_eq!(hub.dispatch("build", b"{\"id\":1}"), 1);
/// assert_eq!(seen.load(Ordering::Relaxed), 1);
///
/// hub.unsubscribe("build", id);
/// assert_eq!(hub.dispatch("build", b"{}"), 0);
/// ```
#[derive(Default)]
pub struct NotificationHub {
    topics: Mutex<HashMap<String, Vec<(SubscriptionId, Callback)>>>,
    next_id: AtomicU64,
}

impl NotificationHub {
    /// Creates a hub with no subscriptions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes a callback to a topic.
    ///
    /// The callback receives the raw notification payload; interpreting it
    /// (commonly as a JSON string) is the subscriber's business. Returns
    /// the token for a later [`unsubscribe`](Self::unsubscribe).
    pub fn subscribe<F>(&self, topic: impl Into<String>, callback: F) -> SubscriptionId
    where
        F: Fn(&[u8]) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.topics
            .lock()
            .entry(topic.into())
            .or_default()
            .push((id, Arc::new(callback)));
        id
    }

    /// Removes one subscription from a topic.
    ///
    /// Returns `true` if the subscription was present. Other subscribers of
    /// the same topic are unaffected.
    pub fn unsubscribe(&self, topic: &str, id: SubscriptionId) -> bool {
        let mut topics = self.topics.lock();
        let Some(subscribers) = topics.get_mut(topic) else {
            return false;
        };
        let before = subscribers.len();
        subscribers.retain(|(sub_id, _)| *sub_id != id);
        let removed = subscribers.len() != before;
        if subscribers.is_empty() {
            topics.remove(topic);
        }
        removed
    }

    /// Delivers a payload to every subscriber of a topic.
    ///
    /// Invoked only from a transport's receive path. Returns the number of
    /// callbacks invoked; zero is logged but never escalated. A panic in
    /// one callback is caught and logged so the remaining callbacks still
    /// run; the receive path may be a context the platform owns and cannot
    /// tolerate unwinding into.
    pub fn dispatch(&self, topic: &str, payload: &[u8]) -> usize {
        // Snapshot outside the lock so subscribers may re-enter the hub.
        let subscribers: Vec<Callback> = self
            .topics
            .lock()
            .get(topic)
            .map(|subs| subs.iter().map(|(_, cb)| cb.clone()).collect())
            .unwrap_or_default();

        if subscribers.is_empty() {
            debug!(topic, "notification delivered with no subscribers");
            return 0;
        }

        for callback in &subscribers {
            if catch_unwind(AssertUnwindSafe(|| callback(payload))).is_err() {
                error!(topic, "notification subscriber panicked");
            }
        }
        subscribers.len()
    }

    /// Returns the number of subscriptions currently held for a topic.
    #[must_use]
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.topics.lock().get(topic).map_or(0, Vec::len)
    }
}

impl fmt::Debug for NotificationHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let topics = self.topics.lock();
        f.debug_struct("NotificationHub")
            .field("topics", &topics.keys().collect::<Vec<_>>())
            .finish()
    }
}


// Made with Bob

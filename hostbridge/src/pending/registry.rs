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

//! Registry of in-flight calls keyed by small reusable ids.

use super::CallId;
use parking_lot::Mutex;
use std::collections::HashMap;
use tokio::sync::oneshot;
use tracing::warn;

/// The terminal state of a tracked call.
///
/// A continuation receives exactly one of these: the decoded response
/// values, or the aborted sentinel when the session is torn down before a
/// response arrives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// A response arrived and the call completed.
    Completed(T),
    /// The registry was drained before a response arrived.
    Aborted,
}

impl<T> Outcome<T> {
    /// Returns the completed value, or `None` for the aborted sentinel.
    #[must_use]
    pub fn into_completed(self) -> Option<T> {
        match self {
            Self::Completed(value) => Some(value),
            Self::Aborted => None,
        }
    }

    /// Returns `true` for the aborted sentinel.
    #[must_use]
    pub const fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted)
    }
}

/// Tracks in-flight calls for one logical call domain.
///
/// Each registry owns an independent id space. The bridge holds one for
/// generic calls; a worker channel holds another; a module tracking
/// long-running jobs holds its own. Ids from different registries are
/// unrelated and can never collide, because there is no shared pool.
///
/// # Id allocation
///
/// Lowest available key first: allocation scans up from 1 and picks the
/// first id not currently outstanding. Call volumes are bursty but shallow,
/// so this keeps ids small on the wire and makes a duplicated or late host
/// response harmlessly idempotent, since a released id no longer matches.
/// Allocation and continuation registration happen atomically under one
/// lock, so a reserved-but-unregistered id cannot exist.
///
/// # Thread safety
///
/// The map is mutated from exactly two call sites (registration on the
/// issue path, resolution on the transport receive path) under a short
/// synchronous lock that is never held across an await point.
///
/// # Example
///
/// ```rust
/// use hostbridge::{Outcome, PendingCalls};
///
/// # async fn example() {
/// let pending = PendingCalls::<String>::new();
/// let (id, rx) = pending.register();
///
/// pending.resolve(id, "response".to_string());
/// assert_eq!(rx.await.unwrap(), Outcome::Completed("response".to_string()));
/// # }
/// ```
#[derive(Debug)]
pub struct PendingCalls<T> {
    calls: Mutex<HashMap<u32, oneshot::Sender<Outcome<T>>>>,
}

impl<T> PendingCalls<T> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(HashMap::new()),
        }
    }

    /// Allocates the lowest available id and registers a continuation for
    /// it, atomically.
    ///
    /// Returns the id to send with the request and the receiver the caller
    /// awaits. The id stays allocated until the call is resolved, forgotten,
    /// or drained.
    pub fn register(&self) -> (CallId, oneshot::Receiver<Outcome<T>>) {
        let (tx, rx) = oneshot::channel();
        let mut calls = self.calls.lock();
        let mut id = 1u32;
        while calls.contains_key(&id) {
            id += 1;
        }
        calls.insert(id, tx);
        (CallId::from_u32(id), rx)
    }

    /// Resolves an outstanding call with its response values and releases
    /// the id.
    ///
    /// Returns `true` if a continuation was found and notified. An unknown
    /// id (a duplicate or late host response) is logged and ignored; this
    /// method never panics, because it runs on the transport's receive path.
    /// A given id's continuation fires at most once.
    pub fn resolve(&self, id: CallId, value: T) -> bool {
        let entry = self.calls.lock().remove(&id.as_u32());
        match entry {
            // send() fails when the caller has already dropped interest in
            // the future; the id is released either way.
            Some(tx) => tx.send(Outcome::Completed(value)).is_ok(),
            None => {
                warn!(%id, "dropping response for unknown or completed call");
                false
            }
        }
    }

    /// Drops interest in an outstanding call without invoking its
    /// continuation, releasing the id.
    ///
    /// This is the hook for timeout helpers: forcibly reject the caller's
    /// future, then forget the id so a later host response no longer
    /// matches. Returns `true` if the id was outstanding.
    pub fn forget(&self, id: CallId) -> bool {
        self.calls.lock().remove(&id.as_u32()).is_some()
    }

    /// Aborts every outstanding call, leaving the registry empty.
    ///
    /// Each continuation receives [`Outcome::Aborted`] rather than being
    /// left dangling, so no caller awaits forever past session teardown.
    pub fn drain_all(&self) {
        let drained: Vec<_> = {
            let mut calls = self.calls.lock();
            calls.drain().collect()
        };
        for (_, tx) in drained {
            let _ = tx.send(Outcome::Aborted);
        }
    }

    /// Returns the number of outstanding calls.
    #[must_use]
    pub fn len(&self) -> usize {
        self.calls.lock().len()
    }

    /// Returns `true` if no calls are outstanding.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.calls.lock().is_empty()
    }
}

impl<T> Default for PendingCalls<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_register_and_resolve() {
        let pending = PendingCalls::<u32>::new();
        let (id, rx) = pending.register();

        assert_eq!(pending.len(), 1);
        assert!(pending.resolve(id, 99));
        assert_eq!(rx.await.unwrap(), Outcome::Completed(99));
        assert!(pending.is_empty());
    }

    #[test]
    fn test_lowest_available_allocation() {
        let pending = PendingCalls::<()>::new();
        let ids: Vec<_> = (0..4).map(|_| pending.register().0).collect();
        assert_eq!(
            ids,
            vec![
                CallId::from(1),
                CallId::from(2),
                CallId::from(3),
                CallId::from(4)
            ]
        );
    }

    #[test]
    fn test_id_reuse_after_resolution() {
        let pending = PendingCalls::<()>::new();
        let allocated: Vec<_> = (0..5).map(|_| pending.register().0).collect();

        // Resolve the two lowest; their slots must be reused before the
        // pool advances past the high-water mark.
        assert!(pending.resolve(allocated[0], ()));
        assert!(pending.resolve(allocated[1], ()));

        assert_eq!(pending.register().0, CallId::from(1));
        assert_eq!(pending.register().0, CallId::from(2));
        assert_eq!(pending.register().0, CallId::from(6));
    }

    #[tokio::test]
    async fn test_duplicate_resolve_fires_once() {
        let pending = PendingCalls::<u32>::new();
        let (id, rx) = pending.register();

        assert!(pending.resolve(id, 1));
        // Simulated duplicate host response: no-op, no panic.
        assert!(!pending.resolve(id, 2));
        assert_eq!(rx.await.unwrap(), Outcome::Completed(1));
    }

    #[test]
    fn test_resolve_unknown_id() {
        let pending = PendingCalls::<()>::new();
        assert!(!pending.resolve(CallId::from(41), ()));
    }

    #[tokio::test]
    async fn test_forget_releases_id() {
        let pending = PendingCalls::<()>::new();
        let (id, rx) = pending.register();

        assert!(pending.forget(id));
        assert!(pending.is_empty());
        // The continuation is dropped, not invoked.
        assert!(rx.await.is_err());
        // The id no longer matches a late response.
        assert!(!pending.resolve(id, ()));
    }

    #[tokio::test]
    async fn test_drain_all_aborts_everything() {
        let pending = PendingCalls::<u32>::new();
        let receivers: Vec<_> = (0..3).map(|_| pending.register().1).collect();

        pending.drain_all();
        assert!(pending.is_empty());
        for rx in receivers {
            assert_eq!(rx.await.unwrap(), Outcome::Aborted);
        }
    }

    #[tokio::test]
    async fn test_out_of_order_resolution() {
        let pending = PendingCalls::<&'static str>::new();
        let (id1, rx1) = pending.register();
        let (id2, rx2) = pending.register();

        // Resolve the second call first; each future still gets its own
        // payload.
        assert!(pending.resolve(id2, "two"));
        assert!(pending.resolve(id1, "one"));
        assert_eq!(rx1.await.unwrap(), Outcome::Completed("one"));
        assert_eq!(rx2.await.unwrap(), Outcome::Completed("two"));
    }

    #[tokio::test]
    async fn test_separate_domains_do_not_collide() {
        let builds = PendingCalls::<u32>::new();
        let installs = PendingCalls::<u32>::new();

        let (build_id, build_rx) = builds.register();
        let (install_id, install_rx) = installs.register();

        // Both domains hand out id 1; resolution in one never touches the
        // other.
        assert_eq!(build_id, install_id);
        assert!(builds.resolve(build_id, 10));
        assert_eq!(installs.len(), 1);
        assert!(installs.resolve(install_id, 20));

        assert_eq!(build_rx.await.unwrap(), Outcome::Completed(10));
        assert_eq!(install_rx.await.unwrap(), Outcome::Completed(20));
    }
}

// Made with Bob

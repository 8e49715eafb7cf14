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

//! Remote stubs for worker-isolated services.
//!
//! A [`RemoteStub`] is an explicit method-path builder: each
//! [`method`](RemoteStub::method) call extends the accumulated path, and the
//! terminal [`call`](RemoteStub::call) flushes path plus arguments through
//! an [`Invoker`] as exactly one message. Services expose thin typed
//! wrapper structs over a stub rather than intercepting arbitrary property
//! access (see `examples/language_service.rs`).
//!
//! [`WorkerChannel`] is the invoker for the worker-isolated case: the
//! boundary is a message channel rather than the native bridge, but the
//! contract is identical: an id is assigned from the channel's own
//! pending-call pool, the path and arguments are serialized into one
//! message, and the worker's receive loop resolves by id. Disposing the
//! channel drains the pool so no caller hangs on a dead worker.

use crate::bridge::CallError;
use crate::pending::{CallId, Outcome, PendingCalls};
use crate::wire::{self, DecodeError, Value};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// The underlying invoke primitive a stub flushes through.
///
/// One leaf call becomes exactly one `invoke`, carrying the accumulated
/// path and the terminal arguments.
#[async_trait::async_trait]
pub trait Invoker: Send + Sync + 'static {
    /// Carries one invocation across the boundary and awaits its result.
    ///
    /// # Errors
    ///
    /// Returns a [`CallError`] if the boundary is down or the invocation
    /// was aborted.
    async fn invoke(&self, path: &[String], args: Vec<Value>) -> Result<Vec<Value>, CallError>;
}

/// Call-by-shape client: accumulates a method path, then flushes one
/// message per leaf call.
///
/// Stubs are cheap to clone and extend; extending never mutates the parent,
/// so a service wrapper can hold one root stub and derive per-method paths
/// from it.
///
/// # Example
///
/// ```rust
/// use hostbridge::{CallError, Invoker, RemoteStub, Value};
/// use std::sync::Arc;
///
/// struct PathEcho;
///
/// #[async_trait::async_trait]
/// impl Invoker for PathEcho {
///     async fn invoke(&self, path: &[String], _args: Vec<Value>) -> Result<Vec<Value>, CallError> {
///         Ok(vec![Value::from(path.join("."))])
///     }
/// }
///
/// # async fn example() -> Result<(), CallError> {
/// let root = RemoteStub::new(Arc::new(PathEcho));
/// let reply = root.method("tmp_file").method("write").call(vec![]).await?;
/// assert_eq!(reply, vec![Value::from("tmp_file.write")]);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct RemoteStub {
    invoker: Arc<dyn Invoker>,
    path: Vec<String>,
}

impl RemoteStub {
    /// Creates a root stub with an empty path.
    #[must_use]
    pub fn new(invoker: Arc<dyn Invoker>) -> Self {
        Self {
            invoker,
            path: Vec::new(),
        }
    }

    /// Returns a stub whose path is extended by one segment.
    #[must_use]
    pub fn method(&self, segment: impl Into<String>) -> Self {
        let mut path = self.path.clone();
        path.push(segment.into());
        Self {
            invoker: self.invoker.clone(),
            path,
        }
    }

    /// The accumulated method path.
    #[must_use]
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Flushes the accumulated path and the given arguments as one
    /// invocation.
    ///
    /// # Errors
    ///
    /// Propagates the invoker's [`CallError`].
    pub async fn call(&self, args: Vec<Value>) -> Result<Vec<Value>, CallError> {
        self.invoker.invoke(&self.path, args).await
    }
}

/// Serializes an invocation body: segment count, path segments, then
/// arguments, through the standard codec.
#[must_use]
pub fn encode_invocation(path: &[String], args: &[Value]) -> Vec<u8> {
    let mut values = Vec::with_capacity(1 + path.len() + args.len());
    values.push(Value::Int(path.len() as i32));
    values.extend(path.iter().map(|segment| Value::Str(segment.clone())));
    values.extend_from_slice(args);
    wire::encode_values(&values)
}

/// Decodes an invocation body back into its path and arguments.
///
/// # Errors
///
/// Returns a [`DecodeError`] if the body violates the wire contract or the
/// leading values are not a segment count followed by that many strings.
pub fn decode_invocation(payload: &[u8]) -> Result<(Vec<String>, Vec<Value>), DecodeError> {
    let mut values = wire::decode(payload)?.into_iter();
    let count = values
        .next()
        .and_then(|v| v.as_i32())
        .ok_or(DecodeError::UnexpectedShape {
            expected: "path segment count",
        })?;

    let mut path = Vec::with_capacity(count.max(0) as usize);
    for _ in 0..count {
        match values.next() {
            Some(Value::Str(segment)) => path.push(segment),
            _ => {
                return Err(DecodeError::UnexpectedShape {
                    expected: "path segment",
                });
            }
        }
    }
    Ok((path, values.collect()))
}

/// One request envelope crossing the worker boundary.
#[derive(Debug)]
struct WorkerMessage {
    id: CallId,
    payload: Vec<u8>,
}

/// The worker-side service: receives decoded invocations and produces
/// result values.
///
/// Runs inside the worker task; a path that matches nothing should return
/// an empty value list rather than panic, mirroring a host that silently
/// ignores unknown methods.
pub trait WorkerService: Send + 'static {
    /// Executes one invocation.
    fn dispatch(&mut self, path: &[String], args: Vec<Value>) -> Vec<Value>;
}

struct WorkerInner {
    // Taken on dispose; a queued invocation still completes because its
    // sender clone keeps the channel alive until the worker drains it.
    tx: Mutex<Option<mpsc::UnboundedSender<WorkerMessage>>>,
    pending: Arc<PendingCalls<Vec<Value>>>,
}

/// Message channel to an isolated worker, usable as a stub [`Invoker`].
///
/// The channel owns its own pending-call pool (a separate id domain from
/// the main bridge) and a worker task that decodes each invocation, runs
/// the service, and resolves the originating id. Cloning shares the same
/// channel.
///
/// # Example
///
/// ```rust
/// use hostbridge::{RemoteStub, Value, WorkerChannel, WorkerService};
///
/// struct Counter(i32);
///
/// impl WorkerService for Counter {
///     fn dispatch(&mut self, path: &[String], _args: Vec<Value>) -> Vec<Value> {
///         if path == ["increment"] {
///             self.0 += 1;
///         }
///         vec![Value::Int(self.0)]
///     }
/// }
///
/// # async fn example() -> Result<(), hostbridge::CallError> {
/// let channel = WorkerChannel::spawn(Counter(0));
/// let stub = channel.stub();
/// let reply = stub.method("increment").call(vec![]).await?;
/// assert_eq!(reply, vec![Value::Int(1)]);
/// channel.dispose();
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct WorkerChannel {
    inner: Arc<WorkerInner>,
}

impl WorkerChannel {
    /// Spawns a worker task around a service and returns the channel to it.
    #[must_use]
    pub fn spawn<S: WorkerService>(service: S) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<WorkerMessage>();
        let pending: Arc<PendingCalls<Vec<Value>>> = Arc::new(PendingCalls::new());

        let resolver = pending.clone();
        tokio::spawn(async move {
            let mut service = service;
            while let Some(message) = rx.recv().await {
                match decode_invocation(&message.payload) {
                    Ok((path, args)) => {
                        let result = service.dispatch(&path, args);
                        resolver.resolve(message.id, result);
                    }
                    Err(e) => {
                        // Contract violation between stub and worker; the
                        // caller is released rather than left waiting.
                        warn!(error = %e, "malformed worker invocation");
                        resolver.resolve(message.id, Vec::new());
                    }
                }
            }
            debug!("worker channel closed");
            resolver.drain_all();
        });

        Self {
            inner: Arc::new(WorkerInner {
                tx: Mutex::new(Some(tx)),
                pending,
            }),
        }
    }

    /// Returns a root stub over this channel.
    #[must_use]
    pub fn stub(&self) -> RemoteStub {
        RemoteStub::new(Arc::new(self.clone()))
    }

    /// Number of invocations awaiting a worker reply.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.inner.pending.len()
    }

    /// Closes the channel and aborts every outstanding invocation.
    ///
    /// Outstanding callers complete with [`CallError::Aborted`]; later
    /// calls fail with [`CallError::Aborted`] immediately. The worker task
    /// exits once its queue is empty.
    pub fn dispose(&self) {
        drop(self.inner.tx.lock().take());
        self.inner.pending.drain_all();
    }
}

impl Drop for WorkerInner {
    fn drop(&mut self) {
        self.pending.drain_all();
    }
}

#[async_trait::async_trait]
impl Invoker for WorkerChannel {
    async fn invoke(&self, path: &[String], args: Vec<Value>) -> Result<Vec<Value>, CallError> {
        let Some(tx) = self.inner.tx.lock().as_ref().cloned() else {
            return Err(CallError::Aborted);
        };
        let (id, rx) = self.inner.pending.register();
        let message = WorkerMessage {
            id,
            payload: encode_invocation(path, &args),
        };
        if tx.send(message).is_err() {
            self.inner.pending.forget(id);
            return Err(CallError::Aborted);
        }
        match rx.await {
            Ok(Outcome::Completed(values)) => Ok(values),
            Ok(Outcome::Aborted) | Err(_) => Err(CallError::Aborted),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invocation_round_trip() {
        let path = vec!["tmp_file".to_string(), "write".to_string()];
        let args = vec![Value::from("name"), Value::from(vec![1u8, 2])];

        let payload = encode_invocation(&path, &args);
        let (decoded_path, decoded_args) = decode_invocation(&payload).unwrap();
        assert_eq!(decoded_path, path);
        assert_eq!(decoded_args, args);
    }

    #[test]
    fn test_invocation_empty_path() {
        let payload = encode_invocation(&[], &[Value::from(1)]);
        let (path, args) = decode_invocation(&payload).unwrap();
        assert!(path.is_empty());
        assert_eq!(args, vec![Value::from(1)]);
    }

    #[test]
    fn test_decode_invocation_rejects_garbage() {
        // Leading value is not a segment count.
        let payload = wire::encode_values(&[Value::from("not-a-count")]);
        assert!(decode_invocation(&payload).is_err());
        assert!(decode_invocation(&[]).is_err());
    }

    #[test]
    fn test_stub_paths_are_independent() {
        struct Nop;

        #[async_trait::async_trait]
        impl Invoker for Nop {
            async fn invoke(&self, _: &[String], _: Vec<Value>) -> Result<Vec<Value>, CallError> {
                Ok(Vec::new())
            }
        }

        let root = RemoteStub::new(Arc::new(Nop));
        let a = root.method("config");
        let b = a.method("get");
        let c = a.method("save");

        assert_eq!(root.path(), &[] as &[String]);
        assert_eq!(b.path(), ["config", "get"]);
        assert_eq!(c.path(), ["config", "save"]);
    }

    struct RecordingService {
        log: Vec<String>,
    }

    impl WorkerService for RecordingService {
        fn dispatch(&mut self, path: &[String], args: Vec<Value>) -> Vec<Value> {
            self.log.push(path.join("."));
            let mut reply = vec![Value::from(path.join("."))];
            reply.extend(args);
            reply
        }
    }

    #[tokio::test]
    async fn test_worker_round_trip() {
        let channel = WorkerChannel::spawn(RecordingService { log: Vec::new() });
        let stub = channel.stub();

        let reply = stub
            .method("update_file")
            .call(vec![Value::from("main.ts")])
            .await
            .unwrap();
        assert_eq!(reply, vec![Value::from("update_file"), Value::from("main.ts")]);
        assert_eq!(channel.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_worker_concurrent_calls() {
        struct SlowEcho;

        impl WorkerService for SlowEcho {
            fn dispatch(&mut self, _path: &[String], args: Vec<Value>) -> Vec<Value> {
                args
            }
        }

        let channel = WorkerChannel::spawn(SlowEcho);
        let stub = channel.stub();

        let calls: Vec<_> = (0..8)
            .map(|n| {
                let stub = stub.method("echo");
                tokio::spawn(async move { stub.call(vec![Value::Int(n)]).await })
            })
            .collect();

        for (n, call) in calls.into_iter().enumerate() {
            let reply = call.await.unwrap().unwrap();
            assert_eq!(reply, vec![Value::Int(n as i32)]);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_dispose_aborts_callers() {
        struct NeverReplies;

        impl WorkerService for NeverReplies {
            fn dispatch(&mut self, _path: &[String], _args: Vec<Value>) -> Vec<Value> {
                // Stall the worker loop so the invocation stays pending.
                std::thread::sleep(std::time::Duration::from_millis(500));
                Vec::new()
            }
        }

        let channel = WorkerChannel::spawn(NeverReplies);
        let stub = channel.stub();

        let call = {
            let stub = stub.method("start");
            tokio::spawn(async move { stub.call(vec![]).await })
        };

        // Wait for the invocation to register, then tear the worker down.
        while channel.pending_count() == 0 {
            tokio::task::yield_now().await;
        }
        channel.dispose();

        let result = call.await.unwrap();
        assert!(matches!(result, Err(CallError::Aborted)));

        // Later calls fail immediately on the closed channel.
        let result = stub.method("start").call(vec![]).await;
        assert!(matches!(result, Err(CallError::Aborted)));
    }
}

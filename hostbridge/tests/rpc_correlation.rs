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

//! Integration tests for call correlation through the public bridge API.

use hostbridge::wire::{encode_values, Request};
use hostbridge::{
    BridgeBuilder, CallError, CallId, HostHandler, Transport, TransportError, Value,
};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// Stub in-process host: opcode 8 always reports an existing plain file.
struct StatHost;

#[async_trait::async_trait]
impl HostHandler for StatHost {
    async fn handle(&self, payload: Vec<u8>) -> Result<Vec<u8>, TransportError> {
        let request = Request::decode(&payload).map_err(|e| TransportError::HandlerFailed {
            reason: e.to_string(),
        })?;
        assert_eq!(request.opcode, 8);
        Ok(encode_values(&[Value::from(true), Value::from(false)]))
    }
}

#[derive(Debug, PartialEq, Eq)]
struct FileKind {
    is_file: bool,
}

/// `[exists, is_file]` -> `Some(FileKind)` when the entry exists.
fn exists_transformer(values: Vec<Value>) -> Option<FileKind> {
    let mut values = values.into_iter();
    let exists = values.next()?.as_bool()?;
    let is_file = values.next().and_then(|v| v.as_bool())?;
    exists.then_some(FileKind { is_file })
}

#[tokio::test]
async fn simple_call_with_transformer() {
    let bridge = BridgeBuilder::new().in_process(Arc::new(StatHost));

    let result = bridge
        .call_map(8, vec![Value::from("foo.txt")], exists_transformer)
        .await
        .unwrap();

    // exists = true, isFile = false
    assert_eq!(result, Some(FileKind { is_file: false }));
}

#[tokio::test]
async fn transformer_maps_missing_entry_to_none() {
    struct MissingHost;

    #[async_trait::async_trait]
    impl HostHandler for MissingHost {
        async fn handle(&self, _payload: Vec<u8>) -> Result<Vec<u8>, TransportError> {
            Ok(encode_values(&[Value::from(false), Value::from(false)]))
        }
    }

    let bridge = BridgeBuilder::new().in_process(Arc::new(MissingHost));
    let result = bridge
        .call_map(8, vec![Value::from("gone.txt")], exists_transformer)
        .await
        .unwrap();
    assert_eq!(result, None);
}

/// Transport that only records envelopes; responses are delivered by the
/// test through the dispatcher, as a platform callback would.
#[derive(Default)]
struct ManualTransport {
    sent: Mutex<Vec<CallId>>,
}

#[async_trait::async_trait]
impl Transport for ManualTransport {
    fn name(&self) -> &'static str {
        "manual"
    }

    async fn send(&self, id: CallId, _payload: Vec<u8>) -> Result<(), TransportError> {
        self.sent.lock().push(id);
        Ok(())
    }
}

#[tokio::test]
async fn out_of_order_resolution() {
    let transport = Arc::new(ManualTransport::default());
    let bridge = Arc::new({
        let transport = transport.clone();
        BridgeBuilder::new().with_transport(move |_| transport)
    });

    let first = {
        let bridge = bridge.clone();
        tokio::spawn(async move { bridge.call(1, vec![Value::from("first")]).await })
    };
    let second = {
        let bridge = bridge.clone();
        tokio::spawn(async move { bridge.call(1, vec![Value::from("second")]).await })
    };

    // Wait until both calls are in flight.
    while transport.sent.lock().len() < 2 {
        tokio::task::yield_now().await;
    }
    let ids = transport.sent.lock().clone();
    assert_eq!(ids.len(), 2);

    // Resolve in reverse issue order; each future must still receive its
    // own payload.
    let dispatcher = bridge.dispatcher();
    dispatcher.deliver_response(ids[1], &encode_values(&[Value::from("reply-2")]));
    dispatcher.deliver_response(ids[0], &encode_values(&[Value::from("reply-1")]));

    assert_eq!(first.await.unwrap().unwrap(), vec![Value::from("reply-1")]);
    assert_eq!(second.await.unwrap().unwrap(), vec![Value::from("reply-2")]);
}

#[tokio::test]
async fn duplicate_response_is_dropped() {
    let transport = Arc::new(ManualTransport::default());
    let bridge = Arc::new({
        let transport = transport.clone();
        BridgeBuilder::new().with_transport(move |_| transport)
    });

    let call = {
        let bridge = bridge.clone();
        tokio::spawn(async move { bridge.call(5, vec![]).await })
    };
    while transport.sent.lock().is_empty() {
        tokio::task::yield_now().await;
    }
    let id = transport.sent.lock()[0];

    let dispatcher = bridge.dispatcher();
    dispatcher.deliver_response(id, &encode_values(&[Value::from(1)]));
    dispatcher.deliver_response(id, &encode_values(&[Value::from(2)]));

    assert_eq!(call.await.unwrap().unwrap(), vec![Value::from(1)]);
    assert_eq!(bridge.metrics().responses_resolved(), 1);
    assert_eq!(bridge.metrics().late_responses(), 1);
}

#[tokio::test]
async fn drain_completes_every_pending_future() {
    let transport = Arc::new(ManualTransport::default());
    let bridge = Arc::new({
        let transport = transport.clone();
        BridgeBuilder::new().with_transport(move |_| transport)
    });

    let calls: Vec<_> = (0..3)
        .map(|_| {
            let bridge = bridge.clone();
            tokio::spawn(async move { bridge.call(1, vec![]).await })
        })
        .collect();

    while transport.sent.lock().len() < 3 {
        tokio::task::yield_now().await;
    }
    bridge.drain_all();

    for call in calls {
        assert!(matches!(call.await.unwrap(), Err(CallError::Aborted)));
    }
    assert!(bridge.dispatcher().pending().is_empty());
}

#[tokio::test]
async fn ids_are_reused_lowest_first() {
    let transport = Arc::new(ManualTransport::default());
    let bridge = Arc::new({
        let transport = transport.clone();
        BridgeBuilder::new().with_transport(move |_| transport)
    });
    let dispatcher = bridge.dispatcher();

    // Issue four calls; ids 1..=4 are handed out in order.
    let mut calls = Vec::new();
    for _ in 0..4 {
        let bridge = bridge.clone();
        calls.push(tokio::spawn(
            async move { bridge.call(1, vec![]).await },
        ));
        while transport.sent.lock().len() < calls.len() {
            tokio::task::yield_now().await;
        }
    }
    assert_eq!(
        transport.sent.lock().clone(),
        vec![
            CallId::from(1),
            CallId::from(2),
            CallId::from(3),
            CallId::from(4)
        ]
    );

    // Resolve the two lowest, then issue two more: the vacated slots come
    // back before the pool advances past 4.
    dispatcher.deliver_response(CallId::from(1), &encode_values(&[]));
    dispatcher.deliver_response(CallId::from(2), &encode_values(&[]));
    for _ in 0..2 {
        let bridge = bridge.clone();
        calls.push(tokio::spawn(
            async move { bridge.call(1, vec![]).await },
        ));
        while transport.sent.lock().len() < calls.len() {
            tokio::task::yield_now().await;
        }
    }

    let reissued: Vec<_> = transport.sent.lock()[4..].to_vec();
    assert_eq!(reissued, vec![CallId::from(1), CallId::from(2)]);

    bridge.drain_all();
    for call in calls {
        let _ = call.await.unwrap();
    }
}

#[tokio::test]
async fn notification_without_subscriber_is_counted_not_thrown() {
    let bridge = BridgeBuilder::new().in_process(Arc::new(StatHost));
    let dispatcher = bridge.dispatcher();

    dispatcher.deliver_notification("nobody-listens", b"{}");

    assert_eq!(bridge.metrics().notifications_unclaimed(), 1);
    assert_eq!(bridge.metrics().notifications_delivered(), 0);
}

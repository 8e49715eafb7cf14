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

//! Socket transport: a bidirectional connection to a local host peer.
//!
//! Outbound messages are framed; inbound frames are dispatched by a
//! background reader onto either the pending-call registry (frames carrying
//! a call id) or the notification hub (uncorrelated frames).
//!
//! # Frame layout
//!
//! ```text
//! +-----------------+---------------+------------------+
//! | length (u32 LE) | id (u32 LE)   | payload          |
//! +-----------------+---------------+------------------+
//! ```
//!
//! `length` counts the id and payload. An id of 0 marks an unsolicited
//! notification, whose payload is `topic length (u32 LE) ++ topic (UTF-8)
//! ++ notification payload`; any other id correlates a response to an
//! outstanding call.
//!
//! The reader task touches the session only through the [`Dispatcher`], and
//! drains the pending registry when the connection ends, so no caller hangs
//! on a dead peer.

use crate::pending::CallId;
use crate::transport::{Dispatcher, SocketConfig, Transport, TransportError};
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Transport variant over an open TCP connection to a host peer.
pub struct SocketTransport {
    writer: Mutex<OwnedWriteHalf>,
    reader: JoinHandle<()>,
    dispatcher: Dispatcher,
    max_frame_size: u32,
}

impl SocketTransport {
    /// Connects to a host peer, bounded by the configured attempt timeout.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::ConnectTimeout`] when the attempt exceeds
    /// `config.connect_timeout`, or [`TransportError::ConnectionFailed`]
    /// when the peer refuses.
    pub async fn connect(
        addr: &str,
        dispatcher: Dispatcher,
        config: &SocketConfig,
    ) -> Result<Self, TransportError> {
        let stream = match timeout(config.connect_timeout, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(source)) => {
                return Err(TransportError::ConnectionFailed {
                    address: addr.to_string(),
                    source,
                });
            }
            Err(_) => {
                return Err(TransportError::ConnectTimeout {
                    address: addr.to_string(),
                    duration: config.connect_timeout,
                });
            }
        };

        info!(addr, "socket transport connected");
        let (read_half, write_half) = stream.into_split();
        let reader = spawn_reader(read_half, dispatcher.clone(), config.max_frame_size);

        Ok(Self {
            writer: Mutex::new(write_half),
            reader,
            dispatcher,
            max_frame_size: config.max_frame_size,
        })
    }

    /// Tries each candidate address in turn and keeps the first that
    /// connects.
    ///
    /// Each attempt is bounded by the configured timeout; exhausting the
    /// list is the caller's signal to try a different transport entirely.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::AllCandidatesFailed`] when no candidate
    /// accepted the connection.
    pub async fn connect_any<'a>(
        addrs: impl IntoIterator<Item = &'a str>,
        dispatcher: Dispatcher,
        config: &SocketConfig,
    ) -> Result<Self, TransportError> {
        let mut attempted = 0usize;
        for addr in addrs {
            attempted += 1;
            match Self::connect(addr, dispatcher.clone(), config).await {
                Ok(transport) => return Ok(transport),
                Err(e) => debug!(addr, error = %e, "candidate address failed"),
            }
        }
        Err(TransportError::AllCandidatesFailed { attempted })
    }

    /// Closes the connection and aborts every outstanding call.
    pub async fn shutdown(&self) {
        self.reader.abort();
        let mut writer = self.writer.lock().await;
        let _ = writer.shutdown().await;
        self.dispatcher.drain();
    }
}

impl Drop for SocketTransport {
    fn drop(&mut self) {
        self.reader.abort();
        // Idempotent if the reader already drained on its way out.
        self.dispatcher.drain();
    }
}

#[async_trait::async_trait]
impl Transport for SocketTransport {
    fn name(&self) -> &'static str {
        "socket"
    }

    async fn send(&self, id: CallId, payload: Vec<u8>) -> Result<(), TransportError> {
        let frame = encode_frame(id, &payload, self.max_frame_size)?;
        let mut writer = self.writer.lock().await;
        writer
            .write_all(&frame)
            .await
            .map_err(|source| TransportError::SendFailed { source })?;
        writer
            .flush()
            .await
            .map_err(|source| TransportError::SendFailed { source })?;
        Ok(())
    }
}

fn spawn_reader(
    mut read_half: OwnedReadHalf,
    dispatcher: Dispatcher,
    max_frame_size: u32,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match read_frame(&mut read_half, max_frame_size).await {
                Ok(Some((0, payload))) => match split_notification(&payload) {
                    Some((topic, body)) => dispatcher.deliver_notification(topic, body),
                    None => {
                        warn!("dropping malformed notification frame");
                        dispatcher.metrics().record_decode_failure();
                    }
                },
                Ok(Some((id, payload))) => {
                    dispatcher.deliver_response(CallId::from(id), &payload);
                }
                Ok(None) => {
                    debug!("host peer closed the connection");
                    break;
                }
                Err(e) => {
                    warn!(error = %e, "socket reader failed");
                    break;
                }
            }
        }
        dispatcher.drain();
    })
}

fn encode_frame(id: CallId, payload: &[u8], max: u32) -> Result<Vec<u8>, TransportError> {
    let body_len = payload.len() + 4;
    if body_len > max as usize {
        return Err(TransportError::FrameTooLarge {
            size: body_len,
            max,
        });
    }
    let mut frame = Vec::with_capacity(4 + body_len);
    frame.extend_from_slice(&(body_len as u32).to_le_bytes());
    frame.extend_from_slice(&id.as_u32().to_le_bytes());
    frame.extend_from_slice(payload);
    Ok(frame)
}

async fn read_frame<R>(reader: &mut R, max: u32) -> io::Result<Option<(u32, Vec<u8>)>>
where
    R: AsyncRead + Unpin,
{
    let mut len_buf = [0u8; 4];
    match reader.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e),
    }

    let len = u32::from_le_bytes(len_buf);
    if len < 4 || len > max {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("frame length {} outside 4..={}", len, max),
        ));
    }

    let mut body = vec![0u8; len as usize];
    reader.read_exact(&mut body).await?;

    let mut id_buf = [0u8; 4];
    id_buf.copy_from_slice(&body[..4]);
    body.drain(..4);
    Ok(Some((u32::from_le_bytes(id_buf), body)))
}

fn split_notification(payload: &[u8]) -> Option<(&str, &[u8])> {
    let len_bytes: [u8; 4] = payload.get(..4)?.try_into().ok()?;
    let topic_len = u32::from_le_bytes(len_bytes) as usize;
    let topic = payload.get(4..4 + topic_len)?;
    let body = &payload[4 + topic_len..];
    Some((std::str::from_utf8(topic).ok()?, body))
}

/// Builds a notification frame body: topic length, topic, payload.
///
/// Host-side helper for peers that push unsolicited messages; the matching
/// outer frame carries id 0.
#[must_use]
pub fn encode_notification(topic: &str, payload: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(4 + topic.len() + payload.len());
    body.extend_from_slice(&(topic.len() as u32).to_le_bytes());
    body.extend_from_slice(topic.as_bytes());
    body.extend_from_slice(payload);
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_frame_layout() {
        let frame = encode_frame(CallId::from(2), &[7, 8], 1024).unwrap();
        assert_eq!(
            frame,
            vec![
                6, 0, 0, 0, // length = id + payload
                2, 0, 0, 0, // call id
                7, 8, // payload
            ]
        );
    }

    #[test]
    fn test_encode_frame_too_large() {
        let payload = vec![0u8; 32];
        assert!(matches!(
            encode_frame(CallId::from(1), &payload, 16),
            Err(TransportError::FrameTooLarge { size: 36, max: 16 })
        ));
    }

    #[tokio::test]
    async fn test_read_frame_round_trip() {
        let frame = encode_frame(CallId::from(5), &[1, 2, 3], 1024).unwrap();
        let mut reader = &frame[..];

        let (id, payload) = read_frame(&mut reader, 1024).await.unwrap().unwrap();
        assert_eq!(id, 5);
        assert_eq!(payload, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_read_frame_eof_between_frames() {
        let mut reader: &[u8] = &[];
        assert_eq!(read_frame(&mut reader, 1024).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_read_frame_rejects_oversize() {
        let mut frame = Vec::new();
        frame.extend_from_slice(&100u32.to_le_bytes());
        let mut reader = &frame[..];
        assert!(read_frame(&mut reader, 16).await.is_err());
    }

    #[test]
    fn test_notification_body_round_trip() {
        let body = encode_notification("file-event", b"{\"paths\":[]}");
        let (topic, payload) = split_notification(&body).unwrap();
        assert_eq!(topic, "file-event");
        assert_eq!(payload, b"{\"paths\":[]}");
    }

    #[test]
    fn test_split_notification_truncated() {
        assert!(split_notification(&[1, 0]).is_none());
        let mut body = Vec::new();
        body.extend_from_slice(&10u32.to_le_bytes());
        body.extend_from_slice(b"abc");
        assert!(split_notification(&body).is_none());
    }
}

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

//! Encoding and decoding of bridge payloads.

use super::{DecodeError, Value};

// Type tag bytes. 0 is "undefined" on hosts with an open value set and is
// not part of this closed set; decoding it is a contract violation.
const TAG_BOOL: u8 = 1;
const TAG_STRING: u8 = 2;
const TAG_INT: u8 = 3;
const TAG_BYTES: u8 = 4;

/// A logical request before encoding: an opcode plus its typed arguments.
///
/// The opcode space is owned by whichever module issues calls; the codec
/// treats it as an opaque routing byte.
///
/// # Example
///
/// ```rust
/// use hostbridge::wire::{Request, Value};
///
/// let request = Request::new(8, vec![Value::from("foo.txt")]);
/// let payload = request.encode();
/// let decoded = Request::decode(&payload).unwrap();
/// assert_eq!(decoded.opcode, 8);
/// assert_eq!(decoded.args, vec![Value::from("foo.txt")]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Operation code, opaque to the bridge core.
    pub opcode: u8,
    /// Ordered, typed argument list.
    pub args: Vec<Value>,
}

impl Request {
    /// Creates a request from an opcode and argument list.
    #[must_use]
    pub fn new(opcode: u8, args: Vec<Value>) -> Self {
        Self { opcode, args }
    }

    /// Encodes the request into a single contiguous payload.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        encode(self.opcode, &self.args)
    }

    /// Decodes a request payload: opcode byte followed by arguments.
    ///
    /// Used by host-side handlers; the UI side never decodes requests.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::EmptyRequest`] for an empty buffer, or any
    /// argument-level decode error.
    pub fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let (&opcode, args) = payload.split_first().ok_or(DecodeError::EmptyRequest)?;
        Ok(Self {
            opcode,
            args: decode_at(args, 1)?,
        })
    }
}

/// Encodes an opcode and argument list into a request payload.
///
/// Encoding is deterministic and total for the four supported argument
/// types.
///
/// # Example
///
/// ```rust
/// use hostbridge::wire::{encode, Value};
///
/// let payload = encode(8, &[Value::from(true)]);
/// assert_eq!(payload, vec![8, 1, 1]); // opcode, bool tag, true
/// ```
#[must_use]
pub fn encode(opcode: u8, args: &[Value]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(1 + encoded_len(args));
    buf.push(opcode);
    encode_into(&mut buf, args);
    buf
}

/// Encodes an argument list without an opcode byte.
///
/// This is the shape of response payloads and of worker invocation bodies,
/// where the receiver does not route by opcode.
#[must_use]
pub fn encode_values(args: &[Value]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(encoded_len(args));
    encode_into(&mut buf, args);
    buf
}

/// Decodes an argument list from a payload that carries no opcode byte.
///
/// Total over any buffer produced by [`encode_values`] (and over the
/// argument region of [`encode`] output). For arbitrary buffers it reports
/// the first framing violation found.
///
/// # Errors
///
/// Returns a [`DecodeError`] describing the first malformed argument.
///
/// # Example
///
/// ```rust
/// use hostbridge::wire::{decode, encode_values, Value};
///
/// let args = vec![Value::from("x"), Value::from(-1), Value::from(vec![9u8])];
/// assert_eq!(decode(&encode_values(&args)).unwrap(), args);
/// ```
pub fn decode(payload: &[u8]) -> Result<Vec<Value>, DecodeError> {
    decode_at(payload, 0)
}

fn encoded_len(args: &[Value]) -> usize {
    args.iter()
        .map(|arg| match arg {
            Value::Bool(_) => 2,
            Value::Int(_) => 5,
            Value::Str(s) => 5 + s.len(),
            Value::Bytes(b) => 5 + b.len(),
        })
        .sum()
}

fn encode_into(buf: &mut Vec<u8>, args: &[Value]) {
    for arg in args {
        match arg {
            Value::Bool(b) => {
                buf.push(TAG_BOOL);
                buf.push(u8::from(*b));
            }
            Value::Str(s) => {
                buf.push(TAG_STRING);
                buf.extend_from_slice(&(s.len() as u32).to_le_bytes());
                buf.extend_from_slice(s.as_bytes());
            }
            Value::Int(n) => {
                buf.push(TAG_INT);
                buf.extend_from_slice(&n.to_le_bytes());
            }
            Value::Bytes(b) => {
                buf.push(TAG_BYTES);
                buf.extend_from_slice(&(b.len() as u32).to_le_bytes());
                buf.extend_from_slice(b);
            }
        }
    }
}

// `base` only offsets the positions reported in errors, so that
// request-level diagnostics point into the full payload.
fn decode_at(payload: &[u8], base: usize) -> Result<Vec<Value>, DecodeError> {
    let mut args = Vec::new();
    let mut cursor = 0usize;

    while cursor < payload.len() {
        let tag = payload[cursor];
        cursor += 1;

        match tag {
            TAG_BOOL => {
                let byte = *payload.get(cursor).ok_or(DecodeError::Truncated {
                    offset: base + cursor,
                    needed: 1,
                })?;
                cursor += 1;
                match byte {
                    0 => args.push(Value::Bool(false)),
                    1 => args.push(Value::Bool(true)),
                    byte => {
                        return Err(DecodeError::InvalidBool {
                            byte,
                            offset: base + cursor - 1,
                        });
                    }
                }
            }
            TAG_INT => {
                let body = take(payload, cursor, 4, base)?;
                // take() guarantees exactly four bytes here
                let mut raw = [0u8; 4];
                raw.copy_from_slice(body);
                args.push(Value::Int(i32::from_le_bytes(raw)));
                cursor += 4;
            }
            TAG_STRING => {
                let len = read_len(payload, cursor, base)?;
                cursor += 4;
                let body = take(payload, cursor, len, base)?;
                let text = std::str::from_utf8(body)
                    .map_err(|_| DecodeError::InvalidUtf8 { offset: base + cursor })?;
                args.push(Value::Str(text.to_string()));
                cursor += len;
            }
            TAG_BYTES => {
                let len = read_len(payload, cursor, base)?;
                cursor += 4;
                let body = take(payload, cursor, len, base)?;
                args.push(Value::Bytes(body.to_vec()));
                cursor += len;
            }
            tag => {
                return Err(DecodeError::UnknownTag {
                    tag,
                    offset: base + cursor - 1,
                });
            }
        }
    }

    Ok(args)
}

fn read_len(payload: &[u8], cursor: usize, base: usize) -> Result<usize, DecodeError> {
    let body = take(payload, cursor, 4, base)?;
    let mut raw = [0u8; 4];
    raw.copy_from_slice(body);
    Ok(u32::from_le_bytes(raw) as usize)
}

fn take<'a>(
    payload: &'a [u8],
    cursor: usize,
    len: usize,
    base: usize,
) -> Result<&'a [u8], DecodeError> {
    payload
        .get(cursor..cursor + len)
        .ok_or_else(|| DecodeError::Truncated {
            offset: base + payload.len(),
            needed: cursor + len - payload.len(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(args: Vec<Value>) {
        let encoded = encode_values(&args);
        assert_eq!(decode(&encoded).unwrap(), args);
    }

    #[test]
    fn test_round_trip_each_type() {
        round_trip(vec![Value::from("hello")]);
        round_trip(vec![Value::from("")]);
        round_trip(vec![Value::from(0)]);
        round_trip(vec![Value::from(i32::MIN)]);
        round_trip(vec![Value::from(i32::MAX)]);
        round_trip(vec![Value::from(true)]);
        round_trip(vec![Value::from(false)]);
        round_trip(vec![Value::from(Vec::<u8>::new())]);
        round_trip(vec![Value::from(vec![0u8, 255, 128])]);
    }

    #[test]
    fn test_round_trip_mixed() {
        round_trip(vec![
            Value::from("path/to/file"),
            Value::from(true),
            Value::from(-42),
            Value::from(vec![1u8, 2, 3]),
            Value::from(false),
            Value::from("trailer"),
        ]);
    }

    #[test]
    fn test_round_trip_empty() {
        round_trip(vec![]);
    }

    #[test]
    fn test_request_round_trip() {
        let request = Request::new(56, vec![Value::from("project"), Value::from(3)]);
        let decoded = Request::decode(&request.encode()).unwrap();
        assert_eq!(decoded, request);
    }

    #[test]
    fn test_request_with_no_args() {
        // Opcode 55 in the original host is argument-free (tool version query)
        let request = Request::new(55, vec![]);
        let payload = request.encode();
        assert_eq!(payload, vec![55]);
        assert_eq!(Request::decode(&payload).unwrap(), request);
    }

    #[test]
    fn test_encode_layout() {
        let payload = encode(8, &[Value::from("ab"), Value::from(7)]);
        assert_eq!(
            payload,
            vec![
                8, // opcode
                2, 2, 0, 0, 0, b'a', b'b', // string tag, LE length, bytes
                3, 7, 0, 0, 0, // int tag, LE value
            ]
        );
    }

    #[test]
    fn test_decode_empty_request() {
        assert_eq!(Request::decode(&[]), Err(DecodeError::EmptyRequest));
    }

    #[test]
    fn test_decode_unknown_tag() {
        assert_eq!(
            decode(&[9, 0]),
            Err(DecodeError::UnknownTag { tag: 9, offset: 0 })
        );
    }

    #[test]
    fn test_decode_undefined_tag_rejected() {
        // Tag 0 exists on hosts with an open value set but not in this
        // closed one.
        assert!(matches!(
            decode(&[0]),
            Err(DecodeError::UnknownTag { tag: 0, .. })
        ));
    }

    #[test]
    fn test_decode_truncated_string() {
        let mut payload = encode_values(&[Value::from("hello")]);
        payload.truncate(payload.len() - 2);
        assert!(matches!(decode(&payload), Err(DecodeError::Truncated { .. })));
    }

    #[test]
    fn test_decode_truncated_length_prefix() {
        assert!(matches!(
            decode(&[TAG_BYTES, 1, 0]),
            Err(DecodeError::Truncated { .. })
        ));
    }

    #[test]
    fn test_decode_invalid_bool() {
        assert!(matches!(
            decode(&[TAG_BOOL, 2]),
            Err(DecodeError::InvalidBool { byte: 2, .. })
        ));
    }

    #[test]
    fn test_decode_invalid_utf8() {
        let payload = vec![TAG_STRING, 2, 0, 0, 0, 0xff, 0xfe];
        assert!(matches!(decode(&payload), Err(DecodeError::InvalidUtf8 { .. })));
    }
}

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

//! Wire codec error types.

use thiserror::Error;

/// Errors produced when decoding a wire payload.
///
/// The codec trusts its own framing invariant: both ends of a transport are
/// paired at build time, so a decode failure is a disagreement in the opcode
/// table between the two sides: a bug, not a condition to recover from.
/// These errors exist so the receive path can report the violation without
/// panicking.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The payload ended before the current argument was complete.
    #[error("payload truncated at offset {offset}: needed {needed} more bytes")]
    Truncated {
        /// Offset at which the decoder ran out of bytes.
        offset: usize,
        /// How many additional bytes the current argument required.
        needed: usize,
    },

    /// An argument carried a type tag outside the supported set.
    #[error("unknown type tag {tag} at offset {offset}")]
    UnknownTag {
        /// The unrecognized tag byte.
        tag: u8,
        /// Offset of the tag byte.
        offset: usize,
    },

    /// A string argument was not valid UTF-8.
    #[error("string argument at offset {offset} is not valid UTF-8")]
    InvalidUtf8 {
        /// Offset of the string body.
        offset: usize,
    },

    /// A boolean argument carried a byte other than 0 or 1.
    #[error("invalid boolean byte {byte} at offset {offset}")]
    InvalidBool {
        /// The offending byte.
        byte: u8,
        /// Offset of the boolean body.
        offset: usize,
    },

    /// A request payload was empty and carried no opcode byte.
    #[error("request payload is empty")]
    EmptyRequest,

    /// A payload decoded cleanly but its leading values did not match the
    /// expected header shape.
    #[error("expected {expected} in payload header")]
    UnexpectedShape {
        /// What the decoder was looking for.
        expected: &'static str,
    },
}

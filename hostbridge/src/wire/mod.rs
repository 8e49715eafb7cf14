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

//! Self-delimiting wire codec for bridge payloads.
//!
//! A request payload is an opcode byte followed by zero or more arguments,
//! each encoded as a type tag byte plus a type-specific body:
//!
//! ```text
//! +--------+-----+------------------+-----+------------------+
//! | opcode | tag | argument body    | tag | argument body    | ...
//! +--------+-----+------------------+-----+------------------+
//! ```
//!
//! - **Booleans**: one byte, `0` or `1`
//! - **Integers**: 4-byte little-endian two's complement (`i32`)
//! - **Strings / byte buffers**: 4-byte little-endian length, then raw bytes
//!
//! The encoding is self-delimiting: a decoder walks the buffer without any
//! external length table. Response payloads carry only the argument list (the
//! caller already knows which call it issued), so [`decode`] never expects an
//! opcode byte.
//!
//! Both ends of a transport are paired at build time; a buffer that fails to
//! decode indicates a disagreement between the two sides, not a runtime
//! condition to recover from. [`DecodeError`] exists to report such contract
//! violations, never to drive retry logic.

mod codec;
mod error;
mod value;

pub use codec::{decode, encode, encode_values, Request};
pub use error::DecodeError;
pub use value::Value;

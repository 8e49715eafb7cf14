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

//! The public call surface of the bridge.
//!
//! [`Bridge`] frames a logical request, correlates it, hands it to the
//! session's transport, and completes the caller's future when the response
//! arrives. [`BridgeBuilder`] wires a session together: one pending-call
//! registry, one notification hub, one metrics tracker, and the one
//! transport selected for the platform.

mod bridge;
mod builder;
mod error;

pub use bridge::Bridge;
pub use builder::BridgeBuilder;
pub use error::CallError;

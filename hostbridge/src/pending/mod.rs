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

//! Tracking of in-flight calls awaiting host responses.
//!
//! Each logical call domain (generic bridge calls, worker-stub invocations,
//! long-running job trackers) owns its own [`PendingCalls`] registry.
//! Ids are unique only within their owning registry and only while the call
//! is outstanding; there is no shared pool for unrelated call types to
//! collide in.

mod id;
mod registry;

pub use id::CallId;
pub use registry::{Outcome, PendingCalls};

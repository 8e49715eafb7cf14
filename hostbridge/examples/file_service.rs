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

//! # File Service Example
//!
//! A typed file-service client over the bridge, the way an editor module
//! wraps its slice of the opcode table. It shows:
//!
//! - Defining opcodes on the calling side (the bridge core owns none)
//! - Result transformers: shaping raw value lists into typed results
//! - An in-process host standing in for the privileged side
//! - A host-initiated notification ("file-event") reaching a subscriber
//!
//! ## Running This Example
//!
//! ```bash
//! cargo run --example file_service
//! ```

use hostbridge::wire::{encode_values, Request};
use hostbridge::{Bridge, BridgeBuilder, CallError, HostHandler, TransportError, Value};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::error::Error;
use std::sync::Arc;

// The file-service slice of the opcode table, owned by this module.
const OP_READ_FILE: u8 = 2;
const OP_WRITE_FILE: u8 = 3;
const OP_READDIR: u8 = 5;
const OP_EXISTS: u8 = 8;

/// In-memory privileged host: a path-to-contents map behind the boundary.
#[derive(Default)]
struct FileHost {
    files: Mutex<HashMap<String, Vec<u8>>>,
}

#[async_trait::async_trait]
impl HostHandler for FileHost {
    async fn handle(&self, payload: Vec<u8>) -> Result<Vec<u8>, TransportError> {
        let request = Request::decode(&payload).map_err(|e| TransportError::HandlerFailed {
            reason: e.to_string(),
        })?;
        let path = request
            .args
            .first()
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        let response = match request.opcode {
            OP_READ_FILE => match self.files.lock().get(&path) {
                Some(contents) => vec![Value::Bytes(contents.clone())],
                None => Vec::new(),
            },
            OP_WRITE_FILE => {
                let contents = request
                    .args
                    .get(1)
                    .and_then(|v| v.as_bytes())
                    .unwrap_or_default()
                    .to_vec();
                self.files.lock().insert(path, contents);
                vec![Value::Bool(true)]
            }
            OP_READDIR => {
                // Entries come back as a flat name/isDirectory pair list.
                let mut entries = Vec::new();
                for name in self.files.lock().keys() {
                    entries.push(Value::from(name.clone()));
                    entries.push(Value::Bool(false));
                }
                entries
            }
            OP_EXISTS => {
                let exists = self.files.lock().contains_key(&path);
                // exists, isFile; this host has no directories
                vec![Value::Bool(exists), Value::Bool(exists)]
            }
            _ => Vec::new(),
        };
        Ok(encode_values(&response))
    }
}

/// Typed client over the file-service opcodes.
struct FileService {
    bridge: Arc<Bridge>,
}

#[derive(Debug)]
struct FileKind {
    is_file: bool,
}

#[derive(Debug)]
struct Dirent {
    name: String,
    is_directory: bool,
}

impl FileService {
    async fn read_file(&self, path: &str) -> Result<Option<Vec<u8>>, CallError> {
        self.bridge
            .call_map(OP_READ_FILE, vec![Value::from(path)], |values| {
                values.into_iter().next().and_then(|v| match v {
                    Value::Bytes(contents) => Some(contents),
                    _ => None,
                })
            })
            .await
    }

    async fn write_file(&self, path: &str, contents: &[u8]) -> Result<bool, CallError> {
        let args = vec![Value::from(path), Value::from(contents.to_vec())];
        self.bridge
            .call_map(OP_WRITE_FILE, args, |values| {
                values.first().and_then(Value::as_bool).unwrap_or(false)
            })
            .await
    }

    async fn readdir(&self, path: &str) -> Result<Vec<Dirent>, CallError> {
        // Fold the flat name/isDirectory pair list into typed entries.
        self.bridge
            .call_map(OP_READDIR, vec![Value::from(path)], |values| {
                values
                    .chunks(2)
                    .filter_map(|pair| match pair {
                        [Value::Str(name), Value::Bool(is_directory)] => Some(Dirent {
                            name: name.clone(),
                            is_directory: *is_directory,
                        }),
                        _ => None,
                    })
                    .collect()
            })
            .await
    }

    async fn exists(&self, path: &str) -> Result<Option<FileKind>, CallError> {
        self.bridge
            .call_map(OP_EXISTS, vec![Value::from(path)], |values| {
                let mut values = values.into_iter();
                let exists = values.next()?.as_bool()?;
                let is_file = values.next().and_then(|v| v.as_bool())?;
                exists.then_some(FileKind { is_file })
            })
            .await
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let bridge = Arc::new(BridgeBuilder::new().in_process(Arc::new(FileHost::default())));

    // Host-initiated events land on the hub; modules subscribe by topic.
    bridge.hub().subscribe("file-event", |payload| {
        println!("file-event: {}", String::from_utf8_lossy(payload));
    });

    let fs = FileService {
        bridge: bridge.clone(),
    };

    println!("exists before write: {:?}", fs.exists("notes.txt").await?);

    fs.write_file("notes.txt", b"remember the milk").await?;
    println!("exists after write:  {:?}", fs.exists("notes.txt").await?);

    let contents = fs.read_file("notes.txt").await?.unwrap_or_default();
    println!("contents: {}", String::from_utf8_lossy(&contents));

    fs.write_file("todo.txt", b"ship it").await?;
    println!("directory listing: {:?}", fs.readdir("").await?);

    // A real host pushes these after filesystem changes; simulate one
    // delivery through the same dispatcher a transport would use.
    bridge
        .dispatcher()
        .deliver_notification("file-event", br#"[{"type":"modified","paths":["notes.txt"]}]"#);

    println!("calls issued: {}", bridge.metrics().calls_sent());
    Ok(())
}

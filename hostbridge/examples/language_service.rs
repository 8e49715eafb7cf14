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

//! # Language Service Example
//!
//! A worker-isolated language service behind a remote stub. The heavy
//! analysis state lives in its own worker; the caller holds a thin typed
//! wrapper whose every method is one stub path, and every leaf call is
//! exactly one message across the worker boundary.
//!
//! ## Running This Example
//!
//! ```bash
//! cargo run --example language_service
//! ```

use hostbridge::{CallError, RemoteStub, Value, WorkerChannel, WorkerService};
use std::collections::HashMap;
use std::error::Error;

/// The worker side: file versions and a toy diagnostics pass.
#[derive(Default)]
struct AnalysisWorker {
    files: HashMap<String, String>,
}

impl WorkerService for AnalysisWorker {
    fn dispatch(&mut self, path: &[String], args: Vec<Value>) -> Vec<Value> {
        let segments: Vec<&str> = path.iter().map(String::as_str).collect();
        match segments.as_slice() {
            ["version"] => vec![Value::from("1.0.0")],
            ["update_file"] => {
                let mut args = args.into_iter();
                if let (Some(Value::Str(name)), Some(Value::Str(contents))) =
                    (args.next(), args.next())
                {
                    self.files.insert(name, contents);
                }
                Vec::new()
            }
            ["diagnostics", "count"] => {
                let todos = args
                    .first()
                    .and_then(|v| v.as_str())
                    .and_then(|name| self.files.get(name))
                    .map_or(0, |contents| contents.matches("TODO").count());
                vec![Value::Int(todos as i32)]
            }
            _ => Vec::new(),
        }
    }
}

/// The caller side: one struct per remote service, one path per method.
struct LanguageService {
    root: RemoteStub,
}

impl LanguageService {
    fn new(channel: &WorkerChannel) -> Self {
        Self {
            root: channel.stub(),
        }
    }

    async fn version(&self) -> Result<String, CallError> {
        let values = self.root.method("version").call(vec![]).await?;
        Ok(values
            .first()
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string())
    }

    async fn update_file(&self, name: &str, contents: &str) -> Result<(), CallError> {
        self.root
            .method("update_file")
            .call(vec![Value::from(name), Value::from(contents)])
            .await?;
        Ok(())
    }

    async fn diagnostic_count(&self, name: &str) -> Result<i32, CallError> {
        let values = self
            .root
            .method("diagnostics")
            .method("count")
            .call(vec![Value::from(name)])
            .await?;
        Ok(values.first().and_then(Value::as_i32).unwrap_or(0))
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

    let channel = WorkerChannel::spawn(AnalysisWorker::default());
    let service = LanguageService::new(&channel);

    println!("worker version: {}", service.version().await?);

    service
        .update_file("main.ts", "// TODO parse args\nexport {} // TODO tests")
        .await?;
    println!(
        "diagnostics in main.ts: {}",
        service.diagnostic_count("main.ts").await?
    );

    // Tear the worker down; in-flight callers would observe Aborted.
    channel.dispose();
    match service.version().await {
        Err(CallError::Aborted) => println!("worker disposed, calls abort"),
        other => println!("unexpected: {:?}", other.map(|_| ())),
    }
    Ok(())
}

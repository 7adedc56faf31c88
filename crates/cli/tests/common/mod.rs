// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test utilities for CLI integration tests.

#![allow(dead_code)]

use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread;
use tempfile::TempDir;

pub const TOKEN_ENV: &str = "MW_TEST_TOKEN";

/// Canned reply for one request
pub struct Reply {
    pub status: u16,
    pub body: String,
    pub delay: std::time::Duration,
}

impl Reply {
    pub fn ok(body: &str) -> Self {
        Self {
            status: 200,
            body: body.to_string(),
            delay: std::time::Duration::ZERO,
        }
    }

    pub fn status(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            delay: std::time::Duration::ZERO,
        }
    }

    pub fn after(mut self, delay: std::time::Duration) -> Self {
        self.delay = delay;
        self
    }
}

type Route = dyn Fn(&str) -> Reply + Send + Sync;

/// Minimal HTTP/1.1 server standing in for the machines API.
///
/// Each connection is served on its own thread so slow replies don't block
/// others. `route` receives the request target (path plus query).
pub struct FakeApi {
    pub base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl FakeApi {
    pub fn start(route: impl Fn(&str) -> Reply + Send + Sync + 'static) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind fake api");
        let addr = listener.local_addr().expect("fake api address");
        let route: Arc<Route> = Arc::new(route);
        let requests = Arc::new(Mutex::new(Vec::new()));

        let seen = Arc::clone(&requests);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let route = Arc::clone(&route);
                let seen = Arc::clone(&seen);
                thread::spawn(move || serve(stream, &*route, &seen));
            }
        });

        Self {
            base_url: format!("http://{}", addr),
            requests,
        }
    }

    /// Request targets seen so far
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

fn serve(stream: TcpStream, route: &Route, seen: &Mutex<Vec<String>>) {
    let mut reader = BufReader::new(&stream);
    let mut request_line = String::new();
    if reader.read_line(&mut request_line).is_err() {
        return;
    }
    // Drain headers
    let mut line = String::new();
    while reader.read_line(&mut line).map(|n| n > 2).unwrap_or(false) {
        line.clear();
    }

    let target = request_line
        .split_whitespace()
        .nth(1)
        .unwrap_or_default()
        .to_string();
    seen.lock().unwrap().push(target.clone());

    let reply = route(&target);
    thread::sleep(reply.delay);
    let response = format!(
        "HTTP/1.1 {} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        reply.status,
        reply.body.len(),
        reply.body
    );
    let mut stream = stream;
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

/// Temp config dir with a config pointing at `base_url`
pub struct TestEnv {
    pub dir: TempDir,
    pub config: PathBuf,
}

impl TestEnv {
    pub fn new(base_url: &str) -> Self {
        Self::with_config(&format!(
            r#"
timeout = "10s"

[backoff]
min = "50ms"
max = "100ms"

[api]
base_url = "{}"
token_env = "{}"
"#,
            base_url, TOKEN_ENV
        ))
    }

    pub fn with_config(content: &str) -> Self {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let config = dir.path().join("config.toml");
        fs::write(&config, content).expect("Failed to write config");
        Self { dir, config }
    }

    /// `mw` isolated from the user's config dir and token
    pub fn mw(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::Command::cargo_bin("mw").expect("mw binary");
        cmd.env("XDG_CONFIG_HOME", self.dir.path())
            .env("HOME", self.dir.path())
            .env_remove("RUST_LOG")
            .env_remove("MW_API_TOKEN")
            .env_remove(TOKEN_ENV);
        cmd
    }
}

pub const MACHINE_BODY: &str = r#"{
    "id": "148ed193b95089",
    "instance_id": "01HQ",
    "state": "starting",
    "config": { "restart": { "policy": "always" } }
}"#;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Machines API status adapter

use super::StatusAdapter;
use async_trait::async_trait;
use mw_core::{Machine, QueryError, TargetState};
use serde::Deserialize;
use std::time::Duration;
use ureq::Agent;

/// Longest server-side wait the API accepts per request
pub const MAX_WAIT: Duration = Duration::from_secs(60);

/// Extra client-side time on top of the server-side wait
const CLIENT_GRACE: Duration = Duration::from_secs(5);

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Status adapter backed by the machines HTTP API.
///
/// Requests are blocking and run on tokio's blocking pool. Dropping the
/// future abandons the request; the client timeout bounds how long the
/// blocking thread lingers afterwards.
#[derive(Clone)]
pub struct MachinesApiAdapter {
    agent: Agent,
    base_url: String,
    token: String,
}

impl MachinesApiAdapter {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        let config = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(MAX_WAIT + CLIENT_GRACE))
            .build();

        Self {
            agent: config.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    fn machine_url(&self, app: &str, id: &str) -> String {
        format!("{}/v1/apps/{}/machines/{}", self.base_url, app, id)
    }

    /// Fetch a machine handle, including its restart policy
    pub async fn get_machine(&self, app: &str, id: &str) -> Result<Machine, QueryError> {
        let this = self.clone();
        let url = self.machine_url(app, id);
        let app = app.to_string();

        run_blocking(move || {
            let body = this.get(&url, &[], Duration::from_secs(30))?;
            let mut machine: Machine = serde_json::from_str(&body).map_err(|e| {
                QueryError::Transient(format!("invalid machine response: {}", e))
            })?;
            machine.app = app;
            Ok(machine)
        })
        .await
    }

    /// Blocking GET returning the body of a 2xx response
    fn get(
        &self,
        url: &str,
        query: &[(&str, String)],
        timeout: Duration,
    ) -> Result<String, QueryError> {
        let mut request = self
            .agent
            .get(url)
            .header("Authorization", format!("Bearer {}", self.token))
            .config()
            .timeout_global(Some(timeout))
            .build();
        for (key, value) in query {
            request = request.query(*key, value);
        }

        let mut response = request.call().map_err(classify_transport)?;
        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(classify_transport)?;

        if (200..300).contains(&status) {
            Ok(body)
        } else {
            Err(classify_status(status, &body))
        }
    }
}

#[async_trait]
impl StatusAdapter for MachinesApiAdapter {
    async fn wait(
        &self,
        machine: &Machine,
        state: &TargetState,
        timeout: Duration,
    ) -> Result<(), QueryError> {
        let wait = timeout.clamp(Duration::from_secs(1), MAX_WAIT);

        let mut query = vec![
            ("state", state.to_string()),
            ("timeout", wait.as_secs().to_string()),
        ];
        if let Some(instance_id) = &machine.instance_id {
            query.push(("instance_id", instance_id.clone()));
        }

        let this = self.clone();
        let url = format!("{}/wait", self.machine_url(&machine.app, &machine.id.0));

        run_blocking(move || this.get(&url, &query, wait + CLIENT_GRACE).map(|_| ())).await
    }
}

async fn run_blocking<T, F>(f: F) -> Result<T, QueryError>
where
    F: FnOnce() -> Result<T, QueryError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| QueryError::Transient(format!("status query task failed: {}", e)))?
}

fn classify_transport(err: ureq::Error) -> QueryError {
    match err {
        ureq::Error::Timeout(_) => QueryError::DeadlineExceeded,
        other => QueryError::Transient(other.to_string()),
    }
}

/// Map a non-2xx response to a query error
pub(crate) fn classify_status(status: u16, body: &str) -> QueryError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error)
        .unwrap_or_else(|_| body.trim().to_string());

    match status {
        400 => QueryError::BadRequest { status, message },
        408 => QueryError::DeadlineExceeded,
        _ => {
            let message = if message.is_empty() {
                format!("unexpected status {}", status)
            } else {
                message
            };
            QueryError::from_message(message)
        }
    }
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;

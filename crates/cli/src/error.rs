// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rendering `mw` failures for the terminal.
//!
//! Wait errors from the engine, config and token problems, and machine lookup
//! failures all end up here. Each renders as an `error:` line, then `->`
//! lines with detail such as which machine missed which state within what
//! timeout, then numbered suggestions. Misuse of the wait functions is
//! flagged as a bug to report.

use mw_core::{QueryError, WaitError};
use std::fmt;

/// Error with context and recovery suggestions for user-friendly display.
#[derive(Debug)]
pub struct CliError {
    /// What went wrong
    pub message: String,
    /// Why it might have happened
    pub context: Vec<String>,
    /// How to fix it
    pub suggestions: Vec<String>,
    /// Original error if any
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl CliError {
    /// Create a new error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: Vec::new(),
            suggestions: Vec::new(),
            source: None,
        }
    }

    /// Add context about why this error might have happened.
    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        self.context.push(ctx.into());
        self
    }

    /// Add a suggestion for how to fix this error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Set the source error that caused this error.
    pub fn with_source<E: std::error::Error + Send + Sync + 'static>(mut self, source: E) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Render a failed wait
    pub fn wait_failed(err: WaitError) -> Self {
        let mut error = CliError::new(err.to_string());
        if let Some(description) = err.description() {
            error = error.with_context(description);
        }
        if let Some(suggestion) = err.suggestion() {
            error = error.with_suggestion(suggestion);
        }
        error.with_source(err)
    }

    /// Error for when no API token is available.
    pub fn missing_token(env_var: &str) -> Self {
        CliError::new(format!("No API token found in ${}", env_var))
            .with_context("The machines API requires a bearer token")
            .with_suggestion(format!("Export a token: export {}=<token>", env_var))
            .with_suggestion("Or point api.token_env in the config file at another variable")
    }

    /// Error for when the machine could not be looked up.
    pub fn machine_lookup_failed(app: &str, machine_id: &str, err: QueryError) -> Self {
        let error = CliError::new(format!(
            "Failed to look up machine '{}' in app '{}'",
            machine_id, app
        ))
        .with_context(err.to_string());

        let error = match &err {
            QueryError::BadRequest { .. } => {
                error.with_suggestion("Check the machine id and app name")
            }
            _ => error.with_suggestion("Check network access to the machines API and retry"),
        };
        error.with_source(err)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "error: {}", self.message)?;

        if !self.context.is_empty() {
            writeln!(f)?;
            for ctx in &self.context {
                writeln!(f, "  -> {}", ctx)?;
            }
        }

        if !self.suggestions.is_empty() {
            writeln!(f)?;
            writeln!(f, "suggestions:")?;
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                writeln!(f, "  {}. {}", i + 1, suggestion)?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

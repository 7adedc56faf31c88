// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations

pub mod wait;

use crate::error::CliError;
use crate::output::OutputFormat;
use mw_adapters::MachinesApiAdapter;
use mw_core::WaitConfig;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

/// Everything a command needs besides its own arguments
pub struct Context {
    pub config: WaitConfig,
    pub format: OutputFormat,
    pub cancel: CancellationToken,
}

impl Context {
    /// Load the config from `path`, or from the default location if none given.
    ///
    /// An explicit path must exist; the default one may be absent.
    pub fn load(
        path: Option<&Path>,
        format: OutputFormat,
        cancel: CancellationToken,
    ) -> Result<Self, CliError> {
        let config = match path {
            Some(path) => WaitConfig::load(path),
            None => WaitConfig::load_or_default(default_config_path().as_deref()),
        }
        .map_err(|e| {
            CliError::new("Failed to load config")
                .with_context(e.to_string())
                .with_suggestion("Fix the config file, or pass --config with another path")
                .with_source(e)
        })?;

        Ok(Self {
            config,
            format,
            cancel,
        })
    }

    /// Client for the machines API, authenticated from the environment
    pub fn api(&self) -> Result<MachinesApiAdapter, CliError> {
        let env_var = &self.config.api.token_env;
        let token = std::env::var(env_var)
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| CliError::missing_token(env_var))?;
        Ok(MachinesApiAdapter::new(&self.config.api.base_url, token))
    }
}

/// `$XDG_CONFIG_HOME/mw/config.toml` or the platform equivalent
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("mw").join("config.toml"))
}

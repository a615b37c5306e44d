//! Flag groups shared by the subcommands. Each flag falls back to its
//! environment variable.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use docmirror_core::{SyncOptions, DEFAULT_POLL_INTERVAL, DEFAULT_TOPIC};
use docmirror_daemon::{LogFormat, LogSettings, DEFAULT_LOG_LEVEL};
use docmirror_discovery::DEFAULT_API_URL;
use docmirror_renderer::{RendererOptions, DEFAULT_BINARY, DEFAULT_INDEX_INTERVAL, DEFAULT_PORT};

pub const DEFAULT_ROOT: &str = "/usr/local/go";

#[derive(Args, Debug, Clone)]
pub struct EngineArgs {
    /// Access token for the API and git transport.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Identity the token belongs to. Defaults to --user.
    #[arg(long, env = "GITHUB_TOKEN_USER")]
    pub token_user: Option<String>,

    /// Account or organization to scan.
    #[arg(long, env = "GITHUB_USER")]
    pub user: String,

    /// Topic label marking repositories to mirror.
    #[arg(long, env = "GITHUB_TOPIC", default_value = DEFAULT_TOPIC)]
    pub topic: String,

    /// Time between polls, e.g. 30s, 5m, 1h30m.
    #[arg(long, env = "GITHUB_POLL_INTERVAL", default_value = DEFAULT_POLL_INTERVAL)]
    pub poll_interval: String,

    /// API base URL.
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Mirror root; repositories land under <root>/src/github.com.
    #[arg(long, env = "GODOC_ROOT", default_value = DEFAULT_ROOT)]
    pub root: PathBuf,
}

impl EngineArgs {
    pub fn sync_options(&self) -> Result<SyncOptions> {
        SyncOptions::new(
            &self.token,
            self.token_user.as_deref(),
            &self.user,
            &self.topic,
            &self.poll_interval,
            &self.root,
        )
        .context("invalid configuration")
    }
}

#[derive(Args, Debug, Clone)]
pub struct RendererArgs {
    /// Port the documentation server listens on.
    #[arg(long, env = "GODOC_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// How often the documentation server re-indexes.
    #[arg(long, env = "GODOC_INDEX_INTERVAL", default_value = DEFAULT_INDEX_INTERVAL)]
    pub index_interval: String,

    /// Documentation server executable.
    #[arg(long = "godoc-bin", env = "GODOC_BIN", default_value = DEFAULT_BINARY)]
    pub binary: PathBuf,
}

impl RendererArgs {
    pub fn renderer_options(&self, root: &Path) -> Result<RendererOptions> {
        RendererOptions::new(&self.binary, root, self.port, &self.index_interval)
            .context("invalid renderer configuration")
    }
}

#[derive(Args, Debug, Clone)]
pub struct LogArgs {
    /// Log filter when RUST_LOG is unset (error, warn, info, debug, trace).
    #[arg(long, env = "LOG_LEVEL", default_value = DEFAULT_LOG_LEVEL)]
    pub log_level: String,

    /// Log output format: text or json.
    #[arg(long, env = "LOG_FORMAT", default_value = "text")]
    pub log_format: LogFormat,
}

impl LogArgs {
    pub fn settings(&self) -> LogSettings {
        LogSettings {
            level: self.log_level.clone(),
            format: self.log_format,
        }
    }
}

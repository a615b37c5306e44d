//! `docmirror sync`: the poll loop on its own.

use anyhow::{Context, Result};
use clap::Args;

use docmirror_daemon::RuntimeConfig;

use super::settings::{EngineArgs, LogArgs};

#[derive(Args, Debug)]
pub struct SyncArgs {
    #[command(flatten)]
    pub engine: EngineArgs,

    #[command(flatten)]
    pub log: LogArgs,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        let config = RuntimeConfig {
            sync: self.engine.sync_options()?,
            api_url: self.engine.api_url,
            renderer: None,
            logging: self.log.settings(),
        };
        docmirror_daemon::start_blocking(config).context("docmirror sync failed")
    }
}

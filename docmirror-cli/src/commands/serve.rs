//! `docmirror serve`: syncer plus documentation server.

use anyhow::{Context, Result};
use clap::Args;

use docmirror_daemon::RuntimeConfig;

use super::settings::{EngineArgs, LogArgs, RendererArgs};

#[derive(Args, Debug)]
pub struct ServeArgs {
    #[command(flatten)]
    pub engine: EngineArgs,

    #[command(flatten)]
    pub renderer: RendererArgs,

    #[command(flatten)]
    pub log: LogArgs,
}

impl ServeArgs {
    pub fn run(self) -> Result<()> {
        let sync = self.engine.sync_options()?;
        let renderer = self.renderer.renderer_options(&sync.mirror_root)?;
        let config = RuntimeConfig {
            sync,
            api_url: self.engine.api_url,
            renderer: Some(renderer),
            logging: self.log.settings(),
        };
        docmirror_daemon::start_blocking(config).context("docmirror serve failed")
    }
}

//! docmirror: keep local mirrors of labelled repositories and serve their docs.
//!
//! # Usage
//!
//! ```text
//! docmirror serve [--user <account>] [--topic <label>] [--poll-interval <dur>] [--root <dir>] [--port <n>]
//! docmirror sync  [--user <account>] [--topic <label>] [--poll-interval <dur>] [--root <dir>]
//! docmirror list  [--user <account>] [--topic <label>] [--json]
//! ```
//!
//! Every flag falls back to its environment variable (`GITHUB_TOKEN`,
//! `GITHUB_USER`, `GODOC_ROOT`, ...).

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{list::ListArgs, serve::ServeArgs, sync::SyncArgs};

#[derive(Parser, Debug)]
#[command(
    name = "docmirror",
    version,
    about = "Mirror labelled repositories locally and serve their documentation",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Poll for repositories and run the documentation server until signalled.
    Serve(ServeArgs),

    /// Poll for repositories and keep mirrors current, without the server.
    Sync(SyncArgs),

    /// List matching repositories and their head commits once.
    List(ListArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Serve(args) => args.run(),
        Commands::Sync(args) => args.run(),
        Commands::List(args) => args.run(),
    }
}

//! `docmirror list`: one discovery pass, printed.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use docmirror_core::SyncOptions;
use docmirror_discovery::{discover, Discovery, GitHubClient};

use super::settings::EngineArgs;

#[derive(Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub engine: EngineArgs,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl ListArgs {
    pub fn run(self) -> Result<()> {
        let options = self.engine.sync_options()?;
        let client = GitHubClient::from_options(&self.engine.api_url, &options)
            .context("failed to build API client")?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("failed to start async runtime")?;
        let discovery = runtime
            .block_on(discover(&client))
            .context("unable to list repositories")?;

        let failed = discovery.failed_count();
        let rows = build_rows(&options, discovery);
        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&rows).context("failed to serialize listing")?
            );
            return Ok(());
        }

        print_table(&options, rows, failed);
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct ListedRepository {
    owner: String,
    name: String,
    default_branch: String,
    commit_sha: Option<String>,
    local_path: String,
    error: Option<String>,
}

#[derive(Tabled)]
struct ListTableRow {
    #[tabled(rename = "repository")]
    repository: String,
    #[tabled(rename = "branch")]
    branch: String,
    #[tabled(rename = "head")]
    head: String,
    #[tabled(rename = "mirror")]
    mirror: String,
}

fn build_rows(options: &SyncOptions, discovery: Discovery) -> Vec<ListedRepository> {
    discovery
        .entries
        .into_iter()
        .map(|entry| {
            let local_path = docmirror_core::paths::mirror_path(
                &options.mirror_root,
                &entry.repo.owner,
                &entry.repo.name,
            );
            let (commit_sha, error) = match entry.head {
                Ok(sha) => (Some(sha.0), None),
                Err(err) => (None, Some(err.to_string())),
            };
            ListedRepository {
                owner: entry.repo.owner.0,
                name: entry.repo.name.0,
                default_branch: entry.repo.default_branch,
                commit_sha,
                local_path: local_path.display().to_string(),
                error,
            }
        })
        .collect()
}

fn print_table(options: &SyncOptions, rows: Vec<ListedRepository>, failed: usize) {
    println!(
        "docmirror v{} | {} | topic {} | {} repositories",
        env!("CARGO_PKG_VERSION"),
        options.account.bold(),
        options.topic,
        rows.len(),
    );

    if rows.is_empty() {
        println!("No repositories carry the '{}' topic.", options.topic);
        return;
    }

    let table_rows: Vec<ListTableRow> = rows
        .into_iter()
        .map(|row| ListTableRow {
            repository: format!("{}/{}", row.owner, row.name),
            branch: row.default_branch,
            head: match row.commit_sha {
                Some(sha) => sha.get(..7).unwrap_or(&sha).green().to_string(),
                None => "unresolved".red().to_string(),
            },
            mirror: row.local_path,
        })
        .collect();
    let mut table = Table::new(table_rows);
    table.with(Style::rounded());
    println!("{table}");

    if failed > 0 {
        println!(
            "{}",
            format!("{failed} head lookup(s) failed; rerun with --json for details.").yellow()
        );
    }
}

//! GitHub REST implementation of [`RepositorySource`].

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use docmirror_core::types::CommitSha;
use docmirror_core::SyncOptions;

use crate::error::DiscoveryError;
use crate::source::{RemoteRepository, RepositorySource};

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Only Go repositories are searched; the renderer understands nothing else.
pub const LANGUAGE_FILTER: &str = "go";

const PER_PAGE: usize = 100;
/// The search API stops returning results after 1000 hits.
const MAX_SEARCH_PAGES: usize = 10;
const API_VERSION: &str = "2022-11-28";

/// Build the repository search query for an account and topic.
pub fn search_query(account: &str, topic: &str) -> String {
    format!("language:{LANGUAGE_FILTER} user:{account} topic:{topic}")
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct SearchResponse {
    total_count: u64,
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    name: String,
    owner: SearchOwner,
    clone_url: String,
    default_branch: String,
}

#[derive(Debug, Deserialize)]
struct SearchOwner {
    login: String,
}

#[derive(Debug, Deserialize)]
struct BranchResponse {
    commit: BranchCommit,
}

#[derive(Debug, Deserialize)]
struct BranchCommit {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

impl From<SearchItem> for RemoteRepository {
    fn from(item: SearchItem) -> Self {
        Self {
            owner: item.owner.login.into(),
            name: item.name.into(),
            clone_url: item.clone_url,
            default_branch: item.default_branch,
        }
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Token-authenticated client for the GitHub search and branches endpoints.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: HttpClient,
    base_url: Url,
    token: String,
    account: String,
    topic: String,
}

impl GitHubClient {
    pub fn new(
        api_url: &str,
        token: impl Into<String>,
        account: impl Into<String>,
        topic: impl Into<String>,
    ) -> Result<Self, DiscoveryError> {
        let base_url = parse_base_url(api_url)?;
        let http = HttpClient::builder()
            .user_agent(concat!("docmirror/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(DiscoveryError::Client)?;

        Ok(Self {
            http,
            base_url,
            token: token.into(),
            account: account.into(),
            topic: topic.into(),
        })
    }

    pub fn from_options(api_url: &str, options: &SyncOptions) -> Result<Self, DiscoveryError> {
        Self::new(
            api_url,
            options.credentials.token.clone(),
            options.account.clone(),
            options.topic.clone(),
        )
    }

    pub fn search_query(&self) -> String {
        search_query(&self.account, &self.topic)
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, DiscoveryError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| DiscoveryError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: "URL cannot carry a path".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, DiscoveryError> {
        let response = self
            .http
            .get(url.clone())
            .bearer_auth(&self.token)
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
            .send()
            .await
            .map_err(|source| DiscoveryError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DiscoveryError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                message: api_message(&body),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|source| DiscoveryError::Decode {
                url: url.to_string(),
                source,
            })
    }
}

#[async_trait]
impl RepositorySource for GitHubClient {
    async fn list_repositories(&self) -> Result<Vec<RemoteRepository>, DiscoveryError> {
        let query = self.search_query();
        tracing::debug!(query = %query, "searching repositories");

        let mut seen = HashSet::new();
        let mut repos = Vec::new();
        for page in 1..=MAX_SEARCH_PAGES {
            let mut url = self.endpoint(&["search", "repositories"])?;
            url.query_pairs_mut()
                .append_pair("q", &query)
                .append_pair("per_page", &PER_PAGE.to_string())
                .append_pair("page", &page.to_string());

            let response: SearchResponse = self.get_json(url).await?;
            let received = response.items.len();
            for item in response.items {
                let repo = RemoteRepository::from(item);
                // Results can shift between pages while we read them.
                if seen.insert(repo.key()) {
                    repos.push(repo);
                }
            }

            if received < PER_PAGE || repos.len() as u64 >= response.total_count {
                break;
            }
        }

        tracing::debug!(total = repos.len(), "search complete");
        Ok(repos)
    }

    async fn resolve_head(&self, repo: &RemoteRepository) -> Result<CommitSha, DiscoveryError> {
        let url = self.endpoint(&[
            "repos",
            &repo.owner.0,
            &repo.name.0,
            "branches",
            &repo.default_branch,
        ])?;
        let branch: BranchResponse = self.get_json(url).await?;
        Ok(CommitSha(branch.commit.sha))
    }
}

fn parse_base_url(api_url: &str) -> Result<Url, DiscoveryError> {
    let invalid = |reason: String| DiscoveryError::InvalidBaseUrl {
        url: api_url.to_string(),
        reason,
    };
    let url = Url::parse(api_url.trim()).map_err(|err| invalid(err.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.cannot_be_a_base() {
        return Err(invalid("URL cannot carry a path".to_string()));
    }
    Ok(url)
}

fn api_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => parsed.message,
        Err(_) => body.trim().chars().take(200).collect(),
    }
}

//! GitHubClient against an in-process HTTP stub.
//!
//! The stub speaks just enough HTTP/1.1 for reqwest: it reads the request
//! head, records it, and answers with a canned JSON body and `Connection: close`.

use std::sync::{Arc, Mutex};

use docmirror_core::types::CommitSha;
use docmirror_discovery::{
    discover, DiscoveryError, GitHubClient, RemoteRepository, RepositorySource,
};
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

// ---------------------------------------------------------------------------
// Stub server
// ---------------------------------------------------------------------------

#[derive(Clone)]
struct Route {
    path: String,
    query_contains: Option<&'static str>,
    status: u16,
    body: String,
}

impl Route {
    fn ok(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            path: path.into(),
            query_contains: None,
            status: 200,
            body: body.to_string(),
        }
    }

    fn status(path: impl Into<String>, status: u16, body: serde_json::Value) -> Self {
        Self {
            path: path.into(),
            query_contains: None,
            status,
            body: body.to_string(),
        }
    }

    fn when_query(mut self, fragment: &'static str) -> Self {
        self.query_contains = Some(fragment);
        self
    }
}

struct Stub {
    base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl Stub {
    fn requests(&self) -> Vec<String> {
        self.requests.lock().expect("requests lock").clone()
    }

    fn client(&self) -> GitHubClient {
        GitHubClient::new(&self.base_url, "t0k3n", "ctxswitch", "godoc").expect("client")
    }
}

async fn serve(routes: Vec<Route>) -> Stub {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind stub");
    let addr = listener.local_addr().expect("stub addr");
    let routes = Arc::new(routes);
    let requests = Arc::new(Mutex::new(Vec::new()));

    let recorded = requests.clone();
    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let routes = routes.clone();
            let recorded = recorded.clone();
            tokio::spawn(async move {
                let mut head = Vec::new();
                let mut chunk = [0u8; 1024];
                loop {
                    let n = socket.read(&mut chunk).await.unwrap_or(0);
                    if n == 0 {
                        break;
                    }
                    head.extend_from_slice(&chunk[..n]);
                    if head.windows(4).any(|w| w == b"\r\n\r\n") {
                        break;
                    }
                }

                let raw = String::from_utf8_lossy(&head).to_string();
                let target = raw.split_whitespace().nth(1).unwrap_or("/").to_string();
                let (path, query) = target.split_once('?').unwrap_or((target.as_str(), ""));
                recorded.lock().expect("requests lock").push(raw.to_lowercase());

                let (status, body) = routes
                    .iter()
                    .find(|route| {
                        route.path == path
                            && route.query_contains.map_or(true, |q| query.contains(q))
                    })
                    .map(|route| (route.status, route.body.clone()))
                    .unwrap_or((404, json!({"message": "Not Found"}).to_string()));

                let response = format!(
                    "HTTP/1.1 {status} STUB\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    Stub {
        base_url: format!("http://{addr}"),
        requests,
    }
}

fn item(owner: &str, name: &str, branch: &str) -> serde_json::Value {
    json!({
        "name": name,
        "full_name": format!("{owner}/{name}"),
        "owner": { "login": owner },
        "clone_url": format!("https://github.com/{owner}/{name}.git"),
        "default_branch": branch,
        "language": "Go",
    })
}

fn remote(owner: &str, name: &str, branch: &str) -> RemoteRepository {
    RemoteRepository {
        owner: owner.into(),
        name: name.into(),
        clone_url: format!("https://github.com/{owner}/{name}.git"),
        default_branch: branch.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_repositories_sends_query_and_token() {
    let stub = serve(vec![Route::ok(
        "/search/repositories",
        json!({
            "total_count": 2,
            "incomplete_results": false,
            "items": [item("ctxswitch", "gdoc", "main"), item("ctxswitch", "kit", "master")],
        }),
    )])
    .await;

    let repos = stub.client().list_repositories().await.expect("list");
    assert_eq!(
        repos,
        vec![
            remote("ctxswitch", "gdoc", "main"),
            remote("ctxswitch", "kit", "master")
        ]
    );

    let requests = stub.requests();
    assert_eq!(requests.len(), 1, "one page should be enough");
    let request = &requests[0];
    assert!(request.contains("q=language%3ago+user%3actxswitch+topic%3agodoc"));
    assert!(request.contains("authorization: bearer t0k3n"));
    assert!(request.contains("accept: application/vnd.github+json"));
    assert!(request.contains("user-agent: docmirror/"));
}

#[tokio::test]
async fn list_repositories_follows_pages_until_total() {
    let first_page: Vec<_> = (0..100)
        .map(|i| item("ctxswitch", &format!("repo{i:03}"), "main"))
        .collect();
    let stub = serve(vec![
        Route::ok(
            "/search/repositories",
            json!({ "total_count": 101, "items": first_page }),
        )
        .when_query("&page=1"),
        Route::ok(
            "/search/repositories",
            json!({ "total_count": 101, "items": [item("ctxswitch", "repo100", "main")] }),
        )
        .when_query("&page=2"),
    ])
    .await;

    let repos = stub.client().list_repositories().await.expect("list");
    assert_eq!(repos.len(), 101);
    assert_eq!(repos[0].name.0, "repo000");
    assert_eq!(repos[100].name.0, "repo100");
    assert_eq!(stub.requests().len(), 2);
}

#[tokio::test]
async fn list_repositories_empty_result() {
    let stub = serve(vec![Route::ok(
        "/search/repositories",
        json!({ "total_count": 0, "items": [] }),
    )])
    .await;

    let repos = stub.client().list_repositories().await.expect("list");
    assert!(repos.is_empty());
}

#[tokio::test]
async fn list_repositories_surfaces_api_errors() {
    let stub = serve(vec![Route::status(
        "/search/repositories",
        403,
        json!({ "message": "API rate limit exceeded" }),
    )])
    .await;

    let err = stub
        .client()
        .list_repositories()
        .await
        .expect_err("should fail");
    match err {
        DiscoveryError::Status {
            status, message, ..
        } => {
            assert_eq!(status, 403);
            assert_eq!(message, "API rate limit exceeded");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn list_repositories_rejects_malformed_body() {
    let stub = serve(vec![Route::ok(
        "/search/repositories",
        json!({ "unexpected": true }),
    )])
    .await;

    let err = stub
        .client()
        .list_repositories()
        .await
        .expect_err("should fail");
    assert!(matches!(err, DiscoveryError::Decode { .. }), "{err:?}");
}

#[tokio::test]
async fn unreachable_api_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let client = GitHubClient::new(&format!("http://{addr}"), "t", "a", "b").expect("client");
    let err = client.list_repositories().await.expect_err("should fail");
    assert!(matches!(err, DiscoveryError::Http { .. }), "{err:?}");
}

// ---------------------------------------------------------------------------
// Head resolution
// ---------------------------------------------------------------------------

#[tokio::test]
async fn resolve_head_reads_branch_commit() {
    let stub = serve(vec![Route::ok(
        "/repos/ctxswitch/gdoc/branches/main",
        json!({ "name": "main", "commit": { "sha": "0123456789abcdef" }, "protected": false }),
    )])
    .await;

    let sha = stub
        .client()
        .resolve_head(&remote("ctxswitch", "gdoc", "main"))
        .await
        .expect("resolve");
    assert_eq!(sha, CommitSha::from("0123456789abcdef"));
}

#[tokio::test]
async fn resolve_head_missing_branch_is_status_error() {
    let stub = serve(vec![]).await;
    let err = stub
        .client()
        .resolve_head(&remote("ctxswitch", "gdoc", "main"))
        .await
        .expect_err("should fail");
    assert!(
        matches!(err, DiscoveryError::Status { status: 404, .. }),
        "{err:?}"
    );
}

// ---------------------------------------------------------------------------
// Full pass
// ---------------------------------------------------------------------------

#[tokio::test]
async fn discover_keeps_order_and_isolates_head_failures() {
    let stub = serve(vec![
        Route::ok(
            "/search/repositories",
            json!({
                "total_count": 3,
                "items": [
                    item("ctxswitch", "a", "main"),
                    item("ctxswitch", "b", "main"),
                    item("ctxswitch", "c", "main"),
                ],
            }),
        ),
        Route::ok(
            "/repos/ctxswitch/a/branches/main",
            json!({ "commit": { "sha": "c1" } }),
        ),
        Route::status(
            "/repos/ctxswitch/b/branches/main",
            500,
            json!({ "message": "boom" }),
        ),
        Route::ok(
            "/repos/ctxswitch/c/branches/main",
            json!({ "commit": { "sha": "c3" } }),
        ),
    ])
    .await;

    let discovery = discover(&stub.client()).await.expect("discover");
    let names: Vec<&str> = discovery
        .entries
        .iter()
        .map(|e| e.repo.name.0.as_str())
        .collect();
    assert_eq!(names, vec!["a", "b", "c"]);
    assert_eq!(discovery.failed_count(), 1);

    let resolved: Vec<(&str, &str)> = discovery
        .entries
        .iter()
        .filter_map(|e| e.head.as_ref().ok().map(|sha| (e.repo.name.0.as_str(), sha.0.as_str())))
        .collect();
    assert_eq!(resolved, vec![("a", "c1"), ("c", "c3")]);
}

#[tokio::test]
async fn discover_aborts_when_listing_fails() {
    let stub = serve(vec![Route::status(
        "/search/repositories",
        502,
        json!({ "message": "bad gateway" }),
    )])
    .await;

    let err = discover(&stub.client()).await.expect_err("should fail");
    assert!(matches!(err, DiscoveryError::Status { status: 502, .. }));
    assert_eq!(stub.requests().len(), 1, "no head lookups after a failed listing");
}

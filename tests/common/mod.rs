//! Test utilities shared by the linkrot integration tests

use anyhow::Result;
use mockito::{Mock, Server};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

use kodegen_tools_linkrot::{ArchiveResolver, HttpProber, RetryPolicy};

/// Creates a temporary source tree from `(relative path, contents)` pairs
#[allow(dead_code)]
pub fn create_test_tree(files: &[(&str, &str)]) -> Result<TempDir> {
    let dir = TempDir::new()?;
    for (relative, contents) in files {
        let path = dir.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
    }
    Ok(dir)
}

/// Reads a file from a test tree
#[allow(dead_code)]
pub fn read_tree_file(root: &Path, relative: &str) -> String {
    std::fs::read_to_string(root.join(relative)).unwrap()
}

/// Prober with a short timeout and the default redirect budget
#[allow(dead_code)]
pub fn test_prober() -> HttpProber {
    HttpProber::new(Duration::from_secs(5), 5, "linkrot-test").unwrap()
}

/// Archive client for a mock server with fast retries and no spacing
#[allow(dead_code)]
pub fn test_archive(server: &Server) -> ArchiveResolver {
    ArchiveResolver::new(
        format!("{}/wayback/available", server.url()),
        Duration::from_secs(5),
        Duration::ZERO,
        RetryPolicy::new(3, Duration::from_millis(10)),
        "linkrot-test",
    )
    .unwrap()
}

/// Availability API body with one closest snapshot
#[allow(dead_code)]
pub fn snapshot_body(snapshot_url: &str) -> String {
    serde_json::json!({
        "archived_snapshots": {
            "closest": {
                "available": true,
                "url": snapshot_url,
                "timestamp": "20200101000000",
                "status": "200"
            }
        }
    })
    .to_string()
}

/// Mocks a HEAD request answering with `status`
#[allow(dead_code)]
pub async fn create_head_mock(server: &mut Server, path: &str, status: usize) -> Mock {
    server
        .mock("HEAD", path)
        .with_status(status)
        .create_async()
        .await
}

/// Mocks a GET request answering with `status`
#[allow(dead_code)]
pub async fn create_get_mock(server: &mut Server, path: &str, status: usize) -> Mock {
    server
        .mock("GET", path)
        .with_status(status)
        .with_body("body")
        .create_async()
        .await
}

/// Mocks a HEAD redirect
#[allow(dead_code)]
pub async fn create_redirect_mock(server: &mut Server, from: &str, to: &str) -> Mock {
    server
        .mock("HEAD", from)
        .with_status(301)
        .with_header("location", to)
        .create_async()
        .await
}

/// Helper to create test URLs
#[allow(dead_code)]
pub fn test_url(server: &Server, path: &str) -> String {
    format!("{}{}", server.url(), path)
}

/// A local address nothing listens on
#[allow(dead_code)]
pub fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/")
}

/// Path of a file inside a tree
#[allow(dead_code)]
pub fn tree_path(root: &TempDir, relative: &str) -> PathBuf {
    root.path().join(relative)
}

//! Archive resolver against a mock availability API

use std::time::{Duration, Instant};

use kodegen_tools_linkrot::{ArchiveResolver, LinkrotError, RetryPolicy};
use mockito::Matcher;

mod common;
use common::*;

#[tokio::test]
async fn test_snapshot_url_is_upgraded_to_https() {
    let mut server = mockito::Server::new_async().await;
    let lookup = server
        .mock("GET", "/wayback/available")
        .match_query(Matcher::UrlEncoded("url".into(), "https://dead.example/x".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(snapshot_body("http://web.archive.org/web/20200101/x"))
        .expect(1)
        .create_async()
        .await;

    let snapshot = test_archive(&server)
        .lookup("https://dead.example/x")
        .await
        .unwrap();

    lookup.assert_async().await;
    assert_eq!(snapshot.as_deref(), Some("https://web.archive.org/web/20200101/x"));
}

#[tokio::test]
async fn test_missing_snapshot_is_final() {
    let mut server = mockito::Server::new_async().await;
    let lookup = server
        .mock("GET", "/wayback/available")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"url":"https://dead.example/y","archived_snapshots":{}}"#)
        .expect(1)
        .create_async()
        .await;

    let snapshot = test_archive(&server)
        .lookup("https://dead.example/y")
        .await
        .unwrap();

    lookup.assert_async().await;
    assert_eq!(snapshot, None);
}

#[tokio::test]
async fn test_malformed_body_is_retried_then_reported() {
    let mut server = mockito::Server::new_async().await;
    let lookup = server
        .mock("GET", "/wayback/available")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("<html>rate limited</html>")
        .expect(3)
        .create_async()
        .await;

    let resolver = test_archive(&server);
    let err = resolver.lookup("https://dead.example/z").await.unwrap_err();

    lookup.assert_async().await;
    assert!(matches!(err, LinkrotError::MalformedResponse(_)));
    assert_eq!(resolver.resolve("https://dead.example/z").await, None);
}

#[tokio::test]
async fn test_client_error_is_not_retried() {
    let mut server = mockito::Server::new_async().await;
    let lookup = server
        .mock("GET", "/wayback/available")
        .match_query(Matcher::Any)
        .with_status(400)
        .expect(1)
        .create_async()
        .await;

    let err = test_archive(&server)
        .lookup("https://dead.example/q")
        .await
        .unwrap_err();

    lookup.assert_async().await;
    assert!(matches!(err, LinkrotError::ArchiveStatus(400)));
}

#[tokio::test]
async fn test_timestamp_is_forwarded() {
    let mut server = mockito::Server::new_async().await;
    let lookup = server
        .mock("GET", "/wayback/available")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("url".into(), "https://dead.example/t".into()),
            Matcher::UrlEncoded("timestamp".into(), "20190101".into()),
        ]))
        .with_status(200)
        .with_body(snapshot_body("https://web.archive.org/web/20190101000000/https://dead.example/t"))
        .expect(1)
        .create_async()
        .await;

    let snapshot = test_archive(&server)
        .with_timestamp(Some("20190101".to_string()))
        .resolve("https://dead.example/t")
        .await;

    lookup.assert_async().await;
    assert!(snapshot.is_some());
}

#[tokio::test]
async fn test_sequential_lookups_are_spaced() {
    let mut server = mockito::Server::new_async().await;
    let _lookup = server
        .mock("GET", "/wayback/available")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"archived_snapshots":{}}"#)
        .expect(3)
        .create_async()
        .await;

    let delay = Duration::from_millis(100);
    let resolver = ArchiveResolver::new(
        format!("{}/wayback/available", server.url()),
        Duration::from_secs(5),
        delay,
        RetryPolicy::new(1, Duration::from_millis(10)),
        "linkrot-test",
    )
    .unwrap();

    let urls: Vec<String> = (0..3).map(|i| format!("https://dead.example/{i}")).collect();
    let started = Instant::now();
    let resolved = resolver.resolve_all(&urls).await;

    assert_eq!(resolved.len(), 3);
    assert!(started.elapsed() >= delay * 2);
}

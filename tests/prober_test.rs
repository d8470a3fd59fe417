//! HTTP prober behavior against a mock server

use kodegen_tools_linkrot::{ErrorKind, FailureCategory, LivenessProbe};

mod common;
use common::*;

#[tokio::test]
async fn test_redirect_is_followed_to_final_url() {
    let mut server = mockito::Server::new_async().await;
    let final_url = test_url(&server, "/final");
    let _redirect = create_redirect_mock(&mut server, "/start", &final_url).await;
    let _target = create_head_mock(&mut server, "/final", 200).await;

    let outcome = test_prober().check(&test_url(&server, "/start")).await;

    assert_eq!(outcome.http_status, Some(200));
    assert_eq!(outcome.final_url.as_deref(), Some(final_url.as_str()));
    assert!(outcome.is_live());
}

#[tokio::test]
async fn test_redirect_cycle_stops_at_budget() {
    let mut server = mockito::Server::new_async().await;
    let loop_url = test_url(&server, "/loop");
    // One initial request plus five followed hops
    let cycle = server
        .mock("HEAD", "/loop")
        .with_status(301)
        .with_header("location", &loop_url)
        .expect(6)
        .create_async()
        .await;

    let outcome = test_prober().check(&loop_url).await;

    cycle.assert_async().await;
    assert_eq!(outcome.http_status, Some(301));
    assert_eq!(outcome.final_url.as_deref(), Some(loop_url.as_str()));
}

#[tokio::test]
async fn test_head_rejected_falls_back_to_get() {
    let mut server = mockito::Server::new_async().await;
    let _head = create_head_mock(&mut server, "/page", 405).await;
    let get = server
        .mock("GET", "/page")
        .with_status(200)
        .with_body("ok")
        .expect(1)
        .create_async()
        .await;

    let outcome = test_prober().probe(&test_url(&server, "/page")).await;

    get.assert_async().await;
    assert_eq!(outcome.http_status, Some(200));
    assert!(outcome.is_live());
}

#[tokio::test]
async fn test_not_found_is_dead_and_classified() {
    let mut server = mockito::Server::new_async().await;
    let _head = create_head_mock(&mut server, "/missing", 404).await;
    let _get = create_get_mock(&mut server, "/missing", 404).await;

    let outcome = test_prober().check(&test_url(&server, "/missing")).await;

    assert!(!outcome.is_live());
    assert_eq!(outcome.http_status, Some(404));
    assert_eq!(outcome.category(), Some(FailureCategory::NotFound));
    assert!(FailureCategory::NotFound.is_definitive());
}

#[tokio::test]
async fn test_server_error_is_not_definitive() {
    let mut server = mockito::Server::new_async().await;
    let _head = create_head_mock(&mut server, "/flaky", 503).await;
    let _get = create_get_mock(&mut server, "/flaky", 503).await;

    let outcome = test_prober().check(&test_url(&server, "/flaky")).await;

    assert_eq!(outcome.category(), Some(FailureCategory::ServerError));
    assert!(!FailureCategory::ServerError.is_definitive());
}

#[tokio::test]
async fn test_connection_refused_is_an_outcome() {
    let outcome = test_prober().check(&closed_port_url()).await;

    assert_eq!(outcome.http_status, None);
    assert_eq!(outcome.error_kind, Some(ErrorKind::Connection));
    assert_eq!(outcome.category(), Some(FailureCategory::Connection));
    assert!(outcome.error.is_some());
}

#[tokio::test]
async fn test_url_text_does_not_decide_the_error_kind() {
    let base = closed_port_url();
    for path in ["docs/tls-setup", "config/timeout", "ssl/certificate-handshake"] {
        let outcome = test_prober().check(&format!("{base}{path}")).await;

        assert_eq!(outcome.error_kind, Some(ErrorKind::Connection), "{path}");
        assert_eq!(outcome.category(), Some(FailureCategory::Connection), "{path}");
        assert!(!FailureCategory::Connection.is_definitive());
    }
}

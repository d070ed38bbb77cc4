use bulkpaste_client::build_chain;
use bulkpaste_core::{ContentItem, PublishResult};
use mockito::Matcher;

use crate::integration::common::{init_tracing, mock_config};

#[tokio::test]
async fn api_success_needs_one_request() {
    init_tracing();
    let mut server = mockito::Server::new_async().await;
    let api = server
        .mock("POST", "/api/new")
        .with_status(200)
        .with_body(r#"{"url": "https://rentry.co/first", "edit_code": "ed1"}"#)
        .expect(1)
        .create_async()
        .await;

    let chain = build_chain(&mock_config(&server.url())).await.unwrap();
    let result = chain.publish(&ContentItem::new(1, "hello world")).await;

    assert_eq!(
        result,
        PublishResult::Success {
            url: "https://rentry.co/first".into(),
            edit_code: Some("ed1".into()),
            method: "api".into(),
        }
    );
    api.assert_async().await;
}

#[tokio::test]
async fn api_is_retried_before_falling_through() {
    init_tracing();
    let mut server = mockito::Server::new_async().await;
    let api = server
        .mock("POST", "/api/new")
        .with_status(500)
        .with_body(r#"{"url": "https://rentry.co/late"}"#)
        .expect(2)
        .create_async()
        .await;
    server
        .mock("GET", "/")
        .with_status(503)
        .create_async()
        .await;
    let form = server
        .mock("POST", "/")
        .with_status(200)
        .with_body(format!(r#"<a href="{}/Frm1">paste</a>"#, server.url()))
        .create_async()
        .await;

    let chain = build_chain(&mock_config(&server.url())).await.unwrap();
    let result = chain.publish(&ContentItem::new(1, "hello world")).await;

    assert_eq!(result.url(), Some(format!("{}/Frm1", server.url()).as_str()));
    match result {
        PublishResult::Success { method, edit_code, .. } => {
            assert_eq!(method, "form");
            assert!(edit_code.is_none());
        }
        other => panic!("expected success, got {other:?}"),
    }
    api.assert_async().await;
    form.assert_async().await;
}

#[tokio::test]
async fn session_replays_api_with_cookies() {
    init_tracing();
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/new")
        .match_header("cookie", Matcher::Missing)
        .with_status(403)
        .expect(2)
        .create_async()
        .await;
    server
        .mock("GET", "/")
        .with_status(200)
        .with_header("set-cookie", "csrftoken=zz9; Path=/")
        .with_body("<html>landing</html>")
        .create_async()
        .await;
    let replay = server
        .mock("POST", "/api/new")
        .match_header("cookie", Matcher::Regex("csrftoken=zz9".into()))
        .with_status(200)
        .with_body(r#"{"url": "/sess42", "edit_code": "k"}"#)
        .create_async()
        .await;

    let chain = build_chain(&mock_config(&server.url())).await.unwrap();
    let result = chain.publish(&ContentItem::new(3, "session content")).await;

    assert_eq!(
        result,
        PublishResult::Success {
            url: format!("{}/sess42", server.url()),
            edit_code: Some("k".into()),
            method: "session".into(),
        }
    );
    replay.assert_async().await;
}

#[tokio::test]
async fn exhausted_chain_reports_every_provider() {
    init_tracing();
    let mut server = mockito::Server::new_async().await;
    for method in ["GET", "POST"] {
        server
            .mock(method, Matcher::Any)
            .with_status(500)
            .create_async()
            .await;
    }

    let chain = build_chain(&mock_config(&server.url())).await.unwrap();
    let result = chain.publish(&ContentItem::new(1, "doomed text")).await;

    let reason = result.error().unwrap();
    assert!(reason.starts_with("all 3 providers failed"), "{reason}");
    for name in ["api:", "session:", "form:"] {
        assert!(reason.contains(name), "missing {name} in {reason}");
    }
}

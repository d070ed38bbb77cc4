use std::time::{Duration, Instant};

use bulkpaste_client::build_chain;
use bulkpaste_core::{
    BatchRunner, ContentItem, PublishRecord, RecordStatus, TracingBatchReporter,
};
use mockito::Matcher;
use tokio_util::sync::CancellationToken;

use crate::integration::common::{init_tracing, mock_config};

fn rows(texts: &[&str]) -> Vec<ContentItem> {
    texts
        .iter()
        .enumerate()
        .map(|(i, t)| ContentItem::new(i + 1, t))
        .collect()
}

#[tokio::test]
async fn mixed_batch_is_recorded_in_row_order() {
    init_tracing();
    let mut server = mockito::Server::new_async().await;
    let api = server
        .mock("POST", "/api/new")
        .with_status(200)
        .with_body(r#"{"url": "https://rentry.co/ok1", "edit_code": "e"}"#)
        .expect(2)
        .create_async()
        .await;

    let config = mock_config(&server.url());
    let runner = BatchRunner::new(build_chain(&config).await.unwrap(), config.batch_options());
    let items = rows(&["first paste", "nan", "  ", "third paste"]);
    let mut records: Vec<PublishRecord> = Vec::new();

    let start = Instant::now();
    let summary = runner
        .run(
            &items,
            &mut records,
            &TracingBatchReporter,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(summary.total, 4);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.skipped, 2);
    assert_eq!(summary.failed, 0);
    assert_eq!(
        records.iter().map(|r| r.status).collect::<Vec<_>>(),
        vec![
            RecordStatus::Success,
            RecordStatus::Skipped,
            RecordStatus::Skipped,
            RecordStatus::Success,
        ]
    );
    assert_eq!(records[0].method.as_deref(), Some("api"));
    // One pause between the two submissions.
    assert!(start.elapsed() >= Duration::from_millis(20));
    api.assert_async().await;
}

#[tokio::test]
async fn markdown_is_normalized_before_submission() {
    init_tracing();
    let mut server = mockito::Server::new_async().await;
    let api = server
        .mock("POST", "/api/new")
        .match_body(Matcher::UrlEncoded("text".into(), "Title\nbold and link (https://x.io)".into()))
        .with_status(200)
        .with_body(r#"{"url": "https://rentry.co/md1"}"#)
        .create_async()
        .await;

    let mut config = mock_config(&server.url());
    config.normalize_markdown = true;
    let runner = BatchRunner::new(build_chain(&config).await.unwrap(), config.batch_options());
    let mut records: Vec<PublishRecord> = Vec::new();

    runner
        .run(
            &rows(&["# Title\n**bold** and [link](https://x.io)"]),
            &mut records,
            &TracingBatchReporter,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(records[0].status, RecordStatus::Success);
    api.assert_async().await;
}

#[tokio::test]
async fn failing_rows_do_not_stop_the_batch() {
    init_tracing();
    let mut server = mockito::Server::new_async().await;
    for method in ["GET", "POST"] {
        server
            .mock(method, Matcher::Any)
            .with_status(502)
            .create_async()
            .await;
    }

    let config = mock_config(&server.url());
    let runner = BatchRunner::new(build_chain(&config).await.unwrap(), config.batch_options());
    let mut records: Vec<PublishRecord> = Vec::new();

    let summary = runner
        .run(
            &rows(&["first paste", "second paste"]),
            &mut records,
            &TracingBatchReporter,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(summary.failed, 2);
    assert!(records.iter().all(|r| r.url.is_none()));
    assert!(
        records[1]
            .error
            .as_deref()
            .is_some_and(|e| e.contains("HTTP 502"))
    );
}

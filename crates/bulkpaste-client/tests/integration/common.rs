use std::time::Duration;

use bulkpaste_core::PublishConfig;
use bulkpaste_core::retry::RetryPolicy;

/// Config pointed at a local mock server: no browser, no third-party hosts,
/// short retry pause.
pub fn mock_config(server_url: &str) -> PublishConfig {
    PublishConfig {
        base_url: server_url.to_string(),
        timeout: Duration::from_secs(5),
        api_retry: RetryPolicy::new(2, Duration::from_millis(10)),
        alternates: Vec::new(),
        browser: false,
        delay: Duration::from_millis(20),
        ..PublishConfig::default()
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("bulkpaste_core=debug,bulkpaste_client=debug")
        .with_test_writer()
        .try_init();
}

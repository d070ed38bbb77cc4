use std::time::Duration;

use bulkpaste_core::error::PasteError;
use bulkpaste_core::retry::RetryingProvider;
use bulkpaste_core::{Provider, ProviderChain, PublishConfig};

use crate::alternate::AlternateProvider;
use crate::api::ApiProvider;
use crate::form::FormProvider;
use crate::http::HttpSettings;
use crate::session::SessionProvider;

const ATTEMPT_SLACK: Duration = Duration::from_secs(5);

/// Worst case for one provider attempt: the form step makes up to three
/// requests, the API step retries with pauses in between.
fn attempt_budget(config: &PublishConfig) -> Duration {
    let tries = config.api_retry.attempts.max(1);
    config.timeout * tries.max(3) + config.api_retry.delay * tries + ATTEMPT_SLACK
}

#[cfg(feature = "browser")]
async fn start_browser(
    config: &PublishConfig,
    domain: &str,
) -> Result<Box<dyn Provider>, PasteError> {
    let provider =
        crate::browser::BrowserProvider::launch(config.base_url(), domain, config.timeout).await?;
    Ok(Box::new(provider))
}

#[cfg(not(feature = "browser"))]
async fn start_browser(
    _config: &PublishConfig,
    _domain: &str,
) -> Result<Box<dyn Provider>, PasteError> {
    Err(PasteError::CapabilityUnavailable(
        "built without the `browser` feature".into(),
    ))
}

/// Assemble the default chain: api (with retry), session, form, browser,
/// then the configured alternates.
///
/// The browser is started here, once per run; when it cannot start it is left
/// out of the chain instead of failing every item.
pub async fn build_chain(config: &PublishConfig) -> Result<ProviderChain, PasteError> {
    config.validate()?;
    let settings = HttpSettings::from_config(config);
    let base_url = config.base_url();
    let domain = config.domain()?;

    let mut providers: Vec<Box<dyn Provider>> = vec![
        Box::new(RetryingProvider::new(
            ApiProvider::new(&settings, base_url)?,
            config.api_retry,
        )),
        Box::new(SessionProvider::new(settings.clone(), base_url, &domain)?),
        Box::new(FormProvider::new(&settings, base_url, &domain)?),
    ];

    if config.browser {
        match start_browser(config, &domain).await {
            Ok(browser) => providers.push(browser),
            Err(e) => tracing::info!(error = %e, "Headless browser unavailable, skipping"),
        }
    }

    for service in &config.alternates {
        providers.push(Box::new(AlternateProvider::for_service(*service, &settings)?));
    }

    let chain = ProviderChain::new(providers).with_attempt_timeout(attempt_budget(config));
    tracing::debug!(providers = ?chain.names(), "Provider chain ready");
    Ok(chain)
}

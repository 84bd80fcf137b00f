//! # sentinel-smoke
//!
//! Opt-in smoke check for a Sentinel setup: loads configuration, starts the
//! configured browser, optionally opens a page and looks for one element,
//! then quits the browser.
//!
//! ## Configuration
//! Read from `conf/sentinel.toml` (or `$SENTINEL_CONFIG`) and `SENTINEL_*`
//! environment variables:
//! - `browser`, `os`: required unless a remote grid is configured
//! - `url`: page to open (optional)
//! - `check`: CSS selector that must be displayed on that page (optional)

use anyhow::{bail, Context};
use sentinel::{
    config::Configuration,
    driver::{DriverFactory, WebDriverLauncher},
    elements::{PageElement, Selector},
    SessionHandle,
};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

async fn run(factory: &DriverFactory, config: &Configuration) -> anyhow::Result<()> {
    let session: SessionHandle = factory
        .instantiate()
        .await
        .context("could not start the configured browser")?;
    info!("Session {} started", session.session_id());

    let Some(url) = config.get_optional_property("url") else {
        info!("No url configured, nothing to open");
        return Ok(());
    };
    session.navigate(&url).await.context("navigation failed")?;
    info!("Opened {}", session.current_url().await?);

    if let Some(css) = config.get_optional_property("check") {
        let element = PageElement::configured(Selector::css(css.clone()), session.clone(), config);
        if !element.is_displayed(config.default_timeout().as_secs()).await {
            bail!("element '{}' is not displayed on {}", css, url);
        }
        info!("Element '{}' is displayed", css);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing - respect RUST_LOG environment variable
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber).context("setting default subscriber failed")?;

    info!("Sentinel smoke check v{}", sentinel::VERSION);

    let config = Configuration::load().context("could not load configuration")?;
    let factory = DriverFactory::new(config.clone(), Arc::new(WebDriverLauncher::new()));

    let outcome = tokio::select! {
        result = run(&factory, &config) => result,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, shutting down");
            Ok(())
        }
    };

    if let Err(e) = factory.quit().await {
        error!("Failed to quit the browser: {}", e);
    }

    match &outcome {
        Ok(()) => info!("Smoke check passed"),
        Err(e) => error!("Smoke check failed: {:#}", e),
    }
    outcome
}

//! Native session construction
//!
//! The driver factory decides *what* to launch; a [`SessionLauncher`] does the
//! launching. Tests swap in a launcher that never touches a real browser.

use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use super::platform::{Browser, OperatingSystem};
use crate::webdriver::{DriverService, HttpWebDriverSession, SessionHandle, DEFAULT_STARTUP_TIMEOUT};
use crate::Result;

/// A local driver binary plus the session to open on it
#[derive(Debug, Clone)]
pub struct LocalDriverSpec {
    pub browser: Browser,
    pub os: OperatingSystem,
    pub binary: PathBuf,
    pub capabilities: Value,
}

/// A remote grid endpoint plus the session to open on it
#[derive(Debug, Clone)]
pub struct RemoteGridSpec {
    pub url: String,
    pub capabilities: Value,
}

/// Constructs live sessions
#[async_trait]
pub trait SessionLauncher: Send + Sync + std::fmt::Debug {
    /// Start a local driver and open a session on it
    async fn launch_local(&self, spec: LocalDriverSpec) -> Result<SessionHandle>;

    /// Open a session on a remote grid
    async fn launch_remote(&self, spec: RemoteGridSpec) -> Result<SessionHandle>;
}

/// Launcher backed by real driver processes and HTTP endpoints
#[derive(Debug, Clone)]
pub struct WebDriverLauncher {
    startup_timeout: Duration,
}

impl WebDriverLauncher {
    pub fn new() -> Self {
        Self {
            startup_timeout: DEFAULT_STARTUP_TIMEOUT,
        }
    }

    /// How long a local driver gets to come up
    pub fn with_startup_timeout(mut self, timeout: Duration) -> Self {
        self.startup_timeout = timeout;
        self
    }
}

impl Default for WebDriverLauncher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionLauncher for WebDriverLauncher {
    async fn launch_local(&self, spec: LocalDriverSpec) -> Result<SessionHandle> {
        info!(
            "Launching {} on {} with {}",
            spec.browser,
            spec.os,
            spec.binary.display()
        );
        let service =
            DriverService::start(&spec.binary, spec.browser.port_flag(), self.startup_timeout).await?;
        let session = HttpWebDriverSession::launch(service, spec.capabilities).await?;
        Ok(Arc::new(session))
    }

    async fn launch_remote(&self, spec: RemoteGridSpec) -> Result<SessionHandle> {
        info!("Opening remote session at {}", spec.url);
        let session = HttpWebDriverSession::connect(spec.url, spec.capabilities).await?;
        Ok(Arc::new(session))
    }
}

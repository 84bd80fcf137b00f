//! Driver factory
//!
//! Resolves browser, operating system and driver binary from configuration,
//! launches exactly one session and hands out clones of its handle.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};

use super::capabilities::{local_capabilities, remote_capabilities, BrowserOptions, GridOptions};
use super::launcher::{LocalDriverSpec, RemoteGridSpec, SessionLauncher};
use super::platform::{normalize_browser, normalize_os, Browser, OperatingSystem};
use crate::config::Configuration;
use crate::downloads::DownloadManager;
use crate::webdriver::SessionHandle;
use crate::{Error, Result};

/// Root of the bundled driver binaries when `driversRoot` is not set
pub const DEFAULT_DRIVERS_ROOT: &str = "src/main/resources/drivers";

/// Safari ships its driver with the operating system
pub const SAFARI_DRIVER_PATH: &str = "/usr/bin/safaridriver";

/// Remote grid endpoint when `saucelabsUrl` is not set
pub const DEFAULT_GRID_URL: &str = "https://ondemand.saucelabs.com:443/wd/hub";

/// Owns the session for one test context
#[derive(Debug)]
pub struct DriverFactory {
    config: Configuration,
    launcher: Arc<dyn SessionLauncher>,
    downloads: DownloadManager,
    cached: Mutex<Option<SessionHandle>>,
}

impl DriverFactory {
    pub fn new(config: Configuration, launcher: Arc<dyn SessionLauncher>) -> Self {
        Self {
            config,
            launcher,
            downloads: DownloadManager::new(),
            cached: Mutex::new(None),
        }
    }

    /// Share an existing download setting instead of a fresh one
    pub fn with_downloads(mut self, downloads: DownloadManager) -> Self {
        self.downloads = downloads;
        self
    }

    /// Configuration this factory reads
    pub fn config(&self) -> &Configuration {
        &self.config
    }

    /// Shared download setting
    pub fn download_directory(&self) -> &DownloadManager {
        &self.downloads
    }

    /// Build the session on first call, return the cached one afterwards
    #[instrument(skip(self))]
    pub async fn instantiate(&self) -> Result<SessionHandle> {
        let mut cached = self.cached.lock().await;
        if let Some(session) = cached.as_ref() {
            debug!("Reusing session {}", session.session_id());
            return Ok(Arc::clone(session));
        }

        let session = self.build().await?;
        info!("Session {} ready", session.session_id());
        *cached = Some(Arc::clone(&session));
        Ok(session)
    }

    /// The cached session
    pub async fn current(&self) -> Result<SessionHandle> {
        match self.cached.lock().await.as_ref() {
            Some(session) => Ok(Arc::clone(session)),
            None => {
                error!("{}", Error::NotInitialized);
                Err(Error::NotInitialized)
            }
        }
    }

    /// End the cached session, if any, and forget it
    pub async fn quit(&self) -> Result<()> {
        let session = self.cached.lock().await.take();
        match session {
            Some(session) => {
                info!("Quitting session {}", session.session_id());
                session.quit().await
            }
            None => {
                debug!("No session to quit");
                Ok(())
            }
        }
    }

    async fn build(&self) -> Result<SessionHandle> {
        if let Some(username) = self.config.get_optional_property("saucelabsUserName") {
            return self.build_remote(username).await;
        }

        let browser_name = normalize_browser(&self.config.get_property("browser")?);
        let os_name = normalize_os(&self.config.get_property("os")?);
        let explicit_driver = self.config.get_optional_property("driver");

        if let Some(download) = self.config.get_optional_property("download") {
            self.downloads.set_download_directory(download);
        }

        let browser: Browser = browser_name.parse()?;
        let os = browser.check_os(&os_name).map_err(|e| {
            error!("{}", e);
            e
        })?;

        let binary = match explicit_driver {
            Some(path) => PathBuf::from(path),
            None => self.bundled_driver(browser, os),
        };
        debug!("Driver binary for {}: {}", browser, binary.display());

        let options = BrowserOptions {
            headless: self.config.get_flag("headless"),
            download_dir: self.downloads.absolute_download_directory(),
        };
        let spec = LocalDriverSpec {
            browser,
            os,
            binary,
            capabilities: local_capabilities(browser, &options),
        };

        self.launcher
            .launch_local(spec)
            .await
            .map_err(|e| classify(browser.name(), e))
    }

    async fn build_remote(&self, username: String) -> Result<SessionHandle> {
        let url = self
            .config
            .get_optional_property("saucelabsUrl")
            .unwrap_or_else(|| DEFAULT_GRID_URL.to_string());
        let browser = self
            .config
            .get_optional_property("browser")
            .map(|b| normalize_browser(&b))
            .unwrap_or_else(|| Browser::Chrome.name().to_string());
        let remote_browser = match browser.as_str() {
            "internetexplorer" => "internet explorer".to_string(),
            _ => browser.clone(),
        };

        let grid = GridOptions {
            username,
            access_key: self.config.get_optional_property("saucelabsAccessKey"),
            platform: self.config.get_optional_property("saucelabsPlatform"),
            browser_version: self.config.get_optional_property("saucelabsBrowserVersion"),
        };
        if grid.access_key.is_none() {
            warn!("saucelabsAccessKey is not set; the grid may reject the session");
        }

        let spec = RemoteGridSpec {
            url,
            capabilities: remote_capabilities(&remote_browser, &grid),
        };
        self.launcher
            .launch_remote(spec)
            .await
            .map_err(|e| Error::construction_failed(browser, e))
    }

    fn bundled_driver(&self, browser: Browser, os: OperatingSystem) -> PathBuf {
        if browser == Browser::Safari {
            return PathBuf::from(SAFARI_DRIVER_PATH);
        }
        let root = self
            .config
            .get_optional_property("driversRoot")
            .unwrap_or_else(|| DEFAULT_DRIVERS_ROOT.to_string());
        PathBuf::from(root)
            .join(os.name())
            .join(browser.driver_binary(os))
    }
}

/// Split construction failures into "cannot run the binary" and the rest
fn classify(browser: &str, err: Error) -> Error {
    match err {
        Error::Io(io) if matches!(io.kind(), ErrorKind::NotFound | ErrorKind::PermissionDenied) => {
            let err = Error::driver_not_executable(io.to_string());
            error!("{}", err);
            err
        }
        other => {
            error!("Failed to create the {} driver: {}", browser, other);
            Error::construction_failed(browser, other)
        }
    }
}

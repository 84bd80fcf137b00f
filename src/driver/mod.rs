//! # Driver factory
//!
//! Turns configuration (`browser`, `os`, `driver`, `download`, remote grid
//! keys) into one live WebDriver session.
//!
//! ## Module structure
//! - `platform`: browser and operating system names, aliases and compatibility
//! - `capabilities`: per-browser W3C capabilities
//! - `launcher`: the `SessionLauncher` seam and its real implementation
//! - `factory`: `DriverFactory`, which caches the session
//!
//! ## Example
//! ```rust,no_run
//! use sentinel::config::Configuration;
//! use sentinel::driver::{DriverFactory, WebDriverLauncher};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Configuration::from_pairs([("browser", "chrome"), ("os", "linux")])?;
//! let factory = DriverFactory::new(config, Arc::new(WebDriverLauncher::new()));
//! let session = factory.instantiate().await?;
//! session.navigate("https://example.com").await?;
//! factory.quit().await?;
//! # Ok(())
//! # }
//! ```

pub mod platform;
pub mod capabilities;
pub mod launcher;
pub mod factory;

#[cfg(test)]
mod tests;

pub use platform::{normalize_browser, normalize_os, Browser, OperatingSystem};
pub use capabilities::{local_capabilities, remote_capabilities, BrowserOptions, GridOptions};
pub use launcher::{LocalDriverSpec, RemoteGridSpec, SessionLauncher, WebDriverLauncher};
pub use factory::{DriverFactory, DEFAULT_DRIVERS_ROOT, DEFAULT_GRID_URL, SAFARI_DRIVER_PATH};

//! Sentinel: page-object browser automation over W3C WebDriver
//!
//! This library provides late-binding page elements with retry and wait
//! semantics, plus a driver factory that turns configuration into a live
//! browser session.

pub mod error;
pub mod config;
pub mod downloads;

pub mod webdriver;
pub mod driver;
pub mod elements;

// Re-exports
pub use error::{Error, Result};
pub use config::Configuration;
pub use downloads::DownloadManager;
pub use driver::{DriverFactory, SessionLauncher, WebDriverLauncher};
pub use elements::{Button, Checkbox, Link, PageElement, Radiobutton, Selector, SelectorType, Table, Textbox};
pub use webdriver::{SessionHandle, WebDriverSession};

/// Sentinel library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

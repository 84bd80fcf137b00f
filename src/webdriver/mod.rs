//! # W3C WebDriver layer
//!
//! HTTP client for the W3C WebDriver protocol, plus local driver processes and
//! an in-memory session for tests.
//!
//! ## Module structure
//! - `traits`: the `WebDriverSession` trait every session implements
//! - `types`: locators, element handles, protocol errors, input actions
//! - `client`: reqwest-backed session
//! - `service`: driver binaries run as child processes
//! - `mock`: in-memory session for development and testing
//!
//! ## Example
//! ```rust,no_run
//! use sentinel::webdriver::{HttpWebDriverSession, Locator, WebDriverSession};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let session = HttpWebDriverSession::connect("http://127.0.0.1:9515", serde_json::json!({})).await?;
//! session.navigate("https://example.com").await?;
//! let links = session.find_elements(&Locator::tag_name("a")).await?;
//! println!("{} links", links.len());
//! session.quit().await?;
//! # Ok(())
//! # }
//! ```

pub mod traits;
pub mod types;
pub mod client;
pub mod service;
pub mod mock;

pub use traits::{SessionHandle, WebDriverSession};
pub use types::{
    ElementHandle, ErrorCode, InputSource, KeyAction, Locator, LocatorStrategy,
    PointerAction, PointerParameters, WebDriverError, ELEMENT_KEY,
};

pub use client::HttpWebDriverSession;
pub use service::{DriverService, PortFlag, DEFAULT_STARTUP_TIMEOUT};

pub use mock::{MockNode, MockWebDriverSession};

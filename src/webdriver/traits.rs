//! WebDriver session trait
//!
//! This module defines the abstract interface over one live WebDriver session.
//! Everything above it (elements, tables, the driver factory) talks to a
//! session only through this trait, so the HTTP client and the in-memory mock
//! are interchangeable.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use super::types::{ElementHandle, InputSource, Locator};

/// Shared handle to a live session
pub type SessionHandle = Arc<dyn WebDriverSession>;

/// One live browser-automation session
#[async_trait]
pub trait WebDriverSession: Send + Sync + std::fmt::Debug {
    /// Session id assigned by the endpoint
    fn session_id(&self) -> &str;

    /// Navigate the current browsing context
    async fn navigate(&self, url: &str) -> Result<(), crate::Error>;

    /// Current top-level URL
    async fn current_url(&self) -> Result<String, crate::Error>;

    /// Find all elements matching a locator in the document
    async fn find_elements(&self, locator: &Locator) -> Result<Vec<ElementHandle>, crate::Error>;

    /// Find all elements matching a locator beneath an element
    async fn find_elements_from(
        &self,
        parent: &ElementHandle,
        locator: &Locator,
    ) -> Result<Vec<ElementHandle>, crate::Error>;

    /// Native click
    async fn click(&self, element: &ElementHandle) -> Result<(), crate::Error>;

    /// Native clear
    async fn clear(&self, element: &ElementHandle) -> Result<(), crate::Error>;

    /// Native typing
    async fn send_keys(&self, element: &ElementHandle, text: &str) -> Result<(), crate::Error>;

    /// Rendered text
    async fn text(&self, element: &ElementHandle) -> Result<String, crate::Error>;

    /// Attribute value, `None` when absent
    async fn attribute(&self, element: &ElementHandle, name: &str) -> Result<Option<String>, crate::Error>;

    /// Lower-case tag name
    async fn tag_name(&self, element: &ElementHandle) -> Result<String, crate::Error>;

    async fn is_enabled(&self, element: &ElementHandle) -> Result<bool, crate::Error>;

    async fn is_displayed(&self, element: &ElementHandle) -> Result<bool, crate::Error>;

    async fn is_selected(&self, element: &ElementHandle) -> Result<bool, crate::Error>;

    /// Execute a synchronous script; elements are passed as [`ElementHandle::to_json`]
    async fn execute_script(&self, script: &str, args: Vec<Value>) -> Result<Value, crate::Error>;

    /// Dispatch a sequence of input actions
    async fn perform_actions(&self, sources: Vec<InputSource>) -> Result<(), crate::Error>;

    /// Release all pressed keys and buttons
    async fn release_actions(&self) -> Result<(), crate::Error>;

    /// End the session
    async fn quit(&self) -> Result<(), crate::Error>;
}

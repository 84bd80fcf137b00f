//! Mock WebDriver session for testing
//!
//! An in-memory page: nodes are registered together with the locators that
//! should find them, and can be told to misbehave (appear late, go stale,
//! refuse native clicks) so the retry paths above can be exercised without a
//! browser.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::traits::WebDriverSession;
use super::types::*;
use crate::Error;

/// One element of the mock page
#[derive(Debug, Clone, Default)]
pub struct MockNode {
    pub tag: String,
    pub text: String,
    pub value: String,
    pub attributes: HashMap<String, String>,
    pub enabled: bool,
    pub displayed: bool,
    pub selected: bool,
    /// Locators that find this node
    pub locators: Vec<Locator>,
    /// Native and scripted clicks received
    pub clicks: u32,
    /// Lookups that miss before the node shows up
    pub appears_after: u32,
    /// Error returned by every native click
    pub native_click_error: Option<ErrorCode>,
    /// Whether scripted clicks fail
    pub script_click_fails: bool,
    /// State queries answered with a stale reference before succeeding
    pub stale_checks: u32,
}

impl MockNode {
    /// Create a visible, enabled node
    pub fn new<S: Into<String>>(tag: S) -> Self {
        Self {
            tag: tag.into(),
            enabled: true,
            displayed: true,
            ..Default::default()
        }
    }

    pub fn matching(mut self, locator: Locator) -> Self {
        self.locators.push(locator);
        self
    }

    pub fn with_text<S: Into<String>>(mut self, text: S) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_attribute<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.displayed = false;
        self
    }

    pub fn appears_after(mut self, lookups: u32) -> Self {
        self.appears_after = lookups;
        self
    }

    pub fn failing_native_click(mut self, code: ErrorCode) -> Self {
        self.native_click_error = Some(code);
        self
    }

    pub fn failing_script_click(mut self) -> Self {
        self.script_click_fails = true;
        self
    }

    pub fn stale_for(mut self, checks: u32) -> Self {
        self.stale_checks = checks;
        self
    }
}

#[derive(Debug, Default)]
struct MockPage {
    /// Insertion order is document order
    nodes: Vec<(ElementHandle, MockNode)>,
    parents: HashMap<ElementHandle, ElementHandle>,
    commands: Vec<String>,
    actions: Vec<InputSource>,
    url: String,
    actions_fail: bool,
    quit: bool,
}

impl MockPage {
    fn node_mut(&mut self, handle: &ElementHandle) -> Result<&mut MockNode, Error> {
        self.nodes
            .iter_mut()
            .find(|(h, _)| h == handle)
            .map(|(_, n)| n)
            .ok_or_else(|| {
                WebDriverError::new(
                    ErrorCode::StaleElementReference,
                    format!("element {} is no longer attached to the DOM", handle),
                )
                .into()
            })
    }

    fn is_descendant(&self, node: &ElementHandle, ancestor: &ElementHandle) -> bool {
        let mut current = self.parents.get(node);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.parents.get(parent);
        }
        false
    }

    fn lookup(&mut self, locator: &Locator, within: Option<&ElementHandle>) -> Vec<ElementHandle> {
        let candidates: Vec<ElementHandle> = self
            .nodes
            .iter()
            .filter(|(h, n)| {
                n.locators.contains(locator)
                    && within.map_or(true, |parent| self.is_descendant(h, parent))
            })
            .map(|(h, _)| h.clone())
            .collect();

        let mut found = Vec::new();
        for handle in candidates {
            if let Ok(node) = self.node_mut(&handle) {
                if node.appears_after > 0 {
                    node.appears_after -= 1;
                } else {
                    found.push(handle);
                }
            }
        }
        found
    }

    fn state_query(&mut self, handle: &ElementHandle) -> Result<&mut MockNode, Error> {
        let node = self.node_mut(handle)?;
        if node.stale_checks > 0 {
            node.stale_checks -= 1;
            return Err(WebDriverError::new(ErrorCode::StaleElementReference, "element went stale").into());
        }
        Ok(node)
    }
}

/// In-memory WebDriver session
#[derive(Debug)]
pub struct MockWebDriverSession {
    id: String,
    page: Mutex<MockPage>,
}

impl MockWebDriverSession {
    /// Create an empty mock page
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            page: Mutex::new(MockPage {
                url: "about:blank".to_string(),
                ..Default::default()
            }),
        }
    }

    /// Attach a node at document level
    pub async fn add(&self, node: MockNode) -> ElementHandle {
        let handle = ElementHandle::new(Uuid::new_v4().to_string());
        self.page.lock().await.nodes.push((handle.clone(), node));
        handle
    }

    /// Attach a node beneath `parent`
    pub async fn add_child(&self, parent: &ElementHandle, node: MockNode) -> ElementHandle {
        let handle = ElementHandle::new(Uuid::new_v4().to_string());
        let mut page = self.page.lock().await;
        page.nodes.push((handle.clone(), node));
        page.parents.insert(handle.clone(), parent.clone());
        handle
    }

    /// Detach a node; later commands on it report a stale reference
    pub async fn remove(&self, handle: &ElementHandle) {
        self.page.lock().await.nodes.retain(|(h, _)| h != handle);
    }

    /// Snapshot of a node for assertions
    pub async fn node(&self, handle: &ElementHandle) -> Option<MockNode> {
        self.page
            .lock()
            .await
            .nodes
            .iter()
            .find(|(h, _)| h == handle)
            .map(|(_, n)| n.clone())
    }

    /// Edit a node in place
    pub async fn update<F: FnOnce(&mut MockNode)>(&self, handle: &ElementHandle, edit: F) {
        if let Ok(node) = self.page.lock().await.node_mut(handle) {
            edit(node);
        }
    }

    /// Commands received so far, e.g. `click:<id>`
    pub async fn commands(&self) -> Vec<String> {
        self.page.lock().await.commands.clone()
    }

    /// Input sources passed to `perform_actions`
    pub async fn performed_actions(&self) -> Vec<InputSource> {
        self.page.lock().await.actions.clone()
    }

    /// Make every `perform_actions` call fail
    pub async fn fail_actions(&self) {
        self.page.lock().await.actions_fail = true;
    }

    pub async fn is_quit(&self) -> bool {
        self.page.lock().await.quit
    }
}

impl Default for MockWebDriverSession {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WebDriverSession for MockWebDriverSession {
    fn session_id(&self) -> &str {
        &self.id
    }

    async fn navigate(&self, url: &str) -> Result<(), Error> {
        let mut page = self.page.lock().await;
        page.commands.push(format!("navigate:{}", url));
        page.url = url.to_string();
        Ok(())
    }

    async fn current_url(&self) -> Result<String, Error> {
        Ok(self.page.lock().await.url.clone())
    }

    async fn find_elements(&self, locator: &Locator) -> Result<Vec<ElementHandle>, Error> {
        let mut page = self.page.lock().await;
        page.commands.push(format!("find:{}", locator));
        Ok(page.lookup(locator, None))
    }

    async fn find_elements_from(
        &self,
        parent: &ElementHandle,
        locator: &Locator,
    ) -> Result<Vec<ElementHandle>, Error> {
        let mut page = self.page.lock().await;
        page.node_mut(parent)?;
        page.commands.push(format!("find-from:{}:{}", parent, locator));
        Ok(page.lookup(locator, Some(parent)))
    }

    async fn click(&self, element: &ElementHandle) -> Result<(), Error> {
        let mut page = self.page.lock().await;
        page.commands.push(format!("click:{}", element));
        let node = page.node_mut(element)?;
        if let Some(code) = node.native_click_error.clone() {
            return Err(WebDriverError::new(code, "native click refused").into());
        }
        node.clicks += 1;
        if node.tag == "input" {
            node.selected = !node.selected;
        }
        Ok(())
    }

    async fn clear(&self, element: &ElementHandle) -> Result<(), Error> {
        let mut page = self.page.lock().await;
        page.commands.push(format!("clear:{}", element));
        let node = page.node_mut(element)?;
        node.value.clear();
        node.selected = false;
        Ok(())
    }

    async fn send_keys(&self, element: &ElementHandle, text: &str) -> Result<(), Error> {
        let mut page = self.page.lock().await;
        page.commands.push(format!("send-keys:{}:{}", element, text));
        page.node_mut(element)?.value.push_str(text);
        Ok(())
    }

    async fn text(&self, element: &ElementHandle) -> Result<String, Error> {
        Ok(self.page.lock().await.node_mut(element)?.text.clone())
    }

    async fn attribute(&self, element: &ElementHandle, name: &str) -> Result<Option<String>, Error> {
        let mut page = self.page.lock().await;
        let node = page.node_mut(element)?;
        if let Some(value) = node.attributes.get(name) {
            return Ok(Some(value.clone()));
        }
        if name == "value" && !node.value.is_empty() {
            return Ok(Some(node.value.clone()));
        }
        Ok(None)
    }

    async fn tag_name(&self, element: &ElementHandle) -> Result<String, Error> {
        Ok(self.page.lock().await.node_mut(element)?.tag.clone())
    }

    async fn is_enabled(&self, element: &ElementHandle) -> Result<bool, Error> {
        Ok(self.page.lock().await.state_query(element)?.enabled)
    }

    async fn is_displayed(&self, element: &ElementHandle) -> Result<bool, Error> {
        Ok(self.page.lock().await.state_query(element)?.displayed)
    }

    async fn is_selected(&self, element: &ElementHandle) -> Result<bool, Error> {
        Ok(self.page.lock().await.node_mut(element)?.selected)
    }

    async fn execute_script(&self, script: &str, args: Vec<Value>) -> Result<Value, Error> {
        let mut page = self.page.lock().await;
        page.commands.push(format!("script:{}", script));

        let target = args.first().and_then(ElementHandle::from_json);
        let Some(target) = target else {
            return Ok(Value::Null);
        };

        let node = page.node_mut(&target)?;
        if script.contains(".click()") {
            if node.script_click_fails {
                return Err(WebDriverError::new(ErrorCode::JavascriptError, "scripted click failed").into());
            }
            node.clicks += 1;
        } else if script.contains(".value") {
            node.value = args
                .get(1)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();
        }
        Ok(Value::Null)
    }

    async fn perform_actions(&self, sources: Vec<InputSource>) -> Result<(), Error> {
        let mut page = self.page.lock().await;
        if page.actions_fail {
            return Err(WebDriverError::new(ErrorCode::UnknownError, "input dispatch failed").into());
        }
        page.commands.push("actions".to_string());
        page.actions.extend(sources);
        Ok(())
    }

    async fn release_actions(&self) -> Result<(), Error> {
        self.page.lock().await.commands.push("release-actions".to_string());
        Ok(())
    }

    async fn quit(&self) -> Result<(), Error> {
        self.page.lock().await.quit = true;
        Ok(())
    }
}

//! WebDriver HTTP client implementation
//!
//! This module speaks the W3C WebDriver wire protocol over HTTP with reqwest.

use async_trait::async_trait;
use reqwest::Method;
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::service::DriverService;
use super::traits::WebDriverSession;
use super::types::*;
use crate::Error;

/// WebDriver session backed by an HTTP endpoint
#[derive(Debug)]
pub struct HttpWebDriverSession {
    /// HTTP client
    http: reqwest::Client,
    /// Endpoint base URL without trailing slash
    endpoint: String,
    /// Session id assigned by the endpoint
    session_id: String,
    /// Capabilities echoed by the endpoint
    capabilities: Value,
    /// Local driver process, when this crate started one
    service: Mutex<Option<DriverService>>,
}

impl HttpWebDriverSession {
    /// Open a new session on a running endpoint
    ///
    /// # Arguments
    /// * `endpoint` - WebDriver base URL (e.g., "http://127.0.0.1:9515")
    /// * `capabilities` - W3C `alwaysMatch` capabilities
    pub async fn connect<S: Into<String>>(endpoint: S, capabilities: Value) -> Result<Self, Error> {
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        info!("Creating WebDriver session at {}", endpoint);

        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| Error::internal(format!("Failed to create HTTP client: {}", e)))?;

        let response = http
            .post(format!("{}/session", endpoint))
            .json(&json!({ "capabilities": { "alwaysMatch": capabilities } }))
            .send()
            .await?;
        let value = Self::unpack(response).await?;
        let created: NewSessionResponse = serde_json::from_value(value)?;

        info!("WebDriver session {} created", created.session_id);

        Ok(Self {
            http,
            endpoint,
            session_id: created.session_id,
            capabilities: created.capabilities,
            service: Mutex::new(None),
        })
    }

    /// Start a local driver binary and open a session on it
    pub async fn launch(service: DriverService, capabilities: Value) -> Result<Self, Error> {
        let session = Self::connect(service.url(), capabilities).await?;
        *session.service.lock().await = Some(service);
        Ok(session)
    }

    /// Capabilities the endpoint reported for this session
    pub fn capabilities(&self) -> &Value {
        &self.capabilities
    }

    /// Endpoint base URL
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Turn an HTTP response into the `value` payload or a protocol error
    async fn unpack(response: reqwest::Response) -> Result<Value, Error> {
        let status = response.status();
        let body: Value = response.json().await?;
        let value = body.get("value").cloned().unwrap_or(Value::Null);

        if status.is_success() {
            return Ok(value);
        }

        let err = WebDriverError::from_value(&value).unwrap_or_else(|| {
            WebDriverError::new(
                ErrorCode::UnknownError,
                format!("HTTP {} without a WebDriver error body", status),
            )
        });
        debug!("WebDriver command failed: {}", err);
        Err(err.into())
    }

    /// Send a session-scoped command
    async fn command(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value, Error> {
        let url = format!("{}/session/{}{}", self.endpoint, self.session_id, path);
        debug!("{} {}", method, url);

        let request = self.http.request(method, &url);
        let request = match body {
            Some(body) => request.json(&body),
            None => request,
        };

        let response = request.send().await?;
        Self::unpack(response).await
    }

    fn element_list(value: Value) -> Result<Vec<ElementHandle>, Error> {
        value
            .as_array()
            .ok_or_else(|| Error::internal("Expected an array of elements"))?
            .iter()
            .map(|v| {
                ElementHandle::from_json(v)
                    .ok_or_else(|| Error::internal(format!("Malformed element reference: {}", v)))
            })
            .collect()
    }

    fn expect_bool(value: Value) -> Result<bool, Error> {
        value
            .as_bool()
            .ok_or_else(|| Error::internal(format!("Expected a boolean, got {}", value)))
    }

    fn expect_string(value: Value) -> Result<String, Error> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(Error::internal(format!("Expected a string, got {}", other))),
        }
    }
}

#[async_trait]
impl WebDriverSession for HttpWebDriverSession {
    fn session_id(&self) -> &str {
        &self.session_id
    }

    async fn navigate(&self, url: &str) -> Result<(), Error> {
        info!("Navigating to {}", url);
        self.command(Method::POST, "/url", Some(json!({ "url": url })))
            .await?;
        Ok(())
    }

    async fn current_url(&self) -> Result<String, Error> {
        let value = self.command(Method::GET, "/url", None).await?;
        Self::expect_string(value)
    }

    async fn find_elements(&self, locator: &Locator) -> Result<Vec<ElementHandle>, Error> {
        let value = self
            .command(Method::POST, "/elements", Some(serde_json::to_value(locator)?))
            .await?;
        Self::element_list(value)
    }

    async fn find_elements_from(
        &self,
        parent: &ElementHandle,
        locator: &Locator,
    ) -> Result<Vec<ElementHandle>, Error> {
        let path = format!("/element/{}/elements", parent.id());
        let value = self
            .command(Method::POST, &path, Some(serde_json::to_value(locator)?))
            .await?;
        Self::element_list(value)
    }

    async fn click(&self, element: &ElementHandle) -> Result<(), Error> {
        let path = format!("/element/{}/click", element.id());
        self.command(Method::POST, &path, Some(json!({}))).await?;
        Ok(())
    }

    async fn clear(&self, element: &ElementHandle) -> Result<(), Error> {
        let path = format!("/element/{}/clear", element.id());
        self.command(Method::POST, &path, Some(json!({}))).await?;
        Ok(())
    }

    async fn send_keys(&self, element: &ElementHandle, text: &str) -> Result<(), Error> {
        let path = format!("/element/{}/value", element.id());
        self.command(Method::POST, &path, Some(json!({ "text": text })))
            .await?;
        Ok(())
    }

    async fn text(&self, element: &ElementHandle) -> Result<String, Error> {
        let path = format!("/element/{}/text", element.id());
        let value = self.command(Method::GET, &path, None).await?;
        Self::expect_string(value)
    }

    async fn attribute(&self, element: &ElementHandle, name: &str) -> Result<Option<String>, Error> {
        let path = format!("/element/{}/attribute/{}", element.id(), name);
        match self.command(Method::GET, &path, None).await? {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s)),
            other => Ok(Some(other.to_string())),
        }
    }

    async fn tag_name(&self, element: &ElementHandle) -> Result<String, Error> {
        let path = format!("/element/{}/name", element.id());
        let value = self.command(Method::GET, &path, None).await?;
        Ok(Self::expect_string(value)?.to_lowercase())
    }

    async fn is_enabled(&self, element: &ElementHandle) -> Result<bool, Error> {
        let path = format!("/element/{}/enabled", element.id());
        Self::expect_bool(self.command(Method::GET, &path, None).await?)
    }

    async fn is_displayed(&self, element: &ElementHandle) -> Result<bool, Error> {
        let path = format!("/element/{}/displayed", element.id());
        Self::expect_bool(self.command(Method::GET, &path, None).await?)
    }

    async fn is_selected(&self, element: &ElementHandle) -> Result<bool, Error> {
        let path = format!("/element/{}/selected", element.id());
        Self::expect_bool(self.command(Method::GET, &path, None).await?)
    }

    async fn execute_script(&self, script: &str, args: Vec<Value>) -> Result<Value, Error> {
        debug!("Executing script: {}", script);
        self.command(
            Method::POST,
            "/execute/sync",
            Some(json!({ "script": script, "args": args })),
        )
        .await
    }

    async fn perform_actions(&self, sources: Vec<InputSource>) -> Result<(), Error> {
        self.command(Method::POST, "/actions", Some(json!({ "actions": sources })))
            .await?;
        Ok(())
    }

    async fn release_actions(&self) -> Result<(), Error> {
        self.command(Method::DELETE, "/actions", None).await?;
        Ok(())
    }

    async fn quit(&self) -> Result<(), Error> {
        info!("Ending WebDriver session {}", self.session_id);
        let result = self.command(Method::DELETE, "", None).await;

        if let Some(mut service) = self.service.lock().await.take() {
            if let Err(e) = service.stop().await {
                warn!("Failed to stop driver process: {}", e);
            }
        }

        result.map(|_| ())
    }
}

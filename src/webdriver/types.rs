//! W3C WebDriver type definitions
//!
//! This module defines the core data structures exchanged with a WebDriver endpoint.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Web element identifier key defined by the W3C specification
pub const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Location strategy understood by a W3C endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LocatorStrategy {
    #[serde(rename = "css selector")]
    Css,
    #[serde(rename = "link text")]
    LinkText,
    #[serde(rename = "partial link text")]
    PartialLinkText,
    #[serde(rename = "tag name")]
    TagName,
    #[serde(rename = "xpath")]
    XPath,
}

impl LocatorStrategy {
    /// Wire name of the strategy
    pub fn as_str(&self) -> &'static str {
        match self {
            LocatorStrategy::Css => "css selector",
            LocatorStrategy::LinkText => "link text",
            LocatorStrategy::PartialLinkText => "partial link text",
            LocatorStrategy::TagName => "tag name",
            LocatorStrategy::XPath => "xpath",
        }
    }
}

/// A native locator: strategy plus selector text
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    /// Strategy
    pub using: LocatorStrategy,
    /// Selector text
    pub value: String,
}

impl Locator {
    pub fn css<S: Into<String>>(value: S) -> Self {
        Self {
            using: LocatorStrategy::Css,
            value: value.into(),
        }
    }

    pub fn xpath<S: Into<String>>(value: S) -> Self {
        Self {
            using: LocatorStrategy::XPath,
            value: value.into(),
        }
    }

    pub fn link_text<S: Into<String>>(value: S) -> Self {
        Self {
            using: LocatorStrategy::LinkText,
            value: value.into(),
        }
    }

    pub fn partial_link_text<S: Into<String>>(value: S) -> Self {
        Self {
            using: LocatorStrategy::PartialLinkText,
            value: value.into(),
        }
    }

    pub fn tag_name<S: Into<String>>(value: S) -> Self {
        Self {
            using: LocatorStrategy::TagName,
            value: value.into(),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.using.as_str(), self.value)
    }
}

/// Reference to an element living in a remote session
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementHandle(String);

impl ElementHandle {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    /// Remote element id
    pub fn id(&self) -> &str {
        &self.0
    }

    /// JSON form used as a script argument or action origin
    pub fn to_json(&self) -> Value {
        let mut map = serde_json::Map::new();
        map.insert(ELEMENT_KEY.to_string(), Value::String(self.0.clone()));
        Value::Object(map)
    }

    /// Parse a JSON web element reference
    pub fn from_json(value: &Value) -> Option<Self> {
        value
            .get(ELEMENT_KEY)
            .and_then(|v| v.as_str())
            .map(Self::new)
    }
}

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// W3C error codes this crate distinguishes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCode {
    NoSuchElement,
    StaleElementReference,
    ElementNotInteractable,
    ElementClickIntercepted,
    InvalidSelector,
    InvalidArgument,
    JavascriptError,
    SessionNotCreated,
    InvalidSessionId,
    Timeout,
    UnknownCommand,
    UnknownError,
    Other(String),
}

impl ErrorCode {
    /// Parse the `error` field of a W3C error body
    pub fn from_wire(code: &str) -> Self {
        match code {
            "no such element" => ErrorCode::NoSuchElement,
            "stale element reference" => ErrorCode::StaleElementReference,
            "element not interactable" => ErrorCode::ElementNotInteractable,
            "element click intercepted" => ErrorCode::ElementClickIntercepted,
            "invalid selector" => ErrorCode::InvalidSelector,
            "invalid argument" => ErrorCode::InvalidArgument,
            "javascript error" => ErrorCode::JavascriptError,
            "session not created" => ErrorCode::SessionNotCreated,
            "invalid session id" => ErrorCode::InvalidSessionId,
            "timeout" | "script timeout" => ErrorCode::Timeout,
            "unknown command" => ErrorCode::UnknownCommand,
            "unknown error" => ErrorCode::UnknownError,
            other => ErrorCode::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ErrorCode::NoSuchElement => "no such element",
            ErrorCode::StaleElementReference => "stale element reference",
            ErrorCode::ElementNotInteractable => "element not interactable",
            ErrorCode::ElementClickIntercepted => "element click intercepted",
            ErrorCode::InvalidSelector => "invalid selector",
            ErrorCode::InvalidArgument => "invalid argument",
            ErrorCode::JavascriptError => "javascript error",
            ErrorCode::SessionNotCreated => "session not created",
            ErrorCode::InvalidSessionId => "invalid session id",
            ErrorCode::Timeout => "timeout",
            ErrorCode::UnknownCommand => "unknown command",
            ErrorCode::UnknownError => "unknown error",
            ErrorCode::Other(code) => code,
        }
    }
}

/// Error body returned by a WebDriver endpoint
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{} ({message})", .code.as_str())]
pub struct WebDriverError {
    /// Classified error code
    pub code: ErrorCode,
    /// Human readable message
    pub message: String,
}

impl WebDriverError {
    pub fn new<S: Into<String>>(code: ErrorCode, message: S) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Parse the `value` object of a failed response
    pub fn from_value(value: &Value) -> Option<Self> {
        let code = value.get("error")?.as_str()?;
        let message = value
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or_default();
        Some(Self::new(ErrorCode::from_wire(code), message))
    }

    pub fn is_no_such_element(&self) -> bool {
        self.code == ErrorCode::NoSuchElement
    }

    pub fn is_stale_element(&self) -> bool {
        self.code == ErrorCode::StaleElementReference
    }
}

/// New session response payload
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSessionResponse {
    pub session_id: String,
    #[serde(default)]
    pub capabilities: Value,
}

/// One input source for the actions endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InputSource {
    Key {
        id: String,
        actions: Vec<KeyAction>,
    },
    Pointer {
        id: String,
        parameters: PointerParameters,
        actions: Vec<PointerAction>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PointerParameters {
    pub pointer_type: String,
}

impl Default for PointerParameters {
    fn default() -> Self {
        Self {
            pointer_type: "mouse".to_string(),
        }
    }
}

/// Key input action
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum KeyAction {
    KeyDown { value: String },
    KeyUp { value: String },
    Pause { duration: u64 },
}

/// Pointer input action
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PointerAction {
    PointerMove {
        duration: u64,
        origin: Value,
        x: i64,
        y: i64,
    },
    Pause {
        duration: u64,
    },
}

impl PointerAction {
    /// Move the pointer to the centre of an element
    pub fn move_to(element: &ElementHandle) -> Self {
        PointerAction::PointerMove {
            duration: 0,
            origin: element.to_json(),
            x: 0,
            y: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_code_parsing() {
        assert_eq!(ErrorCode::from_wire("no such element"), ErrorCode::NoSuchElement);
        assert_eq!(
            ErrorCode::from_wire("stale element reference"),
            ErrorCode::StaleElementReference
        );
        assert_eq!(
            ErrorCode::from_wire("unable to set cookie"),
            ErrorCode::Other("unable to set cookie".to_string())
        );
    }

    #[test]
    fn test_error_from_value() {
        let body = json!({"error": "no such element", "message": "nope", "stacktrace": ""});
        let err = WebDriverError::from_value(&body).unwrap();
        assert!(err.is_no_such_element());
        assert_eq!(err.to_string(), "no such element (nope)");

        assert!(WebDriverError::from_value(&json!({"ready": true})).is_none());
    }

    #[test]
    fn test_element_handle_json() {
        let handle = ElementHandle::new("abc");
        let value = handle.to_json();
        assert_eq!(value[ELEMENT_KEY], "abc");
        assert_eq!(ElementHandle::from_json(&value), Some(handle));
        assert_eq!(ElementHandle::from_json(&json!({"ELEMENT": "x"})), None);
    }

    #[test]
    fn test_key_source_serialization() {
        let source = InputSource::Key {
            id: "keyboard".to_string(),
            actions: vec![
                KeyAction::KeyDown { value: "a".to_string() },
                KeyAction::KeyUp { value: "a".to_string() },
            ],
        };
        let value = serde_json::to_value(&source).unwrap();
        assert_eq!(value["type"], "key");
        assert_eq!(value["actions"][0]["type"], "keyDown");
        assert_eq!(value["actions"][1]["value"], "a");
    }

    #[test]
    fn test_locator_serialization() {
        let value = serde_json::to_value(Locator::css("#submit")).unwrap();
        assert_eq!(value, json!({"using": "css selector", "value": "#submit"}));
    }
}

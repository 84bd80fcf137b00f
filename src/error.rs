//! Unified error types for Sentinel

use thiserror::Error;

use crate::webdriver::types::WebDriverError;

/// Unified Result type
pub type Result<T> = std::result::Result<T, Error>;

/// Remediation text attached to [`Error::DriverNotExecutable`].
pub const DRIVER_NOT_EXECUTABLE_HINT: &str = "The driver does not have execute permissions or cannot be found. \
Make sure it is in the correct location. On linux/mac run chmod +x on the driver. \
If you passed in a location using the driver configuration key, ensure the path is correct and the driver is executable.";

/// Unified error type for Sentinel
#[derive(Error, Debug)]
pub enum Error {
    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP transport errors talking to a driver
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Errors reported by the WebDriver endpoint
    #[error("WebDriver error: {0}")]
    WebDriver(#[from] WebDriverError),

    /// A required configuration key is absent
    #[error("Configuration value for '{0}' not found. Set it in the configuration file, as a SENTINEL_ environment variable, or as an override.")]
    MissingRequiredConfiguration(String),

    /// Configuration could not be read or parsed
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Browser name matched none of the supported browsers
    #[error("Invalid browser type '{0}' passed to the driver factory. Check your spelling. Valid options are chrome, firefox, internetexplorer (ie) and safari.")]
    UnsupportedBrowser(String),

    /// Selector strategy name matched none of the supported strategies
    #[error("Unhandled selector type \"{0}\". Valid options are id, name, class, css, xpath, text and partialtext.")]
    UnsupportedSelector(String),

    /// The browser cannot run on the configured operating system
    #[error("Invalid operating system '{os}' passed to the driver factory for the {browser} driver.")]
    IncompatibleOsBrowserCombination { os: String, browser: String },

    /// Operating system matched none of the supported systems
    #[error("Invalid operating system '{0}' passed to the driver factory. Check your spelling. Valid options are linux, mac and windows.")]
    UnknownOperatingSystem(String),

    /// The driver binary exists in configuration but cannot be run
    #[error("{hint}\n{0}", hint = DRIVER_NOT_EXECUTABLE_HINT)]
    DriverNotExecutable(String),

    /// Any other failure while constructing a driver session
    #[error("Failed to create the {browser} driver: {source}")]
    DriverConstructionFailed {
        browser: String,
        #[source]
        source: Box<Error>,
    },

    /// `current()` called before `instantiate()`
    #[error("WebDriver has not been created. Call instantiate() before current().")]
    NotInitialized,

    /// Element resolution timed out
    #[error("{element_type} element does not exist or is not visible using the {strategy} value \"{value}\". Assure you are on the page you think you are on, and that the element identifier you are using is correct.")]
    ElementNotFound {
        element_type: String,
        strategy: String,
        value: String,
    },

    /// Both the native and the scripted click failed
    #[error("{element_type} element is not visible using the {strategy} value \"{value}\" and cannot be clicked. Make sure the element is visible on the page when you attempt to click it. Clicking was attempted once natively and once by script. The total wait time was {waited_secs:.1} seconds.")]
    ElementNotClickable {
        element_type: String,
        strategy: String,
        value: String,
        waited_secs: f64,
    },

    /// Key press simulation failed
    #[error("Key press failed: {0}")]
    KeyPress(String),

    /// No table row matched the request
    #[error("Table row not found: {0}")]
    TableRowNotFound(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new missing configuration error
    pub fn missing_configuration<S: Into<String>>(key: S) -> Self {
        Error::MissingRequiredConfiguration(key.into())
    }

    /// Create a new configuration error
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        Error::Configuration(msg.into())
    }

    /// Create a new incompatible combination error
    pub fn incompatible<O: Into<String>, B: Into<String>>(os: O, browser: B) -> Self {
        Error::IncompatibleOsBrowserCombination {
            os: os.into(),
            browser: browser.into(),
        }
    }

    /// Create a new driver not executable error
    pub fn driver_not_executable<S: Into<String>>(detail: S) -> Self {
        Error::DriverNotExecutable(detail.into())
    }

    /// Wrap a construction failure for the named browser
    pub fn construction_failed<S: Into<String>>(browser: S, source: Error) -> Self {
        Error::DriverConstructionFailed {
            browser: browser.into(),
            source: Box::new(source),
        }
    }

    /// Create a new key press error
    pub fn key_press<S: Into<String>>(msg: S) -> Self {
        Error::KeyPress(msg.into())
    }

    /// Create a new table row error
    pub fn table_row_not_found<S: Into<String>>(msg: S) -> Self {
        Error::TableRowNotFound(msg.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Error::Internal(msg.into())
    }

    /// True when the endpoint reported a stale element reference
    pub fn is_stale_element(&self) -> bool {
        matches!(self, Error::WebDriver(e) if e.is_stale_element())
    }

    /// True when the endpoint reported that no element matched
    pub fn is_no_such_element(&self) -> bool {
        matches!(self, Error::WebDriver(e) if e.is_no_such_element())
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Error::Configuration(err.to_string())
    }
}

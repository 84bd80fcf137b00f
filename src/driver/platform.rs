//! Browser and operating system names
//!
//! Configuration values are free-form strings. They are normalised by
//! stripping all whitespace, lower-casing, and resolving aliases.

use phf::phf_map;
use std::fmt;
use std::str::FromStr;

use crate::webdriver::PortFlag;
use crate::{Error, Result};

static BROWSER_ALIASES: phf::Map<&'static str, &'static str> = phf_map! {
    "ie" => "internetexplorer",
};

static OS_ALIASES: phf::Map<&'static str, &'static str> = phf_map! {
    "osx" => "mac",
    "macintosh" => "mac",
    "win" => "windows",
};

fn squash(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

/// Normalise a browser name (`" IE "` becomes `internetexplorer`)
pub fn normalize_browser(raw: &str) -> String {
    let name = squash(raw);
    match BROWSER_ALIASES.get(name.as_str()) {
        Some(alias) => alias.to_string(),
        None => name,
    }
}

/// Normalise an operating system name (`"OSX"` becomes `mac`)
pub fn normalize_os(raw: &str) -> String {
    let name = squash(raw);
    match OS_ALIASES.get(name.as_str()) {
        Some(alias) => alias.to_string(),
        None => name,
    }
}

/// Supported browsers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Browser {
    Chrome,
    Firefox,
    InternetExplorer,
    Safari,
}

impl Browser {
    pub const ALL: [Browser; 4] = [
        Browser::Chrome,
        Browser::Firefox,
        Browser::InternetExplorer,
        Browser::Safari,
    ];

    /// Normalised configuration name
    pub fn name(&self) -> &'static str {
        match self {
            Browser::Chrome => "chrome",
            Browser::Firefox => "firefox",
            Browser::InternetExplorer => "internetexplorer",
            Browser::Safari => "safari",
        }
    }

    /// Whether the browser can run on `os`
    pub fn supports(&self, os: OperatingSystem) -> bool {
        match self {
            Browser::Chrome | Browser::Firefox => true,
            Browser::InternetExplorer => os == OperatingSystem::Windows,
            Browser::Safari => os == OperatingSystem::Mac,
        }
    }

    /// File name of the bundled driver binary for `os`
    pub fn driver_binary(&self, os: OperatingSystem) -> String {
        let stem = match self {
            Browser::Chrome => "chromedriver",
            Browser::Firefox => "geckodriver",
            Browser::InternetExplorer => "IEDriverServer",
            Browser::Safari => "safaridriver",
        };
        match os {
            OperatingSystem::Windows => format!("{}.exe", stem),
            _ => stem.to_string(),
        }
    }

    /// How the driver binary takes its port
    pub fn port_flag(&self) -> PortFlag {
        match self {
            Browser::Chrome => PortFlag::DoubleDashEquals,
            Browser::Firefox => PortFlag::DoubleDashSpace,
            Browser::InternetExplorer => PortFlag::Slash,
            Browser::Safari => PortFlag::Short,
        }
    }

    /// Check that this browser runs on the normalised `os` value
    pub fn check_os(&self, os: &str) -> Result<OperatingSystem> {
        match os.parse::<OperatingSystem>() {
            Ok(known) if self.supports(known) => Ok(known),
            Ok(known) => Err(Error::incompatible(known.name(), self.name())),
            Err(_) => Err(Error::UnknownOperatingSystem(os.to_string())),
        }
    }
}

impl FromStr for Browser {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        match normalize_browser(raw).as_str() {
            "chrome" => Ok(Browser::Chrome),
            "firefox" => Ok(Browser::Firefox),
            "internetexplorer" => Ok(Browser::InternetExplorer),
            "safari" => Ok(Browser::Safari),
            other => Err(Error::UnsupportedBrowser(other.to_string())),
        }
    }
}

impl fmt::Display for Browser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Supported operating systems
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatingSystem {
    Linux,
    Mac,
    Windows,
}

impl OperatingSystem {
    pub const ALL: [OperatingSystem; 3] = [
        OperatingSystem::Linux,
        OperatingSystem::Mac,
        OperatingSystem::Windows,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            OperatingSystem::Linux => "linux",
            OperatingSystem::Mac => "mac",
            OperatingSystem::Windows => "windows",
        }
    }
}

impl FromStr for OperatingSystem {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        match normalize_os(raw).as_str() {
            "linux" => Ok(OperatingSystem::Linux),
            "mac" => Ok(OperatingSystem::Mac),
            "windows" => Ok(OperatingSystem::Windows),
            other => Err(Error::UnknownOperatingSystem(other.to_string())),
        }
    }
}

impl fmt::Display for OperatingSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browser_normalization() {
        for raw in [" IE ", "ie", "Ie", "Internet Explorer", "internetexplorer"] {
            assert_eq!(normalize_browser(raw), "internetexplorer", "input {:?}", raw);
        }
        assert_eq!(normalize_browser("  Chrome\t"), "chrome");
    }

    #[test]
    fn test_os_normalization() {
        for raw in ["OSX", "osx", "Macintosh", "mac", " M a c "] {
            assert_eq!(normalize_os(raw), "mac", "input {:?}", raw);
        }
        assert_eq!(normalize_os("Win"), "windows");
        assert_eq!(normalize_os("LINUX"), "linux");
    }

    #[test]
    fn test_normalization_is_idempotent() {
        for raw in [" IE ", "Firefox", "safari ", "netscape"] {
            let once = normalize_browser(raw);
            assert_eq!(normalize_browser(&once), once);
        }
        for raw in ["OSX", "win", "Linux", "beos"] {
            let once = normalize_os(raw);
            assert_eq!(normalize_os(&once), once);
        }
    }

    #[test]
    fn test_browser_parse() {
        assert_eq!("IE".parse::<Browser>().unwrap(), Browser::InternetExplorer);
        assert!(matches!(
            "netscape".parse::<Browser>(),
            Err(Error::UnsupportedBrowser(name)) if name == "netscape"
        ));
    }

    #[test]
    fn test_compatibility_matrix() {
        for browser in Browser::ALL {
            for os in OperatingSystem::ALL {
                let excluded = matches!(
                    (browser, os),
                    (Browser::InternetExplorer, OperatingSystem::Linux)
                        | (Browser::InternetExplorer, OperatingSystem::Mac)
                        | (Browser::Safari, OperatingSystem::Linux)
                        | (Browser::Safari, OperatingSystem::Windows)
                );
                assert_eq!(browser.supports(os), !excluded, "{} on {}", browser, os);
            }
        }
    }

    #[test]
    fn test_check_os() {
        assert_eq!(
            Browser::Safari.check_os("mac").unwrap(),
            OperatingSystem::Mac
        );
        assert!(matches!(
            Browser::InternetExplorer.check_os("linux"),
            Err(Error::IncompatibleOsBrowserCombination { os, browser })
                if os == "linux" && browser == "internetexplorer"
        ));
        assert!(matches!(
            Browser::Safari.check_os("beos"),
            Err(Error::UnknownOperatingSystem(os)) if os == "beos"
        ));
    }

    #[test]
    fn test_driver_binary_names() {
        assert_eq!(Browser::Chrome.driver_binary(OperatingSystem::Linux), "chromedriver");
        assert_eq!(
            Browser::InternetExplorer.driver_binary(OperatingSystem::Windows),
            "IEDriverServer.exe"
        );
    }
}

//! W3C capabilities per browser

use serde_json::{json, Map, Value};
use std::path::PathBuf;

use super::platform::Browser;

/// MIME types Firefox saves without prompting
const FIREFOX_SAVE_TO_DISK: &str =
    "application/pdf,application/octet-stream,application/zip,text/csv,text/plain";

/// Settings shared by every local browser
#[derive(Debug, Clone, Default)]
pub struct BrowserOptions {
    /// Run without a visible window (chrome and firefox only)
    pub headless: bool,
    /// Absolute download directory
    pub download_dir: PathBuf,
}

/// Remote grid account and target platform
#[derive(Debug, Clone, Default)]
pub struct GridOptions {
    pub username: String,
    pub access_key: Option<String>,
    pub platform: Option<String>,
    pub browser_version: Option<String>,
}

/// `alwaysMatch` capabilities for a local driver
pub fn local_capabilities(browser: Browser, options: &BrowserOptions) -> Value {
    let download_dir = options.download_dir.to_string_lossy().to_string();

    match browser {
        Browser::Chrome => {
            let mut args = vec!["--disable-extensions".to_string()];
            if options.headless {
                args.push("--headless=new".to_string());
                args.push("--window-size=1920,1080".to_string());
            }
            json!({
                "browserName": "chrome",
                "goog:chromeOptions": {
                    "args": args,
                    "prefs": {
                        "download.default_directory": download_dir,
                        "download.prompt_for_download": false,
                        "plugins.always_open_pdf_externally": true
                    }
                }
            })
        }
        Browser::Firefox => {
            let args: Vec<&str> = if options.headless { vec!["-headless"] } else { vec![] };
            json!({
                "browserName": "firefox",
                "moz:firefoxOptions": {
                    "args": args,
                    "prefs": {
                        "browser.download.folderList": 2,
                        "browser.download.dir": download_dir,
                        "browser.download.useDownloadDir": true,
                        "browser.helperApps.neverAsk.saveToDisk": FIREFOX_SAVE_TO_DISK,
                        "pdfjs.disabled": true
                    }
                }
            })
        }
        Browser::InternetExplorer => json!({
            "browserName": "internet explorer",
            "se:ieOptions": {
                "ignoreZoomSetting": true
            }
        }),
        Browser::Safari => json!({
            "browserName": "safari"
        }),
    }
}

/// `alwaysMatch` capabilities for a remote grid session
pub fn remote_capabilities(browser: &str, grid: &GridOptions) -> Value {
    let mut caps = Map::new();
    caps.insert("browserName".to_string(), json!(browser));
    if let Some(version) = &grid.browser_version {
        caps.insert("browserVersion".to_string(), json!(version));
    }
    if let Some(platform) = &grid.platform {
        caps.insert("platformName".to_string(), json!(platform));
    }

    let mut sauce = Map::new();
    sauce.insert("username".to_string(), json!(grid.username));
    if let Some(key) = &grid.access_key {
        sauce.insert("accessKey".to_string(), json!(key));
    }
    caps.insert("sauce:options".to_string(), Value::Object(sauce));

    Value::Object(caps)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(headless: bool) -> BrowserOptions {
        BrowserOptions {
            headless,
            download_dir: PathBuf::from("/tmp/dl"),
        }
    }

    #[test]
    fn test_ie_ignores_zoom() {
        let caps = local_capabilities(Browser::InternetExplorer, &options(false));
        assert_eq!(caps["se:ieOptions"]["ignoreZoomSetting"], json!(true));
    }

    #[test]
    fn test_chrome_download_and_headless() {
        let caps = local_capabilities(Browser::Chrome, &options(true));
        let chrome = &caps["goog:chromeOptions"];
        assert_eq!(chrome["prefs"]["download.default_directory"], json!("/tmp/dl"));
        let args = chrome["args"].as_array().unwrap();
        assert!(args.iter().any(|a| a == "--headless=new"));

        let windowed = local_capabilities(Browser::Chrome, &options(false));
        let args = windowed["goog:chromeOptions"]["args"].as_array().unwrap();
        assert!(!args.iter().any(|a| a == "--headless=new"));
    }

    #[test]
    fn test_firefox_download_dir() {
        let caps = local_capabilities(Browser::Firefox, &options(true));
        let firefox = &caps["moz:firefoxOptions"];
        assert_eq!(firefox["prefs"]["browser.download.dir"], json!("/tmp/dl"));
        assert_eq!(firefox["args"], json!(["-headless"]));
    }

    #[test]
    fn test_remote_capabilities() {
        let grid = GridOptions {
            username: "sally".into(),
            access_key: Some("k3y".into()),
            platform: Some("Windows 10".into()),
            browser_version: None,
        };
        let caps = remote_capabilities("chrome", &grid);
        assert_eq!(caps["browserName"], json!("chrome"));
        assert_eq!(caps["platformName"], json!("Windows 10"));
        assert!(caps.get("browserVersion").is_none());
        assert_eq!(caps["sauce:options"]["username"], json!("sally"));
        assert_eq!(caps["sauce:options"]["accessKey"], json!("k3y"));
    }
}

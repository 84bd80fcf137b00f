//! Driver factory tests
//!
//! A recording launcher stands in for real driver processes.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::*;
use crate::config::Configuration;
use crate::webdriver::{MockWebDriverSession, SessionHandle};
use crate::{Error, Result};

#[derive(Debug, Default)]
struct RecordingLauncher {
    launches: AtomicUsize,
    local: Mutex<Vec<LocalDriverSpec>>,
    remote: Mutex<Vec<RemoteGridSpec>>,
    fail_with: Option<fn() -> Error>,
}

impl RecordingLauncher {
    fn failing(fail_with: fn() -> Error) -> Self {
        Self {
            fail_with: Some(fail_with),
            ..Default::default()
        }
    }

    fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    fn last_local(&self) -> LocalDriverSpec {
        self.local.lock().unwrap().last().cloned().expect("no local launch")
    }

    fn session(&self) -> Result<SessionHandle> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        match self.fail_with {
            Some(make) => Err(make()),
            None => Ok(Arc::new(MockWebDriverSession::new())),
        }
    }
}

#[async_trait]
impl SessionLauncher for RecordingLauncher {
    async fn launch_local(&self, spec: LocalDriverSpec) -> Result<SessionHandle> {
        self.local.lock().unwrap().push(spec);
        self.session()
    }

    async fn launch_remote(&self, spec: RemoteGridSpec) -> Result<SessionHandle> {
        self.remote.lock().unwrap().push(spec);
        self.session()
    }
}

fn factory(pairs: &[(&str, &str)], launcher: Arc<RecordingLauncher>) -> DriverFactory {
    let config = Configuration::from_pairs(pairs.iter().copied()).unwrap();
    DriverFactory::new(config, launcher)
}

#[tokio::test]
async fn test_instantiate_constructs_once() {
    let launcher = Arc::new(RecordingLauncher::default());
    let factory = factory(&[("browser", "chrome"), ("os", "linux")], launcher.clone());

    let first = factory.instantiate().await.unwrap();
    let second = factory.instantiate().await.unwrap();

    assert_eq!(launcher.launches(), 1);
    assert!(Arc::ptr_eq(&first, &second));
    assert!(Arc::ptr_eq(&first, &factory.current().await.unwrap()));
}

#[tokio::test]
async fn test_concurrent_instantiate_constructs_once() {
    let launcher = Arc::new(RecordingLauncher::default());
    let factory = Arc::new(factory(&[("browser", "firefox"), ("os", "mac")], launcher.clone()));

    let tasks = (0..4).map(|_| {
        let factory = factory.clone();
        tokio::spawn(async move { factory.instantiate().await.map(|s| s.session_id().to_string()) })
    });
    let ids: Vec<String> = futures_util::future::join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.unwrap().unwrap())
        .collect();

    assert!(ids.iter().all(|id| id == &ids[0]));
    assert_eq!(launcher.launches(), 1);
}

#[tokio::test]
async fn test_current_before_instantiate() {
    let launcher = Arc::new(RecordingLauncher::default());
    let factory = factory(&[("browser", "chrome"), ("os", "linux")], launcher);
    assert!(matches!(factory.current().await, Err(Error::NotInitialized)));
}

#[tokio::test]
async fn test_quit_clears_cache() {
    let launcher = Arc::new(RecordingLauncher::default());
    let factory = factory(&[("browser", "chrome"), ("os", "linux")], launcher.clone());

    factory.instantiate().await.unwrap();
    factory.quit().await.unwrap();
    assert!(matches!(factory.current().await, Err(Error::NotInitialized)));

    factory.instantiate().await.unwrap();
    assert_eq!(launcher.launches(), 2);

    // Quitting twice is harmless
    factory.quit().await.unwrap();
    factory.quit().await.unwrap();
}

#[tokio::test]
async fn test_ie_on_linux_is_incompatible() {
    let launcher = Arc::new(RecordingLauncher::default());
    let factory = factory(&[("browser", "IE"), ("os", "linux")], launcher.clone());

    match factory.instantiate().await {
        Err(Error::IncompatibleOsBrowserCombination { os, browser }) => {
            assert_eq!(os, "linux");
            assert_eq!(browser, "internetexplorer");
        }
        other => panic!("expected an incompatible combination, got {:?}", other.map(|_| ())),
    }
    assert_eq!(launcher.launches(), 0);
}

#[tokio::test]
async fn test_os_compatibility_through_factory() {
    let cases = [
        ("safari", "windows", "incompatible"),
        ("safari", "linux", "incompatible"),
        ("safari", "osx", "ok"),
        ("ie", "win", "ok"),
        ("ie", "mac", "incompatible"),
        ("ie", "beos", "unknown"),
        ("chrome", "beos", "unknown"),
        ("Fire Fox", "Windows", "ok"),
        ("netscape", "linux", "unsupported"),
    ];

    for (browser, os, expected) in cases {
        let launcher = Arc::new(RecordingLauncher::default());
        let factory = factory(&[("browser", browser), ("os", os)], launcher);
        let result = factory.instantiate().await.map(|_| ());
        let actual = match result {
            Ok(()) => "ok",
            Err(Error::IncompatibleOsBrowserCombination { .. }) => "incompatible",
            Err(Error::UnknownOperatingSystem(_)) => "unknown",
            Err(Error::UnsupportedBrowser(_)) => "unsupported",
            Err(e) => panic!("unexpected error for {}/{}: {}", browser, os, e),
        };
        assert_eq!(actual, expected, "{} on {}", browser, os);
    }
}

#[tokio::test]
async fn test_missing_required_keys() {
    let launcher = Arc::new(RecordingLauncher::default());

    let no_browser = factory(&[("os", "linux")], launcher.clone());
    assert!(matches!(
        no_browser.instantiate().await,
        Err(Error::MissingRequiredConfiguration(key)) if key == "browser"
    ));

    let no_os = factory(&[("browser", "chrome")], launcher.clone());
    assert!(matches!(
        no_os.instantiate().await,
        Err(Error::MissingRequiredConfiguration(key)) if key == "os"
    ));
    assert_eq!(launcher.launches(), 0);
}

#[tokio::test]
async fn test_bundled_driver_paths() {
    let launcher = Arc::new(RecordingLauncher::default());
    factory(&[("browser", "chrome"), ("os", "linux")], launcher.clone())
        .instantiate()
        .await
        .unwrap();
    assert_eq!(
        launcher.last_local().binary,
        PathBuf::from("src/main/resources/drivers/linux/chromedriver")
    );

    factory(&[("browser", "ie"), ("os", "windows"), ("driversRoot", "/opt/drivers")], launcher.clone())
        .instantiate()
        .await
        .unwrap();
    let spec = launcher.last_local();
    assert_eq!(spec.binary, PathBuf::from("/opt/drivers/windows/IEDriverServer.exe"));
    assert_eq!(spec.capabilities["se:ieOptions"]["ignoreZoomSetting"], true);

    factory(&[("browser", "safari"), ("os", "macintosh")], launcher.clone())
        .instantiate()
        .await
        .unwrap();
    assert_eq!(launcher.last_local().binary, PathBuf::from("/usr/bin/safaridriver"));

    factory(&[("browser", "firefox"), ("os", "mac"), ("driver", "/usr/local/bin/geckodriver")], launcher.clone())
        .instantiate()
        .await
        .unwrap();
    assert_eq!(launcher.last_local().binary, PathBuf::from("/usr/local/bin/geckodriver"));
}

#[tokio::test]
async fn test_download_directory_applied() {
    let launcher = Arc::new(RecordingLauncher::default());
    let factory = factory(
        &[("browser", "chrome"), ("os", "linux"), ("download", "/tmp/sentinel-dl")],
        launcher.clone(),
    );

    factory.instantiate().await.unwrap();

    assert_eq!(
        factory.download_directory().download_directory(),
        PathBuf::from("/tmp/sentinel-dl")
    );
    let caps = launcher.last_local().capabilities;
    assert_eq!(
        caps["goog:chromeOptions"]["prefs"]["download.default_directory"],
        "/tmp/sentinel-dl"
    );
}

#[tokio::test]
async fn test_remote_grid_short_circuits_local_resolution() {
    let launcher = Arc::new(RecordingLauncher::default());
    // No os key and an IE browser: local resolution would fail
    let factory = factory(
        &[
            ("saucelabsUserName", "sally"),
            ("saucelabsAccessKey", "k3y"),
            ("browser", "IE"),
            ("saucelabsPlatform", "Windows 10"),
        ],
        launcher.clone(),
    );

    let session = factory.instantiate().await.unwrap();
    assert!(Arc::ptr_eq(&session, &factory.current().await.unwrap()));

    assert!(launcher.local.lock().unwrap().is_empty());
    let remote = launcher.remote.lock().unwrap();
    assert_eq!(remote.len(), 1);
    assert_eq!(remote[0].url, DEFAULT_GRID_URL);
    assert_eq!(remote[0].capabilities["browserName"], "internet explorer");
    assert_eq!(remote[0].capabilities["sauce:options"]["username"], "sally");
}

#[tokio::test]
async fn test_not_executable_classification() {
    let launcher = Arc::new(RecordingLauncher::failing(|| {
        Error::Io(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"))
    }));
    let factory = factory(&[("browser", "chrome"), ("os", "linux")], launcher);

    match factory.instantiate().await {
        Err(e @ Error::DriverNotExecutable(_)) => {
            assert!(e.to_string().starts_with(crate::error::DRIVER_NOT_EXECUTABLE_HINT));
        }
        other => panic!("expected DriverNotExecutable, got {:?}", other.map(|_| ())),
    }
    assert!(matches!(factory.current().await, Err(Error::NotInitialized)));
}

#[tokio::test]
async fn test_port_reservation_failure_is_not_a_driver_permission_problem() {
    let launcher = Arc::new(RecordingLauncher::failing(|| {
        crate::webdriver::service::port_error(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "bind denied",
        ))
    }));
    let factory = factory(&[("browser", "chrome"), ("os", "linux")], launcher);

    match factory.instantiate().await {
        Err(Error::DriverConstructionFailed { source, .. }) => {
            assert!(matches!(*source, Error::Internal(_)));
        }
        other => panic!("expected DriverConstructionFailed, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn test_other_failures_are_wrapped() {
    let launcher = Arc::new(RecordingLauncher::failing(|| Error::internal("driver crashed")));
    let factory = factory(&[("browser", "firefox"), ("os", "linux")], launcher);

    match factory.instantiate().await {
        Err(Error::DriverConstructionFailed { browser, source }) => {
            assert_eq!(browser, "firefox");
            assert!(matches!(*source, Error::Internal(_)));
        }
        other => panic!("expected DriverConstructionFailed, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn test_real_launcher_missing_binary() {
    let config = Configuration::from_pairs([
        ("browser", "chrome"),
        ("os", "linux"),
        ("driver", "/definitely/not/here/chromedriver"),
    ])
    .unwrap();
    let factory = DriverFactory::new(config, Arc::new(WebDriverLauncher::new()));

    assert!(matches!(
        factory.instantiate().await,
        Err(Error::DriverNotExecutable(_))
    ));
}

#[cfg(unix)]
#[tokio::test]
async fn test_real_launcher_non_executable_binary() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let path = file.path().to_string_lossy().to_string();
    let config = Configuration::from_pairs([
        ("browser", "chrome"),
        ("os", "linux"),
        ("driver", path.as_str()),
    ])
    .unwrap();
    let factory = DriverFactory::new(config, Arc::new(WebDriverLauncher::new()));

    assert!(matches!(
        factory.instantiate().await,
        Err(Error::DriverNotExecutable(_))
    ));
}

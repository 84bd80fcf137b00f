//! Common test utilities
//!
//! This module provides shared test helpers and fixtures for all integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use sentinel::config::Configuration;
use sentinel::driver::{DriverFactory, LocalDriverSpec, RemoteGridSpec, SessionLauncher};
use sentinel::webdriver::{MockWebDriverSession, SessionHandle};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Launcher that hands out in-memory sessions and counts launches
#[derive(Debug, Default)]
pub struct CountingLauncher {
    launches: AtomicUsize,
    sessions: Mutex<Vec<Arc<MockWebDriverSession>>>,
    local_specs: Mutex<Vec<LocalDriverSpec>>,
}

impl CountingLauncher {
    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    /// The mock behind the most recent session
    pub fn last_session(&self) -> Option<Arc<MockWebDriverSession>> {
        self.sessions.lock().unwrap().last().cloned()
    }

    pub fn last_local_spec(&self) -> Option<LocalDriverSpec> {
        self.local_specs.lock().unwrap().last().cloned()
    }

    fn session(&self) -> SessionHandle {
        self.launches.fetch_add(1, Ordering::SeqCst);
        let mock = Arc::new(MockWebDriverSession::new());
        self.sessions.lock().unwrap().push(mock.clone());
        mock
    }
}

#[async_trait]
impl SessionLauncher for CountingLauncher {
    async fn launch_local(&self, spec: LocalDriverSpec) -> sentinel::Result<SessionHandle> {
        self.local_specs.lock().unwrap().push(spec);
        Ok(self.session())
    }

    async fn launch_remote(&self, _spec: RemoteGridSpec) -> sentinel::Result<SessionHandle> {
        Ok(self.session())
    }
}

/// Configuration made of the given pairs
pub fn config(pairs: &[(&str, &str)]) -> Configuration {
    Configuration::from_pairs(pairs.iter().copied()).expect("valid configuration")
}

/// Factory over a counting launcher
pub fn factory(pairs: &[(&str, &str)]) -> (DriverFactory, Arc<CountingLauncher>) {
    let launcher = Arc::new(CountingLauncher::default());
    (DriverFactory::new(config(pairs), launcher.clone()), launcher)
}

/// A fresh in-memory session plus the handle elements take
pub fn mock_session() -> (Arc<MockWebDriverSession>, SessionHandle) {
    let mock = Arc::new(MockWebDriverSession::new());
    let handle: SessionHandle = mock.clone();
    (mock, handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_counting_launcher() {
        let (factory, launcher) = factory(&[("browser", "chrome"), ("os", "linux")]);
        factory.instantiate().await.unwrap();
        assert_eq!(launcher.launches(), 1);
        assert!(launcher.last_session().is_some());
    }
}

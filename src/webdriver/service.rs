//! Local driver service
//!
//! Runs a driver binary (chromedriver, geckodriver, IEDriverServer,
//! safaridriver) as a child process and waits until it accepts sessions.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::{Child, Command};
use tracing::{debug, info};

use crate::Error;

/// How long a freshly spawned driver gets to answer `/status`
pub const DEFAULT_STARTUP_TIMEOUT: Duration = Duration::from_secs(20);

const STATUS_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Command-line flavour used to hand the port to a driver binary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortFlag {
    /// `--port=9515` (chromedriver)
    DoubleDashEquals,
    /// `--port 4444` (geckodriver)
    DoubleDashSpace,
    /// `/port=5555` (IEDriverServer)
    Slash,
    /// `-p 4444` (safaridriver)
    Short,
}

impl PortFlag {
    fn args(self, port: u16) -> Vec<String> {
        match self {
            PortFlag::DoubleDashEquals => vec![format!("--port={}", port)],
            PortFlag::DoubleDashSpace => vec!["--port".to_string(), port.to_string()],
            PortFlag::Slash => vec![format!("/port={}", port)],
            PortFlag::Short => vec!["-p".to_string(), port.to_string()],
        }
    }
}

/// A running driver process
#[derive(Debug)]
pub struct DriverService {
    binary: PathBuf,
    port: u16,
    child: Child,
}

impl DriverService {
    /// Spawn `binary` on a free local port and wait until it is ready
    ///
    /// Spawn failures are returned as [`Error::Io`] so callers can tell a
    /// missing or non-executable binary apart from a driver that started but
    /// misbehaved.
    pub async fn start(binary: &Path, port_flag: PortFlag, startup_timeout: Duration) -> Result<Self, Error> {
        let port = Self::free_port()?;
        info!("Starting driver {} on port {}", binary.display(), port);

        let child = Command::new(binary)
            .args(port_flag.args(port))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;

        let mut service = Self {
            binary: binary.to_path_buf(),
            port,
            child,
        };
        service.wait_until_ready(startup_timeout).await?;
        Ok(service)
    }

    /// Base URL of the driver endpoint
    pub fn url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Kill the process and reap it
    pub async fn stop(&mut self) -> Result<(), Error> {
        debug!("Stopping driver {}", self.binary.display());
        self.child.kill().await?;
        Ok(())
    }

    // The port is released before the driver binds it, so another process
    // can take it in between; the readiness poll then times out.
    fn free_port() -> Result<u16, Error> {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").map_err(port_error)?;
        Ok(listener.local_addr().map_err(port_error)?.port())
    }

    async fn wait_until_ready(&mut self, timeout: Duration) -> Result<(), Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(2))
            .build()
            .map_err(|e| Error::internal(format!("Failed to create HTTP client: {}", e)))?;
        let status_url = format!("{}/status", self.url());
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            let exited = self
                .child
                .try_wait()
                .map_err(|e| Error::internal(format!("Failed to poll driver process: {}", e)))?;
            if let Some(status) = exited {
                return Err(Error::internal(format!(
                    "Driver {} exited during startup with {}",
                    self.binary.display(),
                    status
                )));
            }

            match http.get(&status_url).send().await {
                Ok(response) if response.status().is_success() => {
                    info!("Driver {} ready on port {}", self.binary.display(), self.port);
                    return Ok(());
                }
                Ok(response) => debug!("Driver status returned {}", response.status()),
                Err(e) => debug!("Driver not reachable yet: {}", e),
            }

            if tokio::time::Instant::now() >= deadline {
                return Err(Error::internal(format!(
                    "Driver {} did not become ready within {:?}",
                    self.binary.display(),
                    timeout
                )));
            }
            tokio::time::sleep(STATUS_POLL_INTERVAL).await;
        }
    }
}

/// Port selection failures are not spawn failures; keep them out of [`Error::Io`]
pub(crate) fn port_error(err: std::io::Error) -> Error {
    Error::internal(format!("Failed to reserve a local port for the driver: {}", err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_flag_args() {
        assert_eq!(PortFlag::DoubleDashEquals.args(9515), vec!["--port=9515"]);
        assert_eq!(PortFlag::DoubleDashSpace.args(4444), vec!["--port", "4444"]);
        assert_eq!(PortFlag::Slash.args(5555), vec!["/port=5555"]);
        assert_eq!(PortFlag::Short.args(1), vec!["-p", "1"]);
    }

    #[tokio::test]
    async fn test_missing_binary_is_io_not_found() {
        let result = DriverService::start(
            Path::new("/definitely/not/here/chromedriver"),
            PortFlag::DoubleDashEquals,
            Duration::from_secs(1),
        )
        .await;

        match result {
            Err(Error::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
            other => panic!("expected an I/O not-found error, got {:?}", other),
        }
    }

    #[test]
    fn test_port_errors_are_not_io() {
        let err = port_error(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "bind denied"));
        assert!(matches!(err, Error::Internal(_)));
        assert!(err.to_string().contains("bind denied"));
    }
}

//! The documentation renderer as a supervised child process.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::sync::broadcast;

use docmirror_core::interval::parse_duration;

use crate::error::RendererError;

pub const DEFAULT_BINARY: &str = "godoc";
pub const DEFAULT_PORT: u16 = 6060;
pub const DEFAULT_INDEX_INTERVAL: &str = "1m";

/// A long-running companion process started next to the scheduler.
///
/// `run` resolves when the process exits on its own or when `shutdown`
/// fires. An exit the process was not asked for is reported as an error only
/// when it is unsuccessful.
#[async_trait]
pub trait ManagedProcess: Send + Sync {
    fn name(&self) -> &str;

    async fn run(&self, shutdown: broadcast::Receiver<()>) -> Result<(), RendererError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RendererOptions {
    /// Executable name looked up on `PATH`, or an explicit path.
    pub binary: PathBuf,
    /// Served as the renderer's goroot; the same directory the mirrors live under.
    pub root: PathBuf,
    pub port: u16,
    /// Passed through verbatim after a syntax check. Zero selects the
    /// renderer's default, a negative value indexes once at startup.
    pub index_interval: String,
}

impl RendererOptions {
    pub fn new(
        binary: impl Into<PathBuf>,
        root: impl Into<PathBuf>,
        port: u16,
        index_interval: &str,
    ) -> Result<Self, RendererError> {
        let index_interval = index_interval.trim();
        parse_duration(index_interval).map_err(|reason| RendererError::InvalidIndexInterval {
            input: index_interval.to_string(),
            reason,
        })?;

        Ok(Self {
            binary: binary.into(),
            root: root.into(),
            port,
            index_interval: index_interval.to_string(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct Renderer {
    options: RendererOptions,
}

impl Renderer {
    pub fn new(options: RendererOptions) -> Self {
        Self { options }
    }

    pub fn args(&self) -> Vec<String> {
        vec![
            format!("-http=localhost:{}", self.options.port),
            format!("-goroot={}", self.options.root.display()),
            "-index".to_string(),
            format!("-index_interval={}", self.options.index_interval),
        ]
    }
}

#[async_trait]
impl ManagedProcess for Renderer {
    fn name(&self) -> &str {
        "renderer"
    }

    async fn run(&self, mut shutdown: broadcast::Receiver<()>) -> Result<(), RendererError> {
        let program =
            which::which(&self.options.binary).map_err(|source| RendererError::NotFound {
                binary: self.options.binary.clone(),
                source,
            })?;

        tracing::info!(
            binary = %program.display(),
            root = %self.options.root.display(),
            port = self.options.port,
            "starting renderer",
        );
        let mut child = Command::new(&program)
            .args(self.args())
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| RendererError::Spawn {
                binary: program.clone(),
                source,
            })?;

        let exited = tokio::select! {
            status = child.wait() => Some(status),
            _ = shutdown.recv() => None,
        };

        match exited {
            Some(status) => {
                let status = status.map_err(RendererError::Wait)?;
                if status.success() {
                    tracing::info!(%status, "renderer exited");
                    Ok(())
                } else {
                    Err(RendererError::Exited { status })
                }
            }
            None => {
                tracing::info!("stopping renderer");
                if let Err(err) = child.kill().await {
                    tracing::warn!(error = %err, "failed to stop renderer");
                }
                Ok(())
            }
        }
    }
}

use std::fs;
use std::path::Path;

use tokio::sync::broadcast;

use docmirror_core::SyncOptions;
use docmirror_discovery::{GitHubClient, RepositorySource};
use docmirror_renderer::{ManagedProcess, Renderer, RendererOptions};
use docmirror_sync::{GitTransport, MirrorManager, MirrorTransport};

use crate::error::{io_err, DaemonError};
use crate::logging::{init_tracing, LogSettings};
use crate::scheduler::Scheduler;

/// Everything needed to start the engine, already validated.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub sync: SyncOptions,
    pub api_url: String,
    /// `None` runs the syncer alone.
    pub renderer: Option<RendererOptions>,
    pub logging: LogSettings,
}

/// Start the runtime and block the current thread until it exits.
pub fn start_blocking(config: RuntimeConfig) -> Result<(), DaemonError> {
    init_tracing(&config.logging);
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio-runtime", e))?;
    runtime.block_on(run(config))
}

/// Build the production scheduler and renderer and run them until shutdown.
pub async fn run(config: RuntimeConfig) -> Result<(), DaemonError> {
    ensure_mirror_root(&config.sync.mirror_root)?;

    let source = GitHubClient::from_options(&config.api_url, &config.sync)?;
    let transport = GitTransport::new(config.sync.credentials.clone());
    let scheduler = Scheduler::new(source, MirrorManager::new(transport), config.sync);
    let renderer = config.renderer.map(Renderer::new);

    run_services(scheduler, renderer).await
}

/// Run the scheduler next to an optional managed process.
///
/// SIGINT and SIGTERM stop both. When either one finishes on its own the other
/// is stopped too. A failing managed process is the returned error.
pub async fn run_services<S, T, P>(
    mut scheduler: Scheduler<S, T>,
    process: Option<P>,
) -> Result<(), DaemonError>
where
    S: RepositorySource + 'static,
    T: MirrorTransport + 'static,
    P: ManagedProcess + 'static,
{
    let (shutdown_tx, _) = broadcast::channel::<()>(16);

    let scheduler_handle = {
        let shutdown = shutdown_tx.clone();
        let shutdown_rx = shutdown.subscribe();
        tokio::spawn(async move {
            scheduler.run(shutdown_rx).await;
            let _ = shutdown.send(());
            Ok::<(), DaemonError>(())
        })
    };

    let process_handle = {
        let shutdown = shutdown_tx.clone();
        let shutdown_rx = shutdown.subscribe();
        tokio::spawn(async move {
            let Some(process) = process else {
                return Ok(());
            };
            let result = process.run(shutdown_rx).await;
            match &result {
                Ok(()) => tracing::info!(process = process.name(), "managed process finished"),
                Err(err) => {
                    tracing::error!(process = process.name(), error = %err, "managed process failed")
                }
            }
            let _ = shutdown.send(());
            result.map_err(DaemonError::from)
        })
    };

    let signal_handle = {
        let shutdown = shutdown_tx.clone();
        let mut shutdown_rx = shutdown.subscribe();
        tokio::spawn(async move {
            tokio::select! {
                _ = shutdown_rx.recv() => Ok(()),
                signal = wait_for_signal() => {
                    let _ = shutdown.send(());
                    signal
                }
            }
        })
    };

    let (scheduler_result, process_result, signal_result) =
        tokio::join!(scheduler_handle, process_handle, signal_handle);

    handle_join("scheduler", scheduler_result)?;
    handle_join("renderer", process_result)?;
    handle_join("signal_handler", signal_result)?;
    Ok(())
}

#[cfg(unix)]
async fn wait_for_signal() -> Result<(), DaemonError> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate()).map_err(DaemonError::Signal)?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result.map_err(DaemonError::Signal)?;
            tracing::info!("received ctrl-c, shutting down");
        }
        _ = terminate.recv() => {
            tracing::info!("received SIGTERM, shutting down");
        }
    }
    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_signal() -> Result<(), DaemonError> {
    tokio::signal::ctrl_c().await.map_err(DaemonError::Signal)?;
    tracing::info!("received ctrl-c, shutting down");
    Ok(())
}

fn ensure_mirror_root(root: &Path) -> Result<(), DaemonError> {
    let src = docmirror_core::paths::mirror_src_dir(root);
    fs::create_dir_all(&src).map_err(|e| io_err(&src, e))
}

fn handle_join(
    task: &str,
    result: Result<Result<(), DaemonError>, tokio::task::JoinError>,
) -> Result<(), DaemonError> {
    match result {
        Ok(inner) => inner,
        Err(err) => Err(DaemonError::Task(format!("{task} ({err})"))),
    }
}

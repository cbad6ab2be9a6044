use crate::error::Error;
use config::Config;
use monitor::{
    FileAuditor, FileSink, FilesystemWatcher, NetworkMonitor, ProcNetSource, ProcessMonitor,
    ProcfsSource, poller, user::resolve_username,
};
use std::{path::PathBuf, sync::Arc};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Open the audit logs and run every enabled observer until `cancel` fires.
///
/// An observer that fails ends on its own; the others keep running.
pub async fn run(root: PathBuf, config: Config, cancel: CancellationToken) -> Result<(), Error> {
    let sinks = &config.sinks;
    std::fs::create_dir_all(&sinks.dir).map_err(|source| Error::LogDir {
        path: sinks.dir.clone(),
        source,
    })?;

    let username = sinks.username.clone().unwrap_or_else(resolve_username);
    debug!(%username, dir = ?sinks.dir, "opening audit logs");
    let filesystem_sink = Arc::new(FileSink::open(sinks.filesystem_path(), &username)?);
    let process_sink = Arc::new(FileSink::open(sinks.process_path(), &username)?);
    let network_sink = Arc::new(FileSink::open(sinks.network_path(), &username)?);

    let mut observers = JoinSet::new();

    if config.process.enabled {
        let monitor = ProcessMonitor::new(ProcfsSource::default(), process_sink, &config.process);
        observers.spawn(poller::run(monitor, cancel.clone()));
    }

    if config.network.enabled {
        let monitor = NetworkMonitor::new(ProcNetSource::default(), network_sink, &config.network);
        observers.spawn(poller::run(monitor, cancel.clone()));
    }

    let auditor = Arc::new(FileAuditor::new(filesystem_sink, &config.filesystem));
    observers.spawn(FilesystemWatcher::new(root, auditor).run(cancel.clone()));

    info!(observers = observers.len(), "auditing started");
    while let Some(res) = observers.join_next().await {
        match res {
            Ok(Ok(())) => {}
            Ok(Err(err)) => error!(%err, "observer stopped"),
            Err(err) => error!(%err, "observer task failed"),
        }
    }

    Ok(())
}

use crate::error::Error;
use tokio::signal::unix::{SignalKind, signal};

/// Waits for the first shutdown signal.
pub async fn wait_for_shutdown() -> Result<SignalEvent, Error> {
    let mut sigint = signal(SignalKind::interrupt()).map_err(Error::SignalHandler)?;
    let mut sigterm = signal(SignalKind::terminate()).map_err(Error::SignalHandler)?;

    tokio::select! {
        _ = sigint.recv() => Ok(SignalEvent::Interrupt),
        _ = sigterm.recv() => Ok(SignalEvent::Terminate),
    }
}

#[derive(Debug, Clone, Copy)]
pub enum SignalEvent {
    Interrupt,
    Terminate,
}

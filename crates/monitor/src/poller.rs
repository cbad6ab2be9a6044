use crate::Error;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, error, info, warn};

/// A fixed-interval observer driven by [`run`].
pub trait Poller: Send {
    fn name(&self) -> &'static str;

    /// Pause between the end of one cycle and the start of the next.
    fn interval(&self) -> Duration;

    /// Execute one observation cycle.
    fn poll(&mut self) -> Result<(), Error>;

    /// Called once when [`Poller::poll`] fails and the loop gives up.
    fn on_fatal(&mut self, _err: &Error) {}
}

/// Poll until `cancel` fires or a cycle fails.
///
/// Cycles run on the blocking pool, so a kernel read that hangs stalls only
/// this poller. The interval is slept after each cycle, so the period is the
/// interval plus the cycle latency. Cancellation is observed during the cycle
/// and during the sleep; a cycle still running at that point is abandoned.
pub async fn run<P: Poller + 'static>(mut poller: P, cancel: CancellationToken) -> Result<(), Error> {
    let span = tracing::info_span!("poller", name = poller.name());
    async move {
        info!(interval = ?poller.interval(), "polling started");
        while !cancel.is_cancelled() {
            let cycle = tokio::task::spawn_blocking(move || {
                let res = poller.poll();
                (poller, res)
            });
            let (returned, res) = tokio::select! {
                _ = cancel.cancelled() => {
                    warn!("cycle still running at shutdown");
                    break;
                }
                joined = cycle => joined?,
            };
            poller = returned;

            if let Err(err) = res {
                error!(%err, "polling stopped");
                poller.on_fatal(&err);
                return Err(err);
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(poller.interval()) => {}
            }
        }
        info!("shutdown requested");
        Ok(())
    }
    .instrument(span)
    .await
}

//! Directory-tree auditing on top of `notify`.

mod auditor;
mod event;
mod links;
mod renames;

pub use auditor::FileAuditor;
pub use event::{EntryKind, FsEvent};
pub use links::TempLinks;
pub use renames::RenameHalves;

use crate::Error;
use notify::{RecursiveMode, Watcher};
use std::{
    path::PathBuf,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, info, trace, warn};

/// How long a rename's first half waits for its second before the entry is
/// taken to have left the tree.
const RENAME_WINDOW: Duration = Duration::from_millis(250);

/// Recursive watch of one root, feeding a [`FileAuditor`].
pub struct FilesystemWatcher {
    root: PathBuf,
    auditor: Arc<FileAuditor>,
}

impl FilesystemWatcher {
    pub fn new(root: impl Into<PathBuf>, auditor: Arc<FileAuditor>) -> Self {
        Self {
            root: root.into(),
            auditor,
        }
    }

    /// Watch until `cancel` fires.
    ///
    /// The backend calls back on its own thread; notifications are forwarded
    /// over a channel and audited on this task.
    pub async fn run(self, cancel: CancellationToken) -> Result<(), Error> {
        if !self.root.is_dir() {
            return Err(Error::InvalidPath(self.root));
        }
        let span = tracing::info_span!("watcher", root = ?self.root);
        async move {
            let (tx, rx) = flume::unbounded();
            let mut watcher =
                notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
                    // receiver gone means we are shutting down
                    let _ = tx.send(res);
                })?;
            watcher.watch(&self.root, RecursiveMode::Recursive)?;

            self.auditor.announce(&self.root);
            info!("watching started");

            let mut halves = RenameHalves::new(RENAME_WINDOW);
            loop {
                let deadline = halves.next_deadline();
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now).into()),
                        if deadline.is_some() =>
                    {
                        for event in halves.expire(Instant::now()) {
                            self.auditor.handle(event);
                        }
                    }
                    Ok(res) = rx.recv_async() => match res {
                        Ok(event) => {
                            let translated = halves
                                .observe(&event, Instant::now())
                                .or_else(|| FsEvent::from_notify(&event));
                            match translated {
                                Some(event) => self.auditor.handle(event),
                                None => trace!(?event, "ignored notification"),
                            }
                        }
                        Err(err) => warn!(%err, "watch backend reported an error"),
                    },
                }
            }

            info!("shutdown requested");
            Ok::<_, Error>(())
        }
        .instrument(span)
        .await
    }
}

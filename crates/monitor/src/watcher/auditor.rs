use super::{
    event::{EntryKind, FsEvent},
    links::TempLinks,
};
use crate::{
    sink::{AuditEvent, EventSink, Subsystem},
    utils::{has_marker, original_for_temp},
};
use parking_lot::Mutex;
use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Instant,
};
use tracing::{debug, trace, warn};

#[derive(Debug)]
struct State {
    links: TempLinks,
    /// A removed subdirectory is reported by its parent's watch and by its
    /// own; the second report is dropped.
    last_removed_dir: Option<PathBuf>,
}

/// Turns filesystem notifications into audit lines.
///
/// Handlers take `&self` and may be called from any thread; the link table is
/// serialized behind a mutex.
pub struct FileAuditor {
    sink: Arc<dyn EventSink>,
    marker: String,
    state: Mutex<State>,
}

impl FileAuditor {
    pub fn new(sink: Arc<dyn EventSink>, config: &config::Filesystem) -> Self {
        Self {
            sink,
            marker: config.temp_marker.clone(),
            state: Mutex::new(State {
                links: TempLinks::new(config.links),
                last_removed_dir: None,
            }),
        }
    }

    pub fn handle(&self, event: FsEvent) {
        match event {
            FsEvent::Created { path, kind } => self.on_created(&path, kind),
            FsEvent::Deleted { path, kind } => self.on_deleted(&path, kind),
            FsEvent::Moved { from, to, kind } => self.on_moved(&from, &to, kind),
        }
    }

    pub fn on_created(&self, path: &Path, kind: EntryKind) {
        if has_marker(path, &self.marker) {
            // best effort: the original may change again before we look
            let Some(original) = original_for_temp(path, &self.marker).filter(|p| p.exists())
            else {
                debug!(?path, "temp artifact without an original");
                return;
            };
            {
                let mut state = self.state.lock();
                state.last_removed_dir = None;
                state
                    .links
                    .insert(path.to_path_buf(), original.clone(), Instant::now());
            }
            self.emit(format!(
                "Temporary file created: {} (source file changed: {})",
                path.display(),
                original.display()
            ));
            return;
        }

        self.state.lock().last_removed_dir = None;
        match kind {
            EntryKind::Directory => self.emit(format!("Directory created: {}", path.display())),
            EntryKind::File => self.emit(format!("File created: {}", path.display())),
        }
    }

    pub fn on_deleted(&self, path: &Path, kind: EntryKind) {
        if has_marker(path, &self.marker) {
            if let Some(original) = self.state.lock().links.remove(path) {
                trace!(?path, ?original, "temp artifact cleaned up");
            }
            return;
        }

        {
            let mut state = self.state.lock();
            let repeated = kind == EntryKind::Directory
                && state.last_removed_dir.as_deref() == Some(path);
            state.last_removed_dir = (kind == EntryKind::Directory).then(|| path.to_path_buf());
            if repeated {
                return;
            }
        }

        match kind {
            EntryKind::Directory => self.emit(format!("Directory deleted: {}", path.display())),
            EntryKind::File => self.emit(format!("File deleted: {}", path.display())),
        }
    }

    pub fn on_moved(&self, from: &Path, to: &Path, kind: EntryKind) {
        let mut state = self.state.lock();
        state.last_removed_dir = None;
        if has_marker(from, &self.marker) || has_marker(to, &self.marker) {
            // atomic save: the artifact replaces its original
            if let Some(original) = state.links.remove(from) {
                trace!(?from, ?to, ?original, "temp artifact renamed");
            }
            return;
        }
        drop(state);

        let verb = if from.parent() == to.parent() {
            "renamed"
        } else {
            "moved"
        };
        self.emit(format!(
            "{} {verb}: {} → {}",
            kind.label(),
            from.display(),
            to.display()
        ));
    }

    /// Original recorded for a live temp artifact.
    pub fn link_for(&self, temp: &Path) -> Option<PathBuf> {
        self.state.lock().links.get(temp).map(Path::to_path_buf)
    }

    pub fn announce(&self, root: &Path) {
        self.emit(format!("Started monitoring directory: {}", root.display()));
    }

    fn emit(&self, message: String) {
        if let Err(err) = self
            .sink
            .record(AuditEvent::new(Subsystem::FileSystem, message))
        {
            warn!(%err, "failed to record filesystem event");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn auditor() -> (FileAuditor, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        (FileAuditor::new(sink.clone(), &Default::default()), sink)
    }

    #[test]
    fn temp_without_original_is_silent() {
        let dir = tempdir().unwrap();
        let (auditor, sink) = auditor();

        auditor.on_created(&dir.path().join("gone.goutputstream-1"), EntryKind::File);
        assert!(sink.events().is_empty());
    }

    #[test]
    fn temp_artifact_rename_drops_link() {
        let dir = tempdir().unwrap();
        let original = dir.path().join("notes");
        let temp = dir.path().join("notes.goutputstream-Q1");
        std::fs::write(&original, "v1").unwrap();
        let (auditor, sink) = auditor();

        auditor.on_created(&temp, EntryKind::File);
        assert_eq!(auditor.link_for(&temp), Some(original.clone()));

        auditor.on_moved(&temp, &original, EntryKind::File);
        assert_eq!(auditor.link_for(&temp), None);
        assert_eq!(sink.events().len(), 1);
    }

    #[test]
    fn repeated_directory_removal_is_reported_once() {
        let (auditor, sink) = auditor();
        let dir = Path::new("/r/sub");

        auditor.on_deleted(dir, EntryKind::Directory);
        auditor.on_deleted(dir, EntryKind::Directory);
        auditor.on_created(dir, EntryKind::Directory);
        auditor.on_deleted(dir, EntryKind::Directory);

        assert_eq!(
            sink.messages(),
            [
                "Directory deleted: /r/sub",
                "Directory created: /r/sub",
                "Directory deleted: /r/sub",
            ]
        );
    }

    #[test]
    fn marker_in_directory_name_is_not_suppressed() {
        let (auditor, sink) = auditor();
        let path = Path::new("/r/cache.goutputstream.d/report.txt");

        auditor.on_deleted(path, EntryKind::File);
        assert_eq!(
            sink.messages(),
            ["File deleted: /r/cache.goutputstream.d/report.txt"]
        );
    }
}

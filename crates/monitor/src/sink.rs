use crate::Error;
use parking_lot::Mutex;
use std::{
    fmt,
    fs::{File, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// Observer that produced an [`AuditEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subsystem {
    FileSystem,
    Process,
    Network,
}

impl fmt::Display for Subsystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FileSystem => f.write_str("FileSystem"),
            Self::Process => f.write_str("Process"),
            Self::Network => f.write_str("Network"),
        }
    }
}

/// A single observed fact. The timestamp is assigned by the sink at write time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    pub subsystem: Subsystem,
    pub message: String,
}

impl AuditEvent {
    pub fn new(subsystem: Subsystem, message: impl Into<String>) -> Self {
        Self {
            subsystem,
            message: message.into(),
        }
    }
}

/// Append-only destination for audit events.
pub trait EventSink: Send + Sync {
    fn record(&self, event: AuditEvent) -> Result<(), Error>;
}

/// Writes `<timestamp> - <username> - <message>` lines to a file.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    username: String,
    file: Mutex<File>,
}

impl FileSink {
    /// Open `path` for appending, creating it if needed.
    pub fn open(path: impl AsRef<Path>, username: impl Into<String>) -> Result<Self, Error> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|err| Error::io(path, err))?;
        Ok(Self {
            path: path.to_path_buf(),
            username: username.into(),
            file: Mutex::new(file),
        })
    }
}

impl EventSink for FileSink {
    fn record(&self, event: AuditEvent) -> Result<(), Error> {
        // timestamp under the lock so lines stay in timestamp order
        let mut file = self.file.lock();
        let now = chrono::Local::now().format(TIMESTAMP_FORMAT);
        writeln!(file, "{now} - {} - {}", self.username, event.message)
            .and_then(|()| file.flush())
            .map_err(|err| Error::io(&self.path, err))
    }
}

/// Keeps events in memory, in arrival order.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<AuditEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.events.lock().iter().map(|e| e.message.clone()).collect()
    }

    pub fn take(&self) -> Vec<AuditEvent> {
        std::mem::take(&mut *self.events.lock())
    }
}

impl EventSink for MemorySink {
    fn record(&self, event: AuditEvent) -> Result<(), Error> {
        self.events.lock().push(event);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn file_sink_appends_attributed_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("process_log.txt");
        std::fs::write(&path, "existing line\n").unwrap();

        let sink = FileSink::open(&path, "alice").unwrap();
        sink.record(AuditEvent::new(Subsystem::Process, "Process terminated: PID=42"))
            .unwrap();
        sink.record(AuditEvent::new(Subsystem::Process, "Process terminated: PID=43"))
            .unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "existing line");

        let (timestamp, rest) = lines[1].split_once(" - ").unwrap();
        assert_eq!(rest, "alice - Process terminated: PID=42");
        assert!(chrono::NaiveDateTime::parse_from_str(timestamp, TIMESTAMP_FORMAT).is_ok());
        assert!(lines[2].ends_with(" - alice - Process terminated: PID=43"));
    }

    #[test]
    fn file_sink_rejects_missing_directory() {
        let dir = tempdir().unwrap();
        let err = FileSink::open(dir.path().join("nope/log.txt"), "alice").unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn memory_sink_keeps_order() {
        let sink = MemorySink::new();
        sink.record(AuditEvent::new(Subsystem::Network, "a")).unwrap();
        sink.record(AuditEvent::new(Subsystem::Network, "b")).unwrap();
        assert_eq!(sink.messages(), ["a", "b"]);
        assert_eq!(sink.take().len(), 2);
        assert!(sink.events().is_empty());
    }
}

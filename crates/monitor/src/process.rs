use crate::{
    Error,
    differ::diff,
    poller::Poller,
    sink::{AuditEvent, EventSink, Subsystem},
};
use nix::errno::Errno;
use procfs::{ProcError, process::Process};
use std::{
    collections::{BTreeSet, HashSet},
    path::PathBuf,
    sync::Arc,
    time::Duration,
};
use tracing::{debug, warn};

/// Read access to the process table.
///
/// Kept narrow so the monitor can be fed synthetic snapshots.
pub trait ProcessSource: Send {
    /// PIDs of every live process.
    fn pids(&self) -> Result<HashSet<u32>, Error>;

    /// Command line of `pid`, or `None` if the process has already exited.
    fn cmdline(&self, pid: u32) -> Result<Option<String>, Error>;
}

/// [`ProcessSource`] backed by procfs.
#[derive(Debug, Clone)]
pub struct ProcfsSource {
    root: PathBuf,
}

impl Default for ProcfsSource {
    fn default() -> Self {
        Self::with_root("/proc")
    }
}

impl ProcfsSource {
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ProcessSource for ProcfsSource {
    fn pids(&self) -> Result<HashSet<u32>, Error> {
        let processes = procfs::process::all_processes_with_root(&self.root)?;
        // entries that fail here exited while the directory was being read
        Ok(processes
            .filter_map(Result::ok)
            .filter_map(|process| u32::try_from(process.pid).ok())
            .collect())
    }

    fn cmdline(&self, pid: u32) -> Result<Option<String>, Error> {
        let args = Process::new_with_root(self.root.join(pid.to_string()))
            .and_then(|process| process.cmdline());
        match args {
            Ok(args) => Ok(Some(args.join(" ").trim().to_string())),
            Err(err) if is_vanished(&err) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

fn is_vanished(err: &ProcError) -> bool {
    match err {
        ProcError::NotFound(_) | ProcError::Incomplete(_) => true,
        ProcError::Io(err, _) => err.raw_os_error() == Some(Errno::ESRCH as i32),
        _ => false,
    }
}

/// Outcome of one [`ProcessMonitor::scan`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessReport {
    pub started: usize,
    pub terminated: usize,
    /// New PIDs that exited before their command line could be read.
    pub vanished: usize,
}

/// Reports process creation and termination by diffing PID snapshots.
pub struct ProcessMonitor<S> {
    source: S,
    sink: Arc<dyn EventSink>,
    interval: Duration,
    known: HashSet<u32>,
}

impl<S: ProcessSource> ProcessMonitor<S> {
    pub fn new(source: S, sink: Arc<dyn EventSink>, config: &config::ProcessMonitor) -> Self {
        Self {
            source,
            sink,
            interval: config.interval,
            known: HashSet::new(),
        }
    }

    /// PIDs seen by the last scan.
    pub fn known(&self) -> &HashSet<u32> {
        &self.known
    }

    /// Run one cycle: snapshot, diff against the previous snapshot, report.
    pub fn scan(&mut self) -> Result<ProcessReport, Error> {
        let current = self.source.pids()?;
        let delta = diff(&self.known, &current);
        let mut report = ProcessReport::default();

        for pid in delta.added.into_iter().collect::<BTreeSet<_>>() {
            let cmdline = match self.source.cmdline(pid) {
                Ok(Some(cmdline)) => cmdline,
                Ok(None) => {
                    report.vanished += 1;
                    continue;
                }
                Err(err) => {
                    warn!(pid, %err, "failed to read command line");
                    continue;
                }
            };
            if cmdline.is_empty() {
                self.emit(format!("Process started: PID={pid}, no command available"));
            } else {
                self.emit(format!("Process started: PID={pid}, command: {cmdline}"));
            }
            report.started += 1;
        }

        for pid in delta.removed.into_iter().collect::<BTreeSet<_>>() {
            self.emit(format!("Process terminated: PID={pid}"));
            report.terminated += 1;
        }

        self.known = current;
        Ok(report)
    }

    fn emit(&self, message: String) {
        if let Err(err) = self.sink.record(AuditEvent::new(Subsystem::Process, message)) {
            warn!(%err, "failed to record process event");
        }
    }
}

impl<S: ProcessSource> Poller for ProcessMonitor<S> {
    fn name(&self) -> &'static str {
        "process"
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    fn poll(&mut self) -> Result<(), Error> {
        let report = self.scan()?;
        debug!(?report, known = self.known.len(), "process scan done");
        Ok(())
    }

    fn on_fatal(&mut self, err: &Error) {
        self.emit(format!("Process monitoring stopped: {err}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    #[test]
    fn procfs_sees_current_process() {
        let source = ProcfsSource::default();
        let me = std::process::id();

        assert!(source.pids().unwrap().contains(&me));
        let cmdline = source.cmdline(me).unwrap().unwrap();
        assert!(!cmdline.is_empty());
    }

    #[test]
    fn procfs_reports_missing_pid_as_vanished() {
        let source = ProcfsSource::default();
        // above the kernel's pid_max ceiling of 2^22
        assert_eq!(source.cmdline(u32::MAX / 2).unwrap(), None);
    }

    #[derive(Default)]
    struct Table {
        pids: HashSet<u32>,
        cmdlines: HashMap<u32, String>,
    }

    impl ProcessSource for Table {
        fn pids(&self) -> Result<HashSet<u32>, Error> {
            Ok(self.pids.clone())
        }

        fn cmdline(&self, pid: u32) -> Result<Option<String>, Error> {
            Ok(self.cmdlines.get(&pid).cloned())
        }
    }

    #[test]
    fn first_scan_reports_everything_as_started() {
        let sink = Arc::new(MemorySink::new());
        let table = Table {
            pids: HashSet::from([1, 2]),
            cmdlines: HashMap::from([(1, "/sbin/init".into()), (2, String::new())]),
        };
        let mut monitor = ProcessMonitor::new(table, sink.clone(), &Default::default());

        let report = monitor.scan().unwrap();

        assert_eq!(
            sink.messages(),
            [
                "Process started: PID=1, command: /sbin/init",
                "Process started: PID=2, no command available",
            ]
        );
        assert_eq!(report.started, 2);
        assert_eq!(monitor.known(), &HashSet::from([1, 2]));
    }
}

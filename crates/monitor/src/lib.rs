//! Host activity auditing: process churn, socket endpoints, and changes
//! under a directory tree, each written to its own attributed log.

mod error;
pub mod codec;
pub mod differ;
pub mod network;
pub mod poller;
pub mod process;
pub mod sink;
pub mod user;
pub mod utils;
pub mod watcher;

pub use error::Error;
pub use network::{NetworkMonitor, ProcNetSource};
pub use process::{ProcessMonitor, ProcfsSource};
pub use sink::{AuditEvent, EventSink, FileSink, MemorySink, Subsystem};
pub use watcher::{FileAuditor, FilesystemWatcher};

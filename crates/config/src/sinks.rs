#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where the three audit logs are written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Sinks {
    /// Directory holding the log files.
    pub dir: PathBuf,

    pub filesystem: PathBuf,

    pub process: PathBuf,

    pub network: PathBuf,

    /// Acting user written on every line. Resolved from the environment when unset.
    pub username: Option<String>,
}

impl Default for Sinks {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            filesystem: PathBuf::from("file_system_log.txt"),
            process: PathBuf::from("process_log.txt"),
            network: PathBuf::from("network_log.txt"),
            username: None,
        }
    }
}

impl Sinks {
    pub fn filesystem_path(&self) -> PathBuf {
        self.dir.join(&self.filesystem)
    }

    pub fn process_path(&self) -> PathBuf {
        self.dir.join(&self.process)
    }

    pub fn network_path(&self) -> PathBuf {
        self.dir.join(&self.network)
    }
}

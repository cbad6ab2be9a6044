#![forbid(unsafe_code)]

use crate::{link_policy::LinkPolicy, protocol::Protocol};
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use std::time::Duration;

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProcessMonitor {
    pub enabled: bool,

    /// Pause between two process table scans, in seconds.
    #[serde_as(as = "serde_with::DurationSeconds")]
    pub interval: Duration,
}

impl Default for ProcessMonitor {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: Duration::from_secs(1),
        }
    }
}

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NetworkMonitor {
    pub enabled: bool,

    /// Pause between two socket table scans, in seconds.
    #[serde_as(as = "serde_with::DurationSeconds")]
    pub interval: Duration,

    /// Tables to read each cycle, in order.
    pub protocols: Vec<Protocol>,
}

impl Default for NetworkMonitor {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: Duration::from_secs(5),
            protocols: vec![Protocol::Tcp, Protocol::Udp],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Filesystem {
    /// Base-name substring that marks an editor's atomic-save artifact.
    pub temp_marker: String,

    pub links: LinkPolicy,
}

impl Default for Filesystem {
    fn default() -> Self {
        Self {
            temp_marker: ".goutputstream".into(),
            links: LinkPolicy::default(),
        }
    }
}

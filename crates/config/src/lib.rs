#![forbid(unsafe_code)]

//! Configuration for the host auditor.
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! `HOSTAUDIT_*` environment variables (`__` separates nested keys, e.g.
//! `HOSTAUDIT_NETWORK__INTERVAL=10`).

mod error;
mod link_policy;
mod monitors;
mod protocol;
mod sinks;

pub use error::Error;
pub use link_policy::LinkPolicy;
pub use monitors::{Filesystem, NetworkMonitor, ProcessMonitor};
pub use protocol::Protocol;
pub use sinks::Sinks;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::Path;

const ENV_PREFIX: &str = "HOSTAUDIT_";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub process: ProcessMonitor,
    pub network: NetworkMonitor,
    pub filesystem: Filesystem,
    pub sinks: Sinks,
}

impl Config {
    /// Defaults overridden by the environment only.
    pub fn from_env() -> Result<Self, Error> {
        Self::figment().extract().map_err(Error::from)
    }

    /// Defaults, then the TOML file at `path`, then the environment.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::InvalidPath(path.to_path_buf()));
        }
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(Error::from)
    }

    /// Write the configuration as TOML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        let doc = toml_edit::ser::to_string_pretty(self)?;
        std::fs::write(path, doc)?;
        Ok(())
    }

    fn figment() -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }
}

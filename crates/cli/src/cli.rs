use clap::Parser;
use clap_verbosity_flag::{Verbosity, WarnLevel};
use std::path::{Path, PathBuf};

/// Hostaudit: who did what on this machine
///
/// Hostaudit watches a directory tree, the process table and the kernel's
/// socket tables, and appends every observed change to one of three logs,
/// each line stamped with the time and the acting user.
#[derive(Debug, Parser, Clone)]
#[command(about, long_about, version)]
pub struct Cli {
    /// Directory tree to audit.
    #[arg(value_parser = validate_dir, required_unless_present = "write_config")]
    pub root: Option<PathBuf>,

    /// Path to configuration file.
    #[arg(short, long, value_parser = validate_file)]
    pub conffile: Option<PathBuf>,

    /// Directory to write the audit logs to.
    ///
    /// Overrides `sinks.dir` from the configuration.
    #[arg(short, long)]
    pub log_dir: Option<PathBuf>,

    /// Write the effective configuration to this path and exit.
    #[arg(long, value_name = "PATH")]
    pub write_config: Option<PathBuf>,

    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,
}

/// Check if the file exists.
#[inline(always)]
fn validate_file(file: &str) -> Result<PathBuf, String> {
    let path = Path::new(file);
    if path.exists() {
        Ok(path.to_owned())
    } else {
        Err(format!("File not found: {:?}", path))
    }
}

/// Check if the path exists and is a directory.
#[inline(always)]
fn validate_dir(dir: &str) -> Result<PathBuf, String> {
    let path = Path::new(dir);
    if !path.exists() {
        Err(format!("Path does not exist: {:?}", path))
    } else if !path.is_dir() {
        Err(format!("Path is not a directory: {:?}", path))
    } else {
        Ok(path.to_owned())
    }
}

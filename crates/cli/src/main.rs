use clap::Parser;
use config::Config;
use hostaudit::{cli::Cli, runtime, signals::wait_for_shutdown};
use std::pin::pin;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[cfg(feature = "jemalloc")]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(cli.verbosity.tracing_level_filter())
        .with_level(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    debug!(config = ?cli);

    let mut config = match &cli.conffile {
        Some(path) => Config::load(path)?,
        _ => Config::from_env()?,
    };
    if let Some(dir) = cli.log_dir {
        config.sinks.dir = dir;
    }

    if let Some(path) = cli.write_config {
        config.save(&path)?;
        info!(?path, "configuration written");
        return Ok(());
    }
    let Some(root) = cli.root else {
        anyhow::bail!("a directory to audit is required");
    };

    let cancel = CancellationToken::new();
    let mut app = pin!(runtime::run(root, config, cancel.clone()));

    tokio::select! {
        res = &mut app => {
            warn!("every observer stopped");
            return Ok(res?);
        }
        signal = wait_for_shutdown() => {
            let signal = signal?;
            info!(?signal, "shutting down");
            cancel.cancel();
        }
    }

    app.await?;
    Ok(())
}

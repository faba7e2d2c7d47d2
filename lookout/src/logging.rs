use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use crate::persistence::ACTIVITY;

/// Layout of activity log timestamps.
pub const ACTIVITY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Initialize logging to stdout and append save events to `activity_log`.
///
/// Console output honours `RUST_LOG` (default `info`). The activity log only
/// receives events on the [`ACTIVITY`] target, one line each.
pub fn init_logging(activity_log: &Path) -> anyhow::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(activity_log)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let console = fmt::layer().with_filter(filter);
    let activity = fmt::layer()
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .with_target(false)
        .with_level(false)
        .with_timer(ChronoLocal::new(ACTIVITY_TIME_FORMAT.to_string()))
        .with_filter(Targets::new().with_target(ACTIVITY, Level::INFO));
    tracing_subscriber::registry()
        .with(console)
        .with(activity)
        .try_init()?;
    Ok(())
}

use std::{fs::File, io, path::PathBuf, sync::Arc};

use directories::ProjectDirs;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Log file destination: the platform data dir, falling back to the
/// working directory.
fn log_directory() -> PathBuf {
    ProjectDirs::from("com", "tunedeck", "tunedeck")
        .map(|dirs| dirs.data_local_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Installs the global tracing subscriber, filtered by `TUNEDECK_LOG`
/// (defaulting to `info`) and writing to `tunedeck.log`. Call once from
/// the embedding application, before any store or service is built.
pub fn initialize_logging() -> io::Result<()> {
    let directory = log_directory();
    std::fs::create_dir_all(&directory)?;
    let log_file = File::create(directory.join("tunedeck.log"))?;

    let filter =
        EnvFilter::try_from_env("TUNEDECK_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(Arc::new(log_file)).with_ansi(false))
        .init();
    Ok(())
}

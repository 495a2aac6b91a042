//! Tracing bootstrap: stderr plus an append-only `sellwise.log` when the logs
//! directory is writable.

use sellwise_infrastructure::SellwisePaths;
use std::fs::{self, File, OpenOptions};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const LOG_FILE_NAME: &str = "sellwise.log";

pub fn default_directive(verbose: bool) -> &'static str {
    if verbose { "sellwise=debug" } else { "sellwise=info" }
}

pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let file_layer = open_log_file().map(|file| {
        tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(Mutex::new(file))
    });

    let result = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init();

    if let Err(e) = result {
        eprintln!("warning: logging already initialised: {}", e);
    }
}

fn open_log_file() -> Option<File> {
    let dir = SellwisePaths::logs_dir().ok()?;
    fs::create_dir_all(&dir).ok()?;
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(LOG_FILE_NAME))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(false), "sellwise=info");
        assert_eq!(default_directive(true), "sellwise=debug");
        assert!(EnvFilter::try_new(default_directive(true)).is_ok());
    }
}

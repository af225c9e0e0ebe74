// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Logging initialization
//!
//! Console output is always installed. With the `file-logging` feature and a
//! configured log directory, every run also writes into its own folder:
//! ```text
//! ./logs/
//!   └── run_20250101_120000/
//!       └── closedloop.log
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::cli::CrateDebugFlags;

/// Options for [`init_logging`]
#[derive(Debug, Clone)]
pub struct LoggingOptions {
    /// Level for every crate without a debug flag
    pub level: String,
    /// Base directory for per-run log folders (file logging only)
    pub log_dir: Option<PathBuf>,
    /// Number of most recent run folders kept in `log_dir`
    pub retention_runs: usize,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: None,
            retention_runs: 10,
        }
    }
}

/// Keeps file writers alive; logs are flushed when dropped.
pub struct LoggingGuard {
    #[cfg(feature = "file-logging")]
    _file_guard: Option<tracing_appender::non_blocking::WorkerGuard>,
    run_dir: Option<PathBuf>,
}

impl LoggingGuard {
    /// Folder of the current run, if file logging is active
    pub fn run_dir(&self) -> Option<&Path> {
        self.run_dir.as_deref()
    }
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Install the global tracing subscriber
///
/// # Errors
/// Fails if the filter directives are invalid, the run folder cannot be
/// created, or a global subscriber is already installed.
pub fn init_logging(debug_flags: &CrateDebugFlags, options: &LoggingOptions) -> Result<LoggingGuard> {
    let filter = debug_flags.to_filter_string(&options.level);
    let env_filter = EnvFilter::try_new(&filter)
        .with_context(|| format!("Invalid log filter: {}", filter))?;

    let mut layers: Vec<BoxedLayer> = Vec::new();
    layers.push(
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_file(false)
            .with_line_number(false)
            .boxed(),
    );

    #[cfg(feature = "file-logging")]
    let (file_guard, run_dir) = match &options.log_dir {
        Some(base) => {
            let run_dir = create_run_dir(base)?;
            cleanup_old_runs(base, options.retention_runs)?;

            let appender = tracing_appender::rolling::never(&run_dir, "closedloop.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            layers.push(
                tracing_subscriber::fmt::layer()
                    .with_writer(non_blocking)
                    .with_ansi(false)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .boxed(),
            );
            (Some(guard), Some(run_dir))
        }
        None => (None, None),
    };

    #[cfg(not(feature = "file-logging"))]
    let run_dir: Option<PathBuf> = None;

    Registry::default()
        .with(layers)
        .with(env_filter)
        .try_init()
        .context("A global tracing subscriber is already installed")?;

    #[cfg(not(feature = "file-logging"))]
    if let Some(dir) = &options.log_dir {
        tracing::warn!(
            "log_dir {} ignored: built without the file-logging feature",
            dir.display()
        );
    }

    Ok(LoggingGuard {
        #[cfg(feature = "file-logging")]
        _file_guard: file_guard,
        run_dir,
    })
}

/// Initialize console logging at `info` with flags from the environment
pub fn init_logging_default() -> Result<LoggingGuard> {
    init_logging(&crate::cli::parse_debug_flags(), &LoggingOptions::default())
}

/// Create `run_<timestamp>` below `base`
pub fn create_run_dir(base: &Path) -> Result<PathBuf> {
    let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    let run_dir = base.join(format!("run_{}", timestamp));
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("Failed to create log directory: {}", run_dir.display()))?;
    Ok(run_dir)
}

/// Remove the oldest `run_*` folders so that at most `retention_runs` remain
///
/// Folder names embed a sortable timestamp, so name order is age order.
pub fn cleanup_old_runs(base: &Path, retention_runs: usize) -> Result<usize> {
    if !base.exists() {
        return Ok(0);
    }

    let mut runs: Vec<PathBuf> = std::fs::read_dir(base)
        .with_context(|| format!("Failed to list log directory: {}", base.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_dir()
                && path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with("run_"))
        })
        .collect();

    if runs.len() <= retention_runs {
        return Ok(0);
    }

    runs.sort();
    let excess = runs.len() - retention_runs;
    let mut removed = 0;
    for path in runs.iter().take(excess) {
        match std::fs::remove_dir_all(path) {
            Ok(()) => removed += 1,
            Err(e) => eprintln!(
                "Warning: Failed to remove old log directory {}: {}",
                path.display(),
                e
            ),
        }
    }
    Ok(removed)
}

use std::fs::File;
use std::io::{self, stderr};
use std::path::PathBuf;
use std::sync::{LazyLock, Mutex};

use crate::board::zobrist::ZOBRIST;
use chrono::Local;
use miette::{Context, IntoDiagnostic};
use tracing::level_filters::LevelFilter;
use tracing::{Level, debug};
use tracing_appender::non_blocking;
use tracing_subscriber::reload;
use tracing_subscriber::{
    EnvFilter, Layer, fmt, layer::SubscriberExt, reload::Handle, util::SubscriberInitExt,
};

pub trait LogHandle: Send + Sync {
    fn set_filter(&self, new_filter: EnvFilter) -> miette::Result<()>;
}

impl<S> LogHandle for Handle<EnvFilter, S>
where
    S: tracing::Subscriber + Send + Sync + 'static,
{
    fn set_filter(&self, new_filter: EnvFilter) -> miette::Result<()> {
        self.modify(|current| *current = new_filter)
            .into_diagnostic()
    }
}

pub struct LogHandles {
    console_handle: Mutex<Box<dyn LogHandle>>,
    file_handle: Mutex<Box<dyn LogHandle>>,
    log_file: Option<PathBuf>,
}

/// Directory that receives log files when file logging is switched on
pub fn log_dir() -> PathBuf {
    std::env::temp_dir().join("castellan_logs")
}

fn open_log_file() -> io::Result<(File, PathBuf)> {
    let dir = log_dir();
    std::fs::create_dir_all(&dir)?;
    let timestamp = Local::now().format("%Y-%m-%d_%H-%M-%S");
    let path = dir.join(format!("castellan_{timestamp}.log"));
    Ok((File::create(&path)?, path))
}

/// Filter from the directives in `var`, falling back to `default`
fn env_filter(var: &str, default: LevelFilter) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(default.into())
        .with_env_var(var)
        .from_env_lossy()
}

static LOG_HANDLES: LazyLock<LogHandles> = LazyLock::new(|| {
    #[cfg(feature = "dev-tools")]
    color_backtrace::install();

    // Console Layer with its own reloadable filter
    let console_filter = env_filter(EnvFilter::DEFAULT_ENV, Level::INFO.into());
    let (console_filter, console_handle) = reload::Layer::new(console_filter);
    let console_layer = fmt::layer()
        .without_time()
        .with_writer(stderr)
        .with_filter(console_filter);

    // File Layer with its own reloadable filter (initially off)
    let file_filter = env_filter(EnvFilter::DEFAULT_ENV, LevelFilter::OFF);
    let (file_filter, file_handle) = reload::Layer::new(file_filter);

    // An unwritable temp dir leaves file logging as a no-op
    let (writer, guard, log_file) = match open_log_file() {
        Ok((file, path)) => {
            let (writer, guard) = non_blocking(file);
            (writer, guard, Some(path))
        }
        Err(_) => {
            let (writer, guard) = non_blocking(io::sink());
            (writer, guard, None)
        }
    };
    std::mem::forget(guard); // Keep the guard alive.

    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false) // No colors in file
        .with_filter(file_filter);

    // Another subscriber may already be installed, e.g. by a test harness
    let _ = tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init();

    LogHandles {
        console_handle: Mutex::new(Box::new(console_handle)),
        file_handle: Mutex::new(Box::new(file_handle)),
        log_file,
    }
});

pub fn set_log_level(level: Level) -> miette::Result<()> {
    let new_filter = EnvFilter::new(level.to_string());

    LOG_HANDLES
        .console_handle
        .lock()
        .map_err(|_| miette::miette!("Console log handle poisoned"))?
        .set_filter(new_filter)
        .with_context(|| format!("Failed to modify log filter to level: {level}"))
}

pub fn toggle_file_logging(enable: bool) -> miette::Result<()> {
    let new_filter = if enable {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("off")
    };

    LOG_HANDLES
        .file_handle
        .lock()
        .map_err(|_| miette::miette!("File log handle poisoned"))?
        .set_filter(new_filter)
        .context("Failed to modify log filter")
}

/// Path of this process's log file, if one could be created
pub fn log_file_path() -> Option<PathBuf> {
    LOG_HANDLES.log_file.clone()
}

/// Initialize tracing and backtrace. Safe to call repeatedly.
pub fn init() {
    LazyLock::force(&LOG_HANDLES);
    LazyLock::force(&ZOBRIST);
    debug!("Logging initialised");
}

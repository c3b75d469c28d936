use std::path::{Path, PathBuf};

use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

const LOG_NAME: &str = "storefront-admin";

type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync>;

/// Installs the global subscriber. Keep the value alive for the whole
/// process: dropping it flushes and stops the file writers.
pub struct Logger {
    pub guards: Vec<WorkerGuard>,
}

/// Where each log stream goes under the log directory.
#[derive(Debug, Clone, PartialEq)]
pub struct LogFiles {
    pub general: PathBuf,
    pub errors: PathBuf,
    pub general_json: PathBuf,
    pub errors_json: PathBuf,
}

impl LogFiles {
    pub fn under(dir: &Path) -> Self {
        LogFiles {
            general: dir.to_path_buf(),
            errors: dir.join("error"),
            general_json: dir.join("json"),
            errors_json: dir.join("error").join("json"),
        }
    }
}

/// Daily-rolling file sink with its own level filter.
fn file_layer<S>(dir: &Path, file: String, json: bool, level: &str, guards: &mut Vec<WorkerGuard>) -> BoxedLayer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let (writer, guard) = non_blocking(rolling::daily(dir, file));
    guards.push(guard);
    let layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);
    if json {
        layer.json().with_filter(EnvFilter::new(level)).boxed()
    } else {
        layer.with_filter(EnvFilter::new(level)).boxed()
    }
}

impl Logger {
    /// Console output filtered by `RUST_LOG`, plus text and JSON files under
    /// `LOG_DIR` (default `logs`). `FILE_LOG_LEVEL` and
    /// `ERROR_FILE_LOG_LEVEL` filter the general and error files.
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let dir = PathBuf::from(std::env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()));
        let files = LogFiles::under(&dir);
        std::fs::create_dir_all(&files.errors_json)?;
        std::fs::create_dir_all(&files.general_json)?;

        let console_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info,storefront_admin=debug"));
        let file_level = std::env::var("FILE_LOG_LEVEL").unwrap_or_else(|_| "debug".to_string());
        let error_level = std::env::var("ERROR_FILE_LOG_LEVEL").unwrap_or_else(|_| "error".to_string());

        let mut guards = Vec::with_capacity(4);
        let layers: Vec<BoxedLayer<Registry>> = vec![
            fmt::layer()
                .pretty()
                .with_target(true)
                .with_thread_ids(true)
                .with_filter(console_filter)
                .boxed(),
            file_layer(&files.general, format!("{}.log", LOG_NAME), false, &file_level, &mut guards),
            file_layer(&files.errors, format!("{}-error.log", LOG_NAME), false, &error_level, &mut guards),
            file_layer(&files.general_json, format!("{}.json", LOG_NAME), true, &file_level, &mut guards),
            file_layer(&files.errors_json, format!("{}-error.json", LOG_NAME), true, &error_level, &mut guards),
        ];

        tracing_subscriber::registry().with(layers).try_init()?;
        Ok(Logger { guards })
    }
}

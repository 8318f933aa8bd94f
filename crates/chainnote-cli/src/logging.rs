//! Tracing subscriber setup.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{CliConfig, LogFormat};

/// Install the global subscriber.
///
/// Logs go to stderr so stdout stays clean JSON output. `RUST_LOG` overrides
/// the default filter. The returned guard must live until exit or buffered
/// file output is lost.
pub fn init_tracing(config: &CliConfig) -> Option<WorkerGuard> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "chainnote=info,chainnote_db=info,chainnote_core=warn".into());

    let registry = tracing_subscriber::registry().with(env_filter);

    if let Some(ref path) = config.log_file {
        let file_dir = path.parent().unwrap_or(Path::new("."));
        let file_name = path
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("chainnote.log");
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        match config.log_format {
            LogFormat::Json => registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking),
                )
                .init(),
            LogFormat::Text => registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(non_blocking)
                        // no ANSI in files unless asked
                        .with_ansi(config.log_ansi.unwrap_or(false)),
                )
                .init(),
        }
        Some(guard)
    } else {
        match config.log_format {
            LogFormat::Json => registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init(),
            LogFormat::Text => {
                let mut layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
                if let Some(ansi) = config.log_ansi {
                    layer = layer.with_ansi(ansi);
                }
                registry.with(layer).init();
            }
        }
        None
    }
}

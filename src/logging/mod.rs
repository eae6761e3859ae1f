/*!
 * Logging Module
 * tracing subscriber with rolling files and a console writer
 */
pub mod middleware;

use std::io;
use tracing::Subscriber;
use tracing_appender::{non_blocking, non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{
    filter::LevelFilter, fmt, fmt::MakeWriter, layer::SubscriberExt, registry::LookupSpan,
    util::SubscriberInitExt, EnvFilter, Layer,
};

use crate::config::AppConfig;

/// Writer guards; buffered lines are flushed when these drop
pub struct LogGuards {
    _file: WorkerGuard,
    _error: WorkerGuard,
    _console: WorkerGuard,
}

/// Directive used when `RUST_LOG` is absent
fn default_directive(level: &str) -> String {
    format!("portfolio_site={},tower_http=debug,axum=debug", level)
}

/// JSON error-only layer. Generic over the stack it joins, since the
/// production and development stacks differ in type.
fn error_layer<S, W>(writer: W) -> impl Layer<S> + Send + Sync
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    fmt::layer()
        .json()
        .with_writer(writer)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_filter(LevelFilter::ERROR)
}

/// Initialize the logging system
pub fn init(config: &AppConfig) -> LogGuards {
    let is_production = config.is_production();

    let log_dir = std::env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string());
    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        eprintln!("Could not create log directory {}: {}", log_dir, e);
    }

    let (file_writer, file_guard) = non_blocking(rolling::daily(&log_dir, "app.log"));
    let (error_writer, error_guard) = non_blocking(rolling::daily(&log_dir, "error.log"));
    let (console_writer, console_guard) = non_blocking(io::stdout());

    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| {
        if is_production {
            "info".to_string()
        } else {
            "debug".to_string()
        }
    });

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(&log_level)));

    let subscriber = tracing_subscriber::registry().with(env_filter);

    // Errors always get their own file so they survive log rotation noise
    if is_production {
        let file_layer = fmt::layer()
            .json()
            .with_writer(file_writer)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true);

        let console_layer = fmt::layer()
            .json()
            .with_writer(console_writer)
            .with_target(false);

        subscriber
            .with(file_layer)
            .with(error_layer(error_writer))
            .with(console_layer)
            .init();
    } else {
        let file_layer = fmt::layer()
            .with_writer(file_writer)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false);

        let console_layer = fmt::layer()
            .with_writer(console_writer)
            .with_target(true)
            .pretty();

        subscriber
            .with(file_layer)
            .with(error_layer(error_writer))
            .with(console_layer)
            .init();
    }

    tracing::info!("Logging initialized for {} environment", config.environment);

    LogGuards {
        _file: file_guard,
        _error: error_guard,
        _console: console_guard,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn lines(&self) -> Vec<String> {
            String::from_utf8(self.0.lock().unwrap().clone())
                .unwrap()
                .lines()
                .map(str::to_string)
                .collect()
        }
    }

    fn emit() {
        tracing::info!("routine");
        tracing::error!("broken");
    }

    #[test]
    fn test_error_layer_joins_both_stacks() {
        let production = Captured::default();
        let writer = production.clone();
        let subscriber = tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(io::sink))
            .with(error_layer(move || writer.clone()));
        tracing::subscriber::with_default(subscriber, emit);

        let development = Captured::default();
        let writer = development.clone();
        let subscriber = tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(io::sink))
            .with(error_layer(move || writer.clone()));
        tracing::subscriber::with_default(subscriber, emit);

        for captured in [production, development] {
            let lines = captured.lines();
            assert_eq!(lines.len(), 1);
            let line: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
            assert_eq!(line["level"], "ERROR");
            assert_eq!(line["fields"]["message"], "broken");
        }
    }

    #[test]
    fn test_default_directive_targets_crate() {
        let directive = default_directive("info");
        assert!(directive.starts_with("portfolio_site=info"));
        assert!(EnvFilter::try_new(directive).is_ok());
    }
}

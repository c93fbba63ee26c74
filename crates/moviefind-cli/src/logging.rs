//! Tracing subscriber setup.

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::filter::EnvFilter;
#[cfg(not(feature = "otel"))]
use tracing_subscriber::fmt;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
#[cfg(feature = "otel")]
use tracing_subscriber::layer::SubscriberExt;
#[cfg(feature = "otel")]
use tracing_subscriber::util::SubscriberInitExt;

/// Where formatted log lines go.
#[derive(Debug)]
pub enum LogSink {
    /// Standard output (non-interactive commands).
    Stdout,
    /// Appended to a file.
    File(File),
    /// Dropped. Used while the TUI owns the terminal.
    Discard,
}

impl LogSink {
    /// Picks the sink for a command.
    ///
    /// # Errors
    ///
    /// Returns an error if the log file cannot be opened.
    pub fn select(log_file: Option<&Path>, interactive: bool) -> Result<Self> {
        match log_file {
            Some(path) => {
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .with_context(|| format!("failed to open log file {}", path.display()))?;
                Ok(Self::File(file))
            }
            None if interactive => Ok(Self::Discard),
            None => Ok(Self::Stdout),
        }
    }

    const fn ansi(&self) -> bool {
        matches!(self, Self::Stdout)
    }

    fn into_writer(self) -> BoxMakeWriter {
        match self {
            Self::Stdout => BoxMakeWriter::new(std::io::stdout),
            Self::File(file) => BoxMakeWriter::new(Mutex::new(file)),
            Self::Discard => BoxMakeWriter::new(std::io::sink),
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs the global subscriber.
#[cfg(not(feature = "otel"))]
pub fn init(sink: LogSink) {
    let ansi = sink.ansi();
    fmt()
        .with_env_filter(env_filter())
        .with_target(false)
        .with_ansi(ansi)
        .with_writer(sink.into_writer())
        .init();
}

/// Installs the global subscriber, exporting spans over OTLP when
/// `OTEL_EXPORTER_OTLP_ENDPOINT` is set.
#[cfg(feature = "otel")]
pub fn init(sink: LogSink) {
    let ansi = sink.ansi();
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_ansi(ansi)
        .with_writer(sink.into_writer());

    let otel_layer = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
        .ok()
        .and_then(|_| {
            let exporter = opentelemetry_otlp::SpanExporter::builder()
                .with_http()
                .build()
                .ok()?;

            let tracer_provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
                .with_simple_exporter(exporter)
                .build();

            let tracer = opentelemetry::trace::TracerProvider::tracer(
                &tracer_provider,
                env!("CARGO_PKG_NAME"),
            );
            opentelemetry::global::set_tracer_provider(tracer_provider);

            Some(tracing_opentelemetry::layer().with_tracer(tracer))
        });

    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt_layer)
        .with(otel_layer)
        .init();
}

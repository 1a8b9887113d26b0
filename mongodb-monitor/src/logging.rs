//! Daily log file setup
//!
//! One append-mode file per calendar day (`<prefix>.<YYYY-MM-DD>.log`), lines
//! shaped as `2024-01-31 12:00:00,123 - INFO: message`.
//!
//! The file date is the UTC day (tracing-appender rolls at UTC midnight) while
//! line timestamps use local time, so on a non-UTC host a file holds lines
//! from two local calendar days.

use crate::config::LogConfig;
use chrono::Local;
use std::fmt;
use tracing::{Event, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::EnvFilter;

/// `timestamp - LEVEL: message` line format
#[derive(Debug, Clone, Copy, Default)]
pub struct LineFormat;

impl<S, N> FormatEvent<S, N> for LineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(&self, ctx: &FmtContext<'_, S, N>, mut writer: Writer<'_>, event: &Event<'_>) -> fmt::Result {
        write!(
            writer,
            "{} - {}: ",
            Local::now().format("%Y-%m-%d %H:%M:%S,%3f"),
            event.metadata().level()
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Build the daily appender for `config`
pub fn daily_appender(config: &LogConfig) -> Result<RollingFileAppender, tracing_appender::rolling::InitError> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(&config.file_prefix)
        .filename_suffix("log")
        .build(&config.dir)
}

/// Install the global subscriber. Call once at startup and keep the guard
/// alive until exit so buffered lines are flushed.
pub fn init(config: &LogConfig) -> anyhow::Result<WorkerGuard> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let (writer, guard) = tracing_appender::non_blocking(daily_appender(config)?);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .event_format(LineFormat)
                .with_ansi(false)
                .with_writer(writer),
        )
        .try_init()?;

    Ok(guard)
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Log file setup: plain-text `tracing` output appended to `<output>/log.log`.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::{Local, SecondsFormat};
use taskmaster_core::AppConfig;
use tracing::Subscriber;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::util::SubscriberInitExt;

/// Environment variable holding an `EnvFilter` directive.
pub const LOG_ENV: &str = "TASKMASTER_LOG";

/// Local time, RFC 3339 with milliseconds.
struct LocalTimestamp;

impl FormatTime for LocalTimestamp {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", Local::now().to_rfc3339_opts(SecondsFormat::Millis, false))
    }
}

/// Plain-text lines: timestamp, level, message and fields.
fn subscriber<W>(filter: EnvFilter, writer: W) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(LocalTimestamp)
        .with_target(false)
        .with_ansi(false)
        .with_writer(writer)
        .finish()
}

/// Install the global subscriber. Returns the log file path, or `None` when
/// the file could not be opened and output went to stderr instead.
pub fn init(config: &AppConfig) -> Option<PathBuf> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    let path = config.log_path();
    let opened = path
        .parent()
        .map_or(Ok(()), std::fs::create_dir_all)
        .and_then(|()| OpenOptions::new().create(true).append(true).open(&path));

    match opened {
        Ok(file) => {
            subscriber(filter, Mutex::new(file)).init();
            Some(path)
        }
        Err(err) => {
            subscriber(filter, std::io::stderr).init();
            tracing::warn!(path = %path.display(), %err, "log file unavailable, logging to stderr");
            None
        }
    }
}

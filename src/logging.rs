use std::borrow::Cow;
use std::io;

use sentry::integrations::tracing::EventFilter;
use sentry::{ClientInitGuard, ClientOptions};
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::prelude::*;

/// Initialises tracing and Sentry, once per process.
///
/// Log lines go to the standard error, so that the standard output stays clean
/// for the invocation responses.
pub fn init(sentry_dsn: Option<String>, traces_sample_rate: f32) -> Result<ClientInitGuard> {
    let guard = sentry::init((
        sentry_dsn,
        ClientOptions {
            release: Some(Cow::Borrowed(env!("CARGO_PKG_VERSION"))),
            traces_sample_rate,
            ..Default::default()
        },
    ));

    let sentry_filter = EnvFilter::try_from_env("REGRESSION_API_SENTRY_LOG")
        .or_else(|_| EnvFilter::try_new("regression_api=debug"))?;
    let sentry_layer = sentry::integrations::tracing::layer()
        .event_filter(|metadata| match *metadata.level() {
            Level::ERROR | Level::WARN => EventFilter::Event,
            _ => EventFilter::Breadcrumb,
        })
        .with_filter(sentry_filter);

    let format_filter = EnvFilter::try_from_env("REGRESSION_API_LOG")
        .or_else(|_| EnvFilter::try_new("regression_api=info"))?;
    let format_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_filter(format_filter);

    tracing_subscriber::Registry::default()
        .with(sentry_layer)
        .with(format_layer)
        .try_init()
        .context("failed to install the tracing subscriber")?;

    Ok(guard)
}

pub fn format_elapsed(instant: Instant) -> String {
    humantime::format_duration(instant.elapsed()).to_string()
}

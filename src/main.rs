#![warn(clippy::all)]

use clap::Parser;

use crate::opts::{Opts, Subcommand};
use crate::prelude::*;

mod api;
mod invoke;
mod logging;
mod opts;
mod prelude;
mod regression;
mod web;

#[tokio::main]
async fn main() -> Result {
    let opts = Opts::parse();
    let _sentry_guard = logging::init(opts.sentry_dsn.clone(), opts.traces_sample_rate)?;

    let start_instant = Instant::now();
    let result = match &opts.subcommand {
        Subcommand::Web(opts) => web::run(opts).await,
        Subcommand::Invoke(opts) => invoke::run(opts).await,
    };
    match &result {
        Ok(_) => debug!(elapsed = %logging::format_elapsed(start_instant), "finished"),
        Err(error) => error!("fatal error: {:#}", error),
    }
    result
}

//! CLI options.

use clap::{Args, Parser};

pub mod parsers;

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
pub struct Opts {
    /// Sentry DSN
    #[arg(short, long, env = "SENTRY_DSN")]
    pub sentry_dsn: Option<String>,

    /// Sentry performance monitoring sample rate
    #[arg(
        long,
        default_value = "0",
        env = "TRACES_SAMPLE_RATE",
        value_parser = parsers::sample_rate,
    )]
    pub traces_sample_rate: f32,

    #[command(subcommand)]
    pub subcommand: Subcommand,
}

#[derive(clap::Subcommand)]
pub enum Subcommand {
    Web(WebOpts),
    Invoke(InvokeOpts),
}

/// Runs the persistent HTTP listener
#[derive(Args)]
pub struct WebOpts {
    /// Web application bind host
    #[arg(long, default_value = "::", env = "REGRESSION_API_HOST")]
    pub host: String,

    /// Web application bind port
    #[arg(
        short,
        long,
        default_value = "8080",
        env = "PORT",
        value_parser = parsers::non_zero_u16,
    )]
    pub port: u16,
}

/// Handles a single routed event and prints the response object
#[derive(Args)]
pub struct InvokeOpts {
    /// Path to the event JSON, the event is read from the standard input when omitted
    #[arg(long)]
    pub event: Option<std::path::PathBuf>,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn verify_opts_ok() {
        Opts::command().debug_assert();
    }

    #[test]
    fn parse_web_ok() -> crate::Result {
        let opts = Opts::try_parse_from(["regression-api", "web", "--host", "127.0.0.1", "-p", "9000"])?;
        match opts.subcommand {
            Subcommand::Web(opts) => {
                assert_eq!(opts.host, "127.0.0.1");
                assert_eq!(opts.port, 9000);
            }
            Subcommand::Invoke(_) => unreachable!(),
        }
        Ok(())
    }

    #[test]
    fn parse_invoke_ok() -> crate::Result {
        let opts = Opts::try_parse_from([
            "regression-api",
            "--traces-sample-rate",
            "0.5",
            "invoke",
            "--event",
            "event.json",
        ])?;
        assert!((opts.traces_sample_rate - 0.5).abs() < f32::EPSILON);
        match opts.subcommand {
            Subcommand::Invoke(opts) => {
                assert_eq!(opts.event.as_deref(), Some(std::path::Path::new("event.json")))
            }
            Subcommand::Web(_) => unreachable!(),
        }
        Ok(())
    }

    #[test]
    fn zero_port_fails() {
        assert!(Opts::try_parse_from(["regression-api", "web", "--port", "0"]).is_err());
    }
}

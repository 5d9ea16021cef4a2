pub use std::time::Duration as StdDuration;
pub use std::time::Instant;

pub use anyhow::{anyhow, Context};
pub use tracing::{debug, error, info, instrument, warn};

pub type Result<T = (), E = anyhow::Error> = std::result::Result<T, E>;

#![forbid(unsafe_code)]

use std::time::Duration;

mod error;

pub use error::*;

pub const DEFAULT_EXPIRATION: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

use std::time::Duration;

use simpcache_common::{DEFAULT_CLEANUP_INTERVAL, DEFAULT_EXPIRATION};

/// Configuração do cache: expiração padrão e intervalo do janitor.
///
/// `default_expiration == None` faz com que entradas escritas com
/// [`Expiration::Default`](crate::Expiration::Default) nunca expirem.
/// `cleanup_interval` zero desabilita o janitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    pub default_expiration: Option<Duration>,
    pub cleanup_interval: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_expiration: Some(DEFAULT_EXPIRATION),
            cleanup_interval: DEFAULT_CLEANUP_INTERVAL,
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_expiration(mut self, ttl: Duration) -> Self {
        self.default_expiration = Some(ttl);
        self
    }

    pub fn with_no_expiration(mut self) -> Self {
        self.default_expiration = None;
        self
    }

    pub fn with_cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = interval;
        self
    }
}

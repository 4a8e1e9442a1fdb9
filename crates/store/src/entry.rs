use tokio::time::{Duration, Instant};

/// Política de expiração informada na escrita.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Expiration {
    /// Usa a expiração padrão do cache, resolvida no momento da escrita.
    #[default]
    Default,
    /// Nunca expira.
    Never,
    /// Expira após a duração informada, contada a partir da escrita.
    After(Duration),
}

impl Expiration {
    /// Resolve a política em um instante absoluto (`None` = nunca expira).
    pub(crate) fn deadline(self, default: Option<Duration>, now: Instant) -> Option<Instant> {
        let ttl = match self {
            Expiration::Default => default?,
            Expiration::Never => return None,
            Expiration::After(ttl) => ttl,
        };
        // Prazo fora do alcance do relógio equivale a nunca expirar.
        now.checked_add(ttl)
    }
}

impl From<Duration> for Expiration {
    fn from(ttl: Duration) -> Self {
        Expiration::After(ttl)
    }
}

/// Entrada no cache: valor + instante de expiração opcional.
#[derive(Debug, Clone)]
pub(crate) struct Entry<V> {
    pub value: V,
    pub expires_at: Option<Instant>,
}

impl<V> Entry<V> {
    pub fn new(value: V, expires_at: Option<Instant>) -> Self {
        Self { value, expires_at }
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    pub fn is_expired_at(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|t| now >= t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_resolves_to_store_default() {
        let now = Instant::now();
        let ttl = Duration::from_secs(2);
        assert_eq!(
            Expiration::Default.deadline(Some(ttl), now),
            Expiration::After(ttl).deadline(None, now)
        );
        assert_eq!(Expiration::Default.deadline(None, now), None);
    }

    #[test]
    fn never_ignores_store_default() {
        let now = Instant::now();
        assert_eq!(
            Expiration::Never.deadline(Some(Duration::from_secs(1)), now),
            None
        );
    }

    #[test]
    fn zero_ttl_expires_immediately() {
        let now = Instant::now();
        let entry = Entry::new(1, Expiration::After(Duration::ZERO).deadline(None, now));
        assert!(entry.is_expired_at(now));
    }

    #[test]
    fn entry_without_deadline_never_expires() {
        let entry = Entry::new("v", None);
        assert!(!entry.is_expired());
        assert!(!entry.is_expired_at(Instant::now() + Duration::from_secs(86_400 * 365)));
    }

    #[test]
    fn entry_expires_at_deadline() {
        let now = Instant::now();
        let entry = Entry::new("v", Some(now + Duration::from_millis(10)));
        assert!(!entry.is_expired_at(now));
        assert!(entry.is_expired_at(now + Duration::from_millis(10)));
    }

    #[test]
    fn overflowing_deadline_never_expires() {
        let now = Instant::now();
        assert_eq!(Expiration::After(Duration::MAX).deadline(None, now), None);
        assert_eq!(Expiration::Default.deadline(Some(Duration::MAX), now), None);
    }

    #[test]
    fn from_duration_is_explicit_ttl() {
        let ttl = Duration::from_millis(250);
        assert_eq!(Expiration::from(ttl), Expiration::After(ttl));
    }
}

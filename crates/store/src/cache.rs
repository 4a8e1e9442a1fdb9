use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tokio::time::{Duration, Instant};
use tracing::{debug, warn};

use simpcache_common::{CacheError, CacheResult};

use crate::config::CacheConfig;
use crate::entry::{Entry, Expiration};
use crate::janitor::{self, Janitor, JanitorState};

/// Chaves aceitas pelo cache: qualquer tipo que se empresta como `str`.
///
/// `Hash` e `Eq` da chave precisam coincidir com os do `str` emprestado;
/// caso contrário `get(&str)` não encontra a entrada.
pub trait CacheKey: Borrow<str> + Eq + Hash + Send + Sync + 'static {}

impl<T> CacheKey for T where T: Borrow<str> + Eq + Hash + Send + Sync + 'static {}

/// Estado compartilhado entre os handles do cache e o janitor.
pub(crate) struct Shared<K, V> {
    items: RwLock<HashMap<K, Entry<V>>>,
    default_expiration: Option<Duration>,
    cleanup_interval: Duration,
    janitor: Mutex<Janitor>,
}

impl<K: CacheKey, V> Shared<K, V> {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            items: RwLock::new(HashMap::new()),
            default_expiration: config.default_expiration,
            cleanup_interval: config.cleanup_interval,
            janitor: Mutex::new(Janitor::new()),
        }
    }

    fn resolve(&self, expiration: Expiration) -> Option<Instant> {
        expiration.deadline(self.default_expiration, Instant::now())
    }

    pub fn insert(&self, key: K, value: V, expiration: Expiration) {
        let entry = Entry::new(value, self.resolve(expiration));
        self.items.write().insert(key, entry);
    }

    /// Remove todas as entradas com prazo vencido. Retorna quantas saíram.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut items = self.items.write();
        let before = items.len();
        items.retain(|_, entry| !entry.is_expired_at(now));
        before - items.len()
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }
}

/// Handle para o cache in-memory com expiração por entrada.
///
/// Clonar o handle é barato: todos os clones enxergam o mesmo mapa. Leituras
/// usam o lock compartilhado e escritas o exclusivo; entradas expiradas ficam
/// invisíveis na leitura mesmo antes do janitor removê-las.
///
/// Nenhuma atividade em background começa sozinha: o janitor só roda após
/// [`Cache::start_janitor`]. Ao descartar o último handle o janitor encerra.
pub struct Cache<K, V> {
    shared: Arc<Shared<K, V>>,
}

impl<K, V> Clone for Cache<K, V> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<K, V> Cache<K, V>
where
    K: CacheKey,
    V: Send + Sync + 'static,
{
    /// `default_expiration == None` significa que o padrão é nunca expirar.
    pub fn new(default_expiration: Option<Duration>, cleanup_interval: Duration) -> Self {
        Self::with_config(CacheConfig {
            default_expiration,
            cleanup_interval,
        })
    }

    pub fn with_config(config: CacheConfig) -> Self {
        Cache {
            shared: Arc::new(Shared::new(config)),
        }
    }

    pub fn default_expiration(&self) -> Option<Duration> {
        self.shared.default_expiration
    }

    pub fn cleanup_interval(&self) -> Duration {
        self.shared.cleanup_interval
    }

    // --- Escrita ---

    /// Grava o valor, sobrescrevendo qualquer entrada anterior da chave.
    pub fn set(&self, key: K, value: V, expiration: Expiration) -> CacheResult<()> {
        self.shared.insert(key, value, expiration);
        Ok(())
    }

    /// Grava apenas se a chave não existe (ou está expirada).
    pub fn add(&self, key: K, value: V, expiration: Expiration) -> CacheResult<()> {
        let expires_at = self.shared.resolve(expiration);
        let mut items = self.shared.items.write();
        if let Some(entry) = items.get(Borrow::<str>::borrow(&key))
            && !entry.is_expired()
        {
            return Err(CacheError::KeyExists);
        }
        items.insert(key, Entry::new(value, expires_at));
        Ok(())
    }

    /// Grava apenas se a chave existe e ainda não expirou.
    pub fn replace(&self, key: K, value: V, expiration: Expiration) -> CacheResult<()> {
        let expires_at = self.shared.resolve(expiration);
        let mut items = self.shared.items.write();
        let live = items
            .get(Borrow::<str>::borrow(&key))
            .is_some_and(|entry| !entry.is_expired());
        if !live {
            return Err(CacheError::KeyNotFound);
        }
        items.insert(key, Entry::new(value, expires_at));
        Ok(())
    }

    pub fn delete(&self, key: &str) {
        self.shared.items.write().remove(key);
    }

    /// Remove a chave e retorna o valor se ainda estava válido.
    pub fn take(&self, key: &str) -> Option<V> {
        let entry = self.shared.items.write().remove(key)?;
        if entry.is_expired() {
            return None;
        }
        Some(entry.value)
    }

    /// Executa uma varredura no thread atual, a mesma que o janitor faz a cada tick.
    pub fn delete_expired(&self) -> usize {
        let removed = self.shared.purge_expired();
        debug!("{removed} chaves expiradas removidas");
        removed
    }

    pub fn flush(&self) {
        self.shared.items.write().clear();
    }

    // --- Leitura ---

    /// Número bruto de entradas, incluindo expiradas ainda não varridas.
    pub fn len(&self) -> usize {
        self.shared.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // --- Janitor ---

    /// Inicia a varredura periódica numa task Tokio.
    ///
    /// Falha se `cleanup_interval` é zero, se não há runtime Tokio no
    /// contexto atual, ou se o janitor já foi iniciado ou encerrado.
    pub fn start_janitor(&self) -> CacheResult<()> {
        let period = self.shared.cleanup_interval;
        if period.is_zero() {
            return Err(CacheError::InvalidConfiguration(
                "cleanup_interval deve ser maior que zero".into(),
            ));
        }
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| CacheError::NoRuntime)?;

        let stop_rx = self.shared.janitor.lock().launch()?;
        runtime.spawn(janitor::run(Arc::downgrade(&self.shared), period, stop_rx));

        debug!("janitor iniciado (intervalo {period:?})");
        Ok(())
    }

    /// Encerra o janitor. Chamar duas vezes retorna [`CacheError::DoubleShutdown`].
    pub fn shutdown(&self) -> CacheResult<()> {
        let result = self.shared.janitor.lock().stop();
        if result.is_err() {
            warn!("shutdown em janitor já encerrado");
        }
        result
    }

    pub fn janitor_state(&self) -> JanitorState {
        self.shared.janitor.lock().state()
    }
}

impl<K, V> Cache<K, V>
where
    K: CacheKey,
    V: Clone + Send + Sync + 'static,
{
    pub fn get(&self, key: &str) -> Option<V> {
        let items = self.shared.items.read();
        let entry = items.get(key)?;
        if entry.is_expired() {
            return None;
        }
        Some(entry.value.clone())
    }

    /// Valor e instante de expiração (`None` = nunca expira).
    pub fn get_with_expiration(&self, key: &str) -> Option<(V, Option<Instant>)> {
        let items = self.shared.items.read();
        let entry = items.get(key)?;
        if entry.is_expired() {
            return None;
        }
        Some((entry.value.clone(), entry.expires_at))
    }

    /// Snapshot das entradas válidas. Sem atomicidade em relação a escritas posteriores.
    pub fn items(&self) -> Vec<(K, V)>
    where
        K: Clone,
    {
        let now = Instant::now();
        self.shared
            .items
            .read()
            .iter()
            .filter(|(_, entry)| !entry.is_expired_at(now))
            .map(|(key, entry)| (key.clone(), entry.value.clone()))
            .collect()
    }
}

impl<K, V> Default for Cache<K, V>
where
    K: CacheKey,
    V: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::with_config(CacheConfig::default())
    }
}

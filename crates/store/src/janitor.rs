use std::mem;
use std::sync::Weak;

use tokio::sync::oneshot;
use tokio::time::{Duration, Instant, MissedTickBehavior, interval_at};
use tracing::debug;

use simpcache_common::{CacheError, CacheResult};

use crate::cache::{CacheKey, Shared};

/// Estado observável do janitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JanitorState {
    /// Nunca foi iniciado.
    Idle,
    Running,
    /// Terminal: um janitor encerrado não é reiniciado.
    Stopped,
}

/// Máquina de estados do janitor, guardada junto ao estado do cache.
///
/// O canal de shutdown é criado junto com o cache; o receiver segue para a
/// task quando o janitor é iniciado e o sender fica aqui até o shutdown.
pub(crate) enum Janitor {
    Idle {
        stop_tx: oneshot::Sender<()>,
        stop_rx: oneshot::Receiver<()>,
    },
    Running {
        stop_tx: oneshot::Sender<()>,
    },
    Stopped,
}

impl Janitor {
    pub fn new() -> Self {
        let (stop_tx, stop_rx) = oneshot::channel();
        Janitor::Idle { stop_tx, stop_rx }
    }

    pub fn state(&self) -> JanitorState {
        match self {
            Janitor::Idle { .. } => JanitorState::Idle,
            Janitor::Running { .. } => JanitorState::Running,
            Janitor::Stopped => JanitorState::Stopped,
        }
    }

    /// Idle → Running. Retorna o receiver que a task deve escutar.
    pub fn launch(&mut self) -> CacheResult<oneshot::Receiver<()>> {
        match mem::replace(self, Janitor::Stopped) {
            Janitor::Idle { stop_tx, stop_rx } => {
                *self = Janitor::Running { stop_tx };
                Ok(stop_rx)
            }
            running @ Janitor::Running { .. } => {
                *self = running;
                Err(CacheError::JanitorRunning)
            }
            Janitor::Stopped => Err(CacheError::JanitorStopped),
        }
    }

    /// Qualquer estado → Stopped. Falha apenas se já estava parado.
    pub fn stop(&mut self) -> CacheResult<()> {
        match mem::replace(self, Janitor::Stopped) {
            Janitor::Idle { .. } => Ok(()),
            Janitor::Running { stop_tx } => {
                // A task pode já ter saído sozinha (estado descartado)
                let _ = stop_tx.send(());
                Ok(())
            }
            Janitor::Stopped => Err(CacheError::DoubleShutdown),
        }
    }
}

/// Loop do janitor: a cada `period` purga as entradas expiradas.
///
/// Mantém apenas uma referência fraca ao estado do cache. Sai quando recebe
/// o sinal de shutdown, quando o sender é descartado junto com o cache, ou
/// quando o estado não pode mais ser promovido.
pub(crate) async fn run<K, V>(
    shared: Weak<Shared<K, V>>,
    period: Duration,
    mut stop_rx: oneshot::Receiver<()>,
) where
    K: CacheKey,
    V: Send + Sync + 'static,
{
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = &mut stop_rx => break,
            _ = ticker.tick() => {
                let Some(shared) = shared.upgrade() else { break };
                let removed = shared.purge_expired();
                if removed > 0 {
                    debug!("janitor removeu {removed} chaves expiradas");
                }
            }
        }
    }

    debug!("janitor encerrado");
}

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use clap::Parser;
use tokio::signal;
use tokio::time::{Duration, Instant, interval};
use tracing::info;

use simpcache_common::{DEFAULT_CLEANUP_INTERVAL, DEFAULT_EXPIRATION};
use simpcache_store::{Cache, CacheConfig, CacheResult, Expiration};

#[derive(Parser, Debug)]
#[command(
    name = "simpcache",
    about = "Load driver: gera carga concorrente contra simpcache-store (demo, não é um CLI do cache)"
)]
struct Args {
    /// Expiração padrão das entradas, em milissegundos
    #[arg(long, default_value_t = DEFAULT_EXPIRATION.as_millis() as u64)]
    default_ttl_ms: u64,
    /// Entradas com expiração padrão nunca expiram (ignora --default-ttl-ms)
    #[arg(long)]
    no_expiry: bool,
    /// Intervalo do janitor em milissegundos (0 desabilita)
    #[arg(long, default_value_t = DEFAULT_CLEANUP_INTERVAL.as_millis() as u64)]
    cleanup_ms: u64,
    #[arg(long, default_value_t = 4)]
    workers: usize,
    /// Chaves distintas por worker
    #[arg(long, default_value_t = 1_000)]
    keys: usize,
    /// Duração da carga em milissegundos
    #[arg(long, default_value_t = 5_000)]
    duration_ms: u64,
}

impl Args {
    fn config(&self) -> CacheConfig {
        let config =
            CacheConfig::new().with_cleanup_interval(Duration::from_millis(self.cleanup_ms));
        if self.no_expiry {
            config.with_no_expiration()
        } else {
            config.with_default_expiration(Duration::from_millis(self.default_ttl_ms))
        }
    }
}

/// Contadores da carga.
#[derive(Default)]
struct Stats {
    sets: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    deletes: AtomicU64,
}

/// Política usada na operação `n`: alterna entre padrão, sem expiração e TTL curto.
fn expiration_for(n: usize) -> Expiration {
    match n % 3 {
        0 => Expiration::Default,
        1 => Expiration::Never,
        _ => Expiration::After(Duration::from_millis((n % 500) as u64 + 1)),
    }
}

async fn run_worker(
    id: usize,
    cache: Cache<String, u64>,
    keys: usize,
    stats: Arc<Stats>,
    until: Instant,
) -> CacheResult<()> {
    let mut n = 0usize;
    while Instant::now() < until {
        // Lotes pequenos entre yields para não monopolizar o worker do runtime
        for _ in 0..100 {
            let key = format!("w{id}:k{}", n % keys);
            match n % 10 {
                0 => {
                    cache.delete(&key);
                    stats.deletes.fetch_add(1, Ordering::Relaxed);
                }
                1..=4 => {
                    cache.set(key, n as u64, expiration_for(n))?;
                    stats.sets.fetch_add(1, Ordering::Relaxed);
                }
                _ => {
                    if cache.get(&key).is_some() {
                        stats.hits.fetch_add(1, Ordering::Relaxed);
                    } else {
                        stats.misses.fetch_add(1, Ordering::Relaxed);
                    }
                }
            }
            n += 1;
        }
        tokio::task::yield_now().await;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "simpcache_cli=info,simpcache_store=info".into()),
        )
        .init();

    let args = Args::parse();
    let config = args.config();
    let cache: Cache<String, u64> = Cache::with_config(config);

    if config.cleanup_interval.is_zero() {
        info!("janitor desabilitado (cleanup_ms = 0)");
    } else {
        cache.start_janitor()?;
        info!("janitor iniciado a cada {:?}", config.cleanup_interval);
    }

    let stats = Arc::new(Stats::default());
    let until = Instant::now() + Duration::from_millis(args.duration_ms);

    let mut handles = Vec::with_capacity(args.workers);
    for id in 0..args.workers {
        handles.push(tokio::spawn(run_worker(
            id,
            cache.clone(),
            args.keys.max(1),
            stats.clone(),
            until,
        )));
    }

    let mut report = interval(Duration::from_secs(1));
    report.tick().await;
    loop {
        tokio::select! {
            _ = report.tick() => {
                info!("{} entradas no mapa", cache.len());
                if Instant::now() >= until {
                    break;
                }
            }
            _ = signal::ctrl_c() => {
                info!("shutdown signal recebido");
                break;
            }
        }
    }

    // Workers param sozinhos no prazo; abort cobre o caso do ctrl-c
    for h in handles {
        h.abort();
        match h.await {
            Ok(result) => result?,
            Err(e) if e.is_cancelled() => {}
            Err(e) => return Err(e.into()),
        }
    }

    let before = cache.len();
    let swept = cache.delete_expired();
    cache.shutdown()?;

    info!(
        "sets={} hits={} misses={} deletes={}",
        stats.sets.load(Ordering::Relaxed),
        stats.hits.load(Ordering::Relaxed),
        stats.misses.load(Ordering::Relaxed),
        stats.deletes.load(Ordering::Relaxed),
    );
    info!(
        "{before} entradas antes da varredura final, {swept} expiradas removidas, {} restantes",
        cache.len()
    );

    Ok(())
}

use std::sync::Arc;
use std::thread;

use tokio::time::Duration;

use simpcache_store::{Cache, Expiration};

const WORKERS: usize = 8;
const KEYS_PER_WORKER: usize = 500;

#[test]
fn test_disjoint_writers_lose_nothing() {
    let cache: Cache<String, usize> = Cache::new(None, Duration::from_secs(1));

    thread::scope(|s| {
        for w in 0..WORKERS {
            let cache = cache.clone();
            s.spawn(move || {
                for i in 0..KEYS_PER_WORKER {
                    let key = format!("w{w}:k{i}");
                    cache.set(key.clone(), i, Expiration::Default).unwrap();
                    assert_eq!(cache.get(&key), Some(i));
                    // Metade das chaves é removida pelo próprio worker
                    if i % 2 == 1 {
                        cache.delete(&key);
                        assert_eq!(cache.get(&key), None);
                    }
                }
            });
        }
    });

    assert_eq!(cache.len(), WORKERS * KEYS_PER_WORKER / 2);
    for w in 0..WORKERS {
        for i in (0..KEYS_PER_WORKER).step_by(2) {
            assert_eq!(cache.get(&format!("w{w}:k{i}")), Some(i));
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_ops_with_janitor_running() {
    let cache: Cache<Arc<str>, usize> =
        Cache::new(Some(Duration::from_millis(5)), Duration::from_millis(2));
    cache.start_janitor().unwrap();

    let mut handles = Vec::new();
    for w in 0..WORKERS {
        let cache = cache.clone();
        handles.push(tokio::task::spawn_blocking(move || {
            for i in 0..KEYS_PER_WORKER {
                let durable: Arc<str> = format!("durable:{w}:{i}").into();
                let volatile: Arc<str> = format!("volatile:{w}:{i}").into();
                cache.set(durable.clone(), i, Expiration::Never).unwrap();
                cache.set(volatile, i, Expiration::Default).unwrap();
                assert_eq!(cache.get(&durable), Some(i));
            }
        }));
    }

    for h in handles {
        h.await.unwrap();
    }

    tokio::time::sleep(Duration::from_millis(200)).await;

    // Só as chaves sem expiração sobrevivem ao janitor
    assert_eq!(cache.len(), WORKERS * KEYS_PER_WORKER);
    assert!(
        cache
            .items()
            .iter()
            .all(|(key, _)| key.starts_with("durable:"))
    );

    cache.shutdown().unwrap();
}

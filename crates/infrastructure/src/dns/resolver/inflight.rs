use compact_str::CompactString;
use dashmap::DashMap;
use dnscache_application::LookupContext;
use dnscache_domain::ResolveError;
use rustc_hash::FxBuildHasher;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

type SharedResult<V> = Arc<Result<V, ResolveError>>;
type InflightSender<V> = Arc<watch::Sender<Option<SharedResult<V>>>>;

struct InflightLeaderGuard<'a, V> {
    inflight: &'a DashMap<CompactString, InflightSender<V>, FxBuildHasher>,
    key: CompactString,
    tx: InflightSender<V>,
    completed: bool,
}

impl<V> InflightLeaderGuard<'_, V> {
    fn unregister(&self) {
        self.inflight
            .remove_if(&self.key, |_, tx| Arc::ptr_eq(tx, &self.tx));
    }

    fn complete(mut self, result: SharedResult<V>) {
        self.unregister();
        let _ = self.tx.send(Some(result));
        self.completed = true;
    }
}

impl<V> Drop for InflightLeaderGuard<'_, V> {
    fn drop(&mut self) {
        if !self.completed {
            self.unregister();
            let _ = self.tx.send(None);
        }
    }
}

/// Per-key single-flight group.
///
/// Concurrent calls for one key run the fetch once; every follower receives
/// the leader's outcome. A leader that ends in a cancellation-class failure
/// (or whose future is dropped) broadcasts nothing, and its followers start
/// over, one of them becoming the next leader.
pub struct InflightGroup<V> {
    inflight: DashMap<CompactString, InflightSender<V>, FxBuildHasher>,
}

impl<V> InflightGroup<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            inflight: DashMap::with_hasher(FxBuildHasher),
        }
    }

    pub fn is_inflight(&self, key: &str) -> bool {
        self.inflight.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inflight.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inflight.is_empty()
    }

    /// Runs `fetch` unless a call for `key` is already in flight, in which
    /// case waits for that call instead. Returns the outcome and whether it
    /// was shared from another caller's fetch.
    ///
    /// The caller's context bounds only the caller's own wait.
    pub async fn run<F, Fut>(
        &self,
        ctx: &LookupContext,
        key: &str,
        fetch: F,
    ) -> (Result<V, ResolveError>, bool)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, ResolveError>>,
    {
        loop {
            let mut rx = match self.register_or_join(key) {
                Registration::Leader(guard) => {
                    let result = fetch().await;
                    if !matches!(&result, Err(err) if err.is_cancellation()) {
                        guard.complete(Arc::new(result.clone()));
                    }
                    return (result, false);
                }
                Registration::Follower(rx) => rx,
            };

            let waited = ctx
                .run(async {
                    let _ = rx.changed().await;
                    Ok(rx.borrow_and_update().clone())
                })
                .await;

            match waited {
                Ok(Some(shared)) => return ((*shared).clone(), true),
                Ok(None) => {
                    debug!(key, "In-flight leader abandoned, retrying");
                }
                Err(err) => return (Err(err), false),
            }
        }
    }

    fn register_or_join(&self, key: &str) -> Registration<'_, V> {
        match self.inflight.entry(CompactString::from(key)) {
            dashmap::Entry::Occupied(e) => {
                let rx = e.get().subscribe();
                drop(e);
                Registration::Follower(rx)
            }
            dashmap::Entry::Vacant(e) => {
                let (tx, _) = watch::channel(None);
                let tx = Arc::new(tx);
                let key = e.key().clone();
                e.insert(Arc::clone(&tx));
                Registration::Leader(InflightLeaderGuard {
                    inflight: &self.inflight,
                    key,
                    tx,
                    completed: false,
                })
            }
        }
    }
}

impl<V> Default for InflightGroup<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

enum Registration<'a, V> {
    Leader(InflightLeaderGuard<'a, V>),
    Follower(watch::Receiver<Option<SharedResult<V>>>),
}

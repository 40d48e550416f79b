mod helpers;

use dnscache_application::ports::UpstreamResolver;
use dnscache_application::LookupContext;
use dnscache_domain::ResolveError;
use dnscache_infrastructure::dns::ResolverBuilder;
use futures::future::join_all;
use helpers::{fast_config, server_failure, MockUpstream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_lookups_share_one_fetch() {
    let upstream = Arc::new(
        MockUpstream::with_values(&["10.0.0.1", "10.0.0.2"]).with_delay(Duration::from_millis(100)),
    );
    let misses = Arc::new(AtomicUsize::new(0));
    let hook_misses = Arc::clone(&misses);

    let resolver = Arc::new(
        ResolverBuilder::new(fast_config())
            .with_upstream(Arc::clone(&upstream) as Arc<dyn UpstreamResolver>)
            .on_cache_miss(move |_| {
                hook_misses.fetch_add(1, Ordering::SeqCst);
            })
            .build()
            .unwrap(),
    );

    let tasks: Vec<_> = (0..10)
        .map(|_| {
            let r = Arc::clone(&resolver);
            tokio::spawn(async move {
                r.lookup_host(&LookupContext::background(), "shared.test")
                    .await
            })
        })
        .collect();

    for result in join_all(tasks).await {
        assert_eq!(result.unwrap().unwrap(), ["10.0.0.1", "10.0.0.2"]);
    }

    assert_eq!(upstream.calls(), 1);
    assert_eq!(misses.load(Ordering::SeqCst), 1);

    let stats = resolver.stats();
    assert_eq!(stats.cache_hits, 0);
    assert_eq!(stats.cache_misses, 10);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_leader_failure_reaches_every_follower() {
    let upstream = Arc::new(MockUpstream::failing().with_delay(Duration::from_millis(50)));
    let resolver = Arc::new(helpers::build_resolver(fast_config(), &upstream));

    let tasks: Vec<_> = (0..5)
        .map(|_| {
            let r = Arc::clone(&resolver);
            tokio::spawn(async move {
                r.lookup_host(&LookupContext::background(), "broken.test")
                    .await
            })
        })
        .collect();

    for result in join_all(tasks).await {
        assert_eq!(result.unwrap().unwrap_err(), server_failure());
    }
    assert_eq!(upstream.calls(), 1);
}

#[tokio::test]
async fn test_leader_deadline_does_not_poison_followers() {
    let upstream = Arc::new(
        MockUpstream::with_values(&["10.0.0.9"]).with_delay(Duration::from_millis(100)),
    );
    let resolver = Arc::new(helpers::build_resolver(fast_config(), &upstream));

    let leader = {
        let r = Arc::clone(&resolver);
        tokio::spawn(async move {
            let ctx = LookupContext::with_timeout(Duration::from_millis(20));
            r.lookup_host(&ctx, "slow.test").await
        })
    };

    tokio::time::sleep(Duration::from_millis(5)).await;
    let follower = {
        let r = Arc::clone(&resolver);
        tokio::spawn(async move {
            r.lookup_host(&LookupContext::background(), "slow.test")
                .await
        })
    };

    assert_eq!(
        leader.await.unwrap().unwrap_err(),
        ResolveError::DeadlineExceeded
    );
    assert_eq!(follower.await.unwrap().unwrap(), ["10.0.0.9"]);
    assert_eq!(upstream.calls(), 2);
}

#[tokio::test]
async fn test_canceled_lookup_is_not_cached() {
    let upstream = Arc::new(
        MockUpstream::with_values(&["10.0.0.3"]).with_delay(Duration::from_millis(50)),
    );
    let resolver = helpers::build_resolver(fast_config(), &upstream);

    let ctx = LookupContext::background();
    ctx.cancel();
    let err = resolver.lookup_host(&ctx, "cancel.test").await.unwrap_err();
    assert_eq!(err, ResolveError::Canceled);
    assert!(resolver.cache().get("cancel.test").is_none());

    let addresses = resolver
        .lookup_host(&LookupContext::background(), "cancel.test")
        .await
        .unwrap();
    assert_eq!(addresses, ["10.0.0.3"]);
}

#[tokio::test]
async fn test_follower_cancellation_leaves_leader_running() {
    let upstream = Arc::new(
        MockUpstream::with_values(&["10.0.0.4"]).with_delay(Duration::from_millis(80)),
    );
    let resolver = Arc::new(helpers::build_resolver(fast_config(), &upstream));

    let leader = {
        let r = Arc::clone(&resolver);
        tokio::spawn(async move {
            r.lookup_host(&LookupContext::background(), "steady.test")
                .await
        })
    };

    tokio::time::sleep(Duration::from_millis(5)).await;
    let ctx = LookupContext::with_timeout(Duration::from_millis(10));
    let err = resolver.lookup_host(&ctx, "steady.test").await.unwrap_err();
    assert!(err.is_cancellation());

    assert_eq!(leader.await.unwrap().unwrap(), ["10.0.0.4"]);
    assert_eq!(upstream.calls(), 1);
}

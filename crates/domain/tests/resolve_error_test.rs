use dnscache_domain::{IpFamily, ResolveError, ResolverStats};
use std::net::IpAddr;

#[test]
fn test_cancellation_classification() {
    assert!(ResolveError::Canceled.is_cancellation());
    assert!(ResolveError::DeadlineExceeded.is_cancellation());
    assert!(!ResolveError::NotFound {
        host: "nx.test".into()
    }
    .is_cancellation());
    assert!(!ResolveError::resolution("example.com", "SERVFAIL").is_cancellation());
}

#[test]
fn test_resolution_failure_classification() {
    assert!(ResolveError::resolution("example.com", "SERVFAIL").is_resolution_failure());
    assert!(ResolveError::NotFound {
        host: "nx.test".into()
    }
    .is_resolution_failure());
    assert!(!ResolveError::NoAddresses {
        address: "example.com:80".into()
    }
    .is_resolution_failure());
    assert!(!ResolveError::Canceled.is_resolution_failure());
}

#[test]
fn test_error_messages_name_the_target() {
    let err = ResolveError::NoAddresses {
        address: "example.com:443".into(),
    };
    assert_eq!(err.to_string(), "dial tcp example.com:443: no addresses found");

    let err = ResolveError::malformed("example.com", "missing port in address");
    assert_eq!(err.to_string(), "address example.com: missing port in address");
}

#[test]
fn test_family_filter_preserves_order() {
    let addrs = ["2001:db8::1", "10.0.0.1", "::ffff:192.0.2.1", "10.0.0.2"];

    let v4: Vec<IpAddr> = IpFamily::V4.filter(addrs);
    assert_eq!(
        v4,
        vec![
            "10.0.0.1".parse::<IpAddr>().unwrap(),
            "::ffff:192.0.2.1".parse::<IpAddr>().unwrap(),
            "10.0.0.2".parse::<IpAddr>().unwrap(),
        ]
    );

    let v6 = IpFamily::V6.filter(addrs);
    assert_eq!(v6, vec!["2001:db8::1".parse::<IpAddr>().unwrap()]);

    let any = IpFamily::Any.filter(addrs);
    assert_eq!(any.len(), 4);
    assert_eq!(any[0], "2001:db8::1".parse::<IpAddr>().unwrap());
}

#[test]
fn test_family_from_str() {
    assert_eq!("ip".parse::<IpFamily>().unwrap(), IpFamily::Any);
    assert_eq!("ip4".parse::<IpFamily>().unwrap(), IpFamily::V4);
    assert_eq!("IP6".parse::<IpFamily>().unwrap(), IpFamily::V6);
    assert!("tcp".parse::<IpFamily>().is_err());
}

#[test]
fn test_stats_hit_rate() {
    assert_eq!(ResolverStats::default().hit_rate(), 0.0);

    let stats = ResolverStats {
        cache_hits: 3,
        cache_misses: 1,
    };
    assert_eq!(stats.total(), 4);
    assert!((stats.hit_rate() - 75.0).abs() < f64::EPSILON);
}

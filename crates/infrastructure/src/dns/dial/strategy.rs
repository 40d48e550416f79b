use dnscache_domain::DialStrategy;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Orders resolved addresses before sequential dial attempts.
pub struct AddressOrderer {
    strategy: DialStrategy,
    counter: AtomicUsize,
}

impl AddressOrderer {
    pub fn new(strategy: DialStrategy) -> Self {
        Self {
            strategy,
            counter: AtomicUsize::new(0),
        }
    }

    pub fn strategy(&self) -> DialStrategy {
        self.strategy
    }

    pub fn order(&self, addresses: &[String]) -> Vec<String> {
        let mut ordered = addresses.to_vec();
        if ordered.len() < 2 {
            return ordered;
        }

        match self.strategy {
            DialStrategy::Sequential => {}
            DialStrategy::RoundRobin => {
                let start = self.next_index(ordered.len());
                ordered.rotate_left(start);
            }
            DialStrategy::Random => fastrand::shuffle(&mut ordered),
        }
        ordered
    }

    fn next_index(&self, count: usize) -> usize {
        self.counter.fetch_add(1, Ordering::Relaxed) % count
    }
}

impl Default for AddressOrderer {
    fn default() -> Self {
        Self::new(DialStrategy::default())
    }
}

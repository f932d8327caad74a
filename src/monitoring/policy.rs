use std::fmt;

/// How a refresh pass queries balances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Query every catalog token for every address, pruning zero holdings.
    FullScan,
    /// Re-query only the balances found by the last full scan.
    CheapRefresh,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::FullScan => f.write_str("full scan"),
            Strategy::CheapRefresh => f.write_str("cheap refresh"),
        }
    }
}

/// Picks the strategy for each tick after boot: `cache_ticks` cheap refreshes,
/// then a full scan, repeating. With `cache_ticks == 0` every tick is a full scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickPolicy {
    cache_ticks: u32,
    counter: u32,
}

impl TickPolicy {
    /// Policy positioned right after a full scan.
    pub fn new(cache_ticks: u32) -> Self {
        Self {
            cache_ticks,
            counter: 0,
        }
    }

    pub fn cache_ticks(&self) -> u32 {
        self.cache_ticks
    }

    pub fn counter(&self) -> u32 {
        self.counter
    }

    pub fn next(&mut self) -> Strategy {
        if self.counter >= self.cache_ticks {
            self.counter = 0;
            Strategy::FullScan
        } else {
            self.counter += 1;
            Strategy::CheapRefresh
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_cache_ticks_always_full_scans() {
        let mut policy = TickPolicy::new(0);
        for _ in 0..10 {
            assert_eq!(policy.next(), Strategy::FullScan);
        }
    }

    #[test]
    fn one_full_scan_per_cycle() {
        for n in 1..=6u32 {
            let mut policy = TickPolicy::new(n);
            let cycle: Vec<_> = (0..=n).map(|_| policy.next()).collect();

            let cheap = cycle.iter().filter(|s| **s == Strategy::CheapRefresh).count();
            assert_eq!(cheap, n as usize);
            assert_eq!(cycle.last(), Some(&Strategy::FullScan));
            assert_eq!(policy.counter(), 0);
        }
    }

    #[test]
    fn three_tick_cycle() {
        let mut policy = TickPolicy::new(2);
        let ticks: Vec<_> = (0..6).map(|_| policy.next()).collect();
        assert_eq!(
            ticks,
            [
                Strategy::CheapRefresh,
                Strategy::CheapRefresh,
                Strategy::FullScan,
                Strategy::CheapRefresh,
                Strategy::CheapRefresh,
                Strategy::FullScan,
            ]
        );
    }
}

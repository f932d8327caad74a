use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::MissedTickBehavior;

use crate::catalog::TokenCatalog;
use crate::logger::log_balance_changes;
use crate::monitoring::balance::BalanceMonitor;
use crate::monitoring::policy::{Strategy, TickPolicy};
use crate::providers::{ChainClient, Connector};
use crate::resolve::parse_addresses;
use crate::store::{BalanceStore, RefreshState, Snapshot, TrackedAddress};

/// Settings the scheduler needs from the process configuration.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Address or ENS inputs, in configured order
    pub inputs: Vec<String>,
    pub cache_ticks: u32,
    pub interval: Duration,
}

/// Drives refresh passes and is the only writer of the [`BalanceStore`].
pub struct Scheduler {
    config: SchedulerConfig,
    connector: Arc<dyn Connector>,
    monitor: BalanceMonitor,
    addresses: Vec<TrackedAddress>,
    policy: TickPolicy,
    store: BalanceStore,
    reconnect_pending: bool,
    passes: u64,
}

impl Scheduler {
    pub fn new(
        config: SchedulerConfig,
        connector: Arc<dyn Connector>,
        client: Arc<dyn ChainClient>,
        catalog: Arc<TokenCatalog>,
        store: BalanceStore,
    ) -> Self {
        let policy = TickPolicy::new(config.cache_ticks);
        Self {
            config,
            connector,
            monitor: BalanceMonitor::new(client, catalog),
            addresses: Vec::new(),
            policy,
            store,
            reconnect_pending: false,
            passes: 0,
        }
    }

    pub fn addresses(&self) -> &[TrackedAddress] {
        &self.addresses
    }

    pub fn store(&self) -> &BalanceStore {
        &self.store
    }

    /// Resolves the configured inputs and seeds every address with a full scan.
    pub async fn boot(&mut self) {
        let resolved = parse_addresses(self.monitor.client().as_ref(), &self.config.inputs).await;
        self.addresses = resolved.into_iter().map(TrackedAddress::seeded).collect();
        tracing::info!(
            addresses = self.addresses.len(),
            configured = self.config.inputs.len(),
            tokens = self.monitor.catalog().len(),
            cache_ticks = self.config.cache_ticks,
            "balance monitoring started"
        );

        self.policy = TickPolicy::new(self.config.cache_ticks);
        self.pass(Strategy::FullScan, true).await;
    }

    /// Runs the pass the policy picks for this tick and returns its strategy.
    ///
    /// The connector is dialed at most once per tick: when the address check already
    /// healed before the pass, a reconnect still pending afterwards waits for the next tick.
    pub async fn tick(&mut self) -> Strategy {
        let strategy = self.policy.next();
        let mut healed = false;
        if strategy == Strategy::FullScan && self.addresses.len() < self.config.inputs.len() {
            tracing::warn!(
                tracked = self.addresses.len(),
                configured = self.config.inputs.len(),
                "tracked addresses below configured inputs, reconnecting before full scan"
            );
            self.self_heal().await;
            healed = true;
        }
        self.pass(strategy, !healed).await;
        strategy
    }

    /// Ticks forever, one pass per interval. A pass that overruns delays the next
    /// tick rather than overlapping it.
    pub async fn run(mut self) {
        let start = tokio::time::Instant::now() + self.config.interval;
        let mut interval = tokio::time::interval_at(start, self.config.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            self.tick().await;
        }
    }

    /// Re-dials the chain and re-resolves every input. Balances already known for
    /// an address that resolves again are carried over.
    ///
    /// A failed dial keeps the current client, still re-resolves through it and
    /// leaves the reconnect pending for the next tick.
    pub async fn self_heal(&mut self) {
        let reconnected = match self.connector.connect().await {
            Ok(client) => {
                self.monitor.set_client(client);
                self.reconnect_pending = false;
                true
            }
            Err(e) => {
                tracing::warn!("reconnect failed, retrying next tick: {e}");
                self.reconnect_pending = true;
                false
            }
        };

        let resolved = parse_addresses(self.monitor.client().as_ref(), &self.config.inputs).await;
        let mut previous = std::mem::take(&mut self.addresses);
        self.addresses = resolved
            .into_iter()
            .map(|entry| {
                match previous.iter().position(|t| t.address == entry.address) {
                    Some(index) => {
                        let mut kept = previous.swap_remove(index);
                        kept.name = entry.name;
                        kept
                    }
                    None => TrackedAddress::seeded(entry),
                }
            })
            .collect();
        tracing::warn!(
            addresses = self.addresses.len(),
            reconnected,
            "re-resolved addresses"
        );
    }

    async fn pass(&mut self, strategy: Strategy, heal_after: bool) {
        tracing::debug!("refreshing ({strategy})...");
        let started = Instant::now();

        match strategy {
            Strategy::FullScan => self.full_scan().await,
            Strategy::CheapRefresh => self.cheap_refresh().await,
        }

        let elapsed = started.elapsed();
        self.passes += 1;
        tracing::info!(
            strategy = %strategy,
            addresses = self.addresses.len(),
            "refresh completed ({elapsed:.2?})"
        );

        let previous = self.store.snapshot().await;
        log_balance_changes(&previous.addresses, &self.addresses);
        self.store
            .publish(Snapshot {
                addresses: self.addresses.clone(),
                state: RefreshState {
                    last_refresh: elapsed,
                    passes: self.passes,
                    counter: self.policy.counter(),
                    cache_ticks: self.policy.cache_ticks(),
                    last_strategy: Some(strategy),
                    refreshed_at: Some(Utc::now()),
                },
            })
            .await;

        if heal_after && self.reconnect_pending {
            self.self_heal().await;
        }
    }

    async fn full_scan(&mut self) {
        for tracked in &mut self.addresses {
            match self.monitor.full_scan(tracked).await {
                Ok(balances) => tracked.balances = balances,
                Err(e) => {
                    tracing::warn!("error fetching balance ({}): {e}", tracked.address);
                    self.reconnect_pending = true;
                }
            }
        }
    }

    async fn cheap_refresh(&mut self) {
        for tracked in &mut self.addresses {
            if let Err(e) = self.monitor.cheap_refresh(tracked).await {
                tracing::warn!("error fetching balance ({}): {e}", tracked.address);
                self.reconnect_pending = true;
            }
        }
    }
}

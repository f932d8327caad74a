use alloy::primitives::{Address, U256};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::catalog::Token;
use crate::monitoring::Strategy;
use crate::resolve::ResolvedAddress;
use crate::units::{to_decimal_string, wei_to_ether, NATIVE_DECIMALS};

pub const NATIVE_SYMBOL: &str = "ETH";

/// What a balance entry measures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BalanceKind {
    Native,
    Token(Arc<Token>),
}

/// One non-zero holding (or the native entry, which is always kept).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Balance {
    pub kind: BalanceKind,
    pub decimals: u8,
    pub raw: U256,
    /// `raw / 10^decimals`, rendered once per refresh
    pub amount: String,
    /// False until a read succeeds; unread entries are never exported
    pub fetched: bool,
}

impl Balance {
    pub fn native(raw: U256) -> Self {
        Self {
            kind: BalanceKind::Native,
            decimals: NATIVE_DECIMALS,
            raw,
            amount: wei_to_ether(raw),
            fetched: true,
        }
    }

    /// Native entry of an address whose balance has not been read yet.
    pub fn unread_native() -> Self {
        Self {
            kind: BalanceKind::Native,
            decimals: NATIVE_DECIMALS,
            raw: U256::ZERO,
            amount: String::new(),
            fetched: false,
        }
    }

    pub fn token(token: Arc<Token>, decimals: u8, raw: U256) -> Self {
        Self {
            kind: BalanceKind::Token(token),
            decimals,
            raw,
            amount: to_decimal_string(raw, decimals),
            fetched: true,
        }
    }

    pub fn symbol(&self) -> &str {
        match &self.kind {
            BalanceKind::Native => NATIVE_SYMBOL,
            BalanceKind::Token(token) => &token.symbol,
        }
    }

    pub fn is_native(&self) -> bool {
        matches!(self.kind, BalanceKind::Native)
    }

    pub fn set_raw(&mut self, raw: U256) {
        self.raw = raw;
        self.amount = to_decimal_string(raw, self.decimals);
        self.fetched = true;
    }
}

/// An address being exported, with its balances in discovery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedAddress {
    pub name: String,
    pub address: Address,
    pub balances: Vec<Balance>,
}

impl TrackedAddress {
    /// A freshly resolved address holding only an unread native entry.
    pub fn seeded(resolved: ResolvedAddress) -> Self {
        Self {
            name: resolved.name,
            address: resolved.address,
            balances: vec![Balance::unread_native()],
        }
    }

    pub fn native(&self) -> Option<&Balance> {
        self.balances.iter().find(|b| b.is_native())
    }
}

/// Bookkeeping about refresh passes, read by the HTTP endpoints.
#[derive(Debug, Clone, Default)]
pub struct RefreshState {
    pub last_refresh: Duration,
    /// Passes completed since boot, the boot scan included
    pub passes: u64,
    /// Cheap refreshes since the last full scan
    pub counter: u32,
    pub cache_ticks: u32,
    pub last_strategy: Option<Strategy>,
    pub refreshed_at: Option<DateTime<Utc>>,
}

/// Everything readers see, published whole after each pass.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub addresses: Vec<TrackedAddress>,
    pub state: RefreshState,
}

/// Shared handle to the latest published [`Snapshot`].
///
/// The scheduler is the only writer. The lock only guards the pointer swap, so
/// readers never wait on an in-flight refresh and never observe a half-built pass.
#[derive(Debug, Clone, Default)]
pub struct BalanceStore {
    current: Arc<RwLock<Arc<Snapshot>>>,
}

impl BalanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self) -> Arc<Snapshot> {
        self.current.read().await.clone()
    }

    pub async fn publish(&self, snapshot: Snapshot) {
        *self.current.write().await = Arc::new(snapshot);
    }
}

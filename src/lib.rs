pub mod catalog;
pub mod config;
pub mod contracts;
pub mod error;
pub mod logger;
pub mod metrics;
pub mod monitoring;
pub mod providers;
pub mod resolve;
pub mod store;
pub mod units;

pub use catalog::{fetch_catalog, Token, TokenCatalog};
pub use config::Config;
pub use contracts::IERC20;
pub use error::ChainError;
pub use logger::{compare_balances, log_balance_changes, setup_logging};
pub use metrics::{render, router, AppState};
pub use monitoring::{BalanceMonitor, Scheduler, SchedulerConfig, Strategy, TickPolicy};
pub use providers::{create_fallback_provider, AlloyConnector, ChainClient, Connector, FallbackConfig};
pub use resolve::{parse_addresses, ResolvedAddress};
pub use store::{Balance, BalanceKind, BalanceStore, RefreshState, Snapshot, TrackedAddress};

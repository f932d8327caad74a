use std::str::FromStr;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::store::TrackedAddress;

/// Installs the global tracing subscriber.
///
/// A bare level such as `debug` keeps HTTP client internals at `info`; a full
/// directive string (containing `,` or `=`) is used as given.
pub fn setup_logging(log_level: &str, json_format: bool) {
    let normalized = log_level.trim();
    let filter_spec = if normalized.contains(',') || normalized.contains('=') {
        normalized.to_string()
    } else {
        format!("{normalized},h2=info,hyper=info,hyper_util=info,reqwest=info,alloy_transport_http=info")
    };
    let filter = EnvFilter::from_str(&filter_spec).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::registry().with(filter);

    if json_format {
        subscriber
            .with(fmt::layer().json().with_target(false).with_current_span(false))
            .init();
    } else {
        subscriber.with(fmt::layer().with_target(true).compact()).init();
    }

    tracing::info!(
        "logging initialized ({filter_spec}, {})",
        if json_format { "json" } else { "compact" }
    );
}

/// Direction of a balance movement between two passes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceChange {
    Increase,
    Decrease,
    Appeared,
    Disappeared,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenBalanceChange {
    pub symbol: String,
    pub old_amount: String,
    pub new_amount: String,
    pub change: BalanceChange,
}

/// Compare the balances of one address across two passes
pub fn compare_balances(previous: &TrackedAddress, current: &TrackedAddress) -> Vec<TokenBalanceChange> {
    let mut changes = Vec::new();
    for balance in &current.balances {
        if !balance.fetched {
            continue;
        }
        let old = previous
            .balances
            .iter()
            .find(|p| p.fetched && p.kind == balance.kind);
        match old {
            Some(old) if old.raw == balance.raw => {}
            Some(old) => changes.push(TokenBalanceChange {
                symbol: balance.symbol().to_string(),
                old_amount: old.amount.clone(),
                new_amount: balance.amount.clone(),
                change: if balance.raw > old.raw {
                    BalanceChange::Increase
                } else {
                    BalanceChange::Decrease
                },
            }),
            None => changes.push(TokenBalanceChange {
                symbol: balance.symbol().to_string(),
                old_amount: "0".to_string(),
                new_amount: balance.amount.clone(),
                change: BalanceChange::Appeared,
            }),
        }
    }

    for old in &previous.balances {
        if old.fetched && !current.balances.iter().any(|b| b.kind == old.kind) {
            changes.push(TokenBalanceChange {
                symbol: old.symbol().to_string(),
                old_amount: old.amount.clone(),
                new_amount: "0".to_string(),
                change: BalanceChange::Disappeared,
            });
        }
    }

    changes
}

/// Logs every balance that moved since the previously published pass, at debug level.
pub fn log_balance_changes(previous: &[TrackedAddress], current: &[TrackedAddress]) {
    if !tracing::enabled!(tracing::Level::DEBUG) {
        return;
    }
    for tracked in current {
        let Some(before) = previous.iter().find(|p| p.address == tracked.address) else {
            continue;
        };
        for change in compare_balances(before, tracked) {
            tracing::debug!(
                "{} ({}) {} {:?}: {} → {}",
                tracked.name,
                shorten_address(&tracked.address.to_string()),
                change.symbol,
                change.change,
                change.old_amount,
                change.new_amount
            );
        }
    }
}

/// Shorten address for display
fn shorten_address(address: &str) -> String {
    if address.len() > 10 {
        format!("{}...{}", &address[..6], &address[address.len() - 4..])
    } else {
        address.to_string()
    }
}

use alloy::primitives::U256;
use std::sync::Arc;

use crate::catalog::{Token, TokenCatalog};
use crate::error::ChainError;
use crate::providers::ChainClient;
use crate::store::{Balance, BalanceKind, TrackedAddress};

/// Balance queries for one address at a time, against the current client and catalog.
pub struct BalanceMonitor {
    client: Arc<dyn ChainClient>,
    catalog: Arc<TokenCatalog>,
}

impl BalanceMonitor {
    pub fn new(client: Arc<dyn ChainClient>, catalog: Arc<TokenCatalog>) -> Self {
        Self { client, catalog }
    }

    pub fn client(&self) -> &Arc<dyn ChainClient> {
        &self.client
    }

    pub fn set_client(&mut self, client: Arc<dyn ChainClient>) {
        self.client = client;
    }

    pub fn catalog(&self) -> &TokenCatalog {
        &self.catalog
    }

    /// Builds a new balance list for `tracked`: the native entry first, then every
    /// catalog token holding a non-zero amount, in catalog order.
    ///
    /// Decimals missing from the catalog are read on-chain, only for non-zero
    /// holdings. A failed token query counts as zero for this pass. A failed native query
    /// means the connection is gone; the error is returned so the caller keeps the
    /// previous list and reconnects.
    pub async fn full_scan(&self, tracked: &TrackedAddress) -> Result<Vec<Balance>, ChainError> {
        let native = self.client.native_balance(tracked.address).await?;

        let mut balances = Vec::with_capacity(1 + self.catalog.len());
        balances.push(Balance::native(native));

        for token in self.catalog.tokens() {
            match self.client.token_balance(token.address, tracked.address).await {
                Ok(raw) if raw.is_zero() => {}
                Ok(raw) => {
                    if let Some(decimals) = self.decimals_of(token).await {
                        balances.push(Balance::token(token.clone(), decimals, raw));
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        "error getting balance {} ({}) for {}: {e}",
                        token.symbol,
                        token.address,
                        tracked.address
                    );
                }
            }
        }

        Ok(balances)
    }

    /// Re-queries the balances `tracked` already holds and overwrites their amounts.
    ///
    /// Membership never changes here. A token that fails keeps its previous amount;
    /// a native failure aborts the address with its balances untouched.
    pub async fn cheap_refresh(&self, tracked: &mut TrackedAddress) -> Result<(), ChainError> {
        let mut fresh: Vec<Option<U256>> = Vec::with_capacity(tracked.balances.len());

        for balance in &tracked.balances {
            let raw = match &balance.kind {
                BalanceKind::Native => Some(self.client.native_balance(tracked.address).await?),
                BalanceKind::Token(token) => {
                    match self.client.token_balance(token.address, tracked.address).await {
                        Ok(raw) => Some(raw),
                        Err(e) => {
                            tracing::warn!(
                                "error refreshing balance {} for {}: {e}",
                                token.symbol,
                                tracked.address
                            );
                            None
                        }
                    }
                }
            };
            fresh.push(raw);
        }

        for (balance, raw) in tracked.balances.iter_mut().zip(fresh) {
            if let Some(raw) = raw {
                balance.set_raw(raw);
            }
        }
        Ok(())
    }

    async fn decimals_of(&self, token: &Token) -> Option<u8> {
        if let Some(decimals) = token.decimals {
            return Some(decimals);
        }
        match self.client.token_decimals(token.address).await {
            Ok(decimals) => Some(decimals),
            Err(e) => {
                tracing::warn!("error getting decimals of {} ({}): {e}", token.symbol, token.address);
                None
            }
        }
    }
}

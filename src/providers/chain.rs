use alloy::{
    ens::ProviderEnsExt,
    primitives::{Address, U256},
    providers::{DynProvider, Provider},
};
use async_trait::async_trait;
use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use crate::contracts::IERC20;
use crate::error::ChainError;
use crate::providers::fallback::{create_fallback_provider, FallbackConfig};

/// Balance queries and name resolution against a connected chain.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Native currency balance in wei
    async fn native_balance(&self, owner: Address) -> Result<U256, ChainError>;

    /// Raw ERC-20 `balanceOf` result
    async fn token_balance(&self, token: Address, owner: Address) -> Result<U256, ChainError>;

    async fn token_decimals(&self, token: Address) -> Result<u8, ChainError>;

    /// ENS forward resolution
    async fn resolve_name(&self, name: &str) -> Result<Address, ChainError>;

    /// ENS reverse resolution
    async fn lookup_address(&self, address: Address) -> Result<String, ChainError>;
}

/// Dials a fresh [`ChainClient`]. Used at boot and again whenever the scheduler self-heals.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self) -> Result<Arc<dyn ChainClient>, ChainError>;
}

/// Connects to one or more HTTP RPC endpoints through alloy.
#[derive(Debug, Clone)]
pub struct AlloyConnector {
    fallback: FallbackConfig,
    timeout: Duration,
}

impl AlloyConnector {
    pub fn new(fallback: FallbackConfig, timeout: Duration) -> Self {
        Self { fallback, timeout }
    }
}

#[async_trait]
impl Connector for AlloyConnector {
    async fn connect(&self) -> Result<Arc<dyn ChainClient>, ChainError> {
        let provider = create_fallback_provider(&self.fallback)?;

        // HTTP transports are lazy, so ask for the chain id before handing the client out.
        let chain_id = tokio::time::timeout(self.timeout, provider.get_chain_id())
            .await
            .map_err(|_| ChainError::Connect(format!("no answer within {:?}", self.timeout)))?
            .map_err(|e| ChainError::Connect(e.to_string()))?;
        tracing::info!(chain_id, endpoints = self.fallback.rpc_urls.len(), "connected to chain");

        Ok(Arc::new(AlloyClient {
            provider,
            timeout: self.timeout,
        }))
    }
}

pub struct AlloyClient {
    provider: DynProvider,
    timeout: Duration,
}

impl AlloyClient {
    async fn bounded<T, E, F>(&self, call: F) -> Result<T, ChainError>
    where
        F: IntoFuture<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| ChainError::Timeout(self.timeout))?
            .map_err(ChainError::rpc)
    }
}

#[async_trait]
impl ChainClient for AlloyClient {
    async fn native_balance(&self, owner: Address) -> Result<U256, ChainError> {
        self.bounded(self.provider.get_balance(owner)).await
    }

    async fn token_balance(&self, token: Address, owner: Address) -> Result<U256, ChainError> {
        let contract = IERC20::new(token, &self.provider);
        self.bounded(contract.balanceOf(owner).call()).await
    }

    async fn token_decimals(&self, token: Address) -> Result<u8, ChainError> {
        let contract = IERC20::new(token, &self.provider);
        self.bounded(contract.decimals().call()).await
    }

    async fn resolve_name(&self, name: &str) -> Result<Address, ChainError> {
        tokio::time::timeout(self.timeout, self.provider.resolve_name(name))
            .await
            .map_err(|_| ChainError::Timeout(self.timeout))?
            .map_err(|e| ChainError::NotFound(format!("{name}: {e}")))
    }

    async fn lookup_address(&self, address: Address) -> Result<String, ChainError> {
        tokio::time::timeout(self.timeout, self.provider.lookup_address(&address))
            .await
            .map_err(|_| ChainError::Timeout(self.timeout))?
            .map_err(|e| ChainError::NotFound(format!("{address}: {e}")))
    }
}

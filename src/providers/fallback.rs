use alloy::{
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::client::RpcClient,
    transports::{
        http::{
            reqwest::{Client, Url},
            Http,
        },
        layers::FallbackLayer,
    },
};
use std::num::NonZeroUsize;
use tower::ServiceBuilder;

use crate::error::ChainError;

/// Configuration for fallback provider
#[derive(Debug, Clone)]
pub struct FallbackConfig {
    pub rpc_urls: Vec<String>,
    pub active_transport_count: usize,
}

impl FallbackConfig {
    pub fn new(rpc_urls: Vec<String>, active_transport_count: usize) -> Self {
        Self {
            rpc_urls,
            active_transport_count,
        }
    }
}

/// Creates a type-erased provider that spreads requests over every configured endpoint.
pub fn create_fallback_provider(config: &FallbackConfig) -> Result<DynProvider, ChainError> {
    let active = config.active_transport_count.clamp(1, config.rpc_urls.len().max(1));
    let fallback_layer = FallbackLayer::default()
        .with_active_transport_count(NonZeroUsize::new(active).unwrap_or(NonZeroUsize::MIN));

    let transports = config
        .rpc_urls
        .iter()
        .map(|url| {
            Url::parse(url)
                .map(Http::<Client>::new)
                .map_err(|e| ChainError::InvalidUrl {
                    url: url.clone(),
                    reason: e.to_string(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if transports.is_empty() {
        return Err(ChainError::Connect("no RPC endpoints configured".into()));
    }

    let transport = ServiceBuilder::new()
        .layer(fallback_layer)
        .service(transports);

    let client = RpcClient::builder().transport(transport, false);
    Ok(ProviderBuilder::new().connect_client(client).erased())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_urls() {
        let config = FallbackConfig::new(vec!["not a url".into()], 3);
        assert!(matches!(
            create_fallback_provider(&config),
            Err(ChainError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn rejects_empty_endpoint_list() {
        let config = FallbackConfig::new(vec![], 3);
        assert!(matches!(
            create_fallback_provider(&config),
            Err(ChainError::Connect(_))
        ));
    }
}

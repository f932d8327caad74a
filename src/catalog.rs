use alloy::primitives::Address;
use eyre::{Result, WrapErr};
use serde::Deserialize;
use serde_json::Value;
use serde_with::{serde_as, DisplayFromStr, PickFirst};
use std::collections::HashSet;
use std::sync::Arc;

/// A token contract known to the exporter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub name: String,
    pub symbol: String,
    pub address: Address,
    /// `None` when the list omits it; looked up on-chain during a full scan
    pub decimals: Option<u8>,
    pub chain_id: u64,
}

/// Token list entry as published by Uniswap-style token lists.
#[serde_as]
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenEntry {
    #[serde(default)]
    name: String,
    symbol: String,
    #[serde_as(as = "DisplayFromStr")]
    address: Address,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    decimals: Option<u8>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    chain_id: Option<u64>,
}

/// Immutable list of tokens scanned for every tracked address, in list order.
#[derive(Debug, Clone, Default)]
pub struct TokenCatalog {
    tokens: Vec<Arc<Token>>,
}

impl TokenCatalog {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens: tokens.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn tokens(&self) -> &[Arc<Token>] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Parses a token list body. Accepts a bare array or an object with a `tokens` array.
    ///
    /// Entries that do not parse are skipped. When `chain_id` is given, tokens
    /// for other chains are dropped. Repeated contract addresses are kept once.
    pub fn from_json(body: &str, chain_id: Option<u64>) -> Result<Self> {
        let document: Value = serde_json::from_str(body).wrap_err("decoding token list")?;
        let entries = match document {
            Value::Array(entries) => entries,
            Value::Object(mut object) => match object.remove("tokens") {
                Some(Value::Array(entries)) => entries,
                _ => eyre::bail!("token list object has no `tokens` array"),
            },
            _ => eyre::bail!("token list is neither an array nor an object"),
        };

        let mut seen = HashSet::new();
        let mut tokens = Vec::with_capacity(entries.len());
        for entry in entries {
            let entry: TokenEntry = match serde_json::from_value(entry) {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("skipping token list entry: {e}");
                    continue;
                }
            };
            let entry_chain = entry.chain_id.unwrap_or(1);
            if chain_id.is_some_and(|wanted| wanted != entry_chain) {
                continue;
            }
            if !seen.insert(entry.address) {
                continue;
            }
            tokens.push(Token {
                name: entry.name,
                symbol: entry.symbol,
                address: entry.address,
                decimals: entry.decimals,
                chain_id: entry_chain,
            });
        }

        Ok(Self::new(tokens))
    }
}

/// Downloads and parses the token list once at startup.
pub async fn fetch_catalog(url: &str, chain_id: Option<u64>) -> Result<TokenCatalog> {
    let body = reqwest::get(url)
        .await
        .wrap_err_with(|| format!("could not get token list from {url}"))?
        .error_for_status()?
        .text()
        .await
        .wrap_err("reading token list body")?;

    let catalog = TokenCatalog::from_json(&body, chain_id)?;
    tracing::info!(tokens = catalog.len(), "loaded token list");
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    const LIST: &str = r#"[
        {"name": "USD Coin", "address": "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48", "symbol": "USDC", "decimals": 6, "chainId": 1},
        {"name": "Broken", "address": "not-an-address", "symbol": "BRK", "decimals": 18, "chainId": 1},
        {"name": "Wrapped BTC", "address": "0x2260FAC5E5542a773Aa44fBCfeDf7C193bc2C599", "symbol": "WBTC", "decimals": "8", "chainId": 1},
        {"name": "Goerli USDC", "address": "0x07865c6E87B9F70255377e024ace6630C1Eaa37F", "symbol": "USDC", "decimals": 6, "chainId": 5},
        {"name": "USD Coin", "address": "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48", "symbol": "USDC", "decimals": 6, "chainId": 1}
    ]"#;

    #[test]
    fn skips_unparseable_entries_and_duplicates() {
        let catalog = TokenCatalog::from_json(LIST, None).unwrap();
        let symbols: Vec<_> = catalog.tokens().iter().map(|t| t.symbol.as_str()).collect();
        assert_eq!(symbols, ["USDC", "WBTC", "USDC"]);
        assert_eq!(catalog.tokens()[1].decimals, Some(8));
    }

    #[test]
    fn filters_by_chain() {
        let catalog = TokenCatalog::from_json(LIST, Some(1)).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(
            catalog.tokens()[0].address,
            address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48")
        );
    }

    #[test]
    fn accepts_tokenlist_object() {
        let body = r#"{"name": "Default", "tokens": [
            {"address": "0x6B175474E89094C44Da98b954EedeAC495271d0F", "symbol": "DAI", "chainId": 1}
        ]}"#;
        let catalog = TokenCatalog::from_json(body, None).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.tokens()[0].decimals, None);
    }

    #[test]
    fn rejects_non_list_documents() {
        assert!(TokenCatalog::from_json("42", None).is_err());
        assert!(TokenCatalog::from_json("{\"name\": \"x\"}", None).is_err());
    }
}

use alloy::primitives::Address;
use std::str::FromStr;

use crate::providers::ChainClient;

/// An input entry after name resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAddress {
    pub name: String,
    pub address: Address,
}

/// Parses a 20-byte hex address, with or without the `0x` prefix.
pub fn parse_hex_address(input: &str) -> Option<Address> {
    let hex = input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
        .unwrap_or(input);
    if hex.len() != 40 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    Address::from_str(hex).ok()
}

/// Turns configured address or ENS inputs into tracked addresses, in input order.
///
/// Hex addresses are always kept and named after their reverse record when one
/// exists. Names that do not resolve are dropped.
pub async fn parse_addresses(client: &dyn ChainClient, inputs: &[String]) -> Vec<ResolvedAddress> {
    let mut resolved = Vec::with_capacity(inputs.len());

    for input in inputs {
        let input = input.trim();
        if let Some(address) = parse_hex_address(input) {
            let name = match client.lookup_address(address).await {
                Ok(name) => {
                    tracing::info!("found ENS ({name}) for address ({address})");
                    name
                }
                Err(e) => {
                    tracing::debug!("no reverse record for {address}: {e}");
                    input.to_string()
                }
            };
            resolved.push(ResolvedAddress { name, address });
        } else {
            match client.resolve_name(input).await {
                Ok(address) => resolved.push(ResolvedAddress {
                    name: input.to_string(),
                    address,
                }),
                Err(e) => {
                    tracing::warn!("address ({input}) not a hex address or ENS domain: {e}");
                }
            }
        }
    }

    resolved
}

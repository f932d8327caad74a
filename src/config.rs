use eyre::{bail, eyre, Result, WrapErr};
use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 8084;
pub const DEFAULT_RPC_URL: &str = "http://localhost:8545";
pub const DEFAULT_TOKEN_LIST_URL: &str =
    "https://raw.githubusercontent.com/Uniswap/default-token-list/main/src/tokens/mainnet.json";
const DEFAULT_INTERVAL: Duration = Duration::from_secs(15);
const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(10);

/// Optional YAML configuration. Every field may be overridden from the environment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub port: Option<u16>,
    /// Go-style duration, e.g. `15s` or `1m30s`
    pub interval: Option<String>,
    pub rpc_nodes: Vec<String>,
    pub active_transport_count: Option<usize>,
    pub addresses: Vec<String>,
    pub cache_ticks: Option<u32>,
    pub token_list_url: Option<String>,
    pub chain_id: Option<u64>,
    pub rpc_timeout: Option<String>,
    pub log_level: Option<String>,
    pub log_json: Option<bool>,
}

impl FileConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path).wrap_err_with(|| format!("reading {path}"))?;
        let config: FileConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }
}

/// Process configuration, fixed for the lifetime of the exporter.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub interval: Duration,
    pub rpc_nodes: Vec<String>,
    pub active_transport_count: usize,
    /// Raw address or ENS inputs, in configured order
    pub addresses: Vec<String>,
    /// Cheap refreshes between two full scans; 0 scans fully on every tick
    pub cache_ticks: u32,
    pub token_list_url: String,
    pub chain_id: Option<u64>,
    pub rpc_timeout: Duration,
    pub log_level: String,
    pub log_json: bool,
}

impl Config {
    /// Reads `.env`, the optional YAML file named by `CONFIG`, then the process environment.
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();
        let file = match std::env::var("CONFIG") {
            Ok(path) if !path.trim().is_empty() => FileConfig::from_file(path.trim())?,
            _ => FileConfig::default(),
        };
        Self::from_sources(file, |key| std::env::var(key).ok())
    }

    pub fn from_sources<F>(file: FileConfig, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let port = match env("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e| eyre!("failed to parse PORT {raw:?}: {e}"))?,
            None => file.port.unwrap_or(DEFAULT_PORT),
        };

        let interval = match env("DURATION").or(file.interval) {
            Some(raw) => parse_duration(&raw).wrap_err("failed to parse duration")?,
            None => DEFAULT_INTERVAL,
        };
        if interval.is_zero() {
            bail!("refresh interval must be greater than zero");
        }

        let rpc_nodes = match env("GETH") {
            Some(raw) => split_list(&raw),
            None if !file.rpc_nodes.is_empty() => file.rpc_nodes,
            None => vec![DEFAULT_RPC_URL.to_string()],
        };
        if rpc_nodes.is_empty() {
            bail!("no chain RPC endpoint supplied");
        }

        let addresses = match env("ADDRESSES") {
            Some(raw) => split_list(&raw),
            None => file
                .addresses
                .iter()
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty())
                .collect(),
        };
        if addresses.is_empty() {
            bail!("no addresses supplied");
        }

        let cache_ticks = match env("CACHE") {
            Some(raw) => raw.trim().parse::<u32>().map_err(|e| {
                eyre!("failed to parse cache ticks {raw:?} (should be a non-negative integer): {e}")
            })?,
            None => file.cache_ticks.unwrap_or(0),
        };

        let rpc_timeout = match env("RPC_TIMEOUT").or(file.rpc_timeout) {
            Some(raw) => parse_duration(&raw).wrap_err("failed to parse RPC timeout")?,
            None => DEFAULT_RPC_TIMEOUT,
        };

        let chain_id = match env("CHAIN_ID") {
            Some(raw) => Some(
                raw.trim()
                    .parse()
                    .map_err(|e| eyre!("failed to parse CHAIN_ID {raw:?}: {e}"))?,
            ),
            None => file.chain_id,
        };

        let log_json = match env("LOG_JSON") {
            Some(raw) => matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"),
            None => file.log_json.unwrap_or(false),
        };

        Ok(Self {
            port,
            interval,
            active_transport_count: file
                .active_transport_count
                .unwrap_or(default_active_transport_count()),
            rpc_nodes,
            addresses,
            cache_ticks,
            token_list_url: env("TOKEN_LIST")
                .or(file.token_list_url)
                .unwrap_or_else(|| DEFAULT_TOKEN_LIST_URL.to_string()),
            chain_id,
            rpc_timeout,
            log_level: env("LOG_LEVEL")
                .or(file.log_level)
                .unwrap_or_else(|| "info".to_string()),
            log_json,
        })
    }
}

fn default_active_transport_count() -> usize {
    3
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parses durations such as `300ms`, `15s`, `1m30s` or `1.5h`.
pub fn parse_duration(raw: &str) -> Result<Duration> {
    let input = raw.trim();
    if input.is_empty() {
        bail!("empty duration");
    }
    if input == "0" {
        return Ok(Duration::ZERO);
    }

    let mut total = 0f64;
    let mut rest = input;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .ok_or_else(|| eyre!("missing unit in duration {input:?}"))?;
        if number_len == 0 {
            bail!("invalid duration {input:?}");
        }
        let value: f64 = rest[..number_len]
            .parse()
            .map_err(|_| eyre!("invalid duration {input:?}"))?;
        rest = &rest[number_len..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let seconds_per_unit = match &rest[..unit_len] {
            "ns" => 1e-9,
            "us" | "µs" => 1e-6,
            "ms" => 1e-3,
            "s" => 1.0,
            "m" => 60.0,
            "h" => 3600.0,
            unit => bail!("unknown unit {unit:?} in duration {input:?}"),
        };
        total += value * seconds_per_unit;
        rest = &rest[unit_len..];
    }

    Duration::try_from_secs_f64(total).map_err(|e| eyre!("duration {input:?} out of range: {e}"))
}

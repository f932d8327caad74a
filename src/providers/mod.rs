pub mod chain;
pub mod fallback;

pub use chain::{AlloyClient, AlloyConnector, ChainClient, Connector};
pub use fallback::{create_fallback_provider, FallbackConfig};

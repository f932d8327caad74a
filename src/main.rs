use crypto_balance_exporter::{
    fetch_catalog, router, setup_logging, AlloyConnector, AppState, BalanceStore, Config,
    Connector, FallbackConfig, Scheduler, SchedulerConfig, TokenCatalog,
};
use eyre::{Result, WrapErr};
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    setup_logging(&config.log_level, config.log_json);

    if config.rpc_nodes.iter().any(|url| url != crypto_balance_exporter::config::DEFAULT_RPC_URL) {
        tracing::info!("using custom geth: {}", config.rpc_nodes.join(","));
    }

    let connector = Arc::new(AlloyConnector::new(
        FallbackConfig::new(config.rpc_nodes.clone(), config.active_transport_count),
        config.rpc_timeout,
    ));
    let client = connector
        .connect()
        .await
        .wrap_err("could not establish the initial chain connection")?;

    let catalog = match fetch_catalog(&config.token_list_url, config.chain_id).await {
        Ok(catalog) => catalog,
        Err(e) => {
            tracing::error!("could not get token list, tracking native balances only: {e:#}");
            TokenCatalog::default()
        }
    };

    let store = BalanceStore::new();
    let mut scheduler = Scheduler::new(
        SchedulerConfig {
            inputs: config.addresses.clone(),
            cache_ticks: config.cache_ticks,
            interval: config.interval,
        },
        connector,
        client,
        Arc::new(catalog),
        store.clone(),
    );
    scheduler.boot().await;
    tokio::spawn(scheduler.run());

    let app = router(Arc::new(AppState::new(store)));
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("listening on http://{addr}/metrics");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

use pharmacy_engine::notify::Propagator;
use pharmacy_engine::{
    selfcheck, setup_environment, Config, EngineApi, RedbStore, TracingNotifier,
};
use shared::types::{SessionContext, UserRole};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_environment();

    tracing::info!("Pharmacy reconciliation engine starting...");

    let config = Config::from_env();
    std::fs::create_dir_all(&config.work_dir)?;
    let store = Arc::new(RedbStore::open(
        std::path::Path::new(&config.work_dir).join("records.redb"),
    )?);

    // Diagnostics run on scratch data, never on the live collections
    let report = selfcheck::run_inventory_tests();
    for case in &report.tests {
        if case.passed {
            tracing::info!(check = %case.name, detail = %case.detail, "ok");
        } else {
            tracing::error!(check = %case.name, detail = %case.detail, "FAILED");
        }
    }
    tracing::info!("{}", report.summary);
    if !report.passed {
        anyhow::bail!("inventory self-check failed");
    }

    let api = EngineApi::new(store.clone());
    let stock = api.stock_report(None);
    tracing::info!(status = ?stock.status, "{}", stock.message);

    // Headless monitoring session until ctrl-c
    let shutdown = CancellationToken::new();
    let propagator = Propagator::new(
        store,
        SessionContext::new("admin", UserRole::Admin),
        TracingNotifier,
    );
    let poll = {
        let shutdown = shutdown.clone();
        let notify_interval = config.notify_poll_interval;
        let cart_interval = config.cart_badge_poll_interval;
        tokio::spawn(async move {
            propagator.run(notify_interval, cart_interval, shutdown).await;
        })
    };

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");
    shutdown.cancel();
    poll.await?;

    Ok(())
}

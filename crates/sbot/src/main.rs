use std::sync::Arc;

use sbot_core::{
    config::Config,
    dispatcher::Dispatcher,
    ports::StatusStore,
    store::FileStatusStore,
};
use sbot_dashboard::DashboardState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    sbot_core::logging::init("sbot")?;

    let cfg = match Config::load() {
        Ok(cfg) => Arc::new(cfg),
        Err(e) => {
            tracing::error!("{e}");
            return Err(e.into());
        }
    };

    let store: Arc<dyn StatusStore> = Arc::new(FileStatusStore::new(cfg.status_file.clone()));
    let dispatcher = Dispatcher::new(store);

    let dashboard = tokio::spawn(sbot_dashboard::serve(
        cfg.dashboard_addr(),
        DashboardState::from_config(&cfg),
    ));

    tokio::select! {
        res = sbot_telegram::router::run_polling(cfg.clone(), dispatcher) => {
            res.map_err(|e| anyhow::anyhow!("telegram bot failed: {e}"))?;
        }
        res = dashboard => {
            match res {
                Ok(Ok(())) => tracing::warn!("dashboard stopped"),
                Ok(Err(e)) => return Err(e),
                Err(e) => return Err(anyhow::anyhow!("dashboard task failed: {e}")),
            }
        }
    }

    Ok(())
}

use std::sync::Arc;

use lottery::{BetStore, DrawBarrier, MemoryBetStore, NumberMatchEvaluator, WinEvaluator};
use server::Server;

mod config;
mod connection;
mod lottery;
mod protocol;
mod server;

/// Everything a connection handler needs to serve one agency
#[derive(Clone)]
pub struct SharedLottery {
    pub barrier: DrawBarrier,
    pub store: Arc<dyn BetStore>,
    pub evaluator: Arc<dyn WinEvaluator>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    // connect tracing to stdout
    tracing_subscriber::fmt::init();

    let config = config::Config::from_env()?;

    let lottery = SharedLottery {
        barrier: DrawBarrier::new(config.agencies),
        store: Arc::new(MemoryBetStore::default()),
        evaluator: Arc::new(NumberMatchEvaluator::new(config.winning_number)),
    };

    let server = Server::bind(&config)?;
    tracing::info!("server listening on: {}", server.local_addr()?);

    server.run(lottery, shutdown_signal()).await
}

/// Resolves once the process receives Ctrl+C or, on unix, SIGTERM
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}

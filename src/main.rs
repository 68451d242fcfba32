// Binary Market Ledger - HTTP service entry point

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use binary_market_ledger::{app_state, build_router, AppState, Config};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;
    info!(
        bind = %config.bind_addr,
        operator = config.engine.operator.address(),
        fee_bps = config.engine.fee_bps,
        state = %config.state_path.display(),
        "starting binary market ledger"
    );

    // Refuse to start over a snapshot we cannot trust; serving an empty
    // ledger would overwrite it on the next save
    let state = match AppState::load_or_new(&config) {
        Ok(state) => state.into_shared(),
        Err(e) => {
            error!(error = %e, path = %config.state_path.display(), "cannot load ledger state, not starting");
            return Err(e.into());
        }
    };

    let autosave = config.save_interval.map(|interval| {
        info!(seconds = interval.as_secs(), "periodic state saves enabled");
        tokio::spawn(app_state::autosave(state.clone(), interval))
    });

    let app = build_router(state.clone());

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("listening on http://{}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("shutdown signal received, saving state");
    if let Some(task) = autosave {
        task.abort();
    }

    let app_state = state.lock().await;
    if let Err(e) = app_state.save_to_disk() {
        error!(error = %e, "failed to save state");
        return Err(e.into());
    }

    info!("goodbye");
    Ok(())
}

/// Resolves on Ctrl+C or, on unix, SIGTERM from a service manager
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

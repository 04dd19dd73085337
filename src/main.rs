use anyhow::Context;
use tokio::net::TcpListener;

use flashdeck::config::Config;
use flashdeck::{AppState, app, db};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::load()?;

    let pool = db::establish_pool(&config.database_url, 10).context("Failed to create DB pool")?;
    {
        let mut conn = pool.get().context("Failed to get DB connection")?;
        db::run_migrations(&mut conn).map_err(|e| anyhow::anyhow!("Migrations failed: {e}"))?;
    }

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;
    log::info!("Server running on http://{}", config.bind_addr);

    let app = app(AppState::from_config(pool, config));
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    log::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
    }
}

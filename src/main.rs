use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use gads_nexus::config::Config;
use gads_nexus::router::{GadsState, gads_router};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        database_url = %cfg.database_url,
        public_base_url = %cfg.public_base_url,
        api_version = %cfg.google_ads_api_version,
        login_customer_id = %cfg.google_ads_login_customer_id.as_deref().unwrap_or("<none>"),
        proxy = %cfg.proxy.as_deref().unwrap_or("<none>"),
        loglevel = %cfg.loglevel,
    );

    let addr = cfg.listen_addr.clone();
    let state = match GadsState::build(cfg).await {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, "startup failed");
            return Err(e.into());
        }
    };
    let app = gads_router(state);

    let listener = TcpListener::bind(&addr).await?;
    info!("HTTP server listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await?;
    Ok(())
}

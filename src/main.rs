use yieldpilot::api::router::create_router;
use yieldpilot::config::AppConfig;
use yieldpilot::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!(?config, "Configuration loaded");

    if !config.has_ai() {
        tracing::warn!("ANTHROPIC_API_KEY not set; analyses use the deterministic synthesis");
    }
    if config.has_chain_registry() && config.registry_private_key.is_none() {
        tracing::warn!("REGISTRY_PRIVATE_KEY not set; registry is read-only");
    }

    let metrics_handle = yieldpilot::metrics::init_metrics();
    let state = AppState::from_config(config, metrics_handle)?;
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {addr}");
    axum::serve(listener, router).await?;

    Ok(())
}

/// `RUST_LOG` controls filtering; `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json")) {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

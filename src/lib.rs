pub mod anthropic;
pub mod api;
pub mod bsc;
pub mod catalog;
pub mod config;
pub mod errors;
pub mod intelligence;
pub mod metrics;
pub mod models;
pub mod registry;
pub mod services;

use std::sync::Arc;

use crate::anthropic::AnthropicClient;
use crate::bsc::{ExplorerClient, PriceClient};
use crate::config::AppConfig;
use crate::intelligence::Synthesizer;
use crate::registry::{ChainRegistry, Registry};
use crate::services::PortfolioScanner;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub scanner: Arc<PortfolioScanner>,
    pub synthesizer: Arc<Synthesizer>,
    pub registry: Arc<Registry>,
    pub metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
}

impl AppState {
    /// Wire every service from configuration. Missing credentials degrade
    /// the matching feature instead of failing.
    pub fn from_config(
        config: AppConfig,
        metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
    ) -> anyhow::Result<Self> {
        let http = reqwest::Client::new();

        let scanner = PortfolioScanner::new(
            ExplorerClient::new(
                http.clone(),
                config.bscscan_api_url.clone(),
                config.bscscan_api_key.clone(),
            ),
            PriceClient::new(http.clone(), config.coingecko_api_url.clone()),
        );

        let synthesizer = Synthesizer::new(config.anthropic_api_key.clone().map(|key| {
            AnthropicClient::new(
                http.clone(),
                key,
                config.anthropic_model.clone(),
                config.anthropic_max_tokens,
            )
        }));

        let registry = match config.registry_address {
            Some(address) => Registry::Chain(ChainRegistry::connect(
                &config.registry_rpc_url,
                address,
                config.registry_private_key.as_deref(),
                config.registry_chain_id,
            )?),
            None => Registry::local(),
        };

        tracing::info!(
            ai_enabled = synthesizer.is_ai_enabled(),
            registry = registry.mode(),
            publish_enabled = registry.can_publish(),
            "Services configured"
        );

        Ok(Self {
            config,
            scanner: Arc::new(scanner),
            synthesizer: Arc::new(synthesizer),
            registry: Arc::new(registry),
            metrics_handle,
        })
    }
}

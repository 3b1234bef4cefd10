pub mod chain;
pub mod local;

pub use chain::ChainRegistry;
pub use local::StrategyRegistry;

use alloy::primitives::Address;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::models::{PublishStrategy, RegistryStats, StrategyRecord};

pub const TOKEN_NAME: &str = "YieldPilot Strategy";
pub const TOKEN_SYMBOL: &str = "YPS";

/// Registry failures. Variants carrying a contract revert reason display it
/// verbatim.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Risk score must be 0-100")]
    InvalidRiskScore,

    #[error("Strategy hash required")]
    MissingHash,

    #[error("Must include at least one protocol")]
    NoProtocols,

    #[error("Strategy does not exist")]
    NotFound,

    #[error("Not token owner")]
    NotOwner,

    #[error("Caller is not token owner or approved")]
    NotApproved,

    #[error("Transfer from incorrect owner")]
    IncorrectOwner,

    #[error("Transfer to the zero address")]
    ZeroReceiver,

    #[error("Caller address required")]
    MissingCaller,

    #[error("Strategy publishing is not configured")]
    PublishDisabled,

    #[error("registry chain call failed: {0}")]
    Chain(String),
}

impl RegistryError {
    /// True for failures the contract itself would revert with.
    pub fn is_revert(&self) -> bool {
        !matches!(
            self,
            RegistryError::NotFound | RegistryError::PublishDisabled | RegistryError::Chain(_)
        )
    }
}

/// Contract-side checks for `publishStrategy`, in the contract's order.
pub fn validate_publish(args: &PublishStrategy) -> Result<(), RegistryError> {
    if args.risk_score > 100 {
        return Err(RegistryError::InvalidRiskScore);
    }
    if args.strategy_hash.is_zero() {
        return Err(RegistryError::MissingHash);
    }
    if args.protocol_count == 0 {
        return Err(RegistryError::NoProtocols);
    }
    Ok(())
}

/// Strategy registry backend.
#[derive(Debug)]
pub enum Registry {
    /// In-process registry. The caller acts as `msg.sender`.
    Local(RwLock<StrategyRegistry>),
    /// Deployed registry contract. Writes are signed by the configured key.
    Chain(ChainRegistry),
}

impl Default for Registry {
    fn default() -> Self {
        Self::local()
    }
}

impl Registry {
    pub fn local() -> Self {
        Registry::Local(RwLock::new(StrategyRegistry::new()))
    }

    pub fn mode(&self) -> &'static str {
        match self {
            Registry::Local(_) => "local",
            Registry::Chain(_) => "chain",
        }
    }

    pub fn can_publish(&self) -> bool {
        match self {
            Registry::Local(_) => true,
            Registry::Chain(chain) => chain.signer().is_some(),
        }
    }

    pub async fn publish(
        &self,
        caller: Option<Address>,
        args: PublishStrategy,
    ) -> Result<StrategyRecord, RegistryError> {
        validate_publish(&args)?;

        let record = match self {
            Registry::Local(local) => {
                let caller = caller.ok_or(RegistryError::MissingCaller)?;
                let timestamp = chrono::Utc::now().timestamp().max(0) as u64;
                let mut registry = local.write().await;
                let id = registry.publish_strategy(caller, args, timestamp)?;
                registry.get_strategy(id)?.clone()
            }
            Registry::Chain(chain) => chain.publish(args).await?,
        };

        metrics::counter!("strategies_published_total", "mode" => self.mode()).increment(1);
        tracing::info!(
            token_id = record.token_id,
            creator = %record.creator,
            risk_score = record.risk_score,
            mode = self.mode(),
            "Strategy published"
        );

        Ok(record)
    }

    pub async fn strategy(&self, token_id: u64) -> Result<StrategyRecord, RegistryError> {
        match self {
            Registry::Local(local) => local.read().await.get_strategy(token_id).cloned(),
            Registry::Chain(chain) => chain.strategy(token_id).await,
        }
    }

    /// Up to `limit` strategies, newest first.
    pub async fn recent(&self, limit: usize) -> Result<Vec<StrategyRecord>, RegistryError> {
        match self {
            Registry::Local(local) => Ok(local.read().await.recent(limit)),
            Registry::Chain(chain) => chain.recent(limit).await,
        }
    }

    pub async fn stats(&self) -> Result<RegistryStats, RegistryError> {
        match self {
            Registry::Local(local) => Ok(local.read().await.stats()),
            Registry::Chain(chain) => chain.stats().await,
        }
    }

    pub async fn strategies_by_creator(&self, creator: Address) -> Result<Vec<u64>, RegistryError> {
        match self {
            Registry::Local(local) => Ok(local.read().await.strategies_by_creator(creator)),
            Registry::Chain(chain) => chain.strategies_by_creator(creator).await,
        }
    }

    pub async fn update_uri(
        &self,
        caller: Option<Address>,
        token_id: u64,
        uri: String,
    ) -> Result<StrategyRecord, RegistryError> {
        match self {
            Registry::Local(local) => {
                let caller = caller.ok_or(RegistryError::MissingCaller)?;
                let mut registry = local.write().await;
                registry.update_strategy_uri(caller, token_id, uri)?;
                registry.get_strategy(token_id).cloned()
            }
            Registry::Chain(chain) => chain.update_uri(token_id, uri).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{address, B256};

    use super::*;

    const CREATOR: Address = address!("0x70997970C51812dc3A010C7d01b50e0d17dc79C8");

    fn args() -> PublishStrategy {
        PublishStrategy {
            wallet_analyzed: Address::repeat_byte(0x12),
            risk_score: 35,
            expected_apy: 1250,
            protocol_count: 3,
            strategy_hash: B256::repeat_byte(0xab),
            strategy_uri: String::new(),
            chain_id: 56,
        }
    }

    #[test]
    fn test_revert_classification() {
        assert!(RegistryError::InvalidRiskScore.is_revert());
        assert!(RegistryError::NotOwner.is_revert());
        assert!(!RegistryError::NotFound.is_revert());
        assert!(!RegistryError::PublishDisabled.is_revert());
        assert!(!RegistryError::Chain("timeout".into()).is_revert());
    }

    #[tokio::test]
    async fn test_local_publish_and_read_back() {
        let registry = Registry::local();
        assert_eq!(registry.mode(), "local");
        assert!(registry.can_publish());

        let record = registry.publish(Some(CREATOR), args()).await.unwrap();
        assert_eq!(record.token_id, 1);
        assert_eq!(record.creator, CREATOR);
        assert!(record.timestamp > 0);

        assert_eq!(registry.strategy(1).await.unwrap(), record);
        assert_eq!(registry.strategies_by_creator(CREATOR).await.unwrap(), vec![1]);
        assert_eq!(registry.stats().await.unwrap().total_protocols_analyzed, 3);
    }

    #[tokio::test]
    async fn test_local_requires_caller() {
        let registry = Registry::local();
        let err = registry.publish(None, args()).await.unwrap_err();
        assert!(matches!(err, RegistryError::MissingCaller));

        // Validation runs before the caller check
        let mut bad = args();
        bad.risk_score = 101;
        let err = registry.publish(None, bad).await.unwrap_err();
        assert!(matches!(err, RegistryError::InvalidRiskScore));
    }

    #[tokio::test]
    async fn test_local_update_uri() {
        let registry = Registry::local();
        registry.publish(Some(CREATOR), args()).await.unwrap();

        let other = Address::repeat_byte(0x99);
        let err = registry.update_uri(Some(other), 1, "x".into()).await.unwrap_err();
        assert_eq!(err.to_string(), "Not token owner");

        let record = registry.update_uri(Some(CREATOR), 1, "ipfs://new".into()).await.unwrap();
        assert_eq!(record.strategy_uri, "ipfs://new");
    }
}

use std::fmt;

use alloy::network::EthereumWallet;
use alloy::primitives::{Address, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::Log;
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer;
use alloy::sol;
use futures_util::future::try_join_all;

use super::{validate_publish, RegistryError};
use crate::models::{PublishStrategy, RegistryStats, StrategyRecord};

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    contract IStrategyRegistry {
        struct Strategy {
            address creator;
            address walletAnalyzed;
            uint8 riskScore;
            uint16 expectedAPY;
            uint8 protocolCount;
            bytes32 strategyHash;
            string strategyURI;
            uint256 timestamp;
            uint256 chainId;
        }

        function publishStrategy(
            address walletAnalyzed,
            uint8 riskScore,
            uint16 expectedAPY,
            uint8 protocolCount,
            bytes32 strategyHash,
            string strategyURI,
            uint256 chainId
        ) external returns (uint256 tokenId);
        function getStrategy(uint256 tokenId) external view returns (Strategy memory);
        function getStrategyCount() external view returns (uint256);
        function totalStrategies() external view returns (uint256);
        function totalProtocolsAnalyzed() external view returns (uint256);
        function getStrategiesByCreator(address creator) external view returns (uint256[] memory);
        function updateStrategyURI(uint256 tokenId, string newURI) external;
        function ownerOf(uint256 tokenId) external view returns (address);

        event Transfer(address indexed from, address indexed to, uint256 indexed tokenId);
    }
}

type RegistryContract = IStrategyRegistry::IStrategyRegistryInstance<DynProvider>;

/// Registry backed by a deployed contract. Reads work with any RPC
/// endpoint; writes need a signer key.
#[derive(Clone)]
pub struct ChainRegistry {
    contract: RegistryContract,
    signer: Option<Address>,
}

impl fmt::Debug for ChainRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainRegistry")
            .field("address", self.contract.address())
            .field("signer", &self.signer)
            .finish()
    }
}

fn chain_err(e: impl fmt::Display) -> RegistryError {
    RegistryError::Chain(e.to_string())
}

fn to_u64(value: U256) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}

/// Token id minted by `registry` in a receipt, taken from the ERC-721
/// `Transfer` log whose sender is the zero address.
fn minted_token_id(logs: &[Log], registry: Address) -> Option<u64> {
    logs.iter()
        .filter(|log| log.address() == registry)
        .filter_map(|log| log.log_decode::<IStrategyRegistry::Transfer>().ok())
        .find(|log| log.inner.data.from == Address::ZERO)
        .map(|log| to_u64(log.inner.data.tokenId))
}

impl ChainRegistry {
    /// Connect to the registry at `address`. With a private key the provider
    /// signs and sends transactions for `chain_id`.
    pub fn connect(
        rpc_url: &str,
        address: Address,
        private_key: Option<&str>,
        chain_id: u64,
    ) -> Result<Self, RegistryError> {
        let url = rpc_url.parse().map_err(chain_err)?;

        let (provider, signer) = match private_key {
            Some(key) => {
                let signer: PrivateKeySigner = key.trim().parse().map_err(chain_err)?;
                let signer = signer.with_chain_id(Some(chain_id));
                let from = signer.address();
                let provider = ProviderBuilder::new()
                    .wallet(EthereumWallet::from(signer))
                    .connect_http(url)
                    .erased();
                (provider, Some(from))
            }
            None => (ProviderBuilder::new().connect_http(url).erased(), None),
        };

        Ok(Self {
            contract: IStrategyRegistry::new(address, provider),
            signer,
        })
    }

    pub fn signer(&self) -> Option<Address> {
        self.signer
    }

    pub async fn publish(&self, args: PublishStrategy) -> Result<StrategyRecord, RegistryError> {
        if self.signer.is_none() {
            return Err(RegistryError::PublishDisabled);
        }
        validate_publish(&args)?;

        let receipt = self
            .contract
            .publishStrategy(
                args.wallet_analyzed,
                args.risk_score,
                args.expected_apy,
                args.protocol_count,
                args.strategy_hash,
                args.strategy_uri,
                U256::from(args.chain_id),
            )
            .send()
            .await
            .map_err(chain_err)?
            .get_receipt()
            .await
            .map_err(chain_err)?;

        if !receipt.status() {
            return Err(RegistryError::Chain(format!(
                "publish transaction {} reverted",
                receipt.transaction_hash
            )));
        }

        let token_id = minted_token_id(receipt.inner.logs(), *self.contract.address())
            .ok_or_else(|| {
                RegistryError::Chain(format!(
                    "publish transaction {} minted no token",
                    receipt.transaction_hash
                ))
            })?;
        self.strategy(token_id).await
    }

    pub async fn strategy(&self, token_id: u64) -> Result<StrategyRecord, RegistryError> {
        let count = self.strategy_count().await?;
        if token_id == 0 || token_id > count {
            return Err(RegistryError::NotFound);
        }

        let id = U256::from(token_id);
        let strategy_call = self.contract.getStrategy(id);
        let owner_call = self.contract.ownerOf(id);
        let (strategy, owner) = tokio::join!(strategy_call.call(), owner_call.call());
        let strategy = strategy.map_err(chain_err)?;

        Ok(StrategyRecord {
            token_id,
            owner: owner.map_err(chain_err)?,
            creator: strategy.creator,
            wallet_analyzed: strategy.walletAnalyzed,
            risk_score: strategy.riskScore,
            expected_apy: strategy.expectedAPY,
            protocol_count: strategy.protocolCount,
            strategy_hash: strategy.strategyHash,
            strategy_uri: strategy.strategyURI,
            timestamp: to_u64(strategy.timestamp),
            chain_id: to_u64(strategy.chainId),
        })
    }

    pub async fn recent(&self, limit: usize) -> Result<Vec<StrategyRecord>, RegistryError> {
        let count = self.strategy_count().await?;
        let oldest = count.saturating_sub(limit as u64) + 1;
        try_join_all((oldest..=count).rev().map(|id| self.strategy(id))).await
    }

    pub async fn strategy_count(&self) -> Result<u64, RegistryError> {
        self.contract
            .getStrategyCount()
            .call()
            .await
            .map(to_u64)
            .map_err(chain_err)
    }

    pub async fn stats(&self) -> Result<RegistryStats, RegistryError> {
        let count_call = self.contract.getStrategyCount();
        let total_call = self.contract.totalStrategies();
        let protocols_call = self.contract.totalProtocolsAnalyzed();
        let (count, total, protocols) =
            tokio::join!(count_call.call(), total_call.call(), protocols_call.call());
        Ok(RegistryStats {
            strategy_count: to_u64(count.map_err(chain_err)?),
            total_strategies: to_u64(total.map_err(chain_err)?),
            total_protocols_analyzed: to_u64(protocols.map_err(chain_err)?),
        })
    }

    pub async fn strategies_by_creator(&self, creator: Address) -> Result<Vec<u64>, RegistryError> {
        let ids = self
            .contract
            .getStrategiesByCreator(creator)
            .call()
            .await
            .map_err(chain_err)?;
        Ok(ids.into_iter().map(to_u64).collect())
    }

    /// Update the URI of a token owned by the signer. Ownership is checked
    /// before sending so the revert reason matches the local registry.
    pub async fn update_uri(&self, token_id: u64, uri: String) -> Result<StrategyRecord, RegistryError> {
        let signer = self.signer.ok_or(RegistryError::PublishDisabled)?;
        let record = self.strategy(token_id).await?;
        if record.owner != signer {
            return Err(RegistryError::NotOwner);
        }

        let receipt = self
            .contract
            .updateStrategyURI(U256::from(token_id), uri)
            .send()
            .await
            .map_err(chain_err)?
            .get_receipt()
            .await
            .map_err(chain_err)?;
        if !receipt.status() {
            return Err(RegistryError::Chain(format!(
                "URI update transaction {} reverted",
                receipt.transaction_hash
            )));
        }

        self.strategy(token_id).await
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{Bytes, LogData, B256};
    use alloy::sol_types::SolEvent;

    use super::*;

    // Hardhat account #0
    const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn test_connect_read_only() {
        let registry = ChainRegistry::connect("http://127.0.0.1:8545", Address::ZERO, None, 56).unwrap();
        assert!(registry.signer().is_none());
    }

    #[test]
    fn test_connect_with_signer() {
        let registry =
            ChainRegistry::connect("http://127.0.0.1:8545", Address::ZERO, Some(DEV_KEY), 97).unwrap();
        assert_eq!(
            registry.signer().unwrap().to_string(),
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
        );
    }

    #[test]
    fn test_connect_rejects_bad_inputs() {
        assert!(ChainRegistry::connect("not a url", Address::ZERO, None, 56).is_err());
        assert!(ChainRegistry::connect("http://127.0.0.1:8545", Address::ZERO, Some("0x1234"), 56).is_err());
    }

    #[tokio::test]
    async fn test_publish_without_signer_is_disabled() {
        let registry = ChainRegistry::connect("http://127.0.0.1:8545", Address::ZERO, None, 56).unwrap();
        let args = PublishStrategy {
            wallet_analyzed: Address::ZERO,
            risk_score: 10,
            expected_apy: 500,
            protocol_count: 1,
            strategy_hash: alloy::primitives::B256::repeat_byte(1),
            strategy_uri: String::new(),
            chain_id: 56,
        };
        assert!(matches!(registry.publish(args).await, Err(RegistryError::PublishDisabled)));
    }

    fn transfer_log(contract: Address, from: Address, to: Address, token_id: u64) -> Log {
        let topics = vec![
            IStrategyRegistry::Transfer::SIGNATURE_HASH,
            from.into_word(),
            to.into_word(),
            B256::from(U256::from(token_id).to_be_bytes::<32>()),
        ];
        Log {
            inner: alloy::primitives::Log {
                address: contract,
                data: LogData::new_unchecked(topics, Bytes::new()),
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_minted_token_id_reads_mint_transfer() {
        let registry = Address::repeat_byte(0x11);
        let creator = Address::repeat_byte(0x22);
        let logs = vec![transfer_log(registry, Address::ZERO, creator, 7)];
        assert_eq!(minted_token_id(&logs, registry), Some(7));
    }

    #[test]
    fn test_minted_token_id_ignores_other_transfers() {
        let registry = Address::repeat_byte(0x11);
        let creator = Address::repeat_byte(0x22);
        let logs = vec![
            // plain transfer of an existing token
            transfer_log(registry, creator, Address::repeat_byte(0x33), 3),
            // mint on an unrelated contract
            transfer_log(Address::repeat_byte(0x44), Address::ZERO, creator, 9),
            transfer_log(registry, Address::ZERO, creator, 12),
        ];
        assert_eq!(minted_token_id(&logs, registry), Some(12));
        assert_eq!(minted_token_id(&logs[..2], registry), None);
        assert_eq!(minted_token_id(&[], registry), None);
    }
}

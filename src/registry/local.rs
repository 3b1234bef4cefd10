use std::collections::HashMap;

use alloy::primitives::Address;

use super::{validate_publish, RegistryError};
use crate::models::{PublishStrategy, RegistryStats, StrategyRecord};

/// In-process strategy registry with the same rules as the deployed
/// contract: dense token ids from 1, creator-owned records, and ERC-721
/// style ownership transfer.
#[derive(Debug, Default)]
pub struct StrategyRegistry {
    /// Index `i` holds token id `i + 1`.
    strategies: Vec<StrategyRecord>,
    approvals: HashMap<u64, Address>,
    by_creator: HashMap<Address, Vec<u64>>,
    total_protocols_analyzed: u64,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a new strategy owned by `caller`. Returns its token id.
    pub fn publish_strategy(
        &mut self,
        caller: Address,
        args: PublishStrategy,
        timestamp: u64,
    ) -> Result<u64, RegistryError> {
        validate_publish(&args)?;

        let token_id = self.strategies.len() as u64 + 1;
        self.total_protocols_analyzed += u64::from(args.protocol_count);
        self.by_creator.entry(caller).or_default().push(token_id);
        self.strategies.push(StrategyRecord {
            token_id,
            owner: caller,
            creator: caller,
            wallet_analyzed: args.wallet_analyzed,
            risk_score: args.risk_score,
            expected_apy: args.expected_apy,
            protocol_count: args.protocol_count,
            strategy_hash: args.strategy_hash,
            strategy_uri: args.strategy_uri,
            timestamp,
            chain_id: args.chain_id,
        });

        Ok(token_id)
    }

    pub fn get_strategy(&self, token_id: u64) -> Result<&StrategyRecord, RegistryError> {
        token_id
            .checked_sub(1)
            .and_then(|i| self.strategies.get(i as usize))
            .ok_or(RegistryError::NotFound)
    }

    fn get_strategy_mut(&mut self, token_id: u64) -> Result<&mut StrategyRecord, RegistryError> {
        token_id
            .checked_sub(1)
            .and_then(|i| self.strategies.get_mut(i as usize))
            .ok_or(RegistryError::NotFound)
    }

    pub fn strategy_count(&self) -> u64 {
        self.strategies.len() as u64
    }

    /// Number of strategies ever minted. Records are never burned, so this
    /// always equals `strategy_count`.
    pub fn total_strategies(&self) -> u64 {
        self.strategies.len() as u64
    }

    pub fn total_protocols_analyzed(&self) -> u64 {
        self.total_protocols_analyzed
    }

    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            strategy_count: self.strategy_count(),
            total_strategies: self.total_strategies(),
            total_protocols_analyzed: self.total_protocols_analyzed,
        }
    }

    /// Token ids minted by `creator`, in creation order.
    pub fn strategies_by_creator(&self, creator: Address) -> Vec<u64> {
        self.by_creator.get(&creator).cloned().unwrap_or_default()
    }

    /// Up to `limit` records, newest first.
    pub fn recent(&self, limit: usize) -> Vec<StrategyRecord> {
        self.strategies.iter().rev().take(limit).cloned().collect()
    }

    pub fn token_uri(&self, token_id: u64) -> Result<&str, RegistryError> {
        Ok(&self.get_strategy(token_id)?.strategy_uri)
    }

    pub fn owner_of(&self, token_id: u64) -> Result<Address, RegistryError> {
        Ok(self.get_strategy(token_id)?.owner)
    }

    pub fn update_strategy_uri(
        &mut self,
        caller: Address,
        token_id: u64,
        uri: String,
    ) -> Result<(), RegistryError> {
        let record = self.get_strategy_mut(token_id)?;
        if record.owner != caller {
            return Err(RegistryError::NotOwner);
        }
        record.strategy_uri = uri;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // ERC-721 ownership
    // -----------------------------------------------------------------------

    pub fn approve(&mut self, caller: Address, to: Address, token_id: u64) -> Result<(), RegistryError> {
        if self.owner_of(token_id)? != caller {
            return Err(RegistryError::NotOwner);
        }
        if to.is_zero() {
            self.approvals.remove(&token_id);
        } else {
            self.approvals.insert(token_id, to);
        }
        Ok(())
    }

    pub fn get_approved(&self, token_id: u64) -> Result<Option<Address>, RegistryError> {
        self.get_strategy(token_id)?;
        Ok(self.approvals.get(&token_id).copied())
    }

    pub fn transfer_from(
        &mut self,
        caller: Address,
        from: Address,
        to: Address,
        token_id: u64,
    ) -> Result<(), RegistryError> {
        if to.is_zero() {
            return Err(RegistryError::ZeroReceiver);
        }
        let owner = self.owner_of(token_id)?;
        if owner != from {
            return Err(RegistryError::IncorrectOwner);
        }
        let approved = self.approvals.get(&token_id) == Some(&caller);
        if caller != owner && !approved {
            return Err(RegistryError::NotApproved);
        }

        self.approvals.remove(&token_id);
        self.get_strategy_mut(token_id)?.owner = to;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{address, keccak256, B256};

    use super::*;

    const USER1: Address = address!("0x70997970C51812dc3A010C7d01b50e0d17dc79C8");
    const USER2: Address = address!("0x3C44CdDdB6a900fa2b585dd299e03d12FA4293BC");
    const WALLET: Address = address!("0x1234567890123456789012345678901234567890");

    fn args(risk_score: u8, protocol_count: u8, hash: B256) -> PublishStrategy {
        PublishStrategy {
            wallet_analyzed: WALLET,
            risk_score,
            expected_apy: 1250,
            protocol_count,
            strategy_hash: hash,
            strategy_uri: String::new(),
            chain_id: 56,
        }
    }

    fn hash() -> B256 {
        keccak256("strategy json content")
    }

    // -----------------------------------------------------------------------
    // publish_strategy
    // -----------------------------------------------------------------------

    #[test]
    fn test_starts_empty() {
        let registry = StrategyRegistry::new();
        assert_eq!(registry.strategy_count(), 0);
        assert_eq!(registry.total_strategies(), 0);
        assert_eq!(registry.total_protocols_analyzed(), 0);
    }

    #[test]
    fn test_publish_mints_to_caller() {
        let mut registry = StrategyRegistry::new();
        let mut a = args(42, 5, hash());
        a.strategy_uri = "ipfs://QmTest".into();

        let id = registry.publish_strategy(USER1, a, 1_700_000_000).unwrap();
        assert_eq!(id, 1);
        assert_eq!(registry.strategy_count(), 1);
        assert_eq!(registry.owner_of(1).unwrap(), USER1);

        let record = registry.get_strategy(1).unwrap();
        assert_eq!(record.creator, USER1);
        assert_eq!(record.wallet_analyzed, WALLET);
        assert_eq!(record.risk_score, 42);
        assert_eq!(record.protocol_count, 5);
        assert_eq!(record.strategy_hash, hash());
        assert_eq!(record.strategy_uri, "ipfs://QmTest");
        assert_eq!(record.timestamp, 1_700_000_000);
        assert_eq!(record.chain_id, 56);
    }

    #[test]
    fn test_publish_validation_order() {
        let mut registry = StrategyRegistry::new();

        let err = registry.publish_strategy(USER1, args(101, 0, B256::ZERO), 0).unwrap_err();
        assert_eq!(err.to_string(), "Risk score must be 0-100");

        let err = registry.publish_strategy(USER1, args(50, 0, B256::ZERO), 0).unwrap_err();
        assert_eq!(err.to_string(), "Strategy hash required");

        let err = registry.publish_strategy(USER1, args(50, 0, hash()), 0).unwrap_err();
        assert_eq!(err.to_string(), "Must include at least one protocol");

        assert_eq!(registry.strategy_count(), 0);
        assert_eq!(registry.publish_strategy(USER1, args(100, 1, hash()), 0).unwrap(), 1);
    }

    #[test]
    fn test_ids_dense_and_counters_accumulate() {
        let mut registry = StrategyRegistry::new();
        registry.publish_strategy(USER1, args(50, 3, hash()), 0).unwrap();
        assert_eq!(registry.total_protocols_analyzed(), 3);

        let id = registry
            .publish_strategy(USER2, args(30, 4, keccak256("strategy2")), 0)
            .unwrap();
        assert_eq!(id, 2);
        assert_eq!(registry.total_protocols_analyzed(), 7);
        assert_eq!(registry.owner_of(1).unwrap(), USER1);
        assert_eq!(registry.owner_of(2).unwrap(), USER2);
        assert_eq!(registry.stats().total_strategies, 2);

        let recent: Vec<u64> = registry.recent(10).iter().map(|r| r.token_id).collect();
        assert_eq!(recent, vec![2, 1]);
        assert_eq!(registry.recent(1).len(), 1);
    }

    // -----------------------------------------------------------------------
    // Lookups
    // -----------------------------------------------------------------------

    #[test]
    fn test_missing_strategy() {
        let registry = StrategyRegistry::new();
        assert_eq!(registry.get_strategy(999).unwrap_err().to_string(), "Strategy does not exist");
        assert!(matches!(registry.get_strategy(0), Err(RegistryError::NotFound)));
    }

    #[test]
    fn test_strategies_by_creator() {
        let mut registry = StrategyRegistry::new();
        registry.publish_strategy(USER1, args(50, 2, hash()), 0).unwrap();
        registry.publish_strategy(USER2, args(50, 2, hash()), 0).unwrap();
        registry.publish_strategy(USER1, args(30, 3, hash()), 0).unwrap();

        assert_eq!(registry.strategies_by_creator(USER1), vec![1, 3]);
        assert_eq!(registry.strategies_by_creator(WALLET), Vec::<u64>::new());
    }

    #[test]
    fn test_update_uri_owner_only() {
        let mut registry = StrategyRegistry::new();
        let mut a = args(50, 2, hash());
        a.strategy_uri = "old-uri".into();
        registry.publish_strategy(USER1, a, 0).unwrap();

        let err = registry
            .update_strategy_uri(USER2, 1, "ipfs://malicious".into())
            .unwrap_err();
        assert_eq!(err.to_string(), "Not token owner");

        registry.update_strategy_uri(USER1, 1, "ipfs://updated".into()).unwrap();
        assert_eq!(registry.token_uri(1).unwrap(), "ipfs://updated");
    }

    // -----------------------------------------------------------------------
    // Transfers
    // -----------------------------------------------------------------------

    #[test]
    fn test_transfer_moves_ownership_not_authorship() {
        let mut registry = StrategyRegistry::new();
        registry.publish_strategy(USER1, args(50, 2, hash()), 0).unwrap();

        registry.transfer_from(USER1, USER1, USER2, 1).unwrap();
        assert_eq!(registry.owner_of(1).unwrap(), USER2);
        assert_eq!(registry.get_strategy(1).unwrap().creator, USER1);

        // The new owner controls the URI
        assert!(matches!(
            registry.update_strategy_uri(USER1, 1, "x".into()),
            Err(RegistryError::NotOwner)
        ));
        registry.update_strategy_uri(USER2, 1, "y".into()).unwrap();
    }

    #[test]
    fn test_approved_transfer_clears_approval() {
        let mut registry = StrategyRegistry::new();
        registry.publish_strategy(USER1, args(50, 2, hash()), 0).unwrap();

        assert!(matches!(
            registry.transfer_from(USER2, USER1, USER2, 1),
            Err(RegistryError::NotApproved)
        ));

        registry.approve(USER1, USER2, 1).unwrap();
        assert_eq!(registry.get_approved(1).unwrap(), Some(USER2));

        registry.transfer_from(USER2, USER1, WALLET, 1).unwrap();
        assert_eq!(registry.owner_of(1).unwrap(), WALLET);
        assert_eq!(registry.get_approved(1).unwrap(), None);
    }

    #[test]
    fn test_transfer_rejections() {
        let mut registry = StrategyRegistry::new();
        registry.publish_strategy(USER1, args(50, 2, hash()), 0).unwrap();

        assert!(matches!(
            registry.transfer_from(USER1, USER1, Address::ZERO, 1),
            Err(RegistryError::ZeroReceiver)
        ));
        assert!(matches!(
            registry.transfer_from(USER1, USER2, WALLET, 1),
            Err(RegistryError::IncorrectOwner)
        ));
        assert!(matches!(
            registry.transfer_from(USER1, USER1, USER2, 7),
            Err(RegistryError::NotFound)
        ));
        assert!(matches!(registry.approve(USER2, WALLET, 1), Err(RegistryError::NotOwner)));
    }
}

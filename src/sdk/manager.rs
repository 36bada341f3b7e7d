//! Per-account client cache

use dashmap::{DashMap, mapref::entry::Entry};
use std::sync::Arc;
use tracing::info;

use super::client::{ClientFactory, DeltaTradeClient, SdkError};
use crate::account::AccountContext;

/// Hands out one SDK client per account id.
///
/// Clients are created on first use and kept for the life of the process.
/// Concurrent requests for different accounts each get their own entry, so a
/// request never observes a client bound to somebody else.
pub struct SdkManager {
    factory: Arc<dyn ClientFactory>,
    clients: DashMap<String, Arc<dyn DeltaTradeClient>>,
}

impl SdkManager {
    pub fn new(factory: Arc<dyn ClientFactory>) -> Self {
        Self {
            factory,
            clients: DashMap::new(),
        }
    }

    pub fn client_for(&self, account: &AccountContext) -> Result<Arc<dyn DeltaTradeClient>, SdkError> {
        if let Some(client) = self.clients.get(account.account_id()) {
            return Ok(Arc::clone(client.value()));
        }

        let (client, created) = match self.clients.entry(account.account_id().to_string()) {
            Entry::Occupied(existing) => (Arc::clone(existing.get()), false),
            Entry::Vacant(slot) => {
                let client = self.factory.create(account.account_id())?;
                slot.insert(Arc::clone(&client));
                (client, true)
            }
        };

        // Shard locks are released here; len() takes all of them
        if created {
            info!(
                "Created Delta Trade client for account {} ({} cached)",
                account.account_id(),
                self.cached_accounts()
            );
        }
        Ok(client)
    }

    /// Number of accounts with a live client
    pub fn cached_accounts(&self) -> usize {
        self.clients.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockFactory;

    #[test]
    fn reuses_client_for_same_account() {
        let factory = Arc::new(MockFactory::default());
        let manager = SdkManager::new(factory.clone());

        let a = manager.client_for(&AccountContext::explicit("alice.near")).unwrap();
        let b = manager.client_for(&AccountContext::explicit("alice.near")).unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(factory.created(), 1);
    }

    #[test]
    fn keeps_one_client_per_account() {
        let factory = Arc::new(MockFactory::default());
        let manager = SdkManager::new(factory.clone());

        let alice = manager.client_for(&AccountContext::explicit("alice.near")).unwrap();
        let bob = manager.client_for(&AccountContext::explicit("bob.near")).unwrap();
        let alice_again = manager.client_for(&AccountContext::explicit("alice.near")).unwrap();

        assert_eq!(alice.account_id(), "alice.near");
        assert_eq!(bob.account_id(), "bob.near");
        assert!(Arc::ptr_eq(&alice, &alice_again));
        assert_eq!(manager.cached_accounts(), 2);
        assert_eq!(factory.created(), 2);
    }

    #[test]
    fn factory_failure_is_not_cached() {
        let factory = Arc::new(MockFactory::failing());
        let manager = SdkManager::new(factory);

        assert!(manager.client_for(&AccountContext::default()).is_err());
        assert_eq!(manager.cached_accounts(), 0);
    }
}

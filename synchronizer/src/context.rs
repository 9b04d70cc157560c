//! Connected-account context, passed in explicitly.

use aim_types::AccountAddress;

/// The wallet context a synchronizer submits under.
///
/// Supplied by whoever owns the wallet connection; tests inject a fixed
/// account. Changing the account does not affect a session already in flight.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccountContext {
    account: Option<AccountAddress>,
    chain_id: Option<u64>,
}

impl AccountContext {
    /// No wallet connected.
    pub fn disconnected() -> Self {
        Self::default()
    }

    pub fn connected(account: AccountAddress) -> Self {
        Self {
            account: Some(account),
            chain_id: None,
        }
    }

    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = Some(chain_id);
        self
    }

    pub fn account(&self) -> Option<&AccountAddress> {
        self.account.as_ref()
    }

    pub fn chain_id(&self) -> Option<u64> {
        self.chain_id
    }

    pub fn set_account(&mut self, account: Option<AccountAddress>) {
        self.account = account;
    }

    pub fn is_connected(&self) -> bool {
        self.account.is_some()
    }
}

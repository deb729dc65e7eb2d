//! Wallet context collaborator

use std::fmt::Debug;

/// Ambient wallet information for the active account. Lookups ask the
/// market for prices converted into this currency, so amounts match what
/// the account would actually pay.
pub trait WalletContext: Send + Sync + Debug {
    /// Steam currency id used for converted prices (1 = USD)
    fn currency_id(&self) -> u32;
}

/// Wallet with a fixed currency
#[derive(Debug, Clone)]
pub struct StaticWallet {
    currency_id: u32,
}

impl StaticWallet {
    /// Steam currency id for US dollars
    pub const USD: u32 = 1;

    pub fn new(currency_id: u32) -> Self {
        Self { currency_id }
    }

    pub fn usd() -> Self {
        Self::new(Self::USD)
    }
}

impl Default for StaticWallet {
    fn default() -> Self {
        Self::usd()
    }
}

impl WalletContext for StaticWallet {
    fn currency_id(&self) -> u32 {
        self.currency_id
    }
}

use ethers::types::Address;

/// Where a faucet token lives on chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenAddress {
    Native,
    Contract(Address),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRegistryEntry {
    pub symbol: String,
    pub address: TokenAddress,
}

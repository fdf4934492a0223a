use std::collections::HashMap;
use std::str::FromStr;

use ethers::types::Address;

use crate::{
    errors::FaucetError,
    models::token::{TokenAddress, TokenRegistryEntry},
};

/// Contract tokens the faucet hands out besides the native coin.
pub const DEFAULT_TOKENS: &[(&str, &str)] = &[
    ("NOBLE", "0xFA4844cc662F4b509BDb752E249F9c729971FA29"),
    ("CTT", "0xb06E20B0F3aA014F3Bf50cb3FA1e5C15113A30F0"),
    ("DGT", "0x3974a70DB923C995c1F4E0841604856F28B1BeA7"),
    ("DKT", "0xFDB28f6C5d8daB66b7fda0D66c09aF24425017Af"),
    ("FTT", "0x760A8A3b52a28eE55db35cd69F616970863ec2d5"),
    ("SHT", "0xAa42C73a0ef2ab7115369C0cCa5664Cf77F4b365"),
    ("wGANG", "0x35A04074b062ECfA9DB4070A8f1d5aF35Dcf0699"),
    ("xNOBLE", "0x128BD023f6F99cB0fD3a061e7541076d4f634b14"),
];

/// Read-only symbol table. Built once at start-up and shared by reference.
#[derive(Debug, Clone)]
pub struct TokenRegistry {
    native_symbol: String,
    tokens: HashMap<String, Address>,
}

impl TokenRegistry {
    pub fn new(native_symbol: impl Into<String>, tokens: HashMap<String, Address>) -> Self {
        Self {
            native_symbol: native_symbol.into(),
            tokens,
        }
    }

    /// Parses `(symbol, address)` pairs, rejecting malformed contract addresses.
    pub fn from_pairs<S: AsRef<str>>(
        native_symbol: impl Into<String>,
        pairs: &[(S, S)],
    ) -> Result<Self, FaucetError> {
        let mut tokens = HashMap::with_capacity(pairs.len());
        for (symbol, address) in pairs {
            let contract = Address::from_str(address.as_ref()).map_err(|_| {
                FaucetError::ConfigError(format!(
                    "Invalid contract address for {}: {}",
                    symbol.as_ref(),
                    address.as_ref()
                ))
            })?;
            tokens.insert(symbol.as_ref().to_string(), contract);
        }

        Ok(Self::new(native_symbol, tokens))
    }

    pub fn with_default_tokens(native_symbol: impl Into<String>) -> Result<Self, FaucetError> {
        Self::from_pairs(native_symbol, DEFAULT_TOKENS)
    }

    pub fn resolve(&self, symbol: &str) -> Result<TokenAddress, FaucetError> {
        if symbol == self.native_symbol {
            return Ok(TokenAddress::Native);
        }

        self.tokens
            .get(symbol)
            .map(|contract| TokenAddress::Contract(*contract))
            .ok_or_else(|| FaucetError::UnknownToken(symbol.to_string()))
    }

    /// Every known symbol, native first, then contracts sorted by symbol.
    pub fn entries(&self) -> Vec<TokenRegistryEntry> {
        let mut contracts: Vec<_> = self
            .tokens
            .iter()
            .map(|(symbol, contract)| TokenRegistryEntry {
                symbol: symbol.clone(),
                address: TokenAddress::Contract(*contract),
            })
            .collect();
        contracts.sort_by(|a, b| a.symbol.cmp(&b.symbol));

        let mut entries = vec![TokenRegistryEntry {
            symbol: self.native_symbol.clone(),
            address: TokenAddress::Native,
        }];
        entries.extend(contracts);
        entries
    }
}

use std::sync::Arc;

use ethers::{
    abi::{parse_abi, Abi},
    contract::BaseContract,
    types::{Address, Bytes, U256},
    utils::{parse_units, to_checksum},
};
use log::debug;

use crate::{
    errors::FaucetError,
    models::{
        token::TokenAddress,
        transaction::{TransactionIntent, TransferKind},
    },
};

use super::{blockchain_service::ChainClient, token_registry::TokenRegistry};

// ERC20 ABI, transfer only
const ERC20_TRANSFER_ABI: &[&str] =
    &["function transfer(address _to, uint256 _value) returns (bool)"];

/// One milli-unit expressed in the chain's base unit.
const MILLI_UNIT_EXPONENT: usize = 15;

/// Checks the receiver the way wallets do: optional `0x` in either case, 40 hex
/// digits, and a valid EIP-55 checksum when the input mixes upper and lower case.
pub fn parse_receiver(receiver: &str) -> Result<Address, FaucetError> {
    let invalid = || FaucetError::InvalidAddress(receiver.to_string());

    let hex = receiver
        .strip_prefix("0x")
        .or_else(|| receiver.strip_prefix("0X"))
        .unwrap_or(receiver);
    if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let address: Address = hex.parse().map_err(|_| invalid())?;

    let has_lower = hex.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = hex.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper && to_checksum(&address, None)[2..] != *hex {
        return Err(invalid());
    }

    Ok(address)
}

/// Converts a whole number of milli-units into base units.
pub fn milli_units_to_base(milli_units: u64) -> U256 {
    U256::from(milli_units) * U256::exp10(MILLI_UNIT_EXPONENT)
}

/// Converts a decimal gwei string into base units.
pub fn gwei_to_base(gwei: &str) -> Result<U256, FaucetError> {
    parse_units(gwei, "gwei")
        .map(Into::into)
        .map_err(|e| FaucetError::ConfigError(format!("Invalid gas price {}: {}", gwei, e)))
}

#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    registry: Arc<TokenRegistry>,
    erc20: BaseContract,
    amount: U256,
    gas_price: U256,
    gas_limit: U256,
}

impl TransactionBuilder {
    pub fn new(
        registry: Arc<TokenRegistry>,
        amount: U256,
        gas_price: U256,
        gas_limit: U256,
    ) -> Result<Self, FaucetError> {
        let abi: Abi = parse_abi(ERC20_TRANSFER_ABI)
            .map_err(|e| FaucetError::ConfigError(format!("Invalid ERC20 ABI: {}", e)))?;

        Ok(Self {
            registry,
            erc20: BaseContract::from(abi),
            amount,
            gas_price,
            gas_limit,
        })
    }

    pub fn amount(&self) -> U256 {
        self.amount
    }

    /// Validates the request and builds the intent for `sender`.
    ///
    /// Address and token checks run before the chain is queried, so a
    /// malformed request never costs a round trip.
    pub async fn build(
        &self,
        chain: &dyn ChainClient,
        receiver: &str,
        token: &str,
        sender: Address,
    ) -> Result<TransactionIntent, FaucetError> {
        let receiver = parse_receiver(receiver)?;
        let token_address = self.registry.resolve(token)?;

        let nonce = chain.get_transaction_count(sender).await?;
        debug!("Building {} transfer with nonce {}", token, nonce);

        let intent = match token_address {
            TokenAddress::Native => TransactionIntent {
                from: sender,
                to: receiver,
                value: self.amount,
                data: Bytes::from(vec![0u8]),
                nonce,
                gas_price: self.gas_price,
                gas_limit: self.gas_limit,
                kind: TransferKind::Native,
            },
            TokenAddress::Contract(contract) => TransactionIntent {
                from: sender,
                to: contract,
                value: U256::zero(),
                data: self.encode_transfer(receiver)?,
                nonce,
                gas_price: self.gas_price,
                gas_limit: self.gas_limit,
                kind: TransferKind::Token {
                    symbol: token.to_string(),
                    contract,
                },
            },
        };

        Ok(intent)
    }

    fn encode_transfer(&self, receiver: Address) -> Result<Bytes, FaucetError> {
        self.erc20
            .encode("transfer", (receiver, self.amount))
            .map_err(|e| FaucetError::SigningError(format!("Failed to encode transfer: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockChainClient;
    use std::str::FromStr;

    const RECEIVER: &str = "0x52908400098527886E0F7030069857D2E4169EE7";

    fn builder() -> TransactionBuilder {
        let registry = Arc::new(TokenRegistry::with_default_tokens("GANG").unwrap());
        TransactionBuilder::new(
            registry,
            milli_units_to_base(1000),
            gwei_to_base("1").unwrap(),
            U256::from(100_000u64),
        )
        .unwrap()
    }

    #[test]
    fn accepts_well_formed_addresses() {
        assert!(parse_receiver(RECEIVER).is_ok());
        assert!(parse_receiver(&RECEIVER.to_lowercase()).is_ok());
        assert!(parse_receiver("52908400098527886e0f7030069857d2e4169ee7").is_ok());
        assert!(parse_receiver("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed").is_ok());
    }

    #[test]
    fn upper_case_prefix_is_accepted() {
        let expected = parse_receiver(RECEIVER).unwrap();
        let upper = format!("0X{}", &RECEIVER[2..].to_lowercase());
        assert_eq!(parse_receiver(&upper).unwrap(), expected);
        assert!(parse_receiver("0X5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed").is_ok());
        assert!(parse_receiver("0X").is_err());
    }

    #[test]
    fn rejects_malformed_addresses() {
        for receiver in [
            "",
            "0x",
            "0xabc",
            "0x52908400098527886E0F7030069857D2E4169EE",
            "0x52908400098527886E0F7030069857D2E4169EE77",
            "0xZ2908400098527886E0F7030069857D2E4169EE7",
            // bad checksum
            "0x5aaeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
        ] {
            assert!(
                matches!(parse_receiver(receiver), Err(FaucetError::InvalidAddress(_))),
                "{receiver} should be rejected"
            );
        }
    }

    #[test]
    fn converts_units() {
        assert_eq!(milli_units_to_base(1000), U256::exp10(18));
        assert_eq!(milli_units_to_base(1), U256::exp10(15));
        assert_eq!(gwei_to_base("1").unwrap(), U256::exp10(9));
        assert_eq!(gwei_to_base("0.5").unwrap(), U256::from(500_000_000u64));
        assert!(gwei_to_base("one").is_err());
    }

    #[actix_web::test]
    async fn native_intent_transfers_value() {
        let chain = MockChainClient::new().with_nonce(9);
        let sender = Address::repeat_byte(0x11);

        let intent = builder().build(&chain, RECEIVER, "GANG", sender).await.unwrap();

        assert_eq!(intent.to, Address::from_str(RECEIVER).unwrap());
        assert_eq!(intent.from, sender);
        assert_eq!(intent.value, U256::exp10(18));
        assert_eq!(intent.data, Bytes::from(vec![0u8]));
        assert_eq!(intent.nonce, U256::from(9u64));
        assert_eq!(intent.gas_price, U256::exp10(9));
        assert_eq!(intent.gas_limit, U256::from(100_000u64));
        assert_eq!(intent.kind, TransferKind::Native);
    }

    #[actix_web::test]
    async fn token_intent_encodes_transfer_call() {
        let chain = MockChainClient::new();
        let sender = Address::repeat_byte(0x11);
        let contract = Address::from_str("0xb06E20B0F3aA014F3Bf50cb3FA1e5C15113A30F0").unwrap();

        let intent = builder().build(&chain, RECEIVER, "CTT", sender).await.unwrap();

        assert_eq!(intent.to, contract);
        assert_eq!(intent.from, sender);
        assert!(intent.value.is_zero());
        assert_eq!(&intent.data[..4], &[0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(intent.data.len(), 4 + 32 + 32);
        assert_eq!(&intent.data[16..36], Address::from_str(RECEIVER).unwrap().as_bytes());
        assert_eq!(U256::from_big_endian(&intent.data[36..68]), U256::exp10(18));
        assert!(matches!(intent.kind, TransferKind::Token { ref symbol, .. } if symbol == "CTT"));
    }

    #[actix_web::test]
    async fn invalid_address_never_reaches_the_chain() {
        let chain = MockChainClient::new();
        let result = builder()
            .build(&chain, "0xnot-an-address", "GANG", Address::zero())
            .await;

        assert!(matches!(result, Err(FaucetError::InvalidAddress(_))));
        assert_eq!(chain.nonce_queries(), 0);
    }

    #[actix_web::test]
    async fn unknown_token_never_reaches_the_chain() {
        let chain = MockChainClient::new();
        let result = builder().build(&chain, RECEIVER, "DOGE", Address::zero()).await;

        assert!(matches!(result, Err(FaucetError::UnknownToken(ref symbol)) if symbol == "DOGE"));
        assert_eq!(chain.nonce_queries(), 0);
    }
}

use std::{str::FromStr, time::Duration};

use async_trait::async_trait;
use ethers::{
    middleware::SignerMiddleware,
    providers::{Http, JsonRpcClient, Middleware, PendingTransaction, Provider},
    signers::{LocalWallet, Signer},
    types::{Address, BlockNumber, Bytes, TransactionReceipt, TxHash, U256},
};
use log::{debug, info};

use crate::{errors::FaucetError, models::transaction::TransactionIntent};

/// The slice of a JSON-RPC node the faucet talks to.
///
/// Submission is split in two stages: the `send_*` calls resolve as soon as
/// the node assigns a hash, and [`ChainClient::wait_for_receipt`] resolves once
/// the transaction is mined (or dropped).
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Transaction count including transactions still in the pool.
    async fn get_transaction_count(&self, address: Address) -> Result<U256, FaucetError>;

    async fn get_balance(&self, address: Address) -> Result<U256, FaucetError>;

    /// Hands the intent to the client, which signs with the wallet it holds.
    async fn send_transaction(&self, intent: &TransactionIntent) -> Result<TxHash, FaucetError>;

    /// Signs the intent with the sender key and returns the raw RLP bytes.
    async fn sign_transaction(&self, intent: &TransactionIntent) -> Result<Bytes, FaucetError>;

    async fn send_raw_transaction(&self, raw: Bytes) -> Result<TxHash, FaucetError>;

    async fn wait_for_receipt(
        &self,
        tx_hash: TxHash,
    ) -> Result<Option<TransactionReceipt>, FaucetError>;
}

pub fn parse_wallet(private_key: &str) -> Result<LocalWallet, FaucetError> {
    LocalWallet::from_str(private_key.trim())
        .map_err(|e| FaucetError::ConfigError(format!("Invalid private key: {}", e)))
}

/// `ethers` backed client holding the faucet wallet.
#[derive(Debug)]
pub struct BlockchainClient<P: JsonRpcClient = Http> {
    client: SignerMiddleware<Provider<P>, LocalWallet>,
    chain_id: u64,
    poll_interval: Duration,
}

impl BlockchainClient<Http> {
    /// Connect to an HTTP endpoint
    pub async fn connect(
        rpc_url: &str,
        wallet: LocalWallet,
        expected_chain_id: Option<u64>,
        poll_interval: Duration,
    ) -> Result<Self, FaucetError> {
        let provider = Provider::<Http>::try_from(rpc_url)
            .map_err(|e| FaucetError::ConfigError(format!("Invalid RPC URL {}: {}", rpc_url, e)))?;

        Self::with_provider(provider, wallet, expected_chain_id, poll_interval).await
    }
}

impl<P: JsonRpcClient + 'static> BlockchainClient<P> {
    pub async fn with_provider(
        provider: Provider<P>,
        wallet: LocalWallet,
        expected_chain_id: Option<u64>,
        poll_interval: Duration,
    ) -> Result<Self, FaucetError> {
        // Verify connection and chain ID
        let chain_id = provider
            .get_chainid()
            .await
            .map_err(|e| FaucetError::UpstreamQueryError(e.to_string()))?
            .as_u64();

        if let Some(expected) = expected_chain_id {
            if expected != chain_id {
                return Err(FaucetError::ConfigError(format!(
                    "Connected chain ID {} doesn't match configured chain ID {}",
                    chain_id, expected
                )));
            }
        }

        info!("Connected to chain {}", chain_id);

        Ok(Self {
            client: SignerMiddleware::new(provider, wallet.with_chain_id(chain_id)),
            chain_id,
            poll_interval,
        })
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn address(&self) -> Address {
        self.client.address()
    }
}

#[async_trait]
impl<P: JsonRpcClient + 'static> ChainClient for BlockchainClient<P> {
    async fn get_transaction_count(&self, address: Address) -> Result<U256, FaucetError> {
        self.client
            .inner()
            .get_transaction_count(address, Some(BlockNumber::Pending.into()))
            .await
            .map_err(FaucetError::ProviderError)
    }

    async fn get_balance(&self, address: Address) -> Result<U256, FaucetError> {
        self.client
            .inner()
            .get_balance(address, None)
            .await
            .map_err(|e| FaucetError::UpstreamQueryError(e.to_string()))
    }

    async fn send_transaction(&self, intent: &TransactionIntent) -> Result<TxHash, FaucetError> {
        let tx = intent.to_typed_transaction(self.chain_id);
        let pending = self
            .client
            .send_transaction(tx, None)
            .await
            .map_err(|e| FaucetError::SubmissionError(e.to_string()))?;

        Ok(*pending)
    }

    async fn sign_transaction(&self, intent: &TransactionIntent) -> Result<Bytes, FaucetError> {
        let tx = intent.to_typed_transaction(self.chain_id);
        let signature = self
            .client
            .signer()
            .sign_transaction(&tx)
            .await
            .map_err(|e| FaucetError::SigningError(e.to_string()))?;

        Ok(tx.rlp_signed(&signature))
    }

    async fn send_raw_transaction(&self, raw: Bytes) -> Result<TxHash, FaucetError> {
        let pending = self
            .client
            .inner()
            .send_raw_transaction(raw)
            .await
            .map_err(|e| FaucetError::SubmissionError(e.to_string()))?;

        Ok(*pending)
    }

    async fn wait_for_receipt(
        &self,
        tx_hash: TxHash,
    ) -> Result<Option<TransactionReceipt>, FaucetError> {
        debug!("Waiting for receipt of {:#x}", tx_hash);
        PendingTransaction::new(tx_hash, self.client.inner())
            .interval(self.poll_interval)
            .await
            .map_err(|e| FaucetError::SubmissionError(e.to_string()))
    }
}

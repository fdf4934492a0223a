use std::sync::Arc;

use ethers::types::{TxHash, U64};
use log::{debug, info, warn};

use crate::{
    errors::FaucetError,
    models::transaction::{SubmissionMode, TransactionIntent, TransactionOutcome},
};

use super::blockchain_service::ChainClient;

/// Pushes intents to the node and follows them until a receipt shows up.
#[derive(Clone)]
pub struct TransactionSubmitter {
    chain: Arc<dyn ChainClient>,
    token_mode: SubmissionMode,
}

impl TransactionSubmitter {
    pub fn new(chain: Arc<dyn ChainClient>, token_mode: SubmissionMode) -> Self {
        Self { chain, token_mode }
    }

    /// Native transfers are always signed by the client; token transfers use
    /// the configured mode.
    pub fn mode_for(&self, intent: &TransactionIntent) -> SubmissionMode {
        if intent.is_native() {
            SubmissionMode::ClientSigned
        } else {
            self.token_mode
        }
    }

    /// Sends the intent and returns the hash the node assigned to it.
    pub async fn broadcast(
        &self,
        intent: &TransactionIntent,
        mode: SubmissionMode,
    ) -> Result<TxHash, FaucetError> {
        let tx_hash = match mode {
            SubmissionMode::ClientSigned => self.chain.send_transaction(intent).await?,
            SubmissionMode::RawSigned => {
                let raw = self.chain.sign_transaction(intent).await?;
                self.chain.send_raw_transaction(raw).await?
            }
        };

        info!(
            "Transaction {:#x} sent to {:?} with nonce {} ({:?})",
            tx_hash, intent.to, intent.nonce, mode
        );
        Ok(tx_hash)
    }

    /// Waits for the receipt of a broadcast transaction.
    pub async fn confirm(&self, tx_hash: TxHash) -> Result<TransactionOutcome, FaucetError> {
        let receipt = self.chain.wait_for_receipt(tx_hash).await?.ok_or_else(|| {
            FaucetError::SubmissionError(format!("Transaction {:#x} dropped from mempool", tx_hash))
        })?;
        debug!("Receipt: {:?}", receipt);

        if receipt.status == Some(U64::one()) {
            info!("Transaction {:#x} mined in block {:?}", tx_hash, receipt.block_number);
            Ok(TransactionOutcome {
                tx_hash,
                mined_status: true,
            })
        } else {
            warn!("Transaction {:#x} mined with status {:?}", tx_hash, receipt.status);
            Err(FaucetError::MinedWithFailureStatus { tx_hash })
        }
    }

    pub async fn submit(
        &self,
        intent: &TransactionIntent,
        mode: SubmissionMode,
    ) -> Result<TransactionOutcome, FaucetError> {
        let tx_hash = self.broadcast(intent, mode).await?;
        self.confirm(tx_hash).await
    }
}

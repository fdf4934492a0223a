use std::sync::Arc;

use ethers::{
    types::{Address, U256},
    utils::to_checksum,
};
use log::{debug, info};
use tokio::sync::Mutex;

use crate::{
    errors::FaucetError,
    models::{
        api_response::HealthResponse, transaction::TransactionOutcome, transfer::TransferRequest,
    },
};

use super::{
    blockchain_service::ChainClient, captcha_service::CaptchaVerifier,
    submission_service::TransactionSubmitter, transaction_builder::TransactionBuilder,
};

/// Rounds a base-unit balance to the nearest whole coin.
pub fn round_to_whole_units(balance: U256) -> u64 {
    let one = U256::exp10(18);
    let rounded = balance.saturating_add(one / 2) / one;
    if rounded > U256::from(u64::MAX) {
        u64::MAX
    } else {
        rounded.as_u64()
    }
}

/// Verification, building and submission for the faucet's single sender.
pub struct FaucetService {
    chain: Arc<dyn ChainClient>,
    captcha: Arc<dyn CaptchaVerifier>,
    builder: TransactionBuilder,
    submitter: TransactionSubmitter,
    sender: Address,
    // Held from nonce lookup until the node has accepted the transaction.
    sender_lock: Mutex<()>,
}

impl FaucetService {
    pub fn new(
        chain: Arc<dyn ChainClient>,
        captcha: Arc<dyn CaptchaVerifier>,
        builder: TransactionBuilder,
        submitter: TransactionSubmitter,
        sender: Address,
    ) -> Self {
        Self {
            chain,
            captcha,
            builder,
            submitter,
            sender,
            sender_lock: Mutex::new(()),
        }
    }

    pub async fn dispense(
        &self,
        request: &TransferRequest,
    ) -> Result<TransactionOutcome, FaucetError> {
        let proof = request.verification_proof.as_deref().unwrap_or_default();
        if proof.is_empty() {
            return Err(FaucetError::MissingProof);
        }

        let verification = self.captcha.verify(proof).await?;
        if !verification.success {
            return Err(FaucetError::InvalidCaptcha);
        }

        let receiver = request.receiver.as_deref().unwrap_or_default();
        let token = request.token.as_deref().unwrap_or_default();

        let tx_hash = {
            let _guard = self.sender_lock.lock().await;
            let intent = self
                .builder
                .build(self.chain.as_ref(), receiver, token, self.sender)
                .await?;
            debug!("Intent: {:?}", intent);

            let mode = self.submitter.mode_for(&intent);
            self.submitter.broadcast(&intent, mode).await?
        };

        let outcome = self.submitter.confirm(tx_hash).await?;
        info!(
            "Sent {} {} to {} in {:#x}",
            self.builder.amount(),
            token,
            receiver,
            outcome.tx_hash
        );
        Ok(outcome)
    }

    pub async fn health(&self) -> Result<HealthResponse, FaucetError> {
        let balance = self.chain.get_balance(self.sender).await.map_err(|e| match e {
            FaucetError::UpstreamQueryError(_) => e,
            other => FaucetError::UpstreamQueryError(other.to_string()),
        })?;

        Ok(HealthResponse {
            address: to_checksum(&self.sender, None),
            balance_in_wei: balance.to_string(),
            balance_in_eth: round_to_whole_units(balance),
        })
    }
}

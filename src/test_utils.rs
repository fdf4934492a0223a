//! In-memory doubles for the chain and the verification service.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Mutex,
};

use async_trait::async_trait;
use ethers::types::{Address, Bytes, TransactionReceipt, TxHash, H256, U256, U64};

use crate::{
    errors::FaucetError,
    models::{captcha::CaptchaVerification, transaction::TransactionIntent},
    services::{blockchain_service::ChainClient, captcha_service::CaptchaVerifier},
};

/// Node double. Broadcasting bumps the pending nonce, like a real pool does.
pub struct MockChainClient {
    nonce: Mutex<U256>,
    balance: Option<U256>,
    receipt_status: Option<u64>,
    fail_send: bool,
    nonce_queries: AtomicUsize,
    signed: AtomicUsize,
    sent: Mutex<Vec<TransactionIntent>>,
}

impl MockChainClient {
    pub fn new() -> Self {
        Self {
            nonce: Mutex::new(U256::zero()),
            balance: None,
            receipt_status: Some(1),
            fail_send: false,
            nonce_queries: AtomicUsize::new(0),
            signed: AtomicUsize::new(0),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn with_nonce(self, nonce: u64) -> Self {
        *self.nonce.lock().unwrap() = U256::from(nonce);
        self
    }

    pub fn with_balance(mut self, balance: U256) -> Self {
        self.balance = Some(balance);
        self
    }

    /// `None` simulates a transaction dropped before it was mined.
    pub fn with_receipt_status(mut self, status: Option<u64>) -> Self {
        self.receipt_status = status;
        self
    }

    pub fn failing_send(mut self) -> Self {
        self.fail_send = true;
        self
    }

    pub fn nonce_queries(&self) -> usize {
        self.nonce_queries.load(Ordering::SeqCst)
    }

    pub fn signed_count(&self) -> usize {
        self.signed.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<TransactionIntent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn hash_for(nonce: U256) -> TxHash {
        H256::from_low_u64_be(nonce.as_u64() + 0xfa0ce7)
    }

    fn record(&self, intent: TransactionIntent) -> Result<TxHash, FaucetError> {
        if self.fail_send {
            return Err(FaucetError::SubmissionError(
                "insufficient funds for gas * price + value".to_string(),
            ));
        }

        let tx_hash = Self::hash_for(intent.nonce);
        *self.nonce.lock().unwrap() += U256::one();
        self.sent.lock().unwrap().push(intent);
        Ok(tx_hash)
    }
}

#[async_trait]
impl ChainClient for MockChainClient {
    async fn get_transaction_count(&self, _address: Address) -> Result<U256, FaucetError> {
        self.nonce_queries.fetch_add(1, Ordering::SeqCst);
        // Give concurrent callers a chance to interleave.
        tokio::task::yield_now().await;
        Ok(*self.nonce.lock().unwrap())
    }

    async fn get_balance(&self, _address: Address) -> Result<U256, FaucetError> {
        self.balance
            .ok_or_else(|| FaucetError::UpstreamQueryError("connection refused".to_string()))
    }

    async fn send_transaction(&self, intent: &TransactionIntent) -> Result<TxHash, FaucetError> {
        self.record(intent.clone())
    }

    async fn sign_transaction(&self, intent: &TransactionIntent) -> Result<Bytes, FaucetError> {
        self.signed.fetch_add(1, Ordering::SeqCst);
        serde_json::to_vec(intent)
            .map(Bytes::from)
            .map_err(|e| FaucetError::SigningError(e.to_string()))
    }

    async fn send_raw_transaction(&self, raw: Bytes) -> Result<TxHash, FaucetError> {
        let intent: TransactionIntent = serde_json::from_slice(raw.as_ref())
            .map_err(|e| FaucetError::SubmissionError(e.to_string()))?;
        self.record(intent)
    }

    async fn wait_for_receipt(
        &self,
        tx_hash: TxHash,
    ) -> Result<Option<TransactionReceipt>, FaucetError> {
        Ok(self.receipt_status.map(|status| TransactionReceipt {
            transaction_hash: tx_hash,
            status: Some(U64::from(status)),
            ..Default::default()
        }))
    }
}

enum Verdict {
    Pass,
    Reject,
    Unreachable,
}

pub struct MockCaptcha {
    verdict: Verdict,
    calls: AtomicUsize,
}

impl MockCaptcha {
    pub fn passing() -> Self {
        Self::with(Verdict::Pass)
    }

    pub fn rejecting() -> Self {
        Self::with(Verdict::Reject)
    }

    pub fn unreachable() -> Self {
        Self::with(Verdict::Unreachable)
    }

    fn with(verdict: Verdict) -> Self {
        Self {
            verdict,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CaptchaVerifier for MockCaptcha {
    async fn verify(&self, proof: &str) -> Result<CaptchaVerification, FaucetError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if proof.is_empty() {
            return Err(FaucetError::MissingProof);
        }

        match self.verdict {
            Verdict::Pass => Ok(CaptchaVerification {
                success: true,
                ..Default::default()
            }),
            Verdict::Reject => Ok(CaptchaVerification {
                success: false,
                error_codes: vec!["invalid-input-response".to_string()],
                ..Default::default()
            }),
            Verdict::Unreachable => Err(FaucetError::VerificationServiceError(
                "operation timed out".to_string(),
            )),
        }
    }
}

use ethers::types::{
    transaction::eip2718::TypedTransaction, Address, Bytes, TransactionRequest, TxHash, U256,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferKind {
    Native,
    Token { symbol: String, contract: Address },
}

/// A fully priced transaction, built for one request and submitted once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionIntent {
    pub from: Address,
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
    pub nonce: U256,
    pub gas_price: U256,
    pub gas_limit: U256,
    pub kind: TransferKind,
}

impl TransactionIntent {
    pub fn is_native(&self) -> bool {
        matches!(self.kind, TransferKind::Native)
    }

    /// Legacy (gas price) transaction carrying every field of the intent.
    pub fn to_typed_transaction(&self, chain_id: u64) -> TypedTransaction {
        TransactionRequest::new()
            .from(self.from)
            .to(self.to)
            .value(self.value)
            .data(self.data.clone())
            .nonce(self.nonce)
            .gas_price(self.gas_price)
            .gas(self.gas_limit)
            .chain_id(chain_id)
            .into()
    }
}

/// How an intent reaches the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmissionMode {
    /// The client signs with the wallet it holds.
    ClientSigned,
    /// Signed here with the sender key and sent as raw bytes.
    RawSigned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TransactionOutcome {
    pub tx_hash: TxHash,
    pub mined_status: bool,
}

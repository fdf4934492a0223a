use serde::{Deserialize, Serialize};

/// Body of `POST /`, sent either as JSON or as a serialized form.
#[derive(Serialize, Deserialize, Debug, Default, Clone)]
pub struct TransferRequest {
    pub receiver: Option<String>,
    pub token: Option<String>,
    #[serde(rename = "g-recaptcha-response")]
    pub verification_proof: Option<String>,
}

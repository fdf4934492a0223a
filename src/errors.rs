use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use ethers::{providers::ProviderError, types::TxHash};
use serde::Serialize;
use thiserror::Error;

use crate::models::api_response::ErrorResponse;

#[derive(Error, Debug)]
pub enum FaucetError {
    #[error("Invalid captcha")]
    MissingProof,

    #[error("Captcha verification failed: {0}")]
    VerificationServiceError(String),

    #[error("Invalid captcha")]
    InvalidCaptcha,

    #[error("Invalid address")]
    InvalidAddress(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unknown token: {0}")]
    UnknownToken(String),

    #[error("Transaction has been mined, but status is false")]
    MinedWithFailureStatus { tx_hash: TxHash },

    #[error("{0}")]
    SubmissionError(String),

    #[error("{0}")]
    UpstreamQueryError(String),

    #[error("Provider error: {0}")]
    ProviderError(#[from] ProviderError),

    #[error("Signing error: {0}")]
    SigningError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

#[derive(Debug, Serialize, PartialEq)]
pub struct ApiError {
    pub message: String,
    #[serde(rename = "txHash", skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
}

impl FaucetError {
    pub fn to_api_error(&self) -> ApiError {
        let tx_hash = match self {
            FaucetError::MinedWithFailureStatus { tx_hash } => Some(format!("{tx_hash:#x}")),
            _ => None,
        };

        ApiError {
            message: self.to_string(),
            tx_hash,
        }
    }
}

// The frontend reads the payload, not the status line, so every failure is a 200.
impl ResponseError for FaucetError {
    fn status_code(&self) -> StatusCode {
        StatusCode::OK
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_api_error(),
        })
    }
}

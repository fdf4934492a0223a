use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};

use crate::{errors::FaucetError, models::captcha::CaptchaVerification};

pub const DEFAULT_VERIFY_URL: &str = "https://www.google.com/recaptcha/api/siteverify";

/// Turns a client-supplied proof token into a verdict.
#[async_trait]
pub trait CaptchaVerifier: Send + Sync {
    async fn verify(&self, proof: &str) -> Result<CaptchaVerification, FaucetError>;
}

/// reCAPTCHA `siteverify` client. One request per call, never retried.
pub struct RecaptchaClient {
    client: reqwest::Client,
    secret: String,
    verify_url: String,
}

impl RecaptchaClient {
    pub fn new(
        secret: impl Into<String>,
        verify_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, FaucetError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FaucetError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            secret: secret.into(),
            verify_url: verify_url.into(),
        })
    }
}

#[async_trait]
impl CaptchaVerifier for RecaptchaClient {
    async fn verify(&self, proof: &str) -> Result<CaptchaVerification, FaucetError> {
        if proof.is_empty() {
            return Err(FaucetError::MissingProof);
        }

        let response = self
            .client
            .post(&self.verify_url)
            .form(&[("secret", self.secret.as_str()), ("response", proof)])
            .send()
            .await
            .map_err(|e| FaucetError::VerificationServiceError(e.to_string()))?
            .error_for_status()
            .map_err(|e| FaucetError::VerificationServiceError(e.to_string()))?;

        let verification: CaptchaVerification = response
            .json()
            .await
            .map_err(|e| FaucetError::VerificationServiceError(format!("Invalid response: {}", e)))?;

        if verification.success {
            debug!("Captcha verified for host {:?}", verification.hostname);
        } else {
            warn!("Captcha rejected: {:?}", verification.error_codes);
        }

        Ok(verification)
    }
}

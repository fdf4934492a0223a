use std::{str::FromStr, time::Duration};

use ethers::types::Address;

use crate::{
    errors::FaucetError,
    models::transaction::SubmissionMode,
    services::{captcha_service::DEFAULT_VERIFY_URL, token_registry::DEFAULT_TOKENS},
};

/// Sender account and node for the active environment.
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub name: String,
    pub rpc_url: String,
    pub account: Option<String>,
    pub private_key: String,
    pub chain_id: Option<u64>,
}

impl EnvironmentConfig {
    /// The faucet account, which must be the one the private key controls.
    pub fn sender_address(&self, key_address: Address) -> Result<Address, FaucetError> {
        let Some(account) = &self.account else {
            return Ok(key_address);
        };

        let configured = Address::from_str(account).map_err(|_| {
            FaucetError::ConfigError(format!("{}_ACCOUNT is not an address: {}", self.name, account))
        })?;
        if configured != key_address {
            return Err(FaucetError::ConfigError(format!(
                "{}_ACCOUNT {:?} does not match the private key's address {:?}",
                self.name, configured, key_address
            )));
        }

        Ok(configured)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub environment: EnvironmentConfig,
    pub gas_limit: u64,
    pub gas_price_gwei: String,
    pub milli_ether_to_transfer: u64,
    pub native_token_symbol: String,
    pub tokens: Vec<(String, String)>,
    pub token_submission_mode: SubmissionMode,
    pub recaptcha_secret: String,
    pub recaptcha_verify_url: String,
    pub recaptcha_timeout: Duration,
    pub receipt_poll_interval: Duration,
    pub allowed_origins: Vec<String>,
    pub debug: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, FaucetError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, FaucetError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let required = |key: &str| {
            var(key).ok_or_else(|| FaucetError::ConfigError(format!("{} is not set", key)))
        };

        let environment = var("FAUCET_ENVIRONMENT")
            .unwrap_or_else(|| "TESTNET".to_string())
            .to_uppercase();
        let env_key = |suffix: &str| format!("{}_{}", environment, suffix);

        let environment = EnvironmentConfig {
            rpc_url: required(&env_key("RPC_URL"))?,
            account: var(&env_key("ACCOUNT")),
            private_key: required(&env_key("PRIVATE_KEY"))?,
            chain_id: var(&env_key("CHAIN_ID"))
                .map(|value| parse_number(&env_key("CHAIN_ID"), &value))
                .transpose()?,
            name: environment,
        };

        let tokens = match var("TOKEN_ADDRESSES") {
            Some(value) => parse_token_table(&value)?,
            None => DEFAULT_TOKENS
                .iter()
                .map(|(symbol, address)| (symbol.to_string(), address.to_string()))
                .collect(),
        };

        let token_submission_mode = match var("TOKEN_SUBMISSION_MODE").as_deref() {
            None | Some("raw") => SubmissionMode::RawSigned,
            Some("client") => SubmissionMode::ClientSigned,
            Some(other) => {
                return Err(FaucetError::ConfigError(format!(
                    "TOKEN_SUBMISSION_MODE must be `raw` or `client`, got `{}`",
                    other
                )))
            }
        };

        let allowed_origins = var("ALLOWED_ORIGINS")
            .map(|value| {
                value
                    .split(',')
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            host: var("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: var("PORT")
                .map(|value| parse_number("PORT", &value))
                .transpose()?
                .unwrap_or(8080),
            environment,
            gas_limit: var("GAS_LIMIT")
                .map(|value| parse_number("GAS_LIMIT", &value))
                .transpose()?
                .unwrap_or(100_000),
            gas_price_gwei: var("GAS_PRICE_GWEI").unwrap_or_else(|| "1".to_string()),
            milli_ether_to_transfer: var("MILLI_ETHER_TO_TRANSFER")
                .map(|value| parse_number("MILLI_ETHER_TO_TRANSFER", &value))
                .transpose()?
                .unwrap_or(1000),
            native_token_symbol: var("NATIVE_TOKEN_SYMBOL").unwrap_or_else(|| "GANG".to_string()),
            tokens,
            token_submission_mode,
            recaptcha_secret: required("RECAPTCHA_SECRET")?,
            recaptcha_verify_url: var("RECAPTCHA_VERIFY_URL")
                .unwrap_or_else(|| DEFAULT_VERIFY_URL.to_string()),
            recaptcha_timeout: Duration::from_secs(
                var("RECAPTCHA_TIMEOUT_SECS")
                    .map(|value| parse_number("RECAPTCHA_TIMEOUT_SECS", &value))
                    .transpose()?
                    .unwrap_or(10),
            ),
            receipt_poll_interval: Duration::from_millis(
                var("RECEIPT_POLL_INTERVAL_MS")
                    .map(|value| parse_number("RECEIPT_POLL_INTERVAL_MS", &value))
                    .transpose()?
                    .unwrap_or(2000),
            ),
            allowed_origins,
            debug: var("DEBUG")
                .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
        })
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, FaucetError> {
    value
        .trim()
        .parse()
        .map_err(|_| FaucetError::ConfigError(format!("Failed to parse {}: `{}`", key, value)))
}

/// Parses `SYM=0xaddr,SYM=0xaddr`.
fn parse_token_table(value: &str) -> Result<Vec<(String, String)>, FaucetError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            entry
                .split_once('=')
                .map(|(symbol, address)| (symbol.trim().to_string(), address.trim().to_string()))
                .filter(|(symbol, address)| !symbol.is_empty() && !address.is_empty())
                .ok_or_else(|| {
                    FaucetError::ConfigError(format!("Malformed TOKEN_ADDRESSES entry `{}`", entry))
                })
        })
        .collect()
}

pub mod blockchain_service;
pub mod captcha_service;
pub mod faucet_service;
pub mod submission_service;
pub mod token_registry;
pub mod transaction_builder;

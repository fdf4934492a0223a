use std::{io, sync::Arc};

use actix_cors::Cors;
use actix_web::{http::header, middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use ethers::types::U256;
use log::info;

mod api;
mod config;
mod errors;
mod models;
mod services;
#[cfg(test)]
mod test_utils;

use errors::FaucetError;
use services::{
    blockchain_service::{parse_wallet, BlockchainClient},
    captcha_service::RecaptchaClient,
    faucet_service::FaucetService,
    submission_service::TransactionSubmitter,
    token_registry::TokenRegistry,
    transaction_builder::{gwei_to_base, milli_units_to_base, TransactionBuilder},
};

fn to_io_error(e: FaucetError) -> io::Error {
    io::Error::other(e.to_string())
}

async fn build_faucet(config: &config::Config) -> Result<FaucetService, FaucetError> {
    let wallet = parse_wallet(&config.environment.private_key)?;
    let chain = Arc::new(
        BlockchainClient::connect(
            &config.environment.rpc_url,
            wallet,
            config.environment.chain_id,
            config.receipt_poll_interval,
        )
        .await?,
    );
    let sender = config.environment.sender_address(chain.address())?;

    let registry = Arc::new(TokenRegistry::from_pairs(
        config.native_token_symbol.clone(),
        &config.tokens,
    )?);
    for entry in registry.entries() {
        info!("Token {}: {:?}", entry.symbol, entry.address);
    }

    let builder = TransactionBuilder::new(
        registry,
        milli_units_to_base(config.milli_ether_to_transfer),
        gwei_to_base(&config.gas_price_gwei)?,
        U256::from(config.gas_limit),
    )?;
    let captcha = Arc::new(RecaptchaClient::new(
        config.recaptcha_secret.clone(),
        config.recaptcha_verify_url.clone(),
        config.recaptcha_timeout,
    )?);
    let submitter = TransactionSubmitter::new(chain.clone(), config.token_submission_mode);

    info!(
        "Faucet account {:?} on {} (chain {})",
        sender,
        config.environment.name,
        chain.chain_id()
    );

    Ok(FaucetService::new(chain, captcha, builder, submitter, sender))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();

    let config = config::Config::from_env().map_err(to_io_error)?;

    let default_level = if config.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let faucet = web::Data::new(build_faucet(&config).await.map_err(to_io_error)?);
    let allowed_origins = config.allowed_origins.clone();

    info!("Listening on {}:{}", config.host, config.port);

    HttpServer::new(move || {
        let cors = allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin));
        let cors = if allowed_origins.is_empty() {
            cors.allow_any_origin()
        } else {
            cors
        }
        .allowed_methods(vec!["GET", "POST"])
        .allowed_headers(vec![header::CONTENT_TYPE, header::ACCEPT]);

        App::new()
            .app_data(faucet.clone())
            .configure(api::config)
            .wrap(cors)
            .wrap(Logger::default())
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}

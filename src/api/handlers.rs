use actix_web::{get, post, web, Either, HttpResponse};
use log::{debug, info, warn};
use uuid::Uuid;

use crate::{
    errors::FaucetError,
    models::{api_response::success_response, transfer::TransferRequest},
    services::faucet_service::FaucetService,
};

#[post("/")]
async fn request_funds(
    faucet: web::Data<FaucetService>,
    body: Either<web::Json<TransferRequest>, web::Form<TransferRequest>>,
) -> Result<HttpResponse, FaucetError> {
    let request = match body {
        Either::Left(json) => json.into_inner(),
        Either::Right(form) => form.into_inner(),
    };

    let request_id = Uuid::new_v4();
    info!(
        "[{}] Faucet request: receiver={:?} token={:?}",
        request_id, request.receiver, request.token
    );
    debug!("[{}] Request body: {:?}", request_id, request);

    match faucet.dispense(&request).await {
        Ok(outcome) => {
            info!("[{}] Mined {:#x}", request_id, outcome.tx_hash);
            Ok(success_response(format!("{:#x}", outcome.tx_hash)))
        }
        Err(e) => {
            warn!("[{}] Faucet request failed: {}", request_id, e);
            Err(e)
        }
    }
}

#[get("/health")]
async fn health(faucet: web::Data<FaucetService>) -> Result<HttpResponse, FaucetError> {
    let status = faucet.health().await.map_err(|e| {
        warn!("Health check failed: {}", e);
        e
    })?;

    Ok(HttpResponse::Ok().json(status))
}

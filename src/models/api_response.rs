use actix_web::HttpResponse;
use serde::Serialize;

use crate::errors::ApiError;

pub const TX_HAS_BEEN_MINED: &str = "Tx has been mined";

#[derive(Debug, Serialize)]
pub struct SuccessPayload {
    pub code: u16,
    pub title: String,
    pub message: String,
    #[serde(rename = "txHash")]
    pub tx_hash: String,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: SuccessPayload,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ApiError,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub address: String,
    pub balance_in_wei: String,
    pub balance_in_eth: u64,
}

// Success response helper
pub fn success_response(tx_hash: String) -> HttpResponse {
    HttpResponse::Ok().json(SuccessResponse {
        success: SuccessPayload {
            code: 200,
            title: "Success".to_string(),
            message: TX_HAS_BEEN_MINED.to_string(),
            tx_hash,
        },
    })
}

use actix_web::{
    error::{JsonPayloadError, UrlencodedError},
    web, HttpRequest,
};
use log::warn;

use crate::errors::FaucetError;

mod handlers;

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    warn!("Rejected JSON body: {}", err);
    FaucetError::InvalidRequest(err.to_string()).into()
}

fn form_error(err: UrlencodedError, _req: &HttpRequest) -> actix_web::Error {
    warn!("Rejected form body: {}", err);
    FaucetError::InvalidRequest(err.to_string()).into()
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::FormConfig::default().error_handler(form_error))
        .service(handlers::request_funds)
        .service(handlers::health);
}

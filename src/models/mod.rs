pub mod api_response;
pub mod captcha;
pub mod token;
pub mod transaction;
pub mod transfer;

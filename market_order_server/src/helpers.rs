use std::future::{ready, Ready};

use actix_web::{dev::Payload, error::JsonPayloadError, web, FromRequest, HttpRequest};
use log::*;

use crate::{config::UserIdHeader, errors::ServerError};

/// The id of the calling user, as asserted by the upstream authentication layer in the configured header.
///
/// Requests without the header, or with a blank one, are rejected with `401 Unauthorized`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserId(pub String);

impl UserId {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl FromRequest for UserId {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let header = req
            .app_data::<web::Data<UserIdHeader>>()
            .map(|h| h.0.clone())
            .unwrap_or_else(|| UserIdHeader::default().0);
        let user_id = req
            .headers()
            .get(header.as_str())
            .and_then(|v| v.to_str().ok())
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| UserId(s.to_string()));
        let result = user_id.ok_or_else(|| {
            debug!("💻️ Request to {} has no {header} header", req.path());
            ServerError::MissingUserId(header)
        });
        ready(result)
    }
}

/// Turns JSON extraction failures into [`ServerError::InvalidRequestBody`], so clients get the same error body for
/// every failure.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    debug!("💻️ Could not deserialize request body. {err}");
    ServerError::InvalidRequestBody(err.to_string()).into()
}

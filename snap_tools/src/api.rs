use std::sync::Arc;

use log::*;
use market_order_engine::traits::{PaymentGateway, PaymentSession, SessionOutcome, SessionRequest};
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
    StatusCode,
};

use crate::{
    config::SnapConfig,
    data_objects::{SnapTransactionRequest, SnapTransactionResponse},
    SnapApiError,
};

pub const TRANSACTIONS_PATH: &str = "/snap/v1/transactions";

#[derive(Clone)]
pub struct SnapApi {
    config: SnapConfig,
    client: Arc<Client>,
}

impl SnapApi {
    pub fn new(config: SnapConfig) -> Result<Self, SnapApiError> {
        let mut headers = HeaderMap::with_capacity(2);
        headers.insert("Accept", HeaderValue::from_static("application/json"));
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| SnapApiError::Initialization(e.to_string()))?;
        if config.server_key.is_empty() {
            warn!("🪝️ The Snap client has no server key. The provider will reject every request.");
        }
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url)
    }

    pub fn config(&self) -> &SnapConfig {
        &self.config
    }

    /// Sends the request and hands back the HTTP status with whatever body could be parsed. A body that is not JSON
    /// is returned as an empty response. Only a failure to talk to the provider at all is an error.
    async fn send_transaction(
        &self,
        request: &SnapTransactionRequest,
    ) -> Result<(StatusCode, SnapTransactionResponse), SnapApiError> {
        let url = self.url(TRANSACTIONS_PATH);
        trace!("Sending Snap transaction request to {url}");
        let response = self
            .client
            .post(url)
            .basic_auth(self.config.server_key.reveal(), Some(""))
            .json(request)
            .send()
            .await
            .map_err(|e| SnapApiError::TransportError(e.to_string()))?;
        let status = response.status();
        let text = response.text().await.map_err(|e| SnapApiError::TransportError(e.to_string()))?;
        let body = serde_json::from_str::<SnapTransactionResponse>(&text).unwrap_or_else(|e| {
            warn!("🪝️ Snap returned a body that could not be parsed ({e}): {text}");
            SnapTransactionResponse::default()
        });
        Ok((status, body))
    }

    /// Creates a Snap transaction, failing unless the provider answered with a success status, a token and a redirect
    /// URL.
    pub async fn create_transaction(
        &self,
        request: &SnapTransactionRequest,
    ) -> Result<SnapTransactionResponse, SnapApiError> {
        let (status, body) = self.send_transaction(request).await?;
        let has_session = body.token.as_deref().is_some_and(|t| !t.is_empty()) &&
            body.redirect_url.as_deref().is_some_and(|u| !u.is_empty());
        if status.is_success() && has_session {
            Ok(body)
        } else {
            Err(SnapApiError::QueryError { status: status.as_u16(), message: body.error_messages.join("; ") })
        }
    }
}

impl PaymentGateway for SnapApi {
    async fn create_session(&self, request: SessionRequest) -> SessionOutcome {
        let order_id = request.order_id.clone();
        let request = match SnapTransactionRequest::try_from(request) {
            Ok(r) => r,
            Err(e) => {
                error!("🪝️ Could not build a Snap request for order {order_id}: {e}");
                return SessionOutcome::NoSession;
            },
        };
        let (status, body) = match self.send_transaction(&request).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("🪝️ Snap request for order {order_id} failed: {e}");
                return SessionOutcome::TransportError(e.to_string());
            },
        };
        let SnapTransactionResponse { token, redirect_url, error_messages } = body;
        let token = token.filter(|t| !t.is_empty());
        let redirect_url = redirect_url.filter(|u| !u.is_empty());
        match (token, redirect_url) {
            (Some(token), Some(redirect_url)) => {
                let advisory = if status.is_success() && error_messages.is_empty() {
                    None
                } else {
                    let advisory = format!("Snap answered {status} with a token. {}", error_messages.join("; "));
                    warn!("🪝️ Order {order_id}: {advisory}");
                    Some(advisory)
                };
                info!("🪝️ Snap session created for order {order_id}");
                SessionOutcome::Created { session: PaymentSession { token, redirect_url }, advisory }
            },
            (Some(_), None) => {
                warn!("🪝️ Snap returned a token without a redirect URL for order {order_id}. Status {status}.");
                SessionOutcome::NoSession
            },
            (None, _) => {
                let messages = error_messages.join("; ");
                warn!("🪝️ Snap did not return a token for order {order_id}. Status {status}. {messages}");
                SessionOutcome::NoSession
            },
        }
    }
}

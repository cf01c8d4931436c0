use reqwest::{Client, StatusCode};
use reqwest::header::{AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Serialize;
use serde_json::Value;

use crate::auth::fetch_access_token;
use crate::config::ClientConfig;
use crate::credentials::encrypt_initiator_secret;
use crate::environment::{Endpoint, Environment};
use crate::error::{DarajaError, Result};
use crate::mask;
use crate::models::{
    AccessToken, B2BPayment, B2CPayment, BalanceInquiry, C2BRegisterUrl, C2BSimulation,
    ErrorResponse, GatewayResponse, PullTransactions, Reversal, StkPush, StkPushQuery,
};

/// Gateway client. Cheap to clone; holds no per-call state.
///
/// Every operation fetches a fresh access token and then POSTs the request,
/// so each call costs two round trips.
#[derive(Debug, Clone)]
pub struct Daraja {
    config: ClientConfig,
    http: Client,
}

impl Daraja {
    pub fn new(config: ClientConfig) -> Result<Self> {
        if config.timeout().is_zero() {
            return Err(DarajaError::Config("timeout must be greater than zero".into()));
        }
        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(DarajaError::ClientBuild)?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn environment(&self) -> Environment {
        self.config.environment
    }

    pub fn endpoint_url(&self, endpoint: Endpoint) -> String {
        endpoint.url(self.config.base_url())
    }

    pub async fn access_token(&self) -> Result<AccessToken> {
        fetch_access_token(
            &self.http,
            &self.config.app_key,
            &self.config.app_secret,
            self.config.base_url(),
        )
        .await
    }

    /// POST `request` to `endpoint` with an already obtained bearer token.
    pub async fn send<T: Serialize>(
        &self,
        endpoint: Endpoint,
        request: &T,
        bearer_token: &str,
    ) -> Result<GatewayResponse> {
        let body = encode(request)?;
        self.post(endpoint, body, bearer_token).await
    }

    async fn dispatch<T: Serialize>(
        &self,
        endpoint: Endpoint,
        request: &T,
    ) -> Result<GatewayResponse> {
        let body = encode(request)?;
        let token = self.access_token().await?;
        if tracing::enabled!(tracing::Level::DEBUG) {
            tracing::debug!(data = %mask::secure_bytes(&body), ?endpoint, "Gateway API request");
        }
        self.post(endpoint, body, &token.access_token).await
    }

    async fn post(
        &self,
        endpoint: Endpoint,
        body: Vec<u8>,
        bearer_token: &str,
    ) -> Result<GatewayResponse> {
        let url = self.endpoint_url(endpoint);
        let res = self
            .http
            .post(&url)
            .headers(request_headers(bearer_token)?)
            .body(body)
            .send()
            .await?;

        let status = res.status();
        let bytes = res.bytes().await?;
        if !status.is_success() {
            return Err(rejection(status, &bytes));
        }

        let response: Value = serde_json::from_slice(&bytes).map_err(DarajaError::Decode)?;
        tracing::debug!(
            %url,
            %status,
            response = %mask::secure_value(&response),
            "Gateway API response"
        );
        serde_json::from_value(response).map_err(DarajaError::Decode)
    }

    /// Prompt the customer's handset to authorize a payment.
    pub async fn stk_push(&self, request: &StkPush) -> Result<GatewayResponse> {
        self.dispatch(Endpoint::StkPush, request).await
    }

    /// Query the status of an earlier payment prompt.
    pub async fn stk_push_query(&self, request: &StkPushQuery) -> Result<GatewayResponse> {
        self.dispatch(Endpoint::StkPushQuery, request).await
    }

    pub async fn c2b_register_url(&self, request: &C2BRegisterUrl) -> Result<GatewayResponse> {
        self.dispatch(Endpoint::C2BRegisterUrl, request).await
    }

    /// Simulate a customer payment. Sandbox only on the gateway side.
    pub async fn c2b_simulate(&self, request: &C2BSimulation) -> Result<GatewayResponse> {
        self.dispatch(Endpoint::C2BSimulate, request).await
    }

    pub async fn b2c_payment(&self, request: &B2CPayment) -> Result<GatewayResponse> {
        self.dispatch(Endpoint::B2CPayment, request).await
    }

    pub async fn b2b_payment(&self, request: &B2BPayment) -> Result<GatewayResponse> {
        self.dispatch(Endpoint::B2BPayment, request).await
    }

    pub async fn reversal(&self, request: &Reversal) -> Result<GatewayResponse> {
        self.dispatch(Endpoint::Reversal, request).await
    }

    pub async fn account_balance(&self, request: &BalanceInquiry) -> Result<GatewayResponse> {
        self.dispatch(Endpoint::AccountBalance, request).await
    }

    pub async fn pull_transactions(&self, request: &PullTransactions) -> Result<GatewayResponse> {
        self.dispatch(Endpoint::PullTransactions, request).await
    }

    /// Build a security credential with the environment's published certificate.
    pub async fn security_credential(&self, initiator_password: &str) -> Result<String> {
        let url = self.config.environment.certificate_url();
        self.security_credential_from_url(url, initiator_password).await
    }

    /// Build a security credential with the certificate served at `url`.
    pub async fn security_credential_from_url(
        &self,
        url: &str,
        initiator_password: &str,
    ) -> Result<String> {
        tracing::debug!(%url, "Downloading gateway certificate");
        let res = self.http.get(url).send().await?;
        let status = res.status();
        if !status.is_success() {
            return Err(DarajaError::CertificateFetch { status });
        }
        let certificate = res.bytes().await?;
        encrypt_initiator_secret(initiator_password, &certificate)
    }
}

/// Map a non-2xx reply to [`DarajaError::Gateway`]. Bodies without the
/// gateway's error envelope (proxy faults, HTML pages) keep the HTTP status
/// as the error code and the raw body as the message.
fn rejection(status: StatusCode, body: &[u8]) -> DarajaError {
    tracing::debug!(%status, response = %mask::secure_bytes(body), "Gateway rejected request");
    match serde_json::from_slice::<ErrorResponse>(body) {
        Ok(envelope) => DarajaError::Gateway {
            status,
            request_id: envelope.request_id,
            error_code: envelope.error_code,
            error_message: envelope.error_message,
        },
        Err(_) => DarajaError::Gateway {
            status,
            request_id: None,
            error_code: status.as_u16().to_string(),
            error_message: String::from_utf8_lossy(body).into_owned(),
        },
    }
}

fn encode<T: Serialize>(request: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(request).map_err(DarajaError::Serialization)
}

/// The fixed header set sent with every operation.
fn request_headers(bearer_token: &str) -> Result<HeaderMap> {
    let authorization = HeaderValue::from_str(&format!("Bearer {bearer_token}"))
        .map_err(|e| DarajaError::Auth {
            status: None,
            body: format!("access token is not a valid header value: {e}"),
        })?;
    let mut headers = HeaderMap::with_capacity(3);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(AUTHORIZATION, authorization);
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    Ok(headers)
}

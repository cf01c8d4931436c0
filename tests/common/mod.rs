#![allow(dead_code)]

use base64::{Engine, prelude::BASE64_STANDARD};
use daraja::{ClientConfig, Daraja, Environment};
use httpmock::prelude::*;
use httpmock::Mock;
use serde_json::json;

pub const APP_KEY: &str = "test-key";
pub const APP_SECRET: &str = "test-secret";
pub const TOKEN: &str = "c9SQxWWhmdVRlyh0zh8gZDTkubVF";

pub const GATEWAY_CERT: &[u8] = include_bytes!("../fixtures/gateway_test.cer");
pub const GATEWAY_KEY: &str = include_str!("../fixtures/gateway_test.key");
pub const EC_CERT: &[u8] = include_bytes!("../fixtures/ec_test.cer");

pub fn client_for(server: &MockServer) -> Daraja {
    let config = ClientConfig::new(APP_KEY, APP_SECRET, Environment::Sandbox)
        .with_base_url(server.base_url());
    Daraja::new(config).unwrap()
}

pub fn basic_auth() -> String {
    format!(
        "Basic {}",
        BASE64_STANDARD.encode(format!("{APP_KEY}:{APP_SECRET}"))
    )
}

/// Token endpoint that issues [`TOKEN`] to the test credentials.
pub async fn mock_token(server: &MockServer) -> Mock<'_> {
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/oauth/v1/generate")
                .query_param("grant_type", "client_credentials")
                .header("authorization", basic_auth());
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({"access_token": TOKEN, "expires_in": "3599"}));
        })
        .await
}

pub fn stk_ack() -> serde_json::Value {
    json!({
        "MerchantRequestID": "1",
        "CheckoutRequestID": "2",
        "ResponseCode": "0",
        "ResponseDescription": "ok",
        "CustomerMessage": "ok"
    })
}

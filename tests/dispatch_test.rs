mod common;

use common::*;
use daraja::models::{
    B2BPayment, B2CPayment, BalanceInquiry, C2BRegisterUrl, C2BSimulation, CommandId,
    IdentifierType, PullTransactions, ResponseType, Reversal, StkPush, StkPushQuery,
};
use daraja::{DarajaError, Endpoint};
use httpmock::prelude::*;
use reqwest::StatusCode;
use serde_json::json;

fn stk_push() -> StkPush {
    StkPush::new(
        "174379",
        1,
        "254708374149",
        "https://example.com/callback",
        "INV-1",
        "Invoice 1",
        "bfb279f9aa9bdbcf158e97dd71a467cd2e0c893059b10f78e6b72ada1ed2c919",
    )
}

fn conversation_ack() -> serde_json::Value {
    json!({
        "ConversationID": "AG_20191219_00005797af5d7d75f652",
        "OriginatorConversationID": "16740-34861180-1",
        "ResponseCode": "0",
        "ResponseDescription": "Accept the service request successfully."
    })
}

#[tokio::test]
async fn test_stk_push_sends_fixed_headers_and_decodes_ack() {
    let server = MockServer::start_async().await;
    let token_mock = mock_token(&server).await;
    let request = stk_push();
    let expected_body = serde_json::to_value(&request).unwrap();
    let stk_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/mpesa/stkpush/v1/processrequest")
                .header("content-type", "application/json")
                .header("authorization", format!("Bearer {TOKEN}"))
                .header("cache-control", "no-cache")
                .json_body(expected_body);
            then.status(200).json_body(stk_ack());
        })
        .await;

    let ack = client_for(&server).stk_push(&request).await.unwrap();

    token_mock.assert_async().await;
    stk_mock.assert_async().await;
    assert_eq!(ack.merchant_request_id.as_deref(), Some("1"));
    assert_eq!(ack.checkout_request_id.as_deref(), Some("2"));
    assert_eq!(ack.response_code.as_deref(), Some("0"));
    assert_eq!(ack.response_description.as_deref(), Some("ok"));
    assert_eq!(ack.customer_message.as_deref(), Some("ok"));
    assert!(ack.is_accepted());
}

#[tokio::test]
async fn test_send_with_explicit_token() {
    let server = MockServer::start_async().await;
    let token_mock = mock_token(&server).await;
    let stk_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/mpesa/stkpush/v1/processrequest")
                .header("authorization", "Bearer preissued");
            then.status(200).json_body(stk_ack());
        })
        .await;

    let ack = client_for(&server)
        .send(Endpoint::StkPush, &stk_push(), "preissued")
        .await
        .unwrap();

    stk_mock.assert_async().await;
    token_mock.assert_calls_async(0).await;
    assert_eq!(ack.checkout_request_id.as_deref(), Some("2"));
}

#[tokio::test]
async fn test_every_call_fetches_a_fresh_token() {
    let server = MockServer::start_async().await;
    let token_mock = mock_token(&server).await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/mpesa/stkpushquery/v1/query");
            then.status(200).json_body(json!({
                "ResponseCode": "0",
                "ResponseDescription": "The service request has been accepted successsfully",
                "MerchantRequestID": "1",
                "CheckoutRequestID": "ws_CO_1",
                "ResultCode": "0",
                "ResultDesc": "The service request is processed successfully."
            }));
        })
        .await;

    let client = client_for(&server);
    let query = StkPushQuery::new("174379", "passkey", "ws_CO_1");
    let first = client.stk_push_query(&query).await.unwrap();
    let second = client.stk_push_query(&query).await.unwrap();

    token_mock.assert_calls_async(2).await;
    assert_eq!(first, second);
    assert_eq!(first.result_code.as_deref(), Some("0"));
}

#[tokio::test]
async fn test_initiator_operations_hit_their_endpoints() {
    let server = MockServer::start_async().await;
    mock_token(&server).await;

    let paths = [
        "/mpesa/c2b/v1/registerurl",
        "/mpesa/c2b/v1/simulate",
        "/mpesa/b2c/v1/paymentrequest",
        "/mpesa/b2b/v1/paymentrequest",
        "/mpesa/reversal/v1/request",
        "/mpesa/accountbalance/v1/query",
        "/pulltransactions/v1/query",
    ];
    let mut mocks = Vec::new();
    for path in paths {
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path(path);
                then.status(200).json_body(conversation_ack());
            })
            .await;
        mocks.push(mock);
    }

    let client = client_for(&server);
    let callback = "https://example.com/result".to_string();
    let timeout = "https://example.com/timeout".to_string();

    let responses = vec![
        client
            .c2b_register_url(&C2BRegisterUrl {
                short_code: "600000".into(),
                response_type: ResponseType::Completed,
                confirmation_url: callback.clone(),
                validation_url: callback.clone(),
            })
            .await,
        client
            .c2b_simulate(&C2BSimulation {
                short_code: "600000".into(),
                command_id: CommandId::CustomerPayBillOnline,
                amount: 10,
                msisdn: "254708374149".into(),
                bill_ref_number: "ref".into(),
            })
            .await,
        client
            .b2c_payment(&B2CPayment {
                initiator_name: "testapi".into(),
                security_credential: "cred".into(),
                command_id: CommandId::BusinessPayment,
                amount: 10,
                party_a: "600000".into(),
                party_b: "254708374149".into(),
                remarks: "ok".into(),
                queue_timeout_url: timeout.clone(),
                result_url: callback.clone(),
                occasion: "".into(),
            })
            .await,
        client
            .b2b_payment(&B2BPayment {
                initiator: "testapi".into(),
                security_credential: "cred".into(),
                command_id: CommandId::BusinessPayBill,
                sender_identifier_type: IdentifierType::Shortcode,
                receiver_identifier_type: IdentifierType::Shortcode,
                amount: 10,
                party_a: "600000".into(),
                party_b: "600001".into(),
                remarks: "ok".into(),
                account_reference: "acc".into(),
                queue_timeout_url: timeout.clone(),
                result_url: callback.clone(),
            })
            .await,
        client
            .reversal(&Reversal {
                initiator: "testapi".into(),
                security_credential: "cred".into(),
                command_id: CommandId::TransactionReversal,
                transaction_id: "NLJ7RT61SV".into(),
                amount: 10,
                receiver_party: "600000".into(),
                receiver_identifier_type: IdentifierType::Shortcode,
                queue_timeout_url: timeout.clone(),
                result_url: callback.clone(),
                remarks: "ok".into(),
                occasion: "".into(),
            })
            .await,
        client
            .account_balance(&BalanceInquiry {
                initiator: "testapi".into(),
                security_credential: "cred".into(),
                command_id: CommandId::AccountBalance,
                party_a: "600000".into(),
                identifier_type: IdentifierType::Shortcode,
                remarks: "ok".into(),
                queue_timeout_url: timeout.clone(),
                result_url: callback.clone(),
            })
            .await,
        client
            .pull_transactions(&PullTransactions {
                short_code: "600000".into(),
                start_date: "2020-08-04 8:36:00".into(),
                end_date: "2020-08-16 10:10:000".into(),
                page_number: "1".into(),
            })
            .await,
    ];

    for mock in &mocks {
        mock.assert_async().await;
    }
    for response in responses {
        let ack = response.unwrap();
        assert_eq!(
            ack.conversation_id.as_deref(),
            Some("AG_20191219_00005797af5d7d75f652")
        );
        assert!(ack.is_accepted());
    }
}

#[tokio::test]
async fn test_gateway_error_envelope() {
    let server = MockServer::start_async().await;
    mock_token(&server).await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/mpesa/stkpush/v1/processrequest");
            then.status(400).json_body(json!({
                "requestId": "8571-1234567-1",
                "errorCode": "400.002.02",
                "errorMessage": "Bad Request - Invalid BusinessShortCode"
            }));
        })
        .await;

    let err = client_for(&server).stk_push(&stk_push()).await.unwrap_err();
    match err {
        DarajaError::Gateway {
            status,
            request_id,
            error_code,
            error_message,
        } => {
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(request_id.as_deref(), Some("8571-1234567-1"));
            assert_eq!(error_code, "400.002.02");
            assert!(error_message.contains("BusinessShortCode"));
        }
        other => panic!("expected gateway error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_response_is_decode_error() {
    let server = MockServer::start_async().await;
    mock_token(&server).await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/mpesa/stkpush/v1/processrequest");
            then.status(200).body("<html>upstream timeout</html>");
        })
        .await;

    let err = client_for(&server).stk_push(&stk_push()).await.unwrap_err();
    assert!(matches!(err, DarajaError::Decode(_)));
}

#[tokio::test]
async fn test_wrong_field_type_is_decode_error() {
    let server = MockServer::start_async().await;
    mock_token(&server).await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/mpesa/stkpush/v1/processrequest");
            then.status(200).json_body(json!({"ResponseCode": 0}));
        })
        .await;

    let err = client_for(&server).stk_push(&stk_push()).await.unwrap_err();
    assert!(matches!(err, DarajaError::Decode(_)));
}

#[tokio::test]
async fn test_server_error_without_envelope_is_gateway_error() {
    let server = MockServer::start_async().await;
    mock_token(&server).await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/mpesa/stkpush/v1/processrequest");
            then.status(500)
                .json_body(json!({"fault": {"faultstring": "Internal Server Error"}}));
        })
        .await;

    let err = client_for(&server).stk_push(&stk_push()).await.unwrap_err();
    match err {
        DarajaError::Gateway {
            status,
            request_id,
            error_code,
            error_message,
        } => {
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert!(request_id.is_none());
            assert_eq!(error_code, "500");
            assert!(error_message.contains("faultstring"));
        }
        other => panic!("expected gateway error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_non_json_error_page_is_gateway_error() {
    let server = MockServer::start_async().await;
    mock_token(&server).await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/mpesa/b2c/v1/paymentrequest");
            then.status(503).body("<html>Service Unavailable</html>");
        })
        .await;

    let client = client_for(&server);
    let err = client
        .send(Endpoint::B2CPayment, &json!({"Amount": "10"}), TOKEN)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DarajaError::Gateway { status, .. } if status == StatusCode::SERVICE_UNAVAILABLE
    ));
}

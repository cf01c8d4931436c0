//! Request and response records, serialized with the gateway's field names.
//!
//! The gateway's own spellings (`Occassion`, `RecieverIdentifierType`) are
//! part of the wire contract and kept as-is.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::{DisplayFromStr, PickFirst, serde_as};

use crate::credentials::{derive_password, timestamp_now};

// ============================================================================
// Enumerations
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandId {
    BusinessPayment,
    SalaryPayment,
    PromotionPayment,
    CustomerPayBillOnline,
    CustomerBuyGoodsOnline,
    AccountBalance,
    TransactionReversal,
    TransactionStatusQuery,
    BusinessPayBill,
    BusinessBuyGoods,
    DisburseFundsToBusiness,
    BusinessToBusinessTransfer,
    MerchantToMerchantTransfer,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionType {
    #[default]
    CustomerPayBillOnline,
    CustomerBuyGoodsOnline,
}

/// What the gateway does with a C2B payment when the validation URL is unreachable.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseType {
    #[default]
    Completed,
    Cancelled,
}

/// Kind of party identifier, sent as the gateway's numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdentifierType {
    #[serde(rename = "1")]
    Msisdn,
    #[serde(rename = "2")]
    TillNumber,
    #[serde(rename = "4")]
    Shortcode,
}

// ============================================================================
// Requests
// ============================================================================

/// Payment prompt pushed to the customer's handset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StkPush {
    pub business_short_code: String,
    pub password: String,
    pub timestamp: String,
    pub transaction_type: TransactionType,
    pub amount: u64,
    pub party_a: String,
    pub party_b: String,
    pub phone_number: String,
    #[serde(rename = "CallBackURL")]
    pub callback_url: String,
    pub account_reference: String,
    pub transaction_desc: String,
}

impl StkPush {
    /// Build a paybill prompt stamped with the current time and its derived password.
    pub fn new(
        shortcode: &str,
        amount: u64,
        phone_number: &str,
        callback_url: &str,
        account_reference: &str,
        description: &str,
        passkey: &str,
    ) -> Self {
        let timestamp = timestamp_now();
        let password = derive_password(shortcode, passkey, &timestamp);
        Self {
            business_short_code: shortcode.to_string(),
            password,
            timestamp,
            transaction_type: TransactionType::default(),
            amount,
            party_a: phone_number.to_string(),
            party_b: shortcode.to_string(),
            phone_number: phone_number.to_string(),
            callback_url: callback_url.to_string(),
            account_reference: account_reference.to_string(),
            transaction_desc: description.to_string(),
        }
    }
}

/// Status query for an earlier payment prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StkPushQuery {
    pub business_short_code: String,
    pub password: String,
    pub timestamp: String,
    #[serde(rename = "CheckoutRequestID")]
    pub checkout_request_id: String,
}

impl StkPushQuery {
    pub fn new(shortcode: &str, passkey: &str, checkout_request_id: &str) -> Self {
        let timestamp = timestamp_now();
        let password = derive_password(shortcode, passkey, &timestamp);
        Self {
            business_short_code: shortcode.to_string(),
            password,
            timestamp,
            checkout_request_id: checkout_request_id.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct C2BRegisterUrl {
    pub short_code: String,
    pub response_type: ResponseType,
    #[serde(rename = "ConfirmationURL")]
    pub confirmation_url: String,
    #[serde(rename = "ValidationURL")]
    pub validation_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct C2BSimulation {
    pub short_code: String,
    #[serde(rename = "CommandID")]
    pub command_id: CommandId,
    pub amount: u64,
    pub msisdn: String,
    pub bill_ref_number: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct B2CPayment {
    pub initiator_name: String,
    pub security_credential: String,
    #[serde(rename = "CommandID")]
    pub command_id: CommandId,
    pub amount: u64,
    pub party_a: String,
    pub party_b: String,
    pub remarks: String,
    #[serde(rename = "QueueTimeOutURL")]
    pub queue_timeout_url: String,
    #[serde(rename = "ResultURL")]
    pub result_url: String,
    #[serde(rename = "Occassion")]
    pub occasion: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct B2BPayment {
    pub initiator: String,
    pub security_credential: String,
    #[serde(rename = "CommandID")]
    pub command_id: CommandId,
    pub sender_identifier_type: IdentifierType,
    #[serde(rename = "RecieverIdentifierType")]
    pub receiver_identifier_type: IdentifierType,
    pub amount: u64,
    pub party_a: String,
    pub party_b: String,
    pub remarks: String,
    pub account_reference: String,
    #[serde(rename = "QueueTimeOutURL")]
    pub queue_timeout_url: String,
    #[serde(rename = "ResultURL")]
    pub result_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Reversal {
    pub initiator: String,
    pub security_credential: String,
    #[serde(rename = "CommandID")]
    pub command_id: CommandId,
    #[serde(rename = "TransactionID")]
    pub transaction_id: String,
    pub amount: u64,
    pub receiver_party: String,
    #[serde(rename = "RecieverIdentifierType")]
    pub receiver_identifier_type: IdentifierType,
    #[serde(rename = "QueueTimeOutURL")]
    pub queue_timeout_url: String,
    #[serde(rename = "ResultURL")]
    pub result_url: String,
    pub remarks: String,
    #[serde(rename = "Occassion")]
    pub occasion: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BalanceInquiry {
    pub initiator: String,
    pub security_credential: String,
    #[serde(rename = "CommandID")]
    pub command_id: CommandId,
    pub party_a: String,
    pub identifier_type: IdentifierType,
    pub remarks: String,
    #[serde(rename = "QueueTimeOutURL")]
    pub queue_timeout_url: String,
    #[serde(rename = "ResultURL")]
    pub result_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PullTransactions {
    pub short_code: String,
    pub start_date: String,
    pub end_date: String,
    pub page_number: String,
}

// ============================================================================
// Responses
// ============================================================================

/// Synchronous acknowledgment returned by every operation.
///
/// Which fields are populated depends on the operation: payment prompts fill
/// the merchant/checkout ids, initiator operations fill the conversation ids.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayResponse {
    #[serde(rename = "MerchantRequestID", default, skip_serializing_if = "Option::is_none")]
    pub merchant_request_id: Option<String>,
    #[serde(rename = "CheckoutRequestID", default, skip_serializing_if = "Option::is_none")]
    pub checkout_request_id: Option<String>,
    #[serde(rename = "ConversationID", default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    #[serde(
        rename = "OriginatorConversationID",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub originator_conversation_id: Option<String>,
    #[serde(rename = "ResponseCode", default, skip_serializing_if = "Option::is_none")]
    pub response_code: Option<String>,
    #[serde(rename = "ResponseDescription", default, skip_serializing_if = "Option::is_none")]
    pub response_description: Option<String>,
    #[serde(rename = "CustomerMessage", default, skip_serializing_if = "Option::is_none")]
    pub customer_message: Option<String>,
    #[serde(rename = "ResultCode", default, skip_serializing_if = "Option::is_none")]
    pub result_code: Option<String>,
    #[serde(rename = "ResultDesc", default, skip_serializing_if = "Option::is_none")]
    pub result_desc: Option<String>,
}

impl GatewayResponse {
    /// The gateway accepted the request for processing.
    pub fn is_accepted(&self) -> bool {
        self.response_code.as_deref() == Some("0")
    }
}

/// Error envelope the gateway sends alongside non-2xx statuses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    #[serde(default)]
    pub request_id: Option<String>,
    pub error_code: String,
    pub error_message: String,
}

#[serde_as]
#[derive(Debug, Clone, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    /// Seconds. The gateway sends a string (`"3599"`); a number is accepted too.
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub expires_in: u64,
}

// ============================================================================
// Callbacks
// ============================================================================

/// Body the gateway POSTs to `CallBackURL` once a payment prompt completes.
#[derive(Debug, Clone, Deserialize)]
pub struct StkCallback {
    #[serde(rename = "Body")]
    pub body: StkCallbackBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StkCallbackBody {
    #[serde(rename = "stkCallback")]
    pub stk_callback: StkCallbackResult,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StkCallbackResult {
    #[serde(rename = "MerchantRequestID")]
    pub merchant_request_id: String,
    #[serde(rename = "CheckoutRequestID")]
    pub checkout_request_id: String,
    pub result_code: i64,
    pub result_desc: String,
    #[serde(default)]
    pub callback_metadata: Option<CallbackMetadata>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackMetadata {
    #[serde(rename = "Item", default)]
    pub items: Vec<CallbackItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackItem {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Value", default)]
    pub value: Value,
}

impl StkCallback {
    pub fn is_success(&self) -> bool {
        self.body.stk_callback.result_code == 0
    }

    /// Look up a metadata item such as `MpesaReceiptNumber` or `Amount`.
    pub fn metadata(&self, name: &str) -> Option<&Value> {
        self.body
            .stk_callback
            .callback_metadata
            .as_ref()?
            .items
            .iter()
            .find(|item| item.name == name)
            .map(|item| &item.value)
    }
}

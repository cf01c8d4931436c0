//! Gateway constants: base URLs, certificate locations, endpoint paths and
//! client defaults.

// =============================================================================
// Base URLs
// =============================================================================

pub const SANDBOX_BASE_URL: &str = "https://sandbox.safaricom.co.ke/";
pub const PRODUCTION_BASE_URL: &str = "https://api.safaricom.co.ke/";

// =============================================================================
// Security Credential Certificates
// =============================================================================

pub const SANDBOX_CERTIFICATE_URL: &str =
    "https://developer.safaricom.co.ke/api/v1/GenerateSecurityCredential/SandboxCertificate.cer";
pub const PRODUCTION_CERTIFICATE_URL: &str =
    "https://developer.safaricom.co.ke/api/v1/GenerateSecurityCredential/ProductionCertificate.cer";

// =============================================================================
// Endpoint Paths (relative to the base URL)
// =============================================================================

pub const OAUTH_PATH: &str = "oauth/v1/generate?grant_type=client_credentials";
pub const STK_PUSH_PATH: &str = "mpesa/stkpush/v1/processrequest";
pub const STK_PUSH_QUERY_PATH: &str = "mpesa/stkpushquery/v1/query";
pub const C2B_REGISTER_URL_PATH: &str = "mpesa/c2b/v1/registerurl";
pub const C2B_SIMULATE_PATH: &str = "mpesa/c2b/v1/simulate";
pub const B2C_PAYMENT_PATH: &str = "mpesa/b2c/v1/paymentrequest";
pub const B2B_PAYMENT_PATH: &str = "mpesa/b2b/v1/paymentrequest";
/// Not confirmed against the gateway documentation.
pub const REVERSAL_PATH: &str = "mpesa/reversal/v1/request";
pub const ACCOUNT_BALANCE_PATH: &str = "mpesa/accountbalance/v1/query";
pub const PULL_TRANSACTIONS_PATH: &str = "pulltransactions/v1/query";

// =============================================================================
// Client Settings
// =============================================================================

/// Timeout applied to every gateway request
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Gateway timestamp layout, e.g. 20230101120000
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Default config file read by the CLI when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = "daraja.toml";

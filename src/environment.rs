use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::consts::{
    ACCOUNT_BALANCE_PATH, B2B_PAYMENT_PATH, B2C_PAYMENT_PATH, C2B_REGISTER_URL_PATH,
    C2B_SIMULATE_PATH, OAUTH_PATH, PRODUCTION_BASE_URL, PRODUCTION_CERTIFICATE_URL,
    PULL_TRANSACTIONS_PATH, REVERSAL_PATH, SANDBOX_BASE_URL, SANDBOX_CERTIFICATE_URL,
    STK_PUSH_PATH, STK_PUSH_QUERY_PATH,
};

/// Which gateway deployment the client talks to.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Sandbox,
    Production,
}

impl Environment {
    pub fn base_url(&self) -> &'static str {
        match self {
            Self::Sandbox => SANDBOX_BASE_URL,
            Self::Production => PRODUCTION_BASE_URL,
        }
    }

    /// Location of the public certificate used to build security credentials.
    pub fn certificate_url(&self) -> &'static str {
        match self {
            Self::Sandbox => SANDBOX_CERTIFICATE_URL,
            Self::Production => PRODUCTION_CERTIFICATE_URL,
        }
    }
}

impl Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sandbox => f.write_str("sandbox"),
            Self::Production => f.write_str("production"),
        }
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sandbox" => Ok(Self::Sandbox),
            "production" => Ok(Self::Production),
            other => Err(format!("unknown environment '{other}'")),
        }
    }
}

/// Every gateway operation the client can call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    OAuth,
    StkPush,
    StkPushQuery,
    C2BRegisterUrl,
    C2BSimulate,
    B2CPayment,
    B2BPayment,
    Reversal,
    AccountBalance,
    PullTransactions,
}

impl Endpoint {
    pub const ALL: [Endpoint; 10] = [
        Endpoint::OAuth,
        Endpoint::StkPush,
        Endpoint::StkPushQuery,
        Endpoint::C2BRegisterUrl,
        Endpoint::C2BSimulate,
        Endpoint::B2CPayment,
        Endpoint::B2BPayment,
        Endpoint::Reversal,
        Endpoint::AccountBalance,
        Endpoint::PullTransactions,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Self::OAuth => OAUTH_PATH,
            Self::StkPush => STK_PUSH_PATH,
            Self::StkPushQuery => STK_PUSH_QUERY_PATH,
            Self::C2BRegisterUrl => C2B_REGISTER_URL_PATH,
            Self::C2BSimulate => C2B_SIMULATE_PATH,
            Self::B2CPayment => B2C_PAYMENT_PATH,
            Self::B2BPayment => B2B_PAYMENT_PATH,
            Self::Reversal => REVERSAL_PATH,
            Self::AccountBalance => ACCOUNT_BALANCE_PATH,
            Self::PullTransactions => PULL_TRANSACTIONS_PATH,
        }
    }

    /// Join this endpoint's path onto `base_url`, tolerating a missing or
    /// doubled slash between the two.
    pub fn url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self.path())
    }
}

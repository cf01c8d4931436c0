use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DarajaError>;

#[derive(Error, Debug)]
pub enum DarajaError {
    #[error("could not encode request body: {0}")]
    Serialization(#[source] serde_json::Error),

    /// Token request refused or unusable. `status` is `None` when the token
    /// itself was unusable as a bearer header.
    #[error("access token request failed ({}): {body}", status_label(.status))]
    Auth {
        status: Option<StatusCode>,
        body: String,
    },

    #[error("http request error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("could not build http client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("gateway response deserialization: {0}")]
    Decode(#[source] serde_json::Error),

    /// The gateway rejected the request with its error envelope.
    #[error("gateway rejected request ({status}): {error_code} {error_message}")]
    Gateway {
        status: StatusCode,
        request_id: Option<String>,
        error_code: String,
        error_message: String,
    },

    #[error("could not download gateway certificate ({status})")]
    CertificateFetch { status: StatusCode },

    #[error("invalid certificate: {0}")]
    CertificateParse(String),

    #[error("certificate public key is not RSA (algorithm {0})")]
    UnsupportedKeyType(String),

    #[error("could not encrypt initiator password: {0}")]
    Encryption(#[from] rsa::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

fn status_label(status: &Option<StatusCode>) -> String {
    status.map_or_else(|| "no response".to_string(), |s| s.to_string())
}

//! Wire types shared by the verification proxy and the verification client.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Header carrying the pre-shared key expected by the humanity verification API
pub const API_KEY_HEADER: &str = "X-HP-API-Key";

/// Path of the upstream verification endpoint, relative to the API base URL
pub const UPSTREAM_VERIFY_PATH: &str = "/v1/human/verify";

/// Query parameter holding the wallet address on the upstream endpoint
pub const WALLET_ADDRESS_QUERY: &str = "wallet_address";

/// Identifier the proxy stamps on every verification envelope it re-emits
pub const SERVER_IDENTIFIER: &str = "humanity-protocol-server-example";

/// Verification envelope returned by the humanity verification API.
///
/// The proxy adds `timestamp` and `server`; a direct upstream call leaves them empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct VerificationResult {
    /// The wallet address that was verified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<String>,
    /// Whether the wallet is associated with a verified human
    pub is_human: bool,
    /// Only meaningful when `is_human` is set, read it through [`Self::verified_user_id`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user_id: Option<String>,
    /// ISO-8601 time at which the proxy produced the envelope
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Identifier of the proxy that produced the envelope
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
}

impl VerificationResult {
    /// Creates an envelope without the proxy-added fields
    #[must_use]
    pub const fn new(wallet_address: Option<String>, is_human: bool, user_id: Option<String>) -> Self {
        Self {
            wallet_address,
            is_human,
            user_id,
            timestamp: None,
            server: None,
        }
    }

    /// The upstream user id, only when the wallet was verified as human
    #[must_use]
    pub fn verified_user_id(&self) -> Option<&str> {
        if self.is_human {
            self.user_id.as_deref()
        } else {
            None
        }
    }
}

/// Failure envelope returned by the proxy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ErrorResponse {
    /// Short error category
    pub error: String,
    /// Detailed error message
    pub message: String,
}

/// Liveness response of the proxy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    /// ISO-8601 time of the check
    pub timestamp: String,
    /// Configured upstream API base URL
    pub api_url: Option<String>,
}

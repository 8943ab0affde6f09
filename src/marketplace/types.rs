//! Marketplace type definitions.
//!
//! Values exchanged with the remote add-on catalog and the registration state
//! held by [`super::ApiManager`].

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use super::error::MarketplaceError;

/// OAuth2 grant type used for every token request.
pub const GRANT_TYPE: &str = "client_credentials";

/// Handshake endpoint (instance identifier + checksum -> client credentials).
pub const HANDSHAKE_ENDPOINT: &str = "/api/v1/handshake";

/// Token endpoint for the client-credentials grant.
pub const TOKEN_ENDPOINT: &str = "/oauth/v2/token";

/// Add-on listing endpoint.
pub const ADDON_LIST_ENDPOINT: &str = "/api/v1/addon";

/// Returns the purchase request path for an add-on.
#[must_use]
pub fn purchase_endpoint(addon_id: &str) -> String {
    format!("{}/{}/request", ADDON_LIST_ENDPOINT, addon_id)
}

/// OAuth2 client credentials issued by the marketplace handshake.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientCredentials {
    /// OAuth2 client id.
    #[serde(rename = "clientId")]
    pub client_id: String,
    /// OAuth2 client secret.
    #[serde(rename = "clientSecret")]
    pub client_secret: String,
}

impl ClientCredentials {
    /// Creates a credential pair.
    #[must_use]
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }
}

// The secret never reaches log output.
impl std::fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Registration state of an installation with the marketplace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Registration {
    /// No client id/secret known yet.
    #[default]
    Unregistered,
    /// Handshake completed (now or in an earlier run).
    Registered(ClientCredentials),
}

impl Registration {
    /// Returns true once credentials are known.
    #[must_use]
    pub fn is_registered(&self) -> bool {
        matches!(self, Self::Registered(_))
    }

    /// Returns the credentials if registered.
    #[must_use]
    pub fn credentials(&self) -> Option<&ClientCredentials> {
        match self {
            Self::Registered(credentials) => Some(credentials),
            Self::Unregistered => None,
        }
    }
}

/// Bearer access token returned by the token endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    value: String,
}

impl AccessToken {
    /// Token type sent in the `Authorization` header.
    pub const TOKEN_TYPE: &'static str = "Bearer";

    /// Wraps a raw token value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// Returns the raw token value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns the `Authorization` header value.
    #[must_use]
    pub fn authorization(&self) -> String {
        format!("{} {}", Self::TOKEN_TYPE, self.value)
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// One entry of the catalog listing, passed through exactly as received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AddonSummary(pub serde_json::Value);

impl AddonSummary {
    /// Returns the raw JSON object.
    #[must_use]
    pub fn as_json(&self) -> &serde_json::Value {
        &self.0
    }

    /// Looks up a string field, if present.
    #[must_use]
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.as_str())
    }
}

/// Add-on file payload, base64-encoded (standard alphabet, padded).
///
/// The encoding is part of the public contract: downstream installers expect
/// the text form and decode it themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncodedAddonFile(String);

impl EncodedAddonFile {
    /// Encodes raw downloaded bytes.
    #[must_use]
    pub fn encode(bytes: &[u8]) -> Self {
        Self(STANDARD.encode(bytes))
    }

    /// Returns the base64 text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decodes back to the original bytes.
    pub fn decode(&self) -> Result<Vec<u8>, MarketplaceError> {
        STANDARD
            .decode(&self.0)
            .map_err(|e| MarketplaceError::MalformedResponse(format!("invalid base64: {}", e)))
    }

    /// Consumes the wrapper and returns the base64 text.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

/// A purchase (or trial) request for an add-on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    /// Instance identifier. Overwritten with the configured identifier on submit.
    #[serde(default)]
    pub instance_id: String,
    /// Buyer's company name.
    pub company_name: String,
    /// Contact email address.
    pub contact_email: String,
    /// Contact phone number.
    pub contact_number: String,
    /// Marketplace id of the add-on being requested.
    #[serde(rename = "buyAddonID", alias = "buyAddonId")]
    pub buy_addon_id: String,
}

impl PurchaseRequest {
    /// Creates a request; the instance id is filled in at submission.
    #[must_use]
    pub fn new(
        buy_addon_id: impl Into<String>,
        company_name: impl Into<String>,
        contact_email: impl Into<String>,
        contact_number: impl Into<String>,
    ) -> Self {
        Self {
            instance_id: String::new(),
            company_name: company_name.into(),
            contact_email: contact_email.into(),
            contact_number: contact_number.into(),
            buy_addon_id: buy_addon_id.into(),
        }
    }
}

/// Result of a successful purchase submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseOutcome {
    /// Marketplace accepted the request (HTTP 200).
    Success,
}

impl std::fmt::Display for PurchaseOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "Success"),
        }
    }
}

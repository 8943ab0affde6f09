//! Marketplace API client.
//!
//! Registers the installation with the marketplace (handshake), obtains a
//! bearer token through the OAuth2 client-credentials grant and performs the
//! catalog calls. Callers never see the handshake or token steps.

use reqwest::Url;
use tracing::{debug, info, warn};

use super::collaborators::{InstanceConfig, MarketplaceSettings};
use super::error::MarketplaceError;
use super::transport::{HttpRequest, HttpResponse, HttpTransport};
use super::types::{
    ADDON_LIST_ENDPOINT, AccessToken, AddonSummary, ClientCredentials, EncodedAddonFile,
    GRANT_TYPE, HANDSHAKE_ENDPOINT, PurchaseOutcome, PurchaseRequest, Registration,
    TOKEN_ENDPOINT, purchase_endpoint,
};

const ACCEPT_JSON: &str = "application/json";

/// Token endpoint response body.
#[derive(serde::Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Client for the remote add-on marketplace.
///
/// Holds the registration state for one installation. Operations take
/// `&mut self`; sharing a manager across threads needs external locking.
pub struct ApiManager<T, C, S> {
    /// HTTP transport.
    transport: T,
    /// Instance identity source.
    instance: C,
    /// Settings store for base URL and issued credentials.
    settings: S,
    /// Parsed marketplace base URL.
    base_url: Url,
    /// Current registration state.
    registration: Registration,
}

impl<T, C, S> ApiManager<T, C, S>
where
    T: HttpTransport,
    C: InstanceConfig,
    S: MarketplaceSettings,
{
    /// Creates a manager.
    ///
    /// Credentials already present in `settings` put the manager straight into
    /// the registered state, so no handshake is performed for them.
    pub fn new(transport: T, instance: C, settings: S) -> Result<Self, MarketplaceError> {
        let raw_base = settings.base_url()?;
        let base_url = Url::parse(raw_base.trim())
            .map_err(|e| MarketplaceError::InvalidUrl(format!("{}: {}", raw_base, e)))?;

        let registration = match (settings.client_id(), settings.client_secret()) {
            (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => {
                debug!("[MARKETPLACE] Using stored client credentials");
                Registration::Registered(ClientCredentials::new(id, secret))
            }
            _ => Registration::Unregistered,
        };

        Ok(Self {
            transport,
            instance,
            settings,
            base_url,
            registration,
        })
    }

    /// Returns true once client credentials are known.
    #[must_use]
    pub fn is_registered(&self) -> bool {
        self.registration.is_registered()
    }

    /// Returns the current registration state.
    #[must_use]
    pub fn registration(&self) -> &Registration {
        &self.registration
    }

    /// Returns the marketplace base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the transport.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns the settings store.
    #[must_use]
    pub fn settings(&self) -> &S {
        &self.settings
    }

    /// Returns the client credentials, if registered.
    #[must_use]
    pub fn credentials(&self) -> Option<&ClientCredentials> {
        self.registration.credentials()
    }

    /// Ensures the installation is registered, performing the handshake if needed.
    ///
    /// Issued credentials are kept for the lifetime of the manager even when
    /// they cannot be persisted; a persistence failure is only logged.
    pub fn handshake(&mut self) -> Result<ClientCredentials, MarketplaceError> {
        if let Registration::Registered(credentials) = &self.registration {
            return Ok(credentials.clone());
        }

        let credentials = self.request_credentials()?;
        self.registration = Registration::Registered(credentials.clone());

        if let Err(e) = self.persist_credentials(&credentials) {
            warn!("[MARKETPLACE] Failed to store client credentials: {}", e);
        }
        Ok(credentials)
    }

    /// Lists the add-ons offered by the marketplace, in catalog order.
    pub fn list_addons(&mut self) -> Result<Vec<AddonSummary>, MarketplaceError> {
        info!("[MARKETPLACE] Fetching add-on list");
        let url = self.resolve(ADDON_LIST_ENDPOINT)?;
        let response = self.authorized(HttpRequest::get(url))?;

        let body: serde_json::Value = response.json()?;
        match body {
            serde_json::Value::Array(items) => {
                info!("[MARKETPLACE] Received {} add-ons", items.len());
                Ok(items.into_iter().map(AddonSummary).collect())
            }
            other => Err(MarketplaceError::MalformedResponse(format!(
                "expected add-on array, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Fetches the description document of an add-on.
    ///
    /// `addon_ref` is the description URL from the catalog, absolute or
    /// relative to the base URL.
    pub fn addon_description(
        &mut self,
        addon_ref: &str,
    ) -> Result<serde_json::Value, MarketplaceError> {
        info!("[MARKETPLACE] Fetching add-on description: {}", addon_ref);
        let url = self.resolve(addon_ref)?;
        let response = self.authorized(HttpRequest::get(url))?;
        response.json()
    }

    /// Downloads an add-on file and returns it base64-encoded.
    pub fn addon_file(&mut self, addon_ref: &str) -> Result<EncodedAddonFile, MarketplaceError> {
        info!("[MARKETPLACE] Downloading add-on file: {}", addon_ref);
        let url = self.resolve(addon_ref)?;
        let response = self.authorized(HttpRequest::get(url))?;

        info!("[MARKETPLACE] Downloaded {} bytes", response.body.len());
        Ok(EncodedAddonFile::encode(&response.body))
    }

    /// Submits a purchase or trial request for an add-on.
    ///
    /// The instance id sent is always the configured one; any value in
    /// `request.instance_id` is ignored.
    pub fn submit_purchase(
        &mut self,
        request: &PurchaseRequest,
    ) -> Result<PurchaseOutcome, MarketplaceError> {
        if request.buy_addon_id.trim().is_empty() {
            return Err(MarketplaceError::InvalidUrl(
                "add-on id must not be empty".to_string(),
            ));
        }

        info!(
            "[MARKETPLACE] Submitting purchase request for add-on {}",
            request.buy_addon_id
        );
        let url = self.resolve(&purchase_endpoint(request.buy_addon_id.trim()))?;
        let instance_id = self.instance.instance_identifier()?;

        let http_request = HttpRequest::post(url)
            .field("instanceId", instance_id)
            .field("companyName", request.company_name.as_str())
            .field("contactEmail", request.contact_email.as_str())
            .field("contactNumber", request.contact_number.as_str());
        self.authorized(http_request)?;

        info!("[MARKETPLACE] Purchase request accepted");
        Ok(PurchaseOutcome::Success)
    }

    /// Exchanges the instance identity for client credentials.
    fn request_credentials(&self) -> Result<ClientCredentials, MarketplaceError> {
        info!("[MARKETPLACE] Performing handshake with marketplace");

        let instance_id = self.instance.instance_identifier()?;
        let checksum = self.instance.instance_identifier_checksum()?;
        let url = self.resolve(HANDSHAKE_ENDPOINT)?;

        let request = HttpRequest::post(url)
            .header("Accept", ACCEPT_JSON)
            .field("instanceId", instance_id)
            .field("checksum", checksum);
        let response = self.transport.send(&request)?;

        if !response.is_ok() {
            warn!("[MARKETPLACE] Handshake rejected: HTTP {}", response.status);
            return Err(MarketplaceError::HandshakeRequired {
                status: response.status,
            });
        }

        let credentials: ClientCredentials = response.json().map_err(|_| {
            MarketplaceError::MalformedResponse(
                "handshake response lacks clientId/clientSecret".to_string(),
            )
        })?;

        info!(
            "[MARKETPLACE] Handshake complete, client id {}",
            credentials.client_id
        );
        Ok(credentials)
    }

    fn persist_credentials(
        &mut self,
        credentials: &ClientCredentials,
    ) -> Result<(), MarketplaceError> {
        self.settings.set_client_id(&credentials.client_id)?;
        self.settings.set_client_secret(&credentials.client_secret)
    }

    /// Requests a fresh bearer token via the client-credentials grant.
    fn access_token(&mut self) -> Result<AccessToken, MarketplaceError> {
        let credentials = self.handshake()?;
        let url = self.resolve(TOKEN_ENDPOINT)?;

        let request = HttpRequest::post(url)
            .header("Accept", ACCEPT_JSON)
            .field("grant_type", GRANT_TYPE)
            .field("client_id", credentials.client_id)
            .field("client_secret", credentials.client_secret);
        let response = self.transport.send(&request)?;

        if !response.is_ok() {
            warn!("[MARKETPLACE] Token request failed: HTTP {}", response.status);
            return Err(MarketplaceError::UpstreamHttp {
                status: response.status,
            });
        }

        let token: TokenResponse = response.json().map_err(|_| {
            MarketplaceError::MalformedResponse("token response lacks access_token".to_string())
        })?;
        debug!("[MARKETPLACE] Access token acquired");
        Ok(AccessToken::new(token.access_token))
    }

    /// Sends a request carrying a fresh bearer token; anything but 200 is an error.
    fn authorized(&mut self, request: HttpRequest) -> Result<HttpResponse, MarketplaceError> {
        let token = self.access_token()?;
        let request = request
            .header("Accept", ACCEPT_JSON)
            .header("Authorization", token.authorization());

        let response = self.transport.send(&request)?;
        if !response.is_ok() {
            warn!(
                "[MARKETPLACE] {} returned HTTP {}",
                request.url.path(),
                response.status
            );
            return Err(MarketplaceError::UpstreamHttp {
                status: response.status,
            });
        }
        Ok(response)
    }

    /// Resolves an endpoint path or add-on reference against the base URL.
    fn resolve(&self, reference: &str) -> Result<Url, MarketplaceError> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(MarketplaceError::InvalidUrl(
                "empty add-on reference".to_string(),
            ));
        }
        self.base_url
            .join(reference)
            .map_err(|e| MarketplaceError::InvalidUrl(format!("{}: {}", reference, e)))
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

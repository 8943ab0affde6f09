//! Collaborator interfaces consumed by the marketplace client.
//!
//! The client never constructs these itself; callers inject them so tests can
//! substitute fakes.

use super::error::MarketplaceError;

/// Supplies the identity of this deployment.
pub trait InstanceConfig {
    /// Returns the instance identifier.
    fn instance_identifier(&self) -> Result<String, MarketplaceError>;

    /// Returns the checksum that authenticates the instance identifier.
    fn instance_identifier_checksum(&self) -> Result<String, MarketplaceError>;
}

/// Stores marketplace connection settings and issued client credentials.
pub trait MarketplaceSettings {
    /// Returns the marketplace base URL.
    fn base_url(&self) -> Result<String, MarketplaceError>;

    /// Stores the marketplace base URL.
    fn set_base_url(&mut self, base_url: &str) -> Result<(), MarketplaceError>;

    /// Returns the stored OAuth2 client id, if any.
    fn client_id(&self) -> Option<String>;

    /// Stores the OAuth2 client id.
    fn set_client_id(&mut self, client_id: &str) -> Result<(), MarketplaceError>;

    /// Returns the stored OAuth2 client secret, if any.
    fn client_secret(&self) -> Option<String>;

    /// Stores the OAuth2 client secret.
    fn set_client_secret(&mut self, client_secret: &str) -> Result<(), MarketplaceError>;
}

/// Fixed instance identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticInstance {
    identifier: String,
    checksum: String,
}

impl StaticInstance {
    /// Creates an identity from known values.
    #[must_use]
    pub fn new(identifier: impl Into<String>, checksum: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            checksum: checksum.into(),
        }
    }
}

impl InstanceConfig for StaticInstance {
    fn instance_identifier(&self) -> Result<String, MarketplaceError> {
        Ok(self.identifier.clone())
    }

    fn instance_identifier_checksum(&self) -> Result<String, MarketplaceError> {
        Ok(self.checksum.clone())
    }
}

/// Process-local settings store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemorySettings {
    base_url: String,
    client_id: Option<String>,
    client_secret: Option<String>,
}

impl MemorySettings {
    /// Creates a store with a base URL and no credentials.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client_id: None,
            client_secret: None,
        }
    }

    /// Pre-populates stored credentials.
    #[must_use]
    pub fn with_credentials(
        mut self,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        self.client_id = Some(client_id.into());
        self.client_secret = Some(client_secret.into());
        self
    }
}

impl MarketplaceSettings for MemorySettings {
    fn base_url(&self) -> Result<String, MarketplaceError> {
        if self.base_url.is_empty() {
            return Err(MarketplaceError::Settings(
                "marketplace base URL is not configured".to_string(),
            ));
        }
        Ok(self.base_url.clone())
    }

    fn set_base_url(&mut self, base_url: &str) -> Result<(), MarketplaceError> {
        self.base_url = base_url.to_string();
        Ok(())
    }

    fn client_id(&self) -> Option<String> {
        self.client_id.clone()
    }

    fn set_client_id(&mut self, client_id: &str) -> Result<(), MarketplaceError> {
        self.client_id = Some(client_id.to_string());
        Ok(())
    }

    fn client_secret(&self) -> Option<String> {
        self.client_secret.clone()
    }

    fn set_client_secret(&mut self, client_secret: &str) -> Result<(), MarketplaceError> {
        self.client_secret = Some(client_secret.to_string());
        Ok(())
    }
}

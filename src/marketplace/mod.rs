//! Marketplace add-on client.
//!
//! Talks to the remote add-on catalog on behalf of one installation.
//!
//! # Architecture
//!
//! - **types**: Values exchanged with the marketplace (`AddonSummary`, `PurchaseRequest`, ...)
//! - **error**: `MarketplaceError` taxonomy
//! - **transport**: `HttpTransport` seam and the blocking `reqwest` implementation
//! - **collaborators**: instance identity and settings store interfaces
//! - **client**: `ApiManager`, handshake + token + catalog calls
//! - **storage**: settings persisted in the configuration file
//!
//! # Usage
//!
//! ```no_run
//! use std::time::Duration;
//! use hrm_marketplace::marketplace::{ApiManager, ReqwestTransport, SettingsFile};
//!
//! let settings = SettingsFile::open("/etc/hrm/hrmrc")?;
//! let transport = ReqwestTransport::new(Duration::from_secs(30))?;
//! let mut manager = ApiManager::new(transport, settings.clone(), settings)?;
//! for addon in manager.list_addons()? {
//!     println!("{}", addon.as_json());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod client;
mod collaborators;
mod error;
mod storage;
mod transport;
mod types;

pub use client::ApiManager;
pub use collaborators::{InstanceConfig, MarketplaceSettings, MemorySettings, StaticInstance};
pub use error::MarketplaceError;
pub use storage::{
    DEFAULT_BASE_URL, KEY_BASE_URL, KEY_CLIENT_ID, KEY_CLIENT_SECRET, KEY_INSTANCE_CHECKSUM,
    KEY_INSTANCE_IDENTIFIER, SettingsFile,
};
pub use transport::{
    DEFAULT_TIMEOUT_SECS, HttpRequest, HttpResponse, HttpTransport, Method, ReqwestTransport,
};
pub use types::{
    ADDON_LIST_ENDPOINT, AccessToken, AddonSummary, ClientCredentials, EncodedAddonFile,
    GRANT_TYPE, HANDSHAKE_ENDPOINT, PurchaseOutcome, PurchaseRequest, Registration,
    TOKEN_ENDPOINT, purchase_endpoint,
};

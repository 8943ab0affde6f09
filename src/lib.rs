//! hrm-marketplace
//!
//! Marketplace add-on client for an HR management deployment.
//!
//! # Architecture
//!
//! - **Marketplace Module**: handshake, OAuth2 token acquisition and catalog calls
//! - **Config Module**: `.hrmrc` configuration file
//! - **Logging Module**: file logging with retention cleanup
//! - **CLI Module**: argument parsing for the `hrm-marketplace` binary
//!
//! # Usage
//!
//! ```no_run
//! use hrm_marketplace::marketplace::{ApiManager, MemorySettings, ReqwestTransport, StaticInstance};
//! use std::time::Duration;
//!
//! let transport = ReqwestTransport::new(Duration::from_secs(30))?;
//! let instance = StaticInstance::new("instance-id", "checksum");
//! let settings = MemorySettings::new("https://marketplace.example.com");
//! let mut manager = ApiManager::new(transport, instance, settings)?;
//! let addons = manager.list_addons()?;
//! # Ok::<(), hrm_marketplace::marketplace::MarketplaceError>(())
//! ```

// Clippy configuration - allow common patterns
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

pub mod cli;
pub mod config;
pub mod logging;
pub mod marketplace;

// Re-export main types
pub use config::Config;
pub use marketplace::{ApiManager, MarketplaceError};

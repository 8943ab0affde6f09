//! Marketplace error types.

use thiserror::Error;

/// Errors surfaced by marketplace operations.
///
/// None of these are fatal; callers decide whether to retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarketplaceError {
    /// Connection, DNS, timeout or body read failure.
    #[error("Network error: {0}")]
    Transport(String),

    /// Marketplace answered with a status other than 200.
    #[error("Marketplace returned HTTP {status}")]
    UpstreamHttp {
        /// HTTP status code.
        status: u16,
    },

    /// Handshake was rejected; the installation is still unregistered.
    #[error("Marketplace handshake required (handshake returned HTTP {status})")]
    HandshakeRequired {
        /// HTTP status code of the rejected handshake.
        status: u16,
    },

    /// Response body could not be decoded or lacked a required field.
    #[error("Malformed marketplace response: {0}")]
    MalformedResponse(String),

    /// Base URL or add-on reference is not a valid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A collaborator could not supply or persist a setting.
    #[error("Settings error: {0}")]
    Settings(String),
}

impl MarketplaceError {
    /// Returns true for connection-level failures.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Returns the upstream HTTP status, if the error carries one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::UpstreamHttp { status } | Self::HandshakeRequired { status } => Some(*status),
            _ => None,
        }
    }
}

impl From<std::io::Error> for MarketplaceError {
    fn from(err: std::io::Error) -> Self {
        Self::Settings(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            MarketplaceError::Transport("refused".to_string()).to_string(),
            "Network error: refused"
        );
        assert_eq!(
            MarketplaceError::UpstreamHttp { status: 503 }.to_string(),
            "Marketplace returned HTTP 503"
        );
    }

    #[test]
    fn test_status() {
        assert_eq!(MarketplaceError::UpstreamHttp { status: 404 }.status(), Some(404));
        assert_eq!(MarketplaceError::HandshakeRequired { status: 401 }.status(), Some(401));
        assert_eq!(MarketplaceError::Transport(String::new()).status(), None);
        assert!(MarketplaceError::Transport(String::new()).is_transport());
    }
}

//! Connection profiles.

use url::Url;

use crate::config::ConnectionConfig;
use crate::error::{GatewayError, Result};

/// Check that a base URL is absolute, http(s) and has a host.
pub fn validate_base_url(base_url: &str) -> std::result::Result<Url, String> {
    let trimmed = base_url.trim();
    if trimmed.is_empty() {
        return Err("base URL must not be empty".to_string());
    }

    let url = Url::parse(trimmed).map_err(|e| format!("invalid base URL '{}': {}", trimmed, e))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme '{}' in '{}'", url.scheme(), trimmed));
    }
    if url.host_str().is_none() {
        return Err(format!("base URL '{}' has no host", trimmed));
    }
    Ok(url)
}

/// A named gateway deployment: where to send requests and how to authenticate.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionProfile {
    name: String,
    base_url: Url,
    credential: String,
}

impl ConnectionProfile {
    /// Build a profile, rejecting empty or malformed base URLs.
    pub fn new(
        name: impl Into<String>,
        base_url: &str,
        credential: impl Into<String>,
    ) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(GatewayError::Configuration("connection name must not be empty".into()));
        }
        let base_url = validate_base_url(base_url)
            .map_err(|e| GatewayError::Configuration(format!("connection '{}': {}", name, e)))?;

        Ok(Self {
            name,
            base_url,
            credential: credential.into(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn credential(&self) -> &str {
        &self.credential
    }

    /// Join an endpoint path onto the base URL, keeping any base path prefix.
    pub fn endpoint_url(&self, endpoint: &str) -> Result<Url> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let endpoint = endpoint.trim_start_matches('/');
        let joined = format!("{}/{}", base, endpoint);

        Url::parse(&joined).map_err(|e| {
            GatewayError::Configuration(format!("invalid endpoint '{}': {}", endpoint, e))
        })
    }
}

impl TryFrom<&ConnectionConfig> for ConnectionProfile {
    type Error = GatewayError;

    fn try_from(config: &ConnectionConfig) -> Result<Self> {
        Self::new(config.name.clone(), &config.base_url, config.credential.clone())
    }
}

impl std::fmt::Debug for ConnectionProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionProfile")
            .field("name", &self.name)
            .field("base_url", &self.base_url.as_str())
            .field("credential", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_urls() {
        for bad in ["", "   ", "gateway.test", "/relative/path", "ftp://gateway.test"] {
            let err = ConnectionProfile::new("a", bad, "k").unwrap_err();
            assert!(matches!(err, GatewayError::Configuration(_)), "accepted {:?}", bad);
        }
    }

    #[test]
    fn test_endpoint_url_keeps_base_path() {
        let profile = ConnectionProfile::new("a", "https://x.test/api/", "k").unwrap();
        let url = profile.endpoint_url("/message/sendText/inst").unwrap();
        assert_eq!(url.as_str(), "https://x.test/api/message/sendText/inst");

        let profile = ConnectionProfile::new("b", "http://y.test:8080", "k").unwrap();
        let url = profile.endpoint_url("instance/fetchInstances").unwrap();
        assert_eq!(url.host_str(), Some("y.test"));
        assert_eq!(url.path(), "/instance/fetchInstances");
    }

    #[test]
    fn test_debug_redacts_credential() {
        let profile = ConnectionProfile::new("a", "https://x.test", "top-secret").unwrap();
        assert!(!format!("{:?}", profile).contains("top-secret"));
    }
}

//! Named connection profiles and the active pointer.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use arc_swap::ArcSwap;

use crate::config::ConnectionConfig;
use crate::connection::profile::ConnectionProfile;
use crate::error::{GatewayError, Result};

/// Registry of connection profiles keyed by name.
///
/// The active pointer is shared by everyone holding the registry: switching it
/// affects every subsequent call that does not name a connection, including
/// calls from other tasks. A request that resolved its profile before the
/// switch keeps using that profile.
pub struct ConnectionRegistry {
    profiles: RwLock<HashMap<String, Arc<ConnectionProfile>>>,
    active: ArcSwap<String>,
}

impl ConnectionRegistry {
    /// Create an empty registry whose active pointer starts at `default_name`.
    pub fn new(default_name: impl Into<String>) -> Self {
        Self {
            profiles: RwLock::new(HashMap::new()),
            active: ArcSwap::from_pointee(default_name.into()),
        }
    }

    /// Build a registry from configuration entries.
    pub fn from_config(connections: &[ConnectionConfig], default_name: &str) -> Result<Self> {
        let registry = Self::new(default_name);
        for conn in connections {
            registry.insert(ConnectionProfile::try_from(conn)?);
        }
        Ok(registry)
    }

    /// Insert or overwrite a profile.
    pub fn register(&self, name: &str, base_url: &str, credential: &str) -> Result<()> {
        let profile = ConnectionProfile::new(name, base_url, credential)?;
        self.insert(profile);
        Ok(())
    }

    /// Insert an already validated profile, replacing any profile of the same name.
    pub fn insert(&self, profile: ConnectionProfile) {
        let name = profile.name().to_string();
        let replaced = self
            .profiles
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(name.clone(), Arc::new(profile))
            .is_some();

        tracing::debug!(connection = %name, replaced, "Connection registered");
    }

    /// Remove a profile. The active pointer is left untouched.
    pub fn remove(&self, name: &str) -> Option<Arc<ConnectionProfile>> {
        self.profiles
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(name)
    }

    /// Point subsequent unnamed calls at `name`.
    pub fn set_active(&self, name: &str) -> Result<()> {
        if !self.contains(name) {
            return Err(GatewayError::UnknownConnection(name.to_string()));
        }
        let previous = self.active.swap(Arc::new(name.to_string()));
        tracing::info!(from = %previous, to = %name, "Active connection switched");
        Ok(())
    }

    /// Name the active pointer currently holds.
    pub fn active_name(&self) -> String {
        self.active.load().as_ref().clone()
    }

    /// Resolve an explicit name, or the active profile when none is given.
    ///
    /// An explicit name that is not registered fails; it never falls back to
    /// the active profile.
    pub fn resolve(&self, name: Option<&str>) -> Result<Arc<ConnectionProfile>> {
        let active = self.active.load_full();
        let wanted = name.unwrap_or(active.as_str());

        self.profiles
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(wanted)
            .cloned()
            .ok_or_else(|| GatewayError::UnknownConnection(wanted.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.profiles
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .profiles
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.profiles.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for ConnectionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionRegistry")
            .field("connections", &self.names())
            .field("active", &self.active_name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> ConnectionRegistry {
        let registry = ConnectionRegistry::new("a");
        registry.register("a", "https://a.test", "ka").unwrap();
        registry.register("b", "https://b.test", "kb").unwrap();
        registry
    }

    #[test]
    fn test_resolve_follows_active_pointer() {
        let registry = registry();
        assert_eq!(registry.resolve(None).unwrap().name(), "a");

        registry.set_active("b").unwrap();
        assert_eq!(registry.resolve(None).unwrap().name(), "b");
        assert_eq!(registry.active_name(), "b");
    }

    #[test]
    fn test_explicit_name_ignores_active_pointer() {
        let registry = registry();
        registry.set_active("b").unwrap();
        assert_eq!(registry.resolve(Some("a")).unwrap().name(), "a");
    }

    #[test]
    fn test_unknown_names_fail() {
        let registry = registry();
        let err = registry.resolve(Some("missing")).unwrap_err();
        assert!(matches!(err, GatewayError::UnknownConnection(ref n) if n == "missing"));

        let err = registry.set_active("missing").unwrap_err();
        assert!(matches!(err, GatewayError::UnknownConnection(_)));
        assert_eq!(registry.active_name(), "a");
    }

    #[test]
    fn test_unresolvable_default() {
        let registry = ConnectionRegistry::new("default");
        let err = registry.resolve(None).unwrap_err();
        assert!(matches!(err, GatewayError::UnknownConnection(ref n) if n == "default"));
    }

    #[test]
    fn test_register_overwrites() {
        let registry = registry();
        registry.register("a", "https://a2.test", "new").unwrap();

        let profile = registry.resolve(Some("a")).unwrap();
        assert_eq!(profile.base_url().host_str(), Some("a2.test"));
        assert_eq!(profile.credential(), "new");
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_register_rejects_invalid_url() {
        let registry = registry();
        let err = registry.register("c", "", "k").unwrap_err();
        assert!(matches!(err, GatewayError::Configuration(_)));
        assert!(!registry.contains("c"));
    }

    #[test]
    fn test_from_config() {
        let connections = vec![ConnectionConfig {
            name: "default".into(),
            base_url: "https://x.test".into(),
            credential: "k".into(),
        }];
        let registry = ConnectionRegistry::from_config(&connections, "default").unwrap();
        assert_eq!(registry.names(), vec!["default".to_string()]);
        assert_eq!(registry.resolve(None).unwrap().base_url().host_str(), Some("x.test"));
    }
}

//! Per-call options for the CRUD operations.

use crate::inflect;

/// Root key the wire payload is wrapped under.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RootKey {
    /// Use the resource name (`photos`, falling back to `photo` when unwrapping).
    #[default]
    ResourceName,
    /// Use a custom key. An empty key behaves like [`RootKey::ResourceName`].
    Named(String),
    /// Payloads are not wrapped at all.
    Disabled,
}

impl RootKey {
    pub fn resolve(&self, resource_name: &str) -> Option<String> {
        let key = match self {
            RootKey::Disabled => return None,
            RootKey::Named(key) if !key.is_empty() => key.as_str(),
            _ => resource_name,
        };
        (!key.is_empty()).then(|| key.to_string())
    }
}

/// Default wire path for a resource: `somePhotos` -> `some_photos`.
pub fn default_path(resource_name: &str) -> String {
    inflect::decamelize(resource_name)
}

/// Path override if non-empty, else [`default_path`]. `None` when both are empty.
pub fn resolve_path(resource_name: &str, path: Option<&str>) -> Option<String> {
    let path = match path {
        Some(path) if !path.is_empty() => path.to_string(),
        _ => default_path(resource_name),
    };
    (!path.is_empty()).then_some(path)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchOptions {
    pub key: RootKey,
    pub path: Option<String>,
    /// Replace the stored items instead of merging into them.
    pub replace: bool,
}

impl FetchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = RootKey::Named(key.into());
        self
    }

    pub fn without_key(mut self) -> Self {
        self.key = RootKey::Disabled;
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn replace(mut self) -> Self {
        self.replace = true;
        self
    }
}

/// Options for create, update and destroy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOptions {
    pub key: RootKey,
    pub path: Option<String>,
    /// When false the operation completes locally without a network call.
    pub persist: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            key: RootKey::ResourceName,
            path: None,
            persist: true,
        }
    }
}

impl WriteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Optimistic, local-only mode.
    pub fn local_only() -> Self {
        Self {
            persist: false,
            ..Self::default()
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = RootKey::Named(key.into());
        self
    }

    pub fn without_key(mut self) -> Self {
        self.key = RootKey::Disabled;
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn persist(mut self, persist: bool) -> Self {
        self.persist = persist;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_key_resolution() {
        assert_eq!(RootKey::ResourceName.resolve("somePhotos"), Some("somePhotos".into()));
        assert_eq!(RootKey::Named("photosBlarg".into()).resolve("photos"), Some("photosBlarg".into()));
        assert_eq!(RootKey::Named(String::new()).resolve("photos"), Some("photos".into()));
        assert_eq!(RootKey::Disabled.resolve("photos"), None);
        assert_eq!(RootKey::ResourceName.resolve(""), None);
    }

    #[test]
    fn test_path_resolution() {
        assert_eq!(resolve_path("somePhotos", None), Some("some_photos".into()));
        assert_eq!(resolve_path("photos", Some("images")), Some("images".into()));
        assert_eq!(resolve_path("photos", Some("")), Some("photos".into()));
        assert_eq!(resolve_path("", None), None);
        assert_eq!(resolve_path("", Some("images")), Some("images".into()));
    }

    #[test]
    fn test_write_options_default_persists() {
        assert!(WriteOptions::default().persist);
        assert!(!WriteOptions::local_only().persist);
        assert!(!WriteOptions::new().persist(false).persist);
    }
}

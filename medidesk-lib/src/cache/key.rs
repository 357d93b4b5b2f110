//! Cache keys

/// Identifies one cached read: a resource family plus optional serialized
/// filter parameters.
///
/// The family is the logical entity type ("patients", "appointments")
/// independent of filters. Invalidation is coarse-grained at the family
/// level: a write to "patients" invalidates every key whose family is
/// "patients", whatever its parameter suffix.
///
/// # Example
///
/// ```
/// use medidesk_lib::cache::ResourceKey;
///
/// let all = ResourceKey::new("patients");
/// let filtered = ResourceKey::new("patients").params("status=admitted");
///
/// assert_eq!(all.cache_key(), "patients");
/// assert_eq!(filtered.cache_key(), "patients?status=admitted");
/// assert_eq!(all.family(), filtered.family());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceKey {
    family: String,
    params: Option<String>,
}

impl ResourceKey {
    /// Creates a key for a whole resource family.
    pub fn new(family: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            params: None,
        }
    }

    /// Attaches serialized filter parameters to this key.
    pub fn params(mut self, params: impl Into<String>) -> Self {
        self.params = Some(params.into());
        self
    }

    /// Returns the resource family.
    pub fn family(&self) -> &str {
        &self.family
    }

    /// Returns the serialized parameters, if any.
    pub fn param_str(&self) -> Option<&str> {
        self.params.as_deref()
    }

    /// Returns the string form used as the cache map key.
    pub fn cache_key(&self) -> String {
        match &self.params {
            Some(params) => format!("{}?{}", self.family, params),
            None => self.family.clone(),
        }
    }

    /// Returns the family portion of a serialized cache key.
    pub(crate) fn family_of(cache_key: &str) -> &str {
        cache_key.split('?').next().unwrap_or(cache_key)
    }
}

impl From<&str> for ResourceKey {
    fn from(family: &str) -> Self {
        Self::new(family)
    }
}

impl std::fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.cache_key())
    }
}

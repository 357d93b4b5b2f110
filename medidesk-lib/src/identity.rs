//! Identity source for header injection

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

/// The roles the dashboard scopes navigation by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Reception,
    Doctor,
    Lab,
    Pharmacy,
    Patient,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Admin => "admin",
            Self::Reception => "reception",
            Self::Doctor => "doctor",
            Self::Lab => "lab",
            Self::Pharmacy => "pharmacy",
            Self::Patient => "patient",
        };
        f.write_str(name)
    }
}

/// The current signed-in principal.
///
/// Supplies the access token and tenant identifier injected into every
/// request. The permission list is a client-side convenience for hiding
/// navigation; it is not an authorization mechanism.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    /// Unique user id.
    pub id: Uuid,
    /// The role the dashboard scopes navigation by.
    pub role: Role,
    /// Tenant (facility) identifier sent with every request.
    pub tenant_id: String,
    /// Permission names checked client-side only.
    pub permissions: Vec<String>,
    /// Bearer token for the API.
    pub access_token: String,
}

impl Principal {
    /// Returns `true` if the principal carries the given permission.
    ///
    /// Client-side only; the server enforces its own rules.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }
}

/// Supplies the current principal to the client layer.
///
/// Returning `None` means no one is signed in; requests then proceed
/// unauthenticated.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Returns the current principal, if any.
    async fn principal(&self) -> Option<Principal>;
}

/// An identity provider that always returns the same principal.
///
/// Useful for tests and demo sessions with a fabricated token.
#[derive(Debug, Clone)]
pub struct StaticIdentity {
    principal: Principal,
}

impl StaticIdentity {
    /// Creates a provider wrapping the given principal.
    pub fn new(principal: Principal) -> Self {
        Self { principal }
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentity {
    async fn principal(&self) -> Option<Principal> {
        Some(self.principal.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_check_is_exact_match() {
        let principal = Principal {
            id: Uuid::new_v4(),
            role: Role::Reception,
            tenant_id: "clinic-01".to_string(),
            permissions: vec!["appointments:write".to_string()],
            access_token: "demo-token".to_string(),
        };
        assert!(principal.has_permission("appointments:write"));
        assert!(!principal.has_permission("appointments"));
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&Role::Pharmacy).unwrap();
        assert_eq!(json, "\"pharmacy\"");
    }
}

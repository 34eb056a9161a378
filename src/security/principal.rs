//! Claims-based user principal.

use serde::Serialize;

use crate::legacy::Principal;

/// Well-known claim type URIs.
pub mod claim_types {
    pub const NAME: &str = "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/name";
    pub const ROLE: &str = "http://schemas.microsoft.com/ws/2008/06/identity/claims/role";
}

/// A single statement about a subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Claim {
    pub claim_type: String,
    pub value: String,
}

impl Claim {
    pub fn new(claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            claim_type: claim_type.into(),
            value: value.into(),
        }
    }
}

/// A set of claims issued by one authentication mechanism.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClaimsIdentity {
    authentication_type: Option<String>,
    claims: Vec<Claim>,
}

impl ClaimsIdentity {
    pub fn new(authentication_type: Option<String>) -> Self {
        Self {
            authentication_type,
            claims: Vec::new(),
        }
    }

    pub fn with_claim(mut self, claim: Claim) -> Self {
        self.claims.push(claim);
        self
    }

    pub fn add_claim(&mut self, claim: Claim) {
        self.claims.push(claim);
    }

    pub fn authentication_type(&self) -> Option<&str> {
        self.authentication_type.as_deref()
    }

    /// An identity is authenticated once a mechanism vouched for it.
    pub fn is_authenticated(&self) -> bool {
        self.authentication_type.as_deref().is_some_and(|t| !t.is_empty())
    }

    pub fn name(&self) -> Option<&str> {
        self.find_first(claim_types::NAME)
    }

    pub fn claims(&self) -> &[Claim] {
        &self.claims
    }

    pub fn find_first(&self, claim_type: &str) -> Option<&str> {
        self.claims
            .iter()
            .find(|c| c.claim_type == claim_type)
            .map(|c| c.value.as_str())
    }
}

/// The user of a request in the new abstraction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClaimsPrincipal {
    identities: Vec<ClaimsIdentity>,
}

impl ClaimsPrincipal {
    pub fn new(identity: ClaimsIdentity) -> Self {
        Self {
            identities: vec![identity],
        }
    }

    /// Wrap a legacy principal.
    ///
    /// A principal that already is a claims principal is carried over as-is;
    /// anything else becomes one identity holding a name claim and one role
    /// claim per role.
    pub fn from_legacy(principal: &dyn Principal) -> Self {
        if let Some(claims) = principal.as_claims() {
            return claims.clone();
        }

        let mut identity =
            ClaimsIdentity::new(principal.authentication_type().map(str::to_string));
        if let Some(name) = principal.name() {
            identity.add_claim(Claim::new(claim_types::NAME, name));
        }
        for role in principal.roles() {
            identity.add_claim(Claim::new(claim_types::ROLE, role));
        }
        Self::new(identity)
    }

    pub fn add_identity(&mut self, identity: ClaimsIdentity) {
        self.identities.push(identity);
    }

    pub fn identities(&self) -> &[ClaimsIdentity] {
        &self.identities
    }

    /// First identity, the one legacy code treats as "the" identity.
    pub fn identity(&self) -> Option<&ClaimsIdentity> {
        self.identities.first()
    }

    pub fn claims(&self) -> impl Iterator<Item = &Claim> {
        self.identities.iter().flat_map(|i| i.claims.iter())
    }

    pub fn has_claim(&self, claim_type: &str, value: &str) -> bool {
        self.claims()
            .any(|c| c.claim_type == claim_type && c.value == value)
    }
}

impl Principal for ClaimsPrincipal {
    fn name(&self) -> Option<&str> {
        self.identity().and_then(ClaimsIdentity::name)
    }

    fn authentication_type(&self) -> Option<&str> {
        self.identity().and_then(ClaimsIdentity::authentication_type)
    }

    fn is_authenticated(&self) -> bool {
        self.identity().is_some_and(ClaimsIdentity::is_authenticated)
    }

    fn roles(&self) -> Vec<String> {
        self.claims()
            .filter(|c| c.claim_type == claim_types::ROLE)
            .map(|c| c.value.clone())
            .collect()
    }

    fn as_claims(&self) -> Option<&ClaimsPrincipal> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::legacy::GenericPrincipal;

    #[test]
    fn wraps_generic_principal() {
        let legacy = GenericPrincipal::new("alice", "Forms").with_roles(["admin"]);
        let wrapped = ClaimsPrincipal::from_legacy(&legacy);

        assert_eq!(wrapped.name(), Some("alice"));
        assert_eq!(wrapped.authentication_type(), Some("Forms"));
        assert!(wrapped.is_authenticated());
        assert!(wrapped.has_claim(claim_types::ROLE, "admin"));
        assert_eq!(wrapped.roles(), vec!["admin".to_string()]);
    }

    #[test]
    fn anonymous_legacy_principal_is_unauthenticated() {
        let wrapped = ClaimsPrincipal::from_legacy(&GenericPrincipal::default());
        assert!(!wrapped.is_authenticated());
        assert_eq!(wrapped.name(), None);
        assert_eq!(wrapped.identities().len(), 1);
    }

    #[test]
    fn claims_principal_is_carried_over() {
        let original = ClaimsPrincipal::new(
            ClaimsIdentity::new(Some("Bearer".into()))
                .with_claim(Claim::new(claim_types::NAME, "svc"))
                .with_claim(Claim::new("scope", "orders.read")),
        );
        let wrapped = ClaimsPrincipal::from_legacy(&original);
        assert_eq!(wrapped, original);
        assert!(wrapped.has_claim("scope", "orders.read"));
    }
}

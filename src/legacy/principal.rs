//! Legacy user identity.

use std::fmt;

use crate::security::ClaimsPrincipal;

/// User principal as seen by the legacy context.
pub trait Principal: Send + Sync + fmt::Debug {
    /// Identity name, if the user has one.
    fn name(&self) -> Option<&str>;

    /// Mechanism that authenticated the identity (e.g. `Forms`, `Negotiate`).
    fn authentication_type(&self) -> Option<&str>;

    fn is_authenticated(&self) -> bool;

    fn roles(&self) -> Vec<String>;

    /// Present when the principal already is a claims principal.
    fn as_claims(&self) -> Option<&ClaimsPrincipal> {
        None
    }

    fn is_in_role(&self, role: &str) -> bool {
        self.roles().iter().any(|r| r == role)
    }
}

/// Name plus role list, the plain legacy principal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenericPrincipal {
    name: String,
    authentication_type: String,
    roles: Vec<String>,
}

impl GenericPrincipal {
    pub fn new(name: impl Into<String>, authentication_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            authentication_type: authentication_type.into(),
            roles: Vec::new(),
        }
    }

    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles = roles.into_iter().map(Into::into).collect();
        self
    }
}

impl Principal for GenericPrincipal {
    fn name(&self) -> Option<&str> {
        Some(self.name.as_str()).filter(|n| !n.is_empty())
    }

    fn authentication_type(&self) -> Option<&str> {
        Some(self.authentication_type.as_str()).filter(|t| !t.is_empty())
    }

    fn is_authenticated(&self) -> bool {
        !self.name.is_empty()
    }

    fn roles(&self) -> Vec<String> {
        self.roles.clone()
    }
}

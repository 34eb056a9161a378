//! Authentication capability: the request user and the handler slot.

use std::fmt::Debug;
use std::sync::Arc;

use crate::features::LegacyFeatureCollection;
use crate::legacy::Principal;
use crate::security::ClaimsPrincipal;

/// An authentication mechanism registered for the request.
pub trait AuthenticationHandler: Debug + Send + Sync {
    fn authentication_scheme(&self) -> &str;
}

/// User and handler of the new abstraction.
pub trait HttpAuthenticationFeature {
    /// The legacy user as a claims principal. Repeated reads return the same
    /// instance until the user is reassigned.
    fn user(&self) -> Option<Arc<ClaimsPrincipal>>;

    /// Write through to the legacy user.
    fn set_user(&self, user: Option<ClaimsPrincipal>);

    fn handler(&self) -> Option<Arc<dyn AuthenticationHandler>>;
    fn set_handler(&self, handler: Option<Arc<dyn AuthenticationHandler>>);
}

impl HttpAuthenticationFeature for LegacyFeatureCollection {
    fn user(&self) -> Option<Arc<ClaimsPrincipal>> {
        if let Some(cached) = self.user.borrow().as_ref() {
            return Some(Arc::clone(cached));
        }

        let legacy = self.context.user()?;
        let wrapped = Arc::new(ClaimsPrincipal::from_legacy(legacy.as_ref()));
        *self.user.borrow_mut() = Some(Arc::clone(&wrapped));
        Some(wrapped)
    }

    fn set_user(&self, user: Option<ClaimsPrincipal>) {
        self.user.borrow_mut().take();
        tracing::debug!(
            authenticated = user.as_ref().is_some_and(|u| u.is_authenticated()),
            "replacing request user"
        );
        self.context
            .set_user(user.map(|u| Arc::new(u) as Arc<dyn Principal>));
    }

    fn handler(&self) -> Option<Arc<dyn AuthenticationHandler>> {
        self.handler.borrow().clone()
    }

    fn set_handler(&self, handler: Option<Arc<dyn AuthenticationHandler>>) {
        *self.handler.borrow_mut() = handler;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::legacy::{GenericPrincipal, LegacyContext, MemoryContext};
    use crate::security::{claim_types, Claim, ClaimsIdentity};

    #[derive(Debug)]
    struct Cookies;

    impl AuthenticationHandler for Cookies {
        fn authentication_scheme(&self) -> &str {
            "Cookies"
        }
    }

    fn with_user(user: Option<Arc<dyn Principal>>) -> (Arc<MemoryContext>, LegacyFeatureCollection) {
        let mut builder = MemoryContext::builder();
        if let Some(user) = user {
            builder = builder.user(user);
        }
        let context = Arc::new(builder.build());
        let features = LegacyFeatureCollection::new(context.clone());
        (context, features)
    }

    #[test]
    fn wrapped_user_is_cached() {
        let (_, f) = with_user(Some(Arc::new(GenericPrincipal::new("alice", "Forms"))));

        let first = f.user().unwrap();
        let second = f.user().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.name(), Some("alice"));
    }

    #[test]
    fn no_legacy_user_means_no_user() {
        let (_, f) = with_user(None);
        assert!(f.user().is_none());
    }

    #[test]
    fn assignment_writes_through_and_invalidates() {
        let (context, f) = with_user(Some(Arc::new(GenericPrincipal::new("alice", "Forms"))));
        let before = f.user().unwrap();

        let bob = ClaimsPrincipal::new(
            ClaimsIdentity::new(Some("Bearer".into())).with_claim(Claim::new(claim_types::NAME, "bob")),
        );
        f.set_user(Some(bob.clone()));

        assert_eq!(context.user().unwrap().name(), Some("bob"));
        let after = f.user().unwrap();
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(*after, bob);

        f.set_user(None);
        assert!(context.user().is_none());
        assert!(f.user().is_none());
    }

    #[test]
    fn handler_slot_round_trips() {
        let (_, f) = with_user(None);
        assert!(f.handler().is_none());

        f.set_handler(Some(Arc::new(Cookies)));
        assert_eq!(f.handler().unwrap().authentication_scheme(), "Cookies");

        f.set_handler(None);
        assert!(f.handler().is_none());
    }
}

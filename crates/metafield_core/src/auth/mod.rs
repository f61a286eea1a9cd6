//! Capability delegation for meta mutations.
//!
//! The crate never implements authentication; every mutation asks the host's
//! capability system through `Authorizer` and fails closed on a refusal.

use crate::model::entry::ObjectRef;

/// Mutation kind submitted to the host capability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetaAction {
    /// Adding or overwriting values for a key.
    Edit,
    /// Removing values for a key.
    Delete,
}

impl MetaAction {
    /// Stable string id used in capability lookups and error text.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Edit => "edit",
            Self::Delete => "delete",
        }
    }
}

/// Host capability check for one (action, object, key) triple.
///
/// Implementations are expected to be cheap and side-effect free; the
/// synchronizer consults them before every mutation with no caching.
pub trait Authorizer {
    fn allows(&self, action: MetaAction, object: &ObjectRef, key: &str) -> bool;
}

/// Authorizer that grants everything.
///
/// For embeddings that gate access before reaching this crate, and for tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl Authorizer for AllowAll {
    fn allows(&self, _action: MetaAction, _object: &ObjectRef, _key: &str) -> bool {
        true
    }
}

impl<F> Authorizer for F
where
    F: Fn(MetaAction, &ObjectRef, &str) -> bool,
{
    fn allows(&self, action: MetaAction, object: &ObjectRef, key: &str) -> bool {
        self(action, object, key)
    }
}

#[cfg(test)]
mod tests {
    use super::{AllowAll, Authorizer, MetaAction};
    use crate::model::entry::{ObjectRef, ObjectType};

    #[test]
    fn allow_all_grants_every_action() {
        let object = ObjectRef::new(ObjectType::Post, 1);
        assert!(AllowAll.allows(MetaAction::Edit, &object, "any"));
        assert!(AllowAll.allows(MetaAction::Delete, &object, "any"));
    }

    #[test]
    fn closures_act_as_authorizers() {
        let object = ObjectRef::new(ObjectType::Post, 1);
        let deny_deletes =
            |action: MetaAction, _object: &ObjectRef, _key: &str| action != MetaAction::Delete;
        assert!(deny_deletes.allows(MetaAction::Edit, &object, "k"));
        assert!(!deny_deletes.allows(MetaAction::Delete, &object, "k"));
    }

    #[test]
    fn action_string_ids_are_stable() {
        assert_eq!(MetaAction::Edit.as_str(), "edit");
        assert_eq!(MetaAction::Delete.as_str(), "delete");
    }
}

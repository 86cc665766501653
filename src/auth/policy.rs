//! Two-tier authorization: global superadmin vs per-workspace admin membership.
//!
//! Both predicates are pure. Loading the membership row is the caller's job, so
//! the decision itself never touches persistence or storage.

use thiserror::Error;
use uuid::Uuid;

use super::{Role, Session};
use crate::database::models::{WorkspaceRole, WorkspaceUser};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthorizationError {
    #[error("Not authenticated")]
    Unauthenticated,

    #[error("{0}")]
    Forbidden(String),
}

pub struct AuthorizationPolicy;

impl AuthorizationPolicy {
    pub fn is_superadmin(session: &Session) -> bool {
        session.role == Role::Superadmin
    }

    /// Membership-based; the global role plays no part here.
    pub fn is_workspace_admin(session: &Session, workspace_id: Uuid, membership: Option<&WorkspaceUser>) -> bool {
        match membership {
            Some(m) => m.user_id == session.user_id && m.workspace_id == workspace_id && m.role == WorkspaceRole::Admin,
            None => false,
        }
    }

    pub fn require_superadmin(session: &Session) -> Result<(), AuthorizationError> {
        if Self::is_superadmin(session) {
            Ok(())
        } else {
            Err(AuthorizationError::Forbidden("Not authorized".to_string()))
        }
    }

    pub fn require_workspace_admin(
        session: &Session,
        workspace_id: Uuid,
        membership: Option<&WorkspaceUser>,
        action: &str,
    ) -> Result<(), AuthorizationError> {
        if Self::is_workspace_admin(session, workspace_id, membership) {
            Ok(())
        } else {
            Err(AuthorizationError::Forbidden(format!(
                "You do not have permission to {} this workspace",
                action
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn membership(user_id: Uuid, workspace_id: Uuid, role: WorkspaceRole) -> WorkspaceUser {
        WorkspaceUser {
            workspace_id,
            user_id,
            role,
        }
    }

    #[test]
    fn only_superadmin_role_passes_global_tier() {
        let user = Session::new(Uuid::new_v4(), Role::User);
        let root = Session::new(Uuid::new_v4(), Role::Superadmin);

        assert!(AuthorizationPolicy::require_superadmin(&root).is_ok());
        assert_eq!(
            AuthorizationPolicy::require_superadmin(&user),
            Err(AuthorizationError::Forbidden("Not authorized".to_string()))
        );
    }

    #[test]
    fn workspace_admin_requires_admin_membership_of_that_workspace() {
        let session = Session::new(Uuid::new_v4(), Role::User);
        let ws = Uuid::new_v4();
        let other = Uuid::new_v4();

        let admin = membership(session.user_id, ws, WorkspaceRole::Admin);
        let member = membership(session.user_id, ws, WorkspaceRole::Member);
        let elsewhere = membership(session.user_id, other, WorkspaceRole::Admin);

        assert!(AuthorizationPolicy::is_workspace_admin(&session, ws, Some(&admin)));
        assert!(!AuthorizationPolicy::is_workspace_admin(&session, ws, Some(&member)));
        assert!(!AuthorizationPolicy::is_workspace_admin(&session, ws, Some(&elsewhere)));
        assert!(!AuthorizationPolicy::is_workspace_admin(&session, ws, None));
    }

    #[test]
    fn superadmin_role_does_not_grant_workspace_admin() {
        let root = Session::new(Uuid::new_v4(), Role::Superadmin);
        let ws = Uuid::new_v4();

        assert!(!AuthorizationPolicy::is_workspace_admin(&root, ws, None));
        let err = AuthorizationPolicy::require_workspace_admin(&root, ws, None, "update").unwrap_err();
        assert_eq!(err.to_string(), "You do not have permission to update this workspace");
    }

    #[test]
    fn membership_of_another_user_is_ignored() {
        let session = Session::new(Uuid::new_v4(), Role::User);
        let ws = Uuid::new_v4();
        let someone_else = membership(Uuid::new_v4(), ws, WorkspaceRole::Admin);

        assert!(!AuthorizationPolicy::is_workspace_admin(&session, ws, Some(&someone_else)));
    }
}

pub mod workspace;

pub use workspace::{Membership, NewWorkspace, Workspace, WorkspaceChanges, WorkspaceRole, WorkspaceUser};

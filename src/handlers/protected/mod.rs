// handlers/protected/mod.rs - JWT session required
//
// Route prefix: /api/* (except /api/admin/*)
// Workspace mutations here are authorized per workspace by admin membership;
// the global role grants nothing on this tier.
pub mod auth;
pub mod workspaces;

// handlers/mod.rs - three access tiers
//
// Public (no auth) → Protected (JWT session) → Elevated (superadmin session)
//
// Protected workspace routes are further gated per workspace by admin
// membership inside the service layer.
pub mod form;
pub mod public;
pub mod protected;
pub mod elevated;

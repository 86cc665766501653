// handlers/elevated/mod.rs - superadmin session required
//
// Route prefix: /api/admin/*
// Guarded by superadmin_middleware on top of JWT auth; every service call
// checks the role again.
pub mod admin;

pub mod config;
pub mod session;
pub mod token;
pub mod workspace;

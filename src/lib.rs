pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod invalidation;
pub mod middleware;
pub mod picker;
pub mod services;
pub mod storage;

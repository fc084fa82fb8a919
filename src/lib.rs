//! Numbers & Nostalgia: a server-rendered baseball history magazine backed by
//! a hosted structured-content store.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;

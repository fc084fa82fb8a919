//! Application services: queries, composition, rendering and search.

pub mod chrome;
pub mod error;
pub mod metadata;
pub mod queries;
pub mod render;
pub mod repos;
pub mod search;
pub mod site;

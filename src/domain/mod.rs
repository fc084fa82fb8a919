//! Domain layer types and invariants.

pub mod body;
pub mod dates;
pub mod entities;
pub mod error;
pub mod image;
pub mod slug;
pub mod toc;
pub mod types;
pub mod video;
mod wire;

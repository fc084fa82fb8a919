use thiserror::Error;

use super::slug::SlugError;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error(transparent)]
    Slug(#[from] SlugError),
    #[error("malformed asset reference `{reference}`")]
    AssetReference { reference: String },
    #[error("domain validation failed: {message}")]
    Validation { message: String },
}

impl DomainError {
    pub fn asset_reference(reference: impl Into<String>) -> Self {
        Self::AssetReference {
            reference: reference.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

//! Image URLs for assets the query did not dereference.

use tracing::debug;

use super::entities::AssetRef;
use super::error::DomainError;

const CDN_BASE: &str = "https://cdn.sanity.io/images";

/// Builds CDN URLs from asset document ids of the form
/// `image-<id>-<width>x<height>-<format>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUrlBuilder {
    project_id: String,
    dataset: String,
}

impl ImageUrlBuilder {
    pub fn new(project_id: impl Into<String>, dataset: impl Into<String>) -> Result<Self, DomainError> {
        let project_id = project_id.into();
        let dataset = dataset.into();
        if project_id.trim().is_empty() || dataset.trim().is_empty() {
            return Err(DomainError::validation(
                "image builder requires a project id and dataset",
            ));
        }
        Ok(Self {
            project_id,
            dataset,
        })
    }

    pub fn url_for_ref(&self, reference: &str) -> Result<String, DomainError> {
        let rest = reference
            .strip_prefix("image-")
            .ok_or_else(|| DomainError::asset_reference(reference))?;

        let mut parts = rest.rsplitn(3, '-');
        let (Some(format), Some(dimensions), Some(id)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(DomainError::asset_reference(reference));
        };

        let valid_dimensions = dimensions
            .split_once('x')
            .is_some_and(|(w, h)| is_digits(w) && is_digits(h));
        let valid_format = !format.is_empty() && format.chars().all(|ch| ch.is_ascii_alphanumeric());
        let valid_id = !id.is_empty() && id.chars().all(|ch| ch.is_ascii_alphanumeric());

        if !(valid_dimensions && valid_format && valid_id) {
            return Err(DomainError::asset_reference(reference));
        }

        Ok(format!(
            "{CDN_BASE}/{}/{}/{id}-{dimensions}.{format}",
            self.project_id, self.dataset
        ))
    }

    /// Prefer the resolved URL; otherwise build one from the document id.
    pub fn resolve(&self, asset: &AssetRef) -> Option<String> {
        if let Some(url) = asset.url() {
            return Some(url.to_string());
        }
        let reference = asset.document_ref()?;
        match self.url_for_ref(reference) {
            Ok(url) => Some(url),
            Err(err) => {
                debug!(
                    target = "nostalgia::domain::image",
                    error = %err,
                    "skipping image with unusable asset reference"
                );
                None
            }
        }
    }
}

fn is_digits(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|ch| ch.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> ImageUrlBuilder {
        ImageUrlBuilder::new("abc123", "production").expect("builder")
    }

    #[test]
    fn builds_cdn_url_from_reference() {
        let url = builder()
            .url_for_ref("image-Tb9Ew8CXIwaY6R1kjMvI0uRR-2000x3000-jpg")
            .expect("url");
        assert_eq!(
            url,
            "https://cdn.sanity.io/images/abc123/production/Tb9Ew8CXIwaY6R1kjMvI0uRR-2000x3000.jpg"
        );
    }

    #[test]
    fn rejects_malformed_references() {
        assert!(builder().url_for_ref("file-abc-pdf").is_err());
        assert!(builder().url_for_ref("image-abc-widexhigh-png").is_err());
        assert!(builder().url_for_ref("image-abc").is_err());
    }

    #[test]
    fn resolved_url_wins_over_reference() {
        let asset = AssetRef {
            url: Some("https://cdn.example/hero.png".to_string()),
            reference: Some("image-abc-10x10-png".to_string()),
        };
        assert_eq!(
            builder().resolve(&asset).as_deref(),
            Some("https://cdn.example/hero.png")
        );

        let missing = AssetRef::default();
        assert!(builder().resolve(&missing).is_none());
    }
}

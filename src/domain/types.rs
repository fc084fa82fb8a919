use serde::{Deserialize, Serialize};

/// Lifecycle state of an article. Only `Published` is ever shown to readers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleStatus {
    Published,
    Archived,
    #[default]
    #[serde(other)]
    Draft,
}

impl ArticleStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ArticleStatus::Draft => "draft",
            ArticleStatus::Published => "published",
            ArticleStatus::Archived => "archived",
        }
    }

    pub fn is_published(self) -> bool {
        matches!(self, ArticleStatus::Published)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CtaVariant {
    Destructive,
    Outline,
    Secondary,
    Ghost,
    Link,
    #[default]
    #[serde(other)]
    Default,
}

impl CtaVariant {
    pub fn as_str(self) -> &'static str {
        match self {
            CtaVariant::Default => "default",
            CtaVariant::Destructive => "destructive",
            CtaVariant::Outline => "outline",
            CtaVariant::Secondary => "secondary",
            CtaVariant::Ghost => "ghost",
            CtaVariant::Link => "link",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CtaSize {
    Sm,
    Lg,
    Icon,
    #[default]
    #[serde(other)]
    Default,
}

impl CtaSize {
    pub fn as_str(self) -> &'static str {
        match self {
            CtaSize::Default => "default",
            CtaSize::Sm => "sm",
            CtaSize::Lg => "lg",
            CtaSize::Icon => "icon",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalloutKind {
    Warning,
    Success,
    Error,
    #[default]
    #[serde(other)]
    Info,
}

impl CalloutKind {
    pub fn as_str(self) -> &'static str {
        match self {
            CalloutKind::Info => "info",
            CalloutKind::Warning => "warning",
            CalloutKind::Success => "success",
            CalloutKind::Error => "error",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            CalloutKind::Info => "💡",
            CalloutKind::Warning => "⚠️",
            CalloutKind::Success => "✅",
            CalloutKind::Error => "❌",
        }
    }
}

/// Paragraph style of a text block. Unrecognised styles render as paragraphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockStyle {
    H1,
    H2,
    H3,
    Blockquote,
    #[default]
    #[serde(other)]
    Normal,
}

impl BlockStyle {
    /// Heading level for outline-eligible styles.
    pub fn heading_level(self) -> Option<u8> {
        match self {
            BlockStyle::H1 => Some(1),
            BlockStyle::H2 => Some(2),
            BlockStyle::H3 => Some(3),
            BlockStyle::Normal | BlockStyle::Blockquote => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    Number,
    #[serde(other)]
    Bullet,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_variants_fall_back() {
        let variant: CtaVariant = serde_json::from_str("\"neon\"").expect("variant");
        assert_eq!(variant, CtaVariant::Default);

        let kind: CalloutKind = serde_json::from_str("\"tip\"").expect("kind");
        assert_eq!(kind, CalloutKind::Info);

        let style: BlockStyle = serde_json::from_str("\"h4\"").expect("style");
        assert_eq!(style, BlockStyle::Normal);
    }

    #[test]
    fn unknown_status_is_never_published() {
        let status: ArticleStatus = serde_json::from_str("\"scheduled\"").expect("status");
        assert!(!status.is_published());
        let status: ArticleStatus = serde_json::from_str("\"published\"").expect("status");
        assert!(status.is_published());
    }
}

//! Rich-body rendering to sanitised HTML fragments.

mod blocks;
pub(crate) mod html;
mod marks;
mod sanitize;

use std::collections::HashMap;

use tracing::debug;

use crate::domain::body::{Gallery, GalleryItem, RichBody};
use crate::domain::image::ImageUrlBuilder;
use crate::domain::toc::heading_anchors;

use self::blocks::{figure_video, gallery_image, render_block};
pub(crate) use self::sanitize::allowed_href;
use self::sanitize::build_body_sanitizer;

/// One rendered element, in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedBlock {
    pub key: Option<String>,
    pub kind: &'static str,
    pub html: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RenderedBody {
    pub blocks: Vec<RenderedBlock>,
}

impl RenderedBody {
    pub fn html(&self) -> String {
        self.blocks.iter().map(|block| block.html.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Pure renderer: the same body always yields the same fragments.
pub struct BodyRenderer {
    images: ImageUrlBuilder,
    sanitizer: ammonia::Builder<'static>,
}

impl BodyRenderer {
    pub fn new(images: ImageUrlBuilder) -> Self {
        Self {
            images,
            sanitizer: build_body_sanitizer(),
        }
    }

    pub fn render(&self, body: &RichBody) -> RenderedBody {
        let anchors: HashMap<usize, String> = heading_anchors(body)
            .into_iter()
            .map(|anchor| (anchor.block_index, anchor.id))
            .collect();

        let blocks = body
            .blocks()
            .iter()
            .enumerate()
            .filter_map(|(index, block)| {
                let anchor = anchors.get(&index).map(String::as_str);
                let Some(markup) = render_block(block, anchor, &self.images) else {
                    debug!(
                        target = "nostalgia::application::render",
                        index,
                        kind = block.kind(),
                        "skipping block without renderable payload"
                    );
                    return None;
                };
                Some(RenderedBlock {
                    key: block.key().map(str::to_string),
                    kind: block.kind(),
                    html: self.clean(&markup),
                })
            })
            .collect();

        RenderedBody { blocks }
    }

    pub fn render_gallery(&self, gallery: &Gallery) -> Vec<RenderedBlock> {
        gallery
            .items()
            .iter()
            .filter_map(|item| {
                let (key, kind, markup) = match item {
                    GalleryItem::GalleryImage {
                        key,
                        image,
                        caption,
                        alt,
                    } => (
                        key,
                        "galleryImage",
                        gallery_image(
                            image.as_ref(),
                            alt.as_deref(),
                            caption.as_deref(),
                            &self.images,
                        ),
                    ),
                    GalleryItem::GalleryVideo { key, url, caption } => (
                        key,
                        "galleryVideo",
                        url.as_deref()
                            .map(str::trim)
                            .filter(|url| !url.is_empty())
                            .map(|url| figure_video(url, caption.as_deref())),
                    ),
                    GalleryItem::Unknown => return None,
                };
                markup.map(|markup| RenderedBlock {
                    key: key.clone(),
                    kind,
                    html: self.clean(&markup),
                })
            })
            .collect()
    }

    fn clean(&self, markup: &str) -> String {
        self.sanitizer.clean(markup).to_string()
    }
}

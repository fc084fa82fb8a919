//! Markup for each block variant. Functions return `None` when the block lacks
//! the payload it needs, in which case it contributes nothing to the body.

use ammonia::clean_text;

use crate::domain::body::{
    BodyBlock, CalloutBlock, ImageBlock, InternalLinkBlock, TextBlock, VideoBlock,
};
use crate::domain::entities::{Cta, ImageRef};
use crate::domain::image::ImageUrlBuilder;
use crate::domain::types::{BlockStyle, ListKind};
use crate::domain::video::embed_url;

use super::html::escape_attribute;
use super::marks::render_inline;

const VIDEO_FALLBACK_TITLE: &str = "Video embed";

pub(crate) fn render_block(
    block: &BodyBlock,
    anchor: Option<&str>,
    images: &ImageUrlBuilder,
) -> Option<String> {
    match block {
        BodyBlock::Text(text) => Some(text_block(text, anchor)),
        BodyBlock::Image(image) => image_block(image, images),
        BodyBlock::Callout(callout) => callout_block(callout),
        BodyBlock::InternalLink(link) => internal_link_block(link),
        BodyBlock::Video(video) => video_block(video),
        BodyBlock::Cta(cta) => cta_block(cta),
        BodyBlock::Unknown => None,
    }
}

fn text_block(block: &TextBlock, anchor: Option<&str>) -> String {
    let inner = render_inline(block);

    if let Some(list) = block.list_item {
        let tag = match list {
            ListKind::Bullet => "ul",
            ListKind::Number => "ol",
        };
        return format!("<{tag}><li>{inner}</li></{tag}>");
    }

    match block.style {
        BlockStyle::H1 | BlockStyle::H2 | BlockStyle::H3 => {
            let level = block.style.heading_level().unwrap_or(2);
            match anchor {
                Some(id) => format!(
                    "<h{level} id=\"{}\">{inner}</h{level}>",
                    escape_attribute(id)
                ),
                None => format!("<h{level}>{inner}</h{level}>"),
            }
        }
        BlockStyle::Blockquote => format!("<blockquote>{inner}</blockquote>"),
        BlockStyle::Normal => format!("<p>{inner}</p>"),
    }
}

fn image_block(block: &ImageBlock, images: &ImageUrlBuilder) -> Option<String> {
    let src = images.resolve(block.asset.as_ref()?)?;
    Some(figure_image(
        &src,
        block.alt.as_deref(),
        block.caption.as_deref(),
    ))
}

pub(crate) fn figure_image(src: &str, alt: Option<&str>, caption: Option<&str>) -> String {
    let caption = non_blank(caption);
    let alt = non_blank(alt).or(caption).unwrap_or_default();

    let mut html = format!(
        "<figure class=\"body-image\"><img src=\"{}\" alt=\"{}\" loading=\"lazy\">",
        escape_attribute(src),
        escape_attribute(alt)
    );
    if let Some(caption) = caption {
        html.push_str(&format!("<figcaption>{}</figcaption>", clean_text(caption)));
    }
    html.push_str("</figure>");
    html
}

fn callout_block(block: &CalloutBlock) -> Option<String> {
    let content = non_blank(block.content.as_deref())?;
    let kind = block.kind;

    let mut html = format!(
        "<aside class=\"callout callout--{}\"><span class=\"callout__icon\" aria-hidden=\"true\">{}</span><div class=\"callout__body\">",
        kind.as_str(),
        kind.icon()
    );
    if let Some(title) = non_blank(block.title.as_deref()) {
        html.push_str(&format!("<h4>{}</h4>", clean_text(title)));
    }
    html.push_str(&format!("<p>{}</p></div></aside>", clean_text(content)));
    Some(html)
}

fn internal_link_block(block: &InternalLinkBlock) -> Option<String> {
    let target = block.reference.as_ref()?;
    let kind = non_blank(target.kind.as_deref())?;
    let slug = non_blank(Some(target.slug.as_str()))?;

    let text = non_blank(block.link_text.as_deref())
        .or(non_blank(target.title.as_deref()))
        .unwrap_or(slug);

    Some(format!(
        "<p class=\"internal-link\"><a href=\"/{}s/{}\">{}</a></p>",
        escape_attribute(kind),
        escape_attribute(slug),
        clean_text(text)
    ))
}

fn video_block(block: &VideoBlock) -> Option<String> {
    let url = non_blank(block.url.as_deref())?;
    Some(figure_video(url, block.caption.as_deref()))
}

pub(crate) fn figure_video(url: &str, caption: Option<&str>) -> String {
    let caption = non_blank(caption);
    let title = caption.unwrap_or(VIDEO_FALLBACK_TITLE);

    let mut html = format!(
        "<figure class=\"body-video\"><iframe src=\"{}\" title=\"{}\" allowfullscreen loading=\"lazy\"></iframe>",
        escape_attribute(&embed_url(url)),
        escape_attribute(title)
    );
    if let Some(caption) = caption {
        html.push_str(&format!("<figcaption>{}</figcaption>", clean_text(caption)));
    }
    html.push_str("</figure>");
    html
}

fn cta_block(cta: &Cta) -> Option<String> {
    let (text, href) = cta.target()?;
    Some(format!(
        "<div class=\"cta-block\"><a class=\"cta cta--{} cta--{}\" href=\"{}\">{}</a></div>",
        cta.variant.as_str(),
        cta.size.as_str(),
        escape_attribute(href),
        clean_text(text)
    ))
}

/// Gallery image payload, resolved to a URL.
pub(crate) fn gallery_image(
    image: Option<&ImageRef>,
    alt: Option<&str>,
    caption: Option<&str>,
    images: &ImageUrlBuilder,
) -> Option<String> {
    let image = image?;
    let src = images.resolve(image.asset.as_ref()?)?;
    let alt = non_blank(alt).or(non_blank(image.alt.as_deref()));
    let caption = non_blank(caption).or(non_blank(image.caption.as_deref()));
    Some(figure_image(&src, alt, caption))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

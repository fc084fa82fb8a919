use std::collections::HashSet;

use ammonia::Builder as AmmoniaBuilder;
use url::{ParseError, Url};

const URL_SCHEMES: [&str; 3] = ["http", "https", "mailto"];

/// Same scheme allow-list as body links, for hrefs that reach templates
/// without passing through the sanitizer. Relative references pass.
pub(crate) fn allowed_href(raw: &str) -> Option<&str> {
    let href = raw.trim();
    match Url::parse(href) {
        Ok(url) => URL_SCHEMES.contains(&url.scheme()).then_some(href),
        Err(ParseError::RelativeUrlWithoutBase) => Some(href),
        Err(_) => None,
    }
}

/// Allow-list for rendered body fragments. Only the markup the block
/// renderers emit survives; everything else is stripped.
pub(crate) fn build_body_sanitizer() -> AmmoniaBuilder<'static> {
    let mut builder = AmmoniaBuilder::default();

    let tags: HashSet<&'static str> = HashSet::from([
        "a",
        "aside",
        "blockquote",
        "br",
        "code",
        "div",
        "em",
        "figcaption",
        "figure",
        "h1",
        "h2",
        "h3",
        "h4",
        "iframe",
        "img",
        "li",
        "ol",
        "p",
        "s",
        "span",
        "strong",
        "u",
        "ul",
    ]);
    builder.tags(tags);

    let generic: HashSet<&'static str> = HashSet::from(["class", "id", "aria-hidden"]);
    builder.generic_attributes(generic);

    // Link rel values are emitted explicitly for new-tab links only.
    builder.link_rel(None);
    builder.add_tag_attributes("a", &["target", "rel"]);
    builder.add_tag_attributes("img", &["alt", "loading"]);
    builder.add_tag_attributes("iframe", &["src", "title", "allowfullscreen", "loading"]);

    builder.url_schemes(HashSet::from(URL_SCHEMES));

    builder
}

//! Embeddable forms of external video URLs.

use url::Url;

const EMBED_BASE: &str = "https://www.youtube.com/embed/";

/// Rewrite short-form (`youtu.be/<id>`) and watch-page (`youtube.com/watch?v=<id>`)
/// URLs into their embed form. Anything else is returned unchanged.
pub fn embed_url(raw: &str) -> String {
    let trimmed = raw.trim();
    let Ok(parsed) = Url::parse(trimmed) else {
        return trimmed.to_string();
    };

    match video_id(&parsed) {
        Some(id) => format!("{EMBED_BASE}{id}"),
        None => trimmed.to_string(),
    }
}

fn video_id(url: &Url) -> Option<String> {
    let host = url.host_str()?.trim_start_matches("www.");

    let id = match host {
        "youtu.be" => url.path_segments()?.next().map(str::to_string),
        "youtube.com" | "m.youtube.com" if url.path() == "/watch" => url
            .query_pairs()
            .find(|(key, _)| key == "v")
            .map(|(_, value)| value.into_owned()),
        _ => None,
    }?;

    let valid = !id.is_empty()
        && id
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_');
    valid.then_some(id)
}

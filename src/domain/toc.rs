//! Table-of-contents extraction from a rich body.
//!
//! Headings are h1/h2/h3 text blocks with non-blank text. Each h2 nests under
//! the most recent h1, each h3 under the most recent h2 (or, failing that, the
//! most recent h1); a new h1 closes the current h2. Headings with no eligible
//! parent are top level. Anchor ids come from [`heading_anchors`], which the
//! renderer also uses, so outline links and heading ids always agree.

use std::collections::HashMap;

use super::body::{BodyBlock, RichBody};
use super::slug::AnchorSlugger;

/// Anchor assigned to one heading block of a body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingAnchor {
    /// Index of the heading block within the body.
    pub block_index: usize,
    pub level: u8,
    pub text: String,
    pub id: String,
}

/// Assign anchor ids to every outline heading, in document order.
pub fn heading_anchors(body: &RichBody) -> Vec<HeadingAnchor> {
    let mut slugger = AnchorSlugger::new();
    let mut anchors = Vec::new();

    for (block_index, block) in body.blocks().iter().enumerate() {
        let BodyBlock::Text(text_block) = block else {
            continue;
        };
        let Some(level) = text_block.style.heading_level() else {
            continue;
        };
        let text = text_block.plain_text().trim().to_string();
        if text.is_empty() {
            continue;
        }
        let id = slugger.anchor_for(&text);
        anchors.push(HeadingAnchor {
            block_index,
            level,
            text,
            id,
        });
    }

    anchors
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    pub id: String,
    pub text: String,
    pub level: u8,
    pub children: Vec<TocEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableOfContents {
    entries: Vec<TocEntry>,
}

impl TableOfContents {
    pub fn extract(body: &RichBody) -> Self {
        Self::from_anchors(heading_anchors(body))
    }

    pub fn from_anchors(anchors: Vec<HeadingAnchor>) -> Self {
        let mut parents: Vec<Option<usize>> = Vec::with_capacity(anchors.len());
        let mut last_h1: Option<usize> = None;
        let mut last_h2: Option<usize> = None;

        for (index, anchor) in anchors.iter().enumerate() {
            let parent = match anchor.level {
                1 => {
                    last_h1 = Some(index);
                    last_h2 = None;
                    None
                }
                2 => {
                    last_h2 = Some(index);
                    last_h1
                }
                _ => last_h2.or(last_h1),
            };
            parents.push(parent);
        }

        let mut children: HashMap<Option<usize>, Vec<usize>> = HashMap::new();
        for (index, parent) in parents.iter().enumerate() {
            children.entry(*parent).or_default().push(index);
        }

        let entries = build_level(None, &anchors, &children);
        Self { entries }
    }

    pub fn entries(&self) -> &[TocEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Depth-first walk yielding `(depth, entry)` in document order.
    pub fn flatten(&self) -> Vec<(usize, &TocEntry)> {
        let mut out = Vec::new();
        walk(&self.entries, 0, &mut out);
        out
    }
}

fn build_level(
    parent: Option<usize>,
    anchors: &[HeadingAnchor],
    children: &HashMap<Option<usize>, Vec<usize>>,
) -> Vec<TocEntry> {
    children
        .get(&parent)
        .map(|indices| {
            indices
                .iter()
                .map(|&index| {
                    let anchor = &anchors[index];
                    TocEntry {
                        id: anchor.id.clone(),
                        text: anchor.text.clone(),
                        level: anchor.level,
                        children: build_level(Some(index), anchors, children),
                    }
                })
                .collect()
        })
        .unwrap_or_default()
}

fn walk<'a>(entries: &'a [TocEntry], depth: usize, out: &mut Vec<(usize, &'a TocEntry)>) {
    for entry in entries {
        out.push((depth, entry));
        walk(&entry.children, depth + 1, out);
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn body(headings: &[(&str, &str)]) -> RichBody {
        let blocks: Vec<_> = headings
            .iter()
            .map(|(style, text)| {
                json!({
                    "_type": "block",
                    "style": style,
                    "children": [{ "_type": "span", "text": text, "marks": [] }]
                })
            })
            .collect();
        serde_json::from_value(json!(blocks)).expect("body decodes")
    }

    fn shape(toc: &TableOfContents) -> Vec<(usize, String)> {
        toc.flatten()
            .into_iter()
            .map(|(depth, entry)| (depth, entry.id.clone()))
            .collect()
    }

    #[test]
    fn nests_headings_under_most_recent_parents() {
        let toc = TableOfContents::extract(&body(&[
            ("h1", "Early Years"),
            ("h2", "Baltimore"),
            ("h3", "St. Mary's"),
            ("normal", "He learned the game."),
            ("h2", "Boston"),
            ("h1", "New York"),
            ("h3", "The Called Shot"),
        ]));

        assert_eq!(
            shape(&toc),
            vec![
                (0, "early-years".to_string()),
                (1, "baltimore".to_string()),
                (2, "st-marys".to_string()),
                (1, "boston".to_string()),
                (0, "new-york".to_string()),
                (1, "the-called-shot".to_string()),
            ]
        );
    }

    #[test]
    fn headings_without_parents_are_top_level() {
        let toc = TableOfContents::extract(&body(&[
            ("h3", "Box Score"),
            ("h2", "Recap"),
            ("h3", "Pitching"),
        ]));

        assert_eq!(
            shape(&toc),
            vec![
                (0, "box-score".to_string()),
                (0, "recap".to_string()),
                (1, "pitching".to_string()),
            ]
        );
    }

    #[test]
    fn extraction_is_idempotent() {
        let body = body(&[("h1", "Game 7"), ("h2", "Game 7"), ("h2", "Aftermath")]);
        let first = TableOfContents::extract(&body);
        let second = TableOfContents::extract(&body);
        assert_eq!(first, second);
        assert_eq!(
            shape(&first),
            vec![
                (0, "game-7".to_string()),
                (1, "game-7-2".to_string()),
                (1, "aftermath".to_string()),
            ]
        );
    }

    #[test]
    fn body_without_headings_yields_empty_outline() {
        let toc = TableOfContents::extract(&body(&[("normal", "Just prose."), ("h2", "   ")]));
        assert!(toc.is_empty());
    }
}

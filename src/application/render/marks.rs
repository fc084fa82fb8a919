//! Inline rendering of spans and their marks.
//!
//! Marks shared by consecutive spans are opened once and nest the spans they
//! cover. For each span its marks are ordered by how far they continue into
//! the following spans (longest first), so the longest-running mark is the
//! outermost element.

use crate::domain::body::{MarkDef, Span, TextBlock};

use super::html::{escape_attribute, escape_span_text};

#[derive(Debug)]
enum Node {
    Text(String),
    Mark { mark: String, children: Vec<Node> },
}

struct Frame {
    mark: Option<String>,
    children: Vec<Node>,
}

/// Render the children of a text block to inline HTML.
pub(crate) fn render_inline(block: &TextBlock) -> String {
    let tree = build_tree(&block.children);
    let mut out = String::new();
    for node in &tree {
        write_node(node, block, &mut out);
    }
    out
}

fn build_tree(spans: &[Span]) -> Vec<Node> {
    let mut stack = vec![Frame {
        mark: None,
        children: Vec::new(),
    }];

    for (index, span) in spans.iter().enumerate() {
        let mut needed = marks_by_run_length(spans, index);

        let mut keep = 1;
        while keep < stack.len() {
            let open = stack[keep].mark.as_deref().unwrap_or_default();
            match needed.iter().position(|mark| mark == open) {
                Some(position) => {
                    needed.remove(position);
                    keep += 1;
                }
                None => break,
            }
        }

        while stack.len() > keep {
            close_frame(&mut stack);
        }

        for mark in needed {
            stack.push(Frame {
                mark: Some(mark),
                children: Vec::new(),
            });
        }

        if let Some(top) = stack.last_mut() {
            top.children.push(Node::Text(span.text.clone()));
        }
    }

    while stack.len() > 1 {
        close_frame(&mut stack);
    }

    stack.pop().map(|root| root.children).unwrap_or_default()
}

fn close_frame(stack: &mut Vec<Frame>) {
    let Some(frame) = stack.pop() else {
        return;
    };
    let node = Node::Mark {
        mark: frame.mark.unwrap_or_default(),
        children: frame.children,
    };
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
    }
}

fn marks_by_run_length(spans: &[Span], index: usize) -> Vec<String> {
    let mut marks: Vec<(usize, &String)> = spans[index]
        .marks
        .iter()
        .map(|mark| {
            let run = spans[index + 1..]
                .iter()
                .take_while(|sibling| sibling.marks.contains(mark))
                .count();
            (run, mark)
        })
        .collect();

    marks.sort_by(|(run_a, mark_a), (run_b, mark_b)| run_b.cmp(run_a).then(mark_a.cmp(mark_b)));
    marks.dedup_by(|(_, a), (_, b)| a == b);
    marks.into_iter().map(|(_, mark)| mark.clone()).collect()
}

fn write_node(node: &Node, block: &TextBlock, out: &mut String) {
    match node {
        Node::Text(text) => out.push_str(&escape_span_text(text)),
        Node::Mark { mark, children } => {
            let mut inner = String::new();
            for child in children {
                write_node(child, block, &mut inner);
            }
            wrap_mark(mark, block, &inner, out);
        }
    }
}

fn wrap_mark(mark: &str, block: &TextBlock, inner: &str, out: &mut String) {
    let tag = match mark {
        "strong" => Some("strong"),
        "em" => Some("em"),
        "code" => Some("code"),
        "underline" => Some("u"),
        "strike-through" => Some("s"),
        _ => None,
    };

    if let Some(tag) = tag {
        out.push_str(&format!("<{tag}>{inner}</{tag}>"));
        return;
    }

    match block.mark_def(mark) {
        Some(def) if def.kind == "link" => write_link(def, inner, out),
        _ => out.push_str(inner),
    }
}

fn write_link(def: &MarkDef, inner: &str, out: &mut String) {
    let Some(href) = def.href.as_deref().map(str::trim).filter(|href| !href.is_empty()) else {
        out.push_str(inner);
        return;
    };

    let href = escape_attribute(href);
    if def.blank {
        out.push_str(&format!(
            "<a href=\"{href}\" target=\"_blank\" rel=\"noopener noreferrer\">{inner}</a>"
        ));
    } else {
        out.push_str(&format!("<a href=\"{href}\">{inner}</a>"));
    }
}

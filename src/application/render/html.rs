use ammonia::clean_text;

/// Escape text for use inside a double-quoted attribute value.
pub(crate) fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\n' | '\r' | '\t' => escaped.push(' '),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Escape span text, turning embedded newlines into `<br>`.
pub(crate) fn escape_span_text(value: &str) -> String {
    value
        .split('\n')
        .map(clean_text)
        .collect::<Vec<_>>()
        .join("<br>")
}

#[cfg(test)]
mod tests {
    use super::super::sanitize::build_body_sanitizer;
    use super::*;

    #[test]
    fn attribute_escaping_flattens_whitespace() {
        assert_eq!(
            escape_attribute("\"Say it\"\n& <go>"),
            "&quot;Say it&quot; &amp; &lt;go&gt;"
        );
    }

    #[test]
    fn span_text_keeps_line_breaks() {
        assert_eq!(escape_span_text("Tinker\nto"), "Tinker<br>to");

        let cleaned = build_body_sanitizer()
            .clean(&format!("<p>{}</p>", escape_span_text("Evers to Chance\n1 < 2")))
            .to_string();
        assert_eq!(cleaned, "<p>Evers to Chance<br>1 &lt; 2</p>");
    }

    #[test]
    fn span_text_cannot_open_markup() {
        let escaped = escape_span_text("<script>alert('out')</script>");
        assert!(!escaped.contains('<'));
        assert!(!escaped.contains('\''));
    }
}

//! Minimal markdown-to-HTML substitution for the publication preview.
//!
//! Intentionally partial: bold, italic, two heading levels, blockquotes,
//! links, bullet and numbered list items, and line breaks. Anything else
//! passes through escaped. This mirrors what the preview pane needs, not a
//! full markdown engine.

use regex::Regex;

/// Render draft content for the preview pane.
pub fn render_preview(content: &str) -> String {
    let numbered = Regex::new(r"^\d+\.\s+(.*)$").unwrap();

    let mut lines = Vec::new();
    for line in content.lines() {
        let escaped = escape_html(line);
        let rendered = if let Some(rest) = escaped.strip_prefix("## ") {
            format!("<h2>{}</h2>", rest)
        } else if let Some(rest) = escaped.strip_prefix("# ") {
            format!("<h1>{}</h1>", rest)
        } else if let Some(rest) = escaped.strip_prefix("&gt; ") {
            format!("<blockquote>{}</blockquote>", rest)
        } else if let Some(rest) = escaped.strip_prefix("- ") {
            format!("<li>{}</li>", rest)
        } else if let Some(caps) = numbered.captures(&escaped) {
            format!("<li>{}</li>", &caps[1])
        } else if escaped.trim().is_empty() {
            "<br>".to_string()
        } else {
            format!("{}<br>", escaped)
        };
        lines.push(rendered);
    }

    apply_inline(&lines.join("\n"))
}

/// Bold before italic so `**x**` is not eaten as two italics; links last.
fn apply_inline(html: &str) -> String {
    let bold = Regex::new(r"\*\*(.+?)\*\*").unwrap();
    let italic = Regex::new(r"\*([^*]+)\*").unwrap();
    let link = Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").unwrap();

    let html = bold.replace_all(html, "<strong>$1</strong>");
    let html = italic.replace_all(&html, "<em>$1</em>");
    let html = link.replace_all(&html, r#"<a href="$2">$1</a>"#);
    html.into_owned()
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

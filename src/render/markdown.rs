//! Best-effort Confluence view HTML to Markdown conversion.

use regex::{Captures, Regex};
use serde::Serialize;
use std::sync::LazyLock;

use crate::source::Document;

// Compiled once on first use.
macro_rules! re {
    ($name:ident, $pattern:expr) => {
        static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($pattern).unwrap());
    };
}

re!(PRE, r"(?is)<pre[^>]*>(.*?)</pre>");
re!(CODE, r"(?is)<code[^>]*>(.*?)</code>");
re!(HEADING, r"(?is)<h([1-6])[^>]*>(.*?)</h[1-6]>");
re!(BOLD, r"(?is)<(?:strong|b)(?:\s[^>]*)?>(.*?)</(?:strong|b)>");
re!(ITALIC, r"(?is)<(?:em|i)(?:\s[^>]*)?>(.*?)</(?:em|i)>");
re!(LINK, r#"(?is)<a\s[^>]*?href="([^"]*)"[^>]*>(.*?)</a>"#);
re!(BREAK, r"(?i)<br\s*/?>");
re!(RULE, r"(?i)<hr[^>]*>");
re!(ITEM, r"(?is)<li(?:\s[^>]*)?>(.*?)</li>");
re!(LIST, r"(?i)</?(?:ul|ol)[^>]*>");
re!(PARAGRAPH, r"(?is)<p(?:\s[^>]*)?>(.*?)</p>");
re!(TAG, r"(?s)<[^>]+>");
re!(NUMERIC_ENTITY, r"&#(x[0-9a-fA-F]+|[0-9]+);");
re!(BLANK_LINES, r"\n{3,}");
re!(ROOT_LIST_ITEM, r"(?m)^( *)(- )");

const PLACEHOLDER: char = '\u{E000}';

/// Convert view HTML to Markdown.
pub fn html_to_markdown(html: &str) -> String {
    // Preformatted blocks are set aside so later passes leave them alone.
    let mut blocks: Vec<String> = Vec::new();
    let text = PRE.replace_all(html, |caps: &Captures| {
        let body = decode_entities(&TAG.replace_all(&caps[1], ""));
        blocks.push(format!("\n\n```\n{}\n```\n\n", body.trim_matches('\n')));
        format!("{}{}{}", PLACEHOLDER, blocks.len() - 1, PLACEHOLDER)
    });

    let text = CODE.replace_all(&text, "`$1`");
    let text = HEADING.replace_all(&text, |caps: &Captures| {
        let level: usize = caps[1].parse().unwrap_or(1);
        format!("\n\n{} {}\n\n", "#".repeat(level), caps[2].trim())
    });
    let text = BOLD.replace_all(&text, "**$1**");
    let text = ITALIC.replace_all(&text, "*$1*");
    let text = LINK.replace_all(&text, "[$2]($1)");
    let text = BREAK.replace_all(&text, "\n");
    let text = RULE.replace_all(&text, "\n\n---\n\n");
    let text = ITEM.replace_all(&text, |caps: &Captures| format!("\n- {}", caps[1].trim()));
    let text = LIST.replace_all(&text, "\n");
    let text = PARAGRAPH.replace_all(&text, "\n\n$1\n\n");
    let text = TAG.replace_all(&text, "");
    let mut text = decode_entities(&text);

    for (index, block) in blocks.iter().enumerate() {
        text = text.replace(&format!("{}{}{}", PLACEHOLDER, index, PLACEHOLDER), block);
    }

    let text: Vec<&str> = text.lines().map(str::trim_end).collect();
    BLANK_LINES
        .replace_all(&text.join("\n"), "\n\n")
        .trim()
        .to_string()
}

fn decode_entities(text: &str) -> String {
    let text = NUMERIC_ENTITY.replace_all(text, |caps: &Captures| {
        let code = &caps[1];
        let value = match code.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => code.parse().ok(),
        };
        value
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_else(|| caps[0].to_string())
    });

    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[derive(Serialize)]
struct FrontMatter<'a> {
    #[serde(skip_serializing_if = "str::is_empty")]
    space_name: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    space_key: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tags: Vec<String>,
}

/// YAML front matter block, or an empty string if there is nothing to say.
pub fn front_matter(document: &Document) -> String {
    let matter = FrontMatter {
        space_name: &document.space_name,
        space_key: &document.space_key,
        tags: document.labels.iter().map(|l| format!("#{}", l)).collect(),
    };

    match serde_yaml::to_string(&matter) {
        Ok(yaml) if yaml.trim() != "{}" => {
            let yaml = ROOT_LIST_ITEM.replace_all(yaml.trim(), "$1  $2");
            format!("---\n{}\n---\n", yaml)
        }
        Ok(_) => String::new(),
        Err(e) => {
            tracing::warn!("Could not build front matter for page {}: {}", document.id, e);
            String::new()
        }
    }
}

/// Full Markdown file content for a document.
pub fn render_document(document: &Document, include_breadcrumbs: bool) -> String {
    let mut out = front_matter(document);

    if include_breadcrumbs && !document.ancestors.is_empty() {
        out.push_str(&document.ancestors.join(" > "));
        out.push_str("\n\n");
    }

    out.push_str(&format!("# {}\n", document.title));

    let body = html_to_markdown(&document.body_html);
    if !body.is_empty() {
        out.push('\n');
        out.push_str(&body);
        out.push('\n');
    }

    out
}

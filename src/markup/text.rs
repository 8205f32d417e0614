//! Markup to plain text

use super::scanner::{Token, Tokenizer};

/// Elements whose content never contributes text
const NON_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// How source whitespace is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Whitespace {
    /// Runs of whitespace become one space, as a browser renders them.
    /// Line-break tags still produce newlines.
    Collapse,
    /// Source whitespace, including blank lines, is kept
    Preserve,
}

/// Reduce markup to plain text.
///
/// `<br>` becomes a newline, every other tag is removed, entities are
/// decoded (`&nbsp;` to a plain space) and the result is trimmed.
pub fn to_plain_text(markup: &str, whitespace: Whitespace) -> String {
    let mut out = String::with_capacity(markup.len());
    let mut skipping: Option<String> = None;

    for token in Tokenizer::new(markup) {
        match token {
            Token::Open(tag) => {
                if skipping.is_some() {
                    continue;
                }
                if tag.local_name() == "br" {
                    out.push('\n');
                } else if !tag.self_closing && NON_TEXT_ELEMENTS.contains(&tag.local_name()) {
                    skipping = Some(tag.name);
                }
            }
            Token::Close(tag) => {
                if skipping.as_deref() == Some(tag.name.as_str()) {
                    skipping = None;
                }
            }
            Token::Text(text) => {
                if skipping.is_some() {
                    continue;
                }
                let decoded = html_escape::decode_html_entities(text);
                match whitespace {
                    Whitespace::Collapse => push_collapsed(&mut out, &decoded),
                    Whitespace::Preserve => out.push_str(&decoded),
                }
            }
        }
    }

    let out = out.replace('\u{a0}', " ");
    match whitespace {
        Whitespace::Collapse => out
            .split('\n')
            .map(str::trim)
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string(),
        Whitespace::Preserve => out.replace("\r\n", "\n").trim().to_string(),
    }
}

fn push_collapsed(out: &mut String, text: &str) {
    for c in text.chars() {
        if c.is_ascii_whitespace() {
            if !out.is_empty() && !out.ends_with(' ') && !out.ends_with('\n') {
                out.push(' ');
            }
        } else {
            out.push(c);
        }
    }
}

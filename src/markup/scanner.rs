//! Tolerant tag stream over HTML/XML
//!
//! Wraps `quick_xml::Reader` with end-name checking off, so mismatched or
//! unclosed tags never fail. Every token carries its byte range in the source,
//! which lets callers slice out the original markup of an element.

use std::borrow::Cow;
use std::ops::Range;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Elements whose content is raw text rather than markup
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// End tags that implicitly close an open `<p>`
const PARAGRAPH_CONTAINERS: &[&str] = &[
    "body",
    "html",
    "div",
    "section",
    "article",
    "aside",
    "blockquote",
    "figure",
    "header",
    "footer",
    "main",
    "nav",
    "td",
    "th",
    "li",
    "dd",
    "dt",
];

/// A start or end tag
#[derive(Debug, Clone)]
pub struct Tag<'a> {
    /// Lowercased qualified name, e.g. `p` or `dc:title`
    pub name: String,
    start: BytesStart<'a>,
    pub self_closing: bool,
    /// Byte range of the whole tag in the source
    pub span: Range<usize>,
}

#[derive(Debug, Clone)]
pub enum Token<'a> {
    Text(&'a str),
    Open(Tag<'a>),
    Close(Tag<'a>),
}

impl<'a> Tag<'a> {
    /// Name without any namespace prefix
    pub fn local_name(&self) -> &str {
        self.name.rsplit(':').next().unwrap_or(&self.name)
    }

    /// Entity-decoded value of an attribute, matched case-insensitively by
    /// qualified name. Unquoted values and bare attributes are accepted.
    pub fn attr(&self, name: &str) -> Option<String> {
        self.start
            .html_attributes()
            .flatten()
            .find(|attr| attr.key.as_ref().eq_ignore_ascii_case(name.as_bytes()))
            .map(|attr| {
                let raw = String::from_utf8_lossy(&attr.value);
                html_escape::decode_html_entities(&raw).into_owned()
            })
    }
}

fn lowercase_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).to_ascii_lowercase()
}

fn xml_reader(input: &str) -> Reader<&[u8]> {
    let mut reader = Reader::from_str(input);
    reader.trim_text(false).check_end_names(false);
    reader
}

/// Forward-only tokenizer over markup
pub struct Tokenizer<'a> {
    src: &'a str,
    reader: Reader<&'a [u8]>,
    /// Offset of the reader's input within `src`
    base: usize,
    /// End of the last token in `src`
    cursor: usize,
    /// Set after a raw-text start tag; holds the element name
    raw_text: Option<String>,
    done: bool,
}

impl<'a> Tokenizer<'a> {
    pub fn new(src: &'a str) -> Self {
        let mut tokenizer = Self {
            src,
            reader: xml_reader(src),
            base: 0,
            cursor: 0,
            raw_text: None,
            done: false,
        };
        if src.starts_with('\u{feff}') {
            tokenizer.restart('\u{feff}'.len_utf8());
        }
        tokenizer
    }

    /// Continue reading from `at`, discarding the reader's state
    fn restart(&mut self, at: usize) {
        let src = self.src;
        self.reader = xml_reader(&src[at..]);
        self.base = at;
        self.cursor = at;
    }

    /// Content of a `<script>`/`<style>` element up to its end tag
    fn raw_text_token(&mut self, name: &str) -> Option<Token<'a>> {
        let src = self.src;
        let start = self.cursor;
        let rest = &src[start..];
        let end = rest
            .to_ascii_lowercase()
            .find(&format!("</{}", name))
            .unwrap_or(rest.len());
        self.restart(start + end);
        (end > 0).then(|| Token::Text(&rest[..end]))
    }

    fn open(&mut self, start_tag: BytesStart<'a>, span: Range<usize>, self_closing: bool) -> Token<'a> {
        let name = lowercase_name(start_tag.name().as_ref());

        // `a < b` and similar are text, not tags
        if !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
            let src = self.src;
            return Token::Text(&src[span]);
        }

        if !self_closing && RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
            self.raw_text = Some(name.clone());
        }
        Token::Open(Tag {
            name,
            start: start_tag,
            self_closing,
            span,
        })
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        loop {
            if self.done {
                return None;
            }

            if let Some(name) = self.raw_text.take() {
                if let Some(token) = self.raw_text_token(&name) {
                    return Some(token);
                }
                continue;
            }

            let src = self.src;
            let start = self.cursor;
            let event = match self.reader.read_event() {
                Ok(event) => event,
                Err(_) => {
                    // Truncated markup at the end of input; leftover text is kept
                    self.done = true;
                    let rest = &src[start..];
                    if rest.is_empty() || rest.starts_with('<') {
                        return None;
                    }
                    return Some(Token::Text(rest));
                }
            };
            let end = self.base + self.reader.buffer_position();

            match event {
                Event::Text(text) => {
                    // The reader's position may already include the next '<'
                    let end = start + text.len();
                    self.cursor = end;
                    if end > start {
                        return Some(Token::Text(&src[start..end]));
                    }
                }
                Event::CData(_) => {
                    self.cursor = end;
                    let inner = src[start..end]
                        .strip_prefix("<![CDATA[")
                        .and_then(|raw| raw.strip_suffix("]]>"))
                        .unwrap_or("");
                    if !inner.is_empty() {
                        return Some(Token::Text(inner));
                    }
                }
                Event::Start(tag) => {
                    self.cursor = end;
                    return Some(self.open(tag, start..end, false));
                }
                Event::Empty(tag) => {
                    self.cursor = end;
                    return Some(self.open(tag, start..end, true));
                }
                Event::End(tag) => {
                    self.cursor = end;
                    let name = lowercase_name(tag.name().as_ref());
                    return Some(Token::Close(Tag {
                        start: BytesStart::new(name.clone()),
                        name,
                        self_closing: false,
                        span: start..end,
                    }));
                }
                Event::Eof => {
                    self.done = true;
                    return None;
                }
                // Comments, declarations, processing instructions and doctypes
                _ => self.cursor = end,
            }
        }
    }
}

/// An element located in the source
#[derive(Debug, Clone)]
pub struct Element<'a> {
    pub tag: Tag<'a>,
    /// Markup between the start and end tags
    pub inner: &'a str,
    /// The element's full markup, end tag included
    pub outer: Cow<'a, str>,
}

impl<'a> Element<'a> {
    /// Element whose end tag is missing from the source; `end` is where it stops
    fn implicitly_closed(src: &'a str, tag: Tag<'a>, end: usize) -> Self {
        let outer = format!("{}</{}>", src[tag.span.start..end].trim_end(), tag.name);
        Self {
            inner: &src[tag.span.end..end],
            outer: Cow::Owned(outer),
            tag,
        }
    }
}

/// Every innermost element named `name`, in document order.
///
/// Elements that contain another element of the same name are skipped in
/// favour of the nested one. An open `<p>` is closed implicitly by the next
/// `<p>`, by the end tag of a block container, or by the end of input; other
/// elements still open at the end of input are dropped.
pub fn elements<'a>(src: &'a str, name: &str) -> Vec<Element<'a>> {
    struct Open<'a> {
        tag: Tag<'a>,
        has_nested: bool,
    }

    let implicit_close = name == "p";
    let mut stack: Vec<Open<'a>> = Vec::new();
    let mut found = Vec::new();

    for token in Tokenizer::new(src) {
        match token {
            Token::Open(tag) if tag.local_name() == name => {
                if implicit_close {
                    if let Some(open) = stack.pop() {
                        found.push(Element::implicitly_closed(src, open.tag, tag.span.start));
                    }
                }
                if tag.self_closing {
                    continue;
                }
                if let Some(parent) = stack.last_mut() {
                    parent.has_nested = true;
                }
                stack.push(Open {
                    tag,
                    has_nested: false,
                });
            }
            Token::Close(tag) if tag.local_name() == name => {
                if let Some(open) = stack.pop() {
                    if !open.has_nested {
                        found.push(Element {
                            inner: &src[open.tag.span.end..tag.span.start],
                            outer: Cow::Borrowed(&src[open.tag.span.start..tag.span.end]),
                            tag: open.tag,
                        });
                    }
                }
            }
            Token::Close(tag) if implicit_close && PARAGRAPH_CONTAINERS.contains(&tag.local_name()) => {
                if let Some(open) = stack.pop() {
                    found.push(Element::implicitly_closed(src, open.tag, tag.span.start));
                }
            }
            _ => {}
        }
    }

    if implicit_close {
        if let Some(open) = stack.pop() {
            found.push(Element::implicitly_closed(src, open.tag, src.len()));
        }
    }

    found
}

/// The first element (in start-tag order) whose name is one of `names`
pub fn first_element<'a>(src: &'a str, names: &[&str]) -> Option<Element<'a>> {
    let mut tokens = Tokenizer::new(src);

    let open = tokens.find_map(|token| match token {
        Token::Open(tag) if names.contains(&tag.local_name()) => Some(tag),
        _ => None,
    })?;

    if open.self_closing {
        return Some(Element {
            inner: "",
            outer: Cow::Borrowed(&src[open.span.clone()]),
            tag: open,
        });
    }

    let mut depth = 0usize;
    for token in tokens {
        match token {
            Token::Open(tag) if tag.name == open.name && !tag.self_closing => depth += 1,
            Token::Close(tag) if tag.name == open.name => {
                if depth == 0 {
                    return Some(Element {
                        inner: &src[open.span.end..tag.span.start],
                        outer: Cow::Borrowed(&src[open.span.start..tag.span.end]),
                        tag: open,
                    });
                }
                depth -= 1;
            }
            _ => {}
        }
    }

    // Unterminated: the element runs to the end of input
    Some(Element {
        inner: &src[open.span.end..],
        outer: Cow::Borrowed(&src[open.span.start..]),
        tag: open,
    })
}

/// Start tags named `name`, in document order
pub fn start_tags<'a>(src: &'a str, name: &'a str) -> impl Iterator<Item = Tag<'a>> + 'a {
    Tokenizer::new(src).filter_map(move |token| match token {
        Token::Open(tag) if tag.local_name() == name => Some(tag),
        _ => None,
    })
}

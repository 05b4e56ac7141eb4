//! HTML post-processing: pretty-printing and preset-based validation.
//!
//! Both functions are pure text transforms over rendered markup. The
//! pretty-printer re-indents tag soup without changing content; the
//! validator reports rule violations with source lines and never mutates
//! its input. Neither is correctness-critical for the build: a failed
//! tidy falls back to the raw render, and lint findings are advisory.

use crate::config::Preset;
use regex::Regex;
use std::sync::LazyLock;

use anyhow::{Result, bail};

/// Matches comments, doctype/processing declarations and element tags.
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<!--.*?-->|<![^>]*>|</?[a-zA-Z][a-zA-Z0-9-]*(?:"[^"]*"|'[^']*'|[^>"'])*>"#)
        .expect("tag regex")
});

static ID_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\bid\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+))"#).expect("id regex")
});

static ALT_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\balt\s*=").expect("alt regex"));

static HREF_ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bhref\s*=").expect("href regex"));

/// Elements with no closing tag
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose content is emitted verbatim (no re-indentation)
const RAW_ELEMENTS: &[&str] = &["pre", "script", "style", "textarea"];

/// Elements obsolete in current HTML, flagged by the strict preset
const DEPRECATED_ELEMENTS: &[&str] = &["big", "center", "font", "marquee", "strike", "tt"];

const INDENT: &str = "  ";

// ============================================================================
// Tag scanning
// ============================================================================

#[derive(Debug)]
struct Tag<'a> {
    /// Full tag text including angle brackets
    text: &'a str,
    /// Lowercased element name; empty for comments/declarations
    name: String,
    closing: bool,
    self_closing: bool,
    start: usize,
    end: usize,
}

impl Tag<'_> {
    fn is_markup_decl(&self) -> bool {
        self.name.is_empty()
    }

    fn is_void(&self) -> bool {
        VOID_ELEMENTS.contains(&self.name.as_str())
    }
}

fn scan_tags(html: &str) -> Vec<Tag<'_>> {
    TAG_RE
        .find_iter(html)
        .map(|m| {
            let text = m.as_str();
            let (name, closing) = if text.starts_with("<!") {
                (String::new(), false)
            } else {
                let closing = text.starts_with("</");
                let rest = &text[if closing { 2 } else { 1 }..];
                let name: String = rest
                    .chars()
                    .take_while(|c| c.is_ascii_alphanumeric() || *c == '-')
                    .collect();
                (name.to_ascii_lowercase(), closing)
            };
            Tag {
                text,
                name,
                closing,
                self_closing: text.ends_with("/>"),
                start: m.start(),
                end: m.end(),
            }
        })
        .collect()
}

/// 1-based line number of a byte offset.
fn line_of(html: &str, offset: usize) -> usize {
    html[..offset].matches('\n').count() + 1
}

// ============================================================================
// Pretty printer
// ============================================================================

/// Re-indent rendered markup, one tag or text run per line.
///
/// Content of `<pre>`, `<script>`, `<style>` and `<textarea>` is kept
/// verbatim. Fails on a closing tag that does not match the innermost open
/// element; callers treat that as advisory and keep the raw render.
pub fn pretty_print(html: &str) -> Result<String> {
    let tags = scan_tags(html);
    let mut out = String::with_capacity(html.len() + html.len() / 4);
    let mut stack: Vec<&str> = Vec::new();
    let mut cursor = 0;
    // Set while inside a raw element; holds its name
    let mut raw_until: Option<String> = None;

    let push_line = |out: &mut String, depth: usize, text: &str| {
        for _ in 0..depth {
            out.push_str(INDENT);
        }
        out.push_str(text);
        out.push('\n');
    };

    for tag in &tags {
        let text_before = &html[cursor..tag.start];

        if let Some(raw_name) = &raw_until {
            if tag.closing && &tag.name == raw_name {
                // Verbatim body, then the closing tag on its own line
                out.push_str(text_before);
                if !text_before.ends_with('\n') && !text_before.is_empty() {
                    out.push('\n');
                }
                stack.pop();
                push_line(&mut out, stack.len(), tag.text);
                raw_until = None;
            } else {
                // Anything else inside a raw element is body text
                out.push_str(text_before);
                out.push_str(tag.text);
            }
            cursor = tag.end;
            continue;
        }

        let trimmed = text_before.trim();
        if !trimmed.is_empty() {
            push_line(&mut out, stack.len(), trimmed);
        }
        cursor = tag.end;

        if tag.is_markup_decl() {
            push_line(&mut out, stack.len(), tag.text);
            continue;
        }

        if tag.closing {
            match stack.last() {
                Some(open) if *open == tag.name => {
                    stack.pop();
                    push_line(&mut out, stack.len(), tag.text);
                }
                Some(open) => bail!(
                    "line {}: unexpected `</{}>`, expected `</{}>`",
                    line_of(html, tag.start),
                    tag.name,
                    open
                ),
                None => bail!(
                    "line {}: stray closing tag `</{}>`",
                    line_of(html, tag.start),
                    tag.name
                ),
            }
            continue;
        }

        push_line(&mut out, stack.len(), tag.text);
        if !tag.self_closing && !tag.is_void() {
            if RAW_ELEMENTS.contains(&tag.name.as_str()) {
                raw_until = Some(tag.name.clone());
            }
            stack.push(tag.name.as_str());
        }
    }

    if let Some(open) = stack.last() {
        bail!("unclosed element `<{open}>`");
    }

    let tail = html[cursor..].trim();
    if !tail.is_empty() {
        push_line(&mut out, 0, tail);
    }

    Ok(out)
}

// ============================================================================
// Validation
// ============================================================================

/// One validation finding, tied to a source line of the checked markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub line: usize,
    pub message: String,
}

impl Violation {
    fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// Validate markup against the preset's ruleset.
///
/// The baseline (`standard`) ruleset checks structural soundness: stray or
/// mismatched closing tags, elements left open at the end of the document,
/// and duplicate `id` attributes. The `strict` preset adds content rules:
/// images without `alt`, anchors without `href`, and obsolete elements.
pub fn validate(html: &str, preset: Preset) -> Vec<Violation> {
    let tags = scan_tags(html);
    let mut violations = Vec::new();
    let mut stack: Vec<(String, usize)> = Vec::new();
    let mut seen_ids: Vec<String> = Vec::new();

    for tag in &tags {
        let line = line_of(html, tag.start);

        if tag.is_markup_decl() {
            continue;
        }

        if tag.closing {
            if let Some(pos) = stack.iter().rposition(|(name, _)| *name == tag.name) {
                // Everything above the match was left open
                for (name, open_line) in stack.drain(pos + 1..) {
                    violations.push(Violation::new(
                        open_line,
                        format!("element `<{name}>` is never closed"),
                    ));
                }
                stack.pop();
            } else {
                violations.push(Violation::new(
                    line,
                    format!("stray closing tag `</{}>`", tag.name),
                ));
            }
            continue;
        }

        if let Some(id) = extract_id(tag.text) {
            if seen_ids.contains(&id) {
                violations.push(Violation::new(line, format!("duplicate id `{id}`")));
            } else {
                seen_ids.push(id);
            }
        }

        if preset == Preset::Strict {
            if tag.name == "img" && !ALT_ATTR_RE.is_match(tag.text) {
                violations.push(Violation::new(line, "`<img>` without `alt` attribute"));
            }
            if tag.name == "a" && !HREF_ATTR_RE.is_match(tag.text) {
                violations.push(Violation::new(line, "`<a>` without `href` attribute"));
            }
            if DEPRECATED_ELEMENTS.contains(&tag.name.as_str()) {
                violations.push(Violation::new(
                    line,
                    format!("obsolete element `<{}>`", tag.name),
                ));
            }
        }

        if !tag.self_closing && !tag.is_void() {
            stack.push((tag.name.clone(), line));
        }
    }

    for (name, open_line) in stack {
        violations.push(Violation::new(
            open_line,
            format!("element `<{name}>` is never closed"),
        ));
    }

    violations.sort_by_key(|v| v.line);
    violations
}

fn extract_id(tag_text: &str) -> Option<String> {
    ID_ATTR_RE.captures(tag_text).map(|caps| {
        caps.get(1)
            .or_else(|| caps.get(2))
            .or_else(|| caps.get(3))
            .map_or_else(String::new, |m| m.as_str().to_owned())
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pretty_print_indents_nested() {
        let out = pretty_print("<div><p>hi</p></div>").unwrap();
        assert_eq!(out, "<div>\n  <p>\n    hi\n  </p>\n</div>\n");
    }

    #[test]
    fn test_pretty_print_void_elements() {
        let out = pretty_print("<div><br><img src=\"x.png\"></div>").unwrap();
        assert!(out.contains("<br>"));
        // void elements do not open a level
        assert_eq!(out.matches("  <img").count(), 1);
    }

    #[test]
    fn test_pretty_print_keeps_raw_content() {
        let html = "<pre>a\n   b</pre>";
        let out = pretty_print(html).unwrap();
        assert!(out.contains("a\n   b"));
    }

    #[test]
    fn test_pretty_print_mismatch_errors() {
        assert!(pretty_print("<div><p></div>").is_err());
        assert!(pretty_print("</p>").is_err());
        assert!(pretty_print("<div>").is_err());
    }

    #[test]
    fn test_pretty_print_doctype_and_comment() {
        let out = pretty_print("<!DOCTYPE html><!-- note --><p>x</p>").unwrap();
        assert!(out.starts_with("<!DOCTYPE html>\n"));
        assert!(out.contains("<!-- note -->"));
    }

    #[test]
    fn test_validate_clean_markup() {
        let html = "<div>\n<p id=\"a\">hi</p>\n</div>";
        assert!(validate(html, Preset::Standard).is_empty());
        assert!(validate(html, Preset::Strict).is_empty());
    }

    #[test]
    fn test_validate_baseline_structure() {
        let html = "<div>\n<p>hi\n</div>\n</span>";
        let violations = validate(html, Preset::Standard);

        assert!(
            violations
                .iter()
                .any(|v| v.line == 2 && v.message.contains("never closed"))
        );
        assert!(
            violations
                .iter()
                .any(|v| v.line == 4 && v.message.contains("stray closing tag"))
        );
    }

    #[test]
    fn test_validate_duplicate_id() {
        let html = "<p id=\"x\"></p>\n<p id=\"x\"></p>";
        let violations = validate(html, Preset::Standard);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].line, 2);
        assert!(violations[0].message.contains("duplicate id `x`"));
    }

    #[test]
    fn test_strict_only_rules() {
        let html = "<img src=\"x.png\">\n<a>here</a>\n<center>old</center>";

        assert!(validate(html, Preset::Standard).is_empty());

        let violations = validate(html, Preset::Strict);
        assert!(violations.iter().any(|v| v.message.contains("alt")));
        assert!(violations.iter().any(|v| v.message.contains("href")));
        assert!(violations.iter().any(|v| v.message.contains("obsolete")));
    }

    #[test]
    fn test_extract_id_quoting_styles() {
        assert_eq!(extract_id("<p id=\"a\">"), Some("a".into()));
        assert_eq!(extract_id("<p id='b'>"), Some("b".into()));
        assert_eq!(extract_id("<p id=c>"), Some("c".into()));
        assert_eq!(extract_id("<p class=\"id\">"), None);
    }
}

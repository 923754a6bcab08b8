//! Internal, external, anchor and interwiki link parsing, plus the
//! inline pass that collapses link markup to display text.

use crate::document::Link;
use crate::lang::{CATEGORY_PREFIXES, FILE_PREFIXES, INTERWIKI_PREFIXES};
use crate::scanner;

/// Canonical internal target: trimmed, underscores as spaces, first
/// character uppercased.
pub fn canonical_page(target: &str) -> String {
    let spaced = target.trim().replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Parse the inner text of a `[[…]]` construct (file and category links
/// are classified upstream and never reach this). `suffix` is the
/// trailing lowercase run glued onto `]]`, when any.
pub fn parse_internal(inner: &str, suffix: Option<&str>) -> Link {
    let (target, display) = match split_pipe(inner) {
        Some((target, display)) => (target, Some(display)),
        None => (inner, None),
    };
    let target = target.trim();
    // A leading colon escapes namespace handling: `[[:Category:X]]` is a
    // link to the category page.
    let target = target.strip_prefix(':').unwrap_or(target);

    if let Some(anchor) = target.strip_prefix('#') {
        let text = display
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .unwrap_or(anchor)
            .to_string();
        return Link::Anchor {
            anchor: anchor.to_string(),
            text,
        };
    }

    if let Some((prefix, rest)) = target.split_once(':') {
        let wiki = prefix.trim().to_lowercase();
        if INTERWIKI_PREFIXES.contains(wiki.as_str()) {
            let page = rest.trim().to_string();
            let text = display
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .unwrap_or(rest.trim())
                .to_string();
            return Link::Interwiki { wiki, page, text };
        }
    }

    let (page_part, anchor) = match target.split_once('#') {
        Some((page, anchor)) => (page, Some(anchor.trim().to_string())),
        None => (target, None),
    };
    let page = canonical_page(page_part);

    let base_text = match display.map(str::trim) {
        Some("") => pipe_trick(&page),
        Some(display) => display.to_string(),
        None => page.clone(),
    };
    let text = match suffix {
        Some(suffix) => format!("{}{}", base_text, suffix),
        None => base_text,
    };

    Link::Internal {
        page,
        anchor,
        text,
        suffix: suffix.map(str::to_string),
    }
}

/// Parse the inner text of an external `[url display]` link.
pub fn parse_external(inner: &str) -> Link {
    let inner = inner.trim();
    match inner.split_once(char::is_whitespace) {
        Some((url, display)) => Link::External {
            url: url.to_string(),
            text: Some(display.trim().to_string()).filter(|d| !d.is_empty()),
        },
        None => Link::External {
            url: inner.to_string(),
            text: None,
        },
    }
}

/// `[[Page (thing)|]]` renders as `Page`: strip one trailing
/// parenthetical, or a namespace prefix.
fn pipe_trick(page: &str) -> String {
    if let Some(open) = page.rfind(" (") {
        if page.ends_with(')') {
            return page[..open].to_string();
        }
    }
    match page.split_once(':') {
        Some((_, rest)) => rest.trim().to_string(),
        None => page.to_string(),
    }
}

/// First `|` at zero bracket/brace depth.
fn split_pipe(inner: &str) -> Option<(&str, &str)> {
    let bytes = inner.as_bytes();
    let mut bracket = 0usize;
    let mut brace = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i..].starts_with(b"[[") {
            bracket += 1;
            i += 2;
        } else if bytes[i..].starts_with(b"]]") {
            bracket = bracket.saturating_sub(1);
            i += 2;
        } else if bytes[i..].starts_with(b"{{") {
            brace += 1;
            i += 2;
        } else if bytes[i..].starts_with(b"}}") {
            brace = brace.saturating_sub(1);
            i += 2;
        } else {
            if bytes[i] == b'|' && bracket == 0 && brace == 0 {
                return Some((&inner[..i], &inner[i + 1..]));
            }
            i += 1;
        }
    }
    None
}

fn link_prefix_kind(inner: &str) -> LinkPrefix {
    if let Some((prefix, _)) = inner.split_once(':') {
        let prefix = prefix.trim().trim_start_matches(':').to_lowercase();
        if FILE_PREFIXES.contains(prefix.as_str()) {
            return LinkPrefix::File;
        }
        if CATEGORY_PREFIXES.contains(prefix.as_str()) {
            return LinkPrefix::Category;
        }
    }
    LinkPrefix::Plain
}

enum LinkPrefix {
    Plain,
    File,
    Category,
}

/// Collapse every link construct in `text` to its display text.
/// Returns the cleaned text plus each link with its byte span in the
/// cleaned text. File and category links encountered here are removed
/// outright (the builder extracts them in earlier passes).
pub fn collapse_with_spans(text: &str) -> (String, Vec<(Link, (usize, usize))>) {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut links = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i..].starts_with(b"[[") {
            if let Some(end) = scanner::bracket_span(bytes, i) {
                let inner = &text[i + 2..end - 2];
                match link_prefix_kind(inner) {
                    LinkPrefix::File | LinkPrefix::Category => {
                        i = end;
                        continue;
                    }
                    LinkPrefix::Plain => {}
                }
                // Trailing lowercase suffix glues onto the display text.
                let mut suffix_end = end;
                while suffix_end < bytes.len() && bytes[suffix_end].is_ascii_lowercase() {
                    suffix_end += 1;
                }
                let suffix = (suffix_end > end).then(|| &text[end..suffix_end]);
                let link = parse_internal(inner, suffix);
                let display_start = out.len();
                out.push_str(link.display_text());
                links.push((link, (display_start, out.len())));
                i = suffix_end;
                continue;
            }
            out.push_str("[[");
            i += 2;
            continue;
        }
        if bytes[i] == b'[' {
            if let Some(end) = scanner::external_span(bytes, i) {
                let link = parse_external(&text[i + 1..end - 1]);
                let display_start = out.len();
                out.push_str(link.display_text());
                links.push((link, (display_start, out.len())));
                i = end;
                continue;
            }
        }
        // Advance one whole character.
        let step = text[i..].chars().next().map(char::len_utf8).unwrap_or(1);
        out.push_str(&text[i..i + step]);
        i += step;
    }

    (out, links)
}

/// Collapse variant for callers that do not need spans.
pub fn collapse_links(text: &str) -> (String, Vec<Link>) {
    let (clean, links) = collapse_with_spans(text);
    (clean, links.into_iter().map(|(l, _)| l).collect())
}

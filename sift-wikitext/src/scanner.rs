//! Single-pass marker scanner.
//!
//! One left-to-right pass over the input emits an ordered list of
//! [`Marker`]s for every special construct; the bytes between markers are
//! plain text. All delimiters are ASCII, so byte offsets are always valid
//! UTF-8 boundaries. Unbalanced or truncated constructs emit no marker and
//! fall through as plain text; the scanner never fails.

use crate::lang::{CATEGORY_PREFIXES, FILE_PREFIXES, REDIRECT_RE};

/// Bound on how far a comment is scanned for its close tag before the
/// comment is taken to extend to the end of input.
const COMMENT_SCAN_LIMIT: usize = 3_000;

/// Nested tables and templates are abandoned past this depth.
pub const MAX_NEST_DEPTH: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefForm {
    Inline,
    Named,
    SelfClosing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerKind {
    Comment,
    Template,
    Link,
    FileLink,
    CategoryLink,
    ExternalLink,
    Ref(RefForm),
    Heading { depth: u8 },
    Redirect,
}

/// A recognised construct spanning `start..end` (byte offsets, end
/// exclusive, delimiters included).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    pub kind: MarkerKind,
    pub start: usize,
    pub end: usize,
}

impl Marker {
    /// The marker's bytes, delimiters included.
    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..self.end]
    }
}

/// Scan `text` and return its markers in source order.
pub fn scan(text: &str) -> Vec<Marker> {
    let bytes = text.as_bytes();
    let mut markers = Vec::new();
    let mut i = 0;

    if let Some(m) = REDIRECT_RE.find(text) {
        // The directive plus its balanced target link form one marker.
        let link_start = m.end() - 2;
        if let Some(link_end) = scan_brackets(bytes, link_start) {
            markers.push(Marker {
                kind: MarkerKind::Redirect,
                start: 0,
                end: link_end,
            });
            i = link_end;
        }
    }

    while i < bytes.len() {
        let at_line_start = i == 0 || bytes[i - 1] == b'\n';
        match bytes[i] {
            b'<' if bytes[i..].starts_with(b"<!--") => {
                let end = scan_comment(bytes, i);
                markers.push(Marker {
                    kind: MarkerKind::Comment,
                    start: i,
                    end,
                });
                i = end;
            }
            b'<' if starts_with_ignore_case(&bytes[i..], b"<ref")
                && matches!(bytes.get(i + 4), Some(b' ' | b'>' | b'/' | b'\t')) =>
            {
                match scan_ref(text, i) {
                    Some((end, form)) => {
                        markers.push(Marker {
                            kind: MarkerKind::Ref(form),
                            start: i,
                            end,
                        });
                        i = end;
                    }
                    None => i += 1,
                }
            }
            b'{' if bytes[i..].starts_with(b"{{") => match scan_braces(bytes, i) {
                Some(end) => {
                    markers.push(Marker {
                        kind: MarkerKind::Template,
                        start: i,
                        end,
                    });
                    i = end;
                }
                None => i += 2,
            },
            b'[' if bytes[i..].starts_with(b"[[") => match scan_brackets(bytes, i) {
                Some(end) => {
                    let kind = classify_bracket_link(&text[i + 2..end - 2]);
                    markers.push(Marker {
                        kind,
                        start: i,
                        end,
                    });
                    i = end;
                }
                None => i += 2,
            },
            b'[' if is_external_link_start(&bytes[i + 1..]) => match scan_external(bytes, i) {
                Some(end) => {
                    markers.push(Marker {
                        kind: MarkerKind::ExternalLink,
                        start: i,
                        end,
                    });
                    i = end;
                }
                None => i += 1,
            },
            b'=' if at_line_start => match scan_heading(bytes, i) {
                Some((end, depth)) => {
                    markers.push(Marker {
                        kind: MarkerKind::Heading { depth },
                        start: i,
                        end,
                    });
                    i = end;
                }
                None => i += 1,
            },
            _ => i += 1,
        }
    }

    markers
}

fn starts_with_ignore_case(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.len() >= needle.len()
        && haystack
            .iter()
            .zip(needle)
            .all(|(a, b)| a.eq_ignore_ascii_case(b))
}

/// `<!-- … -->`, close tag searched within [`COMMENT_SCAN_LIMIT`] bytes.
/// An unclosed comment extends to the end of input.
fn scan_comment(bytes: &[u8], start: usize) -> usize {
    let body = start + 4;
    let limit = (body + COMMENT_SCAN_LIMIT).min(bytes.len());
    let mut i = body;
    while i + 3 <= limit {
        if bytes[i] == b'-' && bytes[i + 1] == b'-' && bytes[i + 2] == b'>' {
            return i + 3;
        }
        i += 1;
    }
    bytes.len()
}

/// Balanced scan shared by `{{…}}` and `[[…]]`. Both depths are tracked
/// because the two classes nest mutually; the scope closes when the
/// opening class returns to depth zero while the other class is also
/// balanced. A `}}` or `]]` with nothing open is inert text.
fn scan_nested(bytes: &[u8], start: usize, close_on_brace: bool) -> Option<usize> {
    let mut brace = 0usize;
    let mut bracket = 0usize;
    let mut i = start;
    while i < bytes.len() {
        if bytes[i..].starts_with(b"<!--") {
            i = scan_comment(bytes, i);
        } else if bytes[i..].starts_with(b"{{") {
            brace += 1;
            if brace > MAX_NEST_DEPTH * 4 {
                return None;
            }
            i += 2;
        } else if bytes[i..].starts_with(b"}}") {
            brace = brace.saturating_sub(1);
            i += 2;
            if close_on_brace && brace == 0 && bracket == 0 {
                return Some(i);
            }
        } else if bytes[i..].starts_with(b"[[") {
            bracket += 1;
            if bracket > MAX_NEST_DEPTH * 4 {
                return None;
            }
            i += 2;
        } else if bytes[i..].starts_with(b"]]") {
            bracket = bracket.saturating_sub(1);
            i += 2;
            if !close_on_brace && bracket == 0 && brace == 0 {
                return Some(i);
            }
        } else {
            i += 1;
        }
    }
    None
}

fn scan_braces(bytes: &[u8], start: usize) -> Option<usize> {
    scan_nested(bytes, start, true)
}

/// End of the balanced `{{…}}` span opening at `start`, for callers
/// outside the scanner (the template evaluator re-scans spliced text).
pub(crate) fn template_span(bytes: &[u8], start: usize) -> Option<usize> {
    scan_braces(bytes, start)
}

/// End of the balanced `[[…]]` span opening at `start`.
pub(crate) fn bracket_span(bytes: &[u8], start: usize) -> Option<usize> {
    scan_brackets(bytes, start)
}

/// End of a `[…]` external link opening at `start`, when the bracket is
/// followed by a recognised scheme.
pub(crate) fn external_span(bytes: &[u8], start: usize) -> Option<usize> {
    if is_external_link_start(&bytes[start + 1..]) {
        scan_external(bytes, start)
    } else {
        None
    }
}

fn scan_brackets(bytes: &[u8], start: usize) -> Option<usize> {
    scan_nested(bytes, start, false)
}

/// Classify the inner text of a `[[…]]` construct by its namespace prefix.
fn classify_bracket_link(inner: &str) -> MarkerKind {
    if let Some((prefix, _)) = inner.split_once(':') {
        let prefix = prefix.trim().trim_start_matches(':').to_lowercase();
        if FILE_PREFIXES.contains(prefix.as_str()) {
            return MarkerKind::FileLink;
        }
        if CATEGORY_PREFIXES.contains(prefix.as_str()) {
            return MarkerKind::CategoryLink;
        }
    }
    MarkerKind::Link
}

/// External links are attempted only on a recognised scheme, which keeps
/// prose like `arr[0]` out of the marker stream.
fn is_external_link_start(rest: &[u8]) -> bool {
    const SCHEMES: [&[u8]; 4] = [b"http://", b"https://", b"ftp://", b"mailto:"];
    SCHEMES.iter().any(|s| starts_with_ignore_case(rest, s))
}

/// `[scheme://… display]` — single brackets, no nesting, no newlines.
fn scan_external(bytes: &[u8], start: usize) -> Option<usize> {
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b']' => return Some(i + 1),
            b'\n' => return None,
            _ => i += 1,
        }
    }
    None
}

/// `=={2,6} title ={2,6}` on its own line. Depth is
/// `min(open, close).min(6) - 2`; a single `=` pair is the page title
/// form and never a section heading.
fn scan_heading(bytes: &[u8], start: usize) -> Option<(usize, u8)> {
    let mut open = 0usize;
    let mut i = start;
    while i < bytes.len() && bytes[i] == b'=' {
        open += 1;
        i += 1;
    }
    if open < 2 {
        return None;
    }

    let line_end = bytes[i..]
        .iter()
        .position(|&b| b == b'\n')
        .map(|p| i + p)
        .unwrap_or(bytes.len());

    // Trailing whitespace after the closing run is tolerated.
    let mut content_end = line_end;
    while content_end > i && bytes[content_end - 1].is_ascii_whitespace() {
        content_end -= 1;
    }
    let mut close = 0usize;
    while content_end > i && bytes[content_end - 1] == b'=' {
        close += 1;
        content_end -= 1;
    }
    if close < 2 || content_end <= i {
        return None;
    }

    let depth = open.min(close).min(6) as u8 - 2;
    Some((line_end, depth))
}

/// `<ref>…</ref>`, `<ref name=x>…</ref>` or `<ref … />`.
fn scan_ref(text: &str, start: usize) -> Option<(usize, RefForm)> {
    let bytes = text.as_bytes();
    let mut i = start + 4;
    // Attribute region up to the first '>'.
    while i < bytes.len() && bytes[i] != b'>' {
        i += 1;
    }
    if i >= bytes.len() {
        return None;
    }
    let has_name = text[start + 4..i].to_ascii_lowercase().contains("name");
    if bytes[i - 1] == b'/' {
        return Some((i + 1, RefForm::SelfClosing));
    }
    // Closing tag, case-insensitive.
    let mut j = i + 1;
    while j + 6 <= bytes.len() {
        if starts_with_ignore_case(&bytes[j..], b"</ref>") {
            let form = if has_name {
                RefForm::Named
            } else {
                RefForm::Inline
            };
            return Some((j + 6, form));
        }
        j += 1;
    }
    None
}

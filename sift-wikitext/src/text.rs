//! Inline text helpers shared by the builder, infobox and table passes.

use regex::Regex;
use std::sync::LazyLock;

/// Parentheses left holding only separators after link/template removal.
static EMPTY_PARENS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([,;: ]*\)").expect("paren pattern"));

/// Strip `''`/`'''` quote markup, returning the cleaned text plus the
/// inner text of the first bold and first italic span.
pub(crate) fn strip_quotes(text: &str) -> (String, Option<String>, Option<String>) {
    let mut out = String::with_capacity(text.len());
    let mut bold_start: Option<usize> = None;
    let mut italic_start: Option<usize> = None;
    let mut first_bold: Option<String> = None;
    let mut first_italic: Option<String> = None;

    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        if chars[i] != '\'' {
            out.push(chars[i]);
            i += 1;
            continue;
        }
        let mut run = 0;
        while i + run < chars.len() && chars[i + run] == '\'' {
            run += 1;
        }
        i += run;

        let (toggles_bold, toggles_italic) = match run {
            1 => {
                out.push('\'');
                (false, false)
            }
            2 => (false, true),
            3 | 4 => (true, false),
            _ => (true, true),
        };
        if toggles_bold {
            match bold_start.take() {
                Some(start) => {
                    if first_bold.is_none() {
                        first_bold = Some(out[start..].to_string());
                    }
                }
                None => bold_start = Some(out.len()),
            }
        }
        if toggles_italic {
            match italic_start.take() {
                Some(start) => {
                    if first_italic.is_none() {
                        first_italic = Some(out[start..].to_string());
                    }
                }
                None => italic_start = Some(out.len()),
            }
        }
    }

    (out, first_bold, first_italic)
}

/// Inner text of a bold span that opens the fragment. Only whitespace
/// may precede the `'''`; a bold span later in the fragment does not
/// count.
pub(crate) fn leading_bold(text: &str) -> Option<String> {
    let trimmed = text.trim_start();
    let apostrophes = trimmed.chars().take_while(|c| *c == '\'').count();
    if apostrophes < 3 {
        return None;
    }
    strip_quotes(trimmed).1
}

/// Drop separator-only parentheses and collapse runs of whitespace.
pub(crate) fn tidy(text: &str) -> String {
    let without_parens = EMPTY_PARENS.replace_all(text, "");
    without_parens.split_whitespace().collect::<Vec<_>>().join(" ")
}

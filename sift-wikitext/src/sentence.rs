//! Abbreviation- and decimal-aware sentence splitting.
//!
//! A sentence ends at `.`, `?` or `!` followed by whitespace and an
//! uppercase letter, or at end of input. Periods inside known
//! abbreviations, decimal numbers and compact initialisms (`D.C.`) do
//! not split. Single pass, O(n).

use crate::lang::ABBREVIATIONS;

/// Byte spans of the sentences in `text`, in order. Spans are trimmed of
/// surrounding whitespace and never empty.
pub fn split_spans(text: &str) -> Vec<(usize, usize)> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut spans = Vec::new();
    let mut start = 0usize;

    let mut idx = 0;
    while idx < chars.len() {
        let c = chars[idx].1;
        if !matches!(c, '.' | '?' | '!') {
            idx += 1;
            continue;
        }
        if c == '.'
            && (is_decimal(&chars, idx)
                || is_initialism(&chars, idx)
                || is_abbreviation(text, &chars, idx))
        {
            idx += 1;
            continue;
        }

        // Consume a run of terminators (e.g. `?!` or `...`).
        let mut term_end = idx;
        while term_end + 1 < chars.len() && matches!(chars[term_end + 1].1, '.' | '?' | '!') {
            term_end += 1;
        }

        let mut next = term_end + 1;
        let mut saw_space = false;
        while next < chars.len() && chars[next].1.is_whitespace() {
            saw_space = true;
            next += 1;
        }
        let at_end = next >= chars.len();
        let upper_follows = !at_end && saw_space && chars[next].1.is_uppercase();

        if at_end || upper_follows {
            let end = byte_end(text, &chars, term_end);
            if let Some(span) = trimmed_span(text, start, end) {
                spans.push(span);
            }
            start = if at_end { text.len() } else { chars[next].0 };
        }
        idx = term_end + 1;
    }

    if let Some(span) = trimmed_span(text, start, text.len()) {
        spans.push(span);
    }
    spans
}

/// Sentence texts, for callers that do not need positions.
pub fn split(text: &str) -> Vec<String> {
    split_spans(text)
        .into_iter()
        .map(|(s, e)| text[s..e].to_string())
        .collect()
}

/// Digit immediately before and after the period.
fn is_decimal(chars: &[(usize, char)], idx: usize) -> bool {
    idx > 0
        && idx + 1 < chars.len()
        && chars[idx - 1].1.is_ascii_digit()
        && chars[idx + 1].1.is_ascii_digit()
}

/// The period terminates a single-letter token, as in `D.C.` or `J. S.
/// Bach`.
fn is_initialism(chars: &[(usize, char)], idx: usize) -> bool {
    if idx == 0 || !chars[idx - 1].1.is_alphabetic() {
        return false;
    }
    // The letter must itself begin the token.
    idx == 1 || !chars[idx - 2].1.is_alphabetic()
}

/// The period is preceded by a known abbreviation token.
fn is_abbreviation(text: &str, chars: &[(usize, char)], idx: usize) -> bool {
    let mut token_start = idx;
    while token_start > 0 && chars[token_start - 1].1.is_alphabetic() {
        token_start -= 1;
    }
    if token_start == idx {
        return false;
    }
    let token = &text[chars[token_start].0..chars[idx].0];
    ABBREVIATIONS.contains(token.to_lowercase().as_str())
}

/// Byte offset one past the character at `idx`.
fn byte_end(text: &str, chars: &[(usize, char)], idx: usize) -> usize {
    chars
        .get(idx + 1)
        .map(|(pos, _)| *pos)
        .unwrap_or(text.len())
}

fn trimmed_span(text: &str, start: usize, end: usize) -> Option<(usize, usize)> {
    let slice = &text[start..end];
    let trimmed = slice.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lead = slice.len() - slice.trim_start().len();
    let trail = slice.len() - slice.trim_end().len();
    Some((start + lead, end - trail))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_number_does_not_split() {
        assert_eq!(
            split("He scored 2.5 points. The team won."),
            vec!["He scored 2.5 points.", "The team won."]
        );
    }

    #[test]
    fn test_abbreviation_and_initialism() {
        assert_eq!(
            split("Dr. Smith went to Washington D.C. for a meeting."),
            vec!["Dr. Smith went to Washington D.C. for a meeting."]
        );
    }

    #[test]
    fn test_currency_decimal() {
        assert_eq!(
            split("Revenue was US$1.5 million. Profit was high."),
            vec!["Revenue was US$1.5 million.", "Profit was high."]
        );
    }

    #[test]
    fn test_question_and_exclamation() {
        assert_eq!(
            split("Really? Yes! It works."),
            vec!["Really?", "Yes!", "It works."]
        );
    }

    #[test]
    fn test_lowercase_continuation_does_not_split() {
        assert_eq!(
            split("The co. was founded. it thrived."),
            vec!["The co. was founded. it thrived."]
        );
    }

    #[test]
    fn test_end_of_input_terminates() {
        assert_eq!(split("One sentence"), vec!["One sentence"]);
        assert_eq!(split("Done."), vec!["Done."]);
        assert_eq!(split(""), Vec::<String>::new());
        assert_eq!(split("   "), Vec::<String>::new());
    }

    #[test]
    fn test_months_are_abbreviations() {
        assert_eq!(
            split("Born on Jan. 5, 1990. Died later."),
            vec!["Born on Jan. 5, 1990.", "Died later."]
        );
    }

    #[test]
    fn test_ellipsis_collapses_into_one_terminator() {
        assert_eq!(split("Wait... Then go."), vec!["Wait...", "Then go."]);
    }

    #[test]
    fn test_spans_are_byte_accurate() {
        let text = "Alpha beta. Gamma delta.";
        let spans = split_spans(text);
        assert_eq!(spans.len(), 2);
        assert_eq!(&text[spans[0].0..spans[0].1], "Alpha beta.");
        assert_eq!(&text[spans[1].0..spans[1].1], "Gamma delta.");
    }
}

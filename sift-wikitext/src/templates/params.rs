//! Template parameter extraction.
//!
//! Splits a `{{…}}` body on `|` while respecting balanced `[[…]]`,
//! `{{…}}` and `<…>`. The first segment is the template name; remaining
//! segments become 1-based positional or named parameters.

/// A parsed template invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateCall {
    /// Normalised name: namespace-stripped, lowercased, trimmed,
    /// underscores as spaces.
    pub name: String,
    pub positional: Vec<String>,
    pub named: Vec<(String, String)>,
}

impl TemplateCall {
    /// Parse a full `{{…}}` body. Returns `None` when the body is not a
    /// brace-delimited template or names nothing.
    pub fn parse(body: &str) -> Option<TemplateCall> {
        let inner = body.strip_prefix("{{")?.strip_suffix("}}")?;
        let mut segments = split_segments(inner);
        if segments.is_empty() {
            return None;
        }
        let name = normalize_name(&segments.remove(0));
        if name.is_empty() {
            return None;
        }

        let mut call = TemplateCall {
            name,
            ..TemplateCall::default()
        };
        for segment in segments {
            match split_named(&segment) {
                Some((key, value)) => call.named.push((key, value)),
                None => call.positional.push(segment.trim().to_string()),
            }
        }
        Some(call)
    }

    /// 1-based positional parameter, trimmed.
    pub fn pos(&self, n: usize) -> Option<&str> {
        if n == 0 {
            return None;
        }
        self.positional.get(n - 1).map(String::as_str)
    }

    /// Positional parameter or empty string.
    pub fn pos_or_empty(&self, n: usize) -> &str {
        self.pos(n).unwrap_or("")
    }

    pub fn named(&self, key: &str) -> Option<&str> {
        self.named
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Split on `|` at zero bracket/brace/angle depth.
fn split_segments(inner: &str) -> Vec<String> {
    let bytes = inner.as_bytes();
    let mut segments = Vec::new();
    let mut brace = 0usize;
    let mut bracket = 0usize;
    let mut angle = 0usize;
    let mut seg_start = 0;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i..].starts_with(b"{{") {
            brace += 1;
            i += 2;
        } else if bytes[i..].starts_with(b"}}") {
            brace = brace.saturating_sub(1);
            i += 2;
        } else if bytes[i..].starts_with(b"[[") {
            bracket += 1;
            i += 2;
        } else if bytes[i..].starts_with(b"]]") {
            bracket = bracket.saturating_sub(1);
            i += 2;
        } else {
            match bytes[i] {
                b'<' => angle += 1,
                b'>' => angle = angle.saturating_sub(1),
                b'|' if brace == 0 && bracket == 0 && angle == 0 => {
                    segments.push(inner[seg_start..i].to_string());
                    seg_start = i + 1;
                }
                _ => {}
            }
            i += 1;
        }
    }
    segments.push(inner[seg_start..].to_string());
    segments
}

/// Strip the namespace, lowercase, trim, underscores to spaces.
fn normalize_name(raw: &str) -> String {
    let base = raw.split(':').next().unwrap_or(raw);
    base.trim().to_lowercase().replace('_', " ")
}

/// A segment is a named parameter when `=` appears before any structural
/// bracket; split once at that `=`.
fn split_named(segment: &str) -> Option<(String, String)> {
    for (i, c) in segment.char_indices() {
        match c {
            '=' => {
                let key = segment[..i].trim().to_lowercase();
                let value = segment[i + 1..].trim().to_string();
                if key.is_empty() {
                    return None;
                }
                return Some((key, value));
            }
            '[' | '{' | '<' => return None,
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_params() {
        let call = TemplateCall::parse("{{birth date|1990|5|15}}").unwrap();
        assert_eq!(call.name, "birth date");
        assert_eq!(call.pos(1), Some("1990"));
        assert_eq!(call.pos(2), Some("5"));
        assert_eq!(call.pos(3), Some("15"));
        assert_eq!(call.pos(4), None);
    }

    #[test]
    fn test_named_params_skip_positional_indices() {
        let call = TemplateCall::parse("{{as of|2024|6|since=yes}}").unwrap();
        assert_eq!(call.pos(1), Some("2024"));
        assert_eq!(call.pos(2), Some("6"));
        assert_eq!(call.named("since"), Some("yes"));
    }

    #[test]
    fn test_name_normalisation() {
        let call = TemplateCall::parse("{{ Birth_Date_And_Age |1990}}").unwrap();
        assert_eq!(call.name, "birth date and age");
        let call = TemplateCall::parse("{{Template:Foo|x}}").unwrap();
        assert_eq!(call.name, "template");
    }

    #[test]
    fn test_pipe_inside_link_is_not_a_separator() {
        let call = TemplateCall::parse("{{t|[[Page|display]]|b}}").unwrap();
        assert_eq!(call.pos(1), Some("[[Page|display]]"));
        assert_eq!(call.pos(2), Some("b"));
    }

    #[test]
    fn test_pipe_inside_nested_template() {
        let call = TemplateCall::parse("{{t|{{inner|x|y}}|b}}").unwrap();
        assert_eq!(call.pos(1), Some("{{inner|x|y}}"));
        assert_eq!(call.pos(2), Some("b"));
    }

    #[test]
    fn test_pipe_inside_angle_brackets() {
        let call = TemplateCall::parse("{{t|<span class=\"a|b\">x</span>}}").unwrap();
        assert_eq!(call.positional.len(), 1);
    }

    #[test]
    fn test_equals_after_bracket_is_positional() {
        let call = TemplateCall::parse("{{t|[[a]] b=c}}").unwrap();
        assert_eq!(call.pos(1), Some("[[a]] b=c"));
        assert!(call.named.is_empty());
    }

    #[test]
    fn test_named_key_lowercased() {
        let call = TemplateCall::parse("{{t|Name = Value }}").unwrap();
        assert_eq!(call.named("name"), Some("Value"));
    }
}

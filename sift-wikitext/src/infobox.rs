//! Infobox extraction from `{{Infobox …}}` templates.

use crate::document::Infobox;
use crate::lang::is_presentational_infobox_key;
use crate::links;
use crate::templates::{self, TemplateCall};

/// Normalised field key: lowercase, consecutive non-alphanumerics
/// collapsed to `_`, trimmed.
pub fn normalize_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut pending_sep = false;
    for c in key.trim().to_lowercase().chars() {
        if c.is_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.push(c);
        } else {
            pending_sep = true;
        }
    }
    out
}

/// Build an [`Infobox`] from a parsed `{{infobox …}}` call. Values have
/// their nested templates evaluated and links collapsed to display text;
/// field order follows the source.
pub fn parse_infobox(call: &TemplateCall) -> Infobox {
    let r#type = call
        .name
        .strip_prefix("infobox")
        .map(|rest| rest.trim().split_whitespace().next().unwrap_or(""))
        .unwrap_or("")
        .to_lowercase();

    let mut infobox = Infobox {
        r#type,
        ..Infobox::default()
    };

    for (key, value) in &call.named {
        let normalized = normalize_key(key);
        if normalized.is_empty() || is_presentational_infobox_key(&normalized) {
            continue;
        }
        let expanded = templates::expand(value, 0).text;
        let (text, value_links) = links::collapse_links(&expanded);
        let text = text.trim().to_string();
        infobox.links.extend(value_links);
        infobox.data.push((normalized, text));
    }

    infobox
}

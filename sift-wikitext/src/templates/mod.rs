//! Semantic template evaluation.
//!
//! [`expand`] rewrites every `{{…}}` span in a text through the dispatch
//! table, accumulating the typed side effects (template records,
//! coordinates, the disambiguation flag) alongside the spliced output
//! text. Templates inside parameter values are evaluated before the
//! outer template runs; recursion is depth-limited.

pub mod coord;
pub mod currency;
pub mod dates;
pub mod format;
pub mod params;

use crate::document::{Coordinate, TemplateRecord};
use crate::lang::DISAMBIG_TEMPLATES;
use crate::scanner;
pub use params::TemplateCall;

/// Templates nested deeper than this collapse to nothing.
pub const MAX_TEMPLATE_DEPTH: usize = 50;

/// Output of evaluating one template or expanding one text span.
#[derive(Debug, Clone, Default)]
pub struct Evaluation {
    pub text: String,
    pub records: Vec<TemplateRecord>,
    pub coordinates: Vec<Coordinate>,
    pub disambiguation: bool,
}

impl Evaluation {
    /// Merge `other`'s side effects into `self`, returning its text.
    fn absorb(&mut self, other: Evaluation) -> String {
        self.records.extend(other.records);
        self.coordinates.extend(other.coordinates);
        self.disambiguation |= other.disambiguation;
        other.text
    }
}

/// True for `{{infobox …}}` templates, which the document builder routes
/// to the infobox parser instead of this evaluator.
pub fn is_infobox(name: &str) -> bool {
    name == "infobox" || name.starts_with("infobox ")
}

/// Replace every top-level `{{…}}` span in `text` with its evaluation.
pub fn expand(text: &str, depth: usize) -> Evaluation {
    if !text.contains("{{") {
        return Evaluation {
            text: text.to_string(),
            ..Evaluation::default()
        };
    }

    let bytes = text.as_bytes();
    let mut eval = Evaluation::default();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while let Some(rel) = text[i..].find("{{") {
        let start = i + rel;
        match scanner::template_span(bytes, start) {
            Some(end) => {
                out.push_str(&text[i..start]);
                let inner = evaluate(&text[start..end], depth);
                out.push_str(&eval.absorb(inner));
                i = end;
            }
            None => {
                // Unbalanced braces stay as plain text.
                out.push_str(&text[i..start + 2]);
                i = start + 2;
            }
        }
    }
    out.push_str(&text[i..]);
    eval.text = out;
    eval
}

/// Evaluate a single `{{…}}` body (outer braces included).
pub fn evaluate(body: &str, depth: usize) -> Evaluation {
    if depth >= MAX_TEMPLATE_DEPTH {
        return Evaluation::default();
    }
    let Some(raw) = TemplateCall::parse(body) else {
        return Evaluation::default();
    };

    // Evaluate nested templates in parameter values first.
    let mut eval = Evaluation::default();
    let mut positional = Vec::with_capacity(raw.positional.len());
    for value in raw.positional {
        positional.push(eval.absorb(expand(&value, depth + 1)));
    }
    let mut named = Vec::with_capacity(raw.named.len());
    for (key, value) in raw.named {
        named.push((key, eval.absorb(expand(&value, depth + 1))));
    }
    let call = TemplateCall {
        name: raw.name,
        positional,
        named,
    };

    dispatch(&call, &mut eval);
    eval
}

fn dispatch(call: &TemplateCall, eval: &mut Evaluation) {
    let name = call.name.as_str();

    if DISAMBIG_TEMPLATES.contains(name) {
        eval.disambiguation = true;
        return;
    }
    if let Some(sym) = format::symbol(name) {
        eval.text = sym.to_string();
        return;
    }
    if let Some(symbol) = currency::symbol_for(name) {
        eval.text = currency::currency(symbol, call);
        return;
    }
    if name.starts_with("lang-") {
        eval.text = format::lang(call);
        return;
    }

    match name {
        "birth date" | "birth date and age" | "bda" | "dob" => {
            let (text, record) = dates::date_template("birth date", call);
            eval.text = text;
            eval.records.push(record);
        }
        "death date" | "death date and age" => {
            let (text, record) = dates::date_template("death date", call);
            eval.text = text;
            eval.records.push(record);
        }
        "start date" => {
            let (text, record) = dates::date_template("start date", call);
            eval.text = text;
            eval.records.push(record);
        }
        "end date" => {
            let (text, record) = dates::date_template("end date", call);
            eval.text = text;
            eval.records.push(record);
        }
        "age" => eval.text = dates::age(call),
        "as of" => eval.text = dates::as_of(call),
        "coord" | "coor" | "coor dms" | "coor dec" => {
            if let Some(result) = coord::coord(call) {
                eval.text = result.text;
                eval.records.push(result.record);
                eval.coordinates.push(result.coordinate);
            }
        }
        "nihongo" | "nihongo2" | "nihongo3" | "nihongo-s" => eval.text = format::nihongo(call),
        "currency" => eval.text = currency::currency_by_code(call),
        "convert" | "cvt" => eval.text = format::convert(call),
        "fraction" | "frac" => eval.text = format::fraction(call),
        "val" => eval.text = format::val(call),
        "hlist" | "plainlist" | "ubl" | "ublist" | "unbulleted list" | "collapsible list"
        | "bulleted list" | "flatlist" => eval.text = format::join_list(call),
        "sortname" => eval.text = format::sortname(call),
        "url" => eval.text = format::url(call),
        "plural" => eval.text = format::plural(call),
        "lang" => eval.text = format::lang(call),
        "nowrap" | "small" | "nobold" | "abbr" => {
            eval.text = call.pos_or_empty(1).to_string();
        }
        "lc" => eval.text = call.pos_or_empty(1).to_lowercase(),
        "uc" => eval.text = call.pos_or_empty(1).to_uppercase(),
        "ucfirst" => eval.text = format::ucfirst(call.pos_or_empty(1)),
        "lcfirst" => eval.text = format::lcfirst(call.pos_or_empty(1)),
        "trunc" => eval.text = format::trunc(call),
        "decade" => eval.text = dates::decade(call),
        "century" => eval.text = dates::century(call),
        "reign" => eval.text = dates::reign(call),
        "circa" => eval.text = dates::circa(call),
        "aka" => eval.text = format::aka(call),
        "fl." | "fl" => eval.text = dates::floruit(call),
        "formatnum" => eval.text = currency::group_thousands(call.pos_or_empty(1).trim()),
        "currentyear" => eval.text = dates::current_year(),
        "currentmonthname" => eval.text = dates::current_month_name(),
        "currentday" => eval.text = dates::current_day(),
        "currentdayname" => eval.text = dates::current_day_name(),
        "flag" => {
            eval.text = call.pos_or_empty(1).to_string();
            eval.records
                .push(TemplateRecord::new("flag").with("name", call.pos_or_empty(1)));
        }
        "flagicon" => {
            eval.records
                .push(TemplateRecord::new("flagicon").with("name", call.pos_or_empty(1)));
        }
        "goal" => {
            if let Some(minute) = call.pos(1) {
                eval.text = format!("{}'", minute);
                eval.records
                    .push(TemplateRecord::new("goal").with("minute", minute));
            }
        }
        "player" => {
            let player = call
                .positional
                .iter()
                .rev()
                .map(|s| s.trim())
                .find(|s| !s.is_empty())
                .unwrap_or("");
            eval.text = player.to_string();
            eval.records
                .push(TemplateRecord::new("player").with("name", player));
        }
        "uss" | "hms" => {
            let prefix = if name == "uss" { "USS" } else { "HMS" };
            eval.text = format!("{} {}", prefix, call.pos_or_empty(1));
            let mut record = TemplateRecord::new(name).with("name", call.pos_or_empty(1));
            if let Some(hull) = call.pos(2) {
                record = record.with("hull", hull);
            }
            eval.records.push(record);
        }
        "metro" => {
            eval.text = format!("{} metro station", call.pos_or_empty(1));
            eval.records
                .push(TemplateRecord::new("metro").with("name", call.pos_or_empty(1)));
        }
        "stn" => {
            eval.text = format!("{} railway station", call.pos_or_empty(1));
            eval.records
                .push(TemplateRecord::new("stn").with("name", call.pos_or_empty(1)));
        }
        "ferry" => {
            eval.text = format!("{} ferry", call.pos_or_empty(1));
            eval.records
                .push(TemplateRecord::new("ferry").with("name", call.pos_or_empty(1)));
        }
        _ => {
            // Unknown template: no output, one record keyed by parameter.
            let mut record = TemplateRecord::new(name);
            for (i, value) in call.positional.iter().enumerate() {
                record = record.with((i + 1).to_string(), value);
            }
            for (key, value) in &call.named {
                record = record.with(key, value);
            }
            eval.records.push(record);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_splices_text() {
        let eval = expand("Born {{birth date|1990|5|15}}.", 0);
        assert_eq!(eval.text, "Born May 15, 1990.");
        assert_eq!(eval.records.len(), 1);
        assert_eq!(eval.records[0].name, "birth date");
    }

    #[test]
    fn test_nested_templates_evaluate_inside_out() {
        let eval = expand("{{nowrap|{{uc|shout}}}}", 0);
        assert_eq!(eval.text, "SHOUT");
    }

    #[test]
    fn test_unknown_template_collapses_with_record() {
        let eval = expand("a {{mystery|1|k=v}} b", 0);
        assert_eq!(eval.text, "a  b");
        assert_eq!(eval.records[0].name, "mystery");
        assert_eq!(eval.records[0].get("1"), Some("1"));
        assert_eq!(eval.records[0].get("k"), Some("v"));
    }

    #[test]
    fn test_disambiguation_flag() {
        let eval = expand("{{disambiguation}}", 0);
        assert!(eval.disambiguation);
        assert_eq!(eval.text, "");
    }

    #[test]
    fn test_coord_side_effects() {
        let eval = expand("{{coord|35|41|N|139|41|E}}", 0);
        assert_eq!(eval.coordinates.len(), 1);
        assert!((eval.coordinates[0].lat - 35.6833).abs() < 0.001);
        assert_eq!(eval.records[0].get("latDir"), Some("N"));
    }

    #[test]
    fn test_recursion_depth_limit() {
        // 60 nested layers: the innermost ten collapse silently instead
        // of overflowing the stack.
        let mut text = "x".to_string();
        for _ in 0..60 {
            text = format!("{{{{nowrap|{}}}}}", text);
        }
        let eval = expand(&text, 0);
        assert!(eval.text.len() <= 1);
    }

    #[test]
    fn test_unbalanced_braces_stay_verbatim() {
        let eval = expand("a {{broken b", 0);
        assert_eq!(eval.text, "a {{broken b");
    }

    #[test]
    fn test_symbol_templates() {
        assert_eq!(expand("a{{ndash}}b", 0).text, "a\u{2013}b");
        assert_eq!(expand("{{1/2}}", 0).text, "\u{00bd}");
    }

    #[test]
    fn test_currency_named_form() {
        assert_eq!(expand("{{euro|100}}", 0).text, "€100");
        assert_eq!(expand("{{US$|1.5 million}}", 0).text, "US$1.5 million");
    }
}

//! Text-formatting and list templates.

use super::params::TemplateCall;

/// Fixed Unicode output for symbol templates; `None` when the name is
/// not a symbol template.
pub fn symbol(name: &str) -> Option<&'static str> {
    Some(match name {
        "ndash" => "\u{2013}",
        "mdash" => "\u{2014}",
        "middot" => "\u{00b7}",
        "spd" => " \u{2013} ",
        "1/2" => "\u{00bd}",
        "1/4" => "\u{00bc}",
        "3/4" => "\u{00be}",
        "increase" => "\u{25b2}",
        "decrease" => "\u{25bc}",
        "steady" => "\u{25ac}",
        "radic" => "\u{221a}",
        _ => return None,
    })
}

/// `{{nihongo|Tokyo|東京|Tōkyō}}` → `Tokyo (東京, Tōkyō)`; empty
/// parameters are skipped, order preserved.
pub fn nihongo(call: &TemplateCall) -> String {
    let parts: Vec<&str> = call
        .positional
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    match parts.split_first() {
        None => String::new(),
        Some((first, [])) => (*first).to_string(),
        Some((first, rest)) => format!("{} ({})", first, rest.join(", ")),
    }
}

/// `{{convert|100|km|mi}}` → `100 km`;
/// `{{convert|100|to|200|km}}` → `100 to 200 km`.
pub fn convert(call: &TemplateCall) -> String {
    let p1 = call.pos_or_empty(1);
    let p2 = call.pos_or_empty(2);
    if matches!(p2, "to" | "-" | "\u{2013}" | "and") {
        let p3 = call.pos_or_empty(3);
        let unit = call.pos_or_empty(4);
        format!("{} {} {} {}", p1, p2, p3, unit).trim().to_string()
    } else {
        format!("{} {}", p1, p2).trim().to_string()
    }
}

/// `{{frac|a|b}}` → `a/b`; `{{frac|a|b|c}}` → `a b/c`; `{{frac|n}}` →
/// `1/n`.
pub fn fraction(call: &TemplateCall) -> String {
    match (call.pos(1), call.pos(2), call.pos(3)) {
        (Some(a), Some(b), Some(c)) => format!("{} {}/{}", a, b, c),
        (Some(a), Some(b), None) => format!("{}/{}", a, b),
        (Some(n), None, None) => format!("1/{}", n),
        _ => "/".to_string(),
    }
}

/// `{{val|9.8|u=m/s}}` → `9.8 m/s`.
pub fn val(call: &TemplateCall) -> String {
    let value = call.pos_or_empty(1);
    match call.named("u") {
        Some(unit) if !unit.is_empty() => format!("{} {}", value, unit),
        _ => value.to_string(),
    }
}

/// List templates join their positional parameters with `, `.
pub fn join_list(call: &TemplateCall) -> String {
    call.positional
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// `{{sortname|First|Last|Sort key}}` → `First Last`.
pub fn sortname(call: &TemplateCall) -> String {
    format!("{} {}", call.pos_or_empty(1), call.pos_or_empty(2))
        .trim()
        .to_string()
}

/// `{{url|example.com|Example}}` → the display text when present.
pub fn url(call: &TemplateCall) -> String {
    call.pos(2).or(call.pos(1)).unwrap_or("").to_string()
}

/// `{{plural|3|point}}` → `3 points`.
pub fn plural(call: &TemplateCall) -> String {
    let count = call.pos_or_empty(1);
    let noun = call.pos_or_empty(2);
    let singular = count.trim().parse::<f64>().map(|n| n == 1.0).unwrap_or(false);
    if singular {
        format!("{} {}", count, noun)
    } else {
        format!("{} {}s", count, noun)
    }
}

/// `{{lang|fr|texte}}` and `{{lang-fr|texte}}` emit the last textual
/// parameter.
pub fn lang(call: &TemplateCall) -> String {
    call.positional
        .iter()
        .rev()
        .map(|s| s.trim())
        .find(|s| !s.is_empty())
        .unwrap_or("")
        .to_string()
}

pub fn ucfirst(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn lcfirst(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `{{trunc|string|n}}` — first `n` characters.
pub fn trunc(call: &TemplateCall) -> String {
    let value = call.pos_or_empty(1);
    let n = call
        .pos(2)
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(usize::MAX);
    value.chars().take(n).collect()
}

/// `{{aka}}` → `a.k.a.`, optionally followed by the first parameter.
pub fn aka(call: &TemplateCall) -> String {
    match call.pos(1) {
        Some(value) => format!("a.k.a. {}", value),
        None => "a.k.a.".to_string(),
    }
}

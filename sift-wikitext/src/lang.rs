//! Process-wide read-only language tables.
//!
//! Namespace prefixes, redirect keywords, disambiguation markers, sentence
//! abbreviations, currency symbols and month names, initialised once and
//! shared by the scanner, the template evaluator and the document builder.

use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

/// File/image namespace prefixes, lowercased, across the major wikis.
pub static FILE_PREFIXES: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "file", "image", "fichier", "archivo", "datei", "bestand", "bild", "plik", "файл",
        "ファイル", "文件", "檔案", "תמונה", "ملف", "تصویر",
    ]
    .into_iter()
    .collect()
});

/// Category namespace prefixes, lowercased.
pub static CATEGORY_PREFIXES: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "category",
        "categoria",
        "categoría",
        "catégorie",
        "kategorie",
        "kategori",
        "категория",
        "تصنيف",
        "分类",
    ]
    .into_iter()
    .collect()
});

/// Interwiki prefixes that turn a `[[prefix:page]]` construct into an
/// interwiki link rather than an internal one.
pub static INTERWIKI_PREFIXES: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "wikt",
        "wiktionary",
        "commons",
        "meta",
        "wikisource",
        "wikiquote",
        "wikibooks",
        "wikinews",
        "wikiversity",
        "wikispecies",
        "wikidata",
        "mw",
    ]
    .into_iter()
    .collect()
});

/// Case-insensitive redirect directive at the start of a page, with the
/// target link following. The keyword set covers the i18n variants.
pub static REDIRECT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*#(redirect|weiterleitung|redirection|redirección|перенаправление|تحويل|重定向)\s*:?\s*\[\[",
    )
    .expect("redirect pattern")
});

/// Template names that flag a page as a disambiguation page.
pub static DISAMBIG_TEMPLATES: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "disambiguation",
        "disambig",
        "dab",
        "dp",
        "geodis",
        "hndis",
        "letter-number combination disambiguation",
        "bisongidila",
        "begriffsklärung",
        "homonymie",
        "desambiguación",
        "desambiguação",
        "disambigua",
        "doorverwijspagina",
        "曖昧さ回避",
    ]
    .into_iter()
    .collect()
});

/// Title suffixes that flag a page as a disambiguation page.
pub static DISAMBIG_TITLE_SUFFIXES: &[&str] = &[
    " (disambiguation)",
    " (Begriffsklärung)",
    " (homonymie)",
    " (desambiguación)",
    " (desambiguação)",
    " (disambigua)",
];

/// Abbreviations that suppress a sentence split after a period.
pub static ABBREVIATIONS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "vs", "etc", "esp", "eg", "ie", "inc",
        "ltd", "co", "corp", "st", "mt", "ft", "gen", "gov", "jan", "feb", "mar", "apr", "jun",
        "jul", "aug", "sep", "oct", "nov", "dec", "no", "vol", "pp", "ca",
    ]
    .into_iter()
    .collect()
});

/// Currency template name -> rendered symbol. Codes and named forms share
/// one table; the `currency` template resolves its `code=` through it too.
pub static CURRENCY_SYMBOLS: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    [
        ("us$", "US$"),
        ("usd", "US$"),
        ("us dollar", "US$"),
        ("gbp", "£"),
        ("£", "£"),
        ("pound sterling", "£"),
        ("eur", "€"),
        ("€", "€"),
        ("euro", "€"),
        ("¥", "¥"),
        ("jpy", "¥"),
        ("japanese yen", "¥"),
        ("inr", "₹"),
        ("indian rupee", "₹"),
        ("rub", "₽"),
        ("russian ruble", "₽"),
        ("russian rouble", "₽"),
        ("aud", "A$"),
        ("australian dollar", "A$"),
        ("cad", "C$"),
        ("canadian dollar", "C$"),
        ("chf", "CHF "),
        ("swiss franc", "CHF "),
        ("hkd", "HK$"),
        ("hong kong dollar", "HK$"),
        ("sgd", "S$"),
        ("singapore dollar", "S$"),
        ("nzd", "NZ$"),
        ("new zealand dollar", "NZ$"),
        ("krw", "₩"),
        ("south korean won", "₩"),
        ("mxn", "MX$"),
        ("mexican peso", "MX$"),
        ("brl", "R$"),
        ("brazilian real", "R$"),
        ("zar", "R"),
        ("south african rand", "R"),
    ]
    .into_iter()
    .collect()
});

/// English month names, 1-indexed via `month_name`.
pub static MONTHS: &[&str] = &[
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Month name for a 1-based month number, or `None` when out of range.
pub fn month_name(month: u32) -> Option<&'static str> {
    if (1..=12).contains(&month) {
        Some(MONTHS[(month - 1) as usize])
    } else {
        None
    }
}

/// Vertical-alignment keywords recognised inside file links.
pub static IMAGE_VALIGN: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "baseline",
        "middle",
        "sub",
        "super",
        "text-top",
        "text-bottom",
        "top",
        "bottom",
    ]
    .into_iter()
    .collect()
});

/// Infobox parameters that describe presentation rather than data fields.
pub fn is_presentational_infobox_key(normalized: &str) -> bool {
    normalized.starts_with("image")
        || matches!(
            normalized,
            "caption" | "alt" | "logo" | "signature" | "embed" | "map" | "mapsize"
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_prefixes_cover_i18n() {
        assert!(FILE_PREFIXES.contains("file"));
        assert!(FILE_PREFIXES.contains("datei"));
        assert!(FILE_PREFIXES.contains("файл"));
        assert!(!FILE_PREFIXES.contains("category"));
    }

    #[test]
    fn test_redirect_detection() {
        assert!(REDIRECT_RE.is_match("#REDIRECT [[Foo]]"));
        assert!(REDIRECT_RE.is_match("  #redirect [[Foo]]"));
        assert!(REDIRECT_RE.is_match("#WEITERLEITUNG [[Foo]]"));
        assert!(!REDIRECT_RE.is_match("Text #REDIRECT [[Foo]]"));
    }

    #[test]
    fn test_month_name_bounds() {
        assert_eq!(month_name(1), Some("January"));
        assert_eq!(month_name(12), Some("December"));
        assert_eq!(month_name(0), None);
        assert_eq!(month_name(13), None);
    }

    #[test]
    fn test_currency_lookup() {
        assert_eq!(CURRENCY_SYMBOLS.get("us$"), Some(&"US$"));
        assert_eq!(CURRENCY_SYMBOLS.get("euro"), Some(&"€"));
    }
}

//! Currency templates and number grouping.

use super::params::TemplateCall;
use crate::lang::CURRENCY_SYMBOLS;

/// Render a currency template: configured symbol followed by parameter 1
/// verbatim, with thousands grouping added to bare integers ≥ 1000.
pub fn currency(symbol: &str, call: &TemplateCall) -> String {
    let amount = call.pos_or_empty(1).trim();
    if amount.is_empty() {
        return symbol.trim_end().to_string();
    }
    format!("{}{}", symbol, group_if_bare_integer(amount))
}

/// `{{currency|123|code=EUR}}` resolves the code through the symbol
/// table; unknown codes fall back to the uppercased code.
pub fn currency_by_code(call: &TemplateCall) -> String {
    let code = call
        .named("code")
        .or_else(|| call.pos(2))
        .unwrap_or("")
        .trim()
        .to_lowercase();
    match CURRENCY_SYMBOLS.get(code.as_str()) {
        Some(symbol) => currency(symbol, call),
        None if code.is_empty() => currency("", call),
        None => currency(&format!("{} ", code.to_uppercase()), call),
    }
}

/// Look up the symbol for a currency template name (`us$`, `euro`, …).
pub fn symbol_for(name: &str) -> Option<&'static str> {
    CURRENCY_SYMBOLS.get(name).copied()
}

fn group_if_bare_integer(amount: &str) -> String {
    if amount.len() >= 4 && amount.bytes().all(|b| b.is_ascii_digit()) {
        group_thousands(amount)
    } else {
        amount.to_string()
    }
}

/// Insert thousands separators into the integer part of a number.
pub fn group_thousands(number: &str) -> String {
    let (integer, rest) = match number.find('.') {
        Some(i) => number.split_at(i),
        None => (number, ""),
    };
    if !integer.bytes().all(|b| b.is_ascii_digit()) {
        return number.to_string();
    }
    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, c) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped.push_str(rest);
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::params::TemplateCall;

    fn call(body: &str) -> TemplateCall {
        TemplateCall::parse(body).unwrap()
    }

    #[test]
    fn test_us_dollar_verbatim_decimal() {
        assert_eq!(
            currency("US$", &call("{{US$|1.5 million}}")),
            "US$1.5 million"
        );
    }

    #[test]
    fn test_bare_integer_grouping() {
        assert_eq!(currency("US$", &call("{{US$|1234567}}")), "US$1,234,567");
        assert_eq!(currency("€", &call("{{EUR|999}}")), "€999");
        assert_eq!(currency("£", &call("{{GBP|1000}}")), "£1,000");
    }

    #[test]
    fn test_suffix_word_suppresses_grouping() {
        assert_eq!(
            currency("US$", &call("{{US$|2000 billion}}")),
            "US$2000 billion"
        );
    }

    #[test]
    fn test_currency_by_code() {
        assert_eq!(currency_by_code(&call("{{currency|500|code=EUR}}")), "€500");
        assert_eq!(
            currency_by_code(&call("{{currency|500|code=xyz}}")),
            "XYZ 500"
        );
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands("1234567"), "1,234,567");
        assert_eq!(group_thousands("1000"), "1,000");
        assert_eq!(group_thousands("100"), "100");
        assert_eq!(group_thousands("1234.56"), "1,234.56");
        assert_eq!(group_thousands("12ab"), "12ab");
    }
}

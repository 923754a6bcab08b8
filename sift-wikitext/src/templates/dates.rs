//! Date, age and era templates.

use super::params::TemplateCall;
use crate::document::TemplateRecord;
use crate::lang::month_name;
use chrono::{Datelike, Utc};

/// `MonthName D, YYYY` when day and month are given, `MonthName YYYY`
/// with a month only, else the bare year.
pub fn format_date(year: &str, month: Option<&str>, day: Option<&str>) -> String {
    let year = year.trim();
    let month_num = month.and_then(|m| m.trim().parse::<u32>().ok());
    match (month_num.and_then(month_name), day.map(str::trim)) {
        (Some(name), Some(day)) if !day.is_empty() => {
            format!("{} {}, {}", name, day.trim_start_matches('0'), year)
        }
        (Some(name), _) => format!("{} {}", name, year),
        _ => year.to_string(),
    }
}

/// Shared renderer for `birth date`, `death date`, `start date` and
/// `end date`; `record_name` distinguishes the typed record.
pub fn date_template(record_name: &str, call: &TemplateCall) -> (String, TemplateRecord) {
    let year = call.pos_or_empty(1);
    let month = call.pos(2);
    let day = call.pos(3);

    let mut record = TemplateRecord::new(record_name).with("year", year);
    if let Some(month) = month {
        record = record.with("month", month);
    }
    if let Some(day) = day {
        record = record.with("day", day);
    }
    (format_date(year, month, day), record)
}

/// `{{age|y1|m1|d1|y2|m2|d2}}` — whole years between the two dates.
pub fn age(call: &TemplateCall) -> String {
    let part = |n: usize| call.pos(n).and_then(|v| v.trim().parse::<i64>().ok());
    let (Some(y1), Some(y2)) = (part(1), part(4)) else {
        return String::new();
    };
    let m1 = part(2).unwrap_or(1);
    let d1 = part(3).unwrap_or(1);
    let m2 = part(5).unwrap_or(1);
    let d2 = part(6).unwrap_or(1);

    let mut years = y2 - y1;
    if (m2, d2) < (m1, d1) {
        years -= 1;
    }
    years.to_string()
}

/// `{{as of|…}}` — `As of <date>`, or `Since <date>` when `since=yes`.
pub fn as_of(call: &TemplateCall) -> String {
    let prefix = if call.named("since") == Some("yes") {
        "Since"
    } else {
        "As of"
    };
    let date = format_date(call.pos_or_empty(1), call.pos(2), call.pos(3));
    if date.is_empty() {
        prefix.to_string()
    } else {
        format!("{} {}", prefix, date)
    }
}

pub fn current_year() -> String {
    Utc::now().year().to_string()
}

pub fn current_month_name() -> String {
    month_name(Utc::now().month()).unwrap_or("").to_string()
}

pub fn current_day() -> String {
    Utc::now().day().to_string()
}

pub fn current_day_name() -> String {
    Utc::now().format("%A").to_string()
}

/// `{{decade|1994}}` → `1990s`.
pub fn decade(call: &TemplateCall) -> String {
    match call.pos_or_empty(1).trim().parse::<i64>() {
        Ok(year) => format!("{}s", (year / 10) * 10),
        Err(_) => String::new(),
    }
}

/// `{{century|20}}` → `20th century`.
pub fn century(call: &TemplateCall) -> String {
    match call.pos_or_empty(1).trim().parse::<u64>() {
        Ok(n) => format!("{} century", ordinal(n)),
        Err(_) => String::new(),
    }
}

/// `{{reign|1837|1901}}` → `r. 1837–1901`.
pub fn reign(call: &TemplateCall) -> String {
    match (call.pos(1), call.pos(2)) {
        (Some(from), Some(to)) => format!("r. {}\u{2013}{}", from, to),
        (Some(from), None) => format!("r. {}", from),
        _ => "r.".to_string(),
    }
}

/// `{{circa|1500}}` → `c. 1500`.
pub fn circa(call: &TemplateCall) -> String {
    match call.pos(1) {
        Some(value) => format!("c. {}", value),
        None => "c.".to_string(),
    }
}

/// `{{fl.|1200}}` → `fl. 1200`.
pub fn floruit(call: &TemplateCall) -> String {
    match call.pos(1) {
        Some(value) => format!("fl. {}", value),
        None => "fl.".to_string(),
    }
}

fn ordinal(n: u64) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(body: &str) -> TemplateCall {
        TemplateCall::parse(body).unwrap()
    }

    #[test]
    fn test_format_date_full() {
        assert_eq!(format_date("1990", Some("5"), Some("15")), "May 15, 1990");
    }

    #[test]
    fn test_format_date_month_only() {
        assert_eq!(format_date("1990", Some("5"), None), "May 1990");
    }

    #[test]
    fn test_format_date_year_only() {
        assert_eq!(format_date("1990", None, None), "1990");
        assert_eq!(format_date("1990", Some("no"), Some("15")), "1990");
    }

    #[test]
    fn test_birth_date_record() {
        let (text, record) = date_template("birth date", &call("{{birth date|1990|5|15}}"));
        assert_eq!(text, "May 15, 1990");
        assert_eq!(record.get("year"), Some("1990"));
        assert_eq!(record.get("month"), Some("5"));
        assert_eq!(record.get("day"), Some("15"));
    }

    #[test]
    fn test_age_adjusts_for_month_day() {
        assert_eq!(age(&call("{{age|1990|5|15|2020|5|14}}")), "29");
        assert_eq!(age(&call("{{age|1990|5|15|2020|5|15}}")), "30");
        assert_eq!(age(&call("{{age|1990|5|15|2020|6|1}}")), "30");
    }

    #[test]
    fn test_as_of_variants() {
        assert_eq!(as_of(&call("{{as of|2024|6|1}}")), "As of June 1, 2024");
        assert_eq!(
            as_of(&call("{{as of|2024|6|1|since=yes}}")),
            "Since June 1, 2024"
        );
        assert_eq!(as_of(&call("{{as of|2024}}")), "As of 2024");
    }

    #[test]
    fn test_decade_floors() {
        assert_eq!(decade(&call("{{decade|1994}}")), "1990s");
        assert_eq!(decade(&call("{{decade|2000}}")), "2000s");
    }

    #[test]
    fn test_century_ordinals() {
        assert_eq!(century(&call("{{century|20}}")), "20th century");
        assert_eq!(century(&call("{{century|1}}")), "1st century");
        assert_eq!(century(&call("{{century|12}}")), "12th century");
        assert_eq!(century(&call("{{century|3}}")), "3rd century");
    }

    #[test]
    fn test_reign_and_circa() {
        assert_eq!(reign(&call("{{reign|1837|1901}}")), "r. 1837\u{2013}1901");
        assert_eq!(circa(&call("{{circa|1500}}")), "c. 1500");
        assert_eq!(floruit(&call("{{fl.|1200}}")), "fl. 1200");
    }
}

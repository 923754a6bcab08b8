//! `{{coord}}` and friends: DMS or decimal coordinates to decimal degrees.

use super::params::TemplateCall;
use crate::document::{Coordinate, TemplateRecord};

pub struct CoordResult {
    pub text: String,
    pub record: TemplateRecord,
    pub coordinate: Coordinate,
}

/// Accepts `(lat, lon)` decimal or
/// `(latD[, latM[, latS]], latDir, lonD[, lonM[, lonS]], lonDir)`.
/// Returns `None` when no coordinate can be extracted.
pub fn coord(call: &TemplateCall) -> Option<CoordResult> {
    let tokens: Vec<&str> = call
        .positional
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();

    let lat_dir_idx = tokens
        .iter()
        .position(|t| t.eq_ignore_ascii_case("N") || t.eq_ignore_ascii_case("S"));

    if let Some(i) = lat_dir_idx {
        let j = tokens
            .iter()
            .position(|t| t.eq_ignore_ascii_case("E") || t.eq_ignore_ascii_case("W"))?;
        if j <= i + 1 || i == 0 {
            return None;
        }
        let lat_dir = tokens[i].to_uppercase();
        let lon_dir = tokens[j].to_uppercase();
        let lat = dms_to_decimal(&tokens[..i], &lat_dir)?;
        let lon = dms_to_decimal(&tokens[i + 1..j], &lon_dir)?;

        let text = format!(
            "{}{} {}{}",
            join_dms(&tokens[..i]),
            lat_dir,
            join_dms(&tokens[i + 1..j]),
            lon_dir
        );
        let record = TemplateRecord::new("coord")
            .with("lat", format_degrees(lat))
            .with("lon", format_degrees(lon))
            .with("latDir", &lat_dir)
            .with("lonDir", &lon_dir);
        return Some(CoordResult {
            text,
            record,
            coordinate: Coordinate { lat, lon },
        });
    }

    // Decimal form: first two numeric tokens.
    let mut numbers = tokens.iter().filter_map(|t| t.parse::<f64>().ok());
    let lat = numbers.next()?;
    let lon = numbers.next()?;
    let lat_dir = if lat < 0.0 { "S" } else { "N" };
    let lon_dir = if lon < 0.0 { "W" } else { "E" };
    let text = format!("{}°{} {}°{}", lat.abs(), lat_dir, lon.abs(), lon_dir);
    let record = TemplateRecord::new("coord")
        .with("lat", format_degrees(lat))
        .with("lon", format_degrees(lon))
        .with("latDir", lat_dir)
        .with("lonDir", lon_dir);
    Some(CoordResult {
        text,
        record,
        coordinate: Coordinate { lat, lon },
    })
}

/// degrees + minutes/60 + seconds/3600, negated for S/W.
fn dms_to_decimal(parts: &[&str], dir: &str) -> Option<f64> {
    if parts.is_empty() || parts.len() > 3 {
        return None;
    }
    let degrees: f64 = parts[0].parse().ok()?;
    let minutes: f64 = parts.get(1).map_or(Some(0.0), |p| p.parse().ok())?;
    let seconds: f64 = parts.get(2).map_or(Some(0.0), |p| p.parse().ok())?;
    let value = degrees + minutes / 60.0 + seconds / 3600.0;
    if dir == "S" || dir == "W" {
        Some(-value)
    } else {
        Some(value)
    }
}

fn join_dms(parts: &[&str]) -> String {
    const MARKS: [&str; 3] = ["°", "′", "″"];
    let mut out = String::new();
    for (i, part) in parts.iter().enumerate() {
        out.push_str(part);
        out.push_str(MARKS.get(i).unwrap_or(&"″"));
    }
    out
}

fn format_degrees(value: f64) -> String {
    // Trim trailing zeros of a fixed-precision rendering.
    let mut s = format!("{:.6}", value);
    while s.ends_with('0') {
        s.pop();
    }
    if s.ends_with('.') {
        s.pop();
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(body: &str) -> TemplateCall {
        TemplateCall::parse(body).unwrap()
    }

    #[test]
    fn test_dms_coordinates() {
        let result = coord(&call("{{coord|35|41|N|139|41|E}}")).unwrap();
        assert!((result.coordinate.lat - 35.6833).abs() < 0.001);
        assert!((result.coordinate.lon - 139.6833).abs() < 0.001);
        assert_eq!(result.record.get("latDir"), Some("N"));
        assert_eq!(result.record.get("lonDir"), Some("E"));
        assert_eq!(result.text, "35°41′N 139°41′E");
    }

    #[test]
    fn test_dms_with_seconds_and_negation() {
        let result = coord(&call("{{coord|33|51|35|S|151|12|40|E}}")).unwrap();
        assert!(result.coordinate.lat < 0.0);
        assert!((result.coordinate.lat + 33.8597).abs() < 0.001);
        assert!((result.coordinate.lon - 151.2111).abs() < 0.001);
    }

    #[test]
    fn test_decimal_coordinates() {
        let result = coord(&call("{{coord|43.651|-79.347}}")).unwrap();
        assert!((result.coordinate.lat - 43.651).abs() < 1e-9);
        assert!((result.coordinate.lon + 79.347).abs() < 1e-9);
        assert_eq!(result.record.get("latDir"), Some("N"));
        assert_eq!(result.record.get("lonDir"), Some("W"));
    }

    #[test]
    fn test_no_coordinate_in_garbage() {
        assert!(coord(&call("{{coord|display=title}}")).is_none());
        assert!(coord(&call("{{coord|N|E}}")).is_none());
    }
}

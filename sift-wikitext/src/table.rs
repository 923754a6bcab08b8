//! Wikitable parsing: `{|` … `|}` blocks into labelled rows.
//!
//! Rows begin at `|-`; header cells use `!` / `!!`, data cells `|` /
//! `||`. Column labels come from the most recent header row, falling
//! back to `col{n}`. Colspan duplicates a cell across columns with empty
//! continuations; rowspan carries the value down subsequent rows.

use crate::document::{Table, TableCell, TableRow};
use crate::links;
use std::collections::HashMap;

/// Nested tables deeper than this are kept as raw cell text.
const MAX_TABLE_DEPTH: usize = 16;

#[derive(Debug, Clone)]
struct RawCell {
    text: String,
    attrs: Option<String>,
    colspan: usize,
    rowspan: usize,
    header: bool,
}

/// Parse one table block, `{|` and `|}` included. Cell and caption text
/// stay raw wikitext; the document builder re-passes them through
/// inline processing.
pub fn parse_table(body: &str) -> Table {
    let mut table = Table::default();
    let mut headers: Vec<String> = Vec::new();
    let mut row: Vec<RawCell> = Vec::new();
    // col index -> (rows remaining, carried cell)
    let mut carried: HashMap<usize, (usize, TableCell)> = HashMap::new();
    let mut nested_depth = 0usize;

    let mut lines = body.lines();
    lines.next(); // `{|` with table attributes

    for line in lines {
        let trimmed = line.trim_start();

        if nested_depth > 0 {
            append_to_last(&mut row, line);
            if trimmed.starts_with("{|") && nested_depth < MAX_TABLE_DEPTH {
                nested_depth += 1;
            } else if trimmed.starts_with("|}") {
                nested_depth -= 1;
            }
            continue;
        }

        if trimmed.starts_with("{|") {
            nested_depth = 1;
            append_to_last(&mut row, line);
        } else if trimmed.starts_with("|}") {
            break;
        } else if let Some(caption) = trimmed.strip_prefix("|+") {
            table.caption = Some(caption.trim().to_string());
        } else if trimmed.starts_with("|-") {
            flush_row(&mut table, &mut headers, &mut row, &mut carried);
        } else if let Some(rest) = trimmed.strip_prefix('!') {
            row.extend(split_cells(rest, "!!").into_iter().map(|c| parse_cell(&c, true)));
        } else if let Some(rest) = trimmed.strip_prefix('|') {
            row.extend(split_cells(rest, "||").into_iter().map(|c| parse_cell(&c, false)));
        } else if !trimmed.is_empty() {
            append_to_last(&mut row, line);
        }
    }
    flush_row(&mut table, &mut headers, &mut row, &mut carried);

    table
}

fn append_to_last(row: &mut [RawCell], line: &str) {
    if let Some(cell) = row.last_mut() {
        cell.text.push('\n');
        cell.text.push_str(line);
    }
}

fn flush_row(
    table: &mut Table,
    headers: &mut Vec<String>,
    row: &mut Vec<RawCell>,
    carried: &mut HashMap<usize, (usize, TableCell)>,
) {
    if row.is_empty() {
        return;
    }
    let cells = std::mem::take(row);

    if cells.iter().all(|c| c.header) {
        *headers = Vec::new();
        for cell in &cells {
            let label = strip_label(&cell.text);
            for _ in 0..cell.colspan {
                headers.push(label.clone());
            }
        }
        return;
    }

    let mut out = TableRow::default();
    let mut col = 0usize;
    let mut incoming: HashMap<usize, (usize, TableCell)> = HashMap::new();

    let mut place = |out: &mut TableRow, col: &mut usize, cell: TableCell, headers: &[String]| {
        let label = headers
            .get(*col)
            .cloned()
            .unwrap_or_else(|| format!("col{}", *col + 1));
        out.cells.push((label, cell));
        *col += 1;
    };

    for cell in cells {
        // A rowspan from an earlier row occupies this column first.
        while let Some((remaining, kept)) = carried.remove(&col) {
            if remaining > 1 {
                incoming.insert(col, (remaining - 1, kept.clone()));
            }
            place(&mut out, &mut col, kept, headers);
        }

        let value = TableCell {
            text: cell.text.trim().to_string(),
            links: Vec::new(),
            attrs: cell.attrs.clone(),
        };
        if cell.rowspan > 1 {
            incoming.insert(col, (cell.rowspan - 1, value.clone()));
        }
        place(&mut out, &mut col, value, headers);

        for _ in 1..cell.colspan {
            place(
                &mut out,
                &mut col,
                TableCell {
                    text: String::new(),
                    links: Vec::new(),
                    attrs: None,
                },
                headers,
            );
        }
    }

    // Rowspans landing past the last parsed cell.
    while let Some((remaining, kept)) = carried.remove(&col) {
        if remaining > 1 {
            incoming.insert(col, (remaining - 1, kept.clone()));
        }
        place(&mut out, &mut col, kept, headers);
    }

    carried.clear();
    carried.extend(incoming);
    table.rows.push(out);
}

/// Header label: links collapsed, quote markup removed, trimmed.
fn strip_label(raw: &str) -> String {
    let (clean, _) = links::collapse_links(raw);
    clean.replace("'''", "").replace("''", "").trim().to_string()
}

fn parse_cell(raw: &str, header: bool) -> RawCell {
    let (attrs, text) = split_attrs(raw);
    let colspan = attr_number(attrs.as_deref(), "colspan").unwrap_or(1).max(1);
    let rowspan = attr_number(attrs.as_deref(), "rowspan").unwrap_or(1).max(1);
    RawCell {
        text: text.trim().to_string(),
        attrs,
        colspan,
        rowspan,
        header,
    }
}

/// `rowspan="2" style="…"| content` — the prefix before a single `|` is
/// an attribute block when it looks like `key=value` and carries no
/// wiki constructs.
fn split_attrs(raw: &str) -> (Option<String>, String) {
    let bytes = raw.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'[' | b'{' => break,
            b'|' => {
                let prefix = &raw[..i];
                if prefix.contains('=') {
                    return (
                        Some(prefix.trim().to_string()),
                        raw[i + 1..].to_string(),
                    );
                }
                break;
            }
            _ => i += 1,
        }
    }
    (None, raw.to_string())
}

fn attr_number(attrs: Option<&str>, key: &str) -> Option<usize> {
    let attrs = attrs?;
    let idx = attrs.to_lowercase().find(key)?;
    let rest = &attrs[idx + key.len()..];
    let rest = rest.trim_start().strip_prefix('=')?.trim_start();
    let rest = rest.trim_start_matches(['"', '\'']);
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

/// Split inline cells on `||` / `!!` outside links and templates.
fn split_cells(content: &str, separator: &str) -> Vec<String> {
    let bytes = content.as_bytes();
    let sep = separator.as_bytes();
    let mut cells = Vec::new();
    let mut bracket = 0usize;
    let mut brace = 0usize;
    let mut seg_start = 0;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i..].starts_with(b"[[") {
            bracket += 1;
            i += 2;
        } else if bytes[i..].starts_with(b"]]") {
            bracket = bracket.saturating_sub(1);
            i += 2;
        } else if bytes[i..].starts_with(b"{{") {
            brace += 1;
            i += 2;
        } else if bytes[i..].starts_with(b"}}") {
            brace = brace.saturating_sub(1);
            i += 2;
        } else if bracket == 0 && brace == 0 && bytes[i..].starts_with(sep) {
            cells.push(content[seg_start..i].to_string());
            i += sep.len();
            seg_start = i;
        } else {
            i += 1;
        }
    }
    cells.push(content[seg_start..].to_string());
    cells
}

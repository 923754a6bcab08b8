//! Document builder: marker stream to [`Document`] tree.
//!
//! The builder preprocesses the raw wikitext, splits it at heading
//! markers, then walks each section body extracting references,
//! templates, infoboxes, categories, tables, lists and images before
//! splitting what remains into paragraphs and sentences.

use crate::document::{
    Document, List, ListItem, ListMarker, Paragraph, Reference, ReferenceForm, ReferenceType,
    Section, Sentence,
};
use crate::lang::DISAMBIG_TITLE_SUFFIXES;
use crate::scanner::{self, MarkerKind, RefForm};
use crate::templates::{self, TemplateCall};
use crate::text::{leading_bold, strip_quotes, tidy};
use crate::{image, infobox, links, sentence, table};
use regex::Regex;
use std::sync::LazyLock;

static MAGIC_WORDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)__(NOTOC|NOEDITSECTION|FORCETOC|TOC)__").expect("magic"));
static SIGNATURES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"~{3,}").expect("tildes"));
static HORIZONTAL_RULE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^-{4,}[ \t]*$").expect("rule"));
static BR_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<br[ \t]*/?>").expect("br"));
static ITALIC_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)</?i>").expect("i tag"));
static BOLD_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)</?b>").expect("b tag"));
static FORMAT_TAGS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)</?(p|span|sub|sup|div|table|tr|td|th|pre|hr|u|nowiki|blockquote|center|small|big)(\s[^>]*)?/?>")
        .expect("format tags")
});
static DECIMAL_ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&#([0-9]{1,7});").expect("decimal entity"));
static HEX_ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&#[xX]([0-9a-fA-F]{1,6});").expect("hex entity"));
static REF_NAME_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)name\s*=\s*"?([^">/]+)"?"#).expect("ref name"));
static BARE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://[^\s\]|<>]+").expect("url"));
static EMPTY_PARENS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([,;: ]+\)").expect("parens"));

#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Overrides the title inferred from the first bold span.
    pub title: Option<String>,
}

/// Accumulators threaded through section processing.
#[derive(Debug, Default)]
struct PageState {
    categories: Vec<String>,
    disambiguation: bool,
    /// Leading bold span of the first paragraph's first sentence; the
    /// title candidate when the caller supplies none.
    bold_title: Option<String>,
    saw_first_paragraph: bool,
}

/// Parse raw wikitext into a [`Document`]. Total: malformed input
/// degrades to plain text, it never fails.
pub fn parse(wikitext: &str, options: &ParseOptions) -> Document {
    let pre = preprocess(wikitext);

    if let Some(found) = crate::lang::REDIRECT_RE.find(&pre) {
        if let Some(doc) = build_redirect(&pre, found.end(), options) {
            return doc;
        }
    }

    let mut doc = Document {
        title: options.title.clone(),
        ..Document::default()
    };
    let mut state = PageState::default();

    for (index, (heading, body)) in split_sections(&pre).into_iter().enumerate() {
        let mut section = Section {
            index,
            ..Section::default()
        };
        if let Some((raw_title, depth)) = heading {
            section.depth = depth;
            section.title = section_title(raw_title, &mut section, &mut state);
        }
        build_section_body(body, &mut section, &mut state);
        doc.sections.push(section);
    }

    doc.categories = state.categories;
    if doc.title.is_none() {
        doc.title = state.bold_title;
    }
    doc.is_disambiguation = state.disambiguation
        || title_is_disambiguation(doc.title.as_deref())
        || first_sentence_is_disambiguation(&doc);

    tracing::debug!(
        sections = doc.sections.len(),
        categories = doc.categories.len(),
        disambiguation = doc.is_disambiguation,
        "parsed document"
    );
    doc
}

/// Pass 1 of the builder: comments, magic words, entities, HTML
/// normalisation. Runs on the whole page before heading splitting.
fn preprocess(text: &str) -> String {
    let mut s = strip_comments(text);
    s = MAGIC_WORDS.replace_all(&s, "").into_owned();
    s = BR_TAG.replace_all(&s, "\n").into_owned();
    s = ITALIC_TAG.replace_all(&s, "''").into_owned();
    s = BOLD_TAG.replace_all(&s, "'''").into_owned();
    s = FORMAT_TAGS.replace_all(&s, "").into_owned();
    s = decode_entities(&s);
    s = s.replace('\u{3002}', ". ");
    s = SIGNATURES.replace_all(&s, "").into_owned();
    s = HORIZONTAL_RULE.replace_all(&s, "").into_owned();
    s = EMPTY_PARENS.replace_all(&s, "").into_owned();
    s
}

/// Comments are elided with a bounded forward search; an unclosed
/// comment swallows the rest of the input.
fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find("<!--") {
        out.push_str(&rest[..open]);
        let after = &rest[open + 4..];
        let window = &after[..after.len().min(3_000)];
        match window.find("-->") {
            Some(close) => rest = &after[close + 3..],
            None => return out,
        }
    }
    out.push_str(rest);
    out
}

fn decode_entities(text: &str) -> String {
    let mut s = text
        .replace("&nbsp;", " ")
        .replace("&ndash;", "\u{2013}")
        .replace("&mdash;", "\u{2014}")
        .replace("&quot;", "\"")
        .replace("&apos;", "'");
    s = DECIMAL_ENTITY
        .replace_all(&s, |caps: &regex::Captures<'_>| {
            caps[1]
                .parse::<u32>()
                .ok()
                .and_then(char::from_u32)
                .map(String::from)
                .unwrap_or_default()
        })
        .into_owned();
    s = HEX_ENTITY
        .replace_all(&s, |caps: &regex::Captures<'_>| {
            u32::from_str_radix(&caps[1], 16)
                .ok()
                .and_then(char::from_u32)
                .map(String::from)
                .unwrap_or_default()
        })
        .into_owned();
    s.replace("&amp;", "&")
}

fn build_redirect(pre: &str, link_open_end: usize, options: &ParseOptions) -> Option<Document> {
    let start = link_open_end - 2;
    let end = scanner::bracket_span(pre.as_bytes(), start)?;
    let inner = &pre[start + 2..end - 2];
    Some(Document {
        title: options.title.clone(),
        is_redirect: true,
        redirect_target: Some(links::parse_internal(inner, None)),
        ..Document::default()
    })
}

type HeadingInfo<'a> = Option<(&'a str, u8)>;

/// Partition the page at heading markers: the intro body, then one
/// `(heading, body)` per heading.
fn split_sections(pre: &str) -> Vec<(HeadingInfo<'_>, &str)> {
    let headings: Vec<(usize, usize, u8)> = scanner::scan(pre)
        .into_iter()
        .filter_map(|m| match m.kind {
            MarkerKind::Heading { depth } => Some((m.start, m.end, depth)),
            _ => None,
        })
        .collect();

    let mut sections = Vec::with_capacity(headings.len() + 1);
    let intro_end = headings.first().map(|(s, _, _)| *s).unwrap_or(pre.len());
    sections.push((None, &pre[..intro_end]));

    for (i, (start, end, depth)) in headings.iter().enumerate() {
        let body_end = headings
            .get(i + 1)
            .map(|(s, _, _)| *s)
            .unwrap_or(pre.len());
        let raw = pre[*start..*end].trim().trim_matches('=').trim();
        sections.push((Some((raw, *depth)), &pre[*end..body_end]));
    }
    sections
}

/// Heading titles carry markup: evaluate templates, collapse links,
/// strip quotes.
fn section_title(raw: &str, section: &mut Section, state: &mut PageState) -> String {
    let eval = templates::expand(raw, 0);
    section.templates.extend(eval.records);
    section.coordinates.extend(eval.coordinates);
    state.disambiguation |= eval.disambiguation;
    let (clean, _) = links::collapse_links(&eval.text);
    let (stripped, _, _) = strip_quotes(&clean);
    tidy(&stripped)
}

fn build_section_body(body: &str, section: &mut Section, state: &mut PageState) {
    let spliced = splice_markers(body, section, state);
    let without_tables = extract_tables(&spliced, section);
    let without_lists = extract_lists(&without_tables, section);
    build_paragraphs(&without_lists, section, state);
}

/// Walk the section's marker stream: refs, templates, infoboxes and
/// categories are extracted and removed; links and file links stay for
/// the paragraph pass.
fn splice_markers(body: &str, section: &mut Section, state: &mut PageState) -> String {
    let markers = scanner::scan(body);
    let mut out = String::with_capacity(body.len());
    let mut pos = 0;

    for marker in markers {
        if marker.start < pos {
            continue;
        }
        out.push_str(&body[pos..marker.start]);
        let slice = marker.slice(body);
        match marker.kind {
            MarkerKind::Comment | MarkerKind::Redirect => {}
            MarkerKind::Ref(form) => section.references.push(parse_reference(slice, form)),
            MarkerKind::CategoryLink => {
                if let Some(name) = category_name(&slice[2..slice.len() - 2]) {
                    state.categories.push(name);
                }
            }
            MarkerKind::Template => {
                match TemplateCall::parse(slice) {
                    Some(call) if templates::is_infobox(&call.name) => {
                        section.infoboxes.push(infobox::parse_infobox(&call));
                    }
                    _ => {
                        let eval = templates::evaluate(slice, 0);
                        out.push_str(&eval.text);
                        section.templates.extend(eval.records);
                        section.coordinates.extend(eval.coordinates);
                        state.disambiguation |= eval.disambiguation;
                    }
                }
            }
            MarkerKind::Link | MarkerKind::FileLink => {
                // Templates inside link targets, display text or file
                // captions evaluate before the link collapses.
                if slice.contains("{{") {
                    let eval = templates::expand(&slice[2..slice.len() - 2], 0);
                    out.push_str("[[");
                    out.push_str(&eval.text);
                    out.push_str("]]");
                    section.templates.extend(eval.records);
                    section.coordinates.extend(eval.coordinates);
                    state.disambiguation |= eval.disambiguation;
                } else {
                    out.push_str(slice);
                }
            }
            MarkerKind::ExternalLink | MarkerKind::Heading { .. } => out.push_str(slice),
        }
        pos = marker.end;
    }
    out.push_str(&body[pos..]);
    out
}

/// `[[Category:Name|sort key]]` → `Name`.
fn category_name(inner: &str) -> Option<String> {
    let (_, rest) = inner.split_once(':')?;
    let name = rest.split('|').next().unwrap_or(rest).trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

fn parse_reference(slice: &str, form: RefForm) -> Reference {
    let form = match form {
        RefForm::Inline => ReferenceForm::Inline,
        RefForm::Named => ReferenceForm::Named,
        RefForm::SelfClosing => ReferenceForm::SelfClosing,
    };
    let gt = slice.find('>').unwrap_or(slice.len().saturating_sub(1));
    let attrs = &slice[4.min(slice.len())..gt];
    let name = REF_NAME_ATTR
        .captures(attrs)
        .map(|c| c[1].trim().to_string())
        .filter(|n| !n.is_empty());

    let content = if form == ReferenceForm::SelfClosing {
        String::new()
    } else {
        slice[gt + 1..slice.len().saturating_sub(6)].to_string()
    };

    let lowered = content.to_lowercase();
    let r#type = if lowered.contains("cite web") {
        ReferenceType::Web
    } else if lowered.contains("cite news") {
        ReferenceType::News
    } else if lowered.contains("cite book") {
        ReferenceType::Book
    } else if lowered.contains("cite journal") {
        ReferenceType::Journal
    } else if lowered.contains("cite magazine") {
        ReferenceType::Magazine
    } else if lowered.contains("cite encyclopedia") {
        ReferenceType::Encyclopedia
    } else if lowered.contains("cite av media") {
        ReferenceType::AvMedia
    } else if lowered.contains("citation") {
        ReferenceType::Citation
    } else {
        ReferenceType::Inline
    };

    let (url, title) = match TemplateCall::parse(content.trim()) {
        Some(call) => (
            call.named("url").map(str::to_string),
            call.named("title").map(str::to_string),
        ),
        None => (
            BARE_URL.find(&content).map(|m| m.as_str().to_string()),
            None,
        ),
    };

    Reference {
        form,
        content,
        name,
        r#type,
        url,
        title,
    }
}

/// Top-level `{|` … `|}` blocks become tables; cell text is re-passed
/// through link collapse and quote stripping.
fn extract_tables(text: &str, section: &mut Section) -> String {
    let mut out = String::with_capacity(text.len());
    let mut block = String::new();
    let mut depth = 0usize;

    for line in text.split_inclusive('\n') {
        let trimmed = line.trim_start();
        if depth == 0 {
            if trimmed.starts_with("{|") {
                depth = 1;
                block.clear();
                block.push_str(line);
            } else {
                out.push_str(line);
            }
            continue;
        }
        block.push_str(line);
        if trimmed.starts_with("{|") {
            depth += 1;
        } else if trimmed.starts_with("|}") {
            depth -= 1;
            if depth == 0 {
                section.tables.push(finish_table(&block));
            }
        }
    }
    if depth > 0 {
        // Unterminated table: keep the block as a table anyway.
        section.tables.push(finish_table(&block));
    }
    out
}

fn finish_table(block: &str) -> crate::document::Table {
    let mut parsed = table::parse_table(block);
    for row in &mut parsed.rows {
        for (_, cell) in &mut row.cells {
            let (clean, cell_links) = links::collapse_links(&cell.text);
            let (stripped, _, _) = strip_quotes(&clean);
            cell.text = tidy(&stripped);
            cell.links = cell_links;
        }
    }
    parsed
}

/// Consecutive `*`, `#`, `;`, `:` lines form a list.
fn extract_lists(text: &str, section: &mut Section) -> String {
    let mut out = String::with_capacity(text.len());
    let mut current: Option<List> = None;

    for line in text.split_inclusive('\n') {
        let trimmed = line.trim_start();
        let is_item = trimmed.starts_with(['*', '#', ';', ':']);
        if !is_item {
            if let Some(list) = current.take() {
                if !list.items.is_empty() {
                    section.lists.push(list);
                }
            }
            out.push_str(line);
            continue;
        }

        let depth = trimmed
            .chars()
            .take_while(|c| matches!(c, '*' | '#' | ';' | ':'))
            .count();
        let marker = match trimmed.chars().nth(depth - 1) {
            Some('#') => ListMarker::Numbered,
            Some(';') => ListMarker::DefinitionTerm,
            Some(':') => ListMarker::DefinitionDef,
            _ => ListMarker::Bullet,
        };
        let raw = trimmed[depth..].trim();
        let (clean, item_links) = links::collapse_links(raw);
        let (stripped, _, _) = strip_quotes(&clean);
        current.get_or_insert_with(List::default).items.push(ListItem {
            marker,
            depth,
            text: tidy(&stripped),
            links: item_links,
        });
    }
    if let Some(list) = current {
        if !list.items.is_empty() {
            section.lists.push(list);
        }
    }
    out
}

/// Blank-line separated paragraphs; file links inside a block become the
/// block's images.
fn build_paragraphs(text: &str, section: &mut Section, state: &mut PageState) {
    for block in split_blocks(text) {
        let mut paragraph = Paragraph::default();
        let without_images = extract_images(&block, &mut paragraph);

        let (clean, link_spans) = links::collapse_with_spans(&without_images);
        let mut leading = None;
        for (start, end) in sentence::split_spans(&clean) {
            let slice = &clean[start..end];
            let (stripped, bold, italic) = strip_quotes(slice);
            let text = tidy(&stripped);
            if text.is_empty() {
                continue;
            }
            if paragraph.sentences.is_empty() {
                // Only a bold span that opens the sentence qualifies as
                // a title candidate.
                leading = leading_bold(slice);
            }
            let sentence_links = link_spans
                .iter()
                .filter(|(_, (s, e))| *s < end && *e > start)
                .map(|(link, _)| link.clone())
                .collect();
            paragraph.sentences.push(Sentence {
                text,
                links: sentence_links,
                bold,
                italic,
            });
        }

        paragraph.links = link_spans.into_iter().map(|(l, _)| l).collect();
        section.images.extend(paragraph.images.iter().cloned());
        if !paragraph.sentences.is_empty() || !paragraph.images.is_empty() {
            if section.index == 0 && !state.saw_first_paragraph {
                state.saw_first_paragraph = true;
                state.bold_title = leading;
            }
            section.paragraphs.push(paragraph);
        }
    }
}

fn split_blocks(text: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current = String::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.trim().is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
            current.clear();
        } else {
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(line);
        }
    }
    if !current.trim().is_empty() {
        blocks.push(current);
    }
    blocks
}

fn extract_images(block: &str, paragraph: &mut Paragraph) -> String {
    let markers = scanner::scan(block);
    let mut out = String::with_capacity(block.len());
    let mut pos = 0;
    for marker in markers {
        if marker.kind != MarkerKind::FileLink || marker.start < pos {
            continue;
        }
        out.push_str(&block[pos..marker.start]);
        let inner = &block[marker.start + 2..marker.end - 2];
        if let Some((mut img, caption)) = image::parse_file_link(inner) {
            if let Some(raw_caption) = caption {
                img.caption = Some(build_sentence(&raw_caption));
            }
            paragraph.images.push(img);
        }
        pos = marker.end;
    }
    out.push_str(&block[pos..]);
    out
}

/// Inline-process one free-standing text fragment into a sentence
/// (image captions).
fn build_sentence(raw: &str) -> Sentence {
    let expanded = templates::expand(raw, 0).text;
    let (clean, sentence_links) = links::collapse_links(&expanded);
    let (stripped, bold, italic) = strip_quotes(&clean);
    Sentence {
        text: tidy(&stripped),
        links: sentence_links,
        bold,
        italic,
    }
}

fn title_is_disambiguation(title: Option<&str>) -> bool {
    match title {
        Some(title) => DISAMBIG_TITLE_SUFFIXES
            .iter()
            .any(|suffix| title.ends_with(suffix)),
        None => false,
    }
}

fn first_sentence_is_disambiguation(doc: &Document) -> bool {
    doc.sections
        .first()
        .and_then(|s| s.paragraphs.first())
        .and_then(|p| p.sentences.first())
        .map(|s| s.text.trim_end().to_lowercase().ends_with("may refer to:"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_default(text: &str) -> Document {
        parse(text, &ParseOptions::default())
    }

    #[test]
    fn test_preprocess_strips_comments_and_magic() {
        assert_eq!(preprocess("a <!-- x --> b__NOTOC__"), "a  b");
    }

    #[test]
    fn test_preprocess_entities() {
        assert_eq!(preprocess("a&nbsp;b &amp; c"), "a b & c");
        assert_eq!(preprocess("&#65;&#x42;"), "AB");
    }

    #[test]
    fn test_preprocess_html() {
        assert_eq!(preprocess("<b>x</b> <i>y</i>"), "'''x''' ''y''");
        assert_eq!(preprocess("a<br/>b"), "a\nb");
        assert_eq!(preprocess("<span class=\"x\">kept</span>"), "kept");
    }

    #[test]
    fn test_preprocess_cjk_stop() {
        assert_eq!(preprocess("東京です。次の文"), "東京です. 次の文");
    }

    #[test]
    fn test_intro_is_section_zero() {
        let doc = parse_default("Intro text here.\n\n== History ==\nLater text.");
        assert_eq!(doc.sections.len(), 2);
        assert_eq!(doc.sections[0].title, "");
        assert_eq!(doc.sections[0].index, 0);
        assert_eq!(doc.sections[1].title, "History");
        assert_eq!(doc.sections[1].depth, 0);
        assert_eq!(doc.sections[1].index, 1);
    }

    #[test]
    fn test_categories_not_links() {
        let doc = parse_default("Text with [[a link]].\n[[Category:Things]]\n[[Category:Other|sort]]");
        assert_eq!(doc.categories, vec!["Things", "Other"]);
        assert_eq!(doc.links().len(), 1);
    }

    #[test]
    fn test_reference_extraction() {
        let doc = parse_default(
            "Fact.<ref>{{cite web|url=https://example.com|title=Source}}</ref> More.<ref name=\"n\" />",
        );
        let refs = doc.references();
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].r#type, ReferenceType::Web);
        assert_eq!(refs[0].url.as_deref(), Some("https://example.com"));
        assert_eq!(refs[0].title.as_deref(), Some("Source"));
        assert_eq!(refs[1].form, ReferenceForm::SelfClosing);
        assert_eq!(refs[1].name.as_deref(), Some("n"));
    }

    #[test]
    fn test_infobox_goes_to_section() {
        let doc = parse_default("{{Infobox person|name=Ada}}\nAda was a mathematician.");
        assert_eq!(doc.infoboxes().len(), 1);
        assert_eq!(doc.infoboxes()[0].r#type, "person");
        assert!(doc.text().contains("Ada was a mathematician."));
    }

    #[test]
    fn test_lists_extracted() {
        let doc = parse_default("Intro.\n* one\n* two\n** nested\n# first\nAfter.");
        let lists = doc.lists();
        assert_eq!(lists.len(), 1);
        let items = &lists[0].items;
        assert_eq!(items.len(), 4);
        assert_eq!(items[0].marker, ListMarker::Bullet);
        assert_eq!(items[2].depth, 2);
        assert_eq!(items[3].marker, ListMarker::Numbered);
    }

    #[test]
    fn test_disambiguation_by_sentence() {
        let doc = parse_default("'''Mercury''' may refer to:\n* [[Mercury (planet)]]");
        assert!(doc.is_disambiguation);
    }

    #[test]
    fn test_disambiguation_by_title_suffix() {
        let doc = parse(
            "Some text.",
            &ParseOptions {
                title: Some("Mercury (disambiguation)".to_string()),
            },
        );
        assert!(doc.is_disambiguation);
    }

    #[test]
    fn test_non_leading_bold_is_not_a_title() {
        let doc = parse_default("The city of '''Toronto''' is large.");
        assert_eq!(doc.title, None);
        // The sentence still records its first bold span.
        assert_eq!(
            doc.sections[0].paragraphs[0].sentences[0].bold.as_deref(),
            Some("Toronto")
        );
    }

    #[test]
    fn test_title_inferred_only_from_first_paragraph() {
        let doc = parse_default("Plain intro paragraph.\n\n'''Late Bold''' in the second.");
        assert_eq!(doc.title, None);
    }

    #[test]
    fn test_title_override_wins() {
        let doc = parse(
            "'''Inferred''' would be this.",
            &ParseOptions {
                title: Some("Given".to_string()),
            },
        );
        assert_eq!(doc.title.as_deref(), Some("Given"));
    }

    #[test]
    fn test_paragraph_and_sentence_links() {
        let doc = parse_default("See [[Toronto]] and [[Ottawa]]. Next sentence has [[Montreal]].");
        let paragraph = &doc.sections[0].paragraphs[0];
        assert_eq!(paragraph.links.len(), 3);
        assert_eq!(paragraph.sentences[0].links.len(), 2);
        assert_eq!(paragraph.sentences[1].links.len(), 1);
    }

    #[test]
    fn test_unparseable_input_degrades_to_text() {
        let doc = parse_default("{{unclosed and [[broken with ''stray quotes");
        assert!(!doc.sections.is_empty());
    }
}

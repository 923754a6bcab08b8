//! The parsed document tree.
//!
//! Ownership flows strictly downward: a [`Document`] owns its sections, a
//! [`Section`] owns its paragraphs, tables, infoboxes, references, images,
//! template records and coordinates, and a [`Paragraph`] owns its sentences
//! and links. There are no back-references; document-level views traverse
//! the tree in source order.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Root of a parsed page.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Document {
    pub title: Option<String>,
    pub is_redirect: bool,
    pub redirect_target: Option<Link>,
    pub is_disambiguation: bool,
    pub sections: Vec<Section>,
    pub categories: Vec<String>,
}

impl Document {
    /// Markup-stripped plain text of every paragraph, in source order.
    /// Redirect pages have no sections and therefore an empty text.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for section in &self.sections {
            for paragraph in &section.paragraphs {
                for sentence in &paragraph.sentences {
                    if !out.is_empty() {
                        out.push(' ');
                    }
                    out.push_str(&sentence.text);
                }
            }
        }
        out
    }

    /// Every link in every paragraph, in source order. Categories are not
    /// links and never appear here.
    pub fn links(&self) -> Vec<&Link> {
        self.sections
            .iter()
            .flat_map(|s| s.paragraphs.iter())
            .flat_map(|p| p.links.iter())
            .collect()
    }

    pub fn images(&self) -> Vec<&Image> {
        self.sections.iter().flat_map(|s| s.images.iter()).collect()
    }

    pub fn references(&self) -> Vec<&Reference> {
        self.sections
            .iter()
            .flat_map(|s| s.references.iter())
            .collect()
    }

    pub fn tables(&self) -> Vec<&Table> {
        self.sections.iter().flat_map(|s| s.tables.iter()).collect()
    }

    pub fn infoboxes(&self) -> Vec<&Infobox> {
        self.sections
            .iter()
            .flat_map(|s| s.infoboxes.iter())
            .collect()
    }

    pub fn lists(&self) -> Vec<&List> {
        self.sections.iter().flat_map(|s| s.lists.iter()).collect()
    }

    pub fn templates(&self) -> Vec<&TemplateRecord> {
        self.sections
            .iter()
            .flat_map(|s| s.templates.iter())
            .collect()
    }

    pub fn coordinates(&self) -> Vec<&Coordinate> {
        self.sections
            .iter()
            .flat_map(|s| s.coordinates.iter())
            .collect()
    }
}

/// One heading-delimited slice of the page. The intro (everything before
/// the first heading) is section 0 with an empty title and depth 0.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Section {
    pub title: String,
    /// 0 for `==…==`, 1 for `===…===`, up to 4.
    pub depth: u8,
    /// 0-based position among the document's sections.
    pub index: usize,
    pub paragraphs: Vec<Paragraph>,
    pub lists: Vec<List>,
    pub tables: Vec<Table>,
    pub infoboxes: Vec<Infobox>,
    pub references: Vec<Reference>,
    pub images: Vec<Image>,
    pub templates: Vec<TemplateRecord>,
    pub coordinates: Vec<Coordinate>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Paragraph {
    pub sentences: Vec<Sentence>,
    pub links: Vec<Link>,
    pub images: Vec<Image>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Sentence {
    pub text: String,
    pub links: Vec<Link>,
    /// Inner text of the first `'''…'''` span, when present.
    pub bold: Option<String>,
    /// Inner text of the first `''…''` span, when present.
    pub italic: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Link {
    /// `[[Page#Anchor|display]]suffix`
    Internal {
        /// Canonical target: first character uppercased, underscores as
        /// spaces.
        page: String,
        anchor: Option<String>,
        /// Display text; defaults to `page + suffix`.
        text: String,
        /// Trailing lowercase letters glued onto `]]`.
        suffix: Option<String>,
    },
    /// `[url display]`
    External { url: String, text: Option<String> },
    /// `[[#Anchor|display]]`
    Anchor { anchor: String, text: String },
    /// `[[wikt:word|display]]`
    Interwiki {
        wiki: String,
        page: String,
        text: String,
    },
}

impl Link {
    /// Text the link collapses to in running prose.
    pub fn display_text(&self) -> &str {
        match self {
            Link::Internal { text, .. } => text,
            Link::External { text, .. } => text.as_deref().unwrap_or(""),
            Link::Anchor { text, .. } => text,
            Link::Interwiki { text, .. } => text,
        }
    }
}

/// One `{{Infobox …}}` template, keyed by normalised parameter name in
/// source order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Infobox {
    /// Lowercased word following `Infobox `, or empty.
    pub r#type: String,
    pub data: Vec<(String, String)>,
    pub links: Vec<Link>,
}

impl Infobox {
    /// Look up a field by its normalised key (`-` and `_` collapse to `_`,
    /// case-insensitive).
    pub fn get(&self, key: &str) -> Option<&str> {
        let wanted = crate::infobox::normalize_key(key);
        self.data
            .iter()
            .find(|(k, _)| *k == wanted)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Table {
    pub caption: Option<String>,
    pub rows: Vec<TableRow>,
}

/// Ordered header-label → cell mapping for one row.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TableRow {
    pub cells: Vec<(String, TableCell)>,
}

impl TableRow {
    pub fn get(&self, label: &str) -> Option<&TableCell> {
        self.cells.iter().find(|(k, _)| k == label).map(|(_, c)| c)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TableCell {
    pub text: String,
    pub links: Vec<Link>,
    pub attrs: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListMarker {
    Bullet,
    Numbered,
    DefinitionTerm,
    DefinitionDef,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListItem {
    pub marker: ListMarker,
    /// Count of leading marker characters.
    pub depth: usize,
    pub text: String,
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct List {
    pub items: Vec<ListItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceForm {
    Inline,
    Named,
    SelfClosing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReferenceType {
    Inline,
    Web,
    News,
    Book,
    Journal,
    Magazine,
    Encyclopedia,
    AvMedia,
    Citation,
}

#[derive(Debug, Clone, Serialize)]
pub struct Reference {
    pub form: ReferenceForm,
    /// Raw wikitext between the ref tags (empty for self-closing refs).
    pub content: String,
    pub name: Option<String>,
    pub r#type: ReferenceType,
    pub url: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageType {
    Thumb,
    Frame,
    Frameless,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageAlign {
    Left,
    Right,
    Center,
    None,
}

/// Percent-encode everything that is not unreserved in a URL path segment.
const FILE_PATH_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'|')
    .add(b'\\')
    .add(b'^')
    .add(b'[')
    .add(b']');

#[derive(Debug, Clone, Serialize)]
pub struct Image {
    /// `File:`-prefixed name, first character of the name uppercased,
    /// spaces as underscores.
    pub file: String,
    pub caption: Option<Sentence>,
    pub alt: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub r#type: Option<ImageType>,
    pub align: Option<ImageAlign>,
    pub valign: Option<String>,
    pub upright: Option<f64>,
    pub border: bool,
    pub link: Option<String>,
    pub lang: Option<String>,
    pub page: Option<String>,
    pub class: Option<String>,
    pub domain: String,
}

impl Default for Image {
    fn default() -> Self {
        Self {
            file: String::new(),
            caption: None,
            alt: None,
            width: None,
            height: None,
            r#type: None,
            align: None,
            valign: None,
            upright: None,
            border: false,
            link: None,
            lang: None,
            page: None,
            class: None,
            domain: "wikipedia.org".to_string(),
        }
    }
}

impl Image {
    /// File name without the namespace prefix.
    pub fn name(&self) -> &str {
        match self.file.split_once(':') {
            Some((_, name)) => name,
            None => &self.file,
        }
    }

    /// `https://{domain}/wiki/Special:Redirect/file/{encoded_name}`.
    pub fn url(&self) -> String {
        let encoded = utf8_percent_encode(self.name(), FILE_PATH_SET);
        format!(
            "https://{}/wiki/Special:Redirect/file/{}",
            self.domain, encoded
        )
    }

    /// Thumbnail URL at the requested width (default 300).
    pub fn thumbnail(&self, size: Option<u32>) -> String {
        format!("{}?width={}", self.url(), size.unwrap_or(300))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    /// Decimal degrees, negative for south.
    pub lat: f64,
    /// Decimal degrees, negative for west.
    pub lon: f64,
}

/// A typed record left behind by the template evaluator. Serialises as a
/// flat map: `{"template": name, key: value, …}`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateRecord {
    pub name: String,
    pub params: Vec<(String, String)>,
}

impl TemplateRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl Serialize for TemplateRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.params.len() + 1))?;
        map.serialize_entry("template", &self.name)?;
        for (k, v) in &self.params {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_url_encoding() {
        let image = Image {
            file: "File:Wikipedesketch1.png".to_string(),
            ..Image::default()
        };
        assert_eq!(
            image.url(),
            "https://wikipedia.org/wiki/Special:Redirect/file/Wikipedesketch1.png"
        );
        assert_eq!(
            image.thumbnail(None),
            "https://wikipedia.org/wiki/Special:Redirect/file/Wikipedesketch1.png?width=300"
        );
        assert_eq!(image.thumbnail(Some(120)).ends_with("?width=120"), true);
    }

    #[test]
    fn test_image_url_percent_encodes_spaces_as_underscores_upstream() {
        // The builder normalises spaces to underscores before the Image is
        // constructed; url() still escapes anything that slipped through.
        let image = Image {
            file: "File:A_\"quoted\"_name.png".to_string(),
            ..Image::default()
        };
        assert!(image.url().contains("A_%22quoted%22_name.png"));
    }

    #[test]
    fn test_template_record_roundtrip_keys() {
        let record = TemplateRecord::new("birth date")
            .with("year", "1990")
            .with("month", "5")
            .with("day", "15");
        assert_eq!(record.get("year"), Some("1990"));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["template"], "birth date");
        assert_eq!(json["day"], "15");
    }

    #[test]
    fn test_redirect_document_has_empty_text() {
        let doc = Document {
            is_redirect: true,
            redirect_target: Some(Link::Internal {
                page: "Toronto Blue Jays".to_string(),
                anchor: Some("Stadium".to_string()),
                text: "Tranno".to_string(),
                suffix: None,
            }),
            ..Document::default()
        };
        assert_eq!(doc.text(), "");
        assert!(doc.redirect_target.is_some());
    }
}

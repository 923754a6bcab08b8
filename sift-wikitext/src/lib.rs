//! sift-wikitext: single-pass MediaWiki wikitext parser.
//!
//! [`parse`] converts raw wikitext into a structured [`Document`] tree:
//! sections, paragraphs, sentences, links, infoboxes, tables, lists,
//! references, images, categories, coordinates and template records.
//! Parsing is total; structurally broken markup degrades to plain text.
//!
//! ```
//! use sift_wikitext::{parse, ParseOptions};
//!
//! let doc = parse("'''Toronto''' is a city in [[Canada]].", &ParseOptions::default());
//! assert_eq!(doc.title.as_deref(), Some("Toronto"));
//! assert_eq!(doc.links().len(), 1);
//! ```

pub mod builder;
pub mod document;
pub mod image;
pub mod infobox;
pub mod lang;
pub mod links;
pub mod scanner;
pub mod sentence;
pub mod table;
pub mod templates;
mod text;

pub use builder::{parse, ParseOptions};
pub use document::{
    Coordinate, Document, Image, ImageAlign, ImageType, Infobox, Link, List, ListItem,
    ListMarker, Paragraph, Reference, ReferenceForm, ReferenceType, Section, Sentence, Table,
    TableCell, TableRow, TemplateRecord,
};

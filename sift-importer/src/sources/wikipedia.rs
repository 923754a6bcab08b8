//! Streaming reader for MediaWiki XML dumps.
//!
//! Pages are pulled one at a time from the (possibly bz2-compressed)
//! dump, fully parsed with `sift-wikitext`, and emitted as
//! [`ArticleRecord`]s. Non-main-namespace pages and redirects are
//! skipped.

use async_trait::async_trait;
use bzip2::read::MultiBzDecoder;
use futures::Stream;
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::pin::Pin;

use crate::classify::classify;
use crate::error::{ImportError, Result};
use crate::sources::ArticleSource;
use sift::ArticleRecord;
use sift_wikitext::{parse, Document, ParseOptions};

/// Articles shorter than this after markup stripping are stubs and are
/// not indexed.
const MIN_CONTENT_CHARS: usize = 50;

pub struct WikipediaDump {
    path: PathBuf,
}

impl WikipediaDump {
    pub fn new(path: PathBuf) -> Result<Self> {
        if !path.exists() {
            return Err(ImportError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("File not found: {}", path.display()),
            )));
        }
        Ok(Self { path })
    }
}

fn is_bz2(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("bz2")
}

/// Open the dump for sequential reading. Multistream archives carry
/// many concatenated bz2 blocks, so the multi-stream decoder is
/// required to read past the first one.
fn open_dump(path: &Path) -> Result<Box<dyn BufRead + Send>> {
    let file = File::open(path)?;
    if is_bz2(path) {
        Ok(Box::new(BufReader::new(MultiBzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// One `<page>` element worth of dump data.
#[derive(Debug, Default)]
struct RawPage {
    title: String,
    id: String,
    ns: String,
    text: String,
    is_redirect: bool,
}

/// Which element's character data is currently being collected.
///
/// The decision keys on the element name and how deep below `<page>`
/// it opens: the page metadata sits directly under the page element
/// (which also keeps the revision's own `<id>` out of [`Capture::PageId`]),
/// while the wikitext sits inside `<revision>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Capture {
    Nothing,
    Title,
    PageId,
    Namespace,
    Text,
}

impl Capture {
    fn for_element(name: &[u8], depth_below_page: usize) -> Capture {
        match (name, depth_below_page) {
            (b"title", 0) => Capture::Title,
            (b"id", 0) => Capture::PageId,
            (b"ns", 0) => Capture::Namespace,
            (b"text", _) => Capture::Text,
            _ => Capture::Nothing,
        }
    }
}

/// Pull-based `<page>` iterator over any buffered source.
struct Pages<R: BufRead> {
    xml: Reader<R>,
    buf: Vec<u8>,
    done: bool,
}

impl<R: BufRead> Pages<R> {
    fn new(source: R) -> Self {
        Self {
            xml: Reader::from_reader(source),
            buf: Vec::with_capacity(16 * 1024),
            done: false,
        }
    }

    /// Skip forward to the next `<page>` element and collect it.
    fn next_page(&mut self) -> Result<Option<RawPage>> {
        loop {
            self.buf.clear();
            let at_page = match self.xml.read_event_into(&mut self.buf) {
                Ok(Event::Start(ref e)) => e.local_name().as_ref() == b"page",
                Ok(Event::Eof) => return Ok(None),
                Ok(_) => false,
                Err(e) => return Err(ImportError::XmlParse(e.to_string())),
            };
            if at_page {
                return self.collect_page().map(Some);
            }
        }
    }

    /// Collect character data until the matching `</page>`. A dump
    /// truncated mid-page yields whatever was read.
    fn collect_page(&mut self) -> Result<RawPage> {
        let mut page = RawPage::default();
        let mut depth_below_page = 0usize;
        let mut capture = Capture::Nothing;

        loop {
            self.buf.clear();
            match self.xml.read_event_into(&mut self.buf) {
                Ok(Event::Start(ref e)) => {
                    capture = Capture::for_element(e.local_name().as_ref(), depth_below_page);
                    depth_below_page += 1;
                }
                Ok(Event::End(_)) => {
                    capture = Capture::Nothing;
                    if depth_below_page == 0 {
                        return Ok(page);
                    }
                    depth_below_page -= 1;
                }
                Ok(Event::Empty(ref e)) => {
                    if e.local_name().as_ref() == b"redirect" {
                        page.is_redirect = true;
                    }
                }
                Ok(Event::Text(ref t)) => {
                    let value = t
                        .unescape()
                        .map_err(|e| ImportError::XmlParse(e.to_string()))?;
                    match capture {
                        Capture::Title => page.title.push_str(value.trim()),
                        Capture::PageId => page.id.push_str(value.trim()),
                        Capture::Namespace => page.ns.push_str(value.trim()),
                        Capture::Text => page.text.push_str(&value),
                        Capture::Nothing => {}
                    }
                }
                Ok(Event::Eof) => return Ok(page),
                Ok(_) => {}
                Err(e) => return Err(ImportError::XmlParse(e.to_string())),
            }
        }
    }
}

impl<R: BufRead> Iterator for Pages<R> {
    type Item = Result<RawPage>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_page() {
            Ok(Some(page)) => Some(Ok(page)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Full-parse a raw page into an article record. `None` for pages that
/// should not be indexed.
fn page_to_article(page: RawPage) -> Option<ArticleRecord> {
    if page.ns != "0" || page.is_redirect || page.text.is_empty() {
        return None;
    }

    let doc = parse(
        &page.text,
        &ParseOptions {
            title: Some(page.title.clone()),
        },
    );
    if doc.is_redirect {
        return None;
    }

    let content = doc.text();
    if content.chars().count() < MIN_CONTENT_CHARS {
        tracing::debug!(title = %page.title, "skipping stub article");
        return None;
    }

    Some(ArticleRecord {
        id: page.id,
        title: page.title,
        description: intro_summary(&doc),
        content,
        article_type: classify(&doc),
    })
}

/// Plain text of the intro's first paragraph.
fn intro_summary(doc: &Document) -> String {
    doc.sections
        .first()
        .and_then(|s| s.paragraphs.first())
        .map(|p| {
            p.sentences
                .iter()
                .map(|s| s.text.as_str())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default()
}

/// Blocking read-parse loop. Runs until the dump ends or the receiver
/// hangs up.
fn pump_articles(path: &Path, tx: &tokio::sync::mpsc::Sender<Result<ArticleRecord>>) {
    let pages = match open_dump(path) {
        Ok(reader) => Pages::new(reader),
        Err(e) => {
            let _ = tx.blocking_send(Err(e));
            return;
        }
    };
    for result in pages {
        let item = match result {
            Ok(page) => match page_to_article(page) {
                Some(article) => Ok(article),
                None => continue,
            },
            Err(e) => Err(e),
        };
        if tx.blocking_send(item).is_err() {
            return;
        }
    }
}

#[async_trait]
impl ArticleSource for WikipediaDump {
    async fn count_documents(&self) -> Result<u64> {
        // Progress-bar sizing only. Dump pages run a few KB of XML
        // each, with roughly 8:1 bz2 compression.
        let bytes = tokio::fs::metadata(&self.path).await?.len();
        let per_page = if is_bz2(&self.path) { 1_024 } else { 8 * 1_024 };
        Ok((bytes / per_page).max(1))
    }

    fn stream_articles(&self) -> Pin<Box<dyn Stream<Item = Result<ArticleRecord>> + Send + '_>> {
        let path = self.path.clone();
        Box::pin(async_stream::try_stream! {
            let (tx, mut rx) = tokio::sync::mpsc::channel::<Result<ArticleRecord>>(256);

            // Decompression and parsing are CPU-bound; keep them off
            // the async executor.
            tokio::task::spawn_blocking(move || pump_articles(&path, &tx));

            while let Some(item) = rx.recv().await {
                yield item?;
            }
        })
    }

    fn source_name(&self) -> &str {
        "wikipedia"
    }
}

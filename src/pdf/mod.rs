//! PDF document access and rewriting
//!
//! `PdfFile` is the scoped document resource for a redaction run: it
//! validates input on open, exposes per-page text and layout, applies
//! content-stream redactions, strips metadata, and persists a
//! flattened copy. The handle is released on every exit path by drop.

pub mod redact;
pub mod text;

use std::path::{Path, PathBuf};

use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::types::{PageContent, Region};

pub struct PdfFile {
    doc: Document,
    /// Page object ids in page-number order
    pages: Vec<ObjectId>,
    path: PathBuf,
}

impl PdfFile {
    /// Opens and validates an input document. Rejects missing files,
    /// non-PDF paths, unparseable documents, and documents without any
    /// extractable text (scanned image-only files).
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::Input(format!(
                "input file not found: {}",
                path.display()
            )));
        }
        let is_pdf = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("pdf"))
            .unwrap_or(false);
        if !is_pdf {
            return Err(Error::Input("only PDF files are supported".into()));
        }

        let doc = Document::load(path)
            .map_err(|e| Error::Input(format!("failed to parse PDF: {}", e)))?;
        let pages: Vec<ObjectId> = doc.get_pages().values().cloned().collect();
        if pages.is_empty() {
            return Err(Error::Input("document has no pages".into()));
        }

        let file = Self {
            doc,
            pages,
            path: path.to_path_buf(),
        };

        if file.full_text().trim().is_empty() {
            return Err(Error::Input(
                "document has no selectable text; scanned documents are not supported".into(),
            ));
        }

        debug!("Opened {} ({} pages)", file.path.display(), file.pages.len());
        Ok(file)
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Concatenated text of every page, blocks joined by newlines.
    /// This is the document-scoped detection input.
    pub fn full_text(&self) -> String {
        let mut out = String::new();
        for number in 1..=self.pages.len() as u32 {
            out.push_str(&self.doc.extract_text(&[number]).unwrap_or_default());
            out.push('\n');
        }
        out
    }

    /// Extracts one page's raw text and layout lines. Decoding the
    /// page's content streams into a single operation list also
    /// normalizes overlapping streams, so later rewriting cannot drift
    /// from what was searched.
    pub fn page_content(&self, index: usize) -> Result<PageContent> {
        let page_id = self.page_id(index)?;
        let raw_text = self
            .doc
            .extract_text(&[index as u32 + 1])
            .unwrap_or_default();

        let data = self.doc.get_page_content(page_id)?;
        let content = Content::decode(&data)?;

        Ok(PageContent {
            index,
            raw_text,
            lines: text::layout_lines(&content),
        })
    }

    /// Permanently overwrites the given regions on one page: the
    /// intersecting text operations are removed from the content
    /// stream and opaque fills drawn in their place.
    pub fn apply_redactions(
        &mut self,
        index: usize,
        regions: &[Region],
        fill_color: [f32; 3],
    ) -> Result<usize> {
        let page_id = self.page_id(index)?;
        let data = self.doc.get_page_content(page_id)?;
        let content = Content::decode(&data)?;

        let (redacted, removed) = redact::redact_content(content, regions, fill_color);
        let encoded = redacted.encode()?;
        self.doc.change_page_content(page_id, encoded)?;

        debug!(
            "Page {}: {} regions filled, {} text operations removed",
            index + 1,
            regions.len(),
            removed
        );
        Ok(removed)
    }

    /// Clears the Info dictionary and removes XMP metadata streams,
    /// including the catalog's reference to them.
    pub fn strip_metadata(&mut self) {
        if let Ok(info_id) = self
            .doc
            .trailer
            .get(b"Info")
            .and_then(Object::as_reference)
        {
            if let Ok(obj) = self.doc.get_object_mut(info_id) {
                *obj = Object::Dictionary(Dictionary::new());
            }
        }
        self.doc.trailer.remove(b"Info");

        let xmp_ids: Vec<ObjectId> = self
            .doc
            .objects
            .iter()
            .filter_map(|(id, obj)| match obj {
                Object::Stream(stream)
                    if stream
                        .dict
                        .get(b"Type")
                        .and_then(Object::as_name)
                        .map(|name| name == b"Metadata".as_ref())
                        .unwrap_or(false) =>
                {
                    Some(*id)
                }
                _ => None,
            })
            .collect();
        for id in &xmp_ids {
            self.doc.objects.remove(id);
        }

        if let Ok(root_id) = self
            .doc
            .trailer
            .get(b"Root")
            .and_then(Object::as_reference)
        {
            if let Ok(Object::Dictionary(catalog)) = self.doc.get_object_mut(root_id) {
                catalog.remove(b"Metadata");
            }
        }

        info!(
            "Cleared document metadata ({} XMP streams removed)",
            xmp_ids.len()
        );
    }

    /// Persists a flattened copy: unreferenced objects pruned, object
    /// numbers rewritten, streams recompressed.
    pub fn save_flattened(&mut self, output: &Path) -> Result<()> {
        self.doc.prune_objects();
        self.doc.renumber_objects();
        self.doc.compress();
        self.doc
            .save(output)
            .map_err(|e| Error::Persistence(e.to_string()))?;
        Ok(())
    }

    fn page_id(&self, index: usize) -> Result<ObjectId> {
        self.pages
            .get(index)
            .copied()
            .ok_or_else(|| Error::Input(format!("page {} out of range", index + 1)))
    }
}

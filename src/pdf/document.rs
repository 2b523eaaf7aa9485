use crate::error::{PageError, Result};
use crate::page_range::PageSpec;
use crate::pdf::{PageRef, Rotation};
use lopdf::{Document, Object, ObjectId};
use std::path::Path;

/// A parsed, read-only input PDF.
#[derive(Debug)]
pub struct SourceDocument {
    doc: Document,
    name: String,
    page_ids: Vec<ObjectId>,
}

impl SourceDocument {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        Self::from_bytes(path.display().to_string(), &bytes)
    }

    /// Parse an in-memory PDF. Corrupt and encrypted input is rejected.
    pub fn from_bytes(name: impl Into<String>, bytes: &[u8]) -> Result<Self> {
        let name = name.into();
        let doc = Document::load_mem(bytes).map_err(|e| PageError::MalformedDocument {
            name: name.clone(),
            reason: e.to_string(),
        })?;

        if doc.is_encrypted() {
            return Err(PageError::MalformedDocument {
                name,
                reason: "document is encrypted".to_string(),
            });
        }

        // get_pages is keyed by 1-based page number, so values come out in page order
        let page_ids = doc.get_pages().into_values().collect();
        Ok(SourceDocument {
            doc,
            name,
            page_ids,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn page_count(&self) -> u32 {
        self.page_ids.len() as u32
    }

    /// Reference to the page at a 0-based index.
    pub fn page(&self, index: u32) -> Option<PageRef<'_>> {
        (index < self.page_count()).then_some(PageRef {
            source: self,
            index,
            rotation: Rotation::None,
        })
    }

    /// References to every page, in natural order.
    pub fn pages(&self) -> impl Iterator<Item = PageRef<'_>> + '_ {
        (0..self.page_count()).filter_map(move |index| self.page(index))
    }

    /// References to the pages of `spec`, in the order of `spec`.
    pub fn select(&self, spec: &PageSpec) -> Vec<PageRef<'_>> {
        spec.indices()
            .iter()
            .filter_map(|&index| self.page(index))
            .collect()
    }

    pub(crate) fn document(&self) -> &Document {
        &self.doc
    }

    pub(crate) fn page_id(&self, index: u32) -> Option<ObjectId> {
        self.page_ids.get(index as usize).copied()
    }

    /// Get metadata from the document info dictionary
    pub fn get_info(&self) -> PdfInfo {
        let mut info = PdfInfo {
            version: self.doc.version.clone(),
            page_count: self.page_count(),
            ..Default::default()
        };

        if let Ok(Object::Reference(info_ref)) = self.doc.trailer.get(b"Info") {
            if let Ok(Object::Dictionary(dict)) = self.doc.get_object(*info_ref) {
                info.title = get_string_from_dict(dict, b"Title");
                info.author = get_string_from_dict(dict, b"Author");
                info.creator = get_string_from_dict(dict, b"Creator");
                info.producer = get_string_from_dict(dict, b"Producer");
            }
        }

        info
    }
}

#[derive(Debug, Default, Clone)]
pub struct PdfInfo {
    pub version: String,
    pub page_count: u32,
    pub title: Option<String>,
    pub author: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
}

fn get_string_from_dict(dict: &lopdf::Dictionary, key: &[u8]) -> Option<String> {
    dict.get(key).ok().and_then(|obj| match obj {
        Object::String(bytes, _) => decode_pdf_string(bytes),
        _ => None,
    })
}

fn decode_pdf_string(bytes: &[u8]) -> Option<String> {
    // UTF-16BE with BOM, otherwise treat as PDFDocEncoding (approximated by Latin-1)
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16(&units).ok()
    } else {
        Some(bytes.iter().map(|&b| b as char).collect())
    }
}

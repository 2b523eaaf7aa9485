use crate::error::{PageError, Result};
use crate::pdf::{PageRef, SourceDocument};
use log::debug;
use lopdf::{Dictionary, Document, Object, ObjectId};

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// A new PDF assembled page by page from one or more sources.
///
/// The first page taken from a source imports that source's objects under
/// fresh object numbers; pages are then appended as independent copies
/// parented to this document's own page tree. Unreferenced leftovers are
/// pruned on [`OutputDocument::serialize`].
pub struct OutputDocument<'a> {
    doc: Document,
    pages_id: ObjectId,
    kids: Vec<ObjectId>,
    imported: Vec<(&'a SourceDocument, u32)>,
}

impl<'a> OutputDocument<'a> {
    pub fn new() -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        OutputDocument {
            doc,
            pages_id,
            kids: Vec::new(),
            imported: Vec::new(),
        }
    }

    pub fn page_count(&self) -> usize {
        self.kids.len()
    }

    /// Append a copy of `page`, applying its pending rotation.
    pub fn append(&mut self, page: PageRef<'a>) -> Result<()> {
        let source = page.source();
        let source_id = source
            .page_id(page.index())
            .ok_or(PageError::PageOutOfRange {
                page: u64::from(page.index()) + 1,
                total: source.page_count(),
            })?;
        let offset = self.import(source);

        let source_doc = source.document();
        let mut dict = source_doc.get_dictionary(source_id)?.clone();
        for key in INHERITABLE {
            if !dict.has(key) {
                if let Some(value) = resolve_inherited(source_doc, source_id, key) {
                    dict.set(key, value.clone());
                }
            }
        }

        let mut dict = remap_dictionary(dict, offset);
        dict.set("Parent", Object::Reference(self.pages_id));

        if page.rotation().degrees() != 0 {
            let current = dict.get(b"Rotate").ok().and_then(rotate_value).unwrap_or(0);
            dict.set("Rotate", Object::Integer(page.rotation().apply_to(current)));
        }

        let id = self.doc.add_object(dict);
        self.kids.push(id);
        debug!(
            "Appended page {} of {} as object {:?}",
            page.index() + 1,
            source.name(),
            id
        );
        Ok(())
    }

    /// Finish the page tree and write the document out.
    pub fn serialize(mut self) -> Result<Vec<u8>> {
        let kids = self.kids.iter().map(|&id| Object::Reference(id)).collect();
        let pages = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(kids)),
            ("Count", Object::Integer(self.kids.len() as i64)),
        ]);
        self.doc
            .objects
            .insert(self.pages_id, Object::Dictionary(pages));

        let catalog_id = self.doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(self.pages_id)),
        ]));
        self.doc.trailer.set("Root", Object::Reference(catalog_id));

        self.doc.prune_objects();
        self.doc.renumber_objects();

        let mut buffer = Vec::new();
        self.doc.save_to(&mut buffer)?;
        Ok(buffer)
    }

    /// Copy every object of `source` into this document once, returning the
    /// object-number offset its objects were stored under.
    fn import(&mut self, source: &'a SourceDocument) -> u32 {
        if let Some(&(_, offset)) = self
            .imported
            .iter()
            .find(|(imported, _)| std::ptr::eq(*imported, source))
        {
            return offset;
        }

        let offset = self.doc.max_id;
        let source_doc = source.document();
        for (&(number, generation), object) in &source_doc.objects {
            self.doc
                .objects
                .insert((number + offset, generation), remap_refs(object.clone(), offset));
        }
        let highest = source_doc
            .objects
            .keys()
            .map(|&(number, _)| number)
            .max()
            .unwrap_or(0)
            .max(source_doc.max_id);
        self.doc.max_id = offset + highest;
        self.imported.push((source, offset));
        offset
    }
}

impl Default for OutputDocument<'_> {
    fn default() -> Self {
        Self::new()
    }
}

fn resolve_inherited<'d>(doc: &'d Document, page_id: ObjectId, key: &[u8]) -> Option<&'d Object> {
    let mut current = doc.get_dictionary(page_id).ok()?;
    // Bounded walk; a malformed tree can contain a Parent cycle.
    for _ in 0..64 {
        if let Ok(value) = current.get(key) {
            return Some(value);
        }
        let parent = current.get(b"Parent").and_then(Object::as_reference).ok()?;
        current = doc.get_dictionary(parent).ok()?;
    }
    None
}

fn rotate_value(object: &Object) -> Option<i64> {
    object
        .as_i64()
        .ok()
        .or_else(|| object.as_float().ok().map(|f| f as i64))
}

fn remap_refs(object: Object, offset: u32) -> Object {
    match object {
        Object::Reference((number, generation)) => Object::Reference((number + offset, generation)),
        Object::Array(items) => Object::Array(
            items
                .into_iter()
                .map(|item| remap_refs(item, offset))
                .collect(),
        ),
        Object::Dictionary(dict) => Object::Dictionary(remap_dictionary(dict, offset)),
        Object::Stream(mut stream) => {
            stream.dict = remap_dictionary(stream.dict, offset);
            Object::Stream(stream)
        }
        other => other,
    }
}

fn remap_dictionary(mut dict: Dictionary, offset: u32) -> Dictionary {
    for (_, value) in dict.iter_mut() {
        *value = remap_refs(std::mem::replace(value, Object::Null), offset);
    }
    dict
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::fixtures::{page_markers, page_rotations, test_pdf, test_pdf_with_rotation};
    use crate::pdf::Rotation;

    #[test]
    fn test_copies_selected_pages_in_order() {
        let source = SourceDocument::from_bytes("a.pdf", &test_pdf(4, "A")).unwrap();
        let mut out = OutputDocument::new();
        for index in [3, 0, 2] {
            out.append(source.page(index).unwrap()).unwrap();
        }
        assert_eq!(out.page_count(), 3);

        let bytes = out.serialize().unwrap();
        assert_eq!(page_markers(&bytes), vec!["A-Page-4", "A-Page-1", "A-Page-3"]);
    }

    #[test]
    fn test_interleaves_sources() {
        let a = SourceDocument::from_bytes("a.pdf", &test_pdf(2, "A")).unwrap();
        let b = SourceDocument::from_bytes("b.pdf", &test_pdf(2, "B")).unwrap();
        let mut out = OutputDocument::new();
        out.append(b.page(1).unwrap()).unwrap();
        out.append(a.page(0).unwrap()).unwrap();
        out.append(b.page(0).unwrap()).unwrap();

        let bytes = out.serialize().unwrap();
        assert_eq!(page_markers(&bytes), vec!["B-Page-2", "A-Page-1", "B-Page-1"]);
    }

    #[test]
    fn test_same_page_twice_is_two_pages() {
        let source = SourceDocument::from_bytes("a.pdf", &test_pdf(1, "A")).unwrap();
        let mut out = OutputDocument::new();
        out.append(source.page(0).unwrap()).unwrap();
        out.append(source.page(0).unwrap().rotated(Rotation::Right)).unwrap();

        let bytes = out.serialize().unwrap();
        assert_eq!(page_markers(&bytes), vec!["A-Page-1", "A-Page-1"]);
        assert_eq!(page_rotations(&bytes), vec![0, 90]);
    }

    #[test]
    fn test_inherited_attributes_are_copied() {
        let source = SourceDocument::from_bytes("a.pdf", &test_pdf(2, "A")).unwrap();
        let mut out = OutputDocument::new();
        out.append(source.page(1).unwrap()).unwrap();
        let bytes = out.serialize().unwrap();

        let doc = Document::load_mem(&bytes).unwrap();
        let (_, page_id) = doc.get_pages().into_iter().next().unwrap();
        let page = doc.get_dictionary(page_id).unwrap();
        assert!(page.has(b"MediaBox"));
        assert!(page.has(b"Resources"));
    }

    #[test]
    fn test_rotation_accumulates_with_inherited() {
        let source =
            SourceDocument::from_bytes("a.pdf", &test_pdf_with_rotation(2, "A", Some(90))).unwrap();
        let mut out = OutputDocument::new();
        for page in source.pages() {
            out.append(page.rotated(Rotation::Down)).unwrap();
        }
        let bytes = out.serialize().unwrap();
        assert_eq!(page_rotations(&bytes), vec![270, 270]);
    }

    #[test]
    fn test_source_is_untouched() {
        let bytes = test_pdf(1, "A");
        let source = SourceDocument::from_bytes("a.pdf", &bytes).unwrap();
        let mut out = OutputDocument::new();
        out.append(source.page(0).unwrap().rotated(Rotation::Left)).unwrap();
        out.serialize().unwrap();

        let mut again = OutputDocument::new();
        again.append(source.page(0).unwrap()).unwrap();
        assert_eq!(page_rotations(&again.serialize().unwrap()), vec![0]);
    }
}

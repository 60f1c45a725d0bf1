//! PDF backend abstraction layer.
//!
//! The page operations only need to load a document, count its pages,
//! build a new document out of selected pages and serialize the result.
//! [`PdfBackend`] captures exactly that, isolating the concrete PDF
//! library (lopdf) from the partitioning logic.

use std::collections::{BTreeMap, BTreeSet};

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

use crate::detect::pdf_version;
use crate::error::{Error, Result};
use crate::source::Source;

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Guard against cyclic `Parent` chains in broken files.
const MAX_TREE_DEPTH: usize = 64;

/// Pages taken from one input document, in output order.
#[derive(Debug)]
pub struct Selection<'a, B> {
    /// Document the pages come from.
    pub document: &'a B,
    /// 1-based page numbers.
    pub pages: Vec<u32>,
}

impl<'a, B: PdfBackend> Selection<'a, B> {
    /// Select the given 1-based pages.
    pub fn new(document: &'a B, pages: impl IntoIterator<Item = u32>) -> Self {
        Self {
            document,
            pages: pages.into_iter().collect(),
        }
    }

    /// Select every page of the document.
    pub fn all(document: &'a B) -> Self {
        Self::new(document, 1..=document.page_count())
    }
}

/// Abstract interface for the document loader and writer.
pub trait PdfBackend: Sized + Send + Sync {
    /// Load a document. Malformed input fails with a parse error
    /// (see [`Error::is_parse_error`]).
    fn load(source: Source<'_>) -> Result<Self>;

    /// Number of pages.
    fn page_count(&self) -> u32;

    /// Build a new document holding the selected pages, selection by
    /// selection, in order.
    fn assemble(selections: &[Selection<'_, Self>]) -> Result<Self>;

    /// Serialize the document.
    fn into_bytes(self) -> Result<Vec<u8>>;
}

/// Check a selection against its document before copying anything.
pub(crate) fn validate_selection(pages: &[u32], page_count: u32) -> Result<()> {
    let mut seen = BTreeSet::new();
    for &page in pages {
        if page == 0 || page > page_count {
            return Err(Error::invalid_argument(format!(
                "page {} is out of range (document has {} pages)",
                page, page_count
            )));
        }
        if !seen.insert(page) {
            return Err(Error::invalid_argument(format!(
                "page {} selected twice from the same document",
                page
            )));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// LopdfBackend: concrete implementation backed by lopdf
// ---------------------------------------------------------------------------

/// Concrete [`PdfBackend`] backed by `lopdf::Document`.
#[derive(Debug, Clone)]
pub struct LopdfBackend {
    doc: LopdfDocument,
}

impl LopdfBackend {
    /// Wrap an already loaded document.
    pub fn from_document(doc: LopdfDocument) -> Self {
        Self { doc }
    }

    /// Direct access to the underlying `lopdf::Document`.
    pub fn document(&self) -> &LopdfDocument {
        &self.doc
    }

    /// PDF version string from the header.
    pub fn version(&self) -> &str {
        &self.doc.version
    }
}

impl PdfBackend for LopdfBackend {
    fn load(source: Source<'_>) -> Result<Self> {
        let data = source.read()?;
        pdf_version(&data)?;

        let doc = LopdfDocument::load_mem(&data)?;
        if doc.is_encrypted() {
            return Err(Error::Encrypted);
        }

        log::debug!(
            "loaded {} (PDF {}, {} pages)",
            source.describe(),
            doc.version,
            doc.get_pages().len()
        );
        Ok(Self { doc })
    }

    fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    fn assemble(selections: &[Selection<'_, Self>]) -> Result<Self> {
        let version = selections
            .first()
            .map(|s| s.document.doc.version.clone())
            .unwrap_or_else(|| "1.7".to_string());

        let mut out = LopdfDocument::with_version(version);
        let pages_id = out.new_object_id();
        let mut kids = Vec::new();

        for selection in selections {
            validate_selection(&selection.pages, selection.document.page_count())?;

            let source = &selection.document.doc;
            let page_ids = source.get_pages();
            let chosen: Vec<ObjectId> = selection
                .pages
                .iter()
                .filter_map(|number| page_ids.get(number).copied())
                .collect();

            let mut copier = ObjectCopier::new(source);
            for &page_id in &chosen {
                copier.reserve(&mut out, page_id);
            }

            for &page_id in &chosen {
                let mut page = source.get_dictionary(page_id)?.clone();
                page.remove(b"Parent");
                for (key, value) in inherited_attributes(source, page_id)? {
                    page.set(key, value);
                }
                copier.rewrite_dictionary(&mut out, &mut page);
                page.set("Parent", Object::Reference(pages_id));

                let new_id = copier.reserve(&mut out, page_id);
                out.objects.insert(new_id, Object::Dictionary(page));
                kids.push(Object::Reference(new_id));
            }

            copier.copy_pending(&mut out)?;
        }

        let count = kids.len() as i64;
        let pages = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(kids)),
            ("Count", Object::Integer(count)),
        ]);
        out.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(pages_id)),
        ]);
        let catalog_id = out.add_object(catalog);
        out.trailer.set("Root", Object::Reference(catalog_id));

        Ok(Self { doc: out })
    }

    fn into_bytes(mut self) -> Result<Vec<u8>> {
        self.doc.compress();
        let mut buffer = Vec::new();
        self.doc
            .save_to(&mut buffer)
            .map_err(|e| Error::PdfWrite(e.to_string()))?;
        Ok(buffer)
    }
}

/// Whether the object is a page or a page tree node.
fn is_page_object(object: &Object) -> bool {
    object
        .as_dict()
        .and_then(|dict| dict.get(b"Type"))
        .and_then(Object::as_name)
        .map(|name| name == b"Page" || name == b"Pages")
        .unwrap_or(false)
}

/// Copies the objects reachable from selected pages of one source
/// document into the output, giving them fresh ids.
///
/// Only what the pages reference is copied. References to pages outside
/// the selection, and to page tree nodes, become `null`.
struct ObjectCopier<'a> {
    source: &'a LopdfDocument,
    ids: BTreeMap<ObjectId, ObjectId>,
    pending: Vec<ObjectId>,
}

impl<'a> ObjectCopier<'a> {
    fn new(source: &'a LopdfDocument) -> Self {
        Self {
            source,
            ids: BTreeMap::new(),
            pending: Vec::new(),
        }
    }

    /// Output id for a selected page, allocated on first use.
    fn reserve(&mut self, out: &mut LopdfDocument, page_id: ObjectId) -> ObjectId {
        *self
            .ids
            .entry(page_id)
            .or_insert_with(|| out.new_object_id())
    }

    /// Output id for a referenced object, queueing it for copy. `None`
    /// when the reference must not be followed.
    fn map_id(&mut self, out: &mut LopdfDocument, old: ObjectId) -> Option<ObjectId> {
        if let Some(&new) = self.ids.get(&old) {
            return Some(new);
        }
        let object = self.source.get_object(old).ok()?;
        if is_page_object(object) {
            return None;
        }
        let new = out.new_object_id();
        self.ids.insert(old, new);
        self.pending.push(old);
        Some(new)
    }

    fn rewrite(&mut self, out: &mut LopdfDocument, object: &mut Object) {
        match object {
            Object::Reference(id) => {
                let old = *id;
                *object = match self.map_id(out, old) {
                    Some(new) => Object::Reference(new),
                    None => Object::Null,
                };
            }
            Object::Array(items) => {
                for item in items.iter_mut() {
                    self.rewrite(out, item);
                }
            }
            Object::Dictionary(dict) => self.rewrite_dictionary(out, dict),
            Object::Stream(stream) => self.rewrite_dictionary(out, &mut stream.dict),
            _ => {}
        }
    }

    fn rewrite_dictionary(&mut self, out: &mut LopdfDocument, dict: &mut Dictionary) {
        for (_, value) in dict.iter_mut() {
            self.rewrite(out, value);
        }
    }

    /// Copy everything queued so far, following references transitively.
    fn copy_pending(&mut self, out: &mut LopdfDocument) -> Result<()> {
        while let Some(old) = self.pending.pop() {
            let mut object = self.source.get_object(old)?.clone();
            self.rewrite(out, &mut object);
            if let Some(&new) = self.ids.get(&old) {
                out.objects.insert(new, object);
            }
        }
        Ok(())
    }
}

/// Attributes the page inherits from its ancestors in the page tree and
/// does not set itself.
fn inherited_attributes(doc: &LopdfDocument, page_id: ObjectId) -> Result<Vec<(Vec<u8>, Object)>> {
    let page = doc.get_dictionary(page_id)?;
    let mut missing: Vec<&[u8]> = INHERITABLE_KEYS
        .iter()
        .copied()
        .filter(|key| !page.has(key))
        .collect();

    let mut inherited = Vec::new();
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    let mut depth = 0;
    while let Some(node_id) = parent {
        if missing.is_empty() || depth >= MAX_TREE_DEPTH {
            break;
        }
        let Ok(node) = doc.get_dictionary(node_id) else {
            break;
        };
        missing.retain(|key| match node.get(key) {
            Ok(value) => {
                inherited.push((key.to_vec(), value.clone()));
                false
            }
            Err(_) => true,
        });
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
        depth += 1;
    }
    Ok(inherited)
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader — open, inspect, split, filter, and recompress existing PDF
// documents using the `lopdf` crate.

use std::collections::HashMap;
use std::path::Path;

use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object, ObjectId, dictionary};
use taskmaster_core::error::TaskMasterError;
use tracing::{debug, info, instrument, warn};

/// Size figures from [`PdfReader::compressed`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompressionStats {
    /// Byte-identical streams folded into one shared object.
    pub deduplicated: usize,
    /// Objects dropped because nothing referenced them.
    pub pruned: usize,
}

/// Reads and manipulates existing PDF files.
///
/// Wraps `lopdf::Document`. Every operation works on a clone, so one reader
/// can serve several outputs.
pub struct PdfReader {
    /// The underlying lopdf document.
    document: Document,
}

impl PdfReader {
    // -- Construction ---------------------------------------------------------

    /// Open a PDF from the filesystem.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, TaskMasterError> {
        let path_ref = path.as_ref();
        info!("Opening PDF: {}", path_ref.display());

        let document = Document::load(path_ref).map_err(|err| {
            TaskMasterError::PdfError(format!("failed to open {}: {}", path_ref.display(), err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded");

        Ok(Self { document })
    }

    /// Create a reader from raw PDF bytes already in memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self, TaskMasterError> {
        let document = Document::load_mem(data).map_err(|err| {
            TaskMasterError::PdfError(format!("failed to load PDF from memory: {}", err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded from bytes");

        Ok(Self { document })
    }

    // -- Inspection -----------------------------------------------------------

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// 1-based page numbers in document order.
    pub fn page_numbers(&self) -> Vec<u32> {
        self.document.get_pages().keys().copied().collect()
    }

    /// Borrow the underlying document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Extracted text of one page (1-indexed).
    pub fn page_text(&self, page_number: u32) -> Result<String, TaskMasterError> {
        self.document.extract_text(&[page_number]).map_err(|err| {
            TaskMasterError::PdfError(format!(
                "failed to extract text of page {}: {}",
                page_number, err
            ))
        })
    }

    /// Extracted text of every page, in order.
    pub fn text(&self) -> Result<String, TaskMasterError> {
        self.document
            .extract_text(&self.page_numbers())
            .map_err(|err| TaskMasterError::PdfError(format!("failed to extract text: {}", err)))
    }

    /// Whether a page (1-indexed) counts as blank.
    ///
    /// A page is blank when its content stream holds no operations, or when
    /// its extracted text is empty after trimming whitespace. A page whose
    /// text cannot be extracted is treated as not blank.
    pub fn is_blank_page(&self, page_number: u32) -> bool {
        let Some(&page_id) = self.document.get_pages().get(&page_number) else {
            return false;
        };

        if has_no_content_operations(&self.document, page_id) {
            debug!(page_number, "page has no content operations");
            return true;
        }

        match self.page_text(page_number) {
            Ok(text) => text.trim().is_empty(),
            Err(err) => {
                warn!(page_number, %err, "text extraction failed, keeping page");
                false
            }
        }
    }

    // -- Extraction -----------------------------------------------------------

    /// Extract a single page (1-indexed) into a new standalone PDF document.
    ///
    /// Returns the serialised bytes of the single-page PDF.
    #[instrument(skip(self), fields(page_number))]
    pub fn extract_page(&self, page_number: u32) -> Result<Vec<u8>, TaskMasterError> {
        let total = self.page_count();
        if page_number == 0 || page_number as usize > total {
            return Err(TaskMasterError::PdfError(format!(
                "page {} out of range (document has {} pages)",
                page_number, total
            )));
        }

        let output = self.retain_pages(&[page_number])?;
        debug!(page_number, output_bytes = output.len(), "Page extracted");
        Ok(output)
    }

    /// A copy of the document holding only `keep` (1-indexed), in original
    /// order. Content streams and resources of kept pages are untouched.
    #[instrument(skip_all, fields(keep = keep.len()))]
    pub fn retain_pages(&self, keep: &[u32]) -> Result<Vec<u8>, TaskMasterError> {
        if keep.is_empty() {
            return Err(TaskMasterError::PdfError(
                "refusing to write a PDF with no pages".to_string(),
            ));
        }

        let mut doc = self.document.clone();
        let drop: Vec<u32> = doc
            .get_pages()
            .keys()
            .copied()
            .filter(|page| !keep.contains(page))
            .collect();

        doc.delete_pages(&drop);
        let pruned = doc.prune_objects();
        debug!(dropped = drop.len(), pruned = pruned.len(), "pages removed");

        save_to_bytes(&mut doc, "filtered PDF")
    }

    // -- Compression ----------------------------------------------------------

    /// Re-serialise with byte-identical streams shared, unreferenced and
    /// zero-length objects removed, and all streams compressed.
    #[instrument(skip(self))]
    pub fn compressed(&self) -> Result<(Vec<u8>, CompressionStats), TaskMasterError> {
        let mut doc = self.document.clone();

        let deduplicated = dedupe_streams(&mut doc);
        doc.delete_zero_length_streams();
        let pruned = doc.prune_objects().len();
        doc.renumber_objects();
        doc.compress();

        let output = save_to_bytes(&mut doc, "compressed PDF")?;
        let stats = CompressionStats {
            deduplicated,
            pruned,
        };
        info!(?stats, output_bytes = output.len(), "PDF recompressed");
        Ok((output, stats))
    }
}

// -- Assembly -----------------------------------------------------------------

/// Builds a new document by appending pages cloned out of other documents.
pub struct PdfAssembler {
    document: Document,
    pages_id: ObjectId,
    page_count: u32,
}

impl PdfAssembler {
    /// An empty document with a catalog and an empty page tree.
    pub fn new() -> Self {
        let mut document = Document::with_version("1.5");
        let pages_id = document.new_object_id();
        let catalog_id = document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        document.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => Vec::<Object>::new(),
                "Count" => 0_i64,
            }),
        );
        document.trailer.set("Root", catalog_id);

        Self {
            document,
            pages_id,
            page_count: 0,
        }
    }

    /// Append every page of `source`, in order. Returns the pages added.
    ///
    /// All or nothing: if any page fails to clone, none of the source's pages
    /// are added.
    pub fn append_document(&mut self, source: &PdfReader) -> Result<u32, TaskMasterError> {
        let source_doc = source.document();
        self.append_pages(source_doc, source_doc.get_pages().into_values())
    }

    fn append_pages(
        &mut self,
        source: &Document,
        page_ids: impl IntoIterator<Item = ObjectId>,
    ) -> Result<u32, TaskMasterError> {
        let mut memo: HashMap<ObjectId, ObjectId> = HashMap::new();
        let mut staged = Vec::new();
        for page_id in page_ids {
            match clone_page(source, &mut self.document, self.pages_id, page_id, &mut memo) {
                Ok(cloned_id) => staged.push(Object::Reference(cloned_id)),
                Err(err) => {
                    for cloned in memo.values() {
                        self.document.objects.remove(cloned);
                    }
                    return Err(err);
                }
            }
        }

        let added = staged.len() as u32;
        let pages = self
            .document
            .get_object_mut(self.pages_id)
            .and_then(Object::as_dict_mut)
            .map_err(|err| TaskMasterError::PdfError(format!("page tree missing: {}", err)))?;
        if let Ok(Object::Array(kids)) = pages.get_mut(b"Kids") {
            kids.extend(staged);
        }
        self.page_count += added;
        pages.set("Count", i64::from(self.page_count));
        Ok(added)
    }

    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    /// Serialise the assembled document.
    pub fn into_bytes(mut self) -> Result<Vec<u8>, TaskMasterError> {
        save_to_bytes(&mut self.document, "assembled PDF")
    }
}

impl Default for PdfAssembler {
    fn default() -> Self {
        Self::new()
    }
}

// -- Helpers ------------------------------------------------------------------

fn save_to_bytes(doc: &mut Document, what: &str) -> Result<Vec<u8>, TaskMasterError> {
    let mut output = Vec::new();
    doc.save_to(&mut output).map_err(|err| {
        TaskMasterError::PdfError(format!("failed to serialise {}: {}", what, err))
    })?;
    Ok(output)
}

fn has_no_content_operations(doc: &Document, page_id: ObjectId) -> bool {
    match doc.get_page_content(page_id) {
        Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => true,
        Ok(bytes) => Content::decode(&bytes)
            .map(|content| content.operations.is_empty())
            .unwrap_or(false),
        Err(_) => false,
    }
}

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Clone a single page object (and everything it references) from `source`
/// into `target`, parented to `pages_id`. The caller links it into /Kids.
///
/// `memo` maps source object ids to their clones, so shared resources are
/// copied once per source document and reference cycles terminate.
fn clone_page(
    source: &Document,
    target: &mut Document,
    pages_id: ObjectId,
    page_id: ObjectId,
    memo: &mut HashMap<ObjectId, ObjectId>,
) -> Result<ObjectId, TaskMasterError> {
    let page_dict = source.get_dictionary(page_id).map_err(|err| {
        TaskMasterError::PdfError(format!("cannot read page object {:?}: {}", page_id, err))
    })?;

    // Attributes normally inherited through /Parent must be copied down,
    // because the clone hangs off a different page tree.
    let mut page = page_dict.clone();
    for key in INHERITABLE {
        if !page.has(key)
            && let Some(value) = inherited_attribute(source, page_dict, key)
        {
            page.set(key.to_vec(), value.clone());
        }
    }
    page.remove(b"Parent");

    let cloned_id = target.new_object_id();
    memo.insert(page_id, cloned_id);
    let mut cloned = deep_clone_object(source, target, &Object::Dictionary(page), memo)?;
    if let Object::Dictionary(dict) = &mut cloned {
        dict.set("Parent", Object::Reference(pages_id));
    }
    target.objects.insert(cloned_id, cloned);

    Ok(cloned_id)
}

fn inherited_attribute<'a>(
    source: &'a Document,
    page: &'a Dictionary,
    key: &[u8],
) -> Option<&'a Object> {
    let mut current = page;
    // Page trees are shallow; the bound only guards against malformed cycles.
    for _ in 0..64 {
        let parent_id = current.get(b"Parent").ok()?.as_reference().ok()?;
        current = source.get_dictionary(parent_id).ok()?;
        if let Ok(value) = current.get(key) {
            return Some(value);
        }
    }
    None
}

/// Deep-clone a single lopdf Object, recursively resolving references.
///
/// /Parent entries are dropped and references to other pages become Null, so
/// cloning one page never drags in the rest of the source page tree.
fn deep_clone_object(
    source: &Document,
    target: &mut Document,
    object: &Object,
    memo: &mut HashMap<ObjectId, ObjectId>,
) -> Result<Object, TaskMasterError> {
    match object {
        Object::Dictionary(dict) => Ok(Object::Dictionary(clone_dictionary(
            source, target, dict, memo,
        )?)),
        Object::Array(arr) => {
            let mut new_arr = Vec::with_capacity(arr.len());
            for item in arr {
                new_arr.push(deep_clone_object(source, target, item, memo)?);
            }
            Ok(Object::Array(new_arr))
        }
        Object::Reference(ref_id) => {
            if let Some(&existing) = memo.get(ref_id) {
                return Ok(Object::Reference(existing));
            }
            match source.get_object(*ref_id) {
                Ok(referenced) if is_page(referenced) => Ok(Object::Null),
                Ok(referenced) => {
                    let new_id = target.new_object_id();
                    memo.insert(*ref_id, new_id);
                    let cloned = deep_clone_object(source, target, referenced, memo)?;
                    target.objects.insert(new_id, cloned);
                    Ok(Object::Reference(new_id))
                }
                Err(err) => {
                    warn!(?ref_id, %err, "Cannot resolve reference, using Null");
                    Ok(Object::Null)
                }
            }
        }
        Object::Stream(stream) => {
            let new_dict = clone_dictionary(source, target, &stream.dict, memo)?;
            let mut cloned = lopdf::Stream::new(new_dict, stream.content.clone());
            cloned.allows_compression = stream.allows_compression;
            Ok(Object::Stream(cloned))
        }
        // All other object types (Boolean, Integer, Real, String, Name, Null)
        // are trivially cloneable.
        other => Ok(other.clone()),
    }
}

fn clone_dictionary(
    source: &Document,
    target: &mut Document,
    dict: &Dictionary,
    memo: &mut HashMap<ObjectId, ObjectId>,
) -> Result<Dictionary, TaskMasterError> {
    let mut new_dict = Dictionary::new();
    for (key, value) in dict.iter() {
        if key == b"Parent" {
            continue;
        }
        let cloned_value = deep_clone_object(source, target, value, memo)?;
        new_dict.set(key.clone(), cloned_value);
    }
    Ok(new_dict)
}

fn is_page(object: &Object) -> bool {
    object
        .as_dict()
        .ok()
        .and_then(|dict| dict.get(b"Type").ok())
        .and_then(|ty| ty.as_name().ok())
        .is_some_and(|name| name == b"Page")
}

/// Fold byte-identical streams (same dictionary, same content) into the first
/// occurrence and repoint every reference. Returns the number removed.
fn dedupe_streams(doc: &mut Document) -> usize {
    let mut canonical: HashMap<(Vec<u8>, String), ObjectId> = HashMap::new();
    let mut remap: HashMap<ObjectId, ObjectId> = HashMap::new();

    for (id, object) in &doc.objects {
        if let Object::Stream(stream) = object {
            let key = (stream.content.clone(), format!("{:?}", stream.dict));
            match canonical.get(&key) {
                Some(&keep) => {
                    remap.insert(*id, keep);
                }
                None => {
                    canonical.insert(key, *id);
                }
            }
        }
    }

    if remap.is_empty() {
        return 0;
    }

    for object in doc.objects.values_mut() {
        rewrite_references(object, &remap);
    }
    for (_, value) in doc.trailer.iter_mut() {
        rewrite_references(value, &remap);
    }
    for id in remap.keys() {
        doc.objects.remove(id);
    }

    debug!(removed = remap.len(), "duplicate streams folded");
    remap.len()
}

fn rewrite_references(object: &mut Object, remap: &HashMap<ObjectId, ObjectId>) {
    match object {
        Object::Reference(id) => {
            if let Some(&replacement) = remap.get(id) {
                *id = replacement;
            }
        }
        Object::Array(items) => {
            for item in items {
                rewrite_references(item, remap);
            }
        }
        Object::Dictionary(dict) => {
            for (_, value) in dict.iter_mut() {
                rewrite_references(value, remap);
            }
        }
        Object::Stream(stream) => {
            for (_, value) in stream.dict.iter_mut() {
                rewrite_references(value, remap);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use lopdf::content::Operation;
    use lopdf::Stream;

    /// Build a PDF whose pages carry the given text; `None` makes a page with
    /// an empty content stream and `Some("   ")` a whitespace-only text page.
    pub(crate) fn sample_pdf(pages: &[Option<&str>]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for text in pages {
            let operations = match text {
                Some(text) => vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![72.into(), 700.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
                None => vec![],
            };
            let content = Content { operations };
            let content_id = doc.add_object(Stream::new(
                dictionary! {},
                content.encode().expect("encode content"),
            ));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => pages.len() as i64,
                "Resources" => resources_id,
                "MediaBox" => vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(595),
                    Object::Integer(842),
                ],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).expect("save sample");
        bytes
    }

    #[test]
    fn counts_pages() {
        let reader = PdfReader::from_bytes(&sample_pdf(&[Some("a"), Some("b")])).unwrap();
        assert_eq!(reader.page_count(), 2);
        assert_eq!(reader.page_numbers(), vec![1, 2]);
    }

    #[test]
    fn extract_page_keeps_only_that_page() {
        let reader =
            PdfReader::from_bytes(&sample_pdf(&[Some("first"), Some("second")])).unwrap();
        let single = PdfReader::from_bytes(&reader.extract_page(2).unwrap()).unwrap();
        assert_eq!(single.page_count(), 1);
        assert!(single.page_text(1).unwrap().contains("second"));
    }

    #[test]
    fn extract_page_out_of_range() {
        let reader = PdfReader::from_bytes(&sample_pdf(&[Some("a")])).unwrap();
        assert!(reader.extract_page(0).is_err());
        assert!(reader.extract_page(2).is_err());
    }

    #[test]
    fn blank_classification() {
        let reader =
            PdfReader::from_bytes(&sample_pdf(&[Some("words"), None, Some("   ")])).unwrap();
        assert!(!reader.is_blank_page(1));
        assert!(reader.is_blank_page(2));
        assert!(reader.is_blank_page(3));
    }

    #[test]
    fn assembler_copies_inherited_resources() {
        let first = PdfReader::from_bytes(&sample_pdf(&[Some("one")])).unwrap();
        let second = PdfReader::from_bytes(&sample_pdf(&[Some("two"), Some("three")])).unwrap();

        let mut assembler = PdfAssembler::new();
        assert_eq!(assembler.append_document(&first).unwrap(), 1);
        assert_eq!(assembler.append_document(&second).unwrap(), 2);
        assert_eq!(assembler.page_count(), 3);

        let merged = PdfReader::from_bytes(&assembler.into_bytes().unwrap()).unwrap();
        assert_eq!(merged.page_count(), 3);
        assert!(merged.page_text(3).unwrap().contains("three"));
    }

    #[test]
    fn failed_source_leaves_no_pages_behind() {
        let broken = Document::load_mem(&sample_pdf(&[Some("early"), Some("late")])).unwrap();
        let first_page = broken.get_pages()[&1];
        let missing: ObjectId = (9_999, 0);

        let mut assembler = PdfAssembler::new();
        let objects_before = assembler.document.objects.len();
        assert!(assembler.append_pages(&broken, [first_page, missing]).is_err());
        assert_eq!(assembler.page_count(), 0);
        assert_eq!(assembler.document.objects.len(), objects_before);

        let good = PdfReader::from_bytes(&sample_pdf(&[Some("kept")])).unwrap();
        assert_eq!(assembler.append_document(&good).unwrap(), 1);

        let merged = PdfReader::from_bytes(&assembler.into_bytes().unwrap()).unwrap();
        assert_eq!(merged.page_count(), 1);
        assert!(merged.page_text(1).unwrap().contains("kept"));
    }

    #[test]
    fn compression_folds_duplicate_streams() {
        let mut doc = Document::load_mem(&sample_pdf(&[Some("same"), Some("same")])).unwrap();
        let before = doc.objects.len();
        let removed = dedupe_streams(&mut doc);
        assert_eq!(removed, 1);
        assert_eq!(doc.objects.len(), before - 1);

        let reader = PdfReader::from_bytes(&sample_pdf(&[Some("same"), Some("same")])).unwrap();
        let (bytes, stats) = reader.compressed().unwrap();
        assert_eq!(stats.deduplicated, 1);
        let reloaded = PdfReader::from_bytes(&bytes).unwrap();
        assert_eq!(reloaded.page_count(), 2);
    }
}

use std::collections::{BTreeMap, BTreeSet};

use lopdf::{self, content::Content};
use pdflayers_core::layers::text::decode_pdf_text;
use pdflayers_core::layers::ObjectRef;

use crate::types::Drawing;
use crate::PdfError;

// ---------------------------------------------------------------------------
// Type aliases
// ---------------------------------------------------------------------------

/// A page identifier mirroring `lopdf::ObjectId`: (object number, generation number).
pub type PageId = (u32, u16);

// ---------------------------------------------------------------------------
// Supporting types
// ---------------------------------------------------------------------------

/// A simplified, lopdf-independent representation of a PDF value.
///
/// This enum decouples the layer engine from the concrete `lopdf::Object`
/// type so that it can be driven by mock backends in tests.
#[derive(Debug, Clone, PartialEq)]
pub enum PdfValue {
    Null,
    Bool(bool),
    Integer(i64),
    Real(f32),
    Name(Vec<u8>),
    Str(Vec<u8>),
    Array(Vec<PdfValue>),
    Dict(Vec<(Vec<u8>, PdfValue)>),
    Reference(PageId),
}

impl PdfValue {
    /// Dictionary lookup. Returns `None` for non-dictionaries.
    pub fn get(&self, key: &[u8]) -> Option<&PdfValue> {
        match self {
            PdfValue::Dict(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<ObjectRef> {
        match self {
            PdfValue::Reference(id) => Some(ObjectRef::from(*id)),
            _ => None,
        }
    }

    pub fn as_name(&self) -> Option<String> {
        match self {
            PdfValue::Name(n) => Some(String::from_utf8_lossy(n).into_owned()),
            _ => None,
        }
    }

    /// References held directly or as array elements.
    pub fn references(&self) -> Vec<ObjectRef> {
        match self {
            PdfValue::Reference(id) => vec![ObjectRef::from(*id)],
            PdfValue::Array(items) => items.iter().filter_map(PdfValue::as_reference).collect(),
            _ => Vec::new(),
        }
    }
}

/// A single content-stream operation (operator + operands).
#[derive(Debug, Clone)]
pub struct ContentOp {
    pub operator: String,
    pub operands: Vec<PdfValue>,
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Extract an `f32` from a [`PdfValue`], accepting both `Integer` and `Real`.
pub fn get_number_from_value(val: &PdfValue) -> Option<f32> {
    match val {
        PdfValue::Integer(i) => Some(*i as f32),
        PdfValue::Real(f) => Some(*f),
        _ => None,
    }
}

/// Convert a `lopdf::Object` into a [`PdfValue`].
///
/// References are preserved as `PdfValue::Reference`.  Stream dictionaries
/// are converted but the raw stream bytes are discarded (they must be
/// obtained through [`PdfBackend::stream_content`]).
pub fn convert_object(obj: &lopdf::Object) -> PdfValue {
    match obj {
        lopdf::Object::Null => PdfValue::Null,
        lopdf::Object::Boolean(b) => PdfValue::Bool(*b),
        lopdf::Object::Integer(i) => PdfValue::Integer(*i),
        lopdf::Object::Real(f) => PdfValue::Real(*f),
        lopdf::Object::Name(n) => PdfValue::Name(n.clone()),
        lopdf::Object::String(s, _) => PdfValue::Str(s.clone()),
        lopdf::Object::Array(arr) => PdfValue::Array(arr.iter().map(convert_object).collect()),
        lopdf::Object::Dictionary(dict) => {
            let entries = dict
                .iter()
                .map(|(k, v)| (k.clone(), convert_object(v)))
                .collect();
            PdfValue::Dict(entries)
        }
        lopdf::Object::Stream(stream) => {
            let entries = stream
                .dict
                .iter()
                .map(|(k, v)| (k.clone(), convert_object(v)))
                .collect();
            PdfValue::Dict(entries)
        }
        lopdf::Object::Reference(id) => PdfValue::Reference(*id),
    }
}

/// Decode content-stream bytes into operations.
pub fn decode_content_ops(data: &[u8]) -> Result<Vec<ContentOp>, PdfError> {
    let content = Content::decode(data)
        .map_err(|e| PdfError::Parse(format!("content stream decode error: {}", e)))?;

    let ops = content
        .operations
        .into_iter()
        .map(|op| ContentOp {
            operator: op.operator,
            operands: op.operands.iter().map(convert_object).collect(),
        })
        .collect();

    Ok(ops)
}

/// Render a value back to PDF syntax, e.g. `<< /Type /OCG /Name (Dimensions) >>`.
///
/// String bytes outside printable ASCII are written as octal escapes so the
/// text survives a round trip through the object text parser.
pub fn render_value(value: &PdfValue) -> String {
    let mut out = String::new();
    write_value(value, &mut out);
    out
}

fn write_value(value: &PdfValue, out: &mut String) {
    match value {
        PdfValue::Null => out.push_str("null"),
        PdfValue::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        PdfValue::Integer(i) => out.push_str(&i.to_string()),
        PdfValue::Real(f) => out.push_str(&f.to_string()),
        PdfValue::Name(n) => write_name(n, out),
        PdfValue::Str(s) => {
            out.push('(');
            for &b in s {
                match b {
                    b'(' => out.push_str("\\("),
                    b')' => out.push_str("\\)"),
                    b'\\' => out.push_str("\\\\"),
                    0x20..=0x7E => out.push(b as char),
                    _ => out.push_str(&format!("\\{:03o}", b)),
                }
            }
            out.push(')');
        }
        PdfValue::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                }
                write_value(item, out);
            }
            out.push(']');
        }
        PdfValue::Dict(entries) => {
            out.push_str("<<");
            for (key, item) in entries {
                out.push(' ');
                write_name(key, out);
                out.push(' ');
                write_value(item, out);
            }
            out.push_str(" >>");
        }
        PdfValue::Reference((num, gen)) => out.push_str(&format!("{} {} R", num, gen)),
    }
}

fn write_name(name: &[u8], out: &mut String) {
    out.push('/');
    for &b in name {
        let delimiter = matches!(
            b,
            b'/' | b'[' | b']' | b'<' | b'>' | b'(' | b')' | b'{' | b'}' | b'%' | b'#'
        );
        if (0x21..=0x7E).contains(&b) && !delimiter {
            out.push(b as char);
        } else {
            out.push_str(&format!("#{:02X}", b));
        }
    }
}

/// Follow a reference one level. Non-references are returned as-is.
pub fn resolve_value(backend: &dyn PdfBackend, value: &PdfValue) -> Option<PdfValue> {
    match value {
        PdfValue::Reference(id) => backend.object(ObjectRef::from(*id)).ok(),
        other => Some(other.clone()),
    }
}

// ---------------------------------------------------------------------------
// PdfBackend trait
// ---------------------------------------------------------------------------

/// Abstraction over a PDF object model provider (currently backed by `lopdf`).
///
/// The layer engine only talks to this trait, so it can be tested against
/// mock implementations without building PDF files.
pub trait PdfBackend {
    /// Return a mapping from 1-based page number to [`PageId`].
    fn pages(&self) -> BTreeMap<u32, PageId>;

    fn page_count(&self) -> usize {
        self.pages().len()
    }

    /// Return the decoded content stream bytes for a page.
    fn page_content(&self, page: PageId) -> Result<Vec<u8>, PdfError>;

    /// Decode raw content-stream bytes into a sequence of [`ContentOp`]s.
    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>, PdfError>;

    /// The page's effective `/Resources` dictionary, inherited through
    /// `/Parent`, with indirect top-level entries resolved one level.
    fn page_resources(&self, page: PageId) -> Result<PdfValue, PdfError>;

    /// `[x0, y0, x1, y1]` of the page's MediaBox.
    fn media_box(&self, page: PageId) -> Result<[f64; 4], PdfError>;

    /// Vector drawings on a page under the current optional-content state.
    fn page_drawings(&self, page: PageId) -> Result<Vec<Drawing>, PdfError>;

    /// The document catalog (`/Root`).
    fn catalog(&self) -> Result<PdfValue, PdfError>;

    /// An indirect object. Streams are returned as their dictionary.
    fn object(&self, reference: ObjectRef) -> Result<PdfValue, PdfError>;

    /// The decoded bytes of a stream object.
    fn stream_content(&self, reference: ObjectRef) -> Result<Vec<u8>, PdfError>;

    /// One past the highest object number in the cross-reference table.
    fn xref_length(&self) -> usize;

    /// The object stored at a cross-reference index, if any.
    fn xref_reference(&self, index: usize) -> Option<ObjectRef>;

    /// PDF-syntax text of `key` in the object at `index`, with one level of
    /// indirection resolved. `Ok(None)` when the entry or key is absent.
    fn xref_get_key(&self, index: usize, key: &str) -> Result<Option<String>, PdfError>;

    /// Current visibility of an OCG, or `None` if `reference` is not an OCG.
    fn ocg_state(&self, reference: ObjectRef) -> Option<bool>;

    /// Switch an OCG on or off for subsequent [`PdfBackend::page_drawings`] calls.
    fn set_ocg_state(&mut self, reference: ObjectRef, on: bool) -> Result<(), PdfError>;

    /// Info dictionary entries such as `"Creator"` and `"Producer"`.
    fn metadata(&self) -> BTreeMap<String, String>;

    /// The PDF header version, e.g. `"1.7"`.
    fn version(&self) -> String;
}

// ---------------------------------------------------------------------------
// LopdfBackend
// ---------------------------------------------------------------------------

/// Concrete [`PdfBackend`] implementation backed by [`lopdf::Document`].
///
/// OCG visibility is kept in an overlay map; the document itself is never
/// modified.
pub struct LopdfBackend {
    doc: lopdf::Document,
    /// Object number -> object id, for index-based xref access.
    xref: BTreeMap<u32, lopdf::ObjectId>,
    ocg_states: BTreeMap<ObjectRef, bool>,
}

impl LopdfBackend {
    /// Parse a PDF from an in-memory byte slice.
    pub fn load_bytes(data: &[u8]) -> Result<Self, PdfError> {
        let doc = lopdf::Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        if doc.is_encrypted() {
            return Err(PdfError::Encrypted);
        }

        let xref = doc.objects.keys().map(|&id| (id.0, id)).collect();
        let ocg_states = initial_ocg_states(&doc);

        Ok(Self {
            doc,
            xref,
            ocg_states,
        })
    }

    // -- private helpers ----------------------------------------------------

    /// Walk up the page tree to find an inheritable entry. A `/Parent`
    /// chain that loops back on itself ends the walk.
    fn find_inherited<'a>(
        &'a self,
        dict: &'a lopdf::Dictionary,
        key: &[u8],
    ) -> Option<&'a lopdf::Object> {
        let mut visited = BTreeSet::new();
        let mut current = dict;
        loop {
            if let Ok(obj) = current.get(key) {
                return Some(obj);
            }
            let parent_id = current.get(b"Parent").and_then(|p| p.as_reference()).ok()?;
            if !visited.insert(parent_id) {
                log::debug!("Cyclic /Parent chain at {} {} R", parent_id.0, parent_id.1);
                return None;
            }
            current = self.doc.get_object(parent_id).and_then(|o| o.as_dict()).ok()?;
        }
    }

    fn page_dict(&self, page: PageId) -> Result<&lopdf::Dictionary, PdfError> {
        self.doc
            .get_object(page)
            .map_err(|e| PdfError::Parse(format!("cannot get page object: {}", e)))?
            .as_dict()
            .map_err(|e| PdfError::Parse(format!("page object is not a dictionary: {}", e)))
    }

    /// Follow a single level of indirection.
    fn deref<'a>(&'a self, obj: &'a lopdf::Object) -> Result<&'a lopdf::Object, PdfError> {
        match obj {
            lopdf::Object::Reference(id) => self
                .doc
                .get_object(*id)
                .map_err(|e| PdfError::NotFound(format!("{} {} R: {}", id.0, id.1, e))),
            other => Ok(other),
        }
    }

    /// Convert a vector of lopdf objects to `f32` values.
    fn array_to_f32s(&self, objects: &[lopdf::Object]) -> Result<Vec<f32>, PdfError> {
        objects
            .iter()
            .map(|obj| {
                let resolved = self.deref(obj)?;
                match resolved {
                    lopdf::Object::Integer(i) => Ok(*i as f32),
                    lopdf::Object::Real(f) => Ok(*f),
                    _ => Err(PdfError::Parse(format!(
                        "expected number in array, got {:?}",
                        resolved
                    ))),
                }
            })
            .collect()
    }

    fn is_ocg(&self, reference: ObjectRef) -> bool {
        self.doc
            .get_object(reference.id())
            .and_then(|obj| obj.as_dict())
            .and_then(|dict| dict.get(b"Type"))
            .and_then(|t| t.as_name())
            .map(|name| name == b"OCG")
            .unwrap_or(false)
    }
}

/// Visibility from the default configuration: `/BaseState` for every listed
/// OCG, then `/ON`, then `/OFF`.
fn initial_ocg_states(doc: &lopdf::Document) -> BTreeMap<ObjectRef, bool> {
    let mut states = BTreeMap::new();

    let deref = |obj: &lopdf::Object| -> Option<lopdf::Object> {
        match obj {
            lopdf::Object::Reference(id) => doc.get_object(*id).ok().cloned(),
            other => Some(other.clone()),
        }
    };
    let refs = |obj: Option<lopdf::Object>| -> Vec<ObjectRef> {
        match obj {
            Some(lopdf::Object::Array(items)) => items
                .iter()
                .filter_map(|item| item.as_reference().ok())
                .map(ObjectRef::from)
                .collect(),
            _ => Vec::new(),
        }
    };

    let properties = doc
        .trailer
        .get(b"Root")
        .ok()
        .and_then(deref)
        .and_then(|root| root.as_dict().ok().and_then(|d| d.get(b"OCProperties").ok().cloned()))
        .and_then(|props| deref(&props));
    let properties = match properties {
        Some(lopdf::Object::Dictionary(d)) => d,
        _ => return states,
    };

    let config = match properties.get(b"D").ok().and_then(deref) {
        Some(lopdf::Object::Dictionary(d)) => d,
        _ => lopdf::Dictionary::new(),
    };

    let base_on = config
        .get(b"BaseState")
        .ok()
        .and_then(|o| o.as_name().ok())
        .map(|n| n != b"OFF")
        .unwrap_or(true);

    let listed = refs(properties.get(b"OCGs").ok().and_then(deref));
    for r in listed {
        states.insert(r, base_on);
    }
    for r in refs(config.get(b"ON").ok().and_then(deref)) {
        states.insert(r, true);
    }
    for r in refs(config.get(b"OFF").ok().and_then(deref)) {
        states.insert(r, false);
    }

    states
}

// ---------------------------------------------------------------------------
// PdfBackend implementation for LopdfBackend
// ---------------------------------------------------------------------------

impl PdfBackend for LopdfBackend {
    fn pages(&self) -> BTreeMap<u32, PageId> {
        self.doc.get_pages()
    }

    fn page_content(&self, page: PageId) -> Result<Vec<u8>, PdfError> {
        self.doc
            .get_page_content(page)
            .map_err(|e| PdfError::Parse(format!("cannot get page content: {}", e)))
    }

    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>, PdfError> {
        decode_content_ops(data)
    }

    fn page_resources(&self, page: PageId) -> Result<PdfValue, PdfError> {
        let page_dict = self.page_dict(page)?;
        let resources = match self.find_inherited(page_dict, b"Resources") {
            Some(obj) => self.deref(obj)?,
            None => return Ok(PdfValue::Dict(Vec::new())),
        };
        let dict = resources
            .as_dict()
            .map_err(|_| PdfError::Parse("/Resources is not a dictionary".to_string()))?;

        let entries = dict
            .iter()
            .map(|(key, value)| {
                let resolved = self.deref(value).map(convert_object);
                (key.clone(), resolved.unwrap_or(PdfValue::Null))
            })
            .collect();
        Ok(PdfValue::Dict(entries))
    }

    fn media_box(&self, page: PageId) -> Result<[f64; 4], PdfError> {
        let page_dict = self.page_dict(page)?;
        let media_box = self
            .find_inherited(page_dict, b"MediaBox")
            .ok_or_else(|| PdfError::Parse("MediaBox not found for page".into()))?;
        let array = self
            .deref(media_box)?
            .as_array()
            .map_err(|e| PdfError::Parse(format!("MediaBox is not an array: {}", e)))?;

        let nums = self.array_to_f32s(array)?;
        if nums.len() < 4 {
            return Err(PdfError::Parse(format!(
                "MediaBox has {} elements, expected 4",
                nums.len()
            )));
        }

        let (x0, x1) = (nums[0].min(nums[2]), nums[0].max(nums[2]));
        let (y0, y1) = (nums[1].min(nums[3]), nums[1].max(nums[3]));
        Ok([x0 as f64, y0 as f64, x1 as f64, y1 as f64])
    }

    fn page_drawings(&self, page: PageId) -> Result<Vec<Drawing>, PdfError> {
        super::drawing::extract_page_drawings(self, page)
    }

    fn catalog(&self) -> Result<PdfValue, PdfError> {
        let root = self
            .doc
            .trailer
            .get(b"Root")
            .map_err(|_| PdfError::NotFound("document catalog".into()))?;
        Ok(convert_object(self.deref(root)?))
    }

    fn object(&self, reference: ObjectRef) -> Result<PdfValue, PdfError> {
        self.doc
            .get_object(reference.id())
            .map(convert_object)
            .map_err(|e| PdfError::NotFound(format!("{}: {}", reference, e)))
    }

    fn stream_content(&self, reference: ObjectRef) -> Result<Vec<u8>, PdfError> {
        let stream = self
            .doc
            .get_object(reference.id())
            .and_then(|obj| obj.as_stream())
            .map_err(|e| PdfError::NotFound(format!("{}: {}", reference, e)))?;

        if stream.dict.get(b"Filter").is_ok() {
            stream
                .decompressed_content()
                .map_err(|e| PdfError::Parse(format!("cannot decompress {}: {}", reference, e)))
        } else {
            Ok(stream.content.clone())
        }
    }

    fn xref_length(&self) -> usize {
        self.xref
            .keys()
            .next_back()
            .map(|&num| num as usize + 1)
            .unwrap_or(0)
    }

    fn xref_reference(&self, index: usize) -> Option<ObjectRef> {
        self.xref.get(&(index as u32)).map(|&id| ObjectRef::from(id))
    }

    fn xref_get_key(&self, index: usize, key: &str) -> Result<Option<String>, PdfError> {
        let id = match self.xref.get(&(index as u32)) {
            Some(&id) => id,
            None => return Ok(None),
        };
        let obj = self
            .doc
            .get_object(id)
            .map_err(|e| PdfError::NotFound(format!("{} {} R: {}", id.0, id.1, e)))?;
        let dict = match obj {
            lopdf::Object::Dictionary(d) => d,
            lopdf::Object::Stream(s) => &s.dict,
            _ => return Ok(None),
        };
        match dict.get(key.as_bytes()) {
            Ok(value) => Ok(Some(render_value(&convert_object(self.deref(value)?)))),
            Err(_) => Ok(None),
        }
    }

    fn ocg_state(&self, reference: ObjectRef) -> Option<bool> {
        match self.ocg_states.get(&reference) {
            Some(&on) => Some(on),
            None if self.is_ocg(reference) => Some(true),
            None => None,
        }
    }

    fn set_ocg_state(&mut self, reference: ObjectRef, on: bool) -> Result<(), PdfError> {
        if !self.ocg_states.contains_key(&reference) && !self.is_ocg(reference) {
            return Err(PdfError::NotFound(format!(
                "{} is not an optional content group",
                reference
            )));
        }
        self.ocg_states.insert(reference, on);
        Ok(())
    }

    /// Extract metadata from the PDF trailer's Info dictionary.
    fn metadata(&self) -> BTreeMap<String, String> {
        let mut meta = BTreeMap::new();

        let info_ref = match self.doc.trailer.get(b"Info") {
            Ok(obj) => obj,
            Err(_) => return meta,
        };

        let info_dict = match info_ref {
            lopdf::Object::Reference(id) => match self.doc.get_object(*id) {
                Ok(lopdf::Object::Dictionary(d)) => d,
                _ => return meta,
            },
            lopdf::Object::Dictionary(d) => d,
            _ => return meta,
        };

        let keys: &[&[u8]] = &[b"Title", b"Author", b"Creator", b"Producer"];

        for key in keys {
            if let Ok(obj) = info_dict.get(key) {
                let value = match obj {
                    lopdf::Object::String(bytes, _) => decode_pdf_text(bytes),
                    lopdf::Object::Name(bytes) => String::from_utf8_lossy(bytes).into_owned(),
                    _ => continue,
                };
                let key_str = String::from_utf8_lossy(key).into_owned();
                meta.insert(key_str, value);
            }
        }

        meta
    }

    fn version(&self) -> String {
        self.doc.version.clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! In-memory [`PdfBackend`] for engine tests.

use std::collections::BTreeMap;

use pdflayers_core::layers::ObjectRef;

use crate::parser::backend::{
    decode_content_ops, render_value, ContentOp, PageId, PdfBackend, PdfValue,
};
use crate::parser::drawing::extract_page_drawings;
use crate::types::Drawing;
use crate::PdfError;

/// Object numbers handed out by the mock start here, clear of page ids.
const FIRST_OBJECT: u32 = 100;

pub struct MockBackend {
    pub pages: BTreeMap<u32, PageId>,
    pub contents: BTreeMap<PageId, Vec<u8>>,
    pub resources: PdfValue,
    pub catalog: PdfValue,
    pub objects: BTreeMap<ObjectRef, PdfValue>,
    pub streams: BTreeMap<ObjectRef, Vec<u8>>,
    pub states: BTreeMap<ObjectRef, bool>,
    pub metadata: BTreeMap<String, String>,
    next_object: u32,
}

impl MockBackend {
    /// One page per content string, numbered from 1.
    pub fn with_pages(contents: &[&str]) -> Self {
        let mut pages = BTreeMap::new();
        let mut page_contents = BTreeMap::new();
        for (i, content) in contents.iter().enumerate() {
            let id: PageId = (i as u32 + 1, 0);
            pages.insert(i as u32 + 1, id);
            page_contents.insert(id, content.as_bytes().to_vec());
        }
        MockBackend {
            pages,
            contents: page_contents,
            resources: PdfValue::Dict(Vec::new()),
            catalog: PdfValue::Dict(Vec::new()),
            objects: BTreeMap::new(),
            streams: BTreeMap::new(),
            states: BTreeMap::new(),
            metadata: BTreeMap::new(),
            next_object: FIRST_OBJECT,
        }
    }

    pub fn with_page(content: &str) -> Self {
        Self::with_pages(&[content])
    }

    pub fn set_resources(&mut self, resources: PdfValue) {
        self.resources = resources;
    }

    /// Replace the `/Properties` resource of every page.
    pub fn set_properties(&mut self, entries: &[(&str, ObjectRef)]) {
        let properties = PdfValue::Dict(
            entries
                .iter()
                .map(|(name, r)| (name.as_bytes().to_vec(), PdfValue::Reference(r.id())))
                .collect(),
        );
        let mut dict = match std::mem::replace(&mut self.resources, PdfValue::Null) {
            PdfValue::Dict(entries) => entries,
            _ => Vec::new(),
        };
        dict.retain(|(k, _)| k != b"Properties");
        dict.push((b"Properties".to_vec(), properties));
        self.resources = PdfValue::Dict(dict);
    }

    pub fn add_object(&mut self, value: PdfValue) -> ObjectRef {
        let reference = ObjectRef::new(self.next_object, 0);
        self.next_object += 1;
        self.objects.insert(reference, value);
        reference
    }

    pub fn add_stream(&mut self, dict: PdfValue, content: &str) -> ObjectRef {
        let reference = self.add_object(dict);
        self.streams.insert(reference, content.as_bytes().to_vec());
        reference
    }

    /// Register an OCG with an initial visibility state.
    pub fn add_ocg(&mut self, name: &str, on: bool) -> ObjectRef {
        let reference = self.add_object(PdfValue::Dict(vec![
            (b"Type".to_vec(), PdfValue::Name(b"OCG".to_vec())),
            (b"Name".to_vec(), PdfValue::Str(name.as_bytes().to_vec())),
        ]));
        self.states.insert(reference, on);
        reference
    }
}

impl PdfBackend for MockBackend {
    fn pages(&self) -> BTreeMap<u32, PageId> {
        self.pages.clone()
    }

    fn page_content(&self, page: PageId) -> Result<Vec<u8>, PdfError> {
        self.contents
            .get(&page)
            .cloned()
            .ok_or_else(|| PdfError::NotFound(format!("page {:?}", page)))
    }

    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>, PdfError> {
        decode_content_ops(data)
    }

    fn page_resources(&self, _page: PageId) -> Result<PdfValue, PdfError> {
        Ok(self.resources.clone())
    }

    fn media_box(&self, _page: PageId) -> Result<[f64; 4], PdfError> {
        Ok([0.0, 0.0, 612.0, 792.0])
    }

    fn page_drawings(&self, page: PageId) -> Result<Vec<Drawing>, PdfError> {
        extract_page_drawings(self, page)
    }

    fn catalog(&self) -> Result<PdfValue, PdfError> {
        Ok(self.catalog.clone())
    }

    fn object(&self, reference: ObjectRef) -> Result<PdfValue, PdfError> {
        self.objects
            .get(&reference)
            .cloned()
            .ok_or_else(|| PdfError::NotFound(reference.to_string()))
    }

    fn stream_content(&self, reference: ObjectRef) -> Result<Vec<u8>, PdfError> {
        self.streams
            .get(&reference)
            .cloned()
            .ok_or_else(|| PdfError::NotFound(reference.to_string()))
    }

    fn xref_length(&self) -> usize {
        self.objects
            .keys()
            .next_back()
            .map(|r| r.num as usize + 1)
            .unwrap_or(0)
    }

    fn xref_reference(&self, index: usize) -> Option<ObjectRef> {
        self.objects.keys().find(|r| r.num as usize == index).copied()
    }

    fn xref_get_key(&self, index: usize, key: &str) -> Result<Option<String>, PdfError> {
        let value = match self.xref_reference(index).and_then(|r| self.objects.get(&r)) {
            Some(value) => value,
            None => return Ok(None),
        };
        match value.get(key.as_bytes()) {
            Some(PdfValue::Reference(id)) => {
                let resolved = self.object(ObjectRef::from(*id))?;
                Ok(Some(render_value(&resolved)))
            }
            Some(other) => Ok(Some(render_value(other))),
            None => Ok(None),
        }
    }

    fn ocg_state(&self, reference: ObjectRef) -> Option<bool> {
        self.states.get(&reference).copied()
    }

    fn set_ocg_state(&mut self, reference: ObjectRef, on: bool) -> Result<(), PdfError> {
        match self.states.get_mut(&reference) {
            Some(state) => {
                *state = on;
                Ok(())
            }
            None => Err(PdfError::NotFound(reference.to_string())),
        }
    }

    fn metadata(&self) -> BTreeMap<String, String> {
        self.metadata.clone()
    }

    fn version(&self) -> String {
        "1.7".to_string()
    }
}

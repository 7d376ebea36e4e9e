//! Builders for small layered PDFs, shared by unit tests and by the
//! service's integration tests (behind the `fixtures` feature).

use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use pdflayers_core::layers::ObjectRef;

use crate::PdfError;

/// Assembles a single-file PDF with optional-content groups.
///
/// OCGs created with [`PdfFixture::ocg`] are listed in the catalog's
/// `/OCProperties`; orphans exist only as indirect objects.
pub struct PdfFixture {
    doc: Document,
    pages_id: ObjectId,
    page_ids: Vec<ObjectId>,
    ocgs: Vec<ObjectId>,
    off: Vec<ObjectId>,
    locked: Vec<ObjectId>,
    configs: Vec<Dictionary>,
    oc_properties: bool,
}

impl Default for PdfFixture {
    fn default() -> Self {
        Self::new()
    }
}

fn refs(ids: &[ObjectId]) -> Vec<Object> {
    ids.iter().map(|&id| Object::Reference(id)).collect()
}

impl PdfFixture {
    pub fn new() -> Self {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        PdfFixture {
            doc,
            pages_id,
            page_ids: Vec::new(),
            ocgs: Vec::new(),
            off: Vec::new(),
            locked: Vec::new(),
            configs: Vec::new(),
            oc_properties: true,
        }
    }

    /// Add an OCG listed in the catalog.
    pub fn ocg(&mut self, name: &str) -> ObjectRef {
        let reference = self.orphan_ocg(name);
        self.ocgs.push(reference.id());
        reference
    }

    /// Add an OCG that no catalog entry points to.
    pub fn orphan_ocg(&mut self, name: &str) -> ObjectRef {
        let id = self.doc.add_object(dictionary! {
            "Type" => "OCG",
            "Name" => Object::string_literal(name),
        });
        ObjectRef::from(id)
    }

    /// Add an arbitrary indirect object.
    pub fn object(&mut self, object: impl Into<Object>) -> ObjectRef {
        ObjectRef::from(self.doc.add_object(object))
    }

    pub fn default_off(&mut self, reference: ObjectRef) {
        self.off.push(reference.id());
    }

    pub fn lock(&mut self, reference: ObjectRef) {
        self.locked.push(reference.id());
    }

    /// Add an alternate configuration to `/Configs`.
    pub fn alternate_config(&mut self, name: &str, off: &[ObjectRef]) {
        let off: Vec<ObjectId> = off.iter().map(|r| r.id()).collect();
        self.configs.push(dictionary! {
            "Name" => Object::string_literal(name),
            "BaseState" => "ON",
            "OFF" => refs(&off),
        });
    }

    /// Leave `/OCProperties` out of the catalog so OCGs are reachable
    /// only by walking the cross-reference table.
    pub fn without_oc_properties(&mut self) {
        self.oc_properties = false;
    }

    /// Add a page with an uncompressed content stream. `properties` become
    /// the page's `/Properties` resource.
    pub fn page(&mut self, content: &str, properties: &[(&str, ObjectRef)]) {
        let content_id = self
            .doc
            .add_object(Stream::new(dictionary! {}, content.as_bytes().to_vec()));
        let mut props = Dictionary::new();
        for (name, reference) in properties {
            props.set(name.as_bytes().to_vec(), Object::Reference(reference.id()));
        }
        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "Contents" => content_id,
            "Resources" => dictionary! { "Properties" => props },
        });
        self.page_ids.push(page_id);
    }

    /// Add a page whose `/Parent` is the page itself. It carries no
    /// `/Resources` or `/MediaBox`, so inherited lookups never succeed.
    pub fn self_parented_page(&mut self, content: &str) {
        let content_id = self
            .doc
            .add_object(Stream::new(dictionary! {}, content.as_bytes().to_vec()));
        let page_id = self.doc.new_object_id();
        self.doc.objects.insert(
            page_id,
            Object::Dictionary(dictionary! {
                "Type" => "Page",
                "Parent" => page_id,
                "Contents" => content_id,
            }),
        );
        self.page_ids.push(page_id);
    }

    fn oc_properties_dict(&self) -> Dictionary {
        let mut default = dictionary! {
            "Name" => Object::string_literal("Default"),
            "BaseState" => "ON",
            "Order" => refs(&self.ocgs),
        };
        if !self.off.is_empty() {
            default.set("OFF", refs(&self.off));
        }
        if !self.locked.is_empty() {
            default.set("Locked", refs(&self.locked));
        }
        let mut properties = dictionary! {
            "OCGs" => refs(&self.ocgs),
            "D" => default,
        };
        if !self.configs.is_empty() {
            let configs = self.configs.iter().cloned().map(Object::Dictionary).collect::<Vec<_>>();
            properties.set("Configs", configs);
        }
        properties
    }

    /// Serialize the document.
    pub fn to_bytes(mut self) -> Result<Vec<u8>, PdfError> {
        let count = self.page_ids.len() as i64;
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => refs(&self.page_ids),
            "Count" => count,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        };
        self.doc.objects.insert(self.pages_id, Object::Dictionary(pages));

        let mut catalog = dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        };
        if self.oc_properties && !self.ocgs.is_empty() {
            catalog.set("OCProperties", self.oc_properties_dict());
        }
        let catalog_id = self.doc.add_object(catalog);
        let info_id = self.doc.add_object(dictionary! {
            "Creator" => Object::string_literal("pdflayers fixtures"),
            "Producer" => Object::string_literal("lopdf"),
        });
        self.doc.trailer.set("Root", catalog_id);
        self.doc.trailer.set("Info", info_id);

        let mut buf = Vec::new();
        self.doc
            .save_to(&mut buf)
            .map_err(|e| PdfError::Parse(e.to_string()))?;
        Ok(buf)
    }
}

//! OCGs declared in the catalog's `/OCProperties`.

use pdflayers_core::layers::text;
use pdflayers_core::layers::{Layer, LayerConfiguration, ObjectRef, OriginKind};

use crate::parser::backend::{render_value, resolve_value, PdfBackend, PdfValue};

/// Everything `/OCProperties` declares.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogOcgs {
    /// One layer per `/OCGs` entry, in catalog order.
    pub layers: Vec<Layer>,
    pub default_config: Option<LayerConfiguration>,
    pub alternate_configs: Vec<LayerConfiguration>,
}

impl CatalogOcgs {
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn references(&self) -> Vec<ObjectRef> {
        self.layers.iter().filter_map(|l| l.source_reference).collect()
    }
}

/// Read the catalog's optional-content declarations.
///
/// A missing `/OCProperties` (or catalog) is the normal no-layer case and
/// yields an empty result.
pub fn read_catalog_ocgs(backend: &dyn PdfBackend) -> CatalogOcgs {
    let catalog = match backend.catalog() {
        Ok(catalog) => catalog,
        Err(e) => {
            log::debug!("No readable catalog: {}", e);
            return CatalogOcgs::default();
        }
    };
    let properties = match catalog
        .get(b"OCProperties")
        .and_then(|v| resolve_value(backend, v))
    {
        Some(properties @ PdfValue::Dict(_)) => properties,
        _ => return CatalogOcgs::default(),
    };

    let default_config = properties
        .get(b"D")
        .and_then(|v| resolve_value(backend, v))
        .map(|d| text::extract_configuration(&render_value(&d)));

    let alternate_configs = match properties.get(b"Configs").and_then(|v| resolve_value(backend, v)) {
        Some(PdfValue::Array(items)) => items
            .iter()
            .filter_map(|item| resolve_value(backend, item))
            .map(|c| text::extract_configuration(&render_value(&c)))
            .collect(),
        _ => Vec::new(),
    };

    let ocg_refs = properties
        .get(b"OCGs")
        .and_then(|v| resolve_value(backend, v))
        .map(|v| v.references())
        .unwrap_or_default();

    let mut layers = Vec::with_capacity(ocg_refs.len());
    for reference in ocg_refs {
        let object_text = match backend.object(reference) {
            Ok(value) => render_value(&value),
            Err(e) => {
                log::warn!("Catalog OCG {} is unresolvable: {}", reference, e);
                String::new()
            }
        };
        layers.push(catalog_layer(&object_text, reference, default_config.as_ref()));
    }

    log::debug!(
        "Catalog declares {} OCGs and {} alternate configurations",
        layers.len(),
        alternate_configs.len()
    );

    CatalogOcgs {
        layers,
        default_config,
        alternate_configs,
    }
}

/// Build a layer from an OCG's object text. Visibility and lock state come
/// from the default configuration.
fn catalog_layer(
    object_text: &str,
    reference: ObjectRef,
    default_config: Option<&LayerConfiguration>,
) -> Layer {
    let name = text::extract_name(object_text).unwrap_or_else(|| Layer::fallback_name(reference.num));
    let mut layer = Layer::new(name, OriginKind::CatalogOcg);
    layer.source_reference = Some(reference);
    layer.intent = text::extract_intent_list(object_text).unwrap_or_default();
    layer.usage = text::extract_usage_block(object_text).unwrap_or_default();
    layer.creator_info = text::extract_creator(object_text);
    if let Some(config) = default_config {
        layer.visible = config.is_visible(reference);
        layer.locked = config.is_locked(reference);
    }
    layer
}

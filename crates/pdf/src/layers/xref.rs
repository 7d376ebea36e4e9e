//! OCGs found by walking every cross-reference entry.
//!
//! This catches groups that exist as objects but are missing from a broken
//! or absent `/OCProperties`.

use pdflayers_core::layers::text;
use pdflayers_core::layers::{Layer, OriginKind};

use crate::parser::backend::PdfBackend;
use crate::PdfError;

/// Every object whose `/Type` mentions `OCG`, in object-number order.
///
/// Entries that fail to read are logged and skipped.
pub fn scan_xref_ocgs(backend: &dyn PdfBackend) -> Vec<Layer> {
    let mut layers = Vec::new();
    for index in 0..backend.xref_length() {
        match xref_layer(backend, index) {
            Ok(Some(layer)) => layers.push(layer),
            Ok(None) => {}
            Err(e) => log::debug!("Skipping xref entry {}: {}", index, e),
        }
    }
    log::debug!("Xref scan found {} OCG objects", layers.len());
    layers
}

fn xref_layer(backend: &dyn PdfBackend, index: usize) -> Result<Option<Layer>, PdfError> {
    match backend.xref_get_key(index, "Type")? {
        Some(kind) if kind.contains("OCG") => {}
        _ => return Ok(None),
    }

    // Key values come back bare; prefix the key so the text extractors see
    // a dictionary fragment.
    let name = backend
        .xref_get_key(index, "Name")?
        .and_then(|value| text::extract_name(&format!("/Name {}", value)))
        .unwrap_or_else(|| Layer::fallback_name(index as u32));

    let mut layer = Layer::new(name, OriginKind::XrefOcg);
    layer.source_reference = backend.xref_reference(index);

    if let Some(value) = backend.xref_get_key(index, "Intent")? {
        layer.intent = text::extract_intent_list(&format!("/Intent {}", value)).unwrap_or_default();
    }
    if let Some(value) = backend.xref_get_key(index, "Usage")? {
        let fragment = format!("/Usage {}", value);
        layer.usage = text::extract_usage_block(&fragment).unwrap_or_default();
        layer.creator_info = text::extract_creator(&fragment);
    }
    Ok(Some(layer))
}

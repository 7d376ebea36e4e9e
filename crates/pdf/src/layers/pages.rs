//! Per-page layer usage from content-stream markers.

use std::collections::BTreeMap;

use pdflayers_core::layers::{resolve_tokens, scan_content, Layer, ObjectRef, PageLayerUsage};

use crate::parser::backend::{resolve_value, PageId, PdfBackend, PdfValue};
use crate::parser::drawing::oc_members;
use crate::PdfError;

/// Layer names referenced on each page, for pages that reference any.
///
/// Pages whose content cannot be read are logged and skipped.
pub fn scan_pages(backend: &dyn PdfBackend, layers: &[Layer]) -> Vec<PageLayerUsage> {
    let layer_names: BTreeMap<ObjectRef, String> = layers
        .iter()
        .filter_map(|l| l.source_reference.map(|r| (r, l.name.clone())))
        .collect();

    let mut usage = Vec::new();
    for (page_number, page_id) in backend.pages() {
        match page_layers(backend, page_id, &layer_names) {
            Ok(names) if !names.is_empty() => usage.push(PageLayerUsage {
                page_number,
                layers: names,
            }),
            Ok(_) => {}
            Err(e) => log::debug!("Skipping page {}: {}", page_number, e),
        }
    }
    usage
}

fn page_layers(
    backend: &dyn PdfBackend,
    page: PageId,
    layer_names: &BTreeMap<ObjectRef, String>,
) -> Result<Vec<String>, PdfError> {
    let content = backend.page_content(page)?;
    // Latin-1: every byte maps to one char, so operators and names survive.
    let text: String = content.iter().map(|&b| b as char).collect();
    let tokens = scan_content(&text);
    if tokens.is_empty() {
        return Ok(Vec::new());
    }
    let properties = page_properties(backend, page);
    Ok(resolve_tokens(&tokens, &properties, layer_names))
}

/// The page's `/Properties` resource names and the OCGs each stands for.
fn page_properties(backend: &dyn PdfBackend, page: PageId) -> BTreeMap<String, Vec<ObjectRef>> {
    let resources = match backend.page_resources(page) {
        Ok(resources) => resources,
        Err(e) => {
            log::debug!("No resources for page {:?}: {}", page, e);
            return BTreeMap::new();
        }
    };
    match resources
        .get(b"Properties")
        .and_then(|v| resolve_value(backend, v))
    {
        Some(PdfValue::Dict(entries)) => entries
            .iter()
            .map(|(name, value)| {
                (
                    String::from_utf8_lossy(name).into_owned(),
                    oc_members(backend, value),
                )
            })
            .collect(),
        _ => BTreeMap::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockBackend;
    use pdflayers_core::layers::OriginKind;

    fn layer(name: &str, reference: ObjectRef) -> Layer {
        let mut layer = Layer::new(name, OriginKind::CatalogOcg);
        layer.source_reference = Some(reference);
        layer
    }

    #[test]
    fn test_resolves_property_names_to_layers() {
        let mut backend = MockBackend::with_pages(&[
            "/OC /oc1 BDC 0 0 m 1 1 l S EMC",
            "0 0 m 5 5 l S",
            "/OC /oc1 BDC EMC /OC /oc2 BDC EMC",
        ]);
        let dims = backend.add_ocg("Dimensions", true);
        let text = backend.add_ocg("Text", true);
        backend.set_properties(&[("oc1", dims), ("oc2", text)]);
        let layers = vec![layer("Dimensions", dims), layer("Text", text)];

        let usage = scan_pages(&backend, &layers);
        assert_eq!(usage.len(), 2);
        assert_eq!(usage[0].page_number, 1);
        assert_eq!(usage[0].layers, vec!["Dimensions"]);
        assert_eq!(usage[1].page_number, 3);
        assert_eq!(usage[1].layers, vec!["Dimensions", "Text"]);
    }

    #[test]
    fn test_unresolved_token_kept_verbatim() {
        let backend = MockBackend::with_page("/OC /MC0 BDC EMC");
        let usage = scan_pages(&backend, &[]);
        assert_eq!(usage[0].layers, vec!["MC0"]);
    }

    #[test]
    fn test_membership_dictionary_expands_to_members() {
        let mut backend = MockBackend::with_page("/OC /mc BDC EMC");
        let a = backend.add_ocg("A", true);
        let b = backend.add_ocg("B", true);
        let ocmd = backend.add_object(PdfValue::Dict(vec![
            (b"Type".to_vec(), PdfValue::Name(b"OCMD".to_vec())),
            (
                b"OCGs".to_vec(),
                PdfValue::Array(vec![PdfValue::Reference(a.id()), PdfValue::Reference(b.id())]),
            ),
        ]));
        backend.set_properties(&[("mc", ocmd)]);
        let layers = vec![layer("A", a), layer("B", b)];

        let usage = scan_pages(&backend, &layers);
        assert_eq!(usage[0].layers, vec!["A", "B"]);
    }

    #[test]
    fn test_unreadable_page_is_skipped() {
        let mut backend = MockBackend::with_pages(&["/OC /x BDC EMC", "/OC /y BDC EMC"]);
        backend.contents.remove(&(1, 0));

        let usage = scan_pages(&backend, &[]);
        assert_eq!(usage.len(), 1);
        assert_eq!(usage[0].page_number, 2);
    }
}

use thiserror::Error;

use pdflayers_core::layers::{
    aggregate_usage, merge_layers, DocumentFacts, LayerReport, ObjectRef, OcgInfo, Precision,
};

use parser::backend::{LopdfBackend, PdfBackend};

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;
pub mod layers;
#[cfg(test)]
mod mock;
pub mod parser;
pub mod types;

pub use types::*;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("PDF parsing error: {0}")]
    Parse(String),
    #[error("Document is encrypted")]
    Encrypted,
    #[error("Object not found: {0}")]
    NotFound(String),
}

impl PdfError {
    /// Whether the error means the input itself is unusable, as opposed to
    /// a failure while processing a readable document.
    pub fn is_input_error(&self) -> bool {
        matches!(self, PdfError::Parse(_) | PdfError::Encrypted)
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Tuning for one extraction run.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractOptions {
    /// Decimals kept for coordinates, lengths, and widths. `None` keeps full precision.
    pub precision: Option<Precision>,
}

/// An opened PDF ready for layer extraction.
///
/// Owns its backend, so visibility toggling during extraction never leaks
/// into another document.
pub struct LayerDocument {
    backend: LopdfBackend,
}

impl LayerDocument {
    /// Open PDF bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PdfError> {
        Ok(LayerDocument {
            backend: LopdfBackend::load_bytes(bytes)?,
        })
    }

    /// Run the full extraction pipeline.
    pub fn report(&mut self, options: &ExtractOptions) -> LayerReport {
        analyze(&mut self.backend, options)
    }
}

/// Open PDF bytes and extract their layer report.
pub fn extract_layers(bytes: &[u8], options: &ExtractOptions) -> Result<LayerReport, PdfError> {
    Ok(LayerDocument::from_bytes(bytes)?.report(options))
}

/// The extraction pipeline over any backend.
///
/// 1. catalog `/OCProperties` and a cross-reference sweep discover OCGs
/// 2. both sources are merged by name, catalog fields winning
/// 3. pages are scanned for layer markers (only when layers exist)
/// 4. line geometry is attributed to each layer by visibility toggling
/// 5. page usage is aggregated and the report assembled
///
/// Per-object and per-page failures are skipped inside each stage, so this
/// never fails once the document is open.
pub fn analyze(backend: &mut dyn PdfBackend, options: &ExtractOptions) -> LayerReport {
    let catalog = layers::read_catalog_ocgs(backend);
    let xref_layers = layers::scan_xref_ocgs(backend);

    let mut known: Vec<ObjectRef> = catalog.references();
    for reference in xref_layers.iter().filter_map(|l| l.source_reference) {
        if !known.contains(&reference) {
            known.push(reference);
        }
    }

    let ocg_info = OcgInfo::new(
        &catalog.layers,
        catalog.default_config,
        catalog.alternate_configs,
    );
    let mut merged = merge_layers(catalog.layers, xref_layers);

    let pages_with_layers = if merged.is_empty() {
        Vec::new()
    } else {
        layers::scan_pages(backend, &merged)
    };
    layers::correlate_vectors(backend, &mut merged, &known, options.precision);

    let total_pages = backend.page_count();
    let layer_usage_analysis = aggregate_usage(&pages_with_layers, total_pages);
    let metadata = backend.metadata();
    let facts = DocumentFacts {
        total_pages,
        pdf_version: backend.version(),
        creator: metadata.get("Creator").cloned().unwrap_or_default(),
        producer: metadata.get("Producer").cloned().unwrap_or_default(),
    };

    log::info!(
        "Extracted {} layers across {} of {} pages",
        merged.len(),
        pages_with_layers.len(),
        total_pages
    );

    LayerReport::new(merged, ocg_info, pages_with_layers, layer_usage_analysis, facts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::PdfFixture;
    use crate::mock::MockBackend;
    use crate::parser::backend::PdfValue;
    use pdflayers_core::layers::{OriginKind, PageKey};

    fn extract(fixture: PdfFixture) -> LayerReport {
        let bytes = fixture.to_bytes().unwrap();
        extract_layers(&bytes, &ExtractOptions::default()).unwrap()
    }

    #[test]
    fn test_pdf_without_layers() {
        let mut fixture = PdfFixture::new();
        fixture.page("0 0 m 100 100 l S", &[]);
        let report = extract(fixture);

        assert!(!report.has_layers);
        assert_eq!(report.layer_count, 0);
        assert!(report.layers.is_empty());
        assert!(report.pages_with_layers.is_empty());
        assert!(report.layer_configurations.is_empty());
        assert_eq!(report.total_pages, 1);
        assert_eq!(report.pdf_version, "1.7");
        assert_eq!(report.creator, "pdflayers fixtures");
        assert_eq!(report.producer, "lopdf");
        assert_eq!(report.layer_usage_analysis.pages_without_layers, 1);
    }

    #[test]
    fn test_catalog_values_win_over_xref() {
        let mut fixture = PdfFixture::new();
        let hidden = fixture.ocg("Hidden");
        fixture.default_off(hidden);
        fixture.lock(hidden);
        fixture.page("", &[]);
        let report = extract(fixture);

        assert_eq!(report.layer_count, 1);
        let layer = &report.layers[0];
        assert_eq!(layer.name, "Hidden");
        assert_eq!(layer.origin, OriginKind::Merged);
        assert_eq!(layer.source_reference, Some(hidden));
        assert!(!layer.visible);
        assert!(layer.locked);

        let summary = &report.ocg_info.ocgs[&hidden];
        assert!(!summary.on);
        assert_eq!(report.layer_configurations.len(), 1);
        assert!(report.layer_configurations[0].is_default);
    }

    #[test]
    fn test_dimensions_on_first_and_last_page() {
        let marked = "/OC /oc1 BDC 0 0 m 100 0 l S EMC";
        let mut fixture = PdfFixture::new();
        let dims = fixture.ocg("Dimensions");
        fixture.page(marked, &[("oc1", dims)]);
        fixture.page("0 0 m 50 50 l S", &[]);
        fixture.page(marked, &[("oc1", dims)]);
        let report = extract(fixture);

        assert!(report.has_layers);
        let pages: Vec<(u32, Vec<String>)> = report
            .pages_with_layers
            .iter()
            .map(|p| (p.page_number, p.layers.clone()))
            .collect();
        assert_eq!(
            pages,
            vec![
                (1, vec!["Dimensions".to_string()]),
                (3, vec!["Dimensions".to_string()]),
            ]
        );
        let stats = &report.layer_usage_analysis;
        assert_eq!(stats.pages_with_layers, 2);
        assert_eq!(stats.pages_without_layers, 1);
        assert_eq!(stats.layer_distribution["Dimensions"], 2);
        assert_eq!(stats.most_used_layers, vec![("Dimensions".to_string(), 2)]);

        let layer = &report.layers[0];
        let first = &layer.vectors[&PageKey(1)][0];
        assert_eq!(first.length, 100.0);
        assert_eq!(first.p1.y, 792.0);
    }

    #[test]
    fn test_vector_count_is_sum_of_pages() {
        let mut fixture = PdfFixture::new();
        let a = fixture.ocg("A");
        let b = fixture.ocg("B");
        let content = "/OC /a BDC 0 0 m 10 0 l 10 10 l S EMC /OC /b BDC 5 5 m 6 6 l S EMC";
        fixture.page(content, &[("a", a), ("b", b)]);
        fixture.page(content, &[("a", a), ("b", b)]);
        let report = extract(fixture);

        for layer in &report.layers {
            let total: usize = layer.vectors.values().map(Vec::len).sum();
            assert_eq!(layer.vector_count, total);
        }
        assert_eq!(report.layers[0].vector_count, 4);
        assert_eq!(report.layers[1].vector_count, 2);
    }

    #[test]
    fn test_serialized_output_is_stable() {
        let mut fixture = PdfFixture::new();
        let a = fixture.ocg("A");
        let b = fixture.ocg("B");
        fixture.alternate_config("Print", &[b]);
        fixture.page("/OC /a BDC 0 0 m 1 2 l S EMC /OC /b BDC EMC", &[("a", a), ("b", b)]);
        let bytes = fixture.to_bytes().unwrap();

        let options = ExtractOptions {
            precision: Some(Precision::try_from(2).unwrap()),
        };
        let first = serde_json::to_vec(&extract_layers(&bytes, &options).unwrap()).unwrap();
        let second = serde_json::to_vec(&extract_layers(&bytes, &options).unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_xref_only_layers() {
        let mut fixture = PdfFixture::new();
        let loose = fixture.ocg("Loose");
        fixture.without_oc_properties();
        fixture.page("/OC /l BDC 0 0 m 1 0 l S EMC", &[("l", loose)]);
        let report = extract(fixture);

        assert_eq!(report.layer_count, 1);
        assert_eq!(report.layers[0].origin, OriginKind::XrefOcg);
        assert!(report.ocg_info.ocgs.is_empty());
        assert!(report.ocg_info.default_config.is_none());
        assert_eq!(report.pages_with_layers[0].layers, vec!["Loose"]);
    }

    #[test]
    fn test_invalid_bytes_are_input_errors() {
        let err = extract_layers(b"definitely not a pdf", &ExtractOptions::default())
            .err()
            .unwrap();
        assert!(matches!(err, PdfError::Parse(_)));
        assert!(err.is_input_error());
        assert!(!PdfError::NotFound("1 0 R".into()).is_input_error());
    }

    #[test]
    fn test_unresolvable_catalog_reference_kept_without_vectors() {
        let mut backend = MockBackend::with_page("0 0 m 1 1 l S");
        let missing = ObjectRef::new(50, 0);
        backend.catalog = PdfValue::Dict(vec![(
            b"OCProperties".to_vec(),
            PdfValue::Dict(vec![(
                b"OCGs".to_vec(),
                PdfValue::Array(vec![PdfValue::Reference(missing.id())]),
            )]),
        )]);

        let report = analyze(&mut backend, &ExtractOptions::default());
        assert_eq!(report.layer_count, 1);
        let layer = &report.layers[0];
        assert_eq!(layer.name, "Layer_50");
        assert!(layer.vectors.is_empty());
        assert_eq!(layer.vector_count, 0);
    }

    #[test]
    fn test_broken_page_skipped_others_kept() {
        let marked = "/OC /oc1 BDC 0 0 m 100 0 l S EMC";
        let mut fixture = PdfFixture::new();
        let walls = fixture.ocg("Walls");
        fixture.page(marked, &[("oc1", walls)]);
        fixture.self_parented_page("0 0 m 5 5 l S");
        fixture.page(marked, &[("oc1", walls)]);
        let report = extract(fixture);

        assert_eq!(report.total_pages, 3);
        let layer = &report.layers[0];
        assert_eq!(layer.name, "Walls");
        let pages: Vec<&PageKey> = layer.vectors.keys().collect();
        assert_eq!(pages, vec![&PageKey(1), &PageKey(3)]);
        assert_eq!(layer.vector_count, 2);

        let numbers: Vec<u32> = report.pages_with_layers.iter().map(|p| p.page_number).collect();
        assert_eq!(numbers, vec![1, 3]);
        assert_eq!(report.layer_usage_analysis.pages_without_layers, 1);
        assert_eq!(report.layer_usage_analysis.layer_distribution["Walls"], 2);
    }

    #[test]
    fn test_escaped_property_name_adds_no_extra_layer() {
        let mut fixture = PdfFixture::new();
        let walls = fixture.ocg("Walls");
        fixture.page("/OC /MC#201 BDC 0 0 m 1 0 l S EMC", &[("MC 1", walls)]);
        let report = extract(fixture);

        assert_eq!(report.pages_with_layers[0].layers, vec!["Walls"]);
        let stats = &report.layer_usage_analysis;
        assert_eq!(stats.total_layers, 1);
        assert_eq!(stats.layer_distribution.len(), 1);
        assert_eq!(stats.layer_distribution["Walls"], 1);
    }
}

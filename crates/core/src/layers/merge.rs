//! Unification of catalog and xref discovery results by layer name.

use super::types::{Layer, OriginKind};

/// Fields of a [`Layer`] that the merge policy decides on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerField {
    Visible,
    Locked,
    Intent,
    Usage,
    CreatorInfo,
    SourceReference,
}

/// Where a merged field takes its value from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSource {
    /// The catalog value is used as-is, even when it is a default.
    CatalogOnly,
    /// The catalog value is used when non-empty, otherwise the xref value.
    CatalogThenXref,
}

/// Per-field merge policy for layers found in both sources.
pub const MERGE_POLICY: [(LayerField, FieldSource); 6] = [
    (LayerField::Visible, FieldSource::CatalogOnly),
    (LayerField::Locked, FieldSource::CatalogOnly),
    (LayerField::Intent, FieldSource::CatalogThenXref),
    (LayerField::Usage, FieldSource::CatalogThenXref),
    (LayerField::CreatorInfo, FieldSource::CatalogThenXref),
    (LayerField::SourceReference, FieldSource::CatalogThenXref),
];

/// Merge catalog layers (in catalog order) with xref layers (in xref order).
///
/// - A catalog layer whose name also appears in the xref results is combined
///   field by field according to [`MERGE_POLICY`] and marked `Merged`.
/// - Xref layers with no catalog counterpart are appended as `XrefOcg`.
/// - With no catalog layers at all, the xref layers are emitted unmodified
///   (xref-only mode).
///
/// Names are unique in the output; the first occurrence of a name wins.
pub fn merge_layers(catalog: Vec<Layer>, xref: Vec<Layer>) -> Vec<Layer> {
    let mut merged: Vec<Layer> = Vec::with_capacity(catalog.len() + xref.len());

    if catalog.is_empty() {
        for layer in xref {
            if !contains_name(&merged, &layer.name) {
                merged.push(layer);
            }
        }
        return merged;
    }

    for layer in catalog {
        if contains_name(&merged, &layer.name) {
            continue;
        }
        let combined = match xref.iter().find(|x| x.name == layer.name) {
            Some(other) => combine(layer, other),
            None => layer,
        };
        merged.push(combined);
    }

    for layer in xref {
        if !contains_name(&merged, &layer.name) {
            merged.push(layer);
        }
    }

    merged
}

fn contains_name(layers: &[Layer], name: &str) -> bool {
    layers.iter().any(|l| l.name == name)
}

/// Apply [`MERGE_POLICY`] to one catalog/xref pair.
fn combine(catalog: Layer, xref: &Layer) -> Layer {
    let mut out = catalog;

    for (field, source) in MERGE_POLICY {
        if source == FieldSource::CatalogOnly {
            continue;
        }
        match field {
            LayerField::Intent if out.intent.is_empty() => out.intent = xref.intent.clone(),
            LayerField::Usage if out.usage.is_empty() => out.usage = xref.usage.clone(),
            LayerField::CreatorInfo if out.creator_info.is_none() => {
                out.creator_info = xref.creator_info.clone()
            }
            LayerField::SourceReference if out.source_reference.is_none() => {
                out.source_reference = xref.source_reference
            }
            _ => {}
        }
    }

    out.origin = OriginKind::Merged;
    out
}

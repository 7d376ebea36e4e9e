//! The response document assembled from one extraction pass.

use std::collections::BTreeMap;

use serde::Serialize;

use super::types::{
    Layer, LayerConfiguration, ObjectRef, OcState, PageLayerUsage, Usage, UsageStatistics,
};

/// Catalog view of one OCG, keyed by its reference in [`OcgInfo::ocgs`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OcgSummary {
    pub name: String,
    pub on: bool,
    pub locked: bool,
    pub intent: Vec<String>,
    pub usage: Usage,
    pub creator_info: Option<String>,
}

impl From<&Layer> for OcgSummary {
    fn from(layer: &Layer) -> Self {
        OcgSummary {
            name: layer.name.clone(),
            on: layer.visible,
            locked: layer.locked,
            intent: layer.intent.clone(),
            usage: layer.usage.clone(),
            creator_info: layer.creator_info.clone(),
        }
    }
}

/// Raw optional-content properties as read from the catalog.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct OcgInfo {
    pub ocgs: BTreeMap<ObjectRef, OcgSummary>,
    pub default_config: Option<LayerConfiguration>,
    pub alternate_configs: Vec<LayerConfiguration>,
}

impl OcgInfo {
    /// Build from catalog layers and configurations. Layers without a reference are skipped.
    pub fn new(
        catalog_layers: &[Layer],
        default_config: Option<LayerConfiguration>,
        alternate_configs: Vec<LayerConfiguration>,
    ) -> Self {
        let ocgs = catalog_layers
            .iter()
            .filter_map(|layer| layer.source_reference.map(|r| (r, OcgSummary::from(layer))))
            .collect();
        OcgInfo {
            ocgs,
            default_config,
            alternate_configs,
        }
    }

    /// One summary per configuration: the default first (number 0), then `/Configs` in order.
    pub fn configuration_summaries(&self) -> Vec<ConfigurationSummary> {
        let default = self
            .default_config
            .iter()
            .map(|config| ConfigurationSummary::new(0, config, true));
        let alternates = self
            .alternate_configs
            .iter()
            .enumerate()
            .map(|(i, config)| ConfigurationSummary::new(i + 1, config, false));
        default.chain(alternates).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigurationSummary {
    pub number: usize,
    pub name: Option<String>,
    pub creator: Option<String>,
    pub base_state: OcState,
    pub is_default: bool,
}

impl ConfigurationSummary {
    fn new(number: usize, config: &LayerConfiguration, is_default: bool) -> Self {
        ConfigurationSummary {
            number,
            name: config.name.clone(),
            creator: config.creator.clone(),
            base_state: config.base_state,
            is_default,
        }
    }
}

/// Document-level facts reported alongside the layers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DocumentFacts {
    pub total_pages: usize,
    pub pdf_version: String,
    pub creator: String,
    pub producer: String,
}

/// Full result of one extraction, in response-field order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    pub has_layers: bool,
    pub layer_count: usize,
    pub layers: Vec<Layer>,
    pub ocg_info: OcgInfo,
    pub layer_configurations: Vec<ConfigurationSummary>,
    pub pages_with_layers: Vec<PageLayerUsage>,
    pub total_pages: usize,
    pub pdf_version: String,
    pub creator: String,
    pub producer: String,
    pub layer_usage_analysis: UsageStatistics,
}

impl LayerReport {
    /// Assemble the report. `has_layers` and `layer_count` follow the merged layer set.
    pub fn new(
        layers: Vec<Layer>,
        ocg_info: OcgInfo,
        pages_with_layers: Vec<PageLayerUsage>,
        layer_usage_analysis: UsageStatistics,
        facts: DocumentFacts,
    ) -> Self {
        LayerReport {
            filename: None,
            has_layers: !layers.is_empty(),
            layer_count: layers.len(),
            layer_configurations: ocg_info.configuration_summaries(),
            layers,
            ocg_info,
            pages_with_layers,
            total_pages: facts.total_pages,
            pdf_version: facts.pdf_version,
            creator: facts.creator,
            producer: facts.producer,
            layer_usage_analysis,
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }
}

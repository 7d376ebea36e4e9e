//! Layer model and pure transformations.
//!
//! - [`types`]: data model shared by every stage
//! - [`text`]: best-effort field extraction from PDF dictionary text
//! - [`scan`]: layer markers in decoded content streams
//! - [`merge`]: catalog/xref unification by name
//! - [`usage`]: page-usage statistics
//! - [`report`]: the assembled response document

pub mod merge;
pub mod report;
pub mod scan;
pub mod text;
pub mod types;
pub mod usage;

pub use merge::merge_layers;
pub use report::{ConfigurationSummary, DocumentFacts, LayerReport, OcgInfo, OcgSummary};
pub use scan::{resolve_tokens, scan_content, LayerToken};
pub use types::{
    InvalidObjectRef, InvalidPrecision, Layer, LayerConfiguration, ObjectRef, OcState,
    OriginKind, PageKey, PageLayerUsage, Point, Precision, StrokeStyle, Usage, UsagePurpose,
    UsageStatistics, VectorPath,
};
pub use usage::aggregate_usage;

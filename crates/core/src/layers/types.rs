use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Object references
// ---------------------------------------------------------------------------

/// An indirect object reference (`num gen R`) into the provider's object space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectRef {
    pub num: u32,
    pub gen: u16,
}

impl ObjectRef {
    pub const fn new(num: u32, gen: u16) -> Self {
        ObjectRef { num, gen }
    }

    /// The `(object number, generation)` pair used by the PDF provider.
    pub fn id(&self) -> (u32, u16) {
        (self.num, self.gen)
    }
}

impl From<(u32, u16)> for ObjectRef {
    fn from((num, gen): (u32, u16)) -> Self {
        ObjectRef { num, gen }
    }
}

impl From<ObjectRef> for (u32, u16) {
    fn from(r: ObjectRef) -> Self {
        r.id()
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} R", self.num, self.gen)
    }
}

impl FromStr for ObjectRef {
    type Err = InvalidObjectRef;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split_whitespace().collect();
        if parts.len() != 3 || parts[2] != "R" {
            return Err(InvalidObjectRef);
        }
        let num = parts[0].parse::<u32>().map_err(|_| InvalidObjectRef)?;
        let gen = parts[1].parse::<u16>().map_err(|_| InvalidObjectRef)?;
        Ok(ObjectRef { num, gen })
    }
}

// Serialized as `"5 0 R"`, which also makes it usable as a JSON map key.
impl Serialize for ObjectRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ---------------------------------------------------------------------------
// Optional-content enums
// ---------------------------------------------------------------------------

/// An optional-content state as written in PDF dictionaries.
///
/// Used both for usage states (`/PrintState /OFF`) and for a configuration's
/// `/BaseState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum OcState {
    #[default]
    #[serde(rename = "ON")]
    On,
    #[serde(rename = "OFF")]
    Off,
    Unchanged,
}

impl OcState {
    /// Parse a PDF name (without the leading slash).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "ON" => Some(OcState::On),
            "OFF" => Some(OcState::Off),
            "Unchanged" => Some(OcState::Unchanged),
            _ => None,
        }
    }
}

impl fmt::Display for OcState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OcState::On => write!(f, "ON"),
            OcState::Off => write!(f, "OFF"),
            OcState::Unchanged => write!(f, "Unchanged"),
        }
    }
}

/// Purposes an OCG's `/Usage` dictionary can describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UsagePurpose {
    Print,
    View,
    Export,
}

impl UsagePurpose {
    pub const ALL: [UsagePurpose; 3] = [UsagePurpose::Print, UsagePurpose::View, UsagePurpose::Export];

    /// The usage sub-dictionary key, e.g. `Print`.
    pub fn dict_key(&self) -> &'static str {
        match self {
            UsagePurpose::Print => "Print",
            UsagePurpose::View => "View",
            UsagePurpose::Export => "Export",
        }
    }

    /// The state key inside the sub-dictionary, e.g. `PrintState`.
    pub fn state_key(&self) -> &'static str {
        match self {
            UsagePurpose::Print => "PrintState",
            UsagePurpose::View => "ViewState",
            UsagePurpose::Export => "ExportState",
        }
    }
}

/// Purpose -> state mapping parsed from a `/Usage` dictionary.
pub type Usage = BTreeMap<UsagePurpose, OcState>;

/// Which discovery source(s) produced a [`Layer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OriginKind {
    CatalogOcg,
    XrefOcg,
    Merged,
}

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        ((other.x - self.x).powi(2) + (other.y - self.y).powi(2)).sqrt()
    }
}

/// Number of decimals kept for coordinate and geometry fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Precision(u8);

impl Precision {
    pub const MAX: u8 = 3;

    pub fn round(&self, value: f64) -> f64 {
        let factor = 10f64.powi(self.0 as i32);
        (value * factor).round() / factor
    }
}

impl TryFrom<u8> for Precision {
    type Error = InvalidPrecision;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value <= Self::MAX {
            Ok(Precision(value))
        } else {
            Err(InvalidPrecision(value))
        }
    }
}

/// Kind of a drawn primitive. Only lines are attributed to layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    Line,
}

/// One line primitive attributed to a layer on a page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VectorPath {
    #[serde(rename = "type")]
    pub kind: PrimitiveKind,
    pub p1: Point,
    pub p2: Point,
    pub length: f64,
    pub width: f64,
    pub opacity: f64,
    pub color: Option<[f64; 3]>,
    #[serde(rename = "closePath")]
    pub close_path: bool,
}

/// Stroke attributes shared by every line of one drawing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub width: f64,
    pub opacity: f64,
    pub color: Option<[f64; 3]>,
    pub close_path: bool,
}

impl VectorPath {
    /// Package a line, deriving its length before any rounding is applied.
    pub fn line(p1: Point, p2: Point, style: StrokeStyle, precision: Option<Precision>) -> Self {
        let length = p1.distance_to(&p2);
        let round = |v: f64| precision.map_or(v, |p| p.round(v));

        VectorPath {
            kind: PrimitiveKind::Line,
            p1: Point::new(round(p1.x), round(p1.y)),
            p2: Point::new(round(p2.x), round(p2.y)),
            length: round(length),
            width: round(style.width),
            opacity: style.opacity,
            color: style.color,
            close_path: style.close_path,
        }
    }
}

/// A 1-based page number serialized as the `page_N` key of a vectors map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PageKey(pub u32);

impl Serialize for PageKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&format_args!("page_{}", self.0))
    }
}

// ---------------------------------------------------------------------------
// Layers
// ---------------------------------------------------------------------------

/// One optional content group as exposed in the response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layer {
    pub name: String,
    pub visible: bool,
    pub locked: bool,
    #[serde(rename = "ocg_reference")]
    pub source_reference: Option<ObjectRef>,
    pub intent: Vec<String>,
    pub usage: Usage,
    pub creator_info: Option<String>,
    #[serde(rename = "source")]
    pub origin: OriginKind,
    pub vectors: BTreeMap<PageKey, Vec<VectorPath>>,
    pub vector_count: usize,
}

impl Layer {
    /// A layer with the documented defaults: visible, unlocked, no intent or usage.
    ///
    /// `visible = true` is a fallback policy for layers whose state cannot be
    /// determined, not a reading of the document.
    pub fn new(name: impl Into<String>, origin: OriginKind) -> Self {
        Layer {
            name: name.into(),
            visible: true,
            locked: false,
            source_reference: None,
            intent: Vec::new(),
            usage: Usage::new(),
            creator_info: None,
            origin,
            vectors: BTreeMap::new(),
            vector_count: 0,
        }
    }

    /// Placeholder name for an OCG without a usable `/Name`.
    pub fn fallback_name(object_number: u32) -> String {
        format!("Layer_{}", object_number)
    }

    /// Attach the lines found on one page. Empty lists are not recorded.
    pub fn attach_vectors(&mut self, page_number: u32, paths: Vec<VectorPath>) {
        if paths.is_empty() {
            return;
        }
        self.vectors.entry(PageKey(page_number)).or_default().extend(paths);
        self.vector_count = self.vectors.values().map(Vec::len).sum();
    }
}

/// One optional-content configuration (`/D` or an entry of `/Configs`).
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct LayerConfiguration {
    pub name: Option<String>,
    pub creator: Option<String>,
    pub base_state: OcState,
    pub on: Vec<ObjectRef>,
    pub off: Vec<ObjectRef>,
    pub locked: Vec<ObjectRef>,
}

impl LayerConfiguration {
    /// Initial visibility of an OCG under this configuration.
    ///
    /// Explicit `/OFF` wins over `/ON`; otherwise the base state decides, with
    /// `Unchanged` treated as visible.
    pub fn is_visible(&self, ocg: ObjectRef) -> bool {
        if self.off.contains(&ocg) {
            return false;
        }
        if self.on.contains(&ocg) {
            return true;
        }
        self.base_state != OcState::Off
    }

    pub fn is_locked(&self, ocg: ObjectRef) -> bool {
        self.locked.contains(&ocg)
    }
}

/// Layers referenced on one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLayerUsage {
    pub page_number: u32,
    pub layers: Vec<String>,
}

impl Serialize for PageLayerUsage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("PageLayerUsage", 3)?;
        s.serialize_field("page_number", &self.page_number)?;
        s.serialize_field("layers", &self.layers)?;
        s.serialize_field("layer_count", &self.layers.len())?;
        s.end()
    }
}

/// Aggregate page-usage statistics.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct UsageStatistics {
    pub total_layers: usize,
    pub pages_with_layers: usize,
    pub pages_without_layers: usize,
    pub layer_distribution: BTreeMap<String, usize>,
    pub most_used_layers: Vec<(String, usize)>,
    pub least_used_layers: Vec<(String, usize)>,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
#[error("Invalid object reference (expected '{{num}} {{gen}} R')")]
pub struct InvalidObjectRef;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Precision must be between 0 and 3, got {0}")]
pub struct InvalidPrecision(pub u8);

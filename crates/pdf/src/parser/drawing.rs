//! Vector drawing extraction from page content streams.
//!
//! Walks the decoded operations of a page, tracking just enough graphics
//! state to report painted paths in top-left-origin page space:
//!
//! | Operator(s)                  | Effect |
//! |------------------------------|--------|
//! | `q` / `Q`                    | Save / restore graphics state |
//! | `cm`                         | Concatenate the CTM |
//! | `w`, `gs`                    | Line width, ExtGState (`/LW`, `/CA`, `/ca`) |
//! | `G` `RG` `K` `SC` `SCN` `CS` | Stroke color (CMYK converted to RGB) |
//! | `m` `l` `c` `v` `y` `h` `re` | Path construction |
//! | `S` `s` `f` `F` `f*` `B` `B*` `b` `b*` `n` | Path painting |
//! | `BMC` / `BDC` / `EMC`        | Marked content; `/OC` sections hide paths |
//! | `Do`                         | Form XObjects, interpreted recursively |

use pdflayers_core::layers::{ObjectRef, Point};

use super::backend::{
    get_number_from_value, resolve_value, ContentOp, PageId, PdfBackend, PdfValue,
};
use crate::types::{Drawing, PathItem};
use crate::PdfError;

/// Form XObjects nested deeper than this are not interpreted.
const MAX_FORM_DEPTH: usize = 8;

/// The identity 2x3 matrix: [a, b, c, d, e, f].
const IDENTITY_MATRIX: [f64; 6] = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

// ---------------------------------------------------------------------------
// Internal: graphics state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct GraphicsState {
    ctm: [f64; 6],
    line_width: f64,
    stroke_color: [f64; 3],
    stroke_alpha: f64,
    fill_alpha: f64,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            ctm: IDENTITY_MATRIX,
            line_width: 1.0,
            stroke_color: [0.0, 0.0, 0.0],
            stroke_alpha: 1.0,
            fill_alpha: 1.0,
        }
    }
}

impl GraphicsState {
    /// Pre-multiply the CTM by `m` (the `cm` operator).
    fn concat(&mut self, m: [f64; 6]) {
        self.ctm = multiply(m, self.ctm);
    }

    fn transform(&self, x: f64, y: f64) -> (f64, f64) {
        let m = &self.ctm;
        (m[0] * x + m[2] * y + m[4], m[1] * x + m[3] * y + m[5])
    }

    /// Line width in device space, using the CTM's area scale factor.
    fn device_line_width(&self) -> f64 {
        let m = &self.ctm;
        let scale = (m[0] * m[3] - m[1] * m[2]).abs().sqrt();
        self.line_width * scale
    }
}

/// `a × b` for PDF row-vector matrices.
fn multiply(a: [f64; 6], b: [f64; 6]) -> [f64; 6] {
    [
        a[0] * b[0] + a[1] * b[2],
        a[0] * b[1] + a[1] * b[3],
        a[2] * b[0] + a[3] * b[2],
        a[2] * b[1] + a[3] * b[3],
        a[4] * b[0] + a[5] * b[2] + b[4],
        a[4] * b[1] + a[5] * b[3] + b[5],
    ]
}

fn cmyk_to_rgb(c: f64, m: f64, y: f64, k: f64) -> [f64; 3] {
    [(1.0 - c) * (1.0 - k), (1.0 - m) * (1.0 - k), (1.0 - y) * (1.0 - k)]
}

/// Interpret a color operand list by its length: gray, RGB, or CMYK.
fn color_from_components(values: &[f64]) -> Option<[f64; 3]> {
    match values.len() {
        1 => Some([values[0]; 3]),
        3 => Some([values[0], values[1], values[2]]),
        4 => Some(cmyk_to_rgb(values[0], values[1], values[2], values[3])),
        _ => None,
    }
}

fn numbers(operands: &[PdfValue]) -> Vec<f64> {
    operands
        .iter()
        .filter_map(get_number_from_value)
        .map(f64::from)
        .collect()
}

fn matrix_from(values: &[f64]) -> Option<[f64; 6]> {
    if values.len() < 6 {
        return None;
    }
    Some([values[0], values[1], values[2], values[3], values[4], values[5]])
}

// ---------------------------------------------------------------------------
// Internal: path construction
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct PathBuilder {
    items: Vec<PathItem>,
    current: Option<Point>,
    start: Option<Point>,
    closed: bool,
}

impl PathBuilder {
    fn move_to(&mut self, p: Point) {
        self.current = Some(p);
        self.start = Some(p);
    }

    fn line_to(&mut self, p: Point) {
        match self.current {
            Some(cur) => self.items.push(PathItem::Line(cur, p)),
            None => self.start = Some(p),
        }
        self.current = Some(p);
    }

    fn curve_to(&mut self, c1: Option<Point>, c2: Option<Point>, p: Point) {
        let cur = self.current.unwrap_or(p);
        let c1 = c1.unwrap_or(cur);
        let c2 = c2.unwrap_or(p);
        self.items.push(PathItem::Curve(cur, c1, c2, p));
        self.current = Some(p);
    }

    fn close(&mut self) {
        if self.current.is_some() {
            self.closed = true;
            self.current = self.start;
        }
    }

    /// Take the finished path, leaving the builder empty.
    fn finish(&mut self) -> (Vec<PathItem>, bool) {
        let taken = std::mem::take(self);
        (taken.items, taken.closed)
    }
}

// ---------------------------------------------------------------------------
// Optional content
// ---------------------------------------------------------------------------

/// Whether an optional-content reference or membership dictionary is visible.
///
/// A reference to an OCG uses the backend's current state.  Membership
/// dictionaries (OCMDs) evaluate their `/OCGs` under the `/P` policy
/// (`AnyOn` by default).  Anything unresolvable counts as visible.
pub fn oc_visible(backend: &dyn PdfBackend, value: &PdfValue) -> bool {
    match value {
        PdfValue::Reference(id) => {
            let reference = ObjectRef::from(*id);
            if let Some(on) = backend.ocg_state(reference) {
                return on;
            }
            match backend.object(reference) {
                Ok(dict) => membership_visible(backend, &dict),
                Err(_) => true,
            }
        }
        PdfValue::Dict(_) => membership_visible(backend, value),
        _ => true,
    }
}

fn membership_visible(backend: &dyn PdfBackend, dict: &PdfValue) -> bool {
    let members = match dict.get(b"OCGs") {
        Some(value) => value.references(),
        None => return true,
    };
    let states: Vec<bool> = members
        .iter()
        .filter_map(|r| backend.ocg_state(*r))
        .collect();
    if states.is_empty() {
        return true;
    }

    let policy = dict.get(b"P").and_then(PdfValue::as_name);
    match policy.as_deref() {
        Some("AllOn") => states.iter().all(|&on| on),
        Some("AnyOff") => states.iter().any(|&on| !on),
        Some("AllOff") => states.iter().all(|&on| !on),
        _ => states.iter().any(|&on| on),
    }
}

/// The OCG references an optional-content value stands for.
///
/// An OCG reference yields itself, an OCMD yields its `/OCGs` members.
pub fn oc_members(backend: &dyn PdfBackend, value: &PdfValue) -> Vec<ObjectRef> {
    if let Some(reference) = value.as_reference() {
        if backend.ocg_state(reference).is_some() {
            return vec![reference];
        }
    }
    match resolve_value(backend, value) {
        Some(dict) => match dict.get(b"OCGs") {
            Some(members) => members.references(),
            None => value.as_reference().into_iter().collect(),
        },
        None => Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// Interpreter
// ---------------------------------------------------------------------------

struct Interpreter<'a> {
    backend: &'a dyn PdfBackend,
    /// `[x0, y0, x1, y1]` of the page's MediaBox.
    page_box: [f64; 4],
    drawings: Vec<Drawing>,
}

impl<'a> Interpreter<'a> {
    /// Device coordinates to top-left-origin page space.
    fn to_page(&self, gs: &GraphicsState, x: f64, y: f64) -> Point {
        let (dx, dy) = gs.transform(x, y);
        Point::new(dx - self.page_box[0], self.page_box[3] - dy)
    }

    /// Look up `/category /name` in a resource dictionary, resolving the category.
    fn resource(
        &self,
        resources: &PdfValue,
        category: &[u8],
        name: &[u8],
    ) -> Option<PdfValue> {
        let dict = resolve_value(self.backend, resources.get(category)?)?;
        dict.get(name).cloned()
    }

    fn run(&mut self, ops: &[ContentOp], resources: &PdfValue, initial: GraphicsState, depth: usize) {
        let mut gs = initial;
        let mut stack: Vec<GraphicsState> = Vec::new();
        let mut path = PathBuilder::default();
        let mut hidden = false;
        let mut marked: Vec<bool> = Vec::new();

        for op in ops {
            let operands = &op.operands;
            match op.operator.as_str() {
                // -- Graphics state -----------------------------------------
                "q" => stack.push(gs.clone()),
                "Q" => {
                    if let Some(prev) = stack.pop() {
                        gs = prev;
                    }
                }
                "cm" => {
                    if let Some(m) = matrix_from(&numbers(operands)) {
                        gs.concat(m);
                    }
                }
                "w" => {
                    if let Some(w) = numbers(operands).first() {
                        gs.line_width = *w;
                    }
                }
                "gs" => {
                    if let Some(name) = operands.first().and_then(PdfValue::as_name) {
                        self.apply_ext_gstate(resources, name.as_bytes(), &mut gs);
                    }
                }

                // -- Stroke color -------------------------------------------
                "G" | "RG" | "K" | "SC" | "SCN" => {
                    if let Some(color) = color_from_components(&numbers(operands)) {
                        gs.stroke_color = color;
                    }
                }
                "CS" => gs.stroke_color = [0.0, 0.0, 0.0],

                // -- Path construction --------------------------------------
                "m" => {
                    let v = numbers(operands);
                    if v.len() >= 2 {
                        path.move_to(self.to_page(&gs, v[0], v[1]));
                    }
                }
                "l" => {
                    let v = numbers(operands);
                    if v.len() >= 2 {
                        path.line_to(self.to_page(&gs, v[0], v[1]));
                    }
                }
                "c" => {
                    let v = numbers(operands);
                    if v.len() >= 6 {
                        let c1 = self.to_page(&gs, v[0], v[1]);
                        let c2 = self.to_page(&gs, v[2], v[3]);
                        path.curve_to(Some(c1), Some(c2), self.to_page(&gs, v[4], v[5]));
                    }
                }
                "v" => {
                    let v = numbers(operands);
                    if v.len() >= 4 {
                        let c2 = self.to_page(&gs, v[0], v[1]);
                        path.curve_to(None, Some(c2), self.to_page(&gs, v[2], v[3]));
                    }
                }
                "y" => {
                    let v = numbers(operands);
                    if v.len() >= 4 {
                        let c1 = self.to_page(&gs, v[0], v[1]);
                        path.curve_to(Some(c1), None, self.to_page(&gs, v[2], v[3]));
                    }
                }
                "h" => path.close(),
                "re" => {
                    let v = numbers(operands);
                    if v.len() >= 4 {
                        let p1 = self.to_page(&gs, v[0], v[1]);
                        let p2 = self.to_page(&gs, v[0] + v[2], v[1] + v[3]);
                        path.items.push(PathItem::Rect(p1, p2));
                        path.move_to(p1);
                    }
                }

                // -- Path painting ------------------------------------------
                "S" => self.paint(&mut path, &gs, hidden, true, false, false),
                "s" => self.paint(&mut path, &gs, hidden, true, false, true),
                "f" | "F" | "f*" => self.paint(&mut path, &gs, hidden, false, true, false),
                "B" | "B*" => self.paint(&mut path, &gs, hidden, true, true, false),
                "b" | "b*" => self.paint(&mut path, &gs, hidden, true, true, true),
                "n" => self.paint(&mut path, &gs, hidden, false, false, false),

                // -- Marked content -----------------------------------------
                "BMC" => marked.push(hidden),
                "BDC" => {
                    marked.push(hidden);
                    if !hidden && !self.marked_content_visible(operands, resources) {
                        hidden = true;
                    }
                }
                "EMC" => hidden = marked.pop().unwrap_or(false),

                // -- XObjects -----------------------------------------------
                "Do" => {
                    if hidden {
                        continue;
                    }
                    if let Some(name) = operands.first().and_then(PdfValue::as_name) {
                        self.run_form(resources, name.as_bytes(), &gs, depth);
                    }
                }

                _ => { /* Ignore text, images, shading and fill colors */ }
            }
        }
    }

    fn paint(
        &mut self,
        path: &mut PathBuilder,
        gs: &GraphicsState,
        hidden: bool,
        stroke: bool,
        fill: bool,
        close: bool,
    ) {
        if close {
            path.close();
        }
        let (items, closed) = path.finish();
        if hidden || items.is_empty() || !(stroke || fill) {
            return;
        }

        self.drawings.push(Drawing {
            items,
            width: gs.device_line_width(),
            opacity: if stroke { gs.stroke_alpha } else { gs.fill_alpha },
            color: stroke.then_some(gs.stroke_color),
            close_path: closed,
            stroked: stroke,
            filled: fill,
        });
    }

    fn apply_ext_gstate(&self, resources: &PdfValue, name: &[u8], gs: &mut GraphicsState) {
        let dict = match self
            .resource(resources, b"ExtGState", name)
            .and_then(|v| resolve_value(self.backend, &v))
        {
            Some(dict) => dict,
            None => return,
        };
        if let Some(lw) = dict.get(b"LW").and_then(get_number_from_value) {
            gs.line_width = f64::from(lw);
        }
        if let Some(ca) = dict.get(b"CA").and_then(get_number_from_value) {
            gs.stroke_alpha = f64::from(ca);
        }
        if let Some(ca) = dict.get(b"ca").and_then(get_number_from_value) {
            gs.fill_alpha = f64::from(ca);
        }
    }

    /// Visibility of a `BDC` section. Only `/OC` sections can hide content.
    fn marked_content_visible(&self, operands: &[PdfValue], resources: &PdfValue) -> bool {
        let tag = operands.first().and_then(PdfValue::as_name);
        if tag.as_deref() != Some("OC") {
            return true;
        }
        match operands.get(1) {
            Some(PdfValue::Name(name)) => match self.resource(resources, b"Properties", name) {
                Some(entry) => oc_visible(self.backend, &entry),
                None => true,
            },
            Some(inline @ PdfValue::Dict(_)) => oc_visible(self.backend, inline),
            _ => true,
        }
    }

    fn run_form(&mut self, resources: &PdfValue, name: &[u8], gs: &GraphicsState, depth: usize) {
        let reference = match self
            .resource(resources, b"XObject", name)
            .and_then(|v| v.as_reference())
        {
            Some(r) => r,
            None => return,
        };
        if depth >= MAX_FORM_DEPTH {
            log::debug!("Form XObject {} exceeds nesting depth, skipped", reference);
            return;
        }

        let dict = match self.backend.object(reference) {
            Ok(dict) => dict,
            Err(e) => {
                log::debug!("Cannot read XObject {}: {}", reference, e);
                return;
            }
        };
        if dict.get(b"Subtype").and_then(PdfValue::as_name).as_deref() != Some("Form") {
            return;
        }
        if let Some(oc) = dict.get(b"OC") {
            if !oc_visible(self.backend, oc) {
                return;
            }
        }

        let ops = match self
            .backend
            .stream_content(reference)
            .and_then(|data| self.backend.decode_content(&data))
        {
            Ok(ops) => ops,
            Err(e) => {
                log::debug!("Cannot decode Form XObject {}: {}", reference, e);
                return;
            }
        };

        let form_resources = dict
            .get(b"Resources")
            .and_then(|r| resolve_value(self.backend, r))
            .unwrap_or_else(|| resources.clone());

        let mut form_gs = gs.clone();
        if let Some(m) = dict.get(b"Matrix").and_then(|m| match m {
            PdfValue::Array(items) => matrix_from(&numbers(items)),
            _ => None,
        }) {
            form_gs.concat(m);
        }

        self.run(&ops, &form_resources, form_gs, depth + 1);
    }
}

/// Extract every painted path on a page under the backend's current
/// optional-content state.
pub fn extract_page_drawings(
    backend: &dyn PdfBackend,
    page: PageId,
) -> Result<Vec<Drawing>, PdfError> {
    let raw_content = backend.page_content(page)?;
    let ops = backend.decode_content(&raw_content)?;
    let resources = backend.page_resources(page)?;
    let page_box = backend.media_box(page)?;

    let mut interpreter = Interpreter {
        backend,
        page_box,
        drawings: Vec::new(),
    };
    interpreter.run(&ops, &resources, GraphicsState::default(), 0);
    Ok(interpreter.drawings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockBackend;

    const PAGE: PageId = (1, 0);

    fn drawings(backend: &MockBackend) -> Vec<Drawing> {
        extract_page_drawings(backend, PAGE).unwrap()
    }

    fn first_line(drawing: &Drawing) -> (Point, Point) {
        drawing.lines().next().unwrap()
    }

    #[test]
    fn test_stroked_line_in_top_left_space() {
        let backend = MockBackend::with_page("2 w 0 0 1 RG 10 20 m 110 20 l S");
        let result = drawings(&backend);
        assert_eq!(result.len(), 1);
        let d = &result[0];
        assert_eq!(first_line(d), (Point::new(10.0, 772.0), Point::new(110.0, 772.0)));
        assert_eq!(d.width, 2.0);
        assert_eq!(d.color, Some([0.0, 0.0, 1.0]));
        assert!(d.stroked && !d.filled && !d.close_path);
    }

    #[test]
    fn test_ctm_scales_points_and_width() {
        let backend = MockBackend::with_page("q 2 0 0 2 100 100 cm 0 0 m 10 0 l S Q 0 0 m 1 0 l S");
        let result = drawings(&backend);
        assert_eq!(result.len(), 2);
        assert_eq!(
            first_line(&result[0]),
            (Point::new(100.0, 692.0), Point::new(120.0, 692.0))
        );
        assert_eq!(result[0].width, 2.0);
        // Q restored the identity CTM.
        assert_eq!(result[1].width, 1.0);
        assert_eq!(first_line(&result[1]).0, Point::new(0.0, 792.0));
    }

    #[test]
    fn test_fill_only_and_end_path() {
        let backend = MockBackend::with_page("0 0 m 10 0 l 10 10 l f 0 0 m 5 5 l n 0 0 m 1 1 l h s");
        let result = drawings(&backend);
        assert_eq!(result.len(), 2);
        assert!(result[0].filled && !result[0].stroked);
        assert_eq!(result[0].color, None);
        assert!(result[1].close_path);
    }

    #[test]
    fn test_cmyk_and_gray_colors() {
        let backend = MockBackend::with_page("0 1 1 0 K 0 0 m 1 0 l S 0.5 G 0 0 m 1 0 l S");
        let result = drawings(&backend);
        assert_eq!(result[0].color, Some([1.0, 0.0, 0.0]));
        assert_eq!(result[1].color, Some([0.5, 0.5, 0.5]));
    }

    #[test]
    fn test_ext_gstate_alpha_and_width() {
        let mut backend = MockBackend::with_page("/GS1 gs 0 0 m 1 0 l S");
        backend.set_resources(PdfValue::Dict(vec![(
            b"ExtGState".to_vec(),
            PdfValue::Dict(vec![(
                b"GS1".to_vec(),
                PdfValue::Dict(vec![
                    (b"CA".to_vec(), PdfValue::Real(0.5)),
                    (b"LW".to_vec(), PdfValue::Integer(3)),
                ]),
            )]),
        )]));
        let result = drawings(&backend);
        assert_eq!(result[0].opacity, 0.5);
        assert_eq!(result[0].width, 3.0);
    }

    #[test]
    fn test_hidden_optional_content_is_discarded() {
        let mut backend = MockBackend::with_page(
            "/OC /oc1 BDC 0 0 m 1 0 l S /Span BMC 0 0 m 2 0 l S EMC EMC 0 0 m 3 0 l S",
        );
        let layer = backend.add_ocg("Hidden", false);
        backend.set_properties(&[("oc1", layer)]);

        let result = drawings(&backend);
        assert_eq!(result.len(), 1);
        assert_eq!(first_line(&result[0]).1, Point::new(3.0, 792.0));

        backend.set_ocg_state(layer, true).unwrap();
        assert_eq!(drawings(&backend).len(), 3);
    }

    #[test]
    fn test_other_marked_content_does_not_hide() {
        let backend = MockBackend::with_page("/Artifact BMC /P << /MCID 0 >> BDC 0 0 m 1 0 l S EMC EMC");
        assert_eq!(drawings(&backend).len(), 1);
    }

    #[test]
    fn test_membership_dictionary_policies() {
        let mut backend = MockBackend::with_page("/OC /mc BDC 0 0 m 1 0 l S EMC");
        let a = backend.add_ocg("A", true);
        let b = backend.add_ocg("B", false);
        let any_on = backend.add_object(PdfValue::Dict(vec![
            (b"Type".to_vec(), PdfValue::Name(b"OCMD".to_vec())),
            (
                b"OCGs".to_vec(),
                PdfValue::Array(vec![PdfValue::Reference(a.id()), PdfValue::Reference(b.id())]),
            ),
        ]));
        backend.set_properties(&[("mc", any_on)]);
        assert_eq!(drawings(&backend).len(), 1);

        let all_on = backend.add_object(PdfValue::Dict(vec![
            (b"Type".to_vec(), PdfValue::Name(b"OCMD".to_vec())),
            (
                b"OCGs".to_vec(),
                PdfValue::Array(vec![PdfValue::Reference(a.id()), PdfValue::Reference(b.id())]),
            ),
            (b"P".to_vec(), PdfValue::Name(b"AllOn".to_vec())),
        ]));
        backend.set_properties(&[("mc", all_on)]);
        assert!(drawings(&backend).is_empty());

        assert_eq!(oc_members(&backend, &PdfValue::Reference(all_on.id())), vec![a, b]);
        assert_eq!(oc_members(&backend, &PdfValue::Reference(a.id())), vec![a]);
    }

    #[test]
    fn test_form_xobject_recursion() {
        let mut backend = MockBackend::with_page("q /Fm1 Do Q /Fm2 Do");
        let layer = backend.add_ocg("Off", false);
        let form = backend.add_stream(
            PdfValue::Dict(vec![
                (b"Subtype".to_vec(), PdfValue::Name(b"Form".to_vec())),
                (
                    b"Matrix".to_vec(),
                    PdfValue::Array(vec![
                        PdfValue::Integer(1),
                        PdfValue::Integer(0),
                        PdfValue::Integer(0),
                        PdfValue::Integer(1),
                        PdfValue::Integer(50),
                        PdfValue::Integer(0),
                    ]),
                ),
            ]),
            "0 0 m 10 0 l S",
        );
        let hidden_form = backend.add_stream(
            PdfValue::Dict(vec![
                (b"Subtype".to_vec(), PdfValue::Name(b"Form".to_vec())),
                (b"OC".to_vec(), PdfValue::Reference(layer.id())),
            ]),
            "0 0 m 10 0 l S",
        );
        backend.set_resources(PdfValue::Dict(vec![(
            b"XObject".to_vec(),
            PdfValue::Dict(vec![
                (b"Fm1".to_vec(), PdfValue::Reference(form.id())),
                (b"Fm2".to_vec(), PdfValue::Reference(hidden_form.id())),
            ]),
        )]));

        let result = drawings(&backend);
        assert_eq!(result.len(), 1);
        assert_eq!(
            first_line(&result[0]),
            (Point::new(50.0, 792.0), Point::new(60.0, 792.0))
        );
    }

    #[test]
    fn test_self_referencing_form_terminates() {
        let mut backend = MockBackend::with_page("/Fm1 Do");
        let form = backend.add_stream(
            PdfValue::Dict(vec![(b"Subtype".to_vec(), PdfValue::Name(b"Form".to_vec()))]),
            "0 0 m 1 0 l S /Fm1 Do",
        );
        backend.set_resources(PdfValue::Dict(vec![(
            b"XObject".to_vec(),
            PdfValue::Dict(vec![(b"Fm1".to_vec(), PdfValue::Reference(form.id()))]),
        )]));
        assert_eq!(drawings(&backend).len(), MAX_FORM_DEPTH);
    }

    #[test]
    fn test_multiply_matrices() {
        let scale = [2.0, 0.0, 0.0, 2.0, 0.0, 0.0];
        let translate = [1.0, 0.0, 0.0, 1.0, 10.0, 5.0];
        assert_eq!(multiply(scale, translate), [2.0, 0.0, 0.0, 2.0, 10.0, 5.0]);
        assert_eq!(multiply(translate, scale), [2.0, 0.0, 0.0, 2.0, 20.0, 10.0]);
    }
}

//! Attribute line geometry to layers by toggling OCG visibility.
//!
//! For each layer, only its OCG is switched on and every page's drawings are
//! collected. Unmarked content is drawn regardless of state, so it shows up
//! under every layer.

use pdflayers_core::layers::{Layer, ObjectRef, Precision, VectorPath};

use crate::parser::backend::PdfBackend;
use crate::types::Drawing;
use crate::PdfError;

/// Exclusive access to a backend's OCG states.
///
/// The states of the tracked OCGs are captured on creation and written back
/// when the guard is dropped, whichever way the caller leaves.
pub struct VisibilityGuard<'a, B: PdfBackend + ?Sized> {
    backend: &'a mut B,
    saved: Vec<(ObjectRef, bool)>,
}

impl<'a, B: PdfBackend + ?Sized> VisibilityGuard<'a, B> {
    /// Track `known` OCGs. References the backend does not know as OCGs are
    /// ignored.
    pub fn new(backend: &'a mut B, known: &[ObjectRef]) -> Self {
        let mut saved = Vec::with_capacity(known.len());
        for &reference in known {
            if saved.iter().any(|(r, _)| *r == reference) {
                continue;
            }
            if let Some(on) = backend.ocg_state(reference) {
                saved.push((reference, on));
            }
        }
        VisibilityGuard { backend, saved }
    }

    /// Switch `target` on and every other tracked OCG off.
    pub fn show_only(&mut self, target: ObjectRef) -> Result<(), PdfError> {
        if !self.saved.iter().any(|(r, _)| *r == target) {
            let on = self
                .backend
                .ocg_state(target)
                .ok_or_else(|| PdfError::NotFound(target.to_string()))?;
            self.saved.push((target, on));
        }
        for &(reference, _) in &self.saved {
            self.backend.set_ocg_state(reference, reference == target)?;
        }
        Ok(())
    }

    pub fn backend(&self) -> &B {
        &*self.backend
    }
}

impl<B: PdfBackend + ?Sized> Drop for VisibilityGuard<'_, B> {
    fn drop(&mut self) {
        for &(reference, on) in &self.saved {
            if let Err(e) = self.backend.set_ocg_state(reference, on) {
                log::warn!("Could not restore state of OCG {}: {}", reference, e);
            }
        }
    }
}

/// Fill each layer's `vectors` with the lines drawn while only its OCG is on.
///
/// `known` lists every OCG whose state takes part in the toggle. Layers
/// without a reference the backend recognizes as an OCG are left empty.
pub fn correlate_vectors(
    backend: &mut dyn PdfBackend,
    layers: &mut [Layer],
    known: &[ObjectRef],
    precision: Option<Precision>,
) {
    let pages = backend.pages();
    for layer in layers.iter_mut() {
        let target = match layer.source_reference {
            Some(reference) if backend.ocg_state(reference).is_some() => reference,
            Some(reference) => {
                log::debug!("Layer '{}' references {} which is not an OCG", layer.name, reference);
                continue;
            }
            None => continue,
        };

        let mut guard = VisibilityGuard::new(&mut *backend, known);
        if let Err(e) = guard.show_only(target) {
            log::warn!("Could not isolate layer '{}': {}", layer.name, e);
            continue;
        }
        for (&page_number, &page_id) in &pages {
            match guard.backend().page_drawings(page_id) {
                Ok(drawings) => layer.attach_vectors(page_number, lines(&drawings, precision)),
                Err(e) => log::debug!(
                    "No drawings for layer '{}' on page {}: {}",
                    layer.name,
                    page_number,
                    e
                ),
            }
        }
    }
}

fn lines(drawings: &[Drawing], precision: Option<Precision>) -> Vec<VectorPath> {
    drawings
        .iter()
        .flat_map(|drawing| {
            let style = drawing.stroke_style();
            drawing
                .lines()
                .map(move |(p1, p2)| VectorPath::line(p1, p2, style, precision))
        })
        .collect()
}

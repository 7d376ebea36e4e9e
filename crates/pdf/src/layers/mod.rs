//! Engine stages that need a [`PdfBackend`](crate::parser::backend::PdfBackend).
//!
//! The pure stages (merge, usage, report assembly) live in
//! `pdflayers_core::layers`; [`crate::analyze`] wires both together.

pub mod catalog;
pub mod correlate;
pub mod pages;
pub mod xref;

pub use catalog::{read_catalog_ocgs, CatalogOcgs};
pub use correlate::{correlate_vectors, VisibilityGuard};
pub use pages::scan_pages;
pub use xref::scan_xref_ocgs;

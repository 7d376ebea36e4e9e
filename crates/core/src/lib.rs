//! Core library for pdflayers
//!
//! This crate implements the **Functional Core** of the pdflayers service,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! - **`pdflayers_core`** (this crate): Pure transformation functions with zero I/O
//! - **`pdf`**: The PDF object model provider and the stages that need it
//! - **`pdflayers`**: CLI and HTTP shell
//!
//! ## Functional Core Principles
//!
//! - **Pure functions**: Same input always produces the same output
//! - **No side effects**: No I/O operations, no external state mutations
//! - **Testable**: Can be tested with fixture text, no PDF required
//!
//! Everything that parses PDF-derived text here is best-effort: malformed or
//! truncated input yields `None` or an empty result, never an error.
//!
//! # Example Usage
//!
//! ```rust
//! use pdflayers_core::layers::{aggregate_usage, scan_content, text, PageLayerUsage};
//!
//! let ocg = "<< /Type /OCG /Name (Dimensions) /Intent [/View /Design] >>";
//! assert_eq!(text::extract_name(ocg).as_deref(), Some("Dimensions"));
//!
//! let tokens = scan_content("/OC /oc1 BDC 0 0 m 10 0 l S EMC");
//! assert_eq!(tokens.len(), 1);
//!
//! let pages = vec![PageLayerUsage { page_number: 1, layers: vec!["Dimensions".into()] }];
//! let stats = aggregate_usage(&pages, 3);
//! assert_eq!(stats.pages_without_layers, 2);
//! ```

pub mod layers;

//! # Core Module
//!
//! The foundation layer of DIT: file-format parsers, the value objects they
//! produce, and the shared utilities both need.
//!
//! ## Overview
//!
//! Every analysis in this toolkit composes on top of a handful of textual
//! file formats emitted by the MD engine and its companion tools. This module
//! owns the full lifecycle of those formats:
//!
//! - **Axis-labeled tables** ([`formats::xvg`]) - time series with `@`
//!   directives and whitespace-separated numeric columns
//! - **Pixmap matrices** ([`formats::xpm`]) - categorical or continuous 2-D
//!   grids with a per-character color table, single- or multi-frame
//! - **Named index groups** ([`formats::ndx`]) - ordered groups of 1-based
//!   atom indices
//! - **Coordinate snapshots** ([`formats::gro`], [`formats::pdb`]) -
//!   fixed-column atom records
//!
//! Value objects are immutable by convention: parsers build them once and
//! analytics return fresh data rather than mutating in place. The only
//! sanctioned mutations are the bulk matrix rewrites documented on
//! [`formats::xpm::XpmMatrix`].

pub mod formats;
pub mod utils;

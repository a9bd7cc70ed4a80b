//! Provides input/output functionality for the toolkit's file formats.
//!
//! This module contains the readers and writers for the textual formats the
//! MD engine and its companion tools produce: XVG tables, XPM matrices, NDX
//! index groups, and GRO/PDB coordinate snapshots. It provides a unified
//! trait-based interface for file I/O and leaves every derived computation to
//! the analysis layer.

pub mod gro;
pub mod ndx;
pub mod pdb;
pub mod traits;
pub mod xpm;
pub mod xvg;

//! # DIT Core Library
//!
//! The core of DIT (Dynamics Insight Toolkit), a command-line analysis and
//! visualization toolkit for the textual outputs of a widely used molecular
//! dynamics engine.
//!
//! ## Architectural Philosophy
//!
//! The library is designed with a strict three-layer architecture to ensure a
//! clear separation of concerns, making it modular, testable, and extensible.
//!
//! - **[`core`]: The Foundation.** Contains the file-format readers and
//!   writers (`XvgData`, `XpmMatrix`, `IndexGroups`, `GroData`, `PdbData`) and
//!   the small utilities they share (statistics primitives, color scales,
//!   output-collision handling). Parsers turn whole files into in-memory value
//!   objects and perform no other I/O.
//!
//! - **[`analysis`]: The Logic Core.** Stateless functions that derive data
//!   from the value objects: column statistics and moving averages, XPM
//!   differencing, half-diagonal merging and tabular export, dynamical
//!   cross-correlation matrices, Ramachandran classification, interaction
//!   energy decomposition, and hydrogen-bond occupancy tabulation. Analytics
//!   receive references and never retain them across calls.
//!
//! - **[`render`]: The Boundary.** Adapters that package analytic outputs and
//!   user options into a uniform [`render::request::PlotRequest`] handed to an
//!   externally supplied rendering backend. The library never draws anything
//!   itself.

pub mod analysis;
pub mod core;
pub mod render;

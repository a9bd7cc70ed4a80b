//! Derived-data computations over the parsed file formats.
//!
//! ## Overview
//!
//! - `stats`: column averages and moving averages with confidence bands.
//! - `matrix`: XPM differencing, half-plane merging, cutting, and tabular
//!   export.
//! - `energy`: interaction-energy decomposition of complex/receptor/ligand
//!   energy tables.
//! - `rama`: Ramachandran classification against reference density tables.
//! - `dccm`: dynamical cross-correlation from an ASCII covariance dump.
//! - `hbond`: hydrogen-bond occupancy tabulation and set operations.
//! - `combine`: column-wise combination of several tables into one.
//!
//! Every function takes parsed value objects (or readers for raw numeric
//! dumps) and returns fresh data; inputs are never mutated.

pub mod combine;
pub mod dccm;
pub mod energy;
pub mod error;
pub mod hbond;
pub mod matrix;
pub mod rama;
pub mod stats;

pub use error::AnalysisError;

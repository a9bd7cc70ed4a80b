//! Shared numeric and filesystem helpers used across parsing and analysis.

pub mod colormap;
pub mod outfile;
pub mod stats;

//! Boundary layer that packages analytic outputs into rendering requests.
//!
//! Nothing in this module draws. [`request::PlotRequest`] is the complete,
//! serializable description of one plot; [`builders`] assemble requests from
//! the value objects of the other layers; [`backend::RenderBackend`] is the
//! seam an actual plotting engine plugs into. The only backend shipped here
//! is [`backend::DumpBackend`], which writes the request itself to TOML.

pub mod backend;
pub mod builders;
pub mod request;
pub mod text;

pub use backend::{DumpBackend, OutputDirective, RenderBackend, RenderError};
pub use request::{PlotMode, PlotRequest, PlotRequestBuilder, RequestError};

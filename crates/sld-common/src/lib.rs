//! Common types shared by the SLD styling crates.
//!
//! The request model here mirrors the raster style-edit form state sent by the
//! map client: a display mode, an opacity, the per-band settings and the target
//! layer.

pub mod error;
pub mod style;

pub use error::{SldError, SldResult};
pub use style::{
    BandConfig, BandState, ColorMapEntry, Contrast, LayerRef, OptionValue, PseudoColor,
    StyleRequest, StyleType,
};

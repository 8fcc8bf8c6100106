//! Freehand signature capture - strokes, software pen, resize-safe surface
//!
//! This crate provides the signature area used by the checklist form:
//! - [`types::Point`] / [`types::PointGroup`] - Captured input and strokes
//! - [`curve`] - Bézier segments between input points
//! - [`brush`] - Velocity-sensitive pen width and dab generation
//! - [`surface`] - CPU RGBA surface
//! - [`canvas`] - Density-aware backing store with dirty tracking
//! - [`pad`] - Stroke capture capability and its software implementation
//! - [`data_url`] - PNG/JPEG export as `data:` URLs
//! - [`debounce`] - Trailing-edge debouncing for resize bursts
//! - [`signature_surface`] - Element-bound surface with resize replay

pub mod brush;
pub mod canvas;
pub mod constants;
pub mod curve;
pub mod data_url;
pub mod debounce;
pub mod element;
pub mod error;
pub mod pad;
pub mod signature_surface;
pub mod surface;
pub mod types;

pub use brush::*;
pub use canvas::*;
pub use constants::*;
pub use curve::*;
pub use data_url::*;
pub use debounce::*;
pub use element::*;
pub use error::*;
pub use pad::*;
pub use signature_surface::*;
pub use surface::*;
pub use types::*;

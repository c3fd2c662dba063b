//! Math Layout - bounding-box layout of math trees
//!
//! This crate turns a [`math_tree::MathTree`] into backend output and a tree
//! of positioned boxes:
//! - Wrappers that resolve each node's styles, font variant and scale
//! - A registry mapping node kinds to wrapper classes
//! - TeX placement of scripts, limits and multiscripts
//! - Pluggable font metrics and output backends
//! - Serde-loadable layout options

pub mod bbox;
mod config;
pub mod emitter;
mod engine;
mod error;
mod factory;
pub mod fonts;
pub mod lengths;
mod pass;
mod styles;
mod wrapper;
mod wrappers;

pub use bbox::{BBox, Point};
pub use config::*;
pub use emitter::{Emitter, MarkupElement, MarkupEmitter, MarkupHandle};
pub use engine::*;
pub use error::*;
pub use factory::*;
pub use fonts::{FontMetrics, FontParams, Glyph, TexFont};
pub use styles::*;
pub use wrapper::*;

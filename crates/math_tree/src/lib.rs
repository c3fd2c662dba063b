//! Math Tree - the compiled math expression tree
//!
//! This crate provides the node model shared by the layout and accessibility
//! passes:
//! - An arena of nodes addressed by stable `NodeId`s
//! - MathML node kinds and per-kind attribute defaults
//! - Attribute inheritance (`displaystyle`, `scriptlevel`, `mstyle`)
//! - A per-pass property side table that is never serialized

mod attributes;
mod error;
mod inherit;
mod kind;
mod node;
mod node_id;
pub mod properties;
mod tree;

pub use attributes::*;
pub use error::*;
pub use kind::*;
pub use node::*;
pub use node_id::*;
pub use properties::{PropertyTable, PropertyValue};
pub use tree::*;

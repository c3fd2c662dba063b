//! Math A11y - complexity scoring and collapsing of math trees
//!
//! This crate prepares math trees for progressive disclosure:
//! - Bottom-up complexity scores cached on every node
//! - Per-type cutoffs that collapse dense subexpressions behind short markers
//! - Absorption of collapsed children so markers do not nest
//! - Toggles (`maction`) that show the marker until expanded
//! - Serde-loadable cutoff, marker and weight tables

mod collapse;
mod config;
mod error;
mod visitor;

pub use collapse::*;
pub use config::*;
pub use error::*;
pub use visitor::{ComplexityVisitor, COMPLEXITY};

use math_tree::MathTree;

/// Score and collapse a tree with the default tables.
/// Returns the root's reported complexity.
pub fn collapse(tree: &mut MathTree) -> Result<f64> {
    ComplexityVisitor::default().visit_tree(tree)
}

/// Score and collapse a tree with the given configuration
pub fn collapse_with(tree: &mut MathTree, config: &CollapseConfig) -> Result<f64> {
    ComplexityVisitor::new(config).visit_tree(tree)
}

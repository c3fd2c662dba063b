//! Emission of the specialized wrapper classes

pub(crate) mod action;
pub(crate) mod mmultiscripts;
pub(crate) mod msubsup;
pub(crate) mod munderover;
pub(crate) mod space;
pub(crate) mod tablecell;
pub(crate) mod text;
pub(crate) mod token;

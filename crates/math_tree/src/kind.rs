//! Node kinds of the compiled math tree

use crate::{Result, TreeError};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The kind tag of a tree node.
///
/// Kinds follow MathML element names; `Text` is the leaf holding character
/// data inside token elements and `InferredMrow` is the implicit row that
/// elements such as `math`, `msqrt` or `mstyle` wrap around their content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Math,
    Mrow,
    #[serde(rename = "inferredMrow")]
    InferredMrow,
    Mi,
    Mo,
    Mn,
    Mtext,
    Ms,
    Mspace,
    Mglyph,
    Mfrac,
    Msqrt,
    Mroot,
    Mstyle,
    Merror,
    Mpadded,
    Mphantom,
    Mfenced,
    Menclose,
    Msub,
    Msup,
    Msubsup,
    Munder,
    Mover,
    Munderover,
    Mmultiscripts,
    Mprescripts,
    None,
    Mtable,
    Mtr,
    Mtd,
    Maction,
    Semantics,
    Annotation,
    #[serde(rename = "annotation-xml")]
    AnnotationXml,
    #[serde(rename = "TeXAtom")]
    TeXAtom,
    Text,
}

impl NodeKind {
    /// All kinds, in declaration order
    pub const ALL: [NodeKind; 37] = [
        NodeKind::Math,
        NodeKind::Mrow,
        NodeKind::InferredMrow,
        NodeKind::Mi,
        NodeKind::Mo,
        NodeKind::Mn,
        NodeKind::Mtext,
        NodeKind::Ms,
        NodeKind::Mspace,
        NodeKind::Mglyph,
        NodeKind::Mfrac,
        NodeKind::Msqrt,
        NodeKind::Mroot,
        NodeKind::Mstyle,
        NodeKind::Merror,
        NodeKind::Mpadded,
        NodeKind::Mphantom,
        NodeKind::Mfenced,
        NodeKind::Menclose,
        NodeKind::Msub,
        NodeKind::Msup,
        NodeKind::Msubsup,
        NodeKind::Munder,
        NodeKind::Mover,
        NodeKind::Munderover,
        NodeKind::Mmultiscripts,
        NodeKind::Mprescripts,
        NodeKind::None,
        NodeKind::Mtable,
        NodeKind::Mtr,
        NodeKind::Mtd,
        NodeKind::Maction,
        NodeKind::Semantics,
        NodeKind::Annotation,
        NodeKind::AnnotationXml,
        NodeKind::TeXAtom,
        NodeKind::Text,
    ];

    /// The element name of this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Math => "math",
            NodeKind::Mrow => "mrow",
            NodeKind::InferredMrow => "inferredMrow",
            NodeKind::Mi => "mi",
            NodeKind::Mo => "mo",
            NodeKind::Mn => "mn",
            NodeKind::Mtext => "mtext",
            NodeKind::Ms => "ms",
            NodeKind::Mspace => "mspace",
            NodeKind::Mglyph => "mglyph",
            NodeKind::Mfrac => "mfrac",
            NodeKind::Msqrt => "msqrt",
            NodeKind::Mroot => "mroot",
            NodeKind::Mstyle => "mstyle",
            NodeKind::Merror => "merror",
            NodeKind::Mpadded => "mpadded",
            NodeKind::Mphantom => "mphantom",
            NodeKind::Mfenced => "mfenced",
            NodeKind::Menclose => "menclose",
            NodeKind::Msub => "msub",
            NodeKind::Msup => "msup",
            NodeKind::Msubsup => "msubsup",
            NodeKind::Munder => "munder",
            NodeKind::Mover => "mover",
            NodeKind::Munderover => "munderover",
            NodeKind::Mmultiscripts => "mmultiscripts",
            NodeKind::Mprescripts => "mprescripts",
            NodeKind::None => "none",
            NodeKind::Mtable => "mtable",
            NodeKind::Mtr => "mtr",
            NodeKind::Mtd => "mtd",
            NodeKind::Maction => "maction",
            NodeKind::Semantics => "semantics",
            NodeKind::Annotation => "annotation",
            NodeKind::AnnotationXml => "annotation-xml",
            NodeKind::TeXAtom => "TeXAtom",
            NodeKind::Text => "text",
        }
    }

    /// Token elements hold character data directly
    pub fn is_token(&self) -> bool {
        matches!(
            self,
            NodeKind::Mi
                | NodeKind::Mo
                | NodeKind::Mn
                | NodeKind::Mtext
                | NodeKind::Ms
                | NodeKind::Mspace
                | NodeKind::Mglyph
        )
    }

    /// Elements whose content is held in an inferred row
    pub fn has_inferred_row(&self) -> bool {
        matches!(
            self,
            NodeKind::Math
                | NodeKind::Msqrt
                | NodeKind::Mstyle
                | NodeKind::Merror
                | NodeKind::Mpadded
                | NodeKind::Mphantom
                | NodeKind::Menclose
                | NodeKind::Mtd
        )
    }

    /// Elements that take the first child as a base and the rest as scripts
    pub fn is_scriptbase(&self) -> bool {
        matches!(
            self,
            NodeKind::Msub
                | NodeKind::Msup
                | NodeKind::Msubsup
                | NodeKind::Munder
                | NodeKind::Mover
                | NodeKind::Munderover
                | NodeKind::Mmultiscripts
        )
    }

    /// Space-like elements are ignored when finding the core of a row
    pub fn is_space_like(&self) -> bool {
        matches!(self, NodeKind::Mspace | NodeKind::Mtext)
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = TreeError;

    fn from_str(s: &str) -> Result<Self> {
        NodeKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| TreeError::UnknownKind(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names_roundtrip() {
        for kind in NodeKind::ALL {
            assert_eq!(kind.as_str().parse::<NodeKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_unknown_kind() {
        assert!(matches!(
            "mblink".parse::<NodeKind>(),
            Err(TreeError::UnknownKind(_))
        ));
    }

    #[test]
    fn test_serde_names_match_element_names() {
        let json = serde_json::to_string(&NodeKind::AnnotationXml).unwrap();
        assert_eq!(json, "\"annotation-xml\"");
        let kind: NodeKind = serde_json::from_str("\"munderover\"").unwrap();
        assert_eq!(kind, NodeKind::Munderover);
    }

    #[test]
    fn test_token_classification() {
        assert!(NodeKind::Mi.is_token());
        assert!(!NodeKind::Mrow.is_token());
        assert!(!NodeKind::Text.is_token());
        assert!(NodeKind::Munder.is_scriptbase());
    }
}

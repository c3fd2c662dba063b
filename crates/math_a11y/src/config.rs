//! Collapse configuration
//!
//! Cutoffs and markers are keyed by semantic type, optionally sub-keyed by
//! semantic role with a "value" entry as the fallback for other roles. The
//! weights drive the complexity score. Everything is serde-loadable and
//! falls back to the built-in tables.

use crate::{CollapseError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Key of the fallback entry in role tables
pub const FALLBACK_KEY: &str = "value";

/// Cutoff meaning "never collapse"
pub const NEVER_COLLAPSE: f64 = 10_000_000.0;

/// A table entry: one value for the whole type, or one per role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeRole<T> {
    Value(T),
    ByRole(BTreeMap<String, T>),
}

impl<T> TypeRole<T> {
    /// The entry for a role, falling back to the "value" entry
    pub fn get(&self, role: Option<&str>) -> Option<&T> {
        match self {
            TypeRole::Value(value) => Some(value),
            TypeRole::ByRole(roles) => role
                .and_then(|role| roles.get(role))
                .or_else(|| roles.get(FALLBACK_KEY)),
        }
    }
}

fn by_role<T, V: Into<T> + Copy>(entries: &[(&str, V)]) -> TypeRole<T> {
    TypeRole::ByRole(
        entries
            .iter()
            .map(|(role, value)| (role.to_string(), (*value).into()))
            .collect(),
    )
}

/// Cutoff and marker tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollapseTables {
    pub cutoffs: BTreeMap<String, TypeRole<f64>>,
    pub markers: BTreeMap<String, TypeRole<String>>,
}

impl Default for CollapseTables {
    fn default() -> Self {
        let mut cutoffs: BTreeMap<String, TypeRole<f64>> = [
            ("identifier", 3.0),
            ("number", 3.0),
            ("text", 10.0),
            ("infixop", 15.0),
            ("relseq", 15.0),
            ("multirel", 15.0),
            ("fenced", 18.0),
            ("bigop", 20.0),
            ("integral", 20.0),
            ("fraction", 12.0),
            ("sqrt", 9.0),
            ("root", 12.0),
            ("vector", 15.0),
            ("matrix", 15.0),
            ("cases", 15.0),
            ("superscript", 9.0),
            ("subscript", 9.0),
            ("subsup", 9.0),
        ]
        .into_iter()
        .map(|(name, cutoff)| (name.to_string(), TypeRole::Value(cutoff)))
        .collect();
        cutoffs.insert(
            "punctuated".to_string(),
            by_role(&[
                ("endpunct", NEVER_COLLAPSE),
                ("startpunct", NEVER_COLLAPSE),
                (FALLBACK_KEY, 12.0),
            ]),
        );

        let text = |s: &str| TypeRole::Value(s.to_string());
        let roles = by_role::<String, &str>;
        let markers = [
            ("identifier", text("x")),
            ("number", text("#")),
            ("text", text("\u{2026}")),
            ("appl", roles(&[("limit function", "lim"), (FALLBACK_KEY, "f()")])),
            ("fraction", text("/")),
            ("sqrt", text("\u{221A}")),
            ("root", text("\u{221A}")),
            ("superscript", text("\u{25FD}\u{02D9}")),
            ("subscript", text("\u{25FD}.")),
            ("subsup", text("\u{25FD}:")),
            (
                "vector",
                roles(&[
                    ("binomial", "(:)"),
                    ("determinant", "|:|"),
                    (FALLBACK_KEY, "\u{27E8}:\u{27E9}"),
                ]),
            ),
            (
                "matrix",
                roles(&[
                    ("squarematrix", "[::]"),
                    ("rowvector", "\u{27E8}\u{22EF}\u{27E9}"),
                    ("columnvector", "\u{27E8}\u{22EE}\u{27E9}"),
                    ("determinant", "|::|"),
                    (FALLBACK_KEY, "(::)"),
                ]),
            ),
            ("cases", text("{:")),
            (
                "infixop",
                roles(&[
                    ("addition", "+"),
                    ("subtraction", "\u{2212}"),
                    ("multiplication", "\u{22C5}"),
                    ("implicit", "\u{22C5}"),
                    (FALLBACK_KEY, "+"),
                ]),
            ),
            ("punctuated", roles(&[("text", "\u{2026}"), (FALLBACK_KEY, ",")])),
        ]
        .into_iter()
        .map(|(name, marker)| (name.to_string(), marker))
        .collect();

        Self { cutoffs, markers }
    }
}

impl CollapseTables {
    /// Cutoff for a semantic type and role (None: the type never collapses by default)
    pub fn cutoff(&self, semantic_type: &str, role: Option<&str>) -> Option<f64> {
        self.cutoffs
            .get(semantic_type)
            .and_then(|entry| entry.get(role))
            .copied()
    }

    /// Whether the type has a cutoff entry at all
    pub fn has_cutoff(&self, semantic_type: &str) -> bool {
        self.cutoffs.contains_key(semantic_type)
    }

    /// Marker text for a semantic type and role
    pub fn marker(&self, semantic_type: &str, role: Option<&str>) -> Result<&str> {
        self.markers
            .get(semantic_type)
            .and_then(|entry| entry.get(role))
            .map(String::as_str)
            .ok_or_else(|| CollapseError::MissingMarker(semantic_type.to_string()))
    }
}

/// Weights of the complexity score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplexityWeights {
    /// Per character of token text (also per character of a collapse marker)
    pub text: f64,
    pub token: f64,
    /// Per child of a container with more than one child
    pub child: f64,
    /// Factor applied to scripts and fraction parts
    pub script: f64,
    pub sqrt: f64,
    pub subsup: f64,
    pub underover: f64,
    pub fraction: f64,
    pub enclose: f64,
    pub action: f64,
    pub phantom: f64,
    pub xml: f64,
    pub glyph: f64,
}

impl Default for ComplexityWeights {
    fn default() -> Self {
        Self {
            text: 0.5,
            token: 0.5,
            child: 1.0,
            script: 0.8,
            sqrt: 2.0,
            subsup: 2.0,
            underover: 2.0,
            fraction: 2.0,
            enclose: 2.0,
            action: 2.0,
            phantom: 0.0,
            xml: 2.0,
            glyph: 2.0,
        }
    }
}

/// Which parts of the collapse pass run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplexityOptions {
    /// Check each node against its cutoff while scoring
    pub identify_collapsible: bool,
    /// Turn the surviving markers into toggles after scoring
    pub make_collapsible: bool,
}

impl Default for ComplexityOptions {
    fn default() -> Self {
        Self {
            identify_collapsible: true,
            make_collapsible: true,
        }
    }
}

/// Complete configuration of the collapse pass
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CollapseConfig {
    pub options: ComplexityOptions,
    pub weights: ComplexityWeights,
    pub tables: CollapseTables,
}

impl CollapseConfig {
    /// Parse a configuration from JSON, using defaults if the text is malformed
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str::<CollapseConfig>(json) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to parse collapse config, using defaults: {}", e);
                CollapseConfig::default()
            }
        }
    }

    /// Load a configuration from a file, or return defaults if it doesn't exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(CollapseConfig::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&content))
    }

    /// Save the configuration as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

//! Attribute values, per-node attribute sets, and per-kind defaults
//!
//! Attribute lookup follows MathML precedence: a value set explicitly on the
//! node wins over one inherited from an ancestor, which wins over the default
//! for the node's kind.

use crate::NodeKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Prefix shared by all semantic annotation attributes
pub const SEMANTIC_PREFIX: &str = "data-semantic-";

/// A single attribute value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Number(f64),
    String(String),
}

impl AttributeValue {
    /// Interpret the value as a string (numbers and booleans are formatted)
    pub fn as_string(&self) -> String {
        match self {
            AttributeValue::String(s) => s.clone(),
            AttributeValue::Number(n) => format_number(*n),
            AttributeValue::Bool(b) => b.to_string(),
        }
    }

    /// Interpret the value as a number, parsing strings when needed
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Number(n) => Some(*n),
            AttributeValue::String(s) => s.trim().parse().ok(),
            AttributeValue::Bool(_) => None,
        }
    }

    /// Interpret the value as a boolean ("true"/"false" strings included)
    pub fn as_bool(&self) -> bool {
        match self {
            AttributeValue::Bool(b) => *b,
            AttributeValue::String(s) => s == "true",
            AttributeValue::Number(n) => *n != 0.0,
        }
    }

    /// Empty strings count as "not set" in most lookups
    pub fn is_empty(&self) -> bool {
        matches!(self, AttributeValue::String(s) if s.is_empty())
    }
}

impl std::fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.as_string())
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::String(s.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        AttributeValue::String(s)
    }
}

impl From<f64> for AttributeValue {
    fn from(n: f64) -> Self {
        AttributeValue::Number(n)
    }
}

impl From<bool> for AttributeValue {
    fn from(b: bool) -> Self {
        AttributeValue::Bool(b)
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// The explicit and inherited attributes of one node.
///
/// Defaults are not stored here; they come from the node's kind (see
/// [`default_value`]).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeSet {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    explicit: BTreeMap<String, AttributeValue>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    inherited: BTreeMap<String, AttributeValue>,
}

impl AttributeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from explicit name/value pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<AttributeValue>,
    {
        let mut set = Self::new();
        for (name, value) in pairs {
            set.set(name, value);
        }
        set
    }

    /// Set an explicit attribute
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<AttributeValue>) {
        self.explicit.insert(name.into(), value.into());
    }

    /// Remove an explicit attribute, returning its value
    pub fn unset(&mut self, name: &str) -> Option<AttributeValue> {
        self.explicit.remove(name)
    }

    /// The value set explicitly on this node, if any
    pub fn get_explicit(&self, name: &str) -> Option<&AttributeValue> {
        self.explicit.get(name).filter(|value| !value.is_empty())
    }

    /// The value inherited from an ancestor, if any
    pub fn get_inherited(&self, name: &str) -> Option<&AttributeValue> {
        self.inherited.get(name)
    }

    /// Explicit value, falling back to the inherited one
    pub fn get_local(&self, name: &str) -> Option<&AttributeValue> {
        self.get_explicit(name).or_else(|| self.get_inherited(name))
    }

    pub fn has_explicit(&self, name: &str) -> bool {
        self.get_explicit(name).is_some()
    }

    /// Record an inherited value
    pub fn set_inherited(&mut self, name: impl Into<String>, value: impl Into<AttributeValue>) {
        self.inherited.insert(name.into(), value.into());
    }

    pub fn clear_inherited(&mut self) {
        self.inherited.clear();
    }

    /// Names of all explicitly set attributes, in sorted order
    pub fn explicit_names(&self) -> impl Iterator<Item = &str> {
        self.explicit.keys().map(String::as_str)
    }

    /// All explicit attributes
    pub fn explicit(&self) -> &BTreeMap<String, AttributeValue> {
        &self.explicit
    }

    /// All inherited attributes
    pub fn inherited(&self) -> &BTreeMap<String, AttributeValue> {
        &self.inherited
    }

    /// Take over the inherited attributes of another set
    pub fn inherit_from(&mut self, other: &AttributeSet) {
        self.inherited = other.inherited.clone();
    }

    /// Move every explicit attribute whose name starts with `prefix` out of this set
    pub fn drain_prefixed(&mut self, prefix: &str) -> Vec<(String, AttributeValue)> {
        let names: Vec<String> = self
            .explicit
            .keys()
            .filter(|name| name.starts_with(prefix))
            .cloned()
            .collect();
        names
            .into_iter()
            .filter_map(|name| self.explicit.remove(&name).map(|value| (name, value)))
            .collect()
    }
}

// =============================================================================
// Defaults
// =============================================================================

#[derive(Debug, Clone, Copy)]
enum DefaultValue {
    Str(&'static str),
    Num(f64),
    Bool(bool),
    /// Known attribute without a value of its own (resolved by inheritance)
    Inherit,
}

impl DefaultValue {
    fn value(self) -> Option<AttributeValue> {
        match self {
            DefaultValue::Str(s) => Some(AttributeValue::String(s.to_string())),
            DefaultValue::Num(n) => Some(AttributeValue::Number(n)),
            DefaultValue::Bool(b) => Some(AttributeValue::Bool(b)),
            DefaultValue::Inherit => None,
        }
    }
}

/// Attributes every element knows about
const GLOBAL: &[(&str, DefaultValue)] = &[
    ("mathbackground", DefaultValue::Inherit),
    ("mathcolor", DefaultValue::Inherit),
    ("mathsize", DefaultValue::Str("normal")),
    ("mathvariant", DefaultValue::Str("normal")),
    ("dir", DefaultValue::Str("ltr")),
    ("displaystyle", DefaultValue::Bool(false)),
    ("scriptlevel", DefaultValue::Num(0.0)),
    ("scriptsizemultiplier", DefaultValue::Num(std::f64::consts::FRAC_1_SQRT_2)),
    ("scriptminsize", DefaultValue::Str(".4em")),
];

const MO: &[(&str, DefaultValue)] = &[
    ("form", DefaultValue::Str("infix")),
    ("fence", DefaultValue::Bool(false)),
    ("separator", DefaultValue::Bool(false)),
    ("lspace", DefaultValue::Str("thickmathspace")),
    ("rspace", DefaultValue::Str("thickmathspace")),
    ("stretchy", DefaultValue::Bool(false)),
    ("symmetric", DefaultValue::Bool(false)),
    ("maxsize", DefaultValue::Str("infinity")),
    ("minsize", DefaultValue::Str("1em")),
    ("largeop", DefaultValue::Bool(false)),
    ("movablelimits", DefaultValue::Bool(false)),
    ("accent", DefaultValue::Bool(false)),
];

const MS: &[(&str, DefaultValue)] = &[("lquote", DefaultValue::Str("\"")), ("rquote", DefaultValue::Str("\""))];

const MSPACE: &[(&str, DefaultValue)] = &[
    ("width", DefaultValue::Str("0em")),
    ("height", DefaultValue::Str("0ex")),
    ("depth", DefaultValue::Str("0ex")),
    ("linebreak", DefaultValue::Str("auto")),
];

const MFRAC: &[(&str, DefaultValue)] = &[
    ("linethickness", DefaultValue::Str("medium")),
    ("numalign", DefaultValue::Str("center")),
    ("denomalign", DefaultValue::Str("center")),
    ("bevelled", DefaultValue::Bool(false)),
];

const MSUB: &[(&str, DefaultValue)] = &[("subscriptshift", DefaultValue::Str(""))];
const MSUP: &[(&str, DefaultValue)] = &[("superscriptshift", DefaultValue::Str(""))];
const MSUBSUP: &[(&str, DefaultValue)] = &[
    ("subscriptshift", DefaultValue::Str("")),
    ("superscriptshift", DefaultValue::Str("")),
];

const MUNDER: &[(&str, DefaultValue)] = &[
    ("accentunder", DefaultValue::Bool(false)),
    ("align", DefaultValue::Str("center")),
];
const MOVER: &[(&str, DefaultValue)] = &[("accent", DefaultValue::Bool(false)), ("align", DefaultValue::Str("center"))];
const MUNDEROVER: &[(&str, DefaultValue)] = &[
    ("accent", DefaultValue::Bool(false)),
    ("accentunder", DefaultValue::Bool(false)),
    ("align", DefaultValue::Str("center")),
];

const MENCLOSE: &[(&str, DefaultValue)] = &[("notation", DefaultValue::Str("longdiv"))];
const MFENCED: &[(&str, DefaultValue)] = &[
    ("open", DefaultValue::Str("(")),
    ("close", DefaultValue::Str(")")),
    ("separators", DefaultValue::Str(",")),
];
const MACTION: &[(&str, DefaultValue)] = &[
    ("actiontype", DefaultValue::Str("toggle")),
    ("selection", DefaultValue::Num(1.0)),
];
const MATH: &[(&str, DefaultValue)] = &[
    ("display", DefaultValue::Str("inline")),
    ("overflow", DefaultValue::Str("linebreak")),
];
const MTD: &[(&str, DefaultValue)] = &[
    ("rowspan", DefaultValue::Num(1.0)),
    ("columnspan", DefaultValue::Num(1.0)),
];
const MPADDED: &[(&str, DefaultValue)] = &[
    ("width", DefaultValue::Str("")),
    ("height", DefaultValue::Str("")),
    ("depth", DefaultValue::Str("")),
    ("lspace", DefaultValue::Num(0.0)),
    ("voffset", DefaultValue::Num(0.0)),
];

fn kind_defaults(kind: NodeKind) -> &'static [(&'static str, DefaultValue)] {
    match kind {
        NodeKind::Mo => MO,
        NodeKind::Ms => MS,
        NodeKind::Mspace => MSPACE,
        NodeKind::Mfrac => MFRAC,
        NodeKind::Msub => MSUB,
        NodeKind::Msup => MSUP,
        NodeKind::Msubsup | NodeKind::Mmultiscripts => MSUBSUP,
        NodeKind::Munder => MUNDER,
        NodeKind::Mover => MOVER,
        NodeKind::Munderover => MUNDEROVER,
        NodeKind::Menclose => MENCLOSE,
        NodeKind::Mfenced => MFENCED,
        NodeKind::Maction => MACTION,
        NodeKind::Math => MATH,
        NodeKind::Mtd => MTD,
        NodeKind::Mpadded => MPADDED,
        _ => &[],
    }
}

fn lookup(kind: NodeKind, name: &str) -> Option<DefaultValue> {
    if kind == NodeKind::Text {
        return None;
    }
    kind_defaults(kind)
        .iter()
        .chain(GLOBAL.iter())
        .find(|(key, _)| *key == name)
        .map(|(_, default)| *default)
}

/// The default value of an attribute for the given kind
pub fn default_value(kind: NodeKind, name: &str) -> Option<AttributeValue> {
    lookup(kind, name).and_then(DefaultValue::value)
}

/// Whether the attribute is a known (defaulted) attribute of the given kind
pub fn has_default(kind: NodeKind, name: &str) -> bool {
    lookup(kind, name).is_some()
}

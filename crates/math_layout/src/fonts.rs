//! Font metrics
//!
//! Layout only needs a few numbers per character and the TeX spacing
//! parameters. Backends that draw real glyphs supply their own
//! [`FontMetrics`]; [`TexFont`] carries TeX-like defaults.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Metrics of one glyph, in ems
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Glyph {
    /// Height above the baseline
    pub h: f64,
    /// Depth below the baseline
    pub d: f64,
    /// Advance width
    pub w: f64,
    /// Italic correction
    #[serde(default)]
    pub ic: f64,
    /// Opaque glyph reference for backends (0 = not in the font)
    #[serde(default)]
    pub id: u32,
}

impl Glyph {
    pub const fn new(h: f64, d: f64, w: f64) -> Self {
        Self { h, d, w, ic: 0.0, id: 0 }
    }

    pub const fn with_ic(self, ic: f64) -> Self {
        Self { ic, ..self }
    }
}

/// TeX spacing parameters, in ems
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontParams {
    pub x_height: f64,
    pub quad: f64,
    pub num1: f64,
    pub num2: f64,
    pub num3: f64,
    pub denom1: f64,
    pub denom2: f64,
    pub sup1: f64,
    pub sup2: f64,
    pub sup3: f64,
    pub sub1: f64,
    pub sub2: f64,
    pub sup_drop: f64,
    pub sub_drop: f64,
    pub delim1: f64,
    pub delim2: f64,
    pub axis_height: f64,
    pub rule_thickness: f64,
    pub big_op_spacing1: f64,
    pub big_op_spacing2: f64,
    pub big_op_spacing3: f64,
    pub big_op_spacing4: f64,
    pub big_op_spacing5: f64,
    pub surd_height: f64,
    pub scriptspace: f64,
    pub nulldelimiterspace: f64,
    pub delimiterfactor: f64,
    pub delimitershortfall: f64,
    pub min_rule_thickness: f64,
    pub separation_factor: f64,
    pub extra_ic: f64,
}

impl Default for FontParams {
    fn default() -> Self {
        Self {
            x_height: 0.442,
            quad: 1.0,
            num1: 0.676,
            num2: 0.394,
            num3: 0.444,
            denom1: 0.686,
            denom2: 0.345,
            sup1: 0.413,
            sup2: 0.363,
            sup3: 0.289,
            sub1: 0.15,
            sub2: 0.247,
            sup_drop: 0.386,
            sub_drop: 0.05,
            delim1: 2.39,
            delim2: 1.0,
            axis_height: 0.25,
            rule_thickness: 0.06,
            big_op_spacing1: 0.111,
            big_op_spacing2: 0.167,
            big_op_spacing3: 0.2,
            big_op_spacing4: 0.6,
            big_op_spacing5: 0.1,
            surd_height: 0.075,
            scriptspace: 0.05,
            nulldelimiterspace: 0.12,
            delimiterfactor: 901.0,
            delimitershortfall: 0.3,
            min_rule_thickness: 1.25,
            separation_factor: 1.75,
            extra_ic: 0.033,
        }
    }
}

/// Source of glyph metrics and spacing parameters.
///
/// Implementations must return the same answer for the same question for the
/// duration of a layout pass, and are shared between threads.
pub trait FontMetrics: Send + Sync + std::fmt::Debug {
    /// TeX spacing parameters
    fn params(&self) -> &FontParams;

    /// Metrics of a character in a variant, if the font has it
    fn glyph(&self, variant: &str, c: char) -> Option<Glyph>;

    /// Whether the font knows the variant
    fn has_variant(&self, variant: &str) -> bool;

    /// Metrics used for characters the font does not have
    fn unknown_glyph(&self, _c: char) -> Glyph {
        Glyph::new(0.75, 0.25, 0.5)
    }

    /// Metrics of a character, falling back to [`FontMetrics::unknown_glyph`]
    fn measure(&self, variant: &str, c: char) -> Glyph {
        self.glyph(variant, c)
            .unwrap_or_else(|| self.unknown_glyph(c))
    }
}

/// Variants and the variant each one falls back to for missing characters
const VARIANT_CHAIN: &[(&str, Option<&str>)] = &[
    ("normal", None),
    ("italic", Some("normal")),
    ("bold", Some("normal")),
    ("bold-italic", Some("italic")),
    ("double-struck", Some("bold")),
    ("fraktur", Some("normal")),
    ("bold-fraktur", Some("bold")),
    ("script", Some("italic")),
    ("bold-script", Some("bold-italic")),
    ("sans-serif", Some("normal")),
    ("bold-sans-serif", Some("bold")),
    ("sans-serif-italic", Some("italic")),
    ("sans-serif-bold-italic", Some("bold-italic")),
    ("monospace", Some("normal")),
    ("-smallop", Some("normal")),
    ("-largeop", Some("normal")),
    ("-size3", Some("normal")),
    ("-size4", Some("normal")),
    ("-tex-variant", Some("normal")),
    ("-tex-calligraphic", Some("italic")),
    ("-tex-oldstyle", Some("normal")),
    ("-explicitFont", Some("normal")),
];

/// A TeX-like font with a compact character table
#[derive(Debug, Clone)]
pub struct TexFont {
    params: FontParams,
    chars: HashMap<&'static str, HashMap<char, Glyph>>,
}

impl Default for TexFont {
    fn default() -> Self {
        Self::new()
    }
}

impl TexFont {
    pub fn new() -> Self {
        Self::with_params(FontParams::default())
    }

    /// TeX character table with custom spacing parameters
    pub fn with_params(params: FontParams) -> Self {
        let mut chars: HashMap<&'static str, HashMap<char, Glyph>> = HashMap::new();
        let mut next_id = 1u32;
        let mut add = |variant: &'static str, c: char, glyph: Glyph| {
            chars
                .entry(variant)
                .or_default()
                .insert(c, Glyph { id: next_id, ..glyph });
            next_id += 1;
        };

        for c in 'a'..='z' {
            let (h, d) = letter_extent(c);
            add("normal", c, Glyph::new(h, d, 0.5));
            add("bold", c, Glyph::new(h, d, 0.575));
            let italic = match c {
                'a' => Glyph::new(0.442, 0.011, 0.529),
                'b' => Glyph::new(0.694, 0.011, 0.429),
                'f' => Glyph::new(0.705, 0.205, 0.49).with_ic(0.06),
                'i' => Glyph::new(0.661, 0.011, 0.345),
                'n' => Glyph::new(0.442, 0.011, 0.6),
                'x' => Glyph::new(0.442, 0.011, 0.572),
                'y' => Glyph::new(0.442, 0.205, 0.49).with_ic(0.006),
                _ => Glyph::new(h, d, 0.5).with_ic(if d > 0.1 { 0.014 } else { 0.0 }),
            };
            add("italic", c, italic);
        }
        for c in '0'..='9' {
            add("normal", c, Glyph::new(0.666, 0.022, 0.5));
            add("bold", c, Glyph::new(0.654, 0.01, 0.575));
        }
        add("normal", ' ', Glyph::new(0.0, 0.0, 0.25));
        add("normal", '+', Glyph::new(0.583, 0.082, 0.778));
        add("normal", '\u{2212}', Glyph::new(0.583, 0.082, 0.778));
        add("normal", '=', Glyph::new(0.367, -0.133, 0.778));
        add("normal", '(', Glyph::new(0.75, 0.25, 0.389));
        add("normal", ')', Glyph::new(0.75, 0.25, 0.389));
        add("normal", ',', Glyph::new(0.121, 0.194, 0.278));
        add("normal", '\u{2015}', Glyph::new(0.27, -0.23, 0.5));
        add("normal", '^', Glyph::new(0.694, -0.531, 0.5));
        add("normal", '\u{2211}', Glyph::new(0.75, 0.25, 1.056));
        add("normal", '\u{222B}', Glyph::new(0.805, 0.306, 0.472).with_ic(0.138));
        add("-smallop", '\u{2211}', Glyph::new(0.75, 0.25, 1.056));
        add("-smallop", '\u{222B}', Glyph::new(0.805, 0.306, 0.472).with_ic(0.138));
        add("-largeop", '\u{2211}', Glyph::new(0.95, 0.45, 1.444));
        add("-largeop", '\u{222B}', Glyph::new(1.36, 0.862, 0.556).with_ic(0.388));
        add("-size3", '(', Glyph::new(1.45, 0.949, 0.736));
        add("-size3", ')', Glyph::new(1.45, 0.949, 0.736));
        add("-size4", '(', Glyph::new(1.75, 1.249, 0.792));
        add("-size4", ')', Glyph::new(1.75, 1.249, 0.792));

        Self { params, chars }
    }

    fn fallback(variant: &str) -> Option<&'static str> {
        VARIANT_CHAIN
            .iter()
            .find(|(name, _)| *name == variant)
            .and_then(|(_, next)| *next)
    }
}

fn letter_extent(c: char) -> (f64, f64) {
    match c {
        'b' | 'd' | 'f' | 'h' | 'k' | 'l' | 't' => (0.694, 0.011),
        'g' | 'p' | 'q' | 'y' => (0.442, 0.205),
        'j' => (0.661, 0.205),
        'i' => (0.661, 0.011),
        _ => (0.442, 0.011),
    }
}

impl FontMetrics for TexFont {
    fn params(&self) -> &FontParams {
        &self.params
    }

    fn glyph(&self, variant: &str, c: char) -> Option<Glyph> {
        let mut current = Some(variant);
        while let Some(name) = current {
            if let Some(glyph) = self.chars.get(name).and_then(|table| table.get(&c)) {
                return Some(*glyph);
            }
            current = Self::fallback(name);
        }
        None
    }

    fn has_variant(&self, variant: &str) -> bool {
        VARIANT_CHAIN.iter().any(|(name, _)| *name == variant)
    }
}

//! Layout configuration
//!
//! Options are plain serde structs with defaults, so a partial JSON file
//! only overrides what it names.

use crate::{LayoutError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Key of the fallback entry in lookup tables
pub const FALLBACK_KEY: &str = "value";

/// Options for a layout engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutOptions {
    /// Global scale applied to the whole expression
    pub scale: f64,
    /// Scale of the surrounding text relative to the math font
    pub ambient_scale: f64,
    /// Pixels per em, for absolute length units
    pub em_px: f64,
    /// Default `scriptalign` for multiscripts (pre then post)
    pub script_align: String,
    /// Attributes not copied to the output; an entry set to `false` forces copying
    pub skip_attributes: BTreeMap<String, bool>,
    /// Output class for each variant
    pub variant_classes: BTreeMap<String, String>,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        let skip_attributes = [
            "fontfamily",
            "fontsize",
            "fontweight",
            "fontstyle",
            "color",
            "background",
            "class",
            "href",
            "style",
            "xmlns",
        ]
        .into_iter()
        .map(|name| (name.to_string(), true))
        .collect();

        let variant_classes = [
            ("bold", "mx-bold"),
            ("italic", "mx-italic"),
            ("bold-italic", "mx-bold mx-italic"),
            ("double-struck", "mx-ds"),
            ("fraktur", "mx-frak"),
            ("bold-fraktur", "mx-frak mx-bold"),
            ("script", "mx-scr"),
            ("bold-script", "mx-scr mx-bold"),
            ("sans-serif", "mx-sf"),
            ("bold-sans-serif", "mx-sf mx-bold"),
            ("sans-serif-italic", "mx-sf mx-italic"),
            ("sans-serif-bold-italic", "mx-sf mx-bold mx-italic"),
            ("monospace", "mx-mono"),
            ("-smallop", "mx-sop"),
            ("-largeop", "mx-lop"),
            ("-size3", "mx-s3"),
            ("-size4", "mx-s4"),
            ("-tex-variant", "mx-var"),
            ("-tex-calligraphic", "mx-cal"),
            ("-tex-oldstyle", "mx-os"),
        ]
        .into_iter()
        .map(|(variant, class)| (variant.to_string(), class.to_string()))
        .collect();

        Self {
            scale: 1.0,
            ambient_scale: 1.0,
            em_px: 16.0,
            script_align: "right left".to_string(),
            skip_attributes,
            variant_classes,
        }
    }
}

impl LayoutOptions {
    /// Parse options from JSON, using defaults if the text is malformed
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str::<LayoutOptions>(json) {
            Ok(options) => options,
            Err(e) => {
                tracing::warn!("Failed to parse layout options, using defaults: {}", e);
                LayoutOptions::default()
            }
        }
    }

    /// Load options from a file, or return defaults if it doesn't exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(LayoutOptions::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&content))
    }

    /// Save options as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Whether an attribute is kept off the output
    pub fn skips(&self, name: &str) -> bool {
        self.skip_attributes.get(name).copied().unwrap_or(false)
    }

    /// Whether an attribute is forced onto the output
    pub fn forces(&self, name: &str) -> bool {
        self.skip_attributes.get(name) == Some(&false)
    }

    /// The output class of a variant, falling back to the "value" entry
    pub fn variant_class(&self, variant: &str) -> Result<&str> {
        self.variant_classes
            .get(variant)
            .or_else(|| self.variant_classes.get(FALLBACK_KEY))
            .map(String::as_str)
            .ok_or_else(|| LayoutError::MissingVariantClass(variant.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let options = LayoutOptions::default();
        assert_eq!(options.scale, 1.0);
        assert!(options.skips("fontfamily"));
        assert!(!options.skips("data-semantic-type"));
        assert_eq!(options.variant_class("bold").unwrap(), "mx-bold");
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let options = LayoutOptions::from_json(r#"{"scale": 1.2}"#);
        assert_eq!(options.scale, 1.2);
        assert_eq!(options.script_align, "right left");
    }

    #[test]
    fn test_malformed_json_uses_defaults() {
        let options = LayoutOptions::from_json("{scale: ");
        assert_eq!(options, LayoutOptions::default());
    }

    #[test]
    fn test_variant_class_fallback() {
        let mut options = LayoutOptions::default();
        assert!(matches!(
            options.variant_class("-tex-mathit"),
            Err(LayoutError::MissingVariantClass(_))
        ));
        options
            .variant_classes
            .insert(FALLBACK_KEY.to_string(), "mx-other".to_string());
        assert_eq!(options.variant_class("-tex-mathit").unwrap(), "mx-other");
    }

    #[test]
    fn test_forced_attribute() {
        let options = LayoutOptions::from_json(r#"{"skip_attributes": {"href": false}}"#);
        assert!(options.forces("href"));
        assert!(!options.skips("href"));
    }

    #[test]
    fn test_load_save() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("layout.json");

        // Load should return defaults when no file exists
        assert_eq!(LayoutOptions::load(&path).unwrap(), LayoutOptions::default());

        let mut options = LayoutOptions::default();
        options.em_px = 20.0;
        options.save(&path).unwrap();
        assert_eq!(LayoutOptions::load(&path).unwrap().em_px, 20.0);
    }
}

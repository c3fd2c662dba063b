//! Inline style strings
//!
//! A minimal `name: value; ...` parser. Properties keep their insertion
//! order so serialized output is stable.

/// Font properties that are re-derived from the variant instead of being
/// passed through
pub const FONT_STYLES: [&str; 4] = ["font-family", "font-weight", "font-style", "font-size"];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Styles {
    entries: Vec<(String, String)>,
}

impl Styles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a style attribute; malformed declarations are skipped
    pub fn parse(css: &str) -> Self {
        let mut styles = Self::new();
        for declaration in css.split(';') {
            if let Some((name, value)) = declaration.split_once(':') {
                let name = name.trim().to_ascii_lowercase();
                let value = value.trim();
                if !name.is_empty() && !value.is_empty() {
                    styles.set(&name, value);
                }
            }
        }
        styles
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set a property; an empty value removes it
    pub fn set(&mut self, name: &str, value: &str) {
        if value.is_empty() {
            self.remove(name);
            return;
        }
        match self.entries.iter_mut().find(|(key, _)| key == name) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.entries.push((name.to_string(), value.to_string())),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        let index = self.entries.iter().position(|(key, _)| key == name)?;
        Some(self.entries.remove(index).1)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Serialize back to a style attribute value
    pub fn css_text(&self) -> String {
        self.entries
            .iter()
            .map(|(key, value)| format!("{key}: {value};"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Move the font properties into a separate set
    pub fn strip_fonts(&mut self) -> Styles {
        let mut removed = Styles::new();
        for name in FONT_STYLES {
            if let Some(value) = self.remove(name) {
                removed.set(name, &value);
            }
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_serialize() {
        let styles = Styles::parse("color: red; ; border:1px solid ;bogus");
        assert_eq!(styles.get("color"), Some("red"));
        assert_eq!(styles.css_text(), "color: red; border: 1px solid;");
    }

    #[test]
    fn test_strip_fonts() {
        let mut styles = Styles::parse("font-family: serif; color: blue; font-size: 120%");
        let removed = styles.strip_fonts();
        assert_eq!(styles.css_text(), "color: blue;");
        assert_eq!(removed.get("font-family"), Some("serif"));
        assert_eq!(removed.get("font-size"), Some("120%"));
    }

    #[test]
    fn test_set_empty_removes() {
        let mut styles = Styles::parse("color: blue");
        styles.set("color", "");
        assert!(styles.is_empty());
    }
}

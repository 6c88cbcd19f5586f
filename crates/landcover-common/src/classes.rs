//! Land-cover class table: id, display name and display color in one place.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An RGB display color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a hex color string ("#1f77b4" or "1f77b4").
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }

        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

        Some(Self { r, g, b })
    }

    /// Lowercase "#rrggbb" form used by the chart and map layers.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Color used for any class that has no color of its own.
pub const DEFAULT_CLASS_COLOR: Rgb = Rgb::new(0x80, 0x80, 0x80);

/// One row of the class table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassEntry {
    pub id: u16,
    pub name: String,
    pub color: Option<Rgb>,
}

impl ClassEntry {
    pub fn new(id: u16, name: impl Into<String>, color: Option<Rgb>) -> Self {
        Self {
            id,
            name: name.into(),
            color,
        }
    }

    /// The entry color, or [`DEFAULT_CLASS_COLOR`] when none is set.
    pub fn display_color(&self) -> Rgb {
        self.color.unwrap_or(DEFAULT_CLASS_COLOR)
    }
}

/// Classes produced by the Rio da Várzea classification step.
const VARZEA_CLASSES: [(u16, &str, Rgb); 6] = [
    (0, "Água", Rgb::new(0x1f, 0x77, 0xb4)),
    (1, "Floresta Nativa", Rgb::new(0x2c, 0xa0, 0x2c)),
    (2, "Floresta Plantada", Rgb::new(0x88, 0xf8, 0x5f)),
    (3, "Agricultura", Rgb::new(0xff, 0x7f, 0x0e)),
    (4, "Agricultura em Pousio", Rgb::new(0xbc, 0xbd, 0x22)),
    (5, "Solo Exposto", Rgb::new(0x8c, 0x56, 0x4b)),
];

/// Mapping from class id to name and color, kept in ascending id order.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassMapping {
    entries: Vec<ClassEntry>,
}

impl ClassMapping {
    /// Build a mapping from arbitrary entries. Duplicate ids keep the first entry.
    pub fn new(mut entries: Vec<ClassEntry>) -> Self {
        entries.sort_by_key(|e| e.id);
        entries.dedup_by_key(|e| e.id);
        Self { entries }
    }

    /// Entries in ascending id order.
    pub fn entries(&self) -> impl Iterator<Item = &ClassEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: u16) -> Option<&ClassEntry> {
        self.entries
            .binary_search_by_key(&id, |e| e.id)
            .ok()
            .map(|idx| &self.entries[idx])
    }

    pub fn name_of(&self, id: u16) -> Option<&str> {
        self.get(id).map(|e| e.name.as_str())
    }

    /// Display color for an id, falling back to [`DEFAULT_CLASS_COLOR`].
    pub fn color_of(&self, id: u16) -> Rgb {
        self.get(id)
            .map(ClassEntry::display_color)
            .unwrap_or(DEFAULT_CLASS_COLOR)
    }

    /// Display color for a class name, falling back to [`DEFAULT_CLASS_COLOR`].
    pub fn color_for_name(&self, name: &str) -> Rgb {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(ClassEntry::display_color)
            .unwrap_or(DEFAULT_CLASS_COLOR)
    }

    /// Position of a class name in table order.
    pub fn order_of(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == name)
    }

    /// Translate a raw class label: integer ids become names, anything else
    /// (and ids without an entry) is returned unchanged.
    pub fn label_for_id(&self, raw: &str) -> String {
        raw.trim()
            .parse::<u16>()
            .ok()
            .and_then(|id| self.name_of(id))
            .map(str::to_string)
            .unwrap_or_else(|| raw.trim().to_string())
    }

    /// Sort key placing known classes in table order, then others alphabetically.
    pub fn sort_key<'a>(&self, name: &'a str) -> (usize, &'a str) {
        (self.order_of(name).unwrap_or(usize::MAX), name)
    }
}

impl Default for ClassMapping {
    fn default() -> Self {
        Self::new(
            VARZEA_CLASSES
                .iter()
                .map(|(id, name, color)| ClassEntry::new(*id, *name, Some(*color)))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_round_trip() {
        assert_eq!(Rgb::from_hex("#1f77b4"), Some(Rgb::new(31, 119, 180)));
        assert_eq!(Rgb::from_hex("FF0000"), Some(Rgb::new(255, 0, 0)));
        assert_eq!(Rgb::from_hex("#GGGGGG"), None);
        assert_eq!(Rgb::from_hex("#fff"), None);
        assert_eq!(Rgb::new(136, 248, 95).to_hex(), "#88f85f");
    }

    #[test]
    fn test_default_table() {
        let mapping = ClassMapping::default();
        assert_eq!(mapping.len(), 6);
        assert_eq!(mapping.name_of(0), Some("Água"));
        assert_eq!(mapping.name_of(5), Some("Solo Exposto"));
        assert_eq!(mapping.color_of(3), Rgb::from_hex("#ff7f0e").unwrap());
        let ids: Vec<u16> = mapping.entries().map(|e| e.id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_missing_color_falls_back_to_gray() {
        let mapping = ClassMapping::new(vec![
            ClassEntry::new(1, "Floresta Nativa", Some(Rgb::new(0, 255, 0))),
            ClassEntry::new(2, "Sem cor", None),
        ]);
        assert_eq!(mapping.color_of(2), DEFAULT_CLASS_COLOR);
        assert_eq!(mapping.color_of(42), DEFAULT_CLASS_COLOR);
        assert_eq!(mapping.color_for_name("Sem cor"), DEFAULT_CLASS_COLOR);
        assert_eq!(mapping.color_for_name("Floresta Nativa"), Rgb::new(0, 255, 0));
    }

    #[test]
    fn test_entries_sorted_and_deduplicated() {
        let mapping = ClassMapping::new(vec![
            ClassEntry::new(3, "c", None),
            ClassEntry::new(1, "a", None),
            ClassEntry::new(1, "a-dup", None),
        ]);
        let names: Vec<&str> = mapping.entries().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a", "c"]);
    }

    #[test]
    fn test_label_for_id() {
        let mapping = ClassMapping::default();
        assert_eq!(mapping.label_for_id("1"), "Floresta Nativa");
        assert_eq!(mapping.label_for_id(" 0 "), "Água");
        assert_eq!(mapping.label_for_id("17"), "17");
        assert_eq!(mapping.label_for_id("Agricultura"), "Agricultura");
    }

    #[test]
    fn test_sort_key_orders_known_classes_first() {
        let mapping = ClassMapping::default();
        let mut names = vec!["Zebra", "Solo Exposto", "Água", "Alpha"];
        names.sort_by(|a, b| mapping.sort_key(a).cmp(&mapping.sort_key(b)));
        assert_eq!(names, vec!["Água", "Solo Exposto", "Alpha", "Zebra"]);
    }
}

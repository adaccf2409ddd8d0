use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use brickledger_core::{ColorId, DomainError, DomainResult, PartColor, PartId, SetNumber};

/// Canonical part (design) record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalPart {
    pub id: PartId,
    pub name: String,
    #[serde(default)]
    pub part_url: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl CanonicalPart {
    pub fn new(id: PartId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            part_url: None,
            image_url: None,
        }
    }
}

/// 8-bit RGB triple.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Parse `RRGGBB`, with or without a leading `#`.
    pub fn from_hex(raw: &str) -> DomainResult<Self> {
        let hex = raw.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(DomainError::validation(format!("invalid hex color '{raw}'")));
        }
        let channel = |range: core::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16)
                .map_err(|_| DomainError::validation(format!("invalid hex color '{raw}'")))
        };
        Ok(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }

    pub fn to_hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Canonical color record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalColor {
    pub id: ColorId,
    pub name: String,
    pub rgb: Rgb,
    #[serde(default)]
    pub is_transparent: bool,
}

impl CanonicalColor {
    pub fn new(id: ColorId, name: impl Into<String>, rgb: Rgb) -> Self {
        Self {
            id,
            name: name.into(),
            rgb,
            is_transparent: false,
        }
    }
}

/// Catalog definition of a set design: which parts, in which colors, how many.
///
/// Immutable per `set_number` once stored in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetTemplate {
    pub set_number: SetNumber,
    pub name: String,
    #[serde(default)]
    pub year: Option<u16>,
    #[serde(with = "brickledger_core::pairs")]
    parts: BTreeMap<PartColor, u32>,
}

impl SetTemplate {
    pub fn new(set_number: SetNumber, name: impl Into<String>) -> Self {
        Self {
            set_number,
            name: name.into(),
            year: None,
            parts: BTreeMap::new(),
        }
    }

    /// Add a template row. Rows for the same (part, color) accumulate, since
    /// provider inventories list spare and minifig sub-inventories separately.
    pub fn with_part(mut self, part_color: PartColor, quantity: u32) -> Self {
        *self.parts.entry(part_color).or_insert(0) += quantity;
        self
    }

    pub fn quantity_of(&self, part_color: &PartColor) -> u32 {
        self.parts.get(part_color).copied().unwrap_or(0)
    }

    pub fn parts(&self) -> impl Iterator<Item = (&PartColor, u32)> {
        self.parts.iter().map(|(pc, q)| (pc, *q))
    }

    pub fn total_parts(&self) -> u64 {
        self.parts.values().map(|q| u64::from(*q)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.values().all(|q| *q == 0)
    }
}

/// Full provider payload consumed by a catalog refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    #[serde(default)]
    pub parts: Vec<CanonicalPart>,
    #[serde(default)]
    pub colors: Vec<CanonicalColor>,
    #[serde(default)]
    pub sets: Vec<SetTemplate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pc(part: &str, color: i32) -> PartColor {
        PartColor::new(PartId::parse(part).unwrap(), ColorId(color))
    }

    #[test]
    fn hex_parsing_accepts_optional_hash() {
        let black = Rgb::from_hex("#05131D").unwrap();
        assert_eq!(black, Rgb { r: 0x05, g: 0x13, b: 0x1D });
        assert_eq!(Rgb::from_hex("05131d").unwrap(), black);
        assert_eq!(black.to_hex(), "05131D");
    }

    #[test]
    fn hex_parsing_rejects_garbage() {
        assert!(Rgb::from_hex("12345").is_err());
        assert!(Rgb::from_hex("GGGGGG").is_err());
        assert!(Rgb::from_hex("ééé").is_err());
    }

    #[test]
    fn template_rows_accumulate() {
        let template = SetTemplate::new(SetNumber::parse("10270-1").unwrap(), "Bookshop")
            .with_part(pc("3001", 5), 3)
            .with_part(pc("3001", 5), 1)
            .with_part(pc("3003", 0), 2);

        assert_eq!(template.quantity_of(&pc("3001", 5)), 4);
        assert_eq!(template.quantity_of(&pc("9999", 5)), 0);
        assert_eq!(template.total_parts(), 6);
    }

    #[test]
    fn template_survives_json() {
        let template = SetTemplate::new(SetNumber::parse("40571-1").unwrap(), "Mini")
            .with_part(pc("3001", 5), 2);
        let json = serde_json::to_string(&template).unwrap();
        let back: SetTemplate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, template);
    }
}

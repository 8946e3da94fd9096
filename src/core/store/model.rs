use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b }
    }
}

impl TryFrom<&str> for Color {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let hex = value
            .strip_prefix('#')
            .ok_or_else(|| anyhow::anyhow!("Color must start with '#': {:?}", value))?;
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            anyhow::bail!("Color must have six hex digits: {:?}", value);
        }
        let packed = u32::from_str_radix(hex, 16)
            .map_err(|e| anyhow::anyhow!("Invalid color {:?}: {}", value, e))?;
        let r = ((packed >> 16) & 0xFF) as u8;
        let g = ((packed >> 8) & 0xFF) as u8;
        let b = (packed & 0xFF) as u8;
        Ok(Color { r, g, b })
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Color::try_from(raw.as_str()).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TripIcon {
    CherryBlossom,
    Cathedral,
    PalmTree,
    Mountain,
    Sun,
    Landmark,
    Trees,
    Snowflake,
    Tent,
}

/// Icons handed out to new trips, cycled by the number of existing trips.
pub const ICON_PALETTE: [(TripIcon, Color); 9] = [
    (TripIcon::Landmark, Color::rgb(0x2D, 0x34, 0x36)),
    (TripIcon::PalmTree, Color::rgb(0x1B, 0x43, 0x32)),
    (TripIcon::Mountain, Color::rgb(0x3D, 0x40, 0x5B)),
    (TripIcon::Sun, Color::rgb(0x5F, 0x4B, 0x32)),
    (TripIcon::CherryBlossom, Color::rgb(0x4A, 0x30, 0x43)),
    (TripIcon::Cathedral, Color::rgb(0x4A, 0x4A, 0x4A)),
    (TripIcon::Trees, Color::rgb(0x2A, 0x4A, 0x2A)),
    (TripIcon::Snowflake, Color::rgb(0x3A, 0x5A, 0x6A)),
    (TripIcon::Tent, Color::rgb(0x5A, 0x4A, 0x3A)),
];

pub fn pick_icon(index: usize) -> (TripIcon, Color) {
    ICON_PALETTE[index % ICON_PALETTE.len()]
}

use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};

/// A panel color, one byte per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb {
        red: 0,
        green: 0,
        blue: 0,
    };

    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Rgb { red, green, blue }
    }

    /// Parses a `#RRGGBB` (or bare `RRGGBB`) string.
    ///
    /// Surrounding whitespace is ignored. Short forms like `#F00` are rejected.
    pub fn from_hex(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            bail!("hex string required");
        }
        let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
        if digits.len() != 6 {
            bail!("hex must be #RRGGBB, got {:?}", s);
        }
        let bytes = hex::decode(digits).with_context(|| format!("invalid hex color {:?}", s))?;
        Ok(Rgb::new(bytes[0], bytes[1], bytes[2]))
    }

    /// Accepts either a hex color or an SVG/CSS color name such as `orange`.
    pub fn from_name_or_hex(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if let Some(named) = palette::named::from_str(&trimmed.to_lowercase()) {
            let (red, green, blue) = named.into_components();
            return Ok(Rgb::new(red, green, blue));
        }
        Rgb::from_hex(trimmed).map_err(|e| anyhow!("unknown color {:?}: {}", s, e))
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.red, self.green, self.blue)
    }
}

impl FromStr for Rgb {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rgb::from_hex(s)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<(u8, u8, u8)> for Rgb {
    fn from(tuple: (u8, u8, u8)) -> Self {
        Rgb::new(tuple.0, tuple.1, tuple.2)
    }
}

impl From<Rgb> for (u8, u8, u8) {
    fn from(rgb: Rgb) -> Self {
        (rgb.red, rgb.green, rgb.blue)
    }
}

/// Scales a color by a brightness percentage.
///
/// `None` and `Some(100)` leave the color untouched. Channels are rounded
/// half-to-even, so `127.5` becomes `128` and `0.5` becomes `0`.
pub fn apply_brightness(rgb: Rgb, brightness: Option<u8>) -> Result<Rgb> {
    let brightness = match brightness {
        None | Some(100) => return Ok(rgb),
        Some(b) if b > 100 => bail!("brightness must be between 0 and 100, got {}", b),
        Some(b) => b,
    };
    let scale = f64::from(brightness) / 100.0;
    let scaled = |channel: u8| (f64::from(channel) * scale).round_ties_even().clamp(0.0, 255.0) as u8;
    Ok(Rgb::new(
        scaled(rgb.red),
        scaled(rgb.green),
        scaled(rgb.blue),
    ))
}

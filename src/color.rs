use crate::error::{InkpadError, InkpadResult};

/// Straight-alpha RGBA color as stored in canvas documents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parses `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(hex: &str) -> InkpadResult<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 && digits.len() != 8 {
            return Err(InkpadError::validation(format!(
                "color '{hex}' must be #rrggbb or #rrggbbaa"
            )));
        }
        let byte = |i: usize| -> InkpadResult<u8> {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|_| InkpadError::validation(format!("color '{hex}' has non-hex digits")))
        };
        Ok(Self {
            r: byte(0)?,
            g: byte(2)?,
            b: byte(4)?,
            a: if digits.len() == 8 { byte(6)? } else { 255 },
        })
    }

    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

/// The eight preset brush colors offered by the toolbar.
pub const PALETTE: [Rgba8; 8] = [
    Rgba8::opaque(0x1a, 0x1a, 0x1a),
    Rgba8::opaque(0xef, 0x44, 0x44),
    Rgba8::opaque(0xf9, 0x73, 0x16),
    Rgba8::opaque(0xea, 0xb3, 0x08),
    Rgba8::opaque(0x22, 0xc5, 0x5e),
    Rgba8::opaque(0x3b, 0x82, 0xf6),
    Rgba8::opaque(0x8b, 0x5c, 0xf6),
    Rgba8::opaque(0xec, 0x48, 0x99),
];

pub const DEFAULT_BRUSH_COLOR: Rgba8 = PALETTE[0];

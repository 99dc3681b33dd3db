//! Card accent colour parsed from the model's `theme_color`

use std::fmt;
use std::str::FromStr;

/// An RGB accent colour
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CardColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl CardColor {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Colour used when the card's colour is missing or unparseable (`#00ff41`)
    pub const FALLBACK: Self = Self::new(0x00, 0xff, 0x41);

    /// Parse `#rrggbb` or `#rgb`, the leading `#` optional
    ///
    /// # Errors
    /// Returns an error if the string is not a 3 or 6 digit hex colour.
    pub fn from_hex(hex: &str) -> Result<Self, ColorParseError> {
        let hex = hex.trim().trim_start_matches('#');
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorParseError::InvalidHex(hex.to_string()));
        }

        let channel = |digits: &str| {
            u8::from_str_radix(digits, 16).map_err(|_| ColorParseError::InvalidHex(hex.to_string()))
        };

        match hex.len() {
            6 => Ok(Self::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            3 => {
                let doubled: String = hex.chars().flat_map(|c| [c, c]).collect();
                Self::from_hex(&doubled)
            }
            len => Err(ColorParseError::InvalidLength(len)),
        }
    }

    /// Parse the card colour, falling back to [`CardColor::FALLBACK`]
    pub fn parse_or_fallback(hex: Option<&str>) -> Self {
        hex.filter(|h| !h.trim().is_empty())
            .and_then(|h| Self::from_hex(h).ok())
            .unwrap_or(Self::FALLBACK)
    }

    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// RGB tuple for `colored::Colorize::truecolor`
    #[must_use]
    pub const fn to_rgb_tuple(&self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }

    /// Linearly interpolate towards `other`; `t` is clamped to 0.0..=1.0
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::as_conversions
    )]
    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self {
            r: (f32::from(self.r) + (f32::from(other.r) - f32::from(self.r)) * t) as u8,
            g: (f32::from(self.g) + (f32::from(other.g) - f32::from(self.g)) * t) as u8,
            b: (f32::from(self.b) + (f32::from(other.b) - f32::from(self.b)) * t) as u8,
        }
    }

    /// Darkened variant for bar tracks and borders
    #[must_use]
    pub fn dimmed(&self) -> Self {
        self.lerp(&Self::new(0, 0, 0), 0.7)
    }
}

impl Default for CardColor {
    fn default() -> Self {
        Self::FALLBACK
    }
}

impl fmt::Display for CardColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for CardColor {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorParseError {
    #[error("invalid hex color length: {0} (expected 3 or 6)")]
    InvalidLength(usize),
    #[error("invalid hex color: {0}")]
    InvalidHex(String),
}

//! RGBA colors and their literal forms.
//!
//! Hex literals come in two lengths:
//!   `rrggbb`    → fully opaque
//!   `aarrggbb`  → alpha is the FIRST byte pair, not the last as in HTML.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self { Self { r, g, b, a: 255 } }
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self { Self { r, g, b, a } }

    /// Parse a symbolic name or a hex literal (leading `#` optional).
    pub fn parse(text: &str) -> Option<Self> {
        Self::named(text).or_else(|| Self::from_hex(text))
    }

    pub fn named(name: &str) -> Option<Self> {
        let c = match name {
            "black"       => Color::BLACK,
            "white"       => Color::WHITE,
            "red"         => Color::rgb(255, 0, 0),
            "green"       => Color::rgb(0, 128, 0),
            "lime"        => Color::rgb(0, 255, 0),
            "blue"        => Color::rgb(0, 0, 255),
            "yellow"      => Color::rgb(255, 255, 0),
            "cyan"        => Color::rgb(0, 255, 255),
            "magenta"     => Color::rgb(255, 0, 255),
            "orange"      => Color::rgb(255, 165, 0),
            "purple"      => Color::rgb(128, 0, 128),
            "pink"        => Color::rgb(255, 192, 203),
            "brown"       => Color::rgb(165, 42, 42),
            "gray" | "grey" => Color::rgb(128, 128, 128),
            "navy"        => Color::rgb(0, 0, 128),
            "teal"        => Color::rgb(0, 128, 128),
            "transparent" => Color::rgba(255, 255, 255, 0),
            _ => return None,
        };
        Some(c)
    }

    pub fn from_hex(text: &str) -> Option<Self> {
        let hex = text.strip_prefix('#').unwrap_or(text);
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) { return None; }
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        match hex.len() {
            6 => Some(Color::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Some(Color::rgba(byte(2)?, byte(4)?, byte(6)?, byte(0)?)),
            _ => None,
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.a, self.r, self.g, self.b)
    }
}

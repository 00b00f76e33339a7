/// Normalised RGBA colour (each channel in `[0.0, 1.0]`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const RED:    Self = Self { r: 0.906, g: 0.298, b: 0.235, a: 1.0 }; // #e74c3c
    pub const BLUE:   Self = Self { r: 0.204, g: 0.596, b: 0.859, a: 1.0 }; // #3498db
    pub const ORANGE: Self = Self { r: 0.953, g: 0.612, b: 0.071, a: 1.0 }; // #f39c12

    /// Parse a CSS-style hex color string (`#RRGGBB` or `#RRGGBBAA`).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if !hex.is_ascii() {
            return None;
        }

        let byte = |s: &str| -> Option<u8> { u8::from_str_radix(s, 16).ok() };

        let alpha = match hex.len() {
            6 => 255,
            8 => byte(&hex[6..8])?,
            _ => return None,
        };
        Some(Self {
            r: byte(&hex[0..2])? as f32 / 255.0,
            g: byte(&hex[2..4])? as f32 / 255.0,
            b: byte(&hex[4..6])? as f32 / 255.0,
            a: alpha as f32 / 255.0,
        })
    }

    /// Return a copy with the alpha channel set to `alpha`.
    #[inline]
    #[must_use]
    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.a = alpha.clamp(0.0, 1.0);
        self
    }

    /// `#rrggbb`, ignoring alpha.
    pub fn to_hex(self) -> String {
        let [r, g, b] = self.rgb8();
        format!("#{r:02x}{g:02x}{b:02x}")
    }

    /// CSS `rgba(r, g, b, a)` notation, as chart libraries expect for fills.
    pub fn to_css_rgba(self) -> String {
        let [r, g, b] = self.rgb8();
        let a = (self.a * 100.0).round() / 100.0;
        format!("rgba({r}, {g}, {b}, {a})")
    }

    fn rgb8(self) -> [u8; 3] {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trip() {
        let c = Color::from_hex("#e74c3c").unwrap();
        assert_eq!(c.to_hex(), "#e74c3c");
        assert_eq!(c.a, 1.0);
    }

    #[test]
    fn css_fill() {
        let c = Color::from_hex("#3498db").unwrap().with_alpha(0.1);
        assert_eq!(c.to_css_rgba(), "rgba(52, 152, 219, 0.1)");
    }

    #[test]
    fn rejects_garbage() {
        assert!(Color::from_hex("#12345").is_none());
        assert!(Color::from_hex("#zzzzzz").is_none());
        assert!(Color::from_hex("#ééé").is_none());
        assert_eq!(Color::from_hex("ff000080").map(|c| c.to_hex()), Some("#ff0000".into()));
    }
}
